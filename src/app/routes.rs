//! `/attendees` and `/orders` handlers.
//!
//! Both endpoints require the `x-pretino-key` header. `/attendees` accepts
//! any configured key; `/orders` additionally requires a privileged one.

use crate::app::error::ApiError;
use crate::core::{Attendee, KeyAuthorizer, Order, OrderSource};
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::Json,
    routing::get,
    Router,
};
use futures_util::TryStreamExt;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub const API_KEY_HEADER: &str = "x-pretino-key";

/// Shared, read-only state of the running gateway.
pub struct AppState {
    pub authorizer: KeyAuthorizer,
    pub orders: Arc<dyn OrderSource>,
}

/// The raw key from the `x-pretino-key` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| ApiKey(value.to_string()))
            .ok_or(ApiError::MissingApiKey)
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/attendees", get(get_attendees))
        .route("/orders", get(get_orders))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_attendees(
    State(state): State<Arc<AppState>>,
    ApiKey(key): ApiKey,
) -> Result<Json<Vec<Attendee>>, ApiError> {
    if !state.authorizer.authorize(&key).authorized {
        tracing::debug!("Rejected /attendees request with unknown key");
        return Err(ApiError::InvalidApiKey);
    }

    let orders = collect_orders(state.orders.as_ref()).await?;
    Ok(Json(orders.into_iter().map(Attendee::from).collect()))
}

async fn get_orders(
    State(state): State<Arc<AppState>>,
    ApiKey(key): ApiKey,
) -> Result<Json<Vec<Order>>, ApiError> {
    let authorization = state.authorizer.authorize(&key);
    if !authorization.authorized {
        tracing::debug!("Rejected /orders request with unknown key");
        return Err(ApiError::InvalidApiKey);
    }
    if !authorization.privileged {
        tracing::debug!("Rejected /orders request with unprivileged key");
        return Err(ApiError::UnprivilegedApiKey);
    }

    Ok(Json(collect_orders(state.orders.as_ref()).await?))
}

async fn collect_orders(source: &dyn OrderSource) -> Result<Vec<Order>, ApiError> {
    let orders: Vec<Order> = source.orders().try_collect().await?;
    tracing::info!("Served {} orders", orders.len());
    Ok(orders)
}
