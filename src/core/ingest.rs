//! Paginated order download from the Pretix API.
//!
//! Pages are fetched one at a time as the stream is polled. A connection
//! failure or timeout ends the stream early with whatever was already
//! yielded; an upstream error status ends it with an [`IngestError`].

use crate::core::{Order, OrderField, OrderStream, OrdersPage, QuestionMapping, UpstreamOrder};
use crate::utils::error::{IngestError, Result};
use async_stream::stream;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pretix.eu/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Identifier to logical field, rebuilt on every fetch.
type ReverseMapping<'a> = HashMap<&'a str, OrderField>;

#[derive(Debug, Clone)]
pub struct OrderIngester {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl OrderIngester {
    /// Redirects are not followed, so a 3xx fails the fetch like any other
    /// non-2xx status.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self::with_client(client, base_url, timeout))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn orders_url(&self, organizer: &str, event_name: &str) -> String {
        format!(
            "{}/organizers/{}/events/{}/orders/?require_approval=true",
            self.base_url.trim_end_matches('/'),
            organizer,
            event_name
        )
    }

    /// Streams every position of every approval-required order as an [`Order`].
    pub fn fetch<'a>(
        &'a self,
        organizer: &str,
        event_name: &str,
        api_token: &str,
        question_mapping: &'a QuestionMapping,
    ) -> OrderStream<'a> {
        let reverse = reverse_mapping(question_mapping);
        let authorization = format!("Token {}", api_token);
        let first_page = self.orders_url(organizer, event_name);

        Box::pin(stream! {
            let mut next = Some(first_page);
            let mut emitted = 0usize;

            while let Some(url) = next.take().filter(|url| !url.is_empty()) {
                let page = match self.fetch_page(&url, &authorization).await {
                    Ok(Some(page)) => page,
                    Ok(None) => {
                        tracing::warn!("Stopping order download after {} orders", emitted);
                        break;
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                for result in page.results {
                    for order in reshape(result, &reverse) {
                        emitted += 1;
                        yield Ok(order);
                    }
                }

                next = page.next;
            }

            tracing::debug!("Order download finished with {} orders", emitted);
        })
    }

    /// `Ok(None)` means the request never produced a usable response.
    async fn fetch_page(
        &self,
        url: &str,
        authorization: &str,
    ) -> std::result::Result<Option<OrdersPage>, IngestError> {
        tracing::debug!("Making API request to: {}", url);

        let response = match self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Error during API request: {}", e);
                return Ok(None);
            }
        };

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            tracing::error!("Upstream rejected request to {}: {}", url, status);
            return Err(IngestError::UpstreamStatus {
                status,
                url: url.to_string(),
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error during API request: {}", e);
                return Ok(None);
            }
        };

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|source| IngestError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

fn reverse_mapping(mapping: &QuestionMapping) -> ReverseMapping<'_> {
    mapping
        .entries()
        .map(|(field, identifier)| (identifier, field))
        .collect()
}

fn reshape(result: UpstreamOrder, reverse: &ReverseMapping<'_>) -> Vec<Order> {
    let order_id = result.identifier().map(str::to_owned);

    result
        .positions
        .into_iter()
        .map(|position| {
            let mut order = Order::default();

            for answer in position.answers {
                let Some(field) = reverse.get(answer.question_identifier.as_str()).copied() else {
                    continue;
                };
                if let Some(text) = answer.into_text() {
                    order.set(field, text);
                }
            }

            order.name = position.attendee_name;
            order.email = position.attendee_email;
            order.order_id = order_id.clone().or(position.order);
            order
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping() -> QuestionMapping {
        QuestionMapping {
            company: Some("q1".to_string()),
            asn: Some("q2".to_string()),
            ..Default::default()
        }
    }

    fn upstream(value: serde_json::Value) -> UpstreamOrder {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reshape_applies_mapping_and_static_fields() {
        let mapping = mapping();
        let reverse = reverse_mapping(&mapping);
        let result = upstream(json!({
            "order": "ORD1",
            "positions": [{
                "attendee_name": "Alice",
                "attendee_email": "a@x.com",
                "answers": [{"question_identifier": "q1", "answer": "ACME"}]
            }]
        }));

        let orders = reshape(result, &reverse);

        assert_eq!(
            orders,
            vec![Order {
                name: Some("Alice".to_string()),
                email: Some("a@x.com".to_string()),
                order_id: Some("ORD1".to_string()),
                company: Some("ACME".to_string()),
                ..Default::default()
            }]
        );
        assert_eq!(
            serde_json::to_value(&orders[0]).unwrap(),
            json!({"name": "Alice", "email": "a@x.com", "order_id": "ORD1", "company": "ACME"})
        );
    }

    #[test]
    fn test_reshape_ignores_unmapped_answers() {
        let mapping = mapping();
        let reverse = reverse_mapping(&mapping);
        let result = upstream(json!({
            "order": "ORD2",
            "positions": [{
                "attendee_name": "Bob",
                "attendee_email": "b@x.com",
                "answers": [
                    {"question_identifier": "q9", "answer": "ignored"},
                    {"question_identifier": "q2", "answer": "64512"}
                ]
            }]
        }));

        let orders = reshape(result, &reverse);

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].asn.as_deref(), Some("64512"));
        assert!(orders[0].company.is_none());
        assert_eq!(
            serde_json::to_value(&orders[0]).unwrap(),
            json!({"name": "Bob", "email": "b@x.com", "order_id": "ORD2", "asn": "64512"})
        );
    }

    #[test]
    fn test_reshape_tolerates_null_answers() {
        let mapping = mapping();
        let reverse = reverse_mapping(&mapping);
        let result = upstream(json!({
            "order": "ORD4",
            "positions": [{
                "attendee_name": "Frank",
                "answers": [
                    {"question_identifier": "food", "answer": null},
                    {"question_identifier": "q1", "answer": "ACME"},
                    {"question_identifier": "q2", "answer": null}
                ]
            }]
        }));

        let orders = reshape(result, &reverse);

        assert_eq!(orders[0].company.as_deref(), Some("ACME"));
        assert!(orders[0].asn.is_none());
    }

    #[test]
    fn test_reshape_emits_one_order_per_position() {
        let mapping = mapping();
        let reverse = reverse_mapping(&mapping);
        let result = upstream(json!({
            "order": "ORD3",
            "positions": [
                {"attendee_name": "Carol", "attendee_email": "c@x.com", "answers": []},
                {"attendee_name": "Dave", "attendee_email": "d@x.com", "answers": []}
            ]
        }));

        let orders = reshape(result, &reverse);

        let names: Vec<_> = orders.iter().map(|o| o.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["Carol", "Dave"]);
        assert!(orders.iter().all(|o| o.order_id.as_deref() == Some("ORD3")));
    }

    #[test]
    fn test_reshape_falls_back_to_position_order() {
        let reverse = ReverseMapping::new();
        let result = upstream(json!({
            "positions": [{"order": "POS1", "attendee_name": "Eve", "answers": []}]
        }));

        let orders = reshape(result, &reverse);

        assert_eq!(orders[0].order_id.as_deref(), Some("POS1"));
        assert!(orders[0].email.is_none());
    }

    #[test]
    fn test_orders_url_targets_approval_required_orders() {
        let ingester = OrderIngester::new("https://pretix.eu/api/v1/", DEFAULT_TIMEOUT).unwrap();

        assert_eq!(
            ingester.orders_url("itnog", "itnog9"),
            "https://pretix.eu/api/v1/organizers/itnog/events/itnog9/orders/?require_approval=true"
        );
    }
}
