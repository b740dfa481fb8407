pub mod auth;
pub mod ingest;
pub mod source;

pub use crate::domain::model::{
    ApiKeyRecord, Attendee, Order, OrderField, OrdersPage, QuestionMapping, UpstreamOrder,
};
pub use crate::domain::ports::{ConfigProvider, OrderSource, OrderStream};
pub use auth::{Authorization, KeyAuthorizer};
pub use ingest::OrderIngester;
pub use source::PretixOrderSource;
