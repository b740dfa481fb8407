use crate::domain::model::{ApiKeyRecord, Order, QuestionMapping};
use crate::utils::error::IngestError;
use futures_util::stream::BoxStream;

/// Lazy, non-restartable sequence of orders. Call again for a fresh fetch.
pub type OrderStream<'a> = BoxStream<'a, std::result::Result<Order, IngestError>>;

/// Where the HTTP layer gets its orders from.
pub trait OrderSource: Send + Sync {
    fn orders(&self) -> OrderStream<'_>;
}

pub trait ConfigProvider: Send + Sync {
    fn organizer(&self) -> &str;
    fn event_name(&self) -> &str;
    fn api_token(&self) -> &str;
    fn question_mapping(&self) -> &QuestionMapping;
    fn api_keys(&self) -> &[ApiKeyRecord];
}
