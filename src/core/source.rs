use crate::core::{ConfigProvider, OrderIngester, OrderSource, OrderStream, QuestionMapping};

/// Orders of one configured Pretix event.
#[derive(Debug, Clone)]
pub struct PretixOrderSource {
    ingester: OrderIngester,
    organizer: String,
    event_name: String,
    api_token: String,
    question_mapping: QuestionMapping,
}

impl PretixOrderSource {
    pub fn new<C: ConfigProvider + ?Sized>(ingester: OrderIngester, config: &C) -> Self {
        Self {
            ingester,
            organizer: config.organizer().to_string(),
            event_name: config.event_name().to_string(),
            api_token: config.api_token().to_string(),
            question_mapping: config.question_mapping().clone(),
        }
    }
}

impl OrderSource for PretixOrderSource {
    fn orders(&self) -> OrderStream<'_> {
        tracing::debug!(
            "Fetching orders for {}/{}",
            self.organizer,
            self.event_name
        );
        self.ingester.fetch(
            &self.organizer,
            &self.event_name,
            &self.api_token,
            &self.question_mapping,
        )
    }
}
