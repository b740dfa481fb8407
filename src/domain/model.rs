use serde::{Deserialize, Serialize};

/// A caller API key as configured at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub key: String,
    #[serde(default)]
    pub privileged: bool,
}

/// Logical order fields that can be filled from upstream question answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderField {
    Company,
    JobTitle,
    BioUrl,
    Asn,
    TshirtSize,
}

/// Logical field name to upstream question identifier.
///
/// A field without an identifier is never filled. Unknown keys in the
/// configured object are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tshirt_size: Option<String>,
}

impl QuestionMapping {
    /// `(field, question identifier)` pairs for every mapped field.
    pub fn entries(&self) -> impl Iterator<Item = (OrderField, &str)> {
        [
            (OrderField::Company, &self.company),
            (OrderField::JobTitle, &self.job_title),
            (OrderField::BioUrl, &self.bio_url),
            (OrderField::Asn, &self.asn),
            (OrderField::TshirtSize, &self.tshirt_size),
        ]
        .into_iter()
        .filter_map(|(field, identifier)| identifier.as_deref().map(|id| (field, id)))
    }
}

/// A normalized attendee order. Missing answers are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tshirt_size: Option<String>,
}

impl Order {
    pub fn set(&mut self, field: OrderField, value: String) {
        let slot = match field {
            OrderField::Company => &mut self.company,
            OrderField::JobTitle => &mut self.job_title,
            OrderField::BioUrl => &mut self.bio_url,
            OrderField::Asn => &mut self.asn,
            OrderField::TshirtSize => &mut self.tshirt_size,
        };
        *slot = Some(value);
    }
}

/// Public projection of an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asn: Option<String>,
}

impl From<Order> for Attendee {
    fn from(order: Order) -> Self {
        Self {
            name: order.name,
            company: order.company,
            asn: order.asn,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Error,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Error => "error",
        }
    }
}

// Upstream payload. Fields not listed here are ignored.

#[derive(Debug, Clone, Deserialize)]
pub struct OrdersPage {
    pub results: Vec<UpstreamOrder>,
    /// Required, but `null` on the last page.
    #[serde(deserialize_with = "Option::deserialize")]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamOrder {
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    pub positions: Vec<UpstreamPosition>,
}

impl UpstreamOrder {
    /// The order identifier, preferring `order` over the Pretix `code`.
    pub fn identifier(&self) -> Option<&str> {
        self.order.as_deref().or(self.code.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamPosition {
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub attendee_name: Option<String>,
    #[serde(default)]
    pub attendee_email: Option<String>,
    #[serde(default)]
    pub answers: Vec<UpstreamAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamAnswer {
    pub question_identifier: String,
    #[serde(default)]
    pub answer: serde_json::Value,
}

impl UpstreamAnswer {
    /// Strings pass through, `null` is no answer, other values keep their JSON text.
    pub fn into_text(self) -> Option<String> {
        match self.answer {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(text),
            other => Some(other.to_string()),
        }
    }
}
