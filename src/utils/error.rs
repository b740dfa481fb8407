use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration parse error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl GatewayError {
    /// Short message suitable for printing on the terminal before exiting.
    pub fn user_friendly_message(&self) -> String {
        match self {
            GatewayError::IoError(e) => format!("Could not read configuration: {}", e),
            GatewayError::MissingConfigError { field } => {
                format!("Setting '{}' is required but was not provided", field)
            }
            GatewayError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that abort an order fetch.
///
/// Network-level failures are not represented here: they end the stream
/// early without an error.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("upstream returned {status} for {url}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("could not decode upstream page {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
