use crate::core::ingest::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::core::{ApiKeyRecord, ConfigProvider, QuestionMapping};
use crate::domain::model::LogLevel;
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_PREFIX: &str = "PRETINO_";

/// Gateway settings, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub organizer: String,
    pub event_name: String,
    pub api_token: String,
    pub question_mapping: QuestionMapping,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub api_keys: Vec<ApiKeyRecord>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Settings {
    /// Loads settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GatewayError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses settings from TOML, substituting `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GatewayError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads settings from `PRETINO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from a variable lookup keyed by full variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let required = |name: &str| {
            var(name).ok_or_else(|| GatewayError::MissingConfigError {
                field: format!("{}{}", ENV_PREFIX, name),
            })
        };

        Ok(Self {
            organizer: required("ORGANIZER")?,
            event_name: required("EVENT_NAME")?,
            api_token: required("API_TOKEN")?,
            question_mapping: parse_json("QUESTION_MAPPING", &required("QUESTION_MAPPING")?)?,
            host: var("HOST")
                .map(|value| parse_value("HOST", &value))
                .transpose()?
                .unwrap_or_else(default_host),
            port: var("PORT")
                .map(|value| parse_value("PORT", &value))
                .transpose()?
                .unwrap_or_else(default_port),
            log_level: var("LOGLEVEL")
                .map(|value| parse_log_level(&value))
                .transpose()?
                .unwrap_or_default(),
            api_keys: var("API_KEYS")
                .map(|value| parse_json("API_KEYS", &value))
                .transpose()?
                .unwrap_or_default(),
            base_url: var("BASE_URL").unwrap_or_else(default_base_url),
            request_timeout_seconds: var("REQUEST_TIMEOUT")
                .map(|value| parse_value("REQUEST_TIMEOUT", &value))
                .transpose()?
                .unwrap_or_else(default_request_timeout),
        })
    }

    /// Replaces `${VAR}` with the variable's value. An unset variable is a
    /// configuration error.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GatewayError::ConfigError {
            message: e.to_string(),
        })?;

        if let Some(missing) = re
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .find(|var_name| std::env::var(var_name).is_err())
        {
            return Err(GatewayError::MissingConfigError { field: missing });
        }

        let result = re.replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("organizer", &self.organizer)?;
        validation::validate_non_empty_string("event_name", &self.event_name)?;
        validation::validate_non_empty_string("api_token", &self.api_token)?;

        let identifiers: Vec<&str> = self
            .question_mapping
            .entries()
            .map(|(_, identifier)| identifier)
            .collect();
        if identifiers.is_empty() {
            return Err(GatewayError::MissingConfigError {
                field: "question_mapping".to_string(),
            });
        }
        for identifier in &identifiers {
            validation::validate_non_empty_string("question_mapping", identifier)?;
        }
        validation::validate_unique_values("question_mapping", identifiers)?;

        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_positive_number(
            "request_timeout_seconds",
            self.request_timeout_seconds,
            1,
        )?;

        for record in &self.api_keys {
            validation::validate_non_empty_string("api_keys.key", &record.key)?;
        }
        if self.api_keys.is_empty() {
            tracing::warn!("No API keys configured, every request will be rejected");
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn parse_json<T: DeserializeOwned>(name: &str, value: &str) -> Result<T> {
    serde_json::from_str(value).map_err(|e| GatewayError::InvalidConfigValueError {
        field: format!("{}{}", ENV_PREFIX, name),
        value: value.to_string(),
        reason: format!("Invalid JSON: {}", e),
    })
}

fn parse_value<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| GatewayError::InvalidConfigValueError {
            field: format!("{}{}", ENV_PREFIX, name),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_log_level(value: &str) -> Result<LogLevel> {
    match value.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => Ok(LogLevel::Debug),
        "INFO" => Ok(LogLevel::Info),
        "ERROR" => Ok(LogLevel::Error),
        _ => Err(GatewayError::InvalidConfigValueError {
            field: format!("{}LOGLEVEL", ENV_PREFIX),
            value: value.to_string(),
            reason: "Supported levels: DEBUG, INFO, ERROR".to_string(),
        }),
    }
}

impl ConfigProvider for Settings {
    fn organizer(&self) -> &str {
        &self.organizer
    }

    fn event_name(&self) -> &str {
        &self.event_name
    }

    fn api_token(&self) -> &str {
        &self.api_token
    }

    fn question_mapping(&self) -> &QuestionMapping {
        &self.question_mapping
    }

    fn api_keys(&self) -> &[ApiKeyRecord] {
        &self.api_keys
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_TOML: &str = r#"
organizer = "itnog"
event_name = "itnog9"
api_token = "secret-token"

[question_mapping]
company = "company"
job_title = "jobtitle"
bio_url = "bio"
asn = "asn"
tshirt_size = "tshirt"
food_intolerance = "food"

[[api_keys]]
key = "public"

[[api_keys]]
key = "staff"
privileged = true
"#;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_parse_basic_toml_config() {
        let settings = Settings::from_toml_str(BASIC_TOML).unwrap();

        assert_eq!(settings.organizer, "itnog");
        assert_eq!(settings.question_mapping.asn.as_deref(), Some("asn"));
        assert_eq!(settings.api_keys.len(), 2);
        assert!(!settings.api_keys[0].privileged);
        assert!(settings.api_keys[1].privileged);
        assert_eq!(settings.bind_addr(), "127.0.0.1:8000".parse().unwrap());
        assert_eq!(settings.log_level, LogLevel::Info);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PRETINO_TEST_SUBSTITUTED_TOKEN", "from-env");

        let content = BASIC_TOML.replace("secret-token", "${PRETINO_TEST_SUBSTITUTED_TOKEN}");
        let settings = Settings::from_toml_str(&content).unwrap();
        assert_eq!(settings.api_token, "from-env");

        std::env::remove_var("PRETINO_TEST_SUBSTITUTED_TOKEN");
    }

    #[test]
    fn test_unset_env_var_reference_is_rejected() {
        std::env::remove_var("PRETINO_TEST_UNSET_STAFF_KEY");

        let content = BASIC_TOML.replace("\"staff\"", "\"${PRETINO_TEST_UNSET_STAFF_KEY}\"");

        match Settings::from_toml_str(&content) {
            Err(GatewayError::MissingConfigError { field }) => {
                assert_eq!(field, "PRETINO_TEST_UNSET_STAFF_KEY")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_field_fails_to_parse() {
        let content = BASIC_TOML.replace("organizer = \"itnog\"", "");
        assert!(matches!(
            Settings::from_toml_str(&content),
            Err(GatewayError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_duplicate_question_identifiers_are_rejected() {
        let content = BASIC_TOML.replace("asn = \"asn\"", "asn = \"company\"");
        let settings = Settings::from_toml_str(&content).unwrap();

        assert!(matches!(
            settings.validate(),
            Err(GatewayError::InvalidConfigValueError { ref field, .. }) if field == "question_mapping"
        ));
    }

    #[test]
    fn test_config_validation_rejects_bad_base_url() {
        let content = format!("base_url = \"not-a-url\"\n{}", BASIC_TOML);
        let settings = Settings::from_toml_str(&content).unwrap();

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_zero_timeout() {
        let content = format!("request_timeout_seconds = 0\n{}", BASIC_TOML);
        let settings = Settings::from_toml_str(&content).unwrap();

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_TOML.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.event_name, "itnog9");
    }

    #[test]
    fn test_settings_from_lookup() {
        let lookup = lookup_from(&[
            ("PRETINO_ORGANIZER", "itnog"),
            ("PRETINO_EVENT_NAME", "itnog9"),
            ("PRETINO_API_TOKEN", "secret-token"),
            ("PRETINO_QUESTION_MAPPING", r#"{"company": "q1", "asn": "q2"}"#),
            ("PRETINO_HOST", "::1"),
            ("PRETINO_PORT", "9000"),
            ("PRETINO_LOGLEVEL", "debug"),
            ("PRETINO_API_KEYS", r#"[{"key": "k1"}, {"key": "k2", "privileged": true}]"#),
        ]);

        let settings = Settings::from_lookup(lookup).unwrap();

        assert_eq!(settings.bind_addr(), "[::1]:9000".parse().unwrap());
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.question_mapping.company.as_deref(), Some("q1"));
        assert!(settings.question_mapping.job_title.is_none());
        assert!(settings.api_keys[1].privileged);
        assert_eq!(settings.request_timeout_seconds, 30);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_from_lookup_reports_missing_variable() {
        let lookup = lookup_from(&[("PRETINO_ORGANIZER", "itnog")]);

        match Settings::from_lookup(lookup) {
            Err(GatewayError::MissingConfigError { field }) => {
                assert_eq!(field, "PRETINO_EVENT_NAME")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_settings_from_lookup_rejects_malformed_mapping() {
        let lookup = lookup_from(&[
            ("PRETINO_ORGANIZER", "itnog"),
            ("PRETINO_EVENT_NAME", "itnog9"),
            ("PRETINO_API_TOKEN", "secret-token"),
            ("PRETINO_QUESTION_MAPPING", "company=q1"),
        ]);

        assert!(matches!(
            Settings::from_lookup(lookup),
            Err(GatewayError::InvalidConfigValueError { .. })
        ));
    }
}
