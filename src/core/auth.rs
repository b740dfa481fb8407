use crate::core::{ApiKeyRecord, ConfigProvider};

/// Outcome of checking a presented key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Authorization {
    pub authorized: bool,
    pub privileged: bool,
}

impl Authorization {
    pub const DENIED: Authorization = Authorization {
        authorized: false,
        privileged: false,
    };
}

/// Checks caller keys against the configured records.
#[derive(Debug, Clone, Default)]
pub struct KeyAuthorizer {
    records: Vec<ApiKeyRecord>,
}

impl KeyAuthorizer {
    pub fn new(records: Vec<ApiKeyRecord>) -> Self {
        Self { records }
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self::new(config.api_keys().to_vec())
    }

    /// Exact, case-sensitive comparison. First match wins when a key is
    /// configured more than once.
    pub fn authorize(&self, presented_key: &str) -> Authorization {
        self.records
            .iter()
            .find(|record| record.key == presented_key)
            .map(|record| Authorization {
                authorized: true,
                privileged: record.privileged,
            })
            .unwrap_or(Authorization::DENIED)
    }
}
