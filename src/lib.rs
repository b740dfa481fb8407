pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::{build_state, create_router, start_server, AppState};
pub use config::Settings;
pub use core::{auth::KeyAuthorizer, ingest::OrderIngester, source::PretixOrderSource};
pub use utils::error::{GatewayError, IngestError, Result};
