pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{create_router, ApiKey, AppState, API_KEY_HEADER};
pub use server::{build_state, start_server};
