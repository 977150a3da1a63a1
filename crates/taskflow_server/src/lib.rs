//! HTTP surface for TaskFlow.
//!
//! # Responsibility
//! - Expose the task and auth use-cases as a JSON REST API.
//! - Resolve bearer tokens to callers before any task handler runs.
//! - Convert every failure into the uniform `{success:false, message}`
//!   envelope.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, Database};
