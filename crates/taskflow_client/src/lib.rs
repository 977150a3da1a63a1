//! Dashboard client for the TaskFlow API.
//!
//! Sign in with [`TaskflowClient::login`] or [`TaskflowClient::register`] to
//! get a [`Session`], pass it to every task call, and hand it back to
//! [`TaskflowClient::logout`] when done.

pub mod client;
pub mod dashboard;
pub mod error;
pub mod session;

pub use client::TaskflowClient;
pub use dashboard::{Dashboard, DashboardFilter, DashboardStats};
pub use error::ClientError;
pub use session::Session;
