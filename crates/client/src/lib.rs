//! REST client for the door-access backend.
//!
//! [`AdminApi`] wraps every endpoint the administration console calls,
//! keeps the admin session cookie, normalises error bodies into
//! [`ApiError`], and raises the process-wide [`AuthSignal`] whenever the
//! backend answers `401`.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

mod admins;
mod binding;
mod cards;
mod door;
mod session;
mod users;

pub use admins::DEFAULT_LOG_LIMIT;
pub use api::AdminApi;
pub use auth::{AuthSignal, AuthState};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
