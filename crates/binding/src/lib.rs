//! Scan-to-bind session for RFID cards.
//!
//! An administrator asks the backend to open a binding window for a
//! subject, then the console polls the backend while a countdown runs,
//! until the backend reports a new card, the budget runs out, or a
//! request fails.
//!
//! - [`machine::BindingMachine`] -- the synchronous state machine. Every
//!   transition, including timer ticks, goes through it.
//! - [`controller::BindingController`] -- one per console tab; spawns the
//!   tokio task that owns the poll and countdown timers and publishes
//!   [`BindingSnapshot`]s.
//! - [`backend::BindingBackend`] -- the two REST calls the session needs,
//!   implemented for [`doorctl_client::AdminApi`].

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod machine;
pub mod state;

pub use backend::{BindRequest, BindTarget, BindingBackend};
pub use config::BindingConfig;
pub use controller::{BindingController, SessionId};
pub use error::BindingError;
pub use state::{BindingOutcome, BindingSnapshot, BindingState};
