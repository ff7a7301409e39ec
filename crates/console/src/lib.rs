//! View models for the administration console.
//!
//! Each view owns the records it last loaded from the backend, filters them
//! locally, and reloads after every successful mutation. Nothing is updated
//! optimistically: local state only changes through `load()`.

pub mod admins;
pub mod cards;
pub mod door;
pub mod error;
pub mod list;
pub mod logs;
pub mod notice;
pub mod session;
pub mod users;

pub use admins::AdminsView;
pub use cards::CardsView;
pub use door::DoorView;
pub use error::ViewError;
pub use list::{ListState, LoadState, Record};
pub use logs::LogsView;
pub use notice::{Notice, NoticeLevel};
pub use session::SessionView;
pub use users::UsersView;
