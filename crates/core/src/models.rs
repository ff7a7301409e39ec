//! Records returned by the access-control backend and the form inputs
//! sent back to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::search::Searchable;
use crate::types::{lenient_timestamp, opt_string_or_number, string_or_number, EntityId, Timestamp};

fn default_active() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Personnel
// ---------------------------------------------------------------------------

/// A person who may hold one or more RFID cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "string_or_number")]
    pub id: EntityId,
    /// Stable personnel number; the subject id used by card binding.
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub card_count: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.student_id.as_str(), self.name.as_str()];
        fields.extend(self.email.as_deref());
        fields.extend(self.telegram_id.as_deref());
        fields
    }
}

/// Form payload for `POST /admin/users`.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub telegram_id: Option<String>,
}

/// Form payload for `PUT /admin/users/{id}`.
///
/// `student_id` and `name` are always sent; the backend requires both.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub telegram_id: Option<String>,
    pub is_active: Option<bool>,
}

impl UserUpdate {
    /// Start an update from an existing record, leaving optional fields unset.
    pub fn from_user(user: &User) -> Self {
        Self {
            student_id: user.student_id.clone(),
            name: user.name.clone(),
            ..Default::default()
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = Some(active);
        self
    }
}

/// Form payload for `POST /register`: create a person and immediately
/// start binding their first card.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
    pub telegram_id: Option<String>,
    pub nickname: Option<String>,
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// An RFID card bound to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(deserialize_with = "string_or_number")]
    pub id: EntityId,
    pub rfid_uid: String,
    #[serde(default)]
    pub nickname: Option<String>,
    /// Absent when listing the cards of a single user.
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub user_id: Option<EntityId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

impl Searchable for Card {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.rfid_uid.as_str()];
        fields.extend(self.nickname.as_deref());
        fields.extend(self.user_id.as_deref());
        fields
    }
}

/// Form payload for `POST /admin/cards` (manual registration by UID).
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub user_id: EntityId,
    pub rfid_uid: String,
    pub nickname: Option<String>,
}

/// Partial update for `PUT /admin/cards/{id}`. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub nickname: Option<String>,
    pub is_active: Option<bool>,
}

impl CardUpdate {
    pub fn rename(nickname: impl Into<String>) -> Self {
        Self {
            nickname: Some(nickname.into()),
            is_active: None,
        }
    }

    pub fn active(active: bool) -> Self {
        Self {
            nickname: None,
            is_active: Some(active),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.is_active.is_none()
    }
}

// ---------------------------------------------------------------------------
// Administrators
// ---------------------------------------------------------------------------

/// A dashboard administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(deserialize_with = "string_or_number")]
    pub id: EntityId,
    pub username: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

impl Searchable for Admin {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.username.as_str(), self.name.as_str()]
    }
}

/// Form payload for `POST /admin/admins`.
#[derive(Debug, Clone, Default)]
pub struct NewAdmin {
    pub username: String,
    pub password: String,
    pub name: String,
}

/// The administrator behind the current session cookie (`GET /me`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl CurrentAdmin {
    /// Best human-readable label for the session owner.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("administrator")
    }
}

// ---------------------------------------------------------------------------
// Access logs
// ---------------------------------------------------------------------------

/// What an access log entry records.
///
/// Actions the console does not know are kept verbatim so they still show
/// up in the log and in searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccessAction {
    Entry,
    Bind,
    Register,
    Other(String),
}

impl AccessAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Entry => "entry",
            Self::Bind => "bind",
            Self::Register => "register",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for AccessAction {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "entry" => Self::Entry,
            "bind" => Self::Bind,
            "register" => Self::Register,
            _ => Self::Other(raw),
        }
    }
}

impl From<AccessAction> for String {
    fn from(action: AccessAction) -> Self {
        match action {
            AccessAction::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// One row of the door access log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLog {
    #[serde(deserialize_with = "string_or_number")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub user_id: Option<EntityId>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub rfid_uid: Option<String>,
    pub action: AccessAction,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<Timestamp>,
}

impl Searchable for AccessLog {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.action.as_str()];
        fields.extend(self.user_name.as_deref());
        fields.extend(self.student_id.as_deref());
        fields.extend(self.rfid_uid.as_deref());
        fields
    }
}

// ---------------------------------------------------------------------------
// Door
// ---------------------------------------------------------------------------

/// Door lock operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// Locked; opens on an authorised card or a remote unlock.
    Normal,
    /// Held open.
    Unlocked,
    /// Held locked; cards are refused.
    Locked,
    #[serde(other)]
    Unknown,
}

impl LockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Unlocked => "unlocked",
            Self::Locked => "locked",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "unlocked" => Ok(Self::Unlocked),
            "locked" => Ok(Self::Locked),
            other => Err(format!(
                "Unknown lock mode '{other}' (expected normal, unlocked or locked)"
            )),
        }
    }
}

/// Response of `GET /admin/door/status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoorStatus {
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub lock_mode: Option<LockMode>,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// Response of `GET /check_status/{subject_id}`, polled while a card
/// binding is awaiting scans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingStatus {
    pub bound: bool,
    #[serde(default)]
    pub binding_in_progress: Option<bool>,
    #[serde(default)]
    pub card_count: Option<u32>,
    #[serde(default)]
    pub initial_count: Option<u32>,
    #[serde(default)]
    pub step: Option<u32>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Generic `{message?, detail?}` acknowledgement returned by mutations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}
