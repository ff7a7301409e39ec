//! Identifier and timestamp types plus the lenient deserializers the
//! backend payloads need.
//!
//! The access-control backend mixes UUID string keys (users, cards,
//! admins) with integer keys (access logs), and emits timestamps either
//! with or without a UTC offset depending on the column type.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Backend primary keys, normalised to strings.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = DateTime<Utc>;

/// Accept either a JSON string or a JSON integer as an [`EntityId`].
pub fn string_or_number<'de, D>(deserializer: D) -> Result<EntityId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Like [`string_or_number`] but for optional foreign keys.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<EntityId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(
        Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }),
    )
}

/// Parse an ISO-8601 timestamp that may or may not carry an offset.
///
/// Offset-less values are interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive columns serialise without an offset.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Deserialize an optional timestamp, mapping unparseable values to `None`.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
