use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Accepts RFC 3339 timestamps and offset-less ones (read as UTC)
///
/// The session service emits naive `datetime` values such as
/// `2024-05-01T12:00:00.123456`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    raw.parse::<NaiveDateTime>()
        .map(|naive| Some(naive.and_utc()))
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
}

/// One entry of a session conversation
///
/// This is also the payload exchanged over the session socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub is_answer: bool,
}

impl Message {
    pub fn question(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            is_answer: false,
        }
    }

    pub fn answer(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            is_answer: true,
        }
    }
}

/// Full session including its messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: Vec<Message>,
}

/// Session summary without messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDto {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_timestamp: Option<DateTime<Utc>>,
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPublic {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
}
