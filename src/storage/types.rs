use crate::session::{ChatSession, Role};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Longest preview kept for list views, in characters
pub const PREVIEW_CHARS: usize = 40;

/// Listing entry for a stored chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique identifier for the session
    pub id: String,
    /// Opening user message, shortened for display
    pub preview: String,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session was last updated
    pub updated_at: DateTime<Utc>,
    /// Number of messages in the session
    pub message_count: usize,
}

impl SessionSummary {
    /// Summarise a session for listing
    pub fn from_session(session: &ChatSession) -> Self {
        let preview = session
            .messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| shorten(&m.content))
            .unwrap_or_default();

        Self {
            id: session.id.clone(),
            preview,
            created_at: millis_to_utc(session.created_at),
            updated_at: millis_to_utc(session.updated_at),
            message_count: session.messages.len(),
        }
    }
}

/// Epoch milliseconds to a UTC instant, clamping unrepresentable values to the epoch
pub fn millis_to_utc(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn shorten(content: &str) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}
