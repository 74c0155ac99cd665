//! Chat session data model
//!
//! Sessions and messages are stored and exchanged in the same JSON shape the
//! chat front end keeps in local storage: camelCase keys, lowercase roles and
//! epoch-millisecond instants.

use crate::metrics::count_words;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user
    User,
    /// Reply produced by the assistant
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn in a chat session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message
    pub role: Role,
    /// Raw (markdown) message text
    pub content: String,
    /// When the message was posted, in epoch milliseconds
    pub timestamp: i64,
}

impl ChatMessage {
    /// Create a user message posted at `timestamp` (epoch ms)
    ///
    /// # Examples
    ///
    /// ```
    /// use chatlens::session::{ChatMessage, Role};
    ///
    /// let msg = ChatMessage::user("Hello there", 1_700_000_000_000);
    /// assert_eq!(msg.role, Role::User);
    /// assert_eq!(msg.word_count(), 2);
    /// ```
    pub fn user(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
        }
    }

    /// Create an assistant message posted at `timestamp` (epoch ms)
    pub fn assistant(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp,
        }
    }

    /// Number of whitespace-delimited words in the content
    pub fn word_count(&self) -> usize {
        count_words(&self.content)
    }
}

/// One continuous conversation
///
/// `created_at <= updated_at` is assumed but not enforced. Messages are kept in
/// insertion order and are never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier
    pub id: String,
    /// Messages in the order they were posted
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Creation instant, epoch milliseconds
    pub created_at: i64,
    /// Last update instant, epoch milliseconds
    pub updated_at: i64,
}

impl ChatSession {
    /// Start an empty session with a fresh v4 UUID, stamped with the current time
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self::with_id(uuid::Uuid::new_v4().to_string(), now)
    }

    /// Build an empty session with a known id and creation instant
    pub fn with_id(id: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Append a message, advancing `updated_at` when the message is newer
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = self.updated_at.max(message.timestamp);
        self.messages.push(message);
    }

    /// Whether the session holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Session length in minutes, only defined once the session has messages
    ///
    /// # Examples
    ///
    /// ```
    /// use chatlens::session::{ChatMessage, ChatSession};
    ///
    /// let mut session = ChatSession::with_id("s1", 0);
    /// assert_eq!(session.duration_minutes(), None);
    ///
    /// session.push(ChatMessage::user("hi", 90_000));
    /// assert_eq!(session.duration_minutes(), Some(1.5));
    /// ```
    pub fn duration_minutes(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some((self.updated_at as f64 - self.created_at as f64) / 60_000.0)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable view of every session at the moment a computation begins
///
/// Cloning is cheap and shares the underlying sessions. Two snapshots are the
/// "same" only when they share storage, which is what the metrics binding uses
/// to decide whether a recomputation is needed.
#[derive(Debug, Clone)]
pub struct Snapshot(Arc<[ChatSession]>);

impl Snapshot {
    /// Wrap a collection of sessions
    pub fn new(sessions: Vec<ChatSession>) -> Self {
        Self(Arc::from(sessions))
    }

    /// Whether both snapshots point at the same session storage
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Borrow the sessions
    pub fn sessions(&self) -> &[ChatSession] {
        &self.0
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<ChatSession>> for Snapshot {
    fn from(sessions: Vec<ChatSession>) -> Self {
        Self::new(sessions)
    }
}

impl Deref for Snapshot {
    type Target = [ChatSession];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
