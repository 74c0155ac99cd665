//! Engagement metrics derived from chat history
//!
//! The [`Metrics`] record is a disposable projection of a session snapshot:
//! it is recomputed wholesale on every call and never patched incrementally.
//!
//! # Examples
//!
//! ```
//! use chatlens::metrics::{MetricsCalculator, ReportZone};
//! use chatlens::session::{ChatMessage, ChatSession};
//!
//! let mut session = ChatSession::with_id("s1", 0);
//! session.push(ChatMessage::user("How are you?", 60_000));
//! session.push(ChatMessage::assistant("Fine, thanks.", 120_000));
//!
//! let calculator = MetricsCalculator::new(ReportZone::utc());
//! let metrics = calculator.compute(&[session]).unwrap();
//! assert_eq!(metrics.total_messages, 2);
//! assert_eq!(metrics.avg_session_duration, 2.0);
//! ```

pub mod binding;
pub mod calculator;

pub use binding::{MetricsBinding, MetricsState};
pub use calculator::{
    calculate_avg_messages_per_session, calculate_avg_response_length,
    calculate_avg_session_duration, calculate_avg_word_count, calculate_messages_over_time,
    calculate_most_active_day, calculate_most_active_hour, calculate_total_messages,
    calculate_total_sessions, count_words, round_to, DAY_NAMES, NO_ACTIVE_DAY,
};

use crate::error::{ChatlensError, Result};
use crate::session::ChatSession;
use chrono::{FixedOffset, Local, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of messages posted on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Day label such as `Jan 1, 2025`
    pub date: String,
    /// Messages posted that day
    pub count: usize,
}

/// Fixed-shape output of one aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    // Engagement
    pub total_messages: usize,
    pub total_sessions: usize,
    /// One decimal place
    pub avg_messages_per_session: f64,
    /// Minutes, one decimal place
    pub avg_session_duration: f64,

    // Content
    pub avg_word_count: u64,
    /// Average word count of assistant messages
    pub avg_response_length: u64,

    // Activity
    /// Ascending by date
    pub messages_over_time: Vec<DailyCount>,
    /// 0-23
    pub most_active_hour: u32,
    /// Weekday name or `N/A`
    pub most_active_day: String,
}

/// Time zone used for hour/day grouping
///
/// Parses from `local`, `utc`, or a fixed offset such as `+02:00`, `-0530` or `+9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportZone {
    /// The machine's local zone, daylight saving included
    #[default]
    Local,
    /// A fixed UTC offset
    Fixed(FixedOffset),
}

impl ReportZone {
    /// UTC as a fixed zone
    pub fn utc() -> Self {
        ReportZone::Fixed(Utc.fix())
    }

    /// Format an epoch-millisecond instant as wall-clock time in this zone
    pub fn format_millis(&self, millis: i64, fmt: &str) -> String {
        let instant = crate::storage::types::millis_to_utc(millis);
        match self {
            ReportZone::Local => instant.with_timezone(&Local).format(fmt).to_string(),
            ReportZone::Fixed(offset) => instant.with_timezone(offset).format(fmt).to_string(),
        }
    }
}

impl FromStr for ReportZone {
    type Err = ChatlensError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "local" => return Ok(ReportZone::Local),
            "utc" | "z" => return Ok(ReportZone::utc()),
            _ => {}
        }

        let invalid = || ChatlensError::Config(format!("Invalid timezone: {}", s));

        let (sign, rest) = match trimmed.chars().next() {
            Some('+') => (1, &trimmed[1..]),
            Some('-') => (-1, &trimmed[1..]),
            _ => return Err(invalid()),
        };

        let (hours, minutes) = match rest.split_once(':') {
            Some((h, m)) => (h, m),
            None if rest.len() == 4 && rest.is_ascii() => rest.split_at(2),
            None => (rest, "0"),
        };

        let hours: i32 = hours.parse().map_err(|_| invalid())?;
        let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(ReportZone::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for ReportZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportZone::Local => write!(f, "local"),
            ReportZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Runs every aggregation routine over a snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsCalculator {
    zone: ReportZone,
}

impl MetricsCalculator {
    /// Create a calculator grouping activity in `zone`
    pub fn new(zone: ReportZone) -> Self {
        Self { zone }
    }

    /// Calculator using the machine's local zone
    pub fn local() -> Self {
        Self::new(ReportZone::Local)
    }

    /// Zone used for hour/day grouping
    pub fn zone(&self) -> ReportZone {
        self.zone
    }

    /// Compute the full metrics record
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::MalformedSession`] when a message timestamp cannot
    /// be placed on the calendar in this calculator's zone.
    pub fn compute(&self, sessions: &[ChatSession]) -> Result<Metrics> {
        match self.zone {
            ReportZone::Local => compute_in(sessions, &Local),
            ReportZone::Fixed(offset) => compute_in(sessions, &offset),
        }
    }
}

fn validate<Tz: TimeZone>(sessions: &[ChatSession], tz: &Tz) -> Result<()> {
    for session in sessions {
        for message in &session.messages {
            if calculator::to_zoned(tz, message.timestamp).is_none() {
                return Err(ChatlensError::MalformedSession {
                    session_id: session.id.clone(),
                    message: format!("timestamp {} is out of range", message.timestamp),
                }
                .into());
            }
        }
    }
    Ok(())
}

fn compute_in<Tz: TimeZone>(sessions: &[ChatSession], tz: &Tz) -> Result<Metrics> {
    validate(sessions, tz)?;

    let metrics = Metrics {
        total_messages: calculate_total_messages(sessions),
        total_sessions: calculate_total_sessions(sessions),
        avg_messages_per_session: calculate_avg_messages_per_session(sessions),
        avg_session_duration: calculate_avg_session_duration(sessions),
        avg_word_count: calculate_avg_word_count(sessions),
        avg_response_length: calculate_avg_response_length(sessions),
        messages_over_time: calculate_messages_over_time(sessions, tz),
        most_active_hour: calculate_most_active_hour(sessions, tz),
        most_active_day: calculate_most_active_day(sessions, tz),
    };

    tracing::debug!(
        sessions = metrics.total_sessions,
        messages = metrics.total_messages,
        days = metrics.messages_over_time.len(),
        "Computed metrics"
    );

    Ok(metrics)
}
