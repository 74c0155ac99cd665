//! Aggregation routines over a session snapshot
//!
//! Every routine is a total function of the session slice: an empty slice (or
//! a slice with no messages) yields the documented zero value, never an error.
//! Time-based routines take the zone that "local time" means for the caller.
//!
//! Ties in the most-active hour resolve to the lowest hour, and ties in the
//! most-active day resolve to the earliest weekday counting from Sunday.

use super::DailyCount;
use crate::session::{ChatMessage, ChatSession, Role};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike};
use std::collections::BTreeMap;

/// Weekday names indexed by days from Sunday
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Sentinel returned by [`calculate_most_active_day`] when there are no messages
pub const NO_ACTIVE_DAY: &str = "N/A";

/// Label format for [`calculate_messages_over_time`], e.g. `Jan 1, 2025`
pub const DAY_LABEL_FORMAT: &str = "%b %-d, %Y";

/// Count whitespace-delimited words after trimming
///
/// Runs of whitespace collapse to one separator and empty tokens are ignored.
///
/// # Examples
///
/// ```
/// use chatlens::metrics::count_words;
///
/// assert_eq!(count_words("  a   b "), 2);
/// assert_eq!(count_words("a b"), 2);
/// assert_eq!(count_words("   "), 0);
/// ```
pub fn count_words(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Round half away from zero at `places` decimal places, keeping the value numeric
///
/// # Examples
///
/// ```
/// use chatlens::metrics::round_to;
///
/// assert_eq!(round_to(1.25, 1), 1.3);
/// assert_eq!(round_to(1.666, 1), 1.7);
/// assert_eq!(round_to(2.5, 0), 3.0);
/// ```
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Convert an epoch-millisecond timestamp into the given zone
///
/// Returns `None` when the instant is outside chrono's representable range.
pub fn to_zoned<Tz: TimeZone>(tz: &Tz, timestamp: i64) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(timestamp).single()
}

fn all_messages(sessions: &[ChatSession]) -> impl Iterator<Item = &ChatMessage> {
    sessions.iter().flat_map(|session| session.messages.iter())
}

/// Iterate the zoned instant of every message, skipping unrepresentable ones
fn zoned_messages<'a, Tz: TimeZone + 'a>(
    sessions: &'a [ChatSession],
    tz: &'a Tz,
) -> impl Iterator<Item = DateTime<Tz>> + 'a {
    sessions.iter().flat_map(move |session| {
        session.messages.iter().filter_map(move |message| {
            let zoned = to_zoned(tz, message.timestamp);
            if zoned.is_none() {
                tracing::warn!(
                    session_id = %session.id,
                    timestamp = message.timestamp,
                    "Skipping message with unrepresentable timestamp"
                );
            }
            zoned
        })
    })
}

fn average_words<'a>(messages: impl Iterator<Item = &'a ChatMessage>) -> u64 {
    let (count, words) = messages.fold((0usize, 0usize), |(count, words), message| {
        (count + 1, words + message.word_count())
    });
    if count == 0 {
        return 0;
    }
    (words as f64 / count as f64).round() as u64
}

/// Index of the first strictly-largest non-zero bucket, scanning from index 0
fn busiest_bucket(counts: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    let mut best_count = 0;
    for (index, &count) in counts.iter().enumerate() {
        if count > best_count {
            best_count = count;
            best = Some(index);
        }
    }
    best
}

/// Total number of messages across all sessions
pub fn calculate_total_messages(sessions: &[ChatSession]) -> usize {
    sessions.iter().map(|session| session.messages.len()).sum()
}

/// Total number of sessions
pub fn calculate_total_sessions(sessions: &[ChatSession]) -> usize {
    sessions.len()
}

/// Messages per session, rounded to one decimal
pub fn calculate_avg_messages_per_session(sessions: &[ChatSession]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let total = calculate_total_messages(sessions) as f64;
    round_to(total / sessions.len() as f64, 1)
}

/// Mean session duration in minutes, rounded to one decimal
///
/// Only sessions holding at least one message take part; when none do the
/// result is 0.
pub fn calculate_avg_session_duration(sessions: &[ChatSession]) -> f64 {
    let durations: Vec<f64> = sessions
        .iter()
        .filter_map(ChatSession::duration_minutes)
        .collect();

    if durations.is_empty() {
        return 0.0;
    }

    let mean = durations.iter().sum::<f64>() / durations.len() as f64;
    round_to(mean, 1)
}

/// Mean word count over every message, rounded to the nearest integer
pub fn calculate_avg_word_count(sessions: &[ChatSession]) -> u64 {
    average_words(all_messages(sessions))
}

/// Mean word count over assistant messages only, rounded to the nearest integer
pub fn calculate_avg_response_length(sessions: &[ChatSession]) -> u64 {
    average_words(all_messages(sessions).filter(|message| message.role == Role::Assistant))
}

/// Message counts per calendar day in `tz`, ascending by date
pub fn calculate_messages_over_time<Tz: TimeZone>(
    sessions: &[ChatSession],
    tz: &Tz,
) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for zoned in zoned_messages(sessions, tz) {
        *per_day.entry(zoned.date_naive()).or_insert(0) += 1;
    }

    per_day
        .into_iter()
        .map(|(day, count)| DailyCount {
            date: day.format(DAY_LABEL_FORMAT).to_string(),
            count,
        })
        .collect()
}

/// Hour of day (0-23) in `tz` with the most messages; 0 when there are none
pub fn calculate_most_active_hour<Tz: TimeZone>(sessions: &[ChatSession], tz: &Tz) -> u32 {
    let mut counts = [0usize; 24];
    for zoned in zoned_messages(sessions, tz) {
        counts[zoned.hour() as usize] += 1;
    }
    busiest_bucket(&counts).map_or(0, |hour| hour as u32)
}

/// Weekday name in `tz` with the most messages; `"N/A"` when there are none
pub fn calculate_most_active_day<Tz: TimeZone>(sessions: &[ChatSession], tz: &Tz) -> String {
    let mut counts = [0usize; 7];
    for zoned in zoned_messages(sessions, tz) {
        counts[zoned.weekday().num_days_from_sunday() as usize] += 1;
    }
    busiest_bucket(&counts)
        .map_or(NO_ACTIVE_DAY, |day| DAY_NAMES[day])
        .to_string()
}
