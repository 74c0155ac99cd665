use chatlens::session::{ChatMessage, ChatSession};
use chatlens::storage::SqliteStorage;
use chrono::{TimeZone, Utc};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SqliteStorage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("history.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Epoch milliseconds for a UTC wall-clock time
#[allow(dead_code)]
pub fn utc_millis(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .expect("valid UTC time")
        .timestamp_millis()
}

/// Session whose messages sit at the given instants, alternating user/assistant
#[allow(dead_code)]
pub fn session_at(id: &str, created_at: i64, updated_at: i64, stamps: &[i64]) -> ChatSession {
    let mut session = ChatSession::with_id(id, created_at);
    for (i, stamp) in stamps.iter().enumerate() {
        let message = if i % 2 == 0 {
            ChatMessage::user(format!("question {}", i), *stamp)
        } else {
            ChatMessage::assistant(format!("answer number {}", i), *stamp)
        };
        session.messages.push(message);
    }
    session.updated_at = updated_at;
    session
}
