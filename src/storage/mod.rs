use crate::error::{ChatlensError, Result};
use crate::session::{ChatMessage, ChatSession, Snapshot};
use anyhow::Context;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub mod types;
pub use types::SessionSummary;

/// Environment variable overriding the history database location
pub const HISTORY_DB_ENV: &str = "CHATLENS_HISTORY_DB";

/// Accepted shapes for a JSON session export
#[derive(Deserialize)]
#[serde(untagged)]
enum SessionExport {
    Bare(Vec<ChatSession>),
    Wrapped { sessions: Vec<ChatSession> },
}

/// Storage backend for chat history
pub struct SqliteStorage {
    db_path: PathBuf,
}

impl SqliteStorage {
    /// Create a new storage instance
    ///
    /// Initializes the database file in the user's data directory, unless
    /// `CHATLENS_HISTORY_DB` points elsewhere.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(HISTORY_DB_ENV) {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("dev", "chatlens", "chatlens")
            .ok_or_else(|| ChatlensError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("history.db"))
    }

    /// Create a new storage instance that uses the specified database path.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatlens::storage::SqliteStorage;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let storage = SqliteStorage::new_with_path(dir.path().join("history.db")).unwrap();
    /// assert!(storage.list_sessions().unwrap().is_empty());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| ChatlensError::Storage(e.to_string()))?;
        }

        let storage = Self { db_path };
        storage.init()?;
        tracing::debug!(path = %storage.db_path.display(), "Opened session storage");
        Ok(storage)
    }

    /// Location of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| ChatlensError::Storage(e.to_string()))?;
        Ok(conn)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                messages JSON NOT NULL
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| ChatlensError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Save or update a session
    ///
    /// An existing row keeps its original `created_at`.
    pub fn save_session(&self, session: &ChatSession) -> Result<()> {
        self.save_sessions(std::slice::from_ref(session))?;
        Ok(())
    }

    /// Save or update several sessions in one transaction, returning how many were written
    pub fn save_sessions(&self, sessions: &[ChatSession]) -> Result<usize> {
        let mut conn = self.open()?;

        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| ChatlensError::Storage(e.to_string()))?;

        for session in sessions {
            upsert(&tx, session)?;
        }

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| ChatlensError::Storage(e.to_string()))?;

        Ok(sessions.len())
    }

    /// Load a session by exact ID, falling back to a unique ID prefix
    ///
    /// # Errors
    ///
    /// Returns [`ChatlensError::NotFound`] for a blank id and
    /// [`ChatlensError::AmbiguousId`] when a prefix matches several sessions.
    pub fn load_session(&self, id: &str) -> Result<Option<ChatSession>> {
        let conn = self.open()?;

        let Some(id) = resolve_id(&conn, id)? else {
            return Ok(None);
        };

        let (id, created_at, updated_at, messages_json) = conn
            .query_row(
                "SELECT id, created_at, updated_at, messages FROM sessions WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .context("Failed to query session")
            .map_err(|e| ChatlensError::Storage(e.to_string()))?;

        decode_session(id, created_at, updated_at, &messages_json).map(Some)
    }

    /// List all stored sessions, most recently updated first
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let sessions = self.load_all("ORDER BY updated_at DESC")?;
        Ok(sessions.iter().map(SessionSummary::from_session).collect())
    }

    /// Every stored session, oldest first, as an immutable snapshot
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(self.load_all("ORDER BY created_at ASC")?))
    }

    fn load_all(&self, order_by: &str) -> Result<Vec<ChatSession>> {
        let conn = self.open()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, created_at, updated_at, messages FROM sessions {}",
                order_by
            ))
            .context("Failed to prepare statement")
            .map_err(|e| ChatlensError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .context("Failed to query sessions")
            .map_err(|e| ChatlensError::Storage(e.to_string()))?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, created_at, updated_at, messages_json) = row
                .context("Failed to read session row")
                .map_err(|e| ChatlensError::Storage(e.to_string()))?;
            sessions.push(decode_session(id, created_at, updated_at, &messages_json)?);
        }

        Ok(sessions)
    }

    /// Delete a session by exact ID or unique ID prefix, returning rows removed
    ///
    /// # Errors
    ///
    /// Same as [`load_session`](Self::load_session); nothing is deleted on error.
    pub fn delete_session(&self, id: &str) -> Result<usize> {
        let conn = self.open()?;

        let Some(resolved) = resolve_id(&conn, id)? else {
            tracing::debug!(id, "No session to delete");
            return Ok(0);
        };

        let removed = conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![resolved])
            .context("Failed to delete session")
            .map_err(|e| ChatlensError::Storage(e.to_string()))?;

        tracing::debug!(id = %resolved, removed, "Deleted session");
        Ok(removed)
    }

    /// Import sessions from a JSON export, returning how many were stored
    ///
    /// Accepts either a bare array of sessions or an object with a `sessions` array.
    pub fn import_json<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let sessions = read_export(path)?;
        let count = self.save_sessions(&sessions)?;
        tracing::info!(count, path = %path.display(), "Imported sessions");
        Ok(count)
    }

    /// Write every stored session to `path` as a JSON array, returning how many were written
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string_pretty(snapshot.sessions())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
        tracing::info!(count = snapshot.len(), path = %path.display(), "Exported sessions");
        Ok(snapshot.len())
    }
}

/// Read sessions from a JSON export file without touching the database
pub fn read_export(path: &Path) -> Result<Vec<ChatSession>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let export: SessionExport = serde_json::from_str(&contents).map_err(|e| {
        ChatlensError::Import(format!("{} is not a session export: {}", path.display(), e))
    })?;

    Ok(match export {
        SessionExport::Bare(sessions) => sessions,
        SessionExport::Wrapped { sessions } => sessions,
    })
}

/// Map a user-supplied id to a stored one
///
/// An exact match always wins. Otherwise the id is taken as a literal,
/// case-sensitive prefix that must match exactly one session.
fn resolve_id(conn: &Connection, id: &str) -> Result<Option<String>> {
    if id.trim().is_empty() {
        return Err(ChatlensError::NotFound("empty session id".to_string()).into());
    }

    let exact: Option<String> = conn
        .query_row(
            "SELECT id FROM sessions WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to query session")
        .map_err(|e| ChatlensError::Storage(e.to_string()))?;
    if exact.is_some() {
        return Ok(exact);
    }

    // substr comparison keeps `%` and `_` literal and stays case-sensitive
    let mut stmt = conn
        .prepare("SELECT id FROM sessions WHERE substr(id, 1, length(?1)) = ?1")
        .context("Failed to prepare statement")
        .map_err(|e| ChatlensError::Storage(e.to_string()))?;

    let mut matches = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))
        .context("Failed to query sessions")
        .map_err(|e| ChatlensError::Storage(e.to_string()))?
        .collect::<rusqlite::Result<Vec<String>>>()
        .context("Failed to read session row")
        .map_err(|e| ChatlensError::Storage(e.to_string()))?;

    match matches.len() {
        0 | 1 => Ok(matches.pop()),
        count => Err(ChatlensError::AmbiguousId {
            prefix: id.to_string(),
            count,
        }
        .into()),
    }
}

fn upsert(tx: &Transaction<'_>, session: &ChatSession) -> Result<()> {
    let messages_json = serde_json::to_string(&session.messages)
        .context("Failed to serialize messages")
        .map_err(|e| ChatlensError::Storage(e.to_string()))?;

    tx.execute(
        "INSERT INTO sessions (id, created_at, updated_at, messages)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            updated_at = excluded.updated_at,
            messages = excluded.messages",
        params![
            session.id,
            session.created_at,
            session.updated_at,
            messages_json
        ],
    )
    .context("Failed to save session")
    .map_err(|e| ChatlensError::Storage(e.to_string()))?;

    Ok(())
}

fn decode_session(
    id: String,
    created_at: i64,
    updated_at: i64,
    messages_json: &str,
) -> Result<ChatSession> {
    let messages: Vec<ChatMessage> = serde_json::from_str(messages_json)
        .with_context(|| format!("Failed to deserialize messages for session {}", id))
        .map_err(|e| ChatlensError::Storage(format!("{:#}", e)))?;

    Ok(ChatSession {
        id,
        messages,
        created_at,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::tempdir;

    /// Helper: create a temporary storage instance backed by a temp directory.
    ///
    /// Returns both the `SqliteStorage` and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_storage() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("history.db");
        let storage = SqliteStorage::new_with_path(db_path).expect("failed to create storage");
        (storage, dir)
    }

    fn session(id: &str, created_at: i64, contents: &[&str]) -> ChatSession {
        let mut session = ChatSession::with_id(id, created_at);
        for (i, content) in contents.iter().enumerate() {
            let ts = created_at + (i as i64 + 1) * 1000;
            if i % 2 == 0 {
                session.push(ChatMessage::user(*content, ts));
            } else {
                session.push(ChatMessage::assistant(*content, ts));
            }
        }
        session
    }

    #[test]
    fn test_sqlite_storage_init_creates_table() {
        let (storage, _dir) = create_test_storage();
        let conn = Connection::open(&storage.db_path).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='sessions'",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_save_session_creates_new_record() {
        let (storage, _dir) = create_test_storage();
        let original = session("test-save-1", 10_000, &["Hello", "Hi there"]);

        storage.save_session(&original).expect("save failed");

        let loaded = storage
            .load_session("test-save-1")
            .expect("load failed")
            .expect("session present");
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_session_preserves_created_at_on_update() {
        let (storage, _dir) = create_test_storage();
        let first = session("preserve-1", 1_000, &["one"]);
        storage.save_session(&first).expect("save failed");

        let mut second = session("preserve-1", 9_000, &["one", "two", "three"]);
        second.updated_at = 50_000;
        storage.save_session(&second).expect("update failed");

        let loaded = storage
            .load_session("preserve-1")
            .expect("load failed")
            .expect("session present");
        assert_eq!(loaded.created_at, 1_000);
        assert_eq!(loaded.updated_at, 50_000);
        assert_eq!(loaded.messages.len(), 3);
    }

    #[test]
    fn test_load_session_returns_none_for_missing_id() {
        let (storage, _dir) = create_test_storage();
        let res = storage.load_session("non-existent-id").expect("load failed");
        assert!(res.is_none());
    }

    #[test]
    fn test_list_sessions_returns_ordered_by_updated_at() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_session(&session("session-1", 1_000, &["a"]))
            .expect("save1 failed");
        storage
            .save_session(&session("session-2", 5_000, &["b"]))
            .expect("save2 failed");

        let sessions = storage.list_sessions().expect("list failed");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, "session-2");
        assert_eq!(sessions[1].id, "session-1");
        assert_eq!(sessions[0].preview, "b");
    }

    #[test]
    fn test_list_sessions_returns_empty_for_new_db() {
        let (storage, _dir) = create_test_storage();
        let sessions = storage.list_sessions().expect("list failed");
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_snapshot_is_ordered_by_created_at() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_sessions(&[
                session("late", 9_000, &["x"]),
                session("early", 1_000, &["y", "z"]),
                session("empty", 5_000, &[]),
            ])
            .expect("save failed");

        let snapshot = storage.snapshot().expect("snapshot failed");
        let ids: Vec<&str> = snapshot.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "empty", "late"]);
        assert!(snapshot[1].is_empty());
    }

    #[test]
    fn test_delete_session_removes_record() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_session(&session("to-delete", 0, &["x"]))
            .expect("save failed");

        assert_eq!(storage.delete_session("to-delete").expect("delete failed"), 1);
        assert!(storage.load_session("to-delete").expect("load failed").is_none());
    }

    #[test]
    fn test_delete_session_is_idempotent() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_session(&session("to-delete-2", 0, &["x"]))
            .expect("save failed");

        storage.delete_session("to-delete-2").expect("first delete failed");
        assert_eq!(
            storage.delete_session("to-delete-2").expect("second delete failed"),
            0
        );
    }

    #[test]
    fn test_load_session_by_8char_prefix() {
        let (storage, _dir) = create_test_storage();
        let full_id = "abcdef12-3456-7890-abcd-ef1234567890";
        storage
            .save_session(&session(full_id, 0, &["Prefix test"]))
            .expect("save failed");

        let loaded = storage
            .load_session("abcdef12")
            .expect("load failed by prefix")
            .expect("session present");
        assert_eq!(loaded.id, full_id);
    }

    #[test]
    fn test_delete_session_by_8char_prefix() {
        let (storage, _dir) = create_test_storage();
        let full_id = "ffffffff-1234-5678-abcd-ef1234567890";
        storage
            .save_session(&session(full_id, 0, &["x"]))
            .expect("save failed");

        storage.delete_session("ffffffff").expect("delete by prefix failed");
        assert!(storage.load_session(full_id).expect("load failed").is_none());
    }

    fn stored_ids(storage: &SqliteStorage) -> Vec<String> {
        let mut ids: Vec<String> = storage
            .list_sessions()
            .expect("list failed")
            .into_iter()
            .map(|s| s.id)
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_exact_id_does_not_match_longer_siblings() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_sessions(&[
                session("a", 0, &["exact"]),
                session("ab", 5_000, &["sibling"]),
                session("zz", 0, &["other"]),
            ])
            .expect("save failed");

        let loaded = storage
            .load_session("a")
            .expect("load failed")
            .expect("session present");
        assert_eq!(loaded.id, "a");

        assert_eq!(storage.delete_session("a").expect("delete failed"), 1);
        assert_eq!(stored_ids(&storage), vec!["ab", "zz"]);
    }

    #[test]
    fn test_blank_id_is_rejected() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_session(&session("keep-me", 0, &["x"]))
            .expect("save failed");

        for id in ["", "   "] {
            let err = storage.delete_session(id).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ChatlensError>(),
                Some(ChatlensError::NotFound(_))
            ));
            assert!(storage.load_session(id).is_err());
        }
        assert_eq!(stored_ids(&storage), vec!["keep-me"]);
    }

    #[test]
    fn test_ambiguous_prefix_deletes_nothing() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_sessions(&[session("abc1", 0, &["x"]), session("abc2", 0, &["y"])])
            .expect("save failed");

        let err = storage.delete_session("abc").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatlensError>(),
            Some(ChatlensError::AmbiguousId { count: 2, .. })
        ));
        assert!(storage.load_session("abc").is_err());
        assert_eq!(stored_ids(&storage), vec!["abc1", "abc2"]);
    }

    #[test]
    fn test_prefix_treats_wildcards_literally() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_sessions(&[
                session("50%-off", 0, &["x"]),
                session("50x-off", 0, &["y"]),
                session("a_b", 0, &["z"]),
                session("axb", 0, &["w"]),
            ])
            .expect("save failed");

        let loaded = storage
            .load_session("50%")
            .expect("load failed")
            .expect("session present");
        assert_eq!(loaded.id, "50%-off");

        assert_eq!(storage.delete_session("a_").expect("delete failed"), 1);
        assert_eq!(stored_ids(&storage), vec!["50%-off", "50x-off", "axb"]);
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let (storage, _dir) = create_test_storage();
        storage
            .save_session(&session("abcdef", 0, &["x"]))
            .expect("save failed");

        assert!(storage.load_session("ABC").expect("load failed").is_none());
        assert_eq!(storage.delete_session("ABC").expect("delete failed"), 0);
        assert_eq!(stored_ids(&storage), vec!["abcdef"]);
    }

    #[test]
    fn test_import_and_export_json() {
        let (storage, dir) = create_test_storage();
        let import_path = dir.path().join("sessions.json");
        std::fs::write(
            &import_path,
            r#"[
                {"id": "a", "messages": [{"role": "user", "content": "hi", "timestamp": 2000}],
                 "createdAt": 1000, "updatedAt": 2000},
                {"id": "b", "messages": [], "createdAt": 3000, "updatedAt": 3000}
            ]"#,
        )
        .expect("write import");

        assert_eq!(storage.import_json(&import_path).expect("import failed"), 2);

        let export_path = dir.path().join("export.json");
        assert_eq!(storage.export_json(&export_path).expect("export failed"), 2);

        let exported = read_export(&export_path).expect("read export");
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].id, "a");
        assert_eq!(exported[0].messages[0].content, "hi");
    }

    #[test]
    fn test_import_accepts_wrapped_export() {
        let (storage, dir) = create_test_storage();
        let path = dir.path().join("wrapped.json");
        std::fs::write(
            &path,
            r#"{"sessions": [{"id": "w", "createdAt": 1, "updatedAt": 1}]}"#,
        )
        .expect("write import");

        assert_eq!(storage.import_json(&path).expect("import failed"), 1);
    }

    #[test]
    fn test_import_rejects_malformed_file() {
        let (storage, dir) = create_test_storage();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"not": "sessions"}"#).expect("write import");

        let err = storage.import_json(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChatlensError>(),
            Some(ChatlensError::Import(_))
        ));
        assert!(storage.list_sessions().expect("list failed").is_empty());
    }

    #[test]
    #[serial]
    fn test_new_respects_env_override() {
        // Use nested path to ensure parent directory creation is exercised.
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("history.db");
        env::set_var(HISTORY_DB_ENV, db_path.to_string_lossy().to_string());

        let storage = SqliteStorage::new().expect("new failed with env override");
        assert_eq!(storage.db_path, db_path);
        assert!(db_path.parent().unwrap().exists());

        env::remove_var(HISTORY_DB_ENV);
    }
}
