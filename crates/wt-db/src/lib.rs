//! Storage layer for the workspace timer.
//!
//! Provides a small key-value store of JSON values ("workspace state") using
//! `rusqlite`. The store knows nothing about timers; callers decide what lives
//! under each key.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! Read-modify-write sequences should go through [`Database::update_value`],
//! which holds an `IMMEDIATE` transaction so that separate processes sharing
//! the same file cannot interleave their writes.
//!
//! # Schema
//!
//! ```sql
//! workspace_state(key TEXT PRIMARY KEY, value TEXT NOT NULL, updated_at TEXT NOT NULL)
//! ```
//!
//! `value` holds JSON text. Nothing stops another writer from storing text
//! that does not parse, so [`Database::get_raw`], [`Database::update_value`]
//! and [`StateEntry`] hand out the text as stored and leave decoding to the
//! caller. `updated_at` is ISO 8601 UTC (e.g. `2024-01-15T10:30:00.000Z`).

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde_json::Value;
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value is not valid JSON, or a value could not be encoded.
    #[error("invalid JSON for key {key}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// One stored key with its value text as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub raw: String,
    pub updated_at: String,
}

impl StateEntry {
    /// Decodes the stored text.
    pub fn value(&self) -> Result<Value, DbError> {
        decode(&self.key, &self.raw)
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS workspace_state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Returns the value stored under `key`, or `None` if nothing is stored.
    ///
    /// Fails with [`DbError::Json`] if the stored text is not valid JSON.
    pub fn get_value(&self, key: &str) -> Result<Option<Value>, DbError> {
        self.get_raw(key)?
            .map(|raw| decode(key, &raw))
            .transpose()
    }

    /// Returns the text stored under `key` without decoding it.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, DbError> {
        read_raw(&self.conn, key)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set_value(&mut self, key: &str, value: &Value) -> Result<(), DbError> {
        write_value(&self.conn, key, value)
    }

    /// Removes `key`. Returns whether it existed.
    pub fn remove_value(&mut self, key: &str) -> Result<bool, DbError> {
        delete_value(&self.conn, key)
    }

    /// Reads, transforms and writes the value under `key` in one transaction.
    ///
    /// `f` receives the current text (if any), undecoded, so a corrupt value
    /// can still be replaced. Returning `Some` stores the new value, returning
    /// `None` removes the key. If `f` fails nothing is written.
    pub fn update_value<F, E>(&mut self, key: &str, f: F) -> Result<Option<Value>, E>
    where
        F: FnOnce(Option<String>) -> Result<Option<Value>, E>,
        E: From<DbError>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;

        let current = read_raw(&tx, key)?;
        let next = f(current)?;
        match &next {
            Some(value) => write_value(&tx, key, value)?,
            None => {
                delete_value(&tx, key)?;
            }
        }

        tx.commit().map_err(DbError::from)?;
        Ok(next)
    }

    /// Lists stored keys in ascending order.
    pub fn keys(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM workspace_state ORDER BY key ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    /// Lists every stored entry ordered by key.
    pub fn entries(&self) -> Result<Vec<StateEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT key, value, updated_at
            FROM workspace_state
            ORDER BY key ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut entries = Vec::new();
        for row in rows {
            let (key, raw, updated_at) = row?;
            entries.push(StateEntry {
                key,
                raw,
                updated_at,
            });
        }
        Ok(entries)
    }

    /// Removes every key. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, DbError> {
        let removed = self.conn.execute("DELETE FROM workspace_state", [])?;
        tracing::debug!(removed, "cleared workspace state");
        Ok(removed)
    }
}

fn read_raw(conn: &Connection, key: &str) -> Result<Option<String>, DbError> {
    let raw = conn
        .query_row(
            "SELECT value FROM workspace_state WHERE key = ?",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw)
}

fn write_value(conn: &Connection, key: &str, value: &Value) -> Result<(), DbError> {
    let raw = serde_json::to_string(value).map_err(|source| DbError::Json {
        key: key.to_string(),
        source,
    })?;
    conn.execute(
        "
        INSERT INTO workspace_state (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        ",
        params![key, raw, now_timestamp()],
    )?;
    Ok(())
}

fn delete_value(conn: &Connection, key: &str) -> Result<bool, DbError> {
    let removed = conn.execute("DELETE FROM workspace_state WHERE key = ?", [key])?;
    Ok(removed > 0)
}

fn decode(key: &str, raw: &str) -> Result<Value, DbError> {
    serde_json::from_str(raw).map_err(|source| DbError::Json {
        key: key.to_string(),
        source,
    })
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(
            table_columns(&db.conn, "workspace_state"),
            vec!["key", "value", "updated_at"]
        );
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn missing_key_returns_none() {
        let db = Database::open_in_memory().expect("open in-memory db");
        assert_eq!(db.get_value("absent").unwrap(), None);
    }

    #[test]
    fn set_value_overwrites_previous_value() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.set_value("timer", &json!({ "intervals": [] })).unwrap();
        db.set_value("timer", &json!({ "intervals": ["a/b"] }))
            .unwrap();

        assert_eq!(
            db.get_value("timer").unwrap(),
            Some(json!({ "intervals": ["a/b"] }))
        );
        assert_eq!(db.keys().unwrap(), vec!["timer"]);
    }

    #[test]
    fn remove_value_reports_existence() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.set_value("timer", &json!(1)).unwrap();

        assert!(db.remove_value("timer").unwrap());
        assert!(!db.remove_value("timer").unwrap());
        assert_eq!(db.get_value("timer").unwrap(), None);
    }

    #[test]
    fn keys_and_entries_are_sorted() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.set_value("b", &json!("second")).unwrap();
        db.set_value("a", &json!({ "first": true })).unwrap();

        assert_eq!(db.keys().unwrap(), vec!["a", "b"]);

        let entries = db.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "a");
        assert_eq!(entries[0].value().unwrap(), json!({ "first": true }));
        assert_eq!(entries[1].key, "b");
        assert_eq!(entries[1].value().unwrap(), json!("second"));
        assert!(entries[0].updated_at.ends_with('Z'));
    }

    #[test]
    fn clear_removes_everything() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.set_value("a", &json!(1)).unwrap();
        db.set_value("b", &json!(2)).unwrap();

        assert_eq!(db.clear().unwrap(), 2);
        assert!(db.keys().unwrap().is_empty());
        assert_eq!(db.clear().unwrap(), 0);
    }

    #[test]
    fn update_value_sees_current_value_and_writes_result() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.set_value("counter", &json!(1)).unwrap();

        let written = db
            .update_value("counter", |current| {
                let n = current.and_then(|raw| raw.parse::<i64>().ok()).unwrap_or(0);
                Ok::<_, DbError>(Some(json!(n + 1)))
            })
            .unwrap();

        assert_eq!(written, Some(json!(2)));
        assert_eq!(db.get_value("counter").unwrap(), Some(json!(2)));
    }

    #[test]
    fn update_value_on_missing_key_gets_none() {
        let mut db = Database::open_in_memory().expect("open in-memory db");

        db.update_value("fresh", |current| {
            assert!(current.is_none());
            Ok::<_, DbError>(Some(json!("created")))
        })
        .unwrap();

        assert_eq!(db.get_value("fresh").unwrap(), Some(json!("created")));
    }

    #[test]
    fn update_value_returning_none_removes_key() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.set_value("gone", &json!(true)).unwrap();

        db.update_value("gone", |_| Ok::<_, DbError>(None)).unwrap();

        assert_eq!(db.get_value("gone").unwrap(), None);
    }

    #[derive(Debug)]
    enum TestError {
        Db,
        Rejected,
    }

    impl From<DbError> for TestError {
        fn from(_: DbError) -> Self {
            Self::Db
        }
    }

    #[test]
    fn failed_update_writes_nothing() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        db.set_value("kept", &json!("original")).unwrap();

        let result = db.update_value("kept", |_| Err::<Option<Value>, _>(TestError::Rejected));

        assert!(matches!(result, Err(TestError::Rejected)));
        assert_eq!(db.get_value("kept").unwrap(), Some(json!("original")));
    }

    fn insert_raw(db: &Database, key: &str, raw: &str) {
        db.conn
            .execute(
                "INSERT INTO workspace_state (key, value, updated_at) VALUES (?, ?, ?)",
                params![key, raw, "2025-01-01T00:00:00.000Z"],
            )
            .unwrap();
    }

    #[test]
    fn corrupt_json_is_reported_with_key() {
        let db = Database::open_in_memory().expect("open in-memory db");
        insert_raw(&db, "broken", "{not json");

        let err = db.get_value("broken").unwrap_err();
        assert!(matches!(err, DbError::Json { ref key, .. } if key == "broken"));
        assert_eq!(db.get_raw("broken").unwrap().as_deref(), Some("{not json"));

        let entries = db.entries().unwrap();
        assert_eq!(entries[0].raw, "{not json");
        assert!(entries[0].value().is_err());
    }

    #[test]
    fn update_value_can_replace_corrupt_json() {
        let mut db = Database::open_in_memory().expect("open in-memory db");
        insert_raw(&db, "broken", "{not json");

        db.update_value("broken", |current| {
            assert_eq!(current.as_deref(), Some("{not json"));
            Ok::<_, DbError>(Some(json!("fixed")))
        })
        .unwrap();

        assert_eq!(db.get_value("broken").unwrap(), Some(json!("fixed")));
    }

    #[test]
    fn values_persist_across_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wt.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.set_value("timer", &json!({ "intervals": [] })).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_value("timer").unwrap(),
            Some(json!({ "intervals": [] }))
        );
    }
}
