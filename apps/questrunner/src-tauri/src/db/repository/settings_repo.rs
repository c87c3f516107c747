//! Repository for settings-related database operations

use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;

use crate::error::Result;

/// Get a single setting value
///
/// # Returns
/// The setting value as JSON, or None if not found or not valid JSON
pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<serde_json::Value>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        Some(v) => match serde_json::from_str(&v) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                tracing::warn!("Ignoring malformed setting {}: {}", key, e);
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

/// Set a setting value, replacing any previous one
pub fn set_setting(conn: &Connection, key: &str, value: &serde_json::Value) -> Result<()> {
    let value_str = serde_json::to_string(value)?;
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3
        "#,
        rusqlite::params![key, value_str, now],
    )?;

    Ok(())
}

/// Get all settings as a HashMap
///
/// Rows whose value is not valid JSON are skipped.
pub fn get_all_settings(conn: &Connection) -> Result<HashMap<String, serde_json::Value>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings")?;

    let settings: HashMap<String, serde_json::Value> = stmt
        .query_map([], |row| {
            let key: String = row.get(0)?;
            let value_str: String = row.get(1)?;
            Ok((key, value_str))
        })?
        .filter_map(|r| r.ok())
        .filter_map(|(key, value_str)| match serde_json::from_str(&value_str) {
            Ok(value) => Some((key, value)),
            Err(e) => {
                tracing::warn!("Skipping malformed setting {}: {}", key, e);
                None
            }
        })
        .collect();

    Ok(settings)
}

/// Delete a setting
pub fn delete_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();

        conn.execute_batch(
            r#"
            CREATE TABLE settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                description TEXT,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )
        .unwrap();

        conn
    }

    #[test]
    fn test_get_setting_not_found() {
        let conn = setup_test_db();
        let result = get_setting(&conn, "nonexistent").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_set_and_get_setting() {
        let conn = setup_test_db();

        let value = serde_json::json!({"games_dir": "C:/Games"});
        set_setting(&conn, "launcher", &value).unwrap();

        let result = get_setting(&conn, "launcher").unwrap();
        assert_eq!(result, Some(value));
    }

    #[test]
    fn test_set_setting_overwrites() {
        let conn = setup_test_db();

        set_setting(&conn, "games_dir", &serde_json::json!("/a")).unwrap();
        set_setting(&conn, "games_dir", &serde_json::json!("/b")).unwrap();

        assert_eq!(
            get_setting(&conn, "games_dir").unwrap(),
            Some(serde_json::json!("/b"))
        );
    }

    #[test]
    fn test_malformed_value_reads_as_missing() {
        let conn = setup_test_db();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES ('broken', 'not json')",
            [],
        )
        .unwrap();

        assert_eq!(get_setting(&conn, "broken").unwrap(), None);
        assert!(get_all_settings(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_set_and_get_all_settings() {
        let conn = setup_test_db();

        set_setting(&conn, "key1", &serde_json::json!("value1")).unwrap();
        set_setting(&conn, "key2", &serde_json::json!(42)).unwrap();

        let result = get_all_settings(&conn).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.get("key1"), Some(&serde_json::json!("value1")));
        assert_eq!(result.get("key2"), Some(&serde_json::json!(42)));
    }

    #[test]
    fn test_delete_setting() {
        let conn = setup_test_db();

        set_setting(&conn, "key1", &serde_json::json!(true)).unwrap();
        delete_setting(&conn, "key1").unwrap();

        assert!(get_setting(&conn, "key1").unwrap().is_none());
    }
}
