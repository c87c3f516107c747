pub mod migrations;
pub mod repository;
pub mod schema;

pub use repository::*;

use directories::ProjectDirs;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{QuestError, Result};

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    /// Open the database in the per-user data directory.
    pub fn new() -> Result<Self> {
        let db_path = get_database_path()?;
        Self::open(&db_path)
    }

    /// Open (or create) the database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::debug!("Opened database at {}", db_path.display());
        Self::from_connection(conn)
    }

    /// A fully initialized database that lives only as long as the handle.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Initialize schema (creates tables if they don't exist)
        schema::init_database(&conn)?;

        // Run migrations for schema updates
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| QuestError::lock(e.to_string()))
    }

    /// Get a setting value from the database
    pub fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.lock()?;
        repository::get_setting(&conn, key)
    }

    pub fn set_setting(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.lock()?;
        repository::set_setting(&conn, key, value)
    }
}

fn get_database_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "questrunner", "questrunner")
        .ok_or_else(|| QuestError::config("Failed to determine project directories"))?;

    let data_dir = proj_dirs.data_dir();
    Ok(data_dir.join("questrunner.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory_seeds_defaults() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(
            db.get_setting("db_version").unwrap(),
            Some(serde_json::json!(migrations::CURRENT_VERSION))
        );
        assert_eq!(
            db.get_setting("default_game_path").unwrap(),
            Some(serde_json::json!(""))
        );
    }

    #[test]
    fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quest.db");

        {
            let db = Database::open(&path).unwrap();
            db.set_setting("games_dir", &serde_json::json!("/games")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_setting("games_dir").unwrap(),
            Some(serde_json::json!("/games"))
        );
    }
}
