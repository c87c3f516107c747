//! Launcher settings stored in the `settings` table
//!
//! Missing, empty, or malformed values fall back to defaults rooted next to
//! the running binary.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use specta::Type;

use crate::db::{repository, Database};
use crate::error::Result;
use crate::utils::paths::executable_dir;

pub const KEY_GAMES_DIR: &str = "games_dir";
pub const KEY_TEMPLATE_EXECUTABLE: &str = "template_executable";
pub const KEY_GAME_DB_PATH: &str = "game_db_path";
/// Folder setting kept from the first schema; used when `games_dir` is unset
pub const KEY_DEFAULT_GAME_PATH: &str = "default_game_path";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Type)]
pub struct AppSettings {
    /// Root of the `<app_id>/<path>/<exe>` layout
    pub games_dir: String,
    /// Binary copied by the installer
    pub template_executable: String,
    /// Detectable-games list replacing the bundled one
    pub game_db_path: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let base = executable_dir();
        Self {
            games_dir: base.join("games").to_string_lossy().to_string(),
            template_executable: base.join("template.exe").to_string_lossy().to_string(),
            game_db_path: None,
        }
    }
}

impl AppSettings {
    pub fn load(db: &Database) -> Result<Self> {
        let conn = db.lock()?;
        let stored = repository::get_all_settings(&conn)?;
        Ok(Self::from_map(&stored))
    }

    pub fn save(&self, db: &Database) -> Result<()> {
        let conn = db.lock()?;
        repository::set_setting(&conn, KEY_GAMES_DIR, &Value::from(self.games_dir.as_str()))?;
        repository::set_setting(
            &conn,
            KEY_TEMPLATE_EXECUTABLE,
            &Value::from(self.template_executable.as_str()),
        )?;
        let db_path = match &self.game_db_path {
            Some(path) => Value::from(path.as_str()),
            None => Value::Null,
        };
        repository::set_setting(&conn, KEY_GAME_DB_PATH, &db_path)?;
        tracing::debug!("Saved launcher settings");
        Ok(())
    }

    fn from_map(stored: &HashMap<String, Value>) -> Self {
        let defaults = Self::default();
        let games_dir = string_setting(stored, KEY_GAMES_DIR)
            .or_else(|| string_setting(stored, KEY_DEFAULT_GAME_PATH))
            .unwrap_or(defaults.games_dir);

        Self {
            games_dir,
            template_executable: string_setting(stored, KEY_TEMPLATE_EXECUTABLE)
                .unwrap_or(defaults.template_executable),
            game_db_path: string_setting(stored, KEY_GAME_DB_PATH),
        }
    }

    pub fn games_root(&self) -> PathBuf {
        PathBuf::from(&self.games_dir)
    }

    pub fn template_path(&self) -> PathBuf {
        PathBuf::from(&self.template_executable)
    }
}

fn string_setting(stored: &HashMap<String, Value>, key: &str) -> Option<String> {
    match stored.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(other) => {
            tracing::warn!("Ignoring setting {} with unexpected value {}", key, other);
            None
        }
    }
}
