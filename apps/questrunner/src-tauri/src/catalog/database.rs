//! The catalog database of detectable games
//!
//! Loaded once at startup and treated as reference data. Games are cloned out
//! of it onto the active list; nothing here is mutated afterwards.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;

use super::models::Game;
use crate::error::Result;
use crate::utils::json::safe_parse_str;

/// Game list bundled with the binary
const EMBEDDED_GAMELIST: &str = include_str!("../../data/gamelist.json");

static EMBEDDED: Lazy<GameDatabase> = Lazy::new(|| GameDatabase::from_json(EMBEDDED_GAMELIST));

#[derive(Debug, Clone, Default)]
pub struct GameDatabase {
    games: Vec<Game>,
}

impl GameDatabase {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    /// Parse a JSON array of games. Malformed input yields an empty database.
    pub fn from_json(text: &str) -> Self {
        let games: Vec<Game> = safe_parse_str(text, Vec::new());
        if games.is_empty() {
            tracing::warn!("Game database is empty or could not be parsed");
        }
        Self { games }
    }

    /// Load the database from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let db = Self::from_json(&text);
        tracing::info!("Loaded {} games from {}", db.len(), path.display());
        Ok(db)
    }

    /// The database shipped inside the binary.
    pub fn embedded() -> &'static GameDatabase {
        &EMBEDDED
    }

    /// Load from `path` when given and readable, otherwise use the embedded copy.
    pub fn load_or_embedded(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::load(path) {
                Ok(db) if !db.is_empty() => db,
                Ok(_) => Self::embedded().clone(),
                Err(e) => {
                    tracing::warn!(
                        "Could not read game database {}: {}, using embedded list",
                        path.display(),
                        e
                    );
                    Self::embedded().clone()
                }
            },
            None => Self::embedded().clone(),
        }
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Case-insensitive substring search over names and aliases, in database order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Game> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.games
            .iter()
            .filter(|g| {
                g.name.to_lowercase().contains(&needle)
                    || g.aliases
                        .iter()
                        .flatten()
                        .any(|a| a.to_lowercase().contains(&needle))
            })
            .take(limit)
            .collect()
    }
}
