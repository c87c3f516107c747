//! Game and executable models
//!
//! Field names follow the detectable-game records the catalog database ships
//! with, so records deserialize straight from that JSON.

use serde::{Deserialize, Serialize};
use specta::Type;

/// One executable registered for a game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Type)]
pub struct GameExecutable {
    /// Logical identifier, e.g. `folder/Game.exe`. Also the matching key for
    /// paths reported by the process runner.
    pub name: String,
    /// Last known filesystem path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub is_launcher: bool,
    /// Target platform tag (`win32`, `linux`, `darwin`)
    #[serde(default)]
    pub os: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_installed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
    /// Virtual process id assigned by the tracker while a run is observed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpid: Option<String>,
}

impl GameExecutable {
    pub fn new(name: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            os: os.into(),
            ..Default::default()
        }
    }
}

/// A game from the catalog database, possibly placed on the active list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Type)]
pub struct Game {
    /// Stable catalog identity
    pub id: String,
    /// Handle assigned when the game joins the active list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub name: String,
    /// Ordered; the first matching executable wins on reverse lookups
    #[serde(default)]
    pub executables: Vec<GameExecutable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    /// Aggregate of the executable flags, not authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_installed: Option<bool>,
    /// Aggregate of the executable flags, not authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
}

impl Game {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_executable(mut self, executable: GameExecutable) -> Self {
        self.executables.push(executable);
        self
    }

    /// Recompute the aggregate flags after an executable changed.
    ///
    /// Running is any-of. Installed only ever turns on here, so a value
    /// patched in by the caller is not cleared by an executable without
    /// install information.
    pub fn refresh_aggregate_flags(&mut self) {
        self.is_running = Some(self.executables.iter().any(|e| e.is_running == Some(true)));
        if self.executables.iter().any(|e| e.is_installed == Some(true)) {
            self.is_installed = Some(true);
        }
    }
}

/// Partial update for a [`Game`]. `id` and `uid` are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct GamePatch {
    pub name: Option<String>,
    pub executables: Option<Vec<GameExecutable>>,
    pub aliases: Option<Vec<String>>,
    pub themes: Option<Vec<String>>,
    pub is_installed: Option<bool>,
    pub is_running: Option<bool>,
}

impl GamePatch {
    /// Merge the present fields into `game`.
    ///
    /// A new executable list recomputes the aggregate flags before explicit
    /// `is_installed`/`is_running` values are applied.
    pub fn apply_to(self, game: &mut Game) {
        if let Some(name) = self.name {
            game.name = name;
        }
        if let Some(executables) = self.executables {
            game.executables = executables;
            game.refresh_aggregate_flags();
        }
        if let Some(aliases) = self.aliases {
            game.aliases = Some(aliases);
        }
        if let Some(themes) = self.themes {
            game.themes = Some(themes);
        }
        if let Some(installed) = self.is_installed {
            game.is_installed = Some(installed);
        }
        if let Some(running) = self.is_running {
            game.is_running = Some(running);
        }
    }
}

/// Partial update for a [`GameExecutable`]. `name` is the lookup key and is not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Type)]
#[serde(default)]
pub struct ExecutablePatch {
    pub path: Option<String>,
    pub is_launcher: Option<bool>,
    pub os: Option<String>,
    pub filename: Option<String>,
    pub segments: Option<u32>,
    pub is_installed: Option<bool>,
    pub is_running: Option<bool>,
    pub vpid: Option<String>,
}

impl ExecutablePatch {
    /// Merge the present fields into `executable`.
    pub fn apply_to(self, executable: &mut GameExecutable) {
        if let Some(path) = self.path {
            executable.path = Some(path);
        }
        if let Some(is_launcher) = self.is_launcher {
            executable.is_launcher = is_launcher;
        }
        if let Some(os) = self.os {
            executable.os = os;
        }
        if let Some(filename) = self.filename {
            executable.filename = Some(filename);
        }
        if let Some(segments) = self.segments {
            executable.segments = Some(segments);
        }
        if let Some(installed) = self.is_installed {
            executable.is_installed = Some(installed);
        }
        if let Some(running) = self.is_running {
            executable.is_running = Some(running);
        }
        if let Some(vpid) = self.vpid {
            executable.vpid = Some(vpid);
        }
    }
}
