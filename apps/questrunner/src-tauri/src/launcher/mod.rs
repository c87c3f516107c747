//! Launching executables through the process runner
//!
//! The gateway only sends requests. Whether a process actually started is
//! learned later from the runner's events, which the tracker applies.

pub mod installer;
pub mod runner;

pub use installer::Installer;
pub use runner::{ProcessRunner, TokioProcessRunner};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::catalog::models::{Game, GameExecutable};
use crate::error::{QuestError, Result};
use crate::utils::paths::split_executable_path;

/// Launch request understood by the process runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct RunBackgroundProcessPayload {
    pub app_id: i64,
    /// Catalog executable name, e.g. `folder/Game.exe`
    pub exec_path: String,
    #[serde(default)]
    pub executable_name: Option<String>,
    /// Folder part of `exec_path`
    #[serde(default)]
    pub path: Option<String>,
    /// Number of segments in `exec_path`
    #[serde(default)]
    pub path_len: Option<u32>,
}

impl RunBackgroundProcessPayload {
    /// Build the request for one executable of a catalog game.
    pub fn for_executable(game: &Game, executable: &GameExecutable) -> Result<Self> {
        let app_id = parse_app_id(&game.id)?;
        let parts = split_executable_path(&executable.name);
        if parts.file.is_empty() {
            return Err(QuestError::validation(format!(
                "Executable of game {} has an empty name",
                game.id
            )));
        }

        Ok(Self {
            app_id,
            exec_path: executable.name.clone(),
            executable_name: Some(parts.file),
            path: parts.dir,
            path_len: u32::try_from(parts.segments).ok(),
        })
    }
}

/// Catalog ids are numeric snowflakes; the runner keys processes by them.
pub fn parse_app_id(id: &str) -> Result<i64> {
    id.parse()
        .map_err(|_| QuestError::validation(format!("Game id '{}' is not a numeric app id", id)))
}

/// Sends play/stop intents to a [`ProcessRunner`].
#[derive(Clone)]
pub struct LaunchGateway {
    runner: Arc<dyn ProcessRunner>,
}

impl LaunchGateway {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Forward a launch request. Resolves once the runner accepted or
    /// rejected it; runner failures come back as [`QuestError::Launch`].
    pub async fn run_background_process(&self, payload: RunBackgroundProcessPayload) -> Result<String> {
        if payload.exec_path.trim().is_empty() {
            return Err(QuestError::validation("exec_path must not be empty"));
        }

        tracing::info!("Requesting launch of {} for app {}", payload.exec_path, payload.app_id);
        self.runner.launch(payload).await.map_err(|e| match e {
            QuestError::Launch(_) | QuestError::Validation(_) => e,
            other => QuestError::launch(other.to_string()),
        })
    }

    /// Launch `executable` of `game`.
    pub async fn play(&self, game: &Game, executable: &GameExecutable) -> Result<String> {
        let payload = RunBackgroundProcessPayload::for_executable(game, executable)?;
        self.run_background_process(payload).await
    }

    /// Ask the runner to stop whatever it dispatched for `app_id`.
    pub async fn stop(&self, app_id: i64) -> Result<String> {
        tracing::info!("Requesting stop of app {}", app_id);
        self.runner.stop(app_id).await
    }
}
