//! Installs a placeholder executable for a game
//!
//! The placeholder is a copy of the template binary placed where the runner
//! will look for it: `<games_root>/<app_id>/<path>/<executable_name>`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{QuestError, Result};
use crate::utils::paths::{join_relative, split_executable_path};

#[derive(Debug, Clone)]
pub struct Installer {
    games_root: PathBuf,
    template: PathBuf,
}

impl Installer {
    pub fn new(games_root: impl Into<PathBuf>, template: impl Into<PathBuf>) -> Self {
        Self {
            games_root: games_root.into(),
            template: template.into(),
        }
    }

    pub fn games_root(&self) -> &Path {
        &self.games_root
    }

    /// Copy the template to the location of catalog executable `exec_name`
    /// for `app_id`, creating folders as needed. Returns the installed path.
    pub fn install(&self, app_id: i64, exec_name: &str) -> Result<PathBuf> {
        let parts = split_executable_path(exec_name);
        if parts.file.is_empty() {
            return Err(QuestError::validation("Executable name must not be empty"));
        }
        if exec_name
            .split(|c: char| c == '/' || c == '\\')
            .any(|s| s == "..")
        {
            return Err(QuestError::validation(format!(
                "Executable '{}' leaves the games folder",
                exec_name
            )));
        }
        if !self.template.is_file() {
            return Err(QuestError::config(format!(
                "Template executable not found at {}",
                self.template.display()
            )));
        }

        let game_folder = join_relative(
            &self.games_root.join(app_id.to_string()),
            parts.dir.as_deref().unwrap_or_default(),
        );
        fs::create_dir_all(&game_folder)?;

        let target = game_folder.join(&parts.file);
        fs::copy(&self.template, &target)?;
        tracing::info!("Installed {} for app {} at {}", exec_name, app_id, target.display());

        Ok(target)
    }
}
