//! Execution tracking
//!
//! Turns process-runner lifecycle events into running/installed flags on the
//! active list. Each executable moves through
//! `Unknown -> InstalledIdle <-> InstalledRunning`. An event whose path does
//! not resolve to a listed executable leaves the store exactly as it was.

mod predicates;

pub use predicates::{
    can_play_game, is_executable_running, is_game_executable_installed, is_game_installed,
};

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specta::Type;
use uuid::Uuid;

use crate::catalog::models::{ExecutablePatch, GameExecutable};
use crate::catalog::store::{executable_index_by_path, CatalogStore};
use crate::events::AppEvent;
use crate::utils::paths::{join_relative, same_executable};

/// Tracked state of one executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum ExecutableState {
    Unknown,
    InstalledIdle,
    InstalledRunning,
}

impl ExecutableState {
    pub fn of(executable: &GameExecutable) -> Self {
        if executable.is_running == Some(true) {
            ExecutableState::InstalledRunning
        } else if executable.is_installed == Some(true) {
            ExecutableState::InstalledIdle
        } else {
            ExecutableState::Unknown
        }
    }
}

/// Outcome of applying one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The event changed (or confirmed) the state of a listed executable
    Applied {
        uid: String,
        executable: String,
        state: ExecutableState,
    },
    /// No listed game has an executable matching the path
    Unresolved { path: String },
    /// Not a process event
    Ignored,
}

impl Resolution {
    pub fn is_applied(&self) -> bool {
        matches!(self, Resolution::Applied { .. })
    }

    /// Catalog notification for the frontend, if anything changed.
    pub fn to_event(&self) -> Option<AppEvent> {
        match self {
            Resolution::Applied {
                uid,
                executable,
                state,
            } => Some(AppEvent::ExecutableStateChanged {
                uid: uid.clone(),
                executable: executable.clone(),
                state: *state,
            }),
            _ => None,
        }
    }
}

/// A run observed between a start and a stop event
#[derive(Debug, Clone, Serialize, Type)]
pub struct RunSession {
    pub vpid: String,
    pub app_id: String,
    pub full_executable_path: String,
    pub pid: Option<u32>,
    pub started_at: DateTime<Utc>,
}

/// Applies lifecycle events to a [`CatalogStore`] and remembers open runs.
#[derive(Debug, Default)]
pub struct ExecutionTracker {
    sessions: HashMap<String, RunSession>,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs currently observed, keyed by vpid.
    pub fn sessions(&self) -> &HashMap<String, RunSession> {
        &self.sessions
    }

    /// Set `is_running` on the executable matching `exec_path`.
    ///
    /// Unresolvable paths are logged and leave the store untouched.
    pub fn update_executable_run_status(
        &mut self,
        store: &mut CatalogStore,
        exec_path: &str,
        running: bool,
    ) -> Resolution {
        resolve_and_update(store, exec_path, |exe| {
            exe.is_running = Some(running);
        })
    }

    /// Apply one bus event. Non-process events are ignored.
    ///
    /// Events are applied in the order given; a second start for an executable
    /// that is already running simply replaces the open run.
    pub fn apply(&mut self, store: &mut CatalogStore, event: &AppEvent) -> Resolution {
        let Some(payload) = event.process_payload() else {
            return Resolution::Ignored;
        };
        let path = payload.full_executable_path.as_str();

        if let Some(error) = &payload.error {
            tracing::warn!("Launch of {} (app {}) failed: {}", path, payload.app_id, error);
        }

        let starting = payload.running
            && payload.error.is_none()
            && matches!(event, AppEvent::BackgroundProcessResult(_));

        if starting {
            let vpid = Uuid::new_v4().to_string();
            let mut replaced = None;
            let resolution = resolve_and_update(store, path, |exe| {
                replaced = exe.vpid.replace(vpid.clone());
                exe.is_installed = Some(true);
                exe.is_running = Some(true);
            });

            if resolution.is_applied() {
                if let Some(old) = replaced.and_then(|old| self.sessions.remove(&old)) {
                    tracing::debug!("Replacing open run {} of {}", old.vpid, path);
                }
                self.sessions.insert(
                    vpid.clone(),
                    RunSession {
                        vpid,
                        app_id: payload.app_id.clone(),
                        full_executable_path: payload.full_executable_path.clone(),
                        pid: payload.pid,
                        started_at: Utc::now(),
                    },
                );
            }
            resolution
        } else {
            let mut closed = None;
            let resolution = resolve_and_update(store, path, |exe| {
                closed = exe.vpid.take();
                exe.is_running = Some(false);
            });

            // The executable may have left the list (or lost its vpid to a
            // patch) while running; its run is still closed by path.
            let session = match closed {
                Some(vpid) => self.sessions.remove(&vpid),
                None => self.take_session_by_path(path),
            };
            if let Some(session) = session {
                let seconds = (Utc::now() - session.started_at).num_seconds();
                tracing::info!(
                    "Run {} of {} ended after {}s (status {:?})",
                    session.vpid,
                    path,
                    seconds,
                    payload.status
                );
            }
            resolution
        }
    }

    fn take_session_by_path(&mut self, path: &str) -> Option<RunSession> {
        let vpid = self
            .sessions
            .values()
            .find(|s| same_executable(&s.full_executable_path, path))
            .map(|s| s.vpid.clone())?;
        self.sessions.remove(&vpid)
    }

    /// Record that executable `exec_name` of listed game `uid` is installed,
    /// optionally at `installed_path`.
    pub fn mark_installed(
        &mut self,
        store: &mut CatalogStore,
        uid: &str,
        exec_name: &str,
        installed_path: Option<&Path>,
    ) -> Resolution {
        let patch = ExecutablePatch {
            path: installed_path.map(|p| p.to_string_lossy().to_string()),
            is_installed: Some(true),
            ..Default::default()
        };
        match store.update_executable_by_name(uid, exec_name, patch) {
            Some(exe) => Resolution::Applied {
                uid: uid.to_string(),
                executable: exe.name.clone(),
                state: ExecutableState::of(exe),
            },
            None => unresolved(exec_name),
        }
    }

    /// Mark every listed executable found on disk under
    /// `<games_root>/<game id>/<executable name>` as installed.
    ///
    /// Returns the executables whose state changed.
    pub fn detect_installed(&mut self, store: &mut CatalogStore, games_root: &Path) -> Vec<Resolution> {
        let mut found = Vec::new();
        for game in store.games() {
            let Some(uid) = game.uid.as_deref() else {
                continue;
            };
            for exe in &game.executables {
                let candidate = join_relative(&games_root.join(&game.id), &exe.name);
                if exe.is_installed != Some(true) && candidate.is_file() {
                    found.push((uid.to_string(), exe.name.clone(), candidate));
                }
            }
        }

        found
            .into_iter()
            .filter_map(|(uid, name, path)| {
                let patch = ExecutablePatch {
                    path: Some(path.to_string_lossy().to_string()),
                    is_installed: Some(true),
                    ..Default::default()
                };
                let exe = store.update_executable_by_name(&uid, &name, patch)?;
                tracing::debug!("Detected {} at {}", name, path.display());
                Some(Resolution::Applied {
                    uid,
                    executable: name,
                    state: ExecutableState::of(exe),
                })
            })
            .collect()
    }
}

/// Resolve `exec_path` to a listed executable and mutate it in place.
fn resolve_and_update<F>(store: &mut CatalogStore, exec_path: &str, update: F) -> Resolution
where
    F: FnOnce(&mut GameExecutable),
{
    let Some(game_index) = store.index_of_executable(exec_path) else {
        return unresolved(exec_path);
    };
    let Some(game) = store.game_at_mut(game_index) else {
        return unresolved(exec_path);
    };
    let Some(exe_index) = executable_index_by_path(game, exec_path) else {
        return unresolved(exec_path);
    };

    let exe = &mut game.executables[exe_index];
    update(exe);
    let executable = exe.name.clone();
    let state = ExecutableState::of(exe);
    game.refresh_aggregate_flags();

    Resolution::Applied {
        uid: game.uid.clone().unwrap_or_default(),
        executable,
        state,
    }
}

fn unresolved(exec_path: &str) -> Resolution {
    tracing::debug!("No listed executable matches {}, event dropped", exec_path);
    Resolution::Unresolved {
        path: exec_path.to_string(),
    }
}
