//! Process runner backed by `tokio::process`
//!
//! Launches `<games_root>/<app_id>/<path>/<executable_name>` with its folder as
//! working directory, then watches the child in a background task so its exit
//! can be reported on the event bus.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::oneshot;

use super::RunBackgroundProcessPayload;
use crate::error::{QuestError, Result};
use crate::events::{AppEvent, EventEmitter, ProcessEventPayload};
use crate::utils::paths::{join_relative, split_executable_path};

/// The external collaborator that actually starts and stops processes.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Start the executable described by `request`.
    async fn launch(&self, request: RunBackgroundProcessPayload) -> Result<String>;

    /// Stop the process dispatched for `app_id`.
    async fn stop(&self, app_id: i64) -> Result<String>;
}

/// A process started by this runner and not yet reaped. The slot is taken
/// before spawning, so `pid` stays `None` until the child exists.
struct DispatchedProcess {
    launch_id: u64,
    pid: Option<u32>,
    full_executable_path: String,
    kill: oneshot::Sender<()>,
}

type DispatchedMap = Arc<Mutex<HashMap<i64, DispatchedProcess>>>;

pub struct TokioProcessRunner {
    games_root: PathBuf,
    events: Arc<dyn EventEmitter>,
    dispatched: DispatchedMap,
    next_launch_id: AtomicU64,
}

/// Where a request resolves to on disk
struct LaunchTarget {
    executable_name: String,
    game_folder: PathBuf,
    executable_path: PathBuf,
    /// Relative `path/executable_name`, the key the tracker resolves on
    full_executable_path: String,
}

impl TokioProcessRunner {
    pub fn new(games_root: impl Into<PathBuf>, events: Arc<dyn EventEmitter>) -> Self {
        Self {
            games_root: games_root.into(),
            events,
            dispatched: Arc::new(Mutex::new(HashMap::new())),
            next_launch_id: AtomicU64::new(1),
        }
    }

    pub fn games_root(&self) -> &Path {
        &self.games_root
    }

    /// App ids with a live dispatched process.
    pub fn running_app_ids(&self) -> Result<Vec<i64>> {
        let map = self.dispatched.lock().map_err(|e| QuestError::lock(e.to_string()))?;
        Ok(map.keys().copied().collect())
    }

    fn resolve(&self, request: &RunBackgroundProcessPayload) -> Result<LaunchTarget> {
        let parts = split_executable_path(&request.exec_path);
        let executable_name = request
            .executable_name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or(parts.file);
        if executable_name.is_empty() {
            return Err(QuestError::validation("No executable name in launch request"));
        }

        let relative_dir = request.path.clone().or(parts.dir).unwrap_or_default();
        if relative_dir.split(|c: char| c == '/' || c == '\\').any(|s| s == "..") {
            return Err(QuestError::validation(format!(
                "Launch path '{}' leaves the games folder",
                relative_dir
            )));
        }

        let game_folder = join_relative(
            &self.games_root.join(request.app_id.to_string()),
            &relative_dir,
        );
        let executable_path = game_folder.join(&executable_name);
        let full_executable_path = join_relative(Path::new(""), &relative_dir)
            .join(&executable_name)
            .to_string_lossy()
            .to_string();

        Ok(LaunchTarget {
            executable_name,
            game_folder,
            executable_path,
            full_executable_path,
        })
    }

    fn emit(&self, event: AppEvent) {
        self.events.emit_event(event);
    }

    /// Claim the slot for `app_id`, failing if another launch holds it.
    fn reserve(
        &self,
        app_id: i64,
        full_executable_path: &str,
        kill: oneshot::Sender<()>,
    ) -> Result<u64> {
        let mut map = self.dispatched.lock().map_err(|e| QuestError::lock(e.to_string()))?;
        if map.contains_key(&app_id) {
            return Err(QuestError::launch(format!(
                "App {} already has a running process",
                app_id
            )));
        }
        let launch_id = self.next_launch_id.fetch_add(1, Ordering::Relaxed);
        map.insert(
            app_id,
            DispatchedProcess {
                launch_id,
                pid: None,
                full_executable_path: full_executable_path.to_string(),
                kill,
            },
        );
        Ok(launch_id)
    }

    fn release(&self, app_id: i64, launch_id: u64) {
        release_slot(&self.dispatched, app_id, launch_id);
    }
}

fn release_slot(dispatched: &DispatchedMap, app_id: i64, launch_id: u64) {
    if let Ok(mut map) = dispatched.lock() {
        if map.get(&app_id).map(|d| d.launch_id) == Some(launch_id) {
            map.remove(&app_id);
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn launch(&self, request: RunBackgroundProcessPayload) -> Result<String> {
        let app_id = request.app_id;
        let target = self.resolve(&request)?;
        let (kill_tx, kill_rx) = oneshot::channel();
        let launch_id = self.reserve(app_id, &target.full_executable_path, kill_tx)?;

        let payload = |pid: Option<u32>, running: bool, status: Option<i32>, error: Option<String>| {
            ProcessEventPayload {
                app_id: app_id.to_string(),
                executable_name: target.executable_name.clone(),
                full_executable_path: target.full_executable_path.clone(),
                pid,
                status,
                running,
                error,
            }
        };

        let spawn_result = Command::new(&target.executable_path)
            .current_dir(&target.game_folder)
            .spawn();

        let mut child = match spawn_result {
            Ok(child) => child,
            Err(e) => {
                self.release(app_id, launch_id);
                tracing::warn!("Failed to launch {}: {}", target.executable_path.display(), e);
                self.emit(AppEvent::BackgroundProcessResult(payload(
                    None,
                    false,
                    None,
                    Some(e.to_string()),
                )));
                return Err(QuestError::launch(format!("Failed to launch executable: {}", e)));
            }
        };

        let pid = child.id();
        tracing::info!(
            "Launched {} for app {} (pid {:?})",
            target.executable_path.display(),
            app_id,
            pid
        );

        if let Ok(mut map) = self.dispatched.lock() {
            if let Some(entry) = map.get_mut(&app_id).filter(|d| d.launch_id == launch_id) {
                entry.pid = pid;
            }
        }

        self.emit(AppEvent::BackgroundProcessResult(payload(pid, true, None, None)));

        let exited = payload(pid, false, None, None);
        let events = Arc::clone(&self.events);
        let dispatched = Arc::clone(&self.dispatched);
        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => status.code(),
                    Err(e) => {
                        tracing::warn!("Failed to wait on app {}: {}", app_id, e);
                        None
                    }
                },
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!("Failed to kill app {}: {}", app_id, e);
                    }
                    None
                }
            };

            release_slot(&dispatched, app_id, launch_id);

            tracing::info!("App {} exited with status {:?}", app_id, status);
            events.emit_event(AppEvent::BackgroundProcessExited(ProcessEventPayload {
                status,
                ..exited
            }));
        });

        Ok("Executable launched".to_string())
    }

    async fn stop(&self, app_id: i64) -> Result<String> {
        let dispatched = {
            let mut map = self.dispatched.lock().map_err(|e| QuestError::lock(e.to_string()))?;
            map.remove(&app_id)
        }
        .ok_or_else(|| QuestError::not_found("Running process for app", app_id.to_string()))?;

        tracing::info!(
            "Stopping {} for app {} (pid {:?})",
            dispatched.full_executable_path,
            app_id,
            dispatched.pid
        );

        // The watcher may already be reaping an exit; either way it reports it.
        let _ = dispatched.kill.send(());
        Ok("Executable stopped successfully".to_string())
    }
}
