//! Application event types for the event bus system.
//!
//! Process events mirror the two channels of the process runner. Catalog
//! events are emitted after the active list changed so the frontend can
//! re-render.

use serde::{Deserialize, Serialize};
use specta::Type;

use crate::tracker::ExecutableState;

/// Channel carrying launch results: started, or failed to start
pub const EVT_BACKGROUND_PROCESS_RESULT: &str = "background_process_result";

/// Channel carrying the exit of a dispatched process
pub const EVT_BACKGROUND_PROCESS_EXITED: &str = "run_background_process_exited";

/// Channel for catalog change notifications
pub const EVT_CATALOG_CHANGED: &str = "catalog_changed";

/// Payload shared by both process-runner channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Type)]
pub struct ProcessEventPayload {
    pub app_id: String,
    pub executable_name: String,
    pub full_executable_path: String,
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(default)]
    pub status: Option<i32>,
    pub running: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Application events that flow through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, Type)]
#[serde(tag = "type", content = "payload")]
pub enum AppEvent {
    // =========================================================================
    // Process runner events
    // =========================================================================
    /// A launch request completed: the process is running, or failed to start
    BackgroundProcessResult(ProcessEventPayload),

    /// A dispatched process exited or was stopped
    BackgroundProcessExited(ProcessEventPayload),

    // =========================================================================
    // Catalog events
    // =========================================================================
    /// A game joined the active list
    GameAdded { uid: String, game_id: String },

    /// A game left the active list
    GameRemoved { uid: String, game_id: String },

    /// An executable's tracked state changed
    ExecutableStateChanged {
        uid: String,
        executable: String,
        state: ExecutableState,
    },
}

impl AppEvent {
    /// Name of the frontend channel this event is delivered on.
    pub fn channel(&self) -> &'static str {
        match self {
            AppEvent::BackgroundProcessResult(_) => EVT_BACKGROUND_PROCESS_RESULT,
            AppEvent::BackgroundProcessExited(_) => EVT_BACKGROUND_PROCESS_EXITED,
            AppEvent::GameAdded { .. }
            | AppEvent::GameRemoved { .. }
            | AppEvent::ExecutableStateChanged { .. } => EVT_CATALOG_CHANGED,
        }
    }

    /// The process payload, if this is a process-runner event.
    pub fn process_payload(&self) -> Option<&ProcessEventPayload> {
        match self {
            AppEvent::BackgroundProcessResult(payload)
            | AppEvent::BackgroundProcessExited(payload) => Some(payload),
            _ => None,
        }
    }

    /// Get a short description of the event for logging.
    pub fn description(&self) -> String {
        match self {
            AppEvent::BackgroundProcessResult(p) => match &p.error {
                Some(error) => format!("Launch of {} failed: {}", p.full_executable_path, error),
                None => format!(
                    "Process {} running={} (pid {:?})",
                    p.full_executable_path, p.running, p.pid
                ),
            },
            AppEvent::BackgroundProcessExited(p) => {
                format!(
                    "Process {} exited with status {:?}",
                    p.full_executable_path, p.status
                )
            }
            AppEvent::GameAdded { uid, game_id } => {
                format!("Game {} added as {}", game_id, uid)
            }
            AppEvent::GameRemoved { uid, game_id } => {
                format!("Game {} ({}) removed", game_id, uid)
            }
            AppEvent::ExecutableStateChanged {
                uid,
                executable,
                state,
            } => {
                format!("Executable {} of {} is now {:?}", executable, uid, state)
            }
        }
    }
}
