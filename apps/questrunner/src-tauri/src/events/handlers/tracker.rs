//! Execution tracker event handler.
//!
//! Applies process-runner events to the active list, in the order the bus
//! delivers them, and announces every executable whose state changed.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::app::{Session, SharedSession};
use crate::error::{QuestError, Result};
use crate::events::{AppEvent, EventEmitter};
use crate::tracker::Resolution;

/// Start the tracker handler.
///
/// The session lock is only held while one event is applied.
pub fn start_handler(
    session: SharedSession,
    events: Arc<dyn EventEmitter>,
    mut receiver: broadcast::Receiver<AppEvent>,
) -> JoinHandle<()> {
    tracing::debug!("Starting execution tracker handler");

    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match handle_event(&session, &event) {
                    Ok(resolution) => {
                        if let Some(changed) = resolution.to_event() {
                            events.emit_event(changed);
                        }
                    }
                    Err(e) => tracing::error!("Tracker handler error: {}", e),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        "Tracker handler lagged {} events - run states may be stale",
                        n
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, stopping tracker handler");
                    break;
                }
            }
        }
    })
}

fn handle_event(session: &SharedSession, event: &AppEvent) -> Result<Resolution> {
    if event.process_payload().is_none() {
        return Ok(Resolution::Ignored);
    }

    let mut guard = session.lock().map_err(|e| QuestError::lock(e.to_string()))?;
    let Session { store, tracker } = &mut *guard;
    Ok(tracker.apply(store, event))
}
