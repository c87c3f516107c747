//! Frontend event forwarder.
//!
//! Relays bus events to the webview. Process events go out on the runner's
//! own channel names with the bare payload; catalog events go out on
//! `catalog_changed` as the tagged event.

use crate::events::AppEvent;
use tauri::{AppHandle, Emitter};
use tokio::sync::broadcast;

/// Start the frontend event forwarder.
pub fn start_handler(app_handle: AppHandle, mut receiver: broadcast::Receiver<AppEvent>) {
    tracing::debug!("Starting frontend event forwarder");

    tauri::async_runtime::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let result = match event.process_payload() {
                        Some(payload) => app_handle.emit(event.channel(), payload),
                        None => app_handle.emit(event.channel(), &event),
                    };
                    if let Err(e) = result {
                        tracing::warn!("Failed to emit event to frontend: {}", e);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        "Frontend event forwarder lagged {} events - some UI updates may be missed",
                        n
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, stopping frontend forwarder");
                    break;
                }
            }
        }
    });
}
