//! Application lifecycle event handling

use tauri::{AppHandle, Manager, RunEvent, WindowEvent};

use super::AppContext;

/// Handle window events
pub fn handle_window_event(window: &tauri::Window, event: &WindowEvent) {
    if let WindowEvent::Destroyed = event {
        tracing::debug!("Window {} destroyed", window.label());
    }
}

/// Handle application run events
///
/// Games dispatched by the runner are stopped when the app exits so no
/// placeholder process outlives the launcher.
pub fn handle_run_event(app: &AppHandle, event: RunEvent) {
    if let RunEvent::ExitRequested { .. } = event {
        let Some(ctx) = app.try_state::<AppContext>() else {
            return;
        };
        let uids: Vec<String> = match ctx.session() {
            Ok(session) => session
                .store
                .games()
                .iter()
                .filter(|g| g.is_running == Some(true))
                .filter_map(|g| g.uid.clone())
                .collect(),
            Err(e) => {
                tracing::warn!("Could not read running games on exit: {}", e);
                return;
            }
        };

        for uid in uids {
            if let Err(e) = tauri::async_runtime::block_on(ctx.stop(&uid)) {
                tracing::warn!("Failed to stop {} on exit: {}", uid, e);
            }
        }
    }
}
