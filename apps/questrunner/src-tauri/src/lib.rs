//! Quest Runner - launches and tracks the executables of a game catalog
//!
//! The core (catalog, tracker, launcher, settings) builds without a webview.
//! The `desktop` feature wraps it in the Tauri application below.

pub mod app;
#[cfg(feature = "desktop")]
mod commands;
pub mod catalog;
pub mod db;
pub mod error;
pub mod events;
pub mod launcher;
pub mod logging;
pub mod settings;
pub mod tracker;
pub mod utils;

#[cfg(feature = "desktop")]
use app::{handle_run_event, handle_window_event, register_plugins, AppContext};

#[cfg(feature = "desktop")]
fn specta_builder() -> tauri_specta::Builder<tauri::Wry> {
    tauri_specta::Builder::<tauri::Wry>::new()
        .commands(tauri_specta::collect_commands![
            // Catalog
            commands::catalog::search_games,
            commands::catalog::get_active_games,
            commands::catalog::add_game,
            commands::catalog::remove_game,
            commands::catalog::select_game,
            commands::catalog::get_selected_game,
            commands::catalog::update_game,
            commands::catalog::get_run_sessions,
            commands::catalog::can_play,
            // Launcher
            commands::launcher::play_game,
            commands::launcher::stop_game,
            commands::launcher::install_game,
            commands::launcher::detect_installed_games,
            // Settings
            commands::settings::get_setting,
            commands::settings::set_setting,
            commands::settings::get_all_settings,
            commands::settings::get_app_settings,
            commands::settings::save_app_settings,
        ])
        .typ::<events::AppEvent>()
        .typ::<events::ProcessEventPayload>()
}

/// Write the TypeScript bindings for the frontend.
#[cfg(feature = "desktop")]
pub fn export_bindings(path: &str) -> anyhow::Result<()> {
    use anyhow::Context;

    specta_builder()
        .export(
            specta_typescript::Typescript::default()
                .bigint(specta_typescript::BigIntExportBehavior::Number),
            path,
        )
        .context("Failed to export TypeScript bindings")
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    logging::init();
    tracing::info!("Starting Quest Runner");

    let builder = specta_builder();

    let result = register_plugins(tauri::Builder::default())
        .setup(|app| {
            use tauri::Manager;

            let ctx = AppContext::bootstrap()?;

            // Subscriptions start only once every component exists
            let pump = tauri::async_runtime::block_on(async { ctx.start_event_pump() });
            tauri::async_runtime::spawn(async move {
                if let Err(e) = pump.await {
                    tracing::error!("Tracker handler stopped: {}", e);
                }
            });
            events::handlers::frontend::start_handler(app.handle().clone(), ctx.events().subscribe());

            match ctx.detect_installed() {
                Ok(found) => tracing::info!("Detected {} installed executables", found.len()),
                Err(e) => tracing::warn!("Install detection failed: {}", e),
            }

            app.manage(ctx);
            Ok(())
        })
        .on_window_event(handle_window_event)
        .invoke_handler(builder.invoke_handler())
        .build(tauri::generate_context!());

    match result {
        Ok(app) => app.run(handle_run_event),
        Err(e) => tracing::error!("Error while running tauri application: {}", e),
    }
}
