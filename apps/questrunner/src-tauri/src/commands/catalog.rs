//! Catalog commands: the game database and the active list

use tauri::State;

use crate::app::AppContext;
use crate::catalog::{Game, GamePatch};
use crate::tracker::{can_play_game, RunSession};
use crate::utils::safe_parse_json;

/// Search the game database by name or alias.
#[tauri::command]
#[specta::specta]
pub fn search_games(ctx: State<'_, AppContext>, query: String, limit: Option<u32>) -> Vec<Game> {
    let limit = limit.unwrap_or(25) as usize;
    ctx.game_database()
        .search(&query, limit)
        .into_iter()
        .cloned()
        .collect()
}

#[tauri::command]
#[specta::specta]
pub fn get_active_games(ctx: State<'_, AppContext>) -> Result<Vec<Game>, String> {
    Ok(ctx.list_games()?)
}

/// Copy a game from the database onto the active list; returns its uid.
#[tauri::command]
#[specta::specta]
pub fn add_game(ctx: State<'_, AppContext>, game_id: String) -> Result<String, String> {
    let _span = crate::operation_span!("add_game", game_id = %game_id).entered();
    Ok(ctx.add_game(&game_id)?)
}

#[tauri::command]
#[specta::specta]
pub fn remove_game(ctx: State<'_, AppContext>, uid: String) -> Result<Game, String> {
    Ok(ctx.remove_game(&uid)?)
}

#[tauri::command]
#[specta::specta]
pub fn select_game(ctx: State<'_, AppContext>, uid: String) -> Result<Game, String> {
    Ok(ctx.select_game(&uid)?)
}

#[tauri::command]
#[specta::specta]
pub fn get_selected_game(ctx: State<'_, AppContext>) -> Result<Option<Game>, String> {
    Ok(ctx.session()?.store.selected_game().cloned())
}

/// Merge a partial game into the listed entry. The patch may arrive as an
/// object or as JSON text; anything unreadable is treated as an empty patch.
#[tauri::command]
#[specta::specta]
pub fn update_game(
    ctx: State<'_, AppContext>,
    uid: String,
    patch: serde_json::Value,
) -> Result<Game, String> {
    let patch: GamePatch = safe_parse_json(patch, GamePatch::default());
    Ok(ctx.update_game(&uid, patch)?)
}

/// Runs currently observed by the tracker.
#[tauri::command]
#[specta::specta]
pub fn get_run_sessions(ctx: State<'_, AppContext>) -> Result<Vec<RunSession>, String> {
    let session = ctx.session()?;
    let mut runs: Vec<RunSession> = session.tracker.sessions().values().cloned().collect();
    runs.sort_by_key(|r| r.started_at);
    Ok(runs)
}

/// Whether listed game `uid` is installed and idle.
#[tauri::command]
#[specta::specta]
pub fn can_play(ctx: State<'_, AppContext>, uid: String) -> Result<bool, String> {
    let session = ctx.session()?;
    Ok(can_play_game(session.store.get_game_by_uid(&uid)))
}
