//! Launch, stop, and install commands

use tauri::State;

use crate::app::AppContext;

#[tauri::command]
#[specta::specta]
pub async fn play_game(
    ctx: State<'_, AppContext>,
    uid: String,
    executable: String,
) -> Result<String, String> {
    Ok(ctx.play(&uid, &executable).await?)
}

#[tauri::command]
#[specta::specta]
pub async fn stop_game(ctx: State<'_, AppContext>, uid: String) -> Result<String, String> {
    Ok(ctx.stop(&uid).await?)
}

/// Install a placeholder executable; returns where it was written.
#[tauri::command]
#[specta::specta]
pub fn install_game(
    ctx: State<'_, AppContext>,
    uid: String,
    executable: String,
) -> Result<String, String> {
    let _span = crate::operation_span!("install_game", uid = %uid).entered();
    let path = ctx.install(&uid, &executable)?;
    Ok(path.to_string_lossy().to_string())
}

/// Mark listed executables already present in the games folder; returns how
/// many changed.
#[tauri::command]
#[specta::specta]
pub fn detect_installed_games(ctx: State<'_, AppContext>) -> Result<u32, String> {
    let found = ctx.detect_installed()?;
    Ok(found.iter().filter(|r| r.is_applied()).count() as u32)
}
