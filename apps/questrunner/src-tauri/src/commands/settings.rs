use std::collections::HashMap;

use tauri::State;

use crate::app::AppContext;
use crate::db::repository;
use crate::settings::AppSettings;

#[tauri::command]
#[specta::specta]
pub fn get_setting(ctx: State<'_, AppContext>, key: String) -> Result<Option<serde_json::Value>, String> {
    Ok(ctx.database().get_setting(&key)?)
}

#[tauri::command]
#[specta::specta]
pub fn set_setting(ctx: State<'_, AppContext>, key: String, value: serde_json::Value) -> Result<(), String> {
    Ok(ctx.database().set_setting(&key, &value)?)
}

#[tauri::command]
#[specta::specta]
pub fn get_all_settings(ctx: State<'_, AppContext>) -> Result<HashMap<String, serde_json::Value>, String> {
    let conn = ctx.database().lock()?;
    Ok(repository::get_all_settings(&conn)?)
}

#[tauri::command]
#[specta::specta]
pub fn get_app_settings(ctx: State<'_, AppContext>) -> Result<AppSettings, String> {
    Ok(ctx.settings()?)
}

/// Folder and template changes apply on the next start.
#[tauri::command]
#[specta::specta]
pub fn save_app_settings(ctx: State<'_, AppContext>, settings: AppSettings) -> Result<(), String> {
    Ok(ctx.save_settings(settings)?)
}
