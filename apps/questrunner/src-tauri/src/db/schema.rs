use rusqlite::{Connection, Result};

pub fn init_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- App Settings
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            description TEXT,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    // Insert default settings if not exists
    conn.execute(
        r#"
        INSERT OR IGNORE INTO settings (key, value, description) VALUES
            ('app_version', '"0.1.0"', 'Current application version'),
            ('default_game_path', '""', 'Default directory for game executables')
        "#,
        [],
    )?;

    Ok(())
}
