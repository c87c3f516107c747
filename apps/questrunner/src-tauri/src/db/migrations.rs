use rusqlite::{Connection, Result};

/// Current schema version - increment this when adding new migrations
pub const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    let current_version = get_current_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        set_version(conn, 1)?;
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        set_version(conn, 2)?;
    }

    if current_version < CURRENT_VERSION {
        tracing::info!(
            "Migrated database from v{} to v{}",
            current_version,
            CURRENT_VERSION
        );
    }

    Ok(())
}

/// Get the current schema version
fn get_current_version(conn: &Connection) -> Result<i32> {
    let result: Result<i32, _> = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    );
    Ok(result.unwrap_or(0))
}

fn set_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [version],
    )?;
    conn.execute(
        r#"
        INSERT INTO settings (key, value, description) VALUES ('db_version', ?1, 'Current database schema version')
        ON CONFLICT(key) DO UPDATE SET value = ?1, updated_at = datetime('now')
        "#,
        [version.to_string()],
    )?;
    Ok(())
}

/// Migration v1: launcher settings
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR IGNORE INTO settings (key, value, description) VALUES
            ('games_dir', '""', 'Folder the placeholder games are installed into'),
            ('template_executable', '""', 'Executable copied when installing a game')
        "#,
        [],
    )?;
    Ok(())
}

/// Migration v2: optional external detectable-games list
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR IGNORE INTO settings (key, value, description) VALUES
            ('game_db_path', 'null', 'Detectable games list to load instead of the bundled one')
        "#,
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    fn versions(conn: &Connection) -> Vec<i32> {
        conn.prepare("SELECT version FROM schema_migrations ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_migrations_apply_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_database(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(versions(&conn), vec![1, 2]);
        assert_eq!(get_current_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_database(&conn).unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(versions(&conn), vec![1, 2]);
    }

    #[test]
    fn test_existing_values_survive_migration() {
        let conn = Connection::open_in_memory().unwrap();
        schema::init_database(&conn).unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES ('games_dir', '\"/custom\"')",
            [],
        )
        .unwrap();
        run_migrations(&conn).unwrap();

        let value: String = conn
            .query_row("SELECT value FROM settings WHERE key = 'games_dir'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "\"/custom\"");
    }
}
