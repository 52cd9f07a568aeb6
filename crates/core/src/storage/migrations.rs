//! Database migration system
//!
//! Tracks schema versions and applies migrations in order.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{info, instrument};

use crate::error::Result;

/// A database migration
pub struct Migration {
    /// Version number (must be sequential starting from 1)
    pub version: u32,
    /// Description of what this migration does
    pub description: &'static str,
    /// SQL to run for this migration
    pub sql: &'static str,
}

/// All migrations in order
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Users table; ids are assigned by the store and never reused
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Folder registrations; owner_id is a plain back-reference
            CREATE TABLE IF NOT EXISTS folders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL,
                folder_name TEXT NOT NULL,
                folder_path TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(owner_id, folder_path)
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add folder owner index",
        sql: r#"
            CREATE INDEX IF NOT EXISTS idx_folders_owner ON folders(owner_id);
        "#,
    },
];

fn init_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Highest applied migration, 0 for a fresh store
pub(crate) fn current_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Run all pending migrations, each in its own transaction
#[instrument(skip(conn))]
pub fn run_migrations(conn: &Connection) -> Result<()> {
    init_migrations_table(conn)?;

    let from = current_version(conn)?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > from);

    for migration in pending {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            params![
                migration.version,
                migration.description,
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;

        info!(
            version = migration.version,
            description = migration.description,
            "Applied migration"
        );
    }

    let to = current_version(conn)?;
    if to > from {
        info!(from, to, "Store schema updated");
    }

    Ok(())
}
