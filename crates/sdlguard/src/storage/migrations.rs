//! Schema versioning for the roadmap store.
//!
//! Each [`Migration`] runs in its own transaction together with the version
//! bump, so an interrupted upgrade leaves the previous version intact.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_INITIATIVES_TABLE, CREATE_METADATA_TABLE, CREATE_MILESTONES_TABLE,
    CREATE_MILESTONE_INITIATIVE_INDEX,
};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// One step of the schema history.
#[derive(Debug)]
pub struct Migration {
    /// Version the database is at after this step.
    pub version: i32,
    /// Short summary for logs.
    pub description: &'static str,
    /// Statements applied in order.
    pub statements: &'static [&'static str],
}

/// Every migration, oldest first.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "initiatives and milestones",
    statements: &[
        CREATE_INITIATIVES_TABLE,
        CREATE_MILESTONES_TABLE,
        CREATE_MILESTONE_INITIATIVE_INDEX,
    ],
}];

/// The schema version this build writes.
#[must_use]
pub fn current_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the database schema up to [`current_version`].
///
/// # Errors
///
/// Returns an error if a migration fails, or if the database was written
/// by a newer build.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let found = get_schema_version(conn)?;
    let supported = current_version();
    if found > supported {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {found} is newer than supported version {supported}"
            ),
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > found) {
        apply(conn, migration)?;
    }
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    debug!(
        version = migration.version,
        "Applying migration: {}", migration.description
    );

    let tx = conn.unchecked_transaction()?;
    for statement in migration.statements {
        tx.execute(statement, []).map_err(|e| Error::DatabaseMigration {
            message: format!("migration {} failed: {e}", migration.version),
        })?;
    }
    tx.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, migration.version.to_string()),
    )?;
    tx.commit()?;
    Ok(())
}

/// The stored schema version, or 0 for a fresh database.
///
/// # Errors
///
/// Returns an error if the stored value is not a number.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    let stored: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match stored {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}
