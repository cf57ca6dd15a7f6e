//! Database schema versioning for voicememo.
//!
//! The applied version is kept in `PRAGMA user_version`. Each pending
//! [`Migration`] runs in its own transaction together with the version bump.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Error, Result};

use super::schema::{Migration, MIGRATIONS};

/// Latest schema version this build understands.
#[must_use]
pub fn current_version() -> i32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the schema up to [`current_version`].
///
/// # Errors
///
/// Returns [`Error::DatabaseMigration`] if the database was written by a
/// newer build, or a query error if a migration fails.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    let applied = schema_version(conn)?;
    let latest = current_version();

    if applied > latest {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {applied} is newer than supported version {latest}"
            ),
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        apply(conn, migration)?;
    }
    Ok(())
}

/// Version recorded in the database; 0 for a fresh file.
fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn apply(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(migration.sql)?;
    tx.pragma_update(None, "user_version", migration.version)?;
    tx.commit()?;

    info!(
        version = migration.version,
        "Applied migration: {}", migration.description
    );
    Ok(())
}
