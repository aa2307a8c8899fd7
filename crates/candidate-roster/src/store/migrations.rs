//! Schema versioning for the document store.
//!
//! The store records the version it was last migrated to in the `metadata`
//! table. Opening a database applies every step in [`MIGRATIONS`] above that
//! version, each in its own transaction, and refuses a database written by
//! a newer release.

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Error, Result};

use super::schema::{CREATE_COLLECTION_INDEX, CREATE_DOCUMENTS_TABLE, CREATE_METADATA_TABLE};

const VERSION_KEY: &str = "schema_version";

/// One step in the store's schema history.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Version the database is at after this step.
    pub version: i32,
    /// Short description for logs.
    pub description: &'static str,
    statements: &'static [&'static str],
}

/// Every migration, oldest first.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "document collections",
    statements: &[CREATE_DOCUMENTS_TABLE, CREATE_COLLECTION_INDEX],
}];

/// Version a freshly migrated store is at.
#[must_use]
pub fn latest_version() -> i32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Bring the store schema up to [`latest_version`].
///
/// # Errors
///
/// Returns an error if a step fails, if the stored version is unreadable,
/// or if the database belongs to a newer release.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let stored = stored_version(conn)?;
    let latest = latest_version();
    if stored > latest {
        return Err(Error::DatabaseMigration {
            message: format!("store is at schema version {stored}, this build knows {latest}"),
        });
    }

    for migration in MIGRATIONS.iter().filter(|m| m.version > stored) {
        apply(conn, migration)?;
    }
    Ok(())
}

fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    debug!(
        "Applying store migration {} ({})",
        migration.version, migration.description
    );

    let tx = conn.unchecked_transaction()?;
    for statement in migration.statements {
        tx.execute(statement, [])?;
    }
    tx.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, migration.version.to_string()),
    )?;
    tx.commit()?;
    Ok(())
}

/// Version recorded in `metadata`, or 0 for an empty store.
fn stored_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    value.map_or(Ok(0), |value| {
        value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("unreadable schema version '{value}'"),
        })
    })
}
