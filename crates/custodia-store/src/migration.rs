//! Database schema migrations for SQLite.
//!
//! Each migration is a SQL batch that transforms the schema from version N
//! to N+1. Versions applied are recorded in `schema_migrations`.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<u32>>(0)
        })
        .optional()?
        .flatten()
        .unwrap_or(0);

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{current} is newer than supported v{CURRENT_VERSION}"
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;
            tx.execute(
                "INSERT INTO schema_migrations (version) VALUES (?1)",
                [version],
            )?;
            tracing::debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: entities, grants, and the sequence counter.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE entities (
            entity_ref INTEGER PRIMARY KEY,
            designation TEXT NOT NULL,
            custodian BLOB NOT NULL,            -- 32 bytes, Ed25519 public key
            cipher_fingerprint TEXT NOT NULL,   -- 64 chars
            abstract TEXT NOT NULL,
            genesis_height INTEGER NOT NULL,
            revision_height INTEGER NOT NULL,
            taxonomy TEXT NOT NULL,
            tags BLOB NOT NULL                  -- CBOR array of strings
        );

        -- At most one grant per (entity, accessor); later grants replace earlier ones
        CREATE TABLE grants (
            entity_ref INTEGER NOT NULL REFERENCES entities(entity_ref),
            accessor BLOB NOT NULL,
            grantor BLOB NOT NULL,
            tier INTEGER NOT NULL,              -- 1=observer, 2=editor, 3=controller
            authorization_height INTEGER NOT NULL,
            termination_height INTEGER NOT NULL,
            edit_permissions INTEGER NOT NULL,
            PRIMARY KEY (entity_ref, accessor)
        );

        -- Single-row counter backing entity ref allocation
        CREATE TABLE registry_sequence (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            value INTEGER NOT NULL
        );
        INSERT INTO registry_sequence (id, value) VALUES (0, 0);

        CREATE INDEX idx_entities_custodian ON entities(custodian);
        CREATE INDEX idx_grants_accessor ON grants(accessor);
        "#,
    )?;

    Ok(())
}
