//! SQLite implementation of the Store trait.
//!
//! The persistent backend for the registry. Uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use custodia_core::{Entity, EntityRef, Grant, Height, Inscription, Principal, Tier};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

const ENTITY_COLUMNS: &str = "entity_ref, designation, custodian, cipher_fingerprint, abstract,
     genesis_height, revision_height, taxonomy, tags";

const GRANT_COLUMNS: &str = "entity_ref, accessor, grantor, tier, authorization_height,
     termination_height, edit_permissions";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations run on the blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", true)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Backend(format!("mutex poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("spawn_blocking failed: {e}")))?
    }
}

fn encode_tags(tags: &[String]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(tags, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_tags(bytes: &[u8]) -> Result<Vec<String>> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn principal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Principal> {
    let bytes: Vec<u8> = row.get(idx)?;
    Principal::try_from(bytes.as_slice()).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Blob, Box::new(e))
    })
}

// Heights and refs are u64; SQLite stores them as i64 bit patterns.
fn height_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Height> {
    Ok(Height::new(row.get::<_, i64>(idx)? as u64))
}

/// Raw entity row; tags are still CBOR.
struct EntityRow {
    entity: Entity,
    tags: Vec<u8>,
}

fn row_to_entity(row: &Row<'_>) -> rusqlite::Result<EntityRow> {
    Ok(EntityRow {
        entity: Entity {
            entity_ref: EntityRef::new(row.get::<_, i64>(0)? as u64),
            designation: row.get(1)?,
            custodian: principal_column(row, 2)?,
            cipher_fingerprint: row.get(3)?,
            summary: row.get(4)?,
            genesis_height: height_column(row, 5)?,
            revision_height: height_column(row, 6)?,
            taxonomy: row.get(7)?,
            tags: Vec::new(),
        },
        tags: row.get(8)?,
    })
}

impl EntityRow {
    fn finish(mut self) -> Result<Entity> {
        self.entity.tags = decode_tags(&self.tags)?;
        Ok(self.entity)
    }
}

fn row_to_grant(row: &Row<'_>) -> rusqlite::Result<Grant> {
    let tier_raw: u8 = row.get(3)?;
    let tier = Tier::from_u8(tier_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Integer,
            format!("unknown tier {tier_raw}").into(),
        )
    })?;

    Ok(Grant {
        entity_ref: EntityRef::new(row.get::<_, i64>(0)? as u64),
        accessor: principal_column(row, 1)?,
        grantor: principal_column(row, 2)?,
        tier,
        authorization_height: height_column(row, 4)?,
        termination_height: height_column(row, 5)?,
        edit_permissions: row.get(6)?,
    })
}

fn select_entity(conn: &Connection, entity_ref: EntityRef) -> Result<Option<Entity>> {
    conn.query_row(
        &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE entity_ref = ?1"),
        params![entity_ref.get() as i64],
        row_to_entity,
    )
    .optional()?
    .map(EntityRow::finish)
    .transpose()
}

fn query_grants(conn: &Connection, sql: &str, key: &dyn rusqlite::ToSql) -> Result<Vec<Grant>> {
    let mut stmt = conn.prepare(sql)?;
    let grants = stmt
        .query_map(&[key], row_to_grant)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(grants)
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_entity(
        &self,
        custodian: &Principal,
        inscription: &Inscription,
        now: Height,
    ) -> Result<Entity> {
        let custodian = *custodian;
        let inscription = inscription.clone();

        self.with_conn(move |conn| {
            let tx = conn.transaction()?;

            let sequence: i64 =
                tx.query_row("SELECT value FROM registry_sequence WHERE id = 0", [], |row| {
                    row.get(0)
                })?;
            let entity_ref = EntityRef::new(sequence as u64 + 1);

            let exists: Option<i64> = tx
                .query_row(
                    "SELECT entity_ref FROM entities WHERE entity_ref = ?1",
                    params![entity_ref.get() as i64],
                    |row| row.get(0),
                )
                .optional()?;
            if exists.is_some() {
                tracing::warn!(%entity_ref, "allocated entity ref already present");
                return Err(StoreError::Conflict(entity_ref));
            }

            let entity = Entity::inscribe(entity_ref, custodian, inscription, now);
            tx.execute(
                &format!(
                    "INSERT INTO entities ({ENTITY_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                params![
                    entity.entity_ref.get() as i64,
                    entity.designation,
                    entity.custodian.as_bytes().as_slice(),
                    entity.cipher_fingerprint,
                    entity.summary,
                    entity.genesis_height.get() as i64,
                    entity.revision_height.get() as i64,
                    entity.taxonomy,
                    encode_tags(&entity.tags)?,
                ],
            )?;
            tx.execute(
                "UPDATE registry_sequence SET value = ?1 WHERE id = 0",
                params![entity_ref.get() as i64],
            )?;

            tx.commit()?;
            Ok(entity)
        })
        .await
    }

    async fn get_entity(&self, entity_ref: EntityRef) -> Result<Option<Entity>> {
        self.with_conn(move |conn| select_entity(conn, entity_ref))
            .await
    }

    async fn put_entity(&self, entity: &Entity) -> Result<()> {
        let entity = entity.clone();

        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE entities SET
                    designation = ?2, custodian = ?3, cipher_fingerprint = ?4, abstract = ?5,
                    genesis_height = ?6, revision_height = ?7, taxonomy = ?8, tags = ?9
                 WHERE entity_ref = ?1",
                params![
                    entity.entity_ref.get() as i64,
                    entity.designation,
                    entity.custodian.as_bytes().as_slice(),
                    entity.cipher_fingerprint,
                    entity.summary,
                    entity.genesis_height.get() as i64,
                    entity.revision_height.get() as i64,
                    entity.taxonomy,
                    encode_tags(&entity.tags)?,
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(entity.entity_ref));
            }
            Ok(())
        })
        .await
    }

    async fn list_entities(&self, custodian: Option<&Principal>) -> Result<Vec<EntityRef>> {
        let custodian = custodian.copied();

        self.with_conn(move |conn| {
            let refs = match custodian {
                Some(c) => {
                    let mut stmt = conn.prepare(
                        "SELECT entity_ref FROM entities WHERE custodian = ?1 ORDER BY entity_ref",
                    )?;
                    let rows = stmt
                        .query_map(params![c.as_bytes().as_slice()], |row| row.get::<_, i64>(0))?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
                None => {
                    let mut stmt =
                        conn.prepare("SELECT entity_ref FROM entities ORDER BY entity_ref")?;
                    let rows = stmt
                        .query_map([], |row| row.get::<_, i64>(0))?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    rows
                }
            };
            Ok(refs.into_iter().map(|r| EntityRef::new(r as u64)).collect())
        })
        .await
    }

    async fn sequence(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let value: i64 =
                conn.query_row("SELECT value FROM registry_sequence WHERE id = 0", [], |row| {
                    row.get(0)
                })?;
            Ok(value as u64)
        })
        .await
    }

    async fn put_grant(&self, grant: &Grant) -> Result<()> {
        let grant = grant.clone();

        self.with_conn(move |conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO grants ({GRANT_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                params![
                    grant.entity_ref.get() as i64,
                    grant.accessor.as_bytes().as_slice(),
                    grant.grantor.as_bytes().as_slice(),
                    grant.tier.to_u8(),
                    grant.authorization_height.get() as i64,
                    grant.termination_height.get() as i64,
                    grant.edit_permissions,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_grant(
        &self,
        entity_ref: EntityRef,
        accessor: &Principal,
    ) -> Result<Option<Grant>> {
        let accessor = *accessor;

        self.with_conn(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {GRANT_COLUMNS} FROM grants WHERE entity_ref = ?1 AND accessor = ?2"
                ),
                params![entity_ref.get() as i64, accessor.as_bytes().as_slice()],
                row_to_grant,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn grants_for_entity(&self, entity_ref: EntityRef) -> Result<Vec<Grant>> {
        self.with_conn(move |conn| {
            query_grants(
                conn,
                &format!(
                    "SELECT {GRANT_COLUMNS} FROM grants WHERE entity_ref = ?1 ORDER BY accessor"
                ),
                &(entity_ref.get() as i64),
            )
        })
        .await
    }

    async fn grants_for_accessor(&self, accessor: &Principal) -> Result<Vec<Grant>> {
        let accessor = accessor.as_bytes().to_vec();

        self.with_conn(move |conn| {
            query_grants(
                conn,
                &format!(
                    "SELECT {GRANT_COLUMNS} FROM grants WHERE accessor = ?1 ORDER BY entity_ref"
                ),
                &accessor,
            )
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use custodia_core::{Keypair, Revision};
    use tempfile::tempdir;

    fn inscription(name: &str) -> Inscription {
        Inscription::new(name, "f".repeat(64), "desc", "art", ["a", "b"])
    }

    #[tokio::test]
    async fn test_sqlite_create_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        let custodian = Keypair::generate().principal();

        let created = store
            .create_entity(&custodian, &inscription("Artifact"), Height::new(7))
            .await
            .unwrap();
        assert_eq!(created.entity_ref, EntityRef::new(1));

        let loaded = store.require_entity(created.entity_ref).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.tags, vec!["a", "b"]);
        assert_eq!(store.sequence().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sqlite_missing_entity() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.get_entity(EntityRef::new(5)).await.unwrap(), None);
        assert!(matches!(
            store.require_entity(EntityRef::new(5)).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sqlite_put_entity() {
        let store = SqliteStore::open_memory().unwrap();
        let custodian = Keypair::generate().principal();
        let mut entity = store
            .create_entity(&custodian, &inscription("Artifact"), Height::new(1))
            .await
            .unwrap();

        entity.apply_revision(
            Revision::new("Artifact2", "e".repeat(64), "desc2", ["c"]),
            Height::new(4),
        );
        store.put_entity(&entity).await.unwrap();

        let loaded = store.require_entity(entity.entity_ref).await.unwrap();
        assert_eq!(loaded.designation, "Artifact2");
        assert_eq!(loaded.revision_height, Height::new(4));
        assert_eq!(loaded.genesis_height, Height::new(1));
    }

    #[tokio::test]
    async fn test_sqlite_grant_replace() {
        let store = SqliteStore::open_memory().unwrap();
        let custodian = Keypair::generate().principal();
        let accessor = Keypair::generate().principal();
        let entity = store
            .create_entity(&custodian, &inscription("Artifact"), Height::new(1))
            .await
            .unwrap();

        let first = Grant::issue(
            entity.entity_ref,
            custodian,
            accessor,
            Tier::Editor,
            100,
            true,
            Height::new(10),
        );
        let second = Grant::issue(
            entity.entity_ref,
            custodian,
            accessor,
            Tier::Observer,
            3,
            false,
            Height::new(12),
        );
        store.put_grant(&first).await.unwrap();
        store.put_grant(&second).await.unwrap();

        assert_eq!(
            store.get_grant(entity.entity_ref, &accessor).await.unwrap(),
            Some(second.clone())
        );
        assert_eq!(store.grants_for_entity(entity.entity_ref).await.unwrap(), vec![second.clone()]);
        assert_eq!(store.grants_for_accessor(&accessor).await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_sqlite_extreme_heights_roundtrip() {
        let store = SqliteStore::open_memory().unwrap();
        let custodian = Keypair::generate().principal();
        let accessor = Keypair::generate().principal();
        let entity = store
            .create_entity(&custodian, &inscription("Artifact"), Height::new(u64::MAX - 1))
            .await
            .unwrap();

        let grant = Grant::issue(
            entity.entity_ref,
            custodian,
            accessor,
            Tier::Controller,
            50,
            false,
            Height::new(u64::MAX - 1),
        );
        assert_eq!(grant.termination_height, Height::new(u64::MAX));
        store.put_grant(&grant).await.unwrap();

        assert_eq!(store.get_grant(entity.entity_ref, &accessor).await.unwrap(), Some(grant));
        assert_eq!(store.require_entity(entity.entity_ref).await.unwrap(), entity);
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.db");
        let custodian = Keypair::generate().principal();

        {
            let store = SqliteStore::open(&path).unwrap();
            store.create_entity(&custodian, &inscription("one"), Height::new(1)).await.unwrap();
            store.create_entity(&custodian, &inscription("two"), Height::new(2)).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.sequence().await.unwrap(), 2);
        let third = store
            .create_entity(&custodian, &inscription("three"), Height::new(3))
            .await
            .unwrap();
        assert_eq!(third.entity_ref, EntityRef::new(3));
        assert_eq!(store.list_entities(Some(&custodian)).await.unwrap().len(), 3);
    }
}
