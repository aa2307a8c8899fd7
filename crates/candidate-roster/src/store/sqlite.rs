//! `SQLite`-backed document store.
//!
//! Documents are stored as JSON text in a single table, keyed by collection
//! and a generated id. Blocking database work runs on tokio's blocking pool
//! so the roster's cooperative thread never stalls on disk I/O.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::{debug, info};

use super::{migrations, Document, DocumentStore, StoreError, StoreOperation};
use crate::error::{Error, Result};
use crate::record::DocumentId;

/// Number of hex characters in a generated document id.
const ID_LEN: usize = 20;

const IN_MEMORY_PATH: &str = ":memory:";

/// Document store persisted in a `SQLite` database.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection, shared with blocking tasks.
    conn: Arc<Mutex<Connection>>,
    /// Mixed into generated ids so two creates never hash alike.
    id_counter: Arc<AtomicU64>,
}

impl SqliteStore {
    /// Open or create a store database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::migrate(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self::from_connection(path, conn))
    }

    /// Create an in-memory store, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(IN_MEMORY_PATH),
            source,
        })?;

        migrations::migrate(&conn)?;

        Ok(Self::from_connection(PathBuf::from(IN_MEMORY_PATH), conn))
    }

    fn from_connection(path: PathBuf, conn: Connection) -> Self {
        Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
            id_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get statistics for a collection.
    ///
    /// This runs on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self, collection: &str) -> Result<StoreStats> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::internal("database connection lock poisoned"))?;

        let documents: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            [collection],
            |row| row.get(0),
        )?;

        let db_size_bytes = if self.path.as_os_str() == IN_MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            collection: collection.to_string(),
            documents,
            db_size_bytes,
        })
    }

    /// Generate a fresh document id.
    fn next_id(&self, collection: &str, body: &str) -> DocumentId {
        let counter = self.id_counter.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        let mut hasher = blake3::Hasher::new();
        hasher.update(collection.as_bytes());
        hasher.update(&counter.to_le_bytes());
        hasher.update(&nanos.to_le_bytes());
        hasher.update(&std::process::id().to_le_bytes());
        hasher.update(body.as_bytes());

        let hex = hasher.finalize().to_hex();
        DocumentId::new(&hex.as_str()[..ID_LEN])
    }

    /// Run a blocking database call on tokio's blocking pool.
    async fn run_blocking<T, F>(
        &self,
        operation: StoreOperation,
        collection: &str,
        call: F,
    ) -> super::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let collection = collection.to_string();

        let joined = tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::unavailable("database connection lock poisoned"))?;
            call(&guard).map_err(|source| StoreError::backend(operation, collection, source))
        })
        .await;

        joined.unwrap_or_else(|err| {
            Err(StoreError::unavailable(format!("store task failed: {err}")))
        })
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn list_all(&self, collection: &str) -> super::Result<Vec<Document>> {
        let owned = collection.to_string();
        self.run_blocking(StoreOperation::ListAll, collection, move |conn| {
            list_documents(conn, &owned)
        })
        .await
    }

    async fn create(&self, collection: &str, fields: Value) -> super::Result<DocumentId> {
        let body = serde_json::to_string(&fields).map_err(|source| {
            StoreError::backend(StoreOperation::Create, collection, source.into())
        })?;
        let id = self.next_id(collection, &body);

        let owned = collection.to_string();
        let inserted = id.clone();
        self.run_blocking(StoreOperation::Create, collection, move |conn| {
            insert_document(conn, &owned, &inserted, &body)
        })
        .await?;

        debug!("Created document {} in {}", id, collection);
        Ok(id)
    }

    async fn delete_by_id(&self, collection: &str, id: &DocumentId) -> super::Result<()> {
        let owned = collection.to_string();
        let target = id.clone();
        let removed = self
            .run_blocking(StoreOperation::Delete, collection, move |conn| {
                delete_document(conn, &owned, &target)
            })
            .await?;

        if removed {
            debug!("Deleted document {} from {}", id, collection);
        } else {
            debug!("No document {} in {}, nothing to delete", id, collection);
        }
        Ok(())
    }
}

fn list_documents(conn: &Connection, collection: &str) -> Result<Vec<Document>> {
    let mut stmt = conn.prepare(
        r"
        SELECT id, body FROM documents
        WHERE collection = ?1 ORDER BY seq ASC
        ",
    )?;

    let rows = stmt
        .query_map([collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, body)| -> Result<Document> {
            Ok(Document::new(DocumentId::new(id), serde_json::from_str(&body)?))
        })
        .collect()
}

fn insert_document(
    conn: &Connection,
    collection: &str,
    id: &DocumentId,
    body: &str,
) -> Result<()> {
    conn.execute(
        r"
        INSERT INTO documents (id, collection, body, created_at)
        VALUES (?1, ?2, ?3, ?4)
        ",
        params![id.as_str(), collection, body, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Remove a document. Returns `false` when there was nothing to remove.
fn delete_document(conn: &Connection, collection: &str, id: &DocumentId) -> Result<bool> {
    let affected = conn.execute(
        "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
        params![collection, id.as_str()],
    )?;
    Ok(affected > 0)
}

/// Statistics about one collection in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// The collection the counts refer to.
    pub collection: String,
    /// Number of documents in the collection.
    pub documents: i64,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
