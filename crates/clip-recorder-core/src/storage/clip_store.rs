use crate::{ClipError, ClipRecord, ClipResult, ClipStorage, ClipSummary};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use error_location::ErrorLocation;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, instrument};

/// Where the clip database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file; parent directories are created on open.
    File(PathBuf),
    /// Private in-memory database, discarded with the store.
    InMemory,
}

/// SQLite-backed clip store.
///
/// Holds at most one connection, established by [`ClipStore::open`]. Until an
/// open succeeds every operation fails with [`ClipError::StorageUnavailable`];
/// a failed open leaves the store closed so a later call can retry.
///
/// All statements run on the blocking pool so callers on the async runtime
/// are never stalled by disk I/O. The connection mutex serializes
/// transactions; each operation is one transaction.
pub struct ClipStore {
    location: StoreLocation,
    store_name: String,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl ClipStore {
    /// Create a closed store for `location` using `store_name` as the table.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::InvalidStoreName`] if `store_name` is not a plain
    /// identifier (ASCII letters, digits and `_`, not starting with a digit).
    #[track_caller]
    pub fn new(location: StoreLocation, store_name: impl Into<String>) -> ClipResult<Self> {
        let store_name = store_name.into();

        if !is_valid_store_name(&store_name) {
            return Err(ClipError::InvalidStoreName {
                name: store_name,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self {
            location,
            store_name,
            conn: OnceCell::new(),
        })
    }

    /// Establish the connection, creating the record store on first use.
    ///
    /// Idempotent: once a connection exists it is reused and this returns
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::StorageUnavailable`] if the database cannot be
    /// opened or the record store cannot be created.
    #[instrument(skip(self))]
    pub async fn open(&self) -> ClipResult<()> {
        let target = self.location.clone();
        let store_name = self.store_name.clone();

        self.conn
            .get_or_try_init(|| async move {
                let conn = tokio::task::spawn_blocking(move || open_connection(&target, &store_name))
                    .await
                    .map_err(|e| ClipError::StorageUnavailable {
                        reason: format!("Open task failed: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })??;

                Ok::<_, ClipError>(Arc::new(Mutex::new(conn)))
            })
            .await?;

        Ok(())
    }

    /// Whether a connection has been established.
    pub fn is_open(&self) -> bool {
        self.conn.initialized()
    }

    /// Name of the table holding clip records.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    #[track_caller]
    fn connection(&self) -> ClipResult<Arc<Mutex<Connection>>> {
        self.conn
            .get()
            .cloned()
            .ok_or_else(|| ClipError::StorageUnavailable {
                reason: "Clip store has not been opened".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    async fn run_blocking<T, F>(&self, op: F) -> ClipResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> ClipResult<T> + Send + 'static,
    {
        let conn = self.connection()?;

        tokio::task::spawn_blocking(move || {
            // The connection is still valid after a panic in another holder.
            let mut guard = conn.lock().unwrap_or_else(|e| {
                error!("Clip store lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            op(&mut guard)
        })
        .await
        .map_err(|e| ClipError::StorageUnavailable {
            reason: format!("Storage task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?
    }
}

impl ClipStorage for ClipStore {
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn insert(&self, name: String, data: Vec<u8>) -> ClipResult<i64> {
        let sql = format!(
            "INSERT INTO \"{}\" (name, data) VALUES (?1, ?2)",
            self.store_name
        );
        let bytes = data.len();

        let id = self
            .run_blocking(move |conn| {
                let tx = conn.transaction().map_err(|e| ClipError::WriteFailed {
                    reason: format!("Failed to begin insert: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                tx.execute(&sql, params![name, data])
                    .map_err(|e| ClipError::WriteFailed {
                        reason: format!("Failed to insert clip: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                let id = tx.last_insert_rowid();

                tx.commit().map_err(|e| ClipError::WriteFailed {
                    reason: format!("Failed to commit insert: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                Ok(id)
            })
            .await?;

        info!(clip_id = id, bytes, "Clip stored");

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> ClipResult<Vec<ClipRecord>> {
        let sql = format!(
            "SELECT id, name, data FROM \"{}\" ORDER BY id",
            self.store_name
        );

        let records = self
            .run_blocking(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(|e| ClipError::ReadFailed {
                    reason: format!("Failed to prepare listing: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                let records = stmt
                    .query_map([], |row| {
                        Ok(ClipRecord {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            data: row.get(2)?,
                        })
                    })
                    .map_err(|e| ClipError::ReadFailed {
                        reason: format!("Failed to list clips: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ClipError::ReadFailed {
                        reason: format!("Failed to decode clip row: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                Ok(records)
            })
            .await?;

        debug!(clip_count = records.len(), "Clips listed");

        Ok(records)
    }

    #[instrument(skip(self))]
    async fn list_summaries(&self) -> ClipResult<Vec<ClipSummary>> {
        let sql = format!(
            "SELECT id, name, length(data) FROM \"{}\" ORDER BY id",
            self.store_name
        );

        let summaries = self
            .run_blocking(move |conn| {
                let mut stmt = conn.prepare(&sql).map_err(|e| ClipError::ReadFailed {
                    reason: format!("Failed to prepare listing: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                let summaries = stmt
                    .query_map([], |row| {
                        let size: i64 = row.get(2)?;
                        Ok(ClipSummary {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            size: usize::try_from(size).unwrap_or_default(),
                        })
                    })
                    .map_err(|e| ClipError::ReadFailed {
                        reason: format!("Failed to list clips: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ClipError::ReadFailed {
                        reason: format!("Failed to decode clip row: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                Ok(summaries)
            })
            .await?;

        debug!(clip_count = summaries.len(), "Clip summaries listed");

        Ok(summaries)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> ClipResult<Option<ClipRecord>> {
        let sql = format!(
            "SELECT id, name, data FROM \"{}\" WHERE id = ?1",
            self.store_name
        );

        self.run_blocking(move |conn| {
            conn.query_row(&sql, params![id], |row| {
                Ok(ClipRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    data: row.get(2)?,
                })
            })
            .optional()
            .map_err(|e| ClipError::ReadFailed {
                reason: format!("Failed to load clip {}: {}", id, e),
                location: ErrorLocation::from(Location::caller()),
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: i64) -> ClipResult<()> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = ?1", self.store_name);

        let removed = self
            .run_blocking(move |conn| {
                let tx = conn.transaction().map_err(|e| ClipError::WriteFailed {
                    reason: format!("Failed to begin delete: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                let removed = tx
                    .execute(&sql, params![id])
                    .map_err(|e| ClipError::WriteFailed {
                        reason: format!("Failed to delete clip: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

                tx.commit().map_err(|e| ClipError::WriteFailed {
                    reason: format!("Failed to commit delete: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

                Ok(removed)
            })
            .await?;

        if removed == 0 {
            debug!(clip_id = id, "Delete of absent clip ignored");
        } else {
            info!(clip_id = id, "Clip deleted");
        }

        Ok(())
    }
}

#[track_caller]
fn open_connection(target: &StoreLocation, store_name: &str) -> ClipResult<Connection> {
    let conn = match target {
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| ClipError::StorageUnavailable {
                    reason: format!("Failed to create database directory {:?}: {}", parent, e),
                    location: ErrorLocation::from(Location::caller()),
                })?;
            }

            let conn = Connection::open(path).map_err(|e| ClipError::StorageUnavailable {
                reason: format!("Failed to open database {:?}: {}", path, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            conn.execute_batch("PRAGMA journal_mode=WAL;")
                .map_err(|e| ClipError::StorageUnavailable {
                    reason: format!("Failed to enable WAL: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            conn
        }
        StoreLocation::InMemory => {
            Connection::open_in_memory().map_err(|e| ClipError::StorageUnavailable {
                reason: format!("Failed to open in-memory database: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
        }
    };

    // AUTOINCREMENT keeps ids of deleted rows from being handed out again.
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            data BLOB NOT NULL
        );",
        store_name
    ))
    .map_err(|e| ClipError::StorageUnavailable {
        reason: format!("Failed to create record store {}: {}", store_name, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!(location = ?target, store_name, "Clip store opened");

    Ok(conn)
}

pub(crate) fn is_valid_store_name(name: &str) -> bool {
    let mut chars = name.chars();

    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
