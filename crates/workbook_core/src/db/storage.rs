//! Primary/replica connection targets.
//!
//! # Invariants
//! - The primary connection is migrated before a `Storage` exists.
//! - The replica is opened read-only and never receives writes.
//! - In-memory stores have no replica; reads fall back to the primary.

use super::open::open_db_with;
use super::DbResult;
use crate::config::StorageConfig;
use log::info;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// Storage handle owned by one unit of work.
pub struct Storage {
    primary: Connection,
    replica: Option<Connection>,
    query_timeout: Duration,
}

impl Storage {
    /// Opens a file store: WAL-journaled primary plus optional read-only replica.
    pub fn open(path: impl AsRef<Path>, config: &StorageConfig) -> DbResult<Self> {
        let path = path.as_ref();
        let primary = open_db_with(path, config)?;
        primary.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get::<_, String>(0))?;

        let replica = if config.use_replica {
            let replica = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            replica.busy_timeout(config.busy_timeout())?;
            Some(replica)
        } else {
            None
        };

        info!(
            "event=storage_open module=db status=ok mode=file replica={}",
            replica.is_some()
        );
        Ok(Self {
            primary,
            replica,
            query_timeout: config.query_timeout(),
        })
    }

    /// Opens an in-memory store. Reads and writes share one connection.
    pub fn open_in_memory(config: &StorageConfig) -> DbResult<Self> {
        let primary = Connection::open_in_memory()?;
        Self::from_connection(primary, config)
    }

    /// Wraps an already-open connection, applying bootstrap and migrations.
    pub fn from_connection(mut conn: Connection, config: &StorageConfig) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(config.busy_timeout())?;
        super::migrations::apply_migrations(&mut conn)?;
        Ok(Self {
            primary: conn,
            replica: None,
            query_timeout: config.query_timeout(),
        })
    }

    /// Read-write target. All mutations and pre-write checks use it.
    pub fn primary(&self) -> &Connection {
        &self.primary
    }

    /// Read-only target for projections; falls back to the primary.
    pub fn replica(&self) -> &Connection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Per-query deadline applied by repositories.
    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }
}
