// src/cache/sqlite.rs

//! SQLite-backed manifest cache

use super::{CacheKey, ManifestCache};
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::fs::DirBuilder;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;
use tracing::debug;

/// Persistent manifest cache stored in a single SQLite database
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

impl SqliteCache {
    /// Open or create the cache database at `path`
    ///
    /// The containing directory is created owner-only if missing.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(parent)?;
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::InitError(format!("Failed to open cache {}: {}", path.display(), e))
        })?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS manifests (
                key TEXT PRIMARY KEY,
                manifest BLOB NOT NULL
            )",
        )?;

        debug!("Opened manifest cache at {}", path.display());
        Ok(Self { conn })
    }
}

/// Create a directory with mode 0700; an existing directory is fine
fn create_private_dir(dir: &Path) -> Result<()> {
    match DirBuilder::new().recursive(true).mode(0o700).create(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(Error::InitError(format!(
            "Failed to create cache directory {}: {}",
            dir.display(),
            e
        ))),
    }
}

impl ManifestCache for SqliteCache {
    fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let manifest = self
            .conn
            .query_row(
                "SELECT manifest FROM manifests WHERE key = ?1",
                params![key.as_str()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(manifest)
    }

    fn put(&mut self, key: &CacheKey, manifest: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO manifests (key, manifest) VALUES (?1, ?2)",
            params![key.as_str(), manifest],
        )?;
        Ok(())
    }

    fn keys(&self) -> Result<BTreeSet<CacheKey>> {
        let mut stmt = self.conn.prepare("SELECT key FROM manifests")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut keys = BTreeSet::new();
        for key in rows {
            keys.insert(CacheKey::from_stored(key?));
        }
        Ok(keys)
    }

    fn delete(&mut self, key: &CacheKey) -> Result<()> {
        self.conn
            .execute("DELETE FROM manifests WHERE key = ?1", params![key.as_str()])?;
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| Error::DatabaseError(e))
    }
}
