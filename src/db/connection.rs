// Database connection management
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Builder for opening a database with non-default knobs.
///
/// `Database::open` covers the common case; this is the configurable
/// entry point:
///
/// ```no_run
/// # use framelite::{OpenOptions, Result};
/// # use std::time::Duration;
/// # fn main() -> Result<()> {
/// let db = OpenOptions::new()
///     .busy_timeout(Duration::from_secs(5))
///     .open("data/app.db")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    create_dirs: bool,
    foreign_keys: bool,
    busy_timeout: Option<Duration>,
}

impl OpenOptions {
    pub fn new() -> OpenOptions {
        OpenOptions {
            create_dirs: true,
            foreign_keys: true,
            busy_timeout: None,
        }
    }

    /// Create the file's parent directories when they are missing.
    /// On by default.
    pub fn create_dirs(mut self, create: bool) -> OpenOptions {
        self.create_dirs = create;
        self
    }

    /// Enforce foreign key constraints on this connection. On by default.
    pub fn foreign_keys(mut self, enforce: bool) -> OpenOptions {
        self.foreign_keys = enforce;
        self
    }

    /// How long a statement waits on a locked database before failing.
    pub fn busy_timeout(mut self, timeout: Duration) -> OpenOptions {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Opens (or creates) the database file at `path` with these options.
    pub fn open(self, path: impl AsRef<Path>) -> Result<Database> {
        Database::open_with(path.as_ref(), &self)
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one SQLite database.
///
/// Clones share the same underlying connection. The connection lives until
/// `close` is called or the last clone is dropped, whichever comes first;
/// operations on a closed handle fail with `Error::ConnectionClosed`.
pub struct Database {
    conn: Arc<Mutex<Option<Connection>>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Opens (or creates) the database file at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        OpenOptions::new().open(path)
    }

    /// Opens a private in-memory database, mostly useful in tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::apply_options(&conn, &OpenOptions::new())?;
        debug!("Opened in-memory database");

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path: None,
        })
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Result<Self> {
        // Create parent directory if it doesn't exist. A bare file name has
        // an empty parent, which needs nothing created.
        if options.create_dirs {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let conn = Connection::open(path)?;
        Self::apply_options(&conn, options)?;
        info!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            path: Some(path.to_path_buf()),
        })
    }

    fn apply_options(conn: &Connection, options: &OpenOptions) -> Result<()> {
        if options.foreign_keys {
            conn.execute("PRAGMA foreign_keys = ON", [])?;
        }
        if let Some(timeout) = options.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        Ok(())
    }

    /// File this handle was opened on, or `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.conn.lock().unwrap().is_some()
    }

    /// Closes the connection. Closing an already-closed handle is a no-op,
    /// so callers can close eagerly and still rely on drop as a fallback.
    pub fn close(&self) -> Result<()> {
        let mut guard = self.conn.lock().unwrap();
        match guard.take() {
            Some(conn) => match conn.close() {
                Ok(()) => {
                    info!("Closed database");
                    Ok(())
                }
                Err((conn, err)) => {
                    // Keep the handle usable when the engine refuses to
                    // close, e.g. while a statement is still busy.
                    warn!(error = %err, "Failed to close database");
                    *guard = Some(conn);
                    Err(err.into())
                }
            },
            None => Ok(()),
        }
    }

    pub(crate) fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().unwrap();
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(Error::ConnectionClosed),
        }
    }

    pub(crate) fn with_conn_mut<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.conn.lock().unwrap();
        match guard.as_mut() {
            Some(conn) => f(conn),
            None => Err(Error::ConnectionClosed),
        }
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            path: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("test.db");

        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.path(), Some(path.as_path()));
        assert!(db.is_open());
    }

    #[test]
    fn test_open_without_create_dirs_fails_on_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("test.db");

        let result = OpenOptions::new().create_dirs(false).open(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.is_open());
        db.close().unwrap();
        assert!(!db.is_open());
        db.close().unwrap();
    }

    #[test]
    fn test_closed_handle_rejects_work() {
        let db = Database::open_in_memory().unwrap();
        db.close().unwrap();
        let result = db.with_conn(|_| Ok(()));
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }

    #[test]
    fn test_clones_share_the_connection() {
        let db = Database::open_in_memory().unwrap();
        let other = db.clone();
        other.close().unwrap();
        assert!(!db.is_open());
    }
}
