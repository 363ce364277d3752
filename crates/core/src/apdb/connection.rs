//! APDB connection handling.

use rusqlite::{Connection, OpenFlags};
use std::sync::Mutex;

use super::error::ApdbError;
use crate::config::{ApdbConfig, IsolationLevel};

const SQLITE_SCHEME: &str = "sqlite://";

/// Connection to the association database.
///
/// Configured from the run configuration's `[apdb]` section, with the URL and
/// isolation level passed through unmodified. The orchestrator opens one per
/// run immediately before the association stage and hands it to the
/// associator; it never issues domain queries itself.
pub struct Apdb {
    conn: Mutex<Connection>,
    url: String,
}

impl Apdb {
    /// Opens a connection as described by `config`.
    ///
    /// `sqlite://` with an empty path opens a private in-memory database.
    /// A file URL (`sqlite:///var/lib/apdb.db`) must name an existing
    /// database; the schema is provisioned out-of-band, so a missing file is
    /// a connection error.
    pub fn connect(config: &ApdbConfig) -> Result<Self, ApdbError> {
        let conn = match sqlite_path(&config.url)? {
            None => Connection::open_in_memory()
                .map_err(|e| ApdbError::connection(&config.url, e.to_string()))?,
            Some(path) => Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| ApdbError::connection(&config.url, e.to_string()))?,
        };

        apply_isolation(&conn, config.isolation_level)?;

        Ok(Self {
            conn: Mutex::new(conn),
            url: config.url.clone(),
        })
    }

    /// URL this connection was opened from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Health check: runs a trivial query on the connection.
    pub fn verify(&self) -> Result<(), ApdbError> {
        self.with_connection(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)))?;
        Ok(())
    }

    /// Runs `f` with the underlying connection.
    ///
    /// This is the accessor associator implementations use for their catalog
    /// reads and writes.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    ) -> Result<T, ApdbError> {
        let conn = self.conn.lock().unwrap();
        f(&conn).map_err(|e| ApdbError::query(e.to_string()))
    }
}

impl std::fmt::Debug for Apdb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Apdb").field("url", &self.url).finish()
    }
}

/// Splits a supported URL into its path, `None` meaning in-memory.
fn sqlite_path(url: &str) -> Result<Option<&str>, ApdbError> {
    match url.strip_prefix(SQLITE_SCHEME) {
        Some("") => Ok(None),
        Some(path) => Ok(Some(path)),
        None => Err(ApdbError::UnsupportedScheme {
            url: url.to_string(),
        }),
    }
}

fn apply_isolation(conn: &Connection, level: IsolationLevel) -> Result<(), ApdbError> {
    match level {
        // Meaningful under shared-cache connections; harmless otherwise.
        IsolationLevel::ReadUncommitted => conn
            .pragma_update(None, "read_uncommitted", true)
            .map_err(|e| ApdbError::query(e.to_string())),
        // SQLite's default.
        IsolationLevel::Serializable => Ok(()),
        IsolationLevel::ReadCommitted | IsolationLevel::RepeatableRead => {
            Err(ApdbError::UnsupportedIsolation { level })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> ApdbConfig {
        ApdbConfig {
            url: "sqlite://".to_string(),
            isolation_level: IsolationLevel::ReadUncommitted,
        }
    }

    #[test]
    fn test_connect_in_memory() {
        let apdb = Apdb::connect(&memory_config()).unwrap();
        apdb.verify().unwrap();
        assert_eq!(apdb.url(), "sqlite://");
    }

    #[test]
    fn test_connect_missing_file_fails() {
        let config = ApdbConfig {
            url: "sqlite:///nonexistent/path/apdb.db".to_string(),
            isolation_level: IsolationLevel::ReadUncommitted,
        };

        let result = Apdb::connect(&config);
        assert!(matches!(result, Err(ApdbError::Connection { .. })));
    }

    #[test]
    fn test_connect_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ApdbConfig {
            url: format!("sqlite://{}", file.path().display()),
            isolation_level: IsolationLevel::Serializable,
        };

        let apdb = Apdb::connect(&config).unwrap();
        apdb.verify().unwrap();
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        let config = ApdbConfig {
            url: "postgresql://localhost/apdb".to_string(),
            isolation_level: IsolationLevel::ReadUncommitted,
        };

        let result = Apdb::connect(&config);
        assert!(matches!(result, Err(ApdbError::UnsupportedScheme { .. })));
    }

    #[test]
    fn test_unsupported_isolation_is_rejected() {
        let config = ApdbConfig {
            url: "sqlite://".to_string(),
            isolation_level: IsolationLevel::ReadCommitted,
        };

        let result = Apdb::connect(&config);
        assert!(matches!(result, Err(ApdbError::UnsupportedIsolation { .. })));
    }

    #[test]
    fn test_with_connection_allows_writes() {
        let apdb = Apdb::connect(&memory_config()).unwrap();

        apdb.with_connection(|conn| {
            conn.execute_batch(
                "CREATE TABLE dia_object (id INTEGER PRIMARY KEY);
                 INSERT INTO dia_object (id) VALUES (1), (2);",
            )
        })
        .unwrap();

        let count: i64 = apdb
            .with_connection(|conn| {
                conn.query_row("SELECT COUNT(*) FROM dia_object", [], |row| row.get(0))
            })
            .unwrap();
        assert_eq!(count, 2);
    }
}
