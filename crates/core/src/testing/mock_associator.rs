//! Mock associator for testing.

use async_trait::async_trait;
use rusqlite::params;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::apdb::Apdb;
use crate::config::AssociationConfig;
use crate::stages::{AssociationResult, Associator, DiaObject, SourceCatalog, StageError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS dia_object (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ra_deg REAL NOT NULL,
    dec_deg REAL NOT NULL,
    num_sources INTEGER NOT NULL
)";

/// Mock implementation of the Associator trait.
///
/// Unlike the other stage mocks, this one really uses the APDB connection it
/// is handed: it keeps a `dia_object` table, matches detections against it
/// within the configured radius, inserts misses and bumps match counts. With
/// a file-backed APDB this gives tests true cross-run association behavior
/// (second run matches what the first run inserted).
#[derive(Debug, Clone)]
pub struct MockAssociator {
    /// Recorded inputs, in invocation order.
    calls: Arc<RwLock<Vec<SourceCatalog>>>,
    /// If set, the next invocation fails with this error.
    next_error: Arc<RwLock<Option<StageError>>>,
}

impl Default for MockAssociator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssociator {
    /// Create a new mock associator.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded inputs.
    pub async fn recorded_calls(&self) -> Vec<SourceCatalog> {
        self.calls.read().await.clone()
    }

    /// Get the number of invocations.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Configure the next invocation to fail with the given error.
    pub async fn set_next_error(&self, error: StageError) {
        *self.next_error.write().await = Some(error);
    }

    async fn take_error(&self) -> Option<StageError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Associator for MockAssociator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn associate(
        &self,
        sources: &SourceCatalog,
        apdb: &Apdb,
        config: &AssociationConfig,
    ) -> Result<AssociationResult, StageError> {
        self.calls.write().await.push(sources.clone());

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let radius_deg = config.match_radius_arcsec / 3600.0;
        let detections = sources.sources.clone();

        let (objects, matched, created) = apdb.with_connection(move |conn| {
            conn.execute_batch(SCHEMA)?;

            let mut known: Vec<DiaObject> = conn
                .prepare("SELECT id, ra_deg, dec_deg, num_sources FROM dia_object ORDER BY id")?
                .query_map([], |row| {
                    Ok(DiaObject {
                        id: row.get(0)?,
                        ra_deg: row.get(1)?,
                        dec_deg: row.get(2)?,
                        num_sources: row.get(3)?,
                    })
                })?
                .collect::<Result<_, _>>()?;

            let mut matched = 0;
            let mut created = 0;
            for source in &detections {
                let hit = known.iter_mut().find(|o| {
                    (o.ra_deg - source.ra_deg).abs() <= radius_deg
                        && (o.dec_deg - source.dec_deg).abs() <= radius_deg
                });

                match hit {
                    Some(object) => {
                        object.num_sources += 1;
                        conn.execute(
                            "UPDATE dia_object SET num_sources = ?1 WHERE id = ?2",
                            params![object.num_sources, object.id],
                        )?;
                        matched += 1;
                    }
                    None => {
                        conn.execute(
                            "INSERT INTO dia_object (ra_deg, dec_deg, num_sources) \
                             VALUES (?1, ?2, 1)",
                            params![source.ra_deg, source.dec_deg],
                        )?;
                        known.push(DiaObject {
                            id: conn.last_insert_rowid(),
                            ra_deg: source.ra_deg,
                            dec_deg: source.dec_deg,
                            num_sources: 1,
                        });
                        created += 1;
                    }
                }
            }

            Ok((known, matched, created))
        })?;

        Ok(AssociationResult {
            exposure: sources.exposure,
            objects,
            matched,
            created,
        })
    }
}
