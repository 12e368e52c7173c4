use rusqlite::params;

use crate::db::Database;
use crate::error::{PipelineError, Result};
use crate::readers::SeedObservation;

const INSERT_PARAMS: &str = "INSERT INTO params (latitude, longitude, date, PS, QV2M, TS, TQV, Var_TQV) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

/// Loads observations into the parameter table.
pub struct ParamWriter {
    db: Database,
}

impl ParamWriter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert all observations in one transaction and return how many were written.
    pub fn insert_observations(&self, observations: &[SeedObservation]) -> Result<usize> {
        if observations.is_empty() {
            return Ok(0);
        }

        self.db.with_connection(|conn| {
            let tx = conn.transaction().map_err(PipelineError::Write)?;
            {
                let mut stmt = tx.prepare(INSERT_PARAMS).map_err(PipelineError::Write)?;
                for obs in observations {
                    stmt.execute(params![
                        obs.latitude,
                        obs.longitude,
                        obs.date.format("%Y-%m-%d").to_string(),
                        obs.ps,
                        obs.qv2m,
                        obs.ts,
                        obs.tqv,
                        obs.var_tqv,
                    ])
                    .map_err(PipelineError::Write)?;
                }
            }
            tx.commit().map_err(PipelineError::Write)?;

            tracing::info!("Seeded {} parameter rows", observations.len());
            Ok(observations.len())
        })
    }
}
