use rusqlite::params_from_iter;

use crate::db::Database;
use crate::error::{PipelineError, Result};
use crate::models::{PredictionColumn, PredictionRecord};
use crate::utils::constants::PREDICTION_TABLE;

/// Durable destination for a batch of predictions.
pub trait PredictionSink {
    /// Persist every record or none of them.
    fn insert(&mut self, records: &[PredictionRecord]) -> Result<()>;
}

pub struct SqlitePredictionSink {
    db: Database,
}

impl SqlitePredictionSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn insert_sql() -> String {
        let placeholders = (1..=PredictionColumn::ALL.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            PREDICTION_TABLE,
            PredictionColumn::column_list(),
            placeholders
        )
    }
}

impl PredictionSink for SqlitePredictionSink {
    fn insert(&mut self, records: &[PredictionRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let sql = Self::insert_sql();
        self.db.with_connection(|conn| {
            let tx = conn.transaction().map_err(PipelineError::Write)?;
            {
                let mut stmt = tx.prepare(&sql).map_err(PipelineError::Write)?;
                for record in records {
                    let values = PredictionColumn::ALL.iter().map(|c| record.column_value(*c));
                    stmt.execute(params_from_iter(values))
                        .map_err(PipelineError::Write)?;
                }
            }
            // Dropping an uncommitted transaction rolls it back
            tx.commit().map_err(PipelineError::Write)?;

            tracing::info!("Inserted {} predictions", records.len());
            Ok(())
        })
    }
}
