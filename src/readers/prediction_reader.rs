use rusqlite::Row;

use crate::db::Database;
use crate::error::{PipelineError, Result};
use crate::models::{PredictionColumn, PredictionRecord};

/// Reads stored predictions back, addressing every column by name.
pub struct PredictionReader {
    db: Database,
}

impl PredictionReader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn read_all(&self) -> Result<Vec<PredictionRecord>> {
        self.read(None)
    }

    /// The first `limit` predictions in insertion order.
    pub fn read_sample(&self, limit: usize) -> Result<Vec<PredictionRecord>> {
        self.read(Some(limit))
    }

    fn read(&self, limit: Option<usize>) -> Result<Vec<PredictionRecord>> {
        let mut sql = format!(
            "SELECT {} FROM prediction ORDER BY id",
            PredictionColumn::column_list()
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&sql).map_err(PipelineError::Query)?;
            let records = stmt
                .query_map([], Self::map_row)
                .map_err(PipelineError::Query)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(PipelineError::Query)?;
            Ok(records)
        })
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PredictionRecord> {
        Ok(PredictionRecord {
            country: row.get(PredictionColumn::Country.name())?,
            region: row.get(PredictionColumn::Region.name())?,
            city: row.get(PredictionColumn::City.name())?,
            latitude: row.get(PredictionColumn::Latitude.name())?,
            longitude: row.get(PredictionColumn::Longitude.name())?,
            params_id: row.get(PredictionColumn::ParamsId.name())?,
            date: row.get(PredictionColumn::Date.name())?,
            predicted_weather: row.get(PredictionColumn::PredictedWeather.name())?,
        })
    }
}
