use rusqlite::Row;

use crate::db::Database;
use crate::error::{PipelineError, Result};
use crate::models::{Feature, ParameterRow};

const SELECT_PARAMS: &str =
    "SELECT id, latitude, longitude, date, PS, QV2M, TS, TQV, Var_TQV FROM params";

/// Bulk read of observation rows.
pub trait ParameterSource {
    /// Every row of the parameter table, in storage order.
    fn fetch_params(&mut self) -> Result<Vec<ParameterRow>>;
}

pub struct SqliteParameterSource {
    db: Database,
}

impl SqliteParameterSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ParameterRow> {
        Ok(ParameterRow {
            id: row.get("id")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
            date: row.get("date")?,
            ps: row.get(Feature::Ps.column())?,
            qv2m: row.get(Feature::Qv2m.column())?,
            ts: row.get(Feature::Ts.column())?,
            tqv: row.get(Feature::Tqv.column())?,
            var_tqv: row.get(Feature::VarTqv.column())?,
        })
    }
}

impl ParameterSource for SqliteParameterSource {
    fn fetch_params(&mut self) -> Result<Vec<ParameterRow>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(SELECT_PARAMS).map_err(PipelineError::Query)?;
            let rows = stmt
                .query_map([], Self::map_row)
                .map_err(PipelineError::Query)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(PipelineError::Query)?;

            tracing::debug!("Read {} parameter rows from {}", rows.len(), self.db.path().display());
            Ok(rows)
        })
    }
}
