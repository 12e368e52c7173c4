use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::derived::DerivedRow;
use crate::models::location::LocationInfo;

/// Columns of the `prediction` table.
///
/// Statements are generated from this table and every column is bound from
/// the record field of the same name, so the order here only decides the
/// order of placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictionColumn {
    Country,
    Region,
    City,
    Latitude,
    Longitude,
    ParamsId,
    Date,
    PredictedWeather,
}

impl PredictionColumn {
    pub const ALL: [PredictionColumn; 8] = [
        PredictionColumn::Country,
        PredictionColumn::Region,
        PredictionColumn::City,
        PredictionColumn::Latitude,
        PredictionColumn::Longitude,
        PredictionColumn::ParamsId,
        PredictionColumn::Date,
        PredictionColumn::PredictedWeather,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PredictionColumn::Country => "country",
            PredictionColumn::Region => "region",
            PredictionColumn::City => "city",
            PredictionColumn::Latitude => "latitude",
            PredictionColumn::Longitude => "longitude",
            PredictionColumn::ParamsId => "paramsID",
            PredictionColumn::Date => "date",
            PredictionColumn::PredictedWeather => "predictedWeather",
        }
    }

    /// Comma separated column list in [`PredictionColumn::ALL`] order.
    pub fn column_list() -> String {
        Self::ALL
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PredictionRecord {
    pub country: String,
    pub region: String,
    pub city: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub params_id: i64,
    pub date: NaiveDate,
    pub predicted_weather: f64,
}

impl PredictionRecord {
    pub fn from_parts(derived: &DerivedRow, location: LocationInfo) -> Self {
        Self {
            country: location.country,
            region: location.region,
            city: location.city,
            latitude: derived.params.latitude,
            longitude: derived.params.longitude,
            params_id: derived.params.id,
            date: derived.params.date,
            predicted_weather: derived.predicted_weather,
        }
    }

    /// SQL value bound for `column`.
    pub fn column_value(&self, column: PredictionColumn) -> Value {
        match column {
            PredictionColumn::Country => Value::Text(self.country.clone()),
            PredictionColumn::Region => Value::Text(self.region.clone()),
            PredictionColumn::City => Value::Text(self.city.clone()),
            PredictionColumn::Latitude => Value::Real(self.latitude),
            PredictionColumn::Longitude => Value::Real(self.longitude),
            PredictionColumn::ParamsId => Value::Integer(self.params_id),
            PredictionColumn::Date => Value::Text(self.date.format("%Y-%m-%d").to_string()),
            PredictionColumn::PredictedWeather => Value::Real(self.predicted_weather),
        }
    }
}
