use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use validator::Validate;

use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
struct SeedParameters {
    #[serde(rename = "PS")]
    ps: f64,
    #[serde(rename = "TS")]
    ts: f64,
    #[serde(rename = "QV2M")]
    qv2m: f64,
    #[serde(rename = "TQV")]
    tqv: f64,
    #[serde(rename = "Var_TQV")]
    var_tqv: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct SeedCity {
    lat: f64,
    long: f64,
    data: BTreeMap<String, SeedParameters>,
}

/// country code -> city name -> series
type SeedDocument = BTreeMap<String, BTreeMap<String, SeedCity>>;

/// One observation destined for the `params` table.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SeedObservation {
    pub country: String,
    pub city: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub date: NaiveDate,
    pub ps: f64,
    pub ts: f64,
    pub qv2m: f64,
    pub tqv: f64,
    pub var_tqv: f64,
}

/// Reads mock observation files shaped as
/// `{ cc: { city: { lat, long, data: { "YYYY-MM-DD": { PS, TS, QV2M, TQV, Var_TQV } } } } }`.
pub struct SeedReader;

impl SeedReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_file(&self, path: &Path) -> Result<Vec<SeedObservation>> {
        let file = File::open(path)?;
        self.read_from(BufReader::new(file))
    }

    /// Parse and validate every observation; nothing is returned unless all
    /// of them are valid.
    ///
    /// Observations come out sorted by country, then city, then date rather
    /// than in file order, so seeding the same document always assigns the
    /// same `params` ids.
    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<SeedObservation>> {
        let document: SeedDocument = serde_json::from_reader(reader)?;
        let mut observations = Vec::new();

        for (country, cities) in document {
            for (city, series) in cities {
                tracing::debug!("Reading {} observations for {}/{}", series.data.len(), country, city);

                for (date, params) in series.data {
                    let observation = SeedObservation {
                        country: country.clone(),
                        city: city.clone(),
                        latitude: series.lat,
                        longitude: series.long,
                        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")?,
                        ps: params.ps,
                        ts: params.ts,
                        qv2m: params.qv2m,
                        tqv: params.tqv,
                        var_tqv: params.var_tqv,
                    };
                    observation.validate()?;
                    observations.push(observation);
                }
            }
        }

        Ok(observations)
    }
}

impl Default for SeedReader {
    fn default() -> Self {
        Self::new()
    }
}
