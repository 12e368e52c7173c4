use crate::error::{PipelineError, Result};
use crate::geocoding::{GeocodeIndex, LocationResolver};
use crate::models::{Coordinate, PredictionRecord};
use crate::processors::estimator::WeatherEstimator;
use crate::readers::ParameterSource;
use crate::utils::ProgressReporter;
use crate::writers::PredictionSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The parameter table was empty; nothing was written.
    NoInput,
    Completed { inserted: usize },
}

/// Runs fetch, estimate, resolve and insert once, strictly in sequence.
pub struct PipelineDriver<S, E, G, K> {
    source: S,
    estimator: E,
    resolver: LocationResolver<G>,
    sink: K,
    progress: ProgressReporter,
}

impl<S, E, G, K> PipelineDriver<S, E, G, K>
where
    S: ParameterSource,
    E: WeatherEstimator,
    G: GeocodeIndex,
    K: PredictionSink,
{
    pub fn new(source: S, estimator: E, index: G, sink: K) -> Self {
        Self {
            source,
            estimator,
            resolver: LocationResolver::new(index),
            sink,
            progress: ProgressReporter::silent(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn index(&self) -> &G {
        self.resolver.index()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn run(&mut self) -> Result<PipelineOutcome> {
        self.progress.stage("Fetching parameter rows");
        let rows = self.source.fetch_params()?;
        if rows.is_empty() {
            tracing::warn!("No parameter rows found; nothing to predict");
            self.progress.finish_with_message("No input rows");
            return Ok(PipelineOutcome::NoInput);
        }
        tracing::info!("Fetched {} parameter rows", rows.len());

        self.progress.stage(&format!(
            "Estimating weather for {} rows ({})",
            rows.len(),
            self.estimator.name()
        ));
        self.estimator.fit_statistics(&rows)?;
        let derived = self.estimator.estimate(&rows)?;
        if derived.len() != rows.len() {
            return Err(PipelineError::InvalidFormat(format!(
                "estimator returned {} results for {} rows",
                derived.len(),
                rows.len()
            )));
        }

        self.progress.stage("Resolving locations");
        let coordinates: Vec<Coordinate> = rows.iter().map(|r| r.coordinate()).collect();
        let locations = self.resolver.resolve(&coordinates)?;

        let records: Vec<PredictionRecord> = derived
            .iter()
            .zip(locations)
            .map(|(d, location)| PredictionRecord::from_parts(d, location))
            .collect();

        self.progress.stage(&format!("Writing {} predictions", records.len()));
        self.sink.insert(&records)?;

        self.progress
            .finish_with_message(&format!("Inserted {} predictions", records.len()));
        Ok(PipelineOutcome::Completed {
            inserted: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationInfo, ParameterRow};
    use crate::processors::HeuristicEstimator;
    use crate::utils::constants::DEFAULT_WEIGHTS;
    use chrono::NaiveDate;
    use std::cell::Cell;

    struct FixedSource {
        rows: Vec<ParameterRow>,
        calls: usize,
    }

    impl ParameterSource for FixedSource {
        fn fetch_params(&mut self) -> Result<Vec<ParameterRow>> {
            self.calls += 1;
            Ok(self.rows.clone())
        }
    }

    struct CountingIndex {
        calls: Cell<usize>,
        fail: bool,
    }

    impl GeocodeIndex for CountingIndex {
        fn search(&self, coordinates: &[Coordinate]) -> Result<Vec<LocationInfo>> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(PipelineError::GeocodeLookup("index unavailable".to_string()));
            }
            Ok(coordinates
                .iter()
                .map(|c| LocationInfo::new("US", "Region", format!("City {}", c.latitude)))
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        calls: usize,
        records: Vec<PredictionRecord>,
    }

    impl PredictionSink for RecordingSink {
        fn insert(&mut self, records: &[PredictionRecord]) -> Result<()> {
            self.calls += 1;
            self.records.extend_from_slice(records);
            Ok(())
        }
    }

    fn row(id: i64, lat: f64, ts: f64) -> ParameterRow {
        ParameterRow::new(
            id,
            lat,
            -75.0,
            NaiveDate::from_ymd_opt(2024, 1, id as u32).unwrap(),
            1000.0 + id as f64,
            0.01,
            ts,
            20.0 + id as f64,
            2.0,
        )
    }

    fn driver(
        rows: Vec<ParameterRow>,
        fail_geocode: bool,
    ) -> PipelineDriver<FixedSource, HeuristicEstimator, CountingIndex, RecordingSink> {
        PipelineDriver::new(
            FixedSource { rows, calls: 0 },
            HeuristicEstimator::new(DEFAULT_WEIGHTS, 0.0, None),
            CountingIndex {
                calls: Cell::new(0),
                fail: fail_geocode,
            },
            RecordingSink::default(),
        )
    }

    #[test]
    fn test_empty_input_never_reaches_sink() {
        let mut driver = driver(Vec::new(), false);

        let outcome = driver.run().unwrap();

        assert_eq!(outcome, PipelineOutcome::NoInput);
        assert_eq!(driver.source().calls, 1);
        assert_eq!(driver.index().calls.get(), 0);
        assert_eq!(driver.sink().calls, 0);
    }

    #[test]
    fn test_one_record_per_row_in_order() {
        let rows = vec![row(3, 40.0, 15.0), row(1, 41.0, 12.0), row(2, 42.0, 18.0)];
        let mut driver = driver(rows.clone(), false);

        let outcome = driver.run().unwrap();

        assert_eq!(outcome, PipelineOutcome::Completed { inserted: 3 });
        assert_eq!(driver.sink().calls, 1);
        assert_eq!(driver.index().calls.get(), 1);

        let records = &driver.sink().records;
        assert_eq!(records.len(), rows.len());
        for (record, source) in records.iter().zip(&rows) {
            assert_eq!(record.params_id, source.id);
            assert_eq!(record.date, source.date);
            assert_eq!(record.latitude, source.latitude);
            assert_eq!(record.longitude, source.longitude);
            assert_eq!(record.city, format!("City {}", source.latitude));
        }
    }

    #[test]
    fn test_geocode_failure_aborts_before_insert() {
        let mut driver = driver(vec![row(1, 40.0, 15.0), row(2, 41.0, 16.0)], true);

        let result = driver.run();

        assert!(matches!(result, Err(PipelineError::GeocodeLookup(_))));
        assert_eq!(driver.sink().calls, 0);
    }

    #[test]
    fn test_rerun_inserts_duplicate_batch() {
        let mut driver = driver(vec![row(1, 40.0, 15.0), row(2, 41.0, 16.0)], false);

        driver.run().unwrap();
        driver.run().unwrap();

        assert_eq!(driver.sink().calls, 2);
        assert_eq!(driver.sink().records.len(), 4);
    }
}
