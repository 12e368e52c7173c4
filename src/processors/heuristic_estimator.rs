use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::EstimatorConfig;
use crate::error::{PipelineError, Result};
use crate::models::{DerivedRow, Feature, ParameterRow, WeightedScores};
use crate::processors::estimator::WeatherEstimator;
use crate::utils::constants::{DEFAULT_NOISE_DELTA, DEFAULT_WEIGHTS};
use crate::utils::stats::{median, sample_std};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStatistics {
    pub median: f64,
    /// `None` when the batch has fewer than two rows.
    pub std: Option<f64>,
}

impl FeatureStatistics {
    /// `(value - median) / std`, or 0 when the spread is zero or undefined.
    pub fn normalize(&self, value: f64) -> f64 {
        match self.std {
            Some(std) if std > 0.0 && std.is_finite() => (value - self.median) / std,
            _ => 0.0,
        }
    }
}

/// Median and spread of each weighted feature over one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatistics {
    /// Indexed like [`Feature::WEIGHTED_FEATURES`].
    features: [FeatureStatistics; 4],
}

impl BatchStatistics {
    pub fn compute(rows: &[ParameterRow]) -> Result<Self> {
        if rows.is_empty() {
            return Err(PipelineError::MissingData(
                "cannot compute statistics over an empty batch".to_string(),
            ));
        }

        let mut features = [FeatureStatistics {
            median: 0.0,
            std: None,
        }; 4];

        for (slot, feature) in features.iter_mut().zip(Feature::WEIGHTED_FEATURES) {
            let values: Vec<f64> = rows.iter().map(|r| r.value(feature)).collect();
            if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                return Err(PipelineError::InvalidFormat(format!(
                    "non-finite {} value {} in batch",
                    feature.column(),
                    bad
                )));
            }

            let median = median(&values).ok_or_else(|| {
                PipelineError::InvalidFormat(format!("no median for {}", feature.column()))
            })?;
            *slot = FeatureStatistics {
                median,
                std: sample_std(&values),
            };
        }

        Ok(Self { features })
    }

    pub fn get(&self, feature: Feature) -> Option<&FeatureStatistics> {
        Feature::WEIGHTED_FEATURES
            .iter()
            .position(|f| *f == feature)
            .map(|i| &self.features[i])
    }
}

/// Mock estimator: `TS + W + noise`, where `W` is the weighted sum of each
/// parameter's deviation from the batch median in units of its standard
/// deviation, and noise is uniform on `[-delta, delta]`.
pub struct HeuristicEstimator {
    weights: [f64; 4],
    noise_delta: f64,
    rng: StdRng,
    statistics: Option<BatchStatistics>,
}

impl HeuristicEstimator {
    pub fn new(weights: [f64; 4], noise_delta: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            weights,
            noise_delta,
            rng,
            statistics: None,
        }
    }

    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(config.weights, config.noise_delta, config.seed)
    }

    pub fn score(&self, statistics: &BatchStatistics, row: &ParameterRow) -> WeightedScores {
        let mut weighted = [0.0; 4];
        for (i, feature) in Feature::WEIGHTED_FEATURES.iter().enumerate() {
            weighted[i] = statistics.features[i].normalize(row.value(*feature)) * self.weights[i];
        }
        WeightedScores::new(weighted)
    }

    /// Uniform on `[-delta, delta)`. Scaling a unit draw keeps very large
    /// deltas from overflowing the sampled range.
    fn noise(&mut self) -> f64 {
        if self.noise_delta > 0.0 {
            (self.rng.gen::<f64>() * 2.0 - 1.0) * self.noise_delta
        } else {
            0.0
        }
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTS, DEFAULT_NOISE_DELTA, None)
    }
}

impl WeatherEstimator for HeuristicEstimator {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn fit_statistics(&mut self, rows: &[ParameterRow]) -> Result<()> {
        let statistics = BatchStatistics::compute(rows)?;
        for (feature, stats) in Feature::WEIGHTED_FEATURES.iter().zip(&statistics.features) {
            tracing::debug!(
                "{}: median={} std={:?}",
                feature.column(),
                stats.median,
                stats.std
            );
        }
        self.statistics = Some(statistics);
        Ok(())
    }

    fn estimate(&mut self, rows: &[ParameterRow]) -> Result<Vec<DerivedRow>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        if self.statistics.is_none() {
            self.fit_statistics(rows)?;
        }
        let statistics = self
            .statistics
            .clone()
            .ok_or_else(|| PipelineError::MissingData("statistics not fitted".to_string()))?;

        let derived = rows
            .iter()
            .map(|row| {
                let scores = self.score(&statistics, row);
                let predicted = row.ts + scores.aggregate + self.noise();
                DerivedRow::new(row.clone(), Some(scores), predicted)
            })
            .collect();

        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(id: i64, ps: f64, qv2m: f64, ts: f64, tqv: f64, var_tqv: f64) -> ParameterRow {
        ParameterRow::new(
            id,
            40.0,
            -75.0,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ps,
            qv2m,
            ts,
            tqv,
            var_tqv,
        )
    }

    fn fixture() -> Vec<ParameterRow> {
        vec![
            row(1, 1000.0, 0.01, 15.0, 20.0, 2.0),
            row(2, 1010.0, 0.02, 16.0, 30.0, 4.0),
            row(3, 1020.0, 0.03, 14.0, 25.0, 2.0),
            row(4, 1030.0, 0.04, 17.0, 35.0, 8.0),
        ]
    }

    #[test]
    fn test_batch_statistics() {
        let stats = BatchStatistics::compute(&fixture()).unwrap();

        let ps = stats.get(Feature::Ps).unwrap();
        assert_eq!(ps.median, 1015.0);
        assert!((ps.std.unwrap() - 12.909944487358056).abs() < 1e-9);

        let var_tqv = stats.get(Feature::VarTqv).unwrap();
        assert_eq!(var_tqv.median, 3.0);
        assert!((var_tqv.std.unwrap() - 8.0_f64.sqrt()).abs() < 1e-12);

        assert!(stats.get(Feature::Ts).is_none());
    }

    #[test]
    fn test_weighted_score_matches_hand_computation() {
        let rows = fixture();
        let mut estimator = HeuristicEstimator::new(DEFAULT_WEIGHTS, 0.1, Some(42));
        estimator.fit_statistics(&rows).unwrap();

        // PS, QV2M and TQV each sit 1.5/sqrt(5/3) std below their median,
        // Var_TQV sits 1/sqrt(8) std below its median:
        // W = -(0.2 + 0.4 + 0.3) * 1.1618950038622251 - 0.1 * 0.35355339059327373
        let expected_w = -1.081_060_842_535_33;

        let derived = estimator.estimate(&rows).unwrap();
        let first = &derived[0];
        let w = first.scores.unwrap().aggregate;
        assert!((w - expected_w).abs() < 1e-6, "W = {}", w);

        let predicted = first.predicted_weather;
        assert!(predicted >= 15.0 + w - 0.1 - 1e-12);
        assert!(predicted <= 15.0 + w + 0.1 + 1e-12);
    }

    #[test]
    fn test_zero_noise_is_deterministic() {
        let rows = fixture();
        let mut estimator = HeuristicEstimator::new(DEFAULT_WEIGHTS, 0.0, None);

        let derived = estimator.estimate(&rows).unwrap();
        for d in &derived {
            assert_eq!(d.predicted_weather, d.params.ts + d.scores.unwrap().aggregate);
        }
    }

    #[test]
    fn test_zero_std_contributes_nothing() {
        let rows = vec![
            row(1, 1000.0, 0.01, 15.0, 20.0, 2.0),
            row(2, 1000.0, 0.01, 18.0, 20.0, 2.0),
            row(3, 1000.0, 0.01, 11.0, 20.0, 2.0),
        ];
        let mut estimator = HeuristicEstimator::new(DEFAULT_WEIGHTS, 0.0, None);

        let derived = estimator.estimate(&rows).unwrap();
        for d in &derived {
            let scores = d.scores.unwrap();
            assert_eq!(scores.aggregate, 0.0);
            assert!(scores.weighted.iter().all(|w| *w == 0.0));
            assert_eq!(d.predicted_weather, d.params.ts);
        }
    }

    #[test]
    fn test_single_row_batch() {
        let rows = vec![row(1, 1000.0, 0.01, 15.0, 20.0, 2.0)];
        let mut estimator = HeuristicEstimator::new(DEFAULT_WEIGHTS, 0.0, None);

        let predictions = estimator.predict(&rows).unwrap();
        assert_eq!(predictions, vec![15.0]);
    }

    #[test]
    fn test_noise_bounds_and_seeding() {
        let rows = fixture();

        let mut a = HeuristicEstimator::new(DEFAULT_WEIGHTS, 0.1, Some(7));
        let mut b = HeuristicEstimator::new(DEFAULT_WEIGHTS, 0.1, Some(7));
        let pa = a.estimate(&rows).unwrap();
        let pb = b.estimate(&rows).unwrap();

        for (da, db) in pa.iter().zip(&pb) {
            assert_eq!(da.predicted_weather, db.predicted_weather);
            let base = da.params.ts + da.scores.unwrap().aggregate;
            assert!((da.predicted_weather - base).abs() <= 0.1 + 1e-12);
        }
    }

    #[test]
    fn test_huge_noise_delta_stays_bounded() {
        let rows = fixture();
        let delta = 1e308;
        let mut estimator = HeuristicEstimator::new(DEFAULT_WEIGHTS, delta, Some(1));

        let derived = estimator.estimate(&rows).unwrap();
        for d in &derived {
            assert!(d.predicted_weather.is_finite());
            let base = d.params.ts + d.scores.unwrap().aggregate;
            assert!((d.predicted_weather - base).abs() <= delta);
        }
    }

    #[test]
    fn test_output_preserves_order_and_length() {
        let rows = fixture();
        let mut estimator = HeuristicEstimator::default();

        let derived = estimator.estimate(&rows).unwrap();
        assert_eq!(derived.len(), rows.len());
        for (d, r) in derived.iter().zip(&rows) {
            assert_eq!(d.params.id, r.id);
        }

        assert!(estimator.estimate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let rows = vec![
            row(1, f64::NAN, 0.01, 15.0, 20.0, 2.0),
            row(2, 1000.0, 0.01, 15.0, 20.0, 2.0),
        ];
        let mut estimator = HeuristicEstimator::default();
        assert!(matches!(
            estimator.estimate(&rows),
            Err(PipelineError::InvalidFormat(_))
        ));
    }
}
