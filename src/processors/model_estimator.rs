use std::path::Path;

use crate::config::EstimatorConfig;
use crate::error::{PipelineError, Result};
use crate::models::{DerivedRow, ParameterRow, TrainedModel};
use crate::processors::estimator::WeatherEstimator;
use crate::readers::ModelReader;

/// Estimator backed by a pre-trained model, evaluated in fixed-size chunks.
pub struct ModelEstimator {
    model: TrainedModel,
    chunk_size: usize,
}

impl ModelEstimator {
    pub fn new(model: TrainedModel, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(Self { model, chunk_size })
    }

    pub fn load(path: &Path, chunk_size: usize) -> Result<Self> {
        let model = ModelReader::new().read_file(path)?;
        Self::new(model, chunk_size)
    }

    pub fn from_config(config: &EstimatorConfig) -> Result<Self> {
        Self::load(&config.model_path, config.chunk_size)
    }
}

impl WeatherEstimator for ModelEstimator {
    fn name(&self) -> &'static str {
        "model"
    }

    fn estimate(&mut self, rows: &[ParameterRow]) -> Result<Vec<DerivedRow>> {
        let mut derived = Vec::with_capacity(rows.len());

        for (i, chunk) in rows.chunks(self.chunk_size).enumerate() {
            let features: Vec<[f64; 5]> = chunk.iter().map(|r| r.feature_vector()).collect();
            let predictions = self.model.predict_batch(&features);
            tracing::debug!("Predicted chunk {} ({} rows)", i + 1, chunk.len());

            derived.extend(
                chunk
                    .iter()
                    .zip(predictions)
                    .map(|(row, p)| DerivedRow::new(row.clone(), None, p)),
            );
        }

        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::artifact::{LinearModel, ModelArtifact};
    use chrono::NaiveDate;

    fn linear_model() -> TrainedModel {
        ModelArtifact::Linear(LinearModel {
            features: ["PS", "QV2M", "TS", "TQV", "Var_TQV"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            intercept: 0.0,
            coefficients: vec![0.0, 0.0, 1.0, 0.0, 0.0],
        })
        .into_trained()
        .unwrap()
    }

    fn rows(n: usize) -> Vec<ParameterRow> {
        (0..n)
            .map(|i| {
                ParameterRow::new(
                    i as i64 + 1,
                    40.0,
                    -75.0,
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    1000.0,
                    0.01,
                    i as f64,
                    20.0,
                    2.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_chunked_prediction_preserves_order() {
        let input = rows(7);
        let mut estimator = ModelEstimator::new(linear_model(), 3).unwrap();

        let predictions = estimator.predict(&input).unwrap();
        assert_eq!(predictions, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let derived = estimator.estimate(&input).unwrap();
        assert!(derived.iter().all(|d| d.scores.is_none()));
        assert_eq!(derived[6].params.id, 7);
    }

    #[test]
    fn test_chunk_size_does_not_change_results() {
        let input = rows(25);
        let mut small = ModelEstimator::new(linear_model(), 1).unwrap();
        let mut large = ModelEstimator::new(linear_model(), 1000).unwrap();
        assert_eq!(small.predict(&input).unwrap(), large.predict(&input).unwrap());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(ModelEstimator::new(linear_model(), 0).is_err());
    }

    #[test]
    fn test_missing_model_is_load_error() {
        let result = ModelEstimator::load(Path::new("/nonexistent/model.json.gz"), 1000);
        assert!(matches!(result, Err(PipelineError::ModelLoad { .. })));
    }
}
