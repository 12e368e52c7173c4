use serde::{Deserialize, Serialize};

use crate::models::parameter::{Feature, ParameterRow};

/// Per-parameter weighted deviations and their sum `W`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedScores {
    /// Indexed like [`Feature::WEIGHTED_FEATURES`].
    pub weighted: [f64; 4],
    pub aggregate: f64,
}

impl WeightedScores {
    pub fn new(weighted: [f64; 4]) -> Self {
        Self {
            weighted,
            aggregate: weighted.iter().sum(),
        }
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        Feature::WEIGHTED_FEATURES
            .iter()
            .position(|f| *f == feature)
            .map(|i| self.weighted[i])
    }
}

/// A parameter row together with what the estimator derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub params: ParameterRow,
    /// Only the heuristic estimator produces scores.
    pub scores: Option<WeightedScores>,
    pub predicted_weather: f64,
}

impl DerivedRow {
    pub fn new(params: ParameterRow, scores: Option<WeightedScores>, predicted_weather: f64) -> Self {
        Self {
            params,
            scores,
            predicted_weather,
        }
    }
}
