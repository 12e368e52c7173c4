use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::location::Coordinate;

/// Physical measurements stored per observation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    /// Surface pressure
    Ps,
    /// Specific humidity at 2 m
    Qv2m,
    /// Surface skin temperature
    Ts,
    /// Total precipitable water vapour
    Tqv,
    /// Variance of total precipitable water vapour
    VarTqv,
}

impl Feature {
    /// Inputs of the trained model, in the order they are fed to it.
    pub const MODEL_FEATURES: [Feature; 5] = [
        Feature::Ps,
        Feature::Qv2m,
        Feature::Ts,
        Feature::Tqv,
        Feature::VarTqv,
    ];

    /// Parameters that contribute to the weighted deviation score.
    pub const WEIGHTED_FEATURES: [Feature; 4] =
        [Feature::Ps, Feature::Qv2m, Feature::Tqv, Feature::VarTqv];

    pub fn column(&self) -> &'static str {
        match self {
            Feature::Ps => "PS",
            Feature::Qv2m => "QV2M",
            Feature::Ts => "TS",
            Feature::Tqv => "TQV",
            Feature::VarTqv => "Var_TQV",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::MODEL_FEATURES
            .into_iter()
            .find(|f| f.column().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ParameterRow {
    pub id: i64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub date: NaiveDate,

    pub ps: f64,
    pub qv2m: f64,
    pub ts: f64,
    pub tqv: f64,
    pub var_tqv: f64,
}

impl ParameterRow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
        ps: f64,
        qv2m: f64,
        ts: f64,
        tqv: f64,
        var_tqv: f64,
    ) -> Self {
        Self {
            id,
            latitude,
            longitude,
            date,
            ps,
            qv2m,
            ts,
            tqv,
            var_tqv,
        }
    }

    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Ps => self.ps,
            Feature::Qv2m => self.qv2m,
            Feature::Ts => self.ts,
            Feature::Tqv => self.tqv,
            Feature::VarTqv => self.var_tqv,
        }
    }

    /// Values of [`Feature::MODEL_FEATURES`] in order.
    pub fn feature_vector(&self) -> [f64; 5] {
        Feature::MODEL_FEATURES.map(|f| self.value(f))
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}
