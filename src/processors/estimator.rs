use crate::error::Result;
use crate::models::{DerivedRow, ParameterRow};

/// Strategy that turns parameter rows into predicted weather values.
///
/// Implementations return exactly one result per input row, in input order.
pub trait WeatherEstimator {
    fn name(&self) -> &'static str;

    /// Prepare batch-level statistics. Estimators that need none keep the default.
    fn fit_statistics(&mut self, _rows: &[ParameterRow]) -> Result<()> {
        Ok(())
    }

    fn estimate(&mut self, rows: &[ParameterRow]) -> Result<Vec<DerivedRow>>;

    fn predict(&mut self, rows: &[ParameterRow]) -> Result<Vec<f64>> {
        Ok(self
            .estimate(rows)?
            .into_iter()
            .map(|d| d.predicted_weather)
            .collect())
    }
}

impl<E: WeatherEstimator + ?Sized> WeatherEstimator for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fit_statistics(&mut self, rows: &[ParameterRow]) -> Result<()> {
        (**self).fit_statistics(rows)
    }

    fn estimate(&mut self, rows: &[ParameterRow]) -> Result<Vec<DerivedRow>> {
        (**self).estimate(rows)
    }

    fn predict(&mut self, rows: &[ParameterRow]) -> Result<Vec<f64>> {
        (**self).predict(rows)
    }
}
