pub mod estimator;
pub mod heuristic_estimator;
pub mod model_estimator;
pub mod pipeline_driver;

pub use estimator::WeatherEstimator;
pub use heuristic_estimator::{BatchStatistics, FeatureStatistics, HeuristicEstimator};
pub use model_estimator::ModelEstimator;
pub use pipeline_driver::{PipelineDriver, PipelineOutcome};
