pub mod artifact;
pub mod derived;
pub mod location;
pub mod parameter;
pub mod prediction;

pub use artifact::{ModelArtifact, TrainedModel};
pub use derived::{DerivedRow, WeightedScores};
pub use location::{Coordinate, LocationInfo, Place};
pub use parameter::{Feature, ParameterRow};
pub use prediction::{PredictionColumn, PredictionRecord};
