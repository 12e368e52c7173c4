pub mod model_reader;
pub mod param_reader;
pub mod place_reader;
pub mod prediction_reader;
pub mod seed_reader;

pub use model_reader::ModelReader;
pub use param_reader::{ParameterSource, SqliteParameterSource};
pub use place_reader::PlaceReader;
pub use prediction_reader::PredictionReader;
pub use seed_reader::{SeedObservation, SeedReader};
