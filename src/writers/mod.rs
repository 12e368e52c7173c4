pub mod param_writer;
pub mod prediction_writer;

pub use param_writer::ParamWriter;
pub use prediction_writer::{PredictionSink, SqlitePredictionSink};
