use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::{ModelArtifact, TrainedModel};

/// Loads a model artifact: JSON, gzip-compressed when the file ends in `.gz`.
pub struct ModelReader;

impl ModelReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_file(&self, path: &Path) -> Result<TrainedModel> {
        let load_error = |message: String| PipelineError::ModelLoad {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let artifact: ModelArtifact =
            serde_json::from_reader(reader).map_err(|e| load_error(e.to_string()))?;
        let kind = artifact.kind();
        let model = artifact.into_trained().map_err(load_error)?;

        tracing::info!("Loaded {} model from {}", kind, path.display());
        Ok(model)
    }
}

impl Default for ModelReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const LINEAR: &str = r#"{
        "type": "linear",
        "features": ["PS", "QV2M", "TS", "TQV", "Var_TQV"],
        "intercept": 0.5,
        "coefficients": [0.0, 0.0, 1.0, 0.0, 0.0]
    }"#;

    #[test]
    fn test_read_plain_json() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("model.json");
        std::fs::write(&path, LINEAR)?;

        let model = ModelReader::new().read_file(&path)?;
        assert_eq!(model.predict_one(&[1000.0, 0.01, 15.0, 20.0, 2.0]), 15.5);
        Ok(())
    }

    #[test]
    fn test_read_gzipped_json() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("model.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        encoder.write_all(LINEAR.as_bytes())?;
        encoder.finish()?;

        let model = ModelReader::new().read_file(&path)?;
        assert_eq!(model.kind(), "linear");
        Ok(())
    }

    #[test]
    fn test_missing_or_corrupt_artifact() -> Result<()> {
        let dir = TempDir::new()?;

        let missing = ModelReader::new().read_file(&dir.path().join("absent.json"));
        assert!(matches!(missing, Err(PipelineError::ModelLoad { .. })));

        let corrupt_path = dir.path().join("corrupt.json.gz");
        std::fs::write(&corrupt_path, b"not gzip at all")?;
        let corrupt = ModelReader::new().read_file(&corrupt_path);
        assert!(matches!(corrupt, Err(PipelineError::ModelLoad { .. })));

        let invalid_path = dir.path().join("invalid.json");
        std::fs::write(
            &invalid_path,
            r#"{ "type": "linear", "features": ["PS"], "intercept": 0.0, "coefficients": [1.0] }"#,
        )?;
        let invalid = ModelReader::new().read_file(&invalid_path);
        assert!(matches!(invalid, Err(PipelineError::ModelLoad { .. })));
        Ok(())
    }
}
