use super::config::ConfigError;
use super::generator::GenerationError;
use super::model::TrainingError;
use crate::core::error::DataFormatError;
use crate::core::io::dataset::DatasetLoadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load dataset: {source}")]
    Dataset {
        #[from]
        source: DatasetLoadError,
    },

    #[error("Invalid dataset contents: {source}")]
    DataFormat {
        #[from]
        source: DataFormatError,
    },

    #[error("Model training failed: {source}")]
    Training {
        #[from]
        source: TrainingError,
    },

    #[error("Composition generation failed: {source}")]
    Generation {
        #[from]
        source: GenerationError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
