use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::model_file::ModelFileError;
use crate::core::torsion::variables::MappingError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Geometry error: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Variable mapping error: {source}")]
    Mapping {
        #[from]
        source: MappingError,
    },

    #[error("Model file error: {source}")]
    ModelFile {
        #[from]
        source: ModelFileError,
    },

    #[error("Model does not match the molecule: {0}")]
    ModelMismatch(String),

    #[error("Internal logic error: {0}")]
    Internal(String),
}
