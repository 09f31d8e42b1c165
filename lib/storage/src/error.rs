use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArtifactError>;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Models directory not found: {}", .0.display())]
    MissingDir(PathBuf),

    #[error("Artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Catalog is missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Invalid(#[from] songrec_core::Error),
}
