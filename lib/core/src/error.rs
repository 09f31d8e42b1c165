use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Song not found in dataset")]
    ItemNotFound(String),

    #[error("Collaborative model not trained")]
    ModelUnavailable,

    #[error("Dataset does not contain user ratings")]
    SchemaUnsupported,

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field {0} must be a string or a number")]
    InvalidField(String),

    #[error("Invalid similarity matrix: expected {expected}x{expected}, got {actual} values")]
    InvalidMatrix { expected: usize, actual: usize },

    #[error("Invalid factor dimension for {id}: expected {expected}, got {actual}")]
    InvalidFactors {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure of a single `(user, item)` estimate.
///
/// Never surfaced to callers; the affinity ranker drops the item instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("No estimate for user {user} and item {item}")]
    NoEstimate { user: String, item: String },
}
