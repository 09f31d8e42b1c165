pub mod catalog_csv;
pub mod error;
pub mod snapshot;
pub mod store;

pub use error::{ArtifactError, Result};
pub use store::{ArtifactStore, Artifacts, CATALOG_FILE, PREDICTOR_FILE, SIMILARITY_FILE};
