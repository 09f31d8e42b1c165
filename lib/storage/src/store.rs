use crate::catalog_csv::{read_catalog_file, write_catalog};
use crate::error::{ArtifactError, Result};
use crate::snapshot::{read_matrix, read_model, write_atomic, write_matrix, write_model};
use songrec_core::{
    AffinityPredictor, Catalog, LatentFactorModel, Recommender, RecommenderConfig, SimilarityMatrix,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const CATALOG_FILE: &str = "songs.csv";
pub const SIMILARITY_FILE: &str = "similarity.bin";
pub const PREDICTOR_FILE: &str = "affinity.bin";

/// Everything a [`Recommender`] is built from, loaded once at startup
pub struct Artifacts {
    pub catalog: Arc<Catalog>,
    pub matrix: SimilarityMatrix,
    pub predictor: Option<Arc<dyn AffinityPredictor>>,
}

impl Artifacts {
    pub fn into_recommender(self, config: RecommenderConfig) -> Result<Recommender> {
        Ok(Recommender::new(self.catalog, self.matrix, self.predictor, config)?)
    }
}

/// Locates and loads the artifacts of one models directory
pub struct ArtifactStore {
    models_dir: PathBuf,
}

impl ArtifactStore {
    /// Open an existing models directory
    pub fn new<P: AsRef<Path>>(models_dir: P) -> Result<Self> {
        let models_dir = models_dir.as_ref().to_path_buf();
        if !models_dir.is_dir() {
            return Err(ArtifactError::MissingDir(models_dir));
        }
        Ok(Self { models_dir })
    }

    /// Open a models directory, creating it if needed
    pub fn create<P: AsRef<Path>>(models_dir: P) -> Result<Self> {
        std::fs::create_dir_all(models_dir.as_ref())?;
        Self::new(models_dir)
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.models_dir.join(CATALOG_FILE)
    }

    pub fn similarity_path(&self) -> PathBuf {
        self.models_dir.join(SIMILARITY_FILE)
    }

    pub fn predictor_path(&self) -> PathBuf {
        self.models_dir.join(PREDICTOR_FILE)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        let path = self.catalog_path();
        if !path.exists() {
            return Err(ArtifactError::MissingArtifact(path));
        }
        let catalog = read_catalog_file(&path)?;
        info!(
            "Loaded catalog: {} rows, {} distinct songs, user ratings: {}",
            catalog.len(),
            catalog.distinct_count(),
            catalog.supports_affinity()
        );
        Ok(catalog)
    }

    /// Load the similarity matrix; it must cover every catalog row
    pub fn load_similarity(&self, catalog: &Catalog) -> Result<SimilarityMatrix> {
        let matrix = read_matrix(self.similarity_path())?;
        if matrix.dim() != catalog.len() {
            return Err(songrec_core::Error::InvalidMatrix {
                expected: catalog.len(),
                actual: matrix.as_slice().len(),
            }
            .into());
        }
        info!("Loaded similarity matrix: {}x{}", matrix.dim(), matrix.dim());
        Ok(matrix)
    }

    /// Load the latent-factor model, `None` when no model file exists
    pub fn load_predictor(&self) -> Result<Option<LatentFactorModel>> {
        let path = self.predictor_path();
        if !path.exists() {
            warn!("No affinity model at {:?}; collaborative recommendations disabled", path);
            return Ok(None);
        }
        let model = read_model(&path)?;
        info!(
            "Loaded affinity model: {} users, {} items, {} factors",
            model.user_count(),
            model.item_count(),
            model.n_factors()
        );
        Ok(Some(model))
    }

    pub fn load(&self) -> Result<Artifacts> {
        let catalog = self.load_catalog()?;
        let matrix = self.load_similarity(&catalog)?;
        let predictor = self
            .load_predictor()?
            .map(|model| Arc::new(model) as Arc<dyn AffinityPredictor>);
        Ok(Artifacts {
            catalog: Arc::new(catalog),
            matrix,
            predictor,
        })
    }

    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        write_atomic(&self.catalog_path(), &write_catalog(catalog)?)
    }

    pub fn save_similarity(&self, matrix: &SimilarityMatrix) -> Result<()> {
        write_matrix(self.similarity_path(), matrix)
    }

    pub fn save_predictor(&self, model: &LatentFactorModel) -> Result<()> {
        write_model(self.predictor_path(), model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_catalog_text(store: &ArtifactStore, data: &str) {
        fs::write(store.catalog_path(), data).unwrap();
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ArtifactStore::new(dir.path().join("absent")),
            Err(ArtifactError::MissingDir(_))
        ));
        assert!(ArtifactStore::create(dir.path().join("absent")).is_ok());
    }

    #[test]
    fn test_load_without_predictor() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        write_catalog_text(&store, "Song,Artist,Genre\nA,Art1,Pop\nB,Art2,Pop\n");
        store
            .save_similarity(&SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap())
            .unwrap();

        let artifacts = store.load().unwrap();
        assert_eq!(artifacts.catalog.len(), 2);
        assert!(artifacts.predictor.is_none());

        let recommender = artifacts.into_recommender(RecommenderConfig::default()).unwrap();
        assert!(!recommender.affinity_available());
        assert_eq!(recommender.recommend_by_similarity("A").unwrap()[0].song, "B");
    }

    #[test]
    fn test_matrix_must_match_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        write_catalog_text(&store, "Song,Artist,Genre\nA,Art1,Pop\n");
        store
            .save_similarity(&SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap())
            .unwrap();
        assert!(matches!(store.load(), Err(ArtifactError::Invalid(_))));
    }

    #[test]
    fn test_saved_catalog_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let catalog = Catalog::new(vec![("A", "Art1", "Pop"), ("B", "Art2", "Rock"), ("A", "Art1", "Pop")])
            .with_user_column(true);

        store.save_catalog(&catalog).unwrap();
        assert!(!store.catalog_path().with_extension("tmp").exists());

        let loaded = store.load_catalog().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.distinct_count(), 2);
        assert!(loaded.supports_affinity());
        assert_eq!(loaded.row(1).unwrap().genre, "Rock");

        // overwriting replaces the previous catalog
        store.save_catalog(&Catalog::new(vec![("C", "Art3", "Jazz")])).unwrap();
        let loaded = store.load_catalog().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.supports_affinity());
    }

    #[test]
    fn test_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        assert!(matches!(store.load(), Err(ArtifactError::MissingArtifact(_))));
    }
}
