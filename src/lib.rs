//! # SongRec
//!
//! A small song recommendation service over precomputed artifacts.
//!
//! SongRec ranks songs for a requester with one of two strategies:
//!
//! - **Content**: the songs most similar to a known song, from an item-item
//!   similarity matrix
//! - **Collaborative**: the songs a known user is predicted to rate highest,
//!   from a latent-factor model
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! songrec --models-dir ./models --http-port 5000
//! curl -X POST localhost:5000/recommend/content -H 'content-type: application/json' -d '{"song": "Yesterday"}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use songrec::prelude::*;
//!
//! let artifacts = ArtifactStore::new("./models").unwrap().load().unwrap();
//! let recommender = artifacts.into_recommender(RecommenderConfig::default()).unwrap();
//!
//! let similar = recommender.recommend_by_similarity("Yesterday");
//! let for_user = recommender.recommend_by_affinity("42");
//! ```
//!
//! ## Crate Structure
//!
//! - [`songrec-core`](https://docs.rs/songrec-core) - Catalog, rankers and the recommendation facade
//! - [`songrec-storage`](https://docs.rs/songrec-storage) - Artifact loading (CSV catalog, bincode matrix and model)
//! - [`songrec-api`](https://docs.rs/songrec-api) - REST API

// Re-export core types
pub use songrec_core::{
    AffinityPredictor, AffinityRanker, Catalog, Error, Item, LatentFactorModel, PredictionError,
    RecommendRequest, Recommender, RecommenderConfig, Response, Result, ScoredItem,
    SimilarityMatrix, SimilarityRanker, SongRecommendation, Strategy, DEFAULT_TOP_K,
};

// Re-export storage
pub use songrec_storage::{ArtifactError, ArtifactStore, Artifacts};

// Re-export API
pub use songrec_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AffinityPredictor, ArtifactStore, Artifacts, Catalog, Error, Item, LatentFactorModel,
        RecommendRequest, Recommender, RecommenderConfig, Response, RestApi, Result,
        SimilarityMatrix, SongRecommendation, Strategy,
    };
}
