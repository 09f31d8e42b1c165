//! # SongRec Core
//!
//! Ranking logic for the SongRec recommendation service.
//!
//! This crate turns precomputed artifacts into ordered top-K song lists:
//!
//! - [`Catalog`] - Immutable, indexed table of songs
//! - [`SimilarityRanker`] - Most similar songs from an item-item similarity matrix
//! - [`AffinityRanker`] - Highest predicted ratings from an [`AffinityPredictor`]
//! - [`Recommender`] - Facade that dispatches a request and shapes the response
//!
//! Loading artifacts and serving HTTP live in other crates; nothing here does I/O.
//!
//! ## Example
//!
//! ```rust
//! use songrec_core::{Catalog, Recommender, RecommenderConfig, SimilarityMatrix};
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::new(vec![
//!     ("A", "Art1", "Pop"),
//!     ("B", "Art2", "Pop"),
//!     ("C", "Art3", "Rock"),
//! ]));
//! let matrix = SimilarityMatrix::from_rows(vec![
//!     vec![1.0, 0.9, 0.8],
//!     vec![0.9, 1.0, 0.7],
//!     vec![0.8, 0.7, 1.0],
//! ]).unwrap();
//!
//! let recommender = Recommender::new(catalog, matrix, None, RecommenderConfig::default()).unwrap();
//! let songs = recommender.recommend_by_similarity("A").unwrap();
//! assert_eq!(songs[0].song, "B");
//! ```

pub mod affinity;
pub mod catalog;
pub mod error;
pub mod rank;
pub mod recommender;
pub mod similarity;

pub use affinity::{AffinityPredictor, AffinityRanker, LatentFactorModel, LatentFactors};
pub use catalog::{Catalog, Item};
pub use error::{Error, PredictionError, Result};
pub use rank::{ScoredItem, DEFAULT_TOP_K};
pub use recommender::{
    RecommendRequest, Recommender, RecommenderConfig, Response, SongRecommendation, Strategy,
};
pub use similarity::{SimilarityMatrix, SimilarityRanker};
