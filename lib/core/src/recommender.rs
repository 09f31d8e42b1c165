//! Recommendation facade
//!
//! Dispatches a request to the similarity or affinity ranker and shapes the
//! ranked items into the external result: either a recommendation list or a
//! single error message.

use crate::affinity::{AffinityPredictor, AffinityRanker};
use crate::catalog::{Catalog, Item};
use crate::rank::DEFAULT_TOP_K;
use crate::similarity::{SimilarityMatrix, SimilarityRanker};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Which ranker serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Items similar to a known song
    Similarity,
    /// Items a known user is predicted to rate highly
    Affinity,
}

/// Configuration for the facade
#[derive(Debug, Clone, Copy)]
pub struct RecommenderConfig {
    /// Fixed size of every result window
    pub top_k: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K }
    }
}

impl RecommenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Identifier fields of an incoming request; which one is required depends on
/// the strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendRequest {
    pub song: Option<String>,
    pub user: Option<String>,
}

impl RecommendRequest {
    pub fn for_song(song: impl Into<String>) -> Self {
        Self {
            song: Some(song.into()),
            user: None,
        }
    }

    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            song: None,
            user: Some(user.into()),
        }
    }
}

/// One recommended song as exposed to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecommendation {
    #[serde(rename = "Song")]
    pub song: String,
    #[serde(rename = "Artist")]
    pub artist: String,
    #[serde(rename = "Genre")]
    pub genre: String,
    /// Only set by the affinity strategy
    #[serde(rename = "PredictedRating", skip_serializing_if = "Option::is_none")]
    pub predicted_rating: Option<f64>,
}

impl SongRecommendation {
    fn from_item(item: &Item, predicted_rating: Option<f64>) -> Self {
        Self {
            song: item.name.clone(),
            artist: item.artist.clone(),
            genre: item.genre.clone(),
            predicted_rating,
        }
    }
}

/// Result of a recommendation request: a list or an error, never both
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Recommendations {
        recommendations: Vec<SongRecommendation>,
    },
    Error {
        error: String,
    },
}

impl From<Result<Vec<SongRecommendation>>> for Response {
    fn from(result: Result<Vec<SongRecommendation>>) -> Self {
        match result {
            Ok(recommendations) => Response::Recommendations { recommendations },
            Err(e) => Response::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Entry point shared by every request
///
/// Built once at startup from the loaded artifacts and never mutated, so a
/// single instance can serve concurrent requests behind an `Arc`.
pub struct Recommender {
    catalog: Arc<Catalog>,
    similarity: SimilarityRanker,
    affinity: AffinityRanker,
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(
        catalog: Arc<Catalog>,
        matrix: SimilarityMatrix,
        predictor: Option<Arc<dyn AffinityPredictor>>,
        config: RecommenderConfig,
    ) -> Result<Self> {
        config.validate()?;
        let similarity = SimilarityRanker::new(catalog.clone(), matrix)?;
        let affinity = AffinityRanker::new(catalog.clone(), predictor);
        Ok(Self {
            catalog,
            similarity,
            affinity,
            config,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn affinity_available(&self) -> bool {
        self.affinity.is_available()
    }

    /// Songs most similar to `item_name`, without scores
    pub fn recommend_by_similarity(&self, item_name: &str) -> Result<Vec<SongRecommendation>> {
        let items = self.similarity.rank_similar(item_name, self.config.top_k)?;
        Ok(items
            .into_iter()
            .map(|item| SongRecommendation::from_item(item, None))
            .collect())
    }

    /// Songs with the highest predicted rating for `user_id`, with scores
    pub fn recommend_by_affinity(&self, user_id: &str) -> Result<Vec<SongRecommendation>> {
        let scored = self.affinity.rank_for_user(user_id, self.config.top_k)?;
        Ok(scored
            .into_iter()
            .map(|s| SongRecommendation::from_item(s.item, Some(s.score)))
            .collect())
    }

    /// Validate `request` for `strategy`, dispatch and shape the response
    pub fn recommend(&self, strategy: Strategy, request: &RecommendRequest) -> Response {
        self.try_recommend(strategy, request).into()
    }

    /// Like [`recommend`](Self::recommend) but keeps the error kind
    pub fn try_recommend(&self, strategy: Strategy, request: &RecommendRequest) -> Result<Vec<SongRecommendation>> {
        let result = self.dispatch(strategy, request);
        match &result {
            Ok(list) => debug!(?strategy, returned = list.len(), "recommendation served"),
            Err(e) => debug!(?strategy, error = %e, "recommendation rejected"),
        }
        result
    }

    fn dispatch(&self, strategy: Strategy, request: &RecommendRequest) -> Result<Vec<SongRecommendation>> {
        match strategy {
            Strategy::Similarity => {
                let song = request
                    .song
                    .as_deref()
                    .ok_or_else(|| Error::MissingField("song".to_string()))?;
                self.recommend_by_similarity(song)
            }
            Strategy::Affinity => {
                if !self.affinity.is_available() {
                    return Err(Error::ModelUnavailable);
                }
                let user = request
                    .user
                    .as_deref()
                    .ok_or_else(|| Error::MissingField("user".to_string()))?;
                self.recommend_by_affinity(user)
            }
        }
    }
}
