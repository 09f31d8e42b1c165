//! User-item affinity ranking
//!
//! The ranker scores every distinct catalog song for a user through an opaque
//! [`AffinityPredictor`] and keeps the highest-scoring ones. Individual
//! estimates may fail; those songs are left out of the ranking.

use crate::catalog::Catalog;
use crate::error::PredictionError;
use crate::rank::{sort_by_score_desc, ScoredItem};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Estimates how a user would rate an item
pub trait AffinityPredictor: Send + Sync {
    fn estimate(&self, user: &str, item: &str) -> std::result::Result<f64, PredictionError>;
}

/// Bias and latent factors of one user or item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentFactors {
    pub bias: f64,
    pub factors: Vec<f64>,
}

/// Biased matrix-factorization predictor
///
/// `estimate = mean + b_u + b_i + <p_u, q_i>`. Terms for an unknown user or an
/// unknown item are dropped; when both are unknown there is no estimate. The
/// result is clipped to the rating scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatentFactorModel {
    global_mean: f64,
    n_factors: usize,
    rating_scale: (f64, f64),
    users: HashMap<String, LatentFactors>,
    items: HashMap<String, LatentFactors>,
}

impl LatentFactorModel {
    pub fn new(global_mean: f64, n_factors: usize) -> Self {
        Self {
            global_mean,
            n_factors,
            rating_scale: (1.0, 5.0),
            users: HashMap::new(),
            items: HashMap::new(),
        }
    }

    /// Replace the clipping range; `min` must not exceed `max`
    pub fn with_rating_scale(mut self, min: f64, max: f64) -> Result<Self> {
        check_scale(min, max)?;
        self.rating_scale = (min, max);
        Ok(self)
    }

    pub fn add_user(&mut self, id: impl Into<String>, bias: f64, factors: Vec<f64>) -> Result<()> {
        let id = id.into();
        let entry = LatentFactors { bias, factors };
        self.check_entry(&id, &entry)?;
        self.users.insert(id, entry);
        Ok(())
    }

    pub fn add_item(&mut self, id: impl Into<String>, bias: f64, factors: Vec<f64>) -> Result<()> {
        let id = id.into();
        let entry = LatentFactors { bias, factors };
        self.check_entry(&id, &entry)?;
        self.items.insert(id, entry);
        Ok(())
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn n_factors(&self) -> usize {
        self.n_factors
    }

    pub fn rating_scale(&self) -> (f64, f64) {
        self.rating_scale
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Check a deserialized model: rating scale, finite parameters and
    /// factor dimensions
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.rating_scale;
        check_scale(min, max)?;
        if !self.global_mean.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "global mean {} is not finite",
                self.global_mean
            )));
        }
        for (id, entry) in self.users.iter().chain(self.items.iter()) {
            self.check_entry(id, entry)?;
        }
        Ok(())
    }

    fn check_entry(&self, id: &str, entry: &LatentFactors) -> Result<()> {
        if entry.factors.len() != self.n_factors {
            return Err(Error::InvalidFactors {
                id: id.to_string(),
                expected: self.n_factors,
                actual: entry.factors.len(),
            });
        }
        if !entry.bias.is_finite() || entry.factors.iter().any(|f| !f.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "non-finite bias or factor for {id}"
            )));
        }
        Ok(())
    }
}

fn check_scale(min: f64, max: f64) -> Result<()> {
    if !(min.is_finite() && max.is_finite() && min <= max) {
        return Err(Error::InvalidConfig(format!(
            "rating scale {min}..{max} is empty"
        )));
    }
    Ok(())
}

impl AffinityPredictor for LatentFactorModel {
    fn estimate(&self, user: &str, item: &str) -> std::result::Result<f64, PredictionError> {
        let est = match (self.users.get(user), self.items.get(item)) {
            (Some(u), Some(i)) => {
                let dot: f64 = u.factors.iter().zip(&i.factors).map(|(a, b)| a * b).sum();
                self.global_mean + u.bias + i.bias + dot
            }
            (Some(u), None) => self.global_mean + u.bias,
            (None, Some(i)) => self.global_mean + i.bias,
            (None, None) => {
                return Err(PredictionError::NoEstimate {
                    user: user.to_string(),
                    item: item.to_string(),
                })
            }
        };
        let (min, max) = self.rating_scale;
        // f64::clamp panics on a reversed or NaN scale
        Ok(est.max(min).min(max))
    }
}

/// Ranks catalog songs by predicted rating for a user
pub struct AffinityRanker {
    catalog: Arc<Catalog>,
    predictor: Option<Arc<dyn AffinityPredictor>>,
}

impl AffinityRanker {
    /// `predictor` is `None` when no model was loaded; the ranker then stays
    /// unavailable for its whole lifetime.
    pub fn new(catalog: Arc<Catalog>, predictor: Option<Arc<dyn AffinityPredictor>>) -> Self {
        Self { catalog, predictor }
    }

    pub fn is_available(&self) -> bool {
        self.predictor.is_some()
    }

    /// Up to `k` songs with the highest predicted rating for `user_id`
    pub fn rank_for_user(&self, user_id: &str, k: usize) -> Result<Vec<ScoredItem<'_>>> {
        let predictor = self.predictor.as_deref().ok_or(Error::ModelUnavailable)?;
        if !self.catalog.supports_affinity() {
            return Err(Error::SchemaUnsupported);
        }

        let mut failed = 0usize;
        let mut scored: Vec<ScoredItem<'_>> = self
            .catalog
            .distinct_items()
            .fold(Vec::new(), |mut acc, item| {
                match predictor.estimate(user_id, &item.name) {
                    Ok(score) => acc.push(ScoredItem { item, score }),
                    Err(e) => {
                        trace!("dropping {}: {}", item.name, e);
                        failed += 1;
                    }
                }
                acc
            });

        sort_by_score_desc(&mut scored, |s| s.score);
        scored.truncate(k);

        debug!(
            user = user_id,
            failed,
            returned = scored.len(),
            "ranked items by predicted affinity"
        );
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predictor backed by a fixed table; anything else has no estimate
    struct TablePredictor(HashMap<(String, String), f64>);

    impl TablePredictor {
        fn new(user: &str, scores: &[(&str, f64)]) -> Self {
            Self(
                scores
                    .iter()
                    .map(|(item, s)| ((user.to_string(), item.to_string()), *s))
                    .collect(),
            )
        }
    }

    impl AffinityPredictor for TablePredictor {
        fn estimate(&self, user: &str, item: &str) -> std::result::Result<f64, PredictionError> {
            self.0
                .get(&(user.to_string(), item.to_string()))
                .copied()
                .ok_or_else(|| PredictionError::NoEstimate {
                    user: user.to_string(),
                    item: item.to_string(),
                })
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            Catalog::new(vec![
                ("A", "Art1", "Pop"),
                ("B", "Art2", "Pop"),
                ("C", "Art3", "Rock"),
                ("D", "Art4", "Rock"),
                ("E", "Art5", "Jazz"),
                ("F", "Art6", "Jazz"),
            ])
            .with_user_column(true),
        )
    }

    fn ranked(result: &[ScoredItem<'_>]) -> Vec<(String, f64)> {
        result.iter().map(|s| (s.item.name.clone(), s.score)).collect()
    }

    #[test]
    fn test_rank_for_user_worked_example() {
        let predictor = TablePredictor::new(
            "u1",
            &[("A", 4.8), ("B", 3.1), ("C", 4.9), ("D", 2.0), ("E", 1.0), ("F", 4.0)],
        );
        let ranker = AffinityRanker::new(catalog(), Some(Arc::new(predictor)));
        let result = ranker.rank_for_user("u1", 3).unwrap();
        assert_eq!(
            ranked(&result),
            vec![("C".to_string(), 4.9), ("A".to_string(), 4.8), ("F".to_string(), 4.0)]
        );
    }

    #[test]
    fn test_failed_estimates_are_skipped() {
        let predictor = TablePredictor::new("u1", &[("B", 2.0), ("E", 3.0)]);
        let ranker = AffinityRanker::new(catalog(), Some(Arc::new(predictor)));
        let result = ranker.rank_for_user("u1", 5).unwrap();
        assert_eq!(ranked(&result), vec![("E".to_string(), 3.0), ("B".to_string(), 2.0)]);

        // Unknown user: every estimate fails, still not an error
        assert!(ranker.rank_for_user("nobody", 5).unwrap().is_empty());
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let predictor = TablePredictor::new("u1", &[("D", 3.0), ("B", 3.0), ("F", 3.0)]);
        let ranker = AffinityRanker::new(catalog(), Some(Arc::new(predictor)));
        let names: Vec<String> = ranked(&ranker.rank_for_user("u1", 5).unwrap())
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["B", "D", "F"]);
    }

    #[test]
    fn test_duplicate_rows_scored_once() {
        let catalog = Arc::new(
            Catalog::new(vec![("A", "x", "y"), ("A", "x", "y"), ("B", "x", "y")])
                .with_user_column(true),
        );
        let predictor = TablePredictor::new("u1", &[("A", 5.0), ("B", 4.0)]);
        let ranker = AffinityRanker::new(catalog, Some(Arc::new(predictor)));
        let result = ranker.rank_for_user("u1", 5).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].item.index, 0);
    }

    #[test]
    fn test_missing_predictor() {
        let ranker = AffinityRanker::new(catalog(), None);
        assert!(!ranker.is_available());
        for user in ["u1", "", "42"] {
            assert_eq!(ranker.rank_for_user(user, 5), Err(Error::ModelUnavailable));
        }
    }

    #[test]
    fn test_catalog_without_user_column() {
        let catalog = Arc::new(Catalog::new(vec![("A", "x", "y")]));
        let predictor = TablePredictor::new("u1", &[("A", 5.0)]);
        let ranker = AffinityRanker::new(catalog, Some(Arc::new(predictor)));
        assert_eq!(ranker.rank_for_user("u1", 5), Err(Error::SchemaUnsupported));
    }

    #[test]
    fn test_latent_factor_estimate() {
        let mut model = LatentFactorModel::new(3.0, 2);
        model.add_user("u1", 0.5, vec![1.0, 0.0]).unwrap();
        model.add_item("A", 0.25, vec![0.5, 2.0]).unwrap();
        model.add_item("B", -0.5, vec![10.0, 0.0]).unwrap();

        assert!((model.estimate("u1", "A").unwrap() - 4.25).abs() < 1e-9);
        // clipped to the top of the scale
        assert_eq!(model.estimate("u1", "B").unwrap(), 5.0);
        // unknown user falls back to item bias
        assert!((model.estimate("u2", "A").unwrap() - 3.25).abs() < 1e-9);
        // unknown item falls back to user bias
        assert!((model.estimate("u1", "Z").unwrap() - 3.5).abs() < 1e-9);
        assert!(model.estimate("u2", "Z").is_err());
    }

    #[test]
    fn test_latent_factor_dimension_checks() {
        let mut model = LatentFactorModel::new(3.0, 2);
        assert!(model.add_user("u1", 0.0, vec![1.0]).is_err());
        assert!(model.add_item("A", 0.0, vec![1.0, 2.0]).is_ok());
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_rating_scale_rejected_at_construction() {
        assert!(LatentFactorModel::new(3.0, 1).with_rating_scale(5.0, 1.0).is_err());
        assert!(LatentFactorModel::new(3.0, 1).with_rating_scale(f64::NAN, 5.0).is_err());
        assert!(LatentFactorModel::new(3.0, 1).with_rating_scale(1.0, f64::INFINITY).is_err());

        let model = LatentFactorModel::new(3.0, 1).with_rating_scale(0.0, 10.0).unwrap();
        assert_eq!(model.rating_scale(), (0.0, 10.0));
    }

    #[test]
    fn test_reversed_scale_from_snapshot_does_not_panic() {
        // a deserialized model skips the builder checks until validate runs
        let mut model = LatentFactorModel::new(3.0, 1);
        model.rating_scale = (5.0, 1.0);
        model.add_user("u1", 0.0, vec![1.0]).unwrap();
        assert!(model.validate().is_err());

        let ranker = AffinityRanker::new(catalog(), Some(Arc::new(model)));
        let result = ranker.rank_for_user("u1", 5).unwrap();
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_non_finite_parameters_rejected() {
        let mut model = LatentFactorModel::new(3.0, 2);
        assert!(model.add_user("u1", f64::NAN, vec![1.0, 0.0]).is_err());
        assert!(model.add_item("A", 0.0, vec![f64::INFINITY, 0.0]).is_err());
        assert_eq!(model.user_count() + model.item_count(), 0);

        let mut model = LatentFactorModel::new(3.0, 1);
        model.items.insert(
            "A".to_string(),
            LatentFactors {
                bias: 0.0,
                factors: vec![f64::NAN],
            },
        );
        assert!(model.validate().is_err());
        assert!(LatentFactorModel::new(f64::NAN, 1).validate().is_err());
    }
}
