//! Item-item similarity ranking
//!
//! Ranks catalog items by a precomputed, square similarity matrix aligned with
//! catalog row order.

use crate::catalog::{Catalog, Item};
use crate::rank::{sort_by_score_desc, ScoredItem};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Dense, row-major `N x N` similarity matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Create a matrix from row-major values; `values.len()` must be `dim * dim`
    pub fn new(dim: usize, values: Vec<f32>) -> Result<Self> {
        if dim.checked_mul(dim) != Some(values.len()) {
            return Err(Error::InvalidMatrix {
                expected: dim,
                actual: values.len(),
            });
        }
        Ok(Self { dim, values })
    }

    /// Create a matrix from rows; every row must be as long as there are rows
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(Error::InvalidMatrix {
                    expected: dim,
                    actual: values.len() + row.len(),
                });
            }
            values.extend(row);
        }
        Self::new(dim, values)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.dim {
            return None;
        }
        let start = index * self.dim;
        Some(&self.values[start..start + self.dim])
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Ranks the items most similar to a given item
pub struct SimilarityRanker {
    catalog: Arc<Catalog>,
    matrix: SimilarityMatrix,
}

impl SimilarityRanker {
    /// Pair a catalog with its matrix; the matrix must cover every catalog row
    pub fn new(catalog: Arc<Catalog>, matrix: SimilarityMatrix) -> Result<Self> {
        if matrix.dim() != catalog.len() {
            return Err(Error::InvalidMatrix {
                expected: catalog.len(),
                actual: matrix.as_slice().len(),
            });
        }
        Ok(Self { catalog, matrix })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// Up to `k` items most similar to `item_name`, most similar first
    pub fn rank_similar(&self, item_name: &str, k: usize) -> Result<Vec<&Item>> {
        Ok(self
            .rank_similar_scored(item_name, k)?
            .into_iter()
            .map(|scored| scored.item)
            .collect())
    }

    /// Like [`rank_similar`](Self::rank_similar) but keeps the similarity scores.
    ///
    /// The whole row is ranked, then the single top-ranked entry is dropped by
    /// position. The diagonal holds the row maximum, so this is normally the
    /// queried item itself. When another item ties with it for the top score,
    /// the stable sort keeps the lower index first and that entry is the one
    /// dropped, which may be the other item.
    pub fn rank_similar_scored(&self, item_name: &str, k: usize) -> Result<Vec<ScoredItem<'_>>> {
        let index = self.catalog.lookup_by_name(item_name)?;
        let row = self
            .matrix
            .row(index)
            .ok_or_else(|| Error::ItemNotFound(item_name.to_string()))?;

        let mut scores: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
        sort_by_score_desc(&mut scores, |&(_, score)| f64::from(score));

        let ranked: Vec<ScoredItem<'_>> = scores
            .into_iter()
            .skip(1)
            .take(k)
            .filter_map(|(other, score)| {
                self.catalog.row(other).map(|item| ScoredItem {
                    item,
                    score: f64::from(score),
                })
            })
            .collect();

        debug!(item = item_name, index, returned = ranked.len(), "ranked similar items");
        Ok(ranked)
    }
}
