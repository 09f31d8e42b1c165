use crate::catalog::Item;

/// Default size of the result window
pub const DEFAULT_TOP_K: usize = 5;

/// A catalog item paired with the score it was ranked by
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredItem<'a> {
    pub item: &'a Item,
    pub score: f64,
}

/// Stable descending sort by score.
///
/// Entries with equal scores keep their input order. `total_cmp` keeps the
/// ordering total even when an artifact carries NaN.
#[inline]
pub fn sort_by_score_desc<T, F>(entries: &mut [T], score: F)
where
    F: Fn(&T) -> f64,
{
    entries.sort_by(|a, b| score(b).total_cmp(&score(a)));
}
