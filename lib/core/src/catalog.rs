//! Immutable song catalog
//!
//! The catalog is the single source of truth mapping a song name to its row
//! position and metadata. Row positions are the index space shared with the
//! similarity matrix.

use crate::{Error, Result};
use ahash::AHashMap;

/// One catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// 0-based row position, stable for the lifetime of the catalog
    pub index: usize,
    pub name: String,
    pub artist: String,
    pub genre: String,
}

/// Indexed, read-only table of items
///
/// Rating datasets repeat a song once per rating, so a name may appear on more
/// than one row. Name lookups resolve to the first row carrying the name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
    by_name: AHashMap<String, usize>,
    /// First row of every distinct name, in first-appearance order
    distinct: Vec<usize>,
    user_column: bool,
}

impl Catalog {
    /// Build a catalog from `(name, artist, genre)` rows in source order
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut items = Vec::new();
        let mut by_name = AHashMap::new();
        let mut distinct = Vec::new();

        for (index, (name, artist, genre)) in rows.into_iter().enumerate() {
            let name = name.into();
            if !by_name.contains_key(&name) {
                by_name.insert(name.clone(), index);
                distinct.push(index);
            }
            items.push(Item {
                index,
                name,
                artist: artist.into(),
                genre: genre.into(),
            });
        }

        Self {
            items,
            by_name,
            distinct,
            user_column: false,
        }
    }

    /// Mark whether the source table carried the user/song association column
    #[must_use]
    pub fn with_user_column(mut self, present: bool) -> Self {
        self.user_column = present;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve a song name to its (first) row index
    pub fn lookup_by_name(&self, name: &str) -> Result<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::ItemNotFound(name.to_string()))
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// First row of every distinct song name, in catalog order
    pub fn distinct_items(&self) -> impl Iterator<Item = &Item> {
        self.distinct.iter().map(move |&i| &self.items[i])
    }

    pub fn distinct_count(&self) -> usize {
        self.distinct.len()
    }

    /// Whether ratings can be attributed to users for this catalog
    #[inline]
    pub fn supports_affinity(&self) -> bool {
        self.user_column
    }
}
