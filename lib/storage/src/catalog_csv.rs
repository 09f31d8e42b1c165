//! CSV catalog loader
//!
//! The catalog file has a header row. `Song`, `Artist` and `Genre` are
//! required; a `UserID` column marks the catalog as carrying user ratings.
//! Any other column (e.g. `Rating`) is ignored.
//!
//! Writing emits the three required columns, plus an empty `UserID` column
//! for catalogs that carry user ratings.

use crate::error::{ArtifactError, Result};
use songrec_core::Catalog;
use std::io::Read;
use std::path::Path;

pub const SONG_COLUMN: &str = "Song";
pub const ARTIST_COLUMN: &str = "Artist";
pub const GENRE_COLUMN: &str = "Genre";
pub const USER_COLUMN: &str = "UserID";

pub fn read_catalog_file<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let reader = csv::Reader::from_path(path.as_ref())?;
    read_catalog(reader)
}

pub fn read_catalog<R: Read>(mut reader: csv::Reader<R>) -> Result<Catalog> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ArtifactError::MissingColumn(name.to_string()))
    };

    let song = column(SONG_COLUMN)?;
    let artist = column(ARTIST_COLUMN)?;
    let genre = column(GENRE_COLUMN)?;
    let has_users = headers.iter().any(|h| h == USER_COLUMN);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let get = |i: usize| record.get(i).unwrap_or_default().to_string();
        rows.push((get(song), get(artist), get(genre)));
    }

    Ok(Catalog::new(rows).with_user_column(has_users))
}

/// Serialize `catalog` back into its CSV form, rows in catalog order
pub fn write_catalog(catalog: &Catalog) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec![SONG_COLUMN, ARTIST_COLUMN, GENRE_COLUMN];
    if catalog.supports_affinity() {
        header.push(USER_COLUMN);
    }
    writer.write_record(&header)?;

    for item in catalog.iter() {
        let mut record = vec![item.name.as_str(), item.artist.as_str(), item.genre.as_str()];
        if catalog.supports_affinity() {
            record.push("");
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ArtifactError::Io(e.into_error()))
}
