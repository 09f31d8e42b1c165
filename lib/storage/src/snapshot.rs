// Binary snapshots of the similarity matrix and the latent-factor model
use crate::error::{ArtifactError, Result};
use serde::{Deserialize, Serialize};
use songrec_core::{LatentFactorModel, SimilarityMatrix};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    pub dim: usize,
    pub values: Vec<f32>,
}

#[derive(Serialize)]
struct MatrixSnapshotRef<'a> {
    dim: usize,
    values: &'a [f32],
}

pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<SimilarityMatrix> {
    let data = read_existing(path.as_ref())?;
    let snapshot: MatrixSnapshot = bincode::deserialize(&data)?;
    Ok(SimilarityMatrix::new(snapshot.dim, snapshot.values)?)
}

pub fn write_matrix<P: AsRef<Path>>(path: P, matrix: &SimilarityMatrix) -> Result<()> {
    let snapshot = MatrixSnapshotRef {
        dim: matrix.dim(),
        values: matrix.as_slice(),
    };
    write_atomic(path.as_ref(), &bincode::serialize(&snapshot)?)
}

pub fn read_model<P: AsRef<Path>>(path: P) -> Result<LatentFactorModel> {
    let data = read_existing(path.as_ref())?;
    let model: LatentFactorModel = bincode::deserialize(&data)?;
    model.validate()?;
    Ok(model)
}

pub fn write_model<P: AsRef<Path>>(path: P, model: &LatentFactorModel) -> Result<()> {
    write_atomic(path.as_ref(), &bincode::serialize(model)?)
}

fn read_existing(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(ArtifactError::MissingArtifact(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Write to a temporary sibling, then rename over the target
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_file = path.with_extension("tmp");
    fs::write(&temp_file, data)?;
    fs::rename(&temp_file, path)?;
    Ok(())
}
