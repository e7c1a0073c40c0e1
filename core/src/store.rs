//! Directory of solution masks, one `<id>.rle` file per challenge.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::classify::MaskFile;
use crate::config::MaskConfig;
use crate::error::MaskError;
use crate::rle::RowPolicy;
use crate::types::Point;

const MASK_EXTENSION: &str = "rle";

#[derive(Debug, Clone)]
pub struct MaskStore {
    dir: PathBuf,
    policy: RowPolicy,
}

impl MaskStore {
    pub fn new(dir: impl Into<PathBuf>, policy: RowPolicy) -> Self {
        Self {
            dir: dir.into(),
            policy,
        }
    }

    pub fn from_config(config: &MaskConfig) -> Self {
        Self::new(config.dir.clone(), config.row_policy)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `id`. Ids are restricted to ASCII letters, digits, `-`
    /// and `_` so they cannot escape the mask directory.
    pub fn path_for(&self, id: &str) -> Result<PathBuf, MaskError> {
        let valid = !id.is_empty()
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(MaskError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.{MASK_EXTENSION}")))
    }

    pub fn open(&self, id: &str) -> Result<MaskFile<fs::File>, MaskError> {
        let path = self.path_for(id)?;
        MaskFile::open(&path, self.policy).map_err(|e| match e {
            MaskError::UnknownMask(_) => MaskError::UnknownMask(id.to_string()),
            other => other,
        })
    }

    /// Classify `point` against the mask stored under `id`.
    pub fn check(&self, id: &str, point: Point) -> Result<bool, MaskError> {
        let verdict = self.open(id)?.classify(point)?;
        debug!(id, %point, verdict, "checked solution");
        Ok(verdict)
    }

    /// Delete the mask stored under `id`.
    pub fn remove(&self, id: &str) -> Result<(), MaskError> {
        let path = self.path_for(id)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MaskError::UnknownMask(id.to_string()),
            _ => MaskError::Io(e),
        })
    }
}
