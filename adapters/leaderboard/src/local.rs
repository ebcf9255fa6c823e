use std::{
    fs, io,
    path::{Path, PathBuf},
};

use defense_arcade_core::{ranking_order, rules, LocalScore, RecordId};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while writing the local score cache.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// The cache file or its directory could not be written.
    #[error("failed to write local scores: {0}")]
    Io(#[from] io::Error),
    /// The scores could not be encoded.
    #[error("failed to encode local scores: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Per-machine score history kept as a JSON array on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalScoreStore {
    path: PathBuf,
}

impl LocalScoreStore {
    /// Stores scores in the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached scores best first.
    ///
    /// A missing or unreadable file yields an empty history.
    #[must_use]
    pub fn load_local_scores(&self) -> Vec<LocalScore> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "could not read local scores");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(scores) => scores,
            Err(error) => {
                warn!(path = %self.path.display(), %error, "discarding malformed local scores");
                Vec::new()
            }
        }
    }

    /// Adds a score and rewrites the cache, keeping the best entries only.
    ///
    /// Blank names are not recorded.
    pub fn persist_local_score(
        &self,
        name: &str,
        score: i64,
        timestamp: u64,
        remote_id: Option<RecordId>,
    ) -> Result<(), LocalStoreError> {
        if name.is_empty() {
            return Ok(());
        }

        let mut scores = self.load_local_scores();
        scores.push(LocalScore {
            name: name.to_owned(),
            score,
            timestamp,
            remote_id,
        });
        scores.sort_by(|a, b| ranking_order((a.score, a.timestamp), (b.score, b.timestamp)));
        scores.truncate(rules::LOCAL_SCORE_CAPACITY);

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&scores)?)?;
        debug!(path = %self.path.display(), kept = scores.len(), "local scores saved");
        Ok(())
    }
}
