use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// a (path, blob) pair, as staged in the index and recorded in commits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingEntry {
    /// path relative to the repository root, `/`-separated
    pub path: String,
    /// blob holding the file content
    pub hash: Hash,
}

impl StagingEntry {
    pub fn new(path: impl Into<String>, hash: Hash) -> Self {
        Self {
            path: path.into(),
            hash,
        }
    }
}

impl std::fmt::Display for StagingEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.hash.short(), self.path)
    }
}
