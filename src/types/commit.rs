use serde::{Deserialize, Serialize};

use crate::hash::Hash;
use crate::types::StagingEntry;

/// parent link of a commit
///
/// serialized untagged: a single hash string for a normal commit, a
/// two-element array for a merge. root commits carry no parent at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parent {
    Single(Hash),
    Merge([Hash; 2]),
}

impl Parent {
    /// parent hashes in order
    pub fn hashes(&self) -> &[Hash] {
        match self {
            Parent::Single(hash) => std::slice::from_ref(hash),
            Parent::Merge(hashes) => hashes,
        }
    }
}

/// a commit object: a file-list snapshot plus history links
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
    /// commit message
    pub message: String,
    /// files recorded by this commit, in staging order
    pub files: Vec<StagingEntry>,
    /// parent link, `None` for the first commit of a branch
    pub parent: Option<Parent>,
}

impl Commit {
    /// create a new commit stamped with the current time
    pub fn new(parent: Option<Parent>, message: impl Into<String>, files: Vec<StagingEntry>) -> Self {
        Self::with_timestamp(parent, chrono::Utc::now().timestamp(), message, files)
    }

    /// create a new commit with explicit timestamp
    pub fn with_timestamp(
        parent: Option<Parent>,
        timestamp: i64,
        message: impl Into<String>,
        files: Vec<StagingEntry>,
    ) -> Self {
        Self {
            timestamp,
            message: message.into(),
            files,
            parent,
        }
    }

    /// parent hashes in order (empty for a root commit)
    pub fn parents(&self) -> &[Hash] {
        self.parent.as_ref().map(Parent::hashes).unwrap_or(&[])
    }

    /// is this an initial commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// is this a merge commit (two parents)
    pub fn is_merge(&self) -> bool {
        matches!(self.parent, Some(Parent::Merge(_)))
    }

    /// look up the blob recorded for a path (first entry wins)
    pub fn file(&self, path: &str) -> Option<&Hash> {
        self.files.iter().find(|e| e.path == path).map(|e| &e.hash)
    }
}
