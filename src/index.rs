use std::fs;

use crate::config::DuplicatePolicy;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::repo::Repo;
use crate::types::StagingEntry;

/// staging index: entries waiting for the next commit, in staging order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Index {
    entries: Vec<StagingEntry>,
}

impl Index {
    /// load the index from disk; a missing file is an empty index
    pub fn load(repo: &Repo) -> Result<Self> {
        let path = repo.index_path();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io { path, source: e }),
        };

        if bytes.is_empty() {
            return Ok(Self::default());
        }

        let entries: Vec<StagingEntry> = ciborium::from_reader(&bytes[..])?;
        Ok(Self { entries })
    }

    /// persist the index atomically
    pub fn save(&self, repo: &Repo) -> Result<()> {
        let mut bytes = Vec::new();
        ciborium::into_writer(&self.entries, &mut bytes)?;
        repo.write_atomic(&repo.index_path(), &bytes)
    }

    /// stage a path according to the duplicate policy
    pub fn stage(&mut self, path: impl Into<String>, hash: Hash, policy: DuplicatePolicy) {
        let path = path.into();

        if policy == DuplicatePolicy::Replace {
            if let Some(existing) = self.entries.iter_mut().find(|e| e.path == path) {
                existing.hash = hash;
                return;
            }
        }

        self.entries.push(StagingEntry::new(path, hash));
    }

    /// append unconditionally, keeping any earlier entry for the same path
    pub fn append(&mut self, path: impl Into<String>, hash: Hash) {
        self.stage(path, hash, DuplicatePolicy::Append);
    }

    pub fn entries(&self) -> &[StagingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
