use std::collections::HashSet;
use std::fs;

use crate::error::{Error, Result};
use crate::hash::{compute_hash, Hash};
use crate::index::Index;
use crate::object::{list_objects, object_exists, object_path, read_commit};
use crate::refs::{list_branches, read_branch};
use crate::repo::Repo;

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects checked
    pub objects_checked: usize,
    /// objects whose content no longer matches their name
    pub corrupt_objects: Vec<CorruptObject>,
    /// objects referenced by a branch, commit or the index but absent
    pub missing_objects: Vec<MissingObject>,
    /// objects not reachable from any branch or the index
    pub dangling_objects: Vec<Hash>,
    /// branch refs whose content is not a commit hash
    pub corrupt_refs: Vec<CorruptRef>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt_objects.is_empty()
            && self.missing_objects.is_empty()
            && self.corrupt_refs.is_empty()
    }

    /// number of corrupt, missing or unreadable records
    pub fn problem_count(&self) -> usize {
        self.corrupt_objects.len() + self.missing_objects.len() + self.corrupt_refs.len()
    }
}

#[derive(Debug)]
pub struct CorruptObject {
    pub hash: Hash,
    pub message: String,
}

#[derive(Debug)]
pub struct CorruptRef {
    pub branch: String,
    pub message: String,
}

#[derive(Debug)]
pub struct MissingObject {
    pub hash: Hash,
    pub object_type: ObjectType,
    pub referenced_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Commit,
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectType::Blob => write!(f, "blob"),
            ObjectType::Commit => write!(f, "commit"),
        }
    }
}

impl std::fmt::Display for FsckReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "checked {} objects", self.objects_checked)?;

        for obj in &self.corrupt_objects {
            writeln!(f, "corrupt {}: {}", obj.hash, obj.message)?;
        }
        for obj in &self.missing_objects {
            writeln!(
                f,
                "missing {} {} (referenced by {})",
                obj.object_type, obj.hash, obj.referenced_by
            )?;
        }
        for bad in &self.corrupt_refs {
            writeln!(f, "corrupt ref {}: {}", bad.branch, bad.message)?;
        }
        for hash in &self.dangling_objects {
            writeln!(f, "dangling {}", hash)?;
        }

        if self.is_ok() {
            writeln!(f, "ok")
        } else {
            writeln!(
                f,
                "{} corrupt, {} missing",
                self.corrupt_objects.len() + self.corrupt_refs.len(),
                self.missing_objects.len()
            )
        }
    }
}

/// check every stored object and everything reachable from branches and the index
pub fn fsck(repo: &Repo) -> Result<FsckReport> {
    let mut report = FsckReport::default();
    let mut reachable = HashSet::new();
    let mut visited_commits = HashSet::new();
    let mut corrupt = HashSet::new();

    // re-hash every stored object
    for hash in list_objects(repo)? {
        report.objects_checked += 1;

        let path = object_path(repo, &hash);
        match fs::read(&path) {
            Ok(content) => {
                let actual = compute_hash(&content);
                if actual != hash {
                    corrupt.insert(hash);
                    report.corrupt_objects.push(CorruptObject {
                        hash,
                        message: format!("hash mismatch: expected {}, got {}", hash, actual),
                    });
                }
            }
            Err(e) => {
                return Err(Error::Io { path, source: e });
            }
        }
    }

    // walk everything reachable from a branch tip
    for branch in list_branches(repo)? {
        let tip = match read_branch(repo, &branch) {
            Ok(tip) => tip,
            Err(e @ (Error::InvalidHashHex(_) | Error::InvalidBranchName(_))) => {
                tracing::warn!(branch = %branch, error = %e, "unreadable branch ref");
                report.corrupt_refs.push(CorruptRef {
                    branch,
                    message: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(tip) = tip {
            check_history(
                repo,
                tip,
                &format!("branch {}", branch),
                &corrupt,
                &mut visited_commits,
                &mut reachable,
                &mut report,
            )?;
        }
    }

    // staged blobs are live too
    for entry in Index::load(repo)?.entries() {
        reachable.insert(entry.hash);
        if !object_exists(repo, &entry.hash) {
            report.missing_objects.push(MissingObject {
                hash: entry.hash,
                object_type: ObjectType::Blob,
                referenced_by: format!("index entry {}", entry.path),
            });
        }
    }

    for hash in list_objects(repo)? {
        if !reachable.contains(&hash) {
            report.dangling_objects.push(hash);
        }
    }

    Ok(report)
}

fn check_history(
    repo: &Repo,
    start: Hash,
    referenced_by: &str,
    corrupt: &HashSet<Hash>,
    visited_commits: &mut HashSet<Hash>,
    reachable: &mut HashSet<Hash>,
    report: &mut FsckReport,
) -> Result<()> {
    let mut to_visit = vec![(start, referenced_by.to_string())];

    while let Some((hash, referenced_by)) = to_visit.pop() {
        if !visited_commits.insert(hash) {
            continue;
        }
        reachable.insert(hash);

        let commit = match read_commit(repo, &hash) {
            Ok(commit) => commit,
            Err(Error::ObjectNotFound(_)) => {
                report.missing_objects.push(MissingObject {
                    hash,
                    object_type: ObjectType::Commit,
                    referenced_by,
                });
                continue;
            }
            // already reported by the re-hash pass
            Err(Error::CorruptObject(_)) => continue,
            Err(Error::CborDecode(e)) => {
                if !corrupt.contains(&hash) {
                    report.corrupt_objects.push(CorruptObject {
                        hash,
                        message: format!("not a valid commit ({}), referenced by {}", e, referenced_by),
                    });
                }
                continue;
            }
            Err(e) => return Err(e),
        };

        for entry in &commit.files {
            if reachable.insert(entry.hash) && !object_exists(repo, &entry.hash) {
                report.missing_objects.push(MissingObject {
                    hash: entry.hash,
                    object_type: ObjectType::Blob,
                    referenced_by: format!("commit {} file {}", hash, entry.path),
                });
            }
        }

        for parent in commit.parents() {
            to_visit.push((*parent, format!("commit {}", hash)));
        }
    }

    Ok(())
}
