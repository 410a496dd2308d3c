//! union merge of two branch tips
//!
//! the merge commit takes every file of the current branch's tip and adds
//! the target tip's files whose paths are not already present. there is no
//! common-ancestor search, no fast-forward and no content-level conflict
//! handling: on a shared path the current branch's version is kept as is.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_commit;
use crate::ops::commit::create_commit;
use crate::refs::{read_branch, read_head, write_branch};
use crate::repo::Repo;
use crate::types::{Parent, StagingEntry};

/// merge `target` into the current branch
pub fn merge(repo: &Repo, target: &str) -> Result<Hash> {
    let _lock = repo.lock()?;

    let current = read_head(repo)?;
    merge_locked(repo, &current, target)
}

/// merge `target` into `current`, advancing only `current`
pub fn merge_branches(repo: &Repo, current: &str, target: &str) -> Result<Hash> {
    let _lock = repo.lock()?;
    merge_locked(repo, current, target)
}

fn merge_locked(repo: &Repo, current: &str, target: &str) -> Result<Hash> {
    let current_tip = read_branch(repo, current)?;
    let target_tip = read_branch(repo, target)?;

    let current_tip = current_tip.ok_or_else(|| Error::NothingToMerge(current.to_string()))?;
    let target_tip = target_tip.ok_or_else(|| Error::NothingToMerge(target.to_string()))?;

    let ours = read_commit(repo, &current_tip)?;
    let theirs = read_commit(repo, &target_tip)?;

    let files = union_files(&ours.files, &theirs.files);
    let message = format!("Merge branch '{}' into {}", target, current);

    let merge_hash = create_commit(
        repo,
        Some(Parent::Merge([current_tip, target_tip])),
        &message,
        files,
    )?;

    write_branch(repo, current, Some(&merge_hash))?;

    tracing::info!(
        into = current,
        from = target,
        commit = %merge_hash.short(),
        "merged branch"
    );

    Ok(merge_hash)
}

/// `ours` verbatim, then each entry of `theirs` whose path is not yet present
pub fn union_files(ours: &[StagingEntry], theirs: &[StagingEntry]) -> Vec<StagingEntry> {
    let mut seen: HashSet<&str> = ours.iter().map(|e| e.path.as_str()).collect();
    let mut merged = ours.to_vec();

    for entry in theirs {
        if seen.insert(entry.path.as_str()) {
            merged.push(entry.clone());
        }
    }

    merged
}
