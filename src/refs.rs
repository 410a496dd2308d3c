use std::fs;
use std::path::PathBuf;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::repo::Repo;

/// write a branch tip (create or update)
///
/// `None` records a branch that has no commits yet (empty ref file).
pub fn write_branch(repo: &Repo, name: &str, tip: Option<&Hash>) -> Result<()> {
    validate_branch_name(name)?;

    let path = branch_path(repo, name);

    // ensure parent directories exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let content = match tip {
        Some(hash) => format!("{}\n", hash.to_hex()),
        None => String::new(),
    };
    repo.write_atomic(&path, content.as_bytes())?;

    tracing::debug!(branch = name, tip = ?tip, "updated branch ref");
    Ok(())
}

/// read a branch tip; `None` means the branch exists but has no commits
pub fn read_branch(repo: &Repo, name: &str) -> Result<Option<Hash>> {
    validate_branch_name(name)?;
    let path = branch_path(repo, name);

    let content = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::UnknownBranch(name.to_string())
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;

    let hex = content.trim();
    if hex.is_empty() {
        return Ok(None);
    }
    Hash::from_hex(hex).map(Some)
}

/// check if a branch exists
pub fn branch_exists(repo: &Repo, name: &str) -> bool {
    validate_branch_name(name).is_ok() && branch_path(repo, name).is_file()
}

/// create a new branch pointing at `at`
///
/// fails with `BranchExists` rather than overwriting an existing branch.
pub fn create_branch(repo: &Repo, name: &str, at: Option<&Hash>) -> Result<()> {
    validate_branch_name(name)?;

    let path = branch_path(repo, name);
    if path.is_file() {
        return Err(Error::BranchExists(name.to_string()));
    }
    if path.exists() {
        return Err(Error::InvalidBranchName(format!(
            "branch name is a prefix of existing branches: {}",
            name
        )));
    }

    // `a/b` cannot be created while a branch `a` exists
    let base = repo.branches_path();
    let mut prefix = base.clone();
    for component in name.split('/').take(name.split('/').count() - 1) {
        prefix.push(component);
        if prefix.is_file() {
            return Err(Error::InvalidBranchName(format!(
                "branch {} exists, cannot create {}",
                prefix.strip_prefix(&base).unwrap_or(&prefix).display(),
                name
            )));
        }
    }

    write_branch(repo, name, at)
}

/// list all branches
pub fn list_branches(repo: &Repo) -> Result<Vec<String>> {
    let dir = repo.branches_path();
    let mut branches = Vec::new();

    if dir.exists() {
        collect_branches(&dir, &dir, &mut branches)?;
    }

    branches.sort();
    Ok(branches)
}

/// read the name of the active branch
pub fn read_head(repo: &Repo) -> Result<String> {
    let path = repo.head_path();
    let content = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::NoRepo(repo.root().to_path_buf())
        } else {
            Error::Io {
                path: path.clone(),
                source: e,
            }
        }
    })?;
    let name = content.strip_suffix('\n').unwrap_or(&content);
    Ok(name.to_string())
}

/// point HEAD at an existing branch
pub fn write_head(repo: &Repo, name: &str) -> Result<()> {
    if !branch_exists(repo, name) {
        return Err(Error::UnknownBranch(name.to_string()));
    }
    repo.write_atomic(&repo.head_path(), format!("{}\n", name).as_bytes())?;
    tracing::debug!(branch = name, "updated HEAD");
    Ok(())
}

/// tip commit of the active branch
pub fn head_tip(repo: &Repo) -> Result<Option<Hash>> {
    let branch = read_head(repo)?;
    read_branch(repo, &branch)
}

/// get filesystem path for a branch
fn branch_path(repo: &Repo, name: &str) -> PathBuf {
    repo.branches_path().join(name)
}

/// recursively collect branches from directory
fn collect_branches(base: &PathBuf, dir: &PathBuf, branches: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();

        if path.is_dir() {
            collect_branches(base, &path, branches)?;
        } else if path.is_file() {
            if let Ok(rel) = path.strip_prefix(base) {
                branches.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    Ok(())
}

/// validate branch name
pub(crate) fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidBranchName("empty branch name".to_string()));
    }

    if name.starts_with('/') || name.ends_with('/') {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot start or end with '/': {}",
            name
        )));
    }

    if name.contains("//") {
        return Err(Error::InvalidBranchName(format!(
            "branch name cannot contain '//': {}",
            name
        )));
    }

    if name.trim() != name {
        return Err(Error::InvalidBranchName(format!(
            "branch name has leading or trailing whitespace: {:?}",
            name
        )));
    }

    if name.chars().any(|c| c.is_control()) || name.contains('\\') {
        return Err(Error::InvalidBranchName(format!(
            "branch name contains a forbidden character: {:?}",
            name
        )));
    }

    // check for path traversal
    for component in name.split('/') {
        if component == "." || component == ".." {
            return Err(Error::InvalidBranchName(format!(
                "branch name cannot contain '.' or '..': {}",
                name
            )));
        }
    }

    Ok(())
}
