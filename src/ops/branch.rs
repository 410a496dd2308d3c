use crate::error::Result;
use crate::hash::Hash;
use crate::refs::{self, head_tip};
use crate::repo::Repo;

/// create a branch at the current HEAD commit
///
/// returns the commit the new branch points at (`None` when the current
/// branch has no commits yet). HEAD does not move.
pub fn create_branch(repo: &Repo, name: &str) -> Result<Option<Hash>> {
    let _lock = repo.lock()?;

    let tip = head_tip(repo)?;
    refs::create_branch(repo, name, tip.as_ref())?;

    tracing::info!(branch = name, tip = ?tip, "created branch");
    Ok(tip)
}

/// make `name` the active branch
///
/// only HEAD changes; worktree files are left as they are.
pub fn switch_branch(repo: &Repo, name: &str) -> Result<()> {
    let _lock = repo.lock()?;

    refs::write_head(repo, name)?;

    tracing::info!(branch = name, "switched branch");
    Ok(())
}

/// branch listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub tip: Option<Hash>,
    pub current: bool,
}

impl std::fmt::Display for BranchInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = if self.current { '*' } else { ' ' };
        match &self.tip {
            Some(tip) => write!(f, "{} {} {}", marker, self.name, tip.short()),
            None => write!(f, "{} {} (no commits)", marker, self.name),
        }
    }
}

/// list all branches with their tips
pub fn branches(repo: &Repo) -> Result<Vec<BranchInfo>> {
    let head = refs::read_head(repo)?;

    refs::list_branches(repo)?
        .into_iter()
        .map(|name| {
            let tip = refs::read_branch(repo, &name)?;
            Ok(BranchInfo {
                current: name == head,
                name,
                tip,
            })
        })
        .collect()
}
