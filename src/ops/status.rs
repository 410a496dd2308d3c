use crate::error::Result;
use crate::hash::Hash;
use crate::index::Index;
use crate::refs::{read_branch, read_head};
use crate::repo::Repo;
use crate::types::StagingEntry;

/// current branch and staged entries
#[derive(Debug, Clone)]
pub struct Status {
    pub branch: String,
    pub tip: Option<Hash>,
    pub staged: Vec<StagingEntry>,
}

pub fn status(repo: &Repo) -> Result<Status> {
    let branch = read_head(repo)?;
    let tip = read_branch(repo, &branch)?;
    let staged = Index::load(repo)?.entries().to_vec();

    Ok(Status {
        branch,
        tip,
        staged,
    })
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tip {
            Some(tip) => writeln!(f, "On branch {} at {}", self.branch, tip.short())?,
            None => writeln!(f, "On branch {} (no commits yet)", self.branch)?,
        }

        if self.staged.is_empty() {
            writeln!(f, "nothing staged")?;
        } else {
            writeln!(f, "staged:")?;
            for entry in &self.staged {
                writeln!(f, "  {}", entry)?;
            }
        }

        Ok(())
    }
}
