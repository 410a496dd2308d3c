use std::collections::HashMap;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::read_commit;
use crate::refs::head_tip;
use crate::repo::Repo;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// iterator over the ancestry of a commit
///
/// yields every reachable commit exactly once, each before all of its
/// parents. traversal is depth-first: from a merge commit the first parent's
/// line is followed before the second's, and a commit reachable along several
/// paths is emitted once the last of its children has been emitted.
///
/// the reachable graph is read on the first call to `next`; a read failure
/// is yielded once and ends the iteration.
pub struct History<'a> {
    repo: &'a Repo,
    start: Option<Hash>,
    walk: Option<Walk>,
    done: bool,
}

struct Walk {
    commits: HashMap<Hash, Commit>,
    /// children of each commit not yet yielded
    pending: HashMap<Hash, usize>,
    stack: Vec<Hash>,
}

/// walk history starting at `start`
pub fn walk_history(repo: &Repo, start: Hash) -> History<'_> {
    History {
        repo,
        start: Some(start),
        walk: None,
        done: false,
    }
}

impl History<'_> {
    fn discover(&self, start: Hash) -> Result<Walk> {
        let mut commits = HashMap::new();
        let mut pending = HashMap::new();
        let mut to_visit = vec![start];
        pending.insert(start, 0);

        while let Some(hash) = to_visit.pop() {
            if commits.contains_key(&hash) {
                continue;
            }

            let commit = read_commit(self.repo, &hash)?;
            for parent in commit.parents() {
                *pending.entry(*parent).or_insert(0) += 1;
                if !commits.contains_key(parent) {
                    to_visit.push(*parent);
                }
            }
            commits.insert(hash, commit);
        }

        Ok(Walk {
            commits,
            pending,
            stack: vec![start],
        })
    }
}

impl Iterator for History<'_> {
    type Item = Result<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(start) = self.start.take() {
            match self.discover(start) {
                Ok(walk) => self.walk = Some(walk),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }

        let walk = self.walk.as_mut()?;
        let hash = walk.stack.pop()?;
        let commit = walk.commits.remove(&hash)?;

        // push in reverse so the first parent is explored first
        for parent in commit.parents().iter().rev() {
            if let Some(count) = walk.pending.get_mut(parent) {
                *count -= 1;
                if *count == 0 {
                    walk.stack.push(*parent);
                }
            }
        }

        Some(Ok(LogEntry { hash, commit }))
    }
}

/// get commit history of the current branch, newest first
pub fn log(repo: &Repo, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    let Some(tip) = head_tip(repo)? else {
        return Ok(Vec::new());
    };

    walk_history(repo, tip)
        .take(max_count.unwrap_or(usize::MAX))
        .collect()
}

/// format a log entry for display
impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "commit {}", self.hash)?;

        if self.commit.is_merge() {
            let parents: Vec<String> = self.commit.parents().iter().map(Hash::short).collect();
            writeln!(f, "Merge: {}", parents.join(" "))?;
        }

        match chrono::DateTime::from_timestamp(self.commit.timestamp, 0) {
            Some(dt) => writeln!(f, "Date:   {}", dt.format("%Y-%m-%d %H:%M:%S UTC"))?,
            None => writeln!(f, "Date:   @{}", self.commit.timestamp)?,
        }

        writeln!(f)?;
        for line in self.commit.message.lines() {
            writeln!(f, "    {}", line)?;
        }

        Ok(())
    }
}
