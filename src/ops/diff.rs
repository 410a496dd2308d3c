use std::collections::HashSet;
use std::ops::{Index, IndexMut};

use crate::error::Result;
use crate::object::{read_blob, resolve_object};
use crate::repo::Repo;
use crate::types::{DiffLine, LineKind};

/// compare two stored blobs line by line
///
/// both revisions may be full hashes or unique prefixes. content is decoded
/// as UTF-8, with invalid sequences replaced.
pub fn diff_blobs(repo: &Repo, rev1: &str, rev2: &str) -> Result<Vec<DiffLine>> {
    let old = read_blob(repo, &resolve_object(repo, rev1)?)?;
    let new = read_blob(repo, &resolve_object(repo, rev2)?)?;

    Ok(diff_lines(&split_lines(&old), &split_lines(&new)))
}

/// split raw content into lines, without terminators
pub fn split_lines(content: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(content)
        .lines()
        .map(str::to_string)
        .collect()
}

/// minimal line diff (Myers, linear space)
///
/// kept lines form a longest common subsequence of the inputs; where the
/// inputs diverge, removed lines are listed before added ones. dropping the
/// added lines from the result gives `old`, dropping the removed lines gives
/// `new`. memory stays linear in the input size.
pub fn diff_lines<S: AsRef<str>>(old: &[S], new: &[S]) -> Vec<DiffLine> {
    let old: Vec<&str> = old.iter().map(AsRef::as_ref).collect();
    let new: Vec<&str> = new.iter().map(AsRef::as_ref).collect();

    let mut result = Vec::with_capacity(old.len().max(new.len()));

    let old_lines: HashSet<&str> = old.iter().copied().collect();
    if !new.iter().any(|line| old_lines.contains(line)) {
        // nothing in common, skip the search
        push_all(&mut result, LineKind::Removed, &old);
        push_all(&mut result, LineKind::Added, &new);
        return result;
    }

    let max_d = max_d(old.len(), new.len());
    let mut vf = V::new(max_d);
    let mut vb = V::new(max_d);
    conquer(&old, &new, &mut vf, &mut vb, &mut result);

    removed_before_added(&mut result);
    result
}

fn push_all(out: &mut Vec<DiffLine>, kind: LineKind, lines: &[&str]) {
    out.extend(lines.iter().map(|line| DiffLine::new(kind, *line)));
}

/// furthest-reaching x per diagonal k, indexed by signed k
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d],
        }
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn max_d(len1: usize, len2: usize) -> usize {
    (len1 + len2 + 1) / 2 + 1
}

fn common_prefix_len(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// split point on a shortest edit path between `old` and `new`
fn find_middle_snake(
    old: &[&str],
    new: &[&str],
    vf: &mut V,
    vb: &mut V,
) -> Option<(usize, usize)> {
    let n = old.len();
    let m = new.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    vf[1] = 0;
    vb[1] = 0;

    for d in 0..max_d(n, m) as isize {
        // forward
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(&old[x..], &new[y..]);
            }
            vf[k] = x;
            if odd && (k - delta).abs() <= d - 1 && vf[k] + vb[-(k - delta)] >= n {
                return Some((x0, y0));
            }
        }

        // backward
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix_len(&old[..n - x], &new[..m - y]);
                x += advance;
                y += advance;
            }
            vb[k] = x;
            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Some((n - x, m - y));
            }
        }
    }

    None
}

fn conquer(old: &[&str], new: &[&str], vf: &mut V, vb: &mut V, out: &mut Vec<DiffLine>) {
    let prefix = common_prefix_len(old, new);
    push_all(out, LineKind::Kept, &old[..prefix]);

    let (old, new) = (&old[prefix..], &new[prefix..]);
    let suffix = common_suffix_len(old, new);
    let (old, new, tail) = (
        &old[..old.len() - suffix],
        &new[..new.len() - suffix],
        &old[old.len() - suffix..],
    );

    if old.is_empty() || new.is_empty() {
        push_all(out, LineKind::Removed, old);
        push_all(out, LineKind::Added, new);
    } else if let Some((x, y)) = find_middle_snake(old, new, vf, vb) {
        conquer(&old[..x], &new[..y], vf, vb, out);
        conquer(&old[x..], &new[y..], vf, vb, out);
    } else {
        push_all(out, LineKind::Removed, old);
        push_all(out, LineKind::Added, new);
    }

    push_all(out, LineKind::Kept, tail);
}

/// within each run of changed lines, list removals first
fn removed_before_added(lines: &mut [DiffLine]) {
    for run in lines.split_mut(|l| l.kind == LineKind::Kept) {
        run.sort_by_key(|l| l.kind != LineKind::Removed);
    }
}
