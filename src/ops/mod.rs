//! high-level operations on sprig repositories

mod add;
mod branch;
mod clone;
mod commit;
mod diff;
mod fsck;
mod log;
mod merge;
mod status;

pub use add::add;
pub use branch::{branches, create_branch, switch_branch, BranchInfo};
pub use clone::{clone_repo, CloneStats};
pub use commit::{commit, create_commit};
pub use diff::{diff_blobs, diff_lines, split_lines};
pub use fsck::{fsck, CorruptObject, CorruptRef, FsckReport, MissingObject, ObjectType};
pub use log::{log, walk_history, History, LogEntry};
pub use merge::{merge, merge_branches, union_files};
pub use status::{status, Status};
