mod commit;
mod diff;
mod entry;

pub use commit::{Commit, Parent};
pub use diff::{DiffLine, LineKind};
pub use entry::StagingEntry;
