use crate::files::FileRecord;
use std::path::PathBuf;

/// The outcome of an indexing run: the file records produced (found or newly
/// inserted) and the paths that were recognized but could not be indexed.
///
/// Indexing never aborts a batch for a single bad file; skipped paths are
/// recorded here so the caller can see what was left out.
#[allow(missing_docs)]
#[derive(Debug, Default, PartialEq)]
pub struct IndexReport {
    pub files: Vec<FileRecord>,
    pub skipped: Vec<PathBuf>,
}

impl IndexReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: IndexReport) {
        self.files.extend(other.files);
        self.skipped.extend(other.skipped);
    }

    /// True if the run produced no file records and skipped nothing.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.skipped.is_empty()
    }
}
