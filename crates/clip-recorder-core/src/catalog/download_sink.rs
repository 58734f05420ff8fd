use crate::{ClipExport, ClipResult};

use std::path::PathBuf;

/// Destination for exported clips (a downloads folder, a browser save
/// dialog).
pub trait DownloadSink {
    /// Hand `export` to the user, returning where it was saved.
    fn deliver(&self, export: &ClipExport) -> ClipResult<PathBuf>;
}
