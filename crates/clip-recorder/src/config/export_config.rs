use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where exported clips are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Download directory; created on first export.
    pub download_dir: PathBuf,
}
