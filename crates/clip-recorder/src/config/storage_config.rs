use crate::config::default_store_name;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Clip database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Table holding clip records. Must be a plain identifier.
    #[serde(default = "default_store_name")]
    pub store_name: String,
}
