use crate::config::{default_fragment_bytes, default_poll_interval_ms};

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Live source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// FIFO, device node or file yielding encoded video bytes.
    pub source_path: PathBuf,

    /// Maximum size of one captured fragment.
    #[serde(default = "default_fragment_bytes")]
    pub fragment_bytes: usize,

    /// How often a paused reader checks whether to continue.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl CaptureConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
