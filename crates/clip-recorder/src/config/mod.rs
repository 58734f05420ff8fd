mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod export_config;
mod storage_config;

pub(crate) use {
    capture_config::CaptureConfig, config::Config, export_config::ExportConfig,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_STORE_NAME: &str = "clips";
pub(crate) const DEFAULT_FRAGMENT_BYTES: usize = 64 * 1024;
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

pub(crate) fn default_store_name() -> String {
    DEFAULT_STORE_NAME.to_string()
}

pub(crate) fn default_fragment_bytes() -> usize {
    DEFAULT_FRAGMENT_BYTES
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
