mod clip_record;
mod clip_storage;
mod clip_store;
mod clip_summary;

pub use {
    clip_record::ClipRecord,
    clip_storage::ClipStorage,
    clip_store::{ClipStore, StoreLocation},
    clip_summary::ClipSummary,
};

#[cfg(test)]
pub(crate) use clip_store::is_valid_store_name;
