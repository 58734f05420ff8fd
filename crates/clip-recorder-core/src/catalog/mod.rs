mod clip_catalog;
mod clip_export;
mod download_sink;

pub use {
    clip_catalog::ClipCatalog,
    clip_export::{ClipExport, EXPORT_MIME_TYPE},
    download_sink::DownloadSink,
};
