//! Writes exported clips into the download directory.

use clip_recorder_core::{ClipError, ClipExport, ClipResult, DownloadSink};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{info, instrument};

/// Download sink backed by a local directory.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into `dir`. The directory is created on the
    /// first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory exports are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    /// Write the export using the atomic write pattern, so a partially
    /// written clip never appears under its final name.
    #[track_caller]
    #[instrument(skip(self, export), fields(file_name = %export.file_name))]
    fn deliver(&self, export: &ClipExport) -> ClipResult<PathBuf> {
        let export_failed = |what: &str, e: std::io::Error| ClipError::ExportFailed {
            reason: format!("{}: {}", what, e),
            location: ErrorLocation::from(Location::caller()),
        };

        fs::create_dir_all(&self.dir)
            .map_err(|e| export_failed("Failed to create download directory", e))?;

        let final_path = self.dir.join(&export.file_name);
        let temp_path = self.dir.join(format!(".{}.part", export.file_name));

        let mut temp_file = fs::File::create(&temp_path)
            .map_err(|e| export_failed("Failed to create temp export file", e))?;

        temp_file
            .write_all(&export.data)
            .map_err(|e| export_failed("Failed to write export", e))?;

        temp_file
            .sync_all()
            .map_err(|e| export_failed("Failed to sync export", e))?;

        fs::rename(&temp_path, &final_path)
            .map_err(|e| export_failed("Failed to move export into place", e))?;

        info!(
            path = ?final_path,
            bytes = export.data.len(),
            mime_type = export.mime_type,
            "Clip delivered"
        );

        Ok(final_path)
    }
}
