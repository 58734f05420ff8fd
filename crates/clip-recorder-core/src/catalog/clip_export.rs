use crate::{ClipRecord, FinishedClip};

/// MIME type of exported clips.
pub const EXPORT_MIME_TYPE: &str = "video/webm";

/// A clip packaged for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipExport {
    /// Suggested file name, derived from the clip's id and name.
    pub file_name: String,
    /// MIME type of `data`.
    pub mime_type: &'static str,
    /// Clip bytes, exactly as stored.
    pub data: Vec<u8>,
}

impl ClipExport {
    /// Export a stored clip as `recorded_<id>_<name>.webm`.
    pub fn from_record(record: &ClipRecord) -> Self {
        Self {
            file_name: format!("recorded_{}_{}.webm", record.id, sanitize(&record.name)),
            mime_type: EXPORT_MIME_TYPE,
            data: record.data.clone(),
        }
    }

    /// Export a clip that never reached storage as
    /// `recorded_unsaved_<name>.webm`.
    pub fn unsaved(clip: FinishedClip) -> Self {
        Self {
            file_name: format!("recorded_unsaved_{}.webm", sanitize(&clip.name)),
            mime_type: EXPORT_MIME_TYPE,
            data: clip.data,
        }
    }
}

/// Keep names usable as a single path component on every platform.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "clip".to_string()
    } else {
        cleaned
    }
}
