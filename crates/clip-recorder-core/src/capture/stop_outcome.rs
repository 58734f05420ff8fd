use crate::ClipError;

/// Result of [`CaptureSession::stop`](crate::CaptureSession::stop).
///
/// Storage failures are reported here rather than as an `Err`: stopping
/// always ends the recording, and the captured bytes stay retained in the
/// session for a manual retry or direct export.
#[derive(Debug)]
pub enum StopOutcome {
    /// The session was not recording or paused; nothing happened.
    NotRecording,
    /// Recording ended with no data; nothing was stored.
    Empty,
    /// The clip was stored.
    Saved {
        /// Identifier assigned by the store.
        id: i64,
        /// Name the clip was stored under.
        name: String,
        /// Payload size in bytes.
        bytes: usize,
    },
    /// The store rejected the clip.
    SaveFailed {
        /// Name the clip would have been stored under.
        name: String,
        /// Payload size in bytes.
        bytes: usize,
        /// Storage error that caused the failure.
        error: ClipError,
    },
}
