use error_location::ErrorLocation;
use thiserror::Error;

/// Capture and storage errors with source location tracking.
#[derive(Error, Debug)]
pub enum ClipError {
    /// The clip store could not be opened, or has not been opened yet.
    #[error("Clip store unavailable: {reason} {location}")]
    StorageUnavailable {
        /// Description of why the store is unusable.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An insert or delete transaction failed.
    #[error("Clip store write failed: {reason} {location}")]
    WriteFailed {
        /// Description of the failed write.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Listing the clip store failed.
    #[error("Clip store read failed: {reason} {location}")]
    ReadFailed {
        /// Description of the failed read.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The referenced clip is not present.
    #[error("Clip {id} not found {location}")]
    NotFound {
        /// Identifier that was looked up.
        id: i64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No live stream could be acquired when starting a recording.
    #[error("No live stream available {location}")]
    StreamUnavailable {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No finished clip is retained for a retry or direct export.
    #[error("No retained clip {location}")]
    NoRetainedClip {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Live stream operation failed.
    #[error("Capture device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An export could not be delivered to the user.
    #[error("Export failed: {reason} {location}")]
    ExportFailed {
        /// Description of the delivery failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Record store name is not a plain SQL identifier.
    #[error("Invalid store name {name:?} {location}")]
    InvalidStoreName {
        /// The rejected name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`ClipError`].
pub type Result<T> = std::result::Result<T, ClipError>;
