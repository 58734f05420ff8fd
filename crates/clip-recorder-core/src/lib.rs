//! Clip-recorder Core Library
//!
//! Capture-session state machine, SQLite-backed clip store, and the clip
//! catalog that lists, exports and deletes stored clips.
//!
//! # Example
//!
//! ```no_run
//! use clip_recorder_core::{
//!     CaptureSession, ClipCatalog, ClipResult, ClipStore, PipeSource, StopOutcome,
//!     StoreLocation,
//! };
//!
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ClipResult<()> {
//!     let store = ClipStore::new(StoreLocation::File("clips.sqlite3".into()), "clips")?;
//!     store.open().await?;
//!
//!     let mut source = PipeSource::new("/tmp/camera.webm", 64 * 1024, Duration::from_millis(20));
//!     let mut session = CaptureSession::new();
//!
//!     session.start(&mut source)?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     session.ingest_pending();
//!
//!     if let StopOutcome::Saved { id, .. } = session.stop(&store).await {
//!         let mut catalog = ClipCatalog::new();
//!         catalog.refresh(&store).await?;
//!         println!("Saved clip {id}, {} clips stored", catalog.len());
//!     }
//!     Ok(())
//! }
//! ```

mod capture;
mod catalog;
mod error;
mod storage;

pub use {
    capture::{
        CaptureSession, FinishedClip, FragmentSender, LiveSource, LiveStream, PipeSource,
        PipeStream, SessionState, StopOutcome,
    },
    catalog::{ClipCatalog, ClipExport, DownloadSink, EXPORT_MIME_TYPE},
    error::ClipError,
    error::Result as ClipResult,
    storage::{ClipRecord, ClipStorage, ClipStore, ClipSummary, StoreLocation},
};
