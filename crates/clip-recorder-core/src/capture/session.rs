use crate::{
    ClipError, ClipResult, ClipStorage, FinishedClip, LiveSource, LiveStream, SessionState,
    StopOutcome, capture::FragmentReceiver,
};

use std::{panic::Location, time::Instant};

use chrono::Utc;
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Drives one recording pass at a time, from stream acquisition to a
/// finished clip handed to storage.
///
/// ```text
/// Idle --start--> Recording --pause--> Paused --resume--> Recording
/// Recording|Paused --stop--> Idle   (stores the clip if any data arrived)
/// ```
///
/// Fragments travel from the live stream to the session over a channel that
/// is created on every `start`, so fragments from an earlier stream can never
/// leak into a later recording. Calls that are invalid for the current state
/// are no-ops.
///
/// After `stop`, the captured fragments stay in memory until the next
/// successful `start`, so a clip whose insert failed can still be retried or
/// exported.
pub struct CaptureSession<S: LiveStream> {
    state: SessionState,
    stream: Option<S>,
    fragments: Option<FragmentReceiver>,
    chunks: Vec<Vec<u8>>,
    last_name: Option<String>,
    saved_as: Option<i64>,
    last_stamp: i64,
}

impl<S: LiveStream> Default for CaptureSession<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LiveStream> CaptureSession<S> {
    /// Create an idle session.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            stream: None,
            fragments: None,
            chunks: Vec::new(),
            last_name: None,
            saved_as: None,
            last_stamp: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of fragments accumulated since the last start.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total size of the accumulated fragments.
    pub fn buffered_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Start a new recording pass.
    ///
    /// Acquires a stream from `source`, discards fragments retained from the
    /// previous pass and begins capturing. Does nothing if a pass is already
    /// in progress.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::StreamUnavailable`] if `source` has no stream, or
    /// the stream's own error if it fails to start. In both cases the session
    /// stays idle and any retained clip is kept.
    #[track_caller]
    #[instrument(skip(self, source))]
    pub fn start<L>(&mut self, source: &mut L) -> ClipResult<()>
    where
        L: LiveSource<Stream = S>,
    {
        if self.state.is_active() {
            debug!(state = ?self.state, "Start ignored, recording already in progress");
            return Ok(());
        }

        let mut stream = source.acquire().ok_or(ClipError::StreamUnavailable {
            location: ErrorLocation::from(Location::caller()),
        })?;

        let (fragment_tx, fragment_rx) = mpsc::unbounded_channel();
        stream.start(fragment_tx)?;

        self.chunks.clear();
        self.last_name = None;
        self.saved_as = None;

        let session_id = Uuid::new_v4();
        self.stream = Some(stream);
        self.fragments = Some(fragment_rx);
        self.state = SessionState::Recording {
            started_at: Instant::now(),
            session_id,
        };

        info!(session_id = %session_id, "Recording started");

        Ok(())
    }

    /// Suspend capture. Returns `false` if the session was not recording.
    ///
    /// # Errors
    ///
    /// Returns the stream's error if it cannot pause; the state is unchanged.
    #[instrument(skip(self))]
    pub fn pause(&mut self) -> ClipResult<bool> {
        let SessionState::Recording {
            started_at,
            session_id,
        } = self.state
        else {
            debug!(state = ?self.state, "Pause ignored");
            return Ok(false);
        };

        if let Some(stream) = self.stream.as_mut() {
            stream.pause()?;
        }

        self.state = SessionState::Paused {
            started_at,
            session_id,
        };

        info!(session_id = %session_id, "Recording paused");

        Ok(true)
    }

    /// Continue capture after a pause. Returns `false` if the session was
    /// not paused.
    ///
    /// # Errors
    ///
    /// Returns the stream's error if it cannot resume; the state is unchanged.
    #[instrument(skip(self))]
    pub fn resume(&mut self) -> ClipResult<bool> {
        let SessionState::Paused {
            started_at,
            session_id,
        } = self.state
        else {
            debug!(state = ?self.state, "Resume ignored");
            return Ok(false);
        };

        if let Some(stream) = self.stream.as_mut() {
            stream.resume()?;
        }

        self.state = SessionState::Recording {
            started_at,
            session_id,
        };

        info!(session_id = %session_id, "Recording resumed");

        Ok(true)
    }

    /// Append one fragment delivered outside the session's own channel.
    ///
    /// Zero-size fragments, and fragments arriving while idle, are dropped.
    pub fn accept(&mut self, fragment: Vec<u8>) {
        if !self.state.is_active() {
            debug!(bytes = fragment.len(), "Fragment dropped, session idle");
            return;
        }

        push_fragment(&mut self.chunks, fragment);
    }

    /// Wait for the next fragment from the active stream.
    ///
    /// Pends forever while idle and returns `None` once the active stream has
    /// hung up. Cancel-safe, so it can be raced in `tokio::select!`; pass the
    /// result to [`CaptureSession::accept`].
    pub async fn next_fragment(&mut self) -> Option<Vec<u8>> {
        match self.fragments.as_mut() {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    /// Move every fragment already queued by the stream into the buffer.
    /// Returns how many non-empty fragments were appended.
    pub fn ingest_pending(&mut self) -> usize {
        let Some(rx) = self.fragments.as_mut() else {
            return 0;
        };

        let mut appended = 0;
        while let Ok(fragment) = rx.try_recv() {
            if push_fragment(&mut self.chunks, fragment) {
                appended += 1;
            }
        }

        appended
    }

    /// End the recording pass and store the clip.
    ///
    /// Stops the stream, collects every fragment it already emitted and
    /// returns to idle. If any data arrived, the fragments are concatenated in
    /// emission order and inserted into `store` under a timestamp name. A
    /// storage failure never loses the recording: the fragments stay retained
    /// (see [`CaptureSession::last_clip`] and [`CaptureSession::retry_save`]).
    #[instrument(skip(self, store))]
    pub async fn stop<C: ClipStorage>(&mut self, store: &C) -> StopOutcome {
        let (started_at, session_id) = match self.state {
            SessionState::Recording {
                started_at,
                session_id,
            }
            | SessionState::Paused {
                started_at,
                session_id,
            } => (started_at, session_id),
            SessionState::Idle => {
                debug!("Stop ignored, not recording");
                return StopOutcome::NotRecording;
            }
        };

        if let Some(mut stream) = self.stream.take() {
            // Capture must end even if the device misbehaves.
            if let Err(e) = stream.stop() {
                error!(session_id = %session_id, error = ?e, "Live stream did not stop cleanly");
            }
        }

        self.ingest_pending();
        self.fragments = None;
        self.state = SessionState::Idle;

        let duration = started_at.elapsed();

        if self.chunks.is_empty() {
            info!(
                session_id = %session_id,
                duration_ms = duration.as_millis(),
                "Recording stopped with no data"
            );
            return StopOutcome::Empty;
        }

        let name = self.next_clip_name();
        self.last_name = Some(name.clone());

        let data = self.chunks.concat();
        let bytes = data.len();

        info!(
            session_id = %session_id,
            duration_ms = duration.as_millis(),
            fragment_count = self.chunks.len(),
            bytes,
            "Recording stopped"
        );

        match store.insert(name.clone(), data).await {
            Ok(id) => {
                self.saved_as = Some(id);
                StopOutcome::Saved { id, name, bytes }
            }
            Err(error) => {
                warn!(
                    session_id = %session_id,
                    error = ?error,
                    "Clip could not be stored, retained for retry"
                );
                StopOutcome::SaveFailed { name, bytes, error }
            }
        }
    }

    /// The clip finalized by the last stop, assembled from the retained
    /// fragments. `None` while recording or if the last stop had no data.
    pub fn last_clip(&self) -> Option<FinishedClip> {
        if self.state.is_active() {
            return None;
        }

        let name = self.last_name.clone()?;

        Some(FinishedClip {
            name,
            data: self.chunks.concat(),
        })
    }

    /// Identifier the last clip was stored under, if it was stored.
    pub fn saved_id(&self) -> Option<i64> {
        self.saved_as
    }

    /// Insert the retained clip once more.
    ///
    /// If the clip was already stored, returns its identifier without
    /// inserting a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`ClipError::NoRetainedClip`] if there is nothing to save, or
    /// the storage error if the insert fails again.
    #[instrument(skip(self, store))]
    pub async fn retry_save<C: ClipStorage>(&mut self, store: &C) -> ClipResult<i64> {
        if let Some(id) = self.saved_as {
            debug!(clip_id = id, "Retained clip already stored");
            return Ok(id);
        }

        let clip = self.last_clip().ok_or(ClipError::NoRetainedClip {
            location: ErrorLocation::from(Location::caller()),
        })?;

        let id = store.insert(clip.name, clip.data).await?;
        self.saved_as = Some(id);

        info!(clip_id = id, "Retained clip stored on retry");

        Ok(id)
    }

    fn next_clip_name(&mut self) -> String {
        // Strictly increasing even if two stops land in the same millisecond.
        let stamp = Utc::now().timestamp_millis().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        stamp.to_string()
    }
}

fn push_fragment(chunks: &mut Vec<Vec<u8>>, fragment: Vec<u8>) -> bool {
    if fragment.is_empty() {
        return false;
    }

    chunks.push(fragment);
    true
}
