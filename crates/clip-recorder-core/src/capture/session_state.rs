use std::time::Instant;

use uuid::Uuid;

/// Lifecycle state of a [`CaptureSession`](crate::CaptureSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No recording in progress.
    Idle,
    /// Fragments are being captured.
    Recording {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
    /// Capture is suspended; accumulated fragments are kept.
    Paused {
        /// When recording started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl SessionState {
    /// Whether a recording pass is in progress (recording or paused).
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }

    /// Session ID of the active pass, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            SessionState::Idle => None,
            SessionState::Recording { session_id, .. } | SessionState::Paused { session_id, .. } => {
                Some(*session_id)
            }
        }
    }
}
