mod finished_clip;
mod live_source;
mod pipe;
mod session;
mod session_state;
mod stop_outcome;

pub use {
    finished_clip::FinishedClip,
    live_source::{FragmentSender, LiveSource, LiveStream},
    pipe::{PipeSource, PipeStream},
    session::CaptureSession,
    session_state::SessionState,
    stop_outcome::StopOutcome,
};

pub(crate) use live_source::FragmentReceiver;
