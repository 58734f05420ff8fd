use crate::ClipResult;

use tokio::sync::mpsc;

/// Sending half handed to a live stream for fragment delivery.
///
/// Unbounded so a stream is never blocked by the session; fragments are
/// delivered in the order they are sent.
pub type FragmentSender = mpsc::UnboundedSender<Vec<u8>>;

pub(crate) type FragmentReceiver = mpsc::UnboundedReceiver<Vec<u8>>;

/// Host-provided source of live capture streams.
pub trait LiveSource {
    /// Stream type produced by this source.
    type Stream: LiveStream;

    /// Acquire a live stream, or `None` if none is available (device
    /// missing, permission not yet granted).
    fn acquire(&mut self) -> Option<Self::Stream>;
}

/// A live stream attached to a capture mechanism.
///
/// Implementations send each emitted fragment through the sender given to
/// [`LiveStream::start`], in emission order.
pub trait LiveStream: Send {
    /// Begin emitting fragments into `fragments`.
    fn start(&mut self, fragments: FragmentSender) -> ClipResult<()>;

    /// Suspend emission.
    fn pause(&mut self) -> ClipResult<()>;

    /// Continue emission after [`LiveStream::pause`].
    fn resume(&mut self) -> ClipResult<()>;

    /// Stop emission. Every fragment produced before this returns must
    /// already have been sent.
    fn stop(&mut self) -> ClipResult<()>;
}
