use crate::{ClipError, ClipResult, FragmentSender, LiveSource, LiveStream};

use std::{
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Read},
    panic::Location,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// Live source backed by a file, FIFO or device node that yields encoded
/// media bytes (for example a camera piped through an encoder).
///
/// A stream is available whenever the path exists. Regular files are read to
/// their end. A FIFO is followed until `stop`: its end of file only means no
/// writer is connected right now.
#[derive(Debug, Clone)]
pub struct PipeSource {
    path: PathBuf,
    fragment_bytes: usize,
    poll_interval: Duration,
}

impl PipeSource {
    /// Create a source reading `path` in fragments of at most
    /// `fragment_bytes`, checking for pause/stop every `poll_interval`.
    pub fn new(path: impl Into<PathBuf>, fragment_bytes: usize, poll_interval: Duration) -> Self {
        Self {
            path: path.into(),
            fragment_bytes: fragment_bytes.max(1),
            poll_interval,
        }
    }
}

impl LiveSource for PipeSource {
    type Stream = PipeStream;

    #[instrument(skip(self), fields(path = ?self.path))]
    fn acquire(&mut self) -> Option<PipeStream> {
        if !self.path.exists() {
            warn!("Live source not present");
            return None;
        }

        Some(PipeStream {
            path: self.path.clone(),
            fragment_bytes: self.fragment_bytes,
            poll_interval: self.poll_interval,
            worker: None,
            paused: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Stream reading a [`PipeSource`] path on a dedicated thread.
///
/// The source is opened non-blocking, so the reader never parks in `open` or
/// `read` and `stop` always joins it within one poll interval. Once `stop`
/// returns the source is closed and a later stream is its only reader.
pub struct PipeStream {
    path: PathBuf,
    fragment_bytes: usize,
    poll_interval: Duration,
    worker: Option<JoinHandle<()>>,
    paused: Arc<AtomicBool>,
    /// Checked before every read.
    shutdown: Arc<AtomicBool>,
}

impl LiveStream for PipeStream {
    #[track_caller]
    #[instrument(skip(self, fragments), fields(path = ?self.path))]
    fn start(&mut self, fragments: FragmentSender) -> ClipResult<()> {
        let file = open_source(&self.path).map_err(|e| ClipError::DeviceError {
            reason: format!("Failed to open live source {:?}: {}", self.path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let follow = is_fifo(&file);

        self.shutdown.store(false, Ordering::Release);
        self.paused.store(false, Ordering::Release);

        let reader = FragmentReader {
            file,
            follow,
            buf: vec![0u8; self.fragment_bytes],
            poll_interval: self.poll_interval,
            paused: Arc::clone(&self.paused),
            shutdown: Arc::clone(&self.shutdown),
        };
        let path = self.path.clone();

        let worker = std::thread::Builder::new()
            .name("clip-pipe-reader".to_string())
            .spawn(move || reader.run(&path, &fragments))
            .map_err(|e| ClipError::DeviceError {
                reason: format!("Failed to spawn reader thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.worker = Some(worker);
        info!(follow, "Live stream started");

        Ok(())
    }

    fn pause(&mut self) -> ClipResult<()> {
        self.paused.store(true, Ordering::Release);
        debug!("Live stream paused");
        Ok(())
    }

    fn resume(&mut self) -> ClipResult<()> {
        self.paused.store(false, Ordering::Release);
        debug!("Live stream resumed");
        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    fn stop(&mut self) -> ClipResult<()> {
        self.shutdown.store(true, Ordering::Release);

        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        worker.join().map_err(|_| ClipError::DeviceError {
            reason: "Live source reader panicked".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("Live stream stopped");

        Ok(())
    }
}

impl Drop for PipeStream {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if self
            .worker
            .take()
            .is_some_and(|worker| worker.join().is_err())
        {
            error!(path = ?self.path, "Live source reader panicked");
        }
    }
}

/// Reader loop state, owned by the reader thread.
struct FragmentReader {
    file: File,
    follow: bool,
    buf: Vec<u8>,
    poll_interval: Duration,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl FragmentReader {
    fn run(mut self, path: &Path, fragments: &FragmentSender) {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            if self.paused.load(Ordering::Acquire) {
                std::thread::sleep(self.poll_interval);
                continue;
            }

            match self.file.read(&mut self.buf) {
                // No writer on the FIFO yet, or it went away; wait for the next one.
                Ok(0) if self.follow => std::thread::sleep(self.poll_interval),
                Ok(0) => {
                    debug!(path = ?path, "Live source reached end of stream");
                    break;
                }
                Ok(n) => {
                    if fragments.send(self.buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    std::thread::sleep(self.poll_interval);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    error!(path = ?path, error = %e, "Live source read failed");
                    break;
                }
            }
        }
    }
}

/// Open for reading without blocking on a FIFO that has no writer.
fn open_source(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NONBLOCK);
    }

    options.open(path)
}

#[cfg(unix)]
fn is_fifo(file: &File) -> bool {
    use std::os::unix::fs::FileTypeExt;

    file.metadata()
        .map(|meta| meta.file_type().is_fifo())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_fifo(_file: &File) -> bool {
    false
}
