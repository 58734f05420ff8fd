use crate::{AppCommand, AppResult, DirectorySink};

use std::panic::Location;

use clip_recorder_core::{
    CaptureSession, ClipCatalog, ClipError, ClipExport, ClipStore, DownloadSink, PipeSource,
    PipeStream, StopOutcome,
};
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Main application state.
///
/// Owns the capture session, the clip store and the catalog. Console
/// commands and live-stream fragments are handled on one task, so a stop
/// command always sees every fragment that arrived before it.
pub struct App {
    pub(crate) store: ClipStore,
    pub(crate) source: PipeSource,
    pub(crate) sink: DirectorySink,
    pub(crate) session: CaptureSession<PipeStream>,
    pub(crate) catalog: ClipCatalog,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
}

impl App {
    /// Assemble the application around an unopened or opened store.
    pub(crate) fn new(
        store: ClipStore,
        source: PipeSource,
        sink: DirectorySink,
        command_rx: mpsc::Receiver<AppCommand>,
    ) -> Self {
        Self {
            store,
            source,
            sink,
            session: CaptureSession::new(),
            catalog: ClipCatalog::new(),
            command_rx,
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Clip-Recorder starting");

        self.reload_catalog().await;
        self.print_catalog();

        loop {
            tokio::select! {
                Some(fragment) = self.session.next_fragment() => {
                    self.session.accept(fragment);
                }

                command = self.command_rx.recv() => {
                    match command {
                        Some(AppCommand::Shutdown) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Some(command) => {
                            if let Err(e) = self.handle_command(command).await {
                                error!(command = ?command, error = ?e, "Command failed");
                            }
                        }
                        None => {
                            info!("Command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        // Never lose a recording in progress on exit.
        if self.session.state().is_active() {
            info!("Stopping active recording before exit");
            self.stop_recording().await;
        }

        info!("Clip-Recorder shut down successfully");

        Ok(())
    }

    /// Apply one console command.
    #[instrument(skip(self))]
    pub(crate) async fn handle_command(&mut self, command: AppCommand) -> AppResult<()> {
        match command {
            AppCommand::Start => match self.session.start(&mut self.source) {
                Err(ClipError::StreamUnavailable { .. }) => {
                    warn!("No live stream available, check capture.source_path");
                }
                other => other?,
            },
            AppCommand::Pause => {
                self.session.pause()?;
            }
            AppCommand::Resume => {
                self.session.resume()?;
            }
            AppCommand::Stop => self.stop_recording().await,
            AppCommand::Retry => {
                self.store.open().await?;
                let id = self.session.retry_save(&self.store).await?;
                info!(clip_id = id, "Retained clip saved");
                self.reload_catalog().await;
            }
            AppCommand::ExportLast => self.export_last().await?,
            AppCommand::List => self.print_catalog(),
            AppCommand::Refresh => {
                self.reload_catalog().await;
                self.print_catalog();
            }
            AppCommand::Export { id } => {
                self.store.open().await?;
                let export = self.catalog.export_clip(&self.store, id).await?;
                let path = self.sink.deliver(&export)?;
                println!("exported clip {} to {}", id, path.display());
            }
            AppCommand::Delete { id } => {
                self.store.open().await?;
                self.catalog.delete_clip(&self.store, id).await?;
                info!(clip_id = id, "Clip removed");
            }
            AppCommand::Shutdown => {
                debug!("Shutdown is handled by the event loop");
            }
        }

        Ok(())
    }

    /// Stop recording and persist the clip.
    ///
    /// Storage problems are logged, not returned: the clip stays retained in
    /// the session for `retry` or `export-last`.
    #[instrument(skip(self))]
    async fn stop_recording(&mut self) {
        if let Err(e) = self.store.open().await {
            warn!(error = ?e, "Clip store unavailable, clip will be retained");
        }

        match self.session.stop(&self.store).await {
            StopOutcome::Saved { id, name, bytes } => {
                println!("saved clip {} ({}, {} bytes)", id, name, bytes);
                self.reload_catalog().await;
            }
            StopOutcome::SaveFailed { name, bytes, error } => {
                error!(
                    clip_name = %name,
                    bytes,
                    error = ?error,
                    "Clip not saved, use `retry` or `export-last`"
                );
            }
            StopOutcome::Empty => info!("Recording produced no data, nothing saved"),
            StopOutcome::NotRecording => debug!("Stop ignored, not recording"),
        }
    }

    /// Export the clip of the last stop: from the store if it was saved and
    /// is still listed, otherwise straight from the retained fragments.
    async fn export_last(&self) -> AppResult<()> {
        let export = match self.session.saved_id() {
            Some(id) if self.catalog.get(id).is_some() => {
                self.store.open().await?;
                self.catalog.export_clip(&self.store, id).await?
            }
            _ => {
                let clip = self.session.last_clip().ok_or(ClipError::NoRetainedClip {
                    location: ErrorLocation::from(Location::caller()),
                })?;
                ClipExport::unsaved(clip)
            }
        };

        let path = self.sink.deliver(&export)?;
        println!("exported last clip to {}", path.display());

        Ok(())
    }

    /// Refresh the catalog, keeping the previous snapshot on failure.
    async fn reload_catalog(&mut self) {
        if let Err(e) = self.store.open().await {
            warn!(error = ?e, "Clip store unavailable, catalog not refreshed");
            return;
        }

        if let Err(e) = self.catalog.refresh(&self.store).await {
            warn!(error = ?e, "Showing last known catalog");
        }
    }

    fn print_catalog(&self) {
        if self.catalog.is_empty() {
            println!("no clips stored");
            return;
        }

        for clip in self.catalog.clips() {
            println!("{:>6}  {}  {} bytes", clip.id, clip.name, clip.size);
        }
    }
}
