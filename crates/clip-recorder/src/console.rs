//! Console command reader.
//!
//! Reads one command per line from stdin and forwards it to the main
//! application over an async channel. End of input requests shutdown.

use crate::{AppCommand, AppError, AppResult, app_command::COMMAND_HELP};

use std::{
    io::{self, BufRead},
    panic::Location,
    thread::JoinHandle,
};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Forwards console input to the application as [`AppCommand`]s.
pub struct ConsoleReader;

impl ConsoleReader {
    /// Spawn the reader on a dedicated thread.
    ///
    /// A plain thread rather than a blocking task: a read blocked on stdin
    /// would otherwise hold up runtime shutdown. The thread ends at end of
    /// input or once the application drops its receiver.
    #[track_caller]
    pub fn spawn(command_tx: mpsc::Sender<AppCommand>) -> AppResult<JoinHandle<()>> {
        let handle = std::thread::Builder::new()
            .name("console-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                Self::forward_lines(stdin.lock(), &command_tx);
            })?;

        info!("Console reader started");

        Ok(handle)
    }

    /// Parse each line of `reader` and send the commands in order.
    ///
    /// Blank lines are skipped and unparseable lines are reported without
    /// stopping the reader. Sends [`AppCommand::Shutdown`] when input ends.
    pub fn forward_lines<R: BufRead>(reader: R, command_tx: &mpsc::Sender<AppCommand>) {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "Failed to read console input");
                    break;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match trimmed.parse::<AppCommand>() {
                Ok(command) => {
                    debug!(command = ?command, "Console command received");
                    if let Err(e) = Self::send(command_tx, command) {
                        debug!(error = %e, "Application stopped listening, console reader exiting");
                        return;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring console input");
                    eprintln!("{}", COMMAND_HELP);
                }
            }
        }

        if let Err(e) = Self::send(command_tx, AppCommand::Shutdown) {
            debug!(error = %e, "Application already stopped, shutdown not forwarded");
        }
    }

    /// Send one command from the reader thread.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ChannelSendFailed`] once the application has
    /// dropped its receiver.
    #[track_caller]
    pub(crate) fn send(
        command_tx: &mpsc::Sender<AppCommand>,
        command: AppCommand,
    ) -> AppResult<()> {
        command_tx
            .blocking_send(command)
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to forward {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
