use crate::AppError;

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Usage text printed for unrecognised console input.
pub(crate) const COMMAND_HELP: &str = "commands: start | pause | resume | stop | retry | \
     export-last | list | refresh | export <id> | delete <id> | quit";

/// Commands sent from the console reader to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new recording.
    Start,
    /// Pause the current recording.
    Pause,
    /// Resume a paused recording.
    Resume,
    /// Stop the current recording and store the clip.
    Stop,
    /// Store the last clip again after a failed save.
    Retry,
    /// Export the last recorded clip, stored or not.
    ExportLast,
    /// Print the clip catalog.
    List,
    /// Reload the clip catalog from storage.
    Refresh,
    /// Export a stored clip.
    Export {
        /// Clip identifier.
        id: i64,
    },
    /// Delete a stored clip.
    Delete {
        /// Clip identifier.
        id: i64,
    },
    /// Request application shutdown.
    Shutdown,
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut words = input.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let argument = words.next();

        let invalid = |reason: &str| AppError::InvalidCommand {
            input: input.to_string(),
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        };

        if words.next().is_some() {
            return Err(invalid("too many arguments"));
        }

        let command = match (verb.as_str(), argument) {
            ("start", None) => AppCommand::Start,
            ("pause", None) => AppCommand::Pause,
            ("resume", None) => AppCommand::Resume,
            ("stop", None) => AppCommand::Stop,
            ("retry", None) => AppCommand::Retry,
            ("export-last", None) => AppCommand::ExportLast,
            ("list", None) => AppCommand::List,
            ("refresh", None) => AppCommand::Refresh,
            ("quit" | "exit", None) => AppCommand::Shutdown,
            ("export" | "delete", Some(raw)) => {
                let id = raw
                    .parse::<i64>()
                    .map_err(|_| invalid("clip id must be an integer"))?;
                if verb == "export" {
                    AppCommand::Export { id }
                } else {
                    AppCommand::Delete { id }
                }
            }
            ("export" | "delete", None) => return Err(invalid("missing clip id")),
            ("", _) => return Err(invalid("empty command")),
            (_, Some(_)) if is_known_verb(&verb) => {
                return Err(invalid("command takes no arguments"));
            }
            _ => return Err(invalid("unknown command")),
        };

        Ok(command)
    }
}

fn is_known_verb(verb: &str) -> bool {
    matches!(
        verb,
        "start" | "pause" | "resume" | "stop" | "retry" | "export-last" | "list" | "refresh"
            | "quit" | "exit"
    )
}
