//! Clip-Recorder: record short clips from a live camera stream, keep them in
//! a local SQLite store, and list, export or delete them from the console.

mod app;
mod app_command;
mod config;
mod console;
mod download_sink;
mod error;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    console::ConsoleReader,
    download_sink::DirectorySink,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use clip_recorder_core::{ClipStore, PipeSource, StoreLocation};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application entry point.
#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clip_recorder=debug,clip_recorder_core=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let store = match ClipStore::new(
        StoreLocation::File(config.storage.database_path.clone()),
        config.storage.store_name.clone(),
    ) {
        Ok(store) => store,
        Err(e) => {
            error!("Invalid storage configuration: {:?}", e);
            std::process::exit(1);
        }
    };

    // A failed open is not fatal: recording still works and every storage
    // command retries the open.
    if let Err(e) = store.open().await {
        error!(error = ?e, "Clip store unavailable at startup");
    }

    let source = PipeSource::new(
        config.capture.source_path.clone(),
        config.capture.fragment_bytes,
        config.capture.poll_interval(),
    );
    let sink = DirectorySink::new(config.export.download_dir.clone());

    let (command_tx, command_rx) = mpsc::channel(32);

    if let Err(e) = ConsoleReader::spawn(command_tx) {
        error!("Failed to start console reader: {:?}", e);
        std::process::exit(1);
    }

    info!(
        store_name = store.store_name(),
        store_open = store.is_open(),
        source_path = ?config.capture.source_path,
        download_dir = ?sink.dir(),
        "Ready for commands"
    );

    let app = App::new(store, source, sink, command_rx);

    if let Err(e) = app.run().await {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}
