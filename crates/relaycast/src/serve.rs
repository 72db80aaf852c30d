// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `relaycast serve` command implementation.
//!
//! Opens the SQLite roster store, connects the Telegram adapter, and drains
//! the inbound event stream through the [`EventRouter`] until interrupted.

use std::sync::Arc;

use relaycast_config::model::RelaycastConfig;
use relaycast_core::error::RelaycastError;
use relaycast_core::{Messenger, PluginAdapter, RosterStore};
use relaycast_storage::SqliteRoster;
use relaycast_telegram::TelegramMessenger;
use tracing::{error, info};

use crate::router::EventRouter;

/// Runs the `relaycast serve` command.
///
/// A roster store failure at startup is fatal; once the event loop is
/// running, all failures are contained per event.
pub async fn run_serve(config: RelaycastConfig) -> Result<(), RelaycastError> {
    init_tracing(&config.agent.log_level);

    info!("starting relaycast serve");

    // Initialize storage. Unreachable storage terminates startup.
    let roster: Arc<dyn RosterStore> = Arc::new(SqliteRoster::new(config.storage.clone()));
    roster.initialize().await?;
    info!(path = %config.storage.database_path, "roster store ready");

    // Initialize the Telegram adapter and start long polling.
    let mut telegram = TelegramMessenger::new(&config.telegram).map_err(|e| {
        error!(error = %e, "failed to initialize Telegram adapter");
        eprintln!("error: Telegram bot token required. Set telegram.bot_token or RELAYCAST_TELEGRAM_BOT_TOKEN.");
        e
    })?;
    telegram.connect();
    let telegram = Arc::new(telegram);
    let messenger: Arc<dyn Messenger> = telegram.clone();

    let router = EventRouter::new(messenger.clone(), roster.clone(), &config);

    info!(bot = %config.agent.name, "event loop running");
    loop {
        tokio::select! {
            event = telegram.receive() => {
                match event {
                    Ok(event) => router.handle(event).await,
                    Err(e) => {
                        error!(error = %e, "event stream closed");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received, shutting down");
                break;
            }
        }
    }

    messenger.shutdown().await?;
    roster.shutdown().await?;
    info!("relaycast serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("relaycast={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
