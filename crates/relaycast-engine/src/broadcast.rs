// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out broadcast engine.
//!
//! Delivers one video asset to every active chat in a point-in-time roster
//! snapshot. Sends run concurrently under a bounded limit; each chat's
//! outcome is independent (fire-and-collect, no retry, no rollback).

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use relaycast_config::model::BroadcastConfig;
use relaycast_core::{ChatRecord, Messenger, RelaycastError, RosterStore, VideoAsset};
use tracing::{debug, info, warn};

/// Outcome of one [`Broadcaster::broadcast`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Chats that received the asset.
    pub delivered: usize,
    /// Chats where the send failed.
    pub failed: usize,
    /// Size of the roster snapshot the broadcast ran over.
    pub total: usize,
}

/// Fans a single video out across the roster.
pub struct Broadcaster {
    messenger: Arc<dyn Messenger>,
    roster: Arc<dyn RosterStore>,
    config: BroadcastConfig,
}

impl Broadcaster {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        roster: Arc<dyn RosterStore>,
        config: BroadcastConfig,
    ) -> Self {
        Self {
            messenger,
            roster,
            config,
        }
    }

    /// Delivers `asset` to every active chat on the roster.
    ///
    /// The snapshot is taken once at the start; chats added or removed while
    /// the broadcast runs are not picked up retroactively. An empty or
    /// missing caption is replaced with the configured default. Each
    /// successful delivery increments that chat's counter by exactly one.
    pub async fn broadcast(&self, asset: &VideoAsset) -> Result<BroadcastReport, RelaycastError> {
        let snapshot: Vec<ChatRecord> = self
            .roster
            .list_all()
            .await?
            .into_iter()
            .filter(|r| !r.chat_type.is_terminal())
            .collect();

        let asset = VideoAsset {
            file_id: asset.file_id.clone(),
            caption: Some(match asset.caption.as_deref() {
                Some(c) if !c.is_empty() => c.to_string(),
                _ => self.config.default_caption.clone(),
            }),
        };

        let total = snapshot.len();
        debug!(chats = total, "starting broadcast");

        let delivered = stream::iter(snapshot)
            .map(|chat| self.deliver_one(chat, &asset))
            .buffer_unordered(self.config.max_concurrency.max(1))
            .filter(|ok| futures::future::ready(*ok))
            .count()
            .await;

        let report = BroadcastReport {
            delivered,
            failed: total - delivered,
            total,
        };
        info!(
            delivered = report.delivered,
            failed = report.failed,
            total = report.total,
            "broadcast complete"
        );
        Ok(report)
    }

    /// Returns `true` on successful delivery to the chat.
    async fn deliver_one(&self, chat: ChatRecord, asset: &VideoAsset) -> bool {
        match self.messenger.send_video(chat.id, asset).await {
            Ok(()) => {
                if let Err(e) = self.roster.increment_videos(chat.id).await {
                    // Delivery happened; the lost count is logged, not retried.
                    warn!(chat_id = chat.id, error = %e, "failed to record delivery");
                }
                true
            }
            Err(e) => {
                warn!(chat_id = chat.id, title = %chat.title, error = %e, "delivery failed");
                false
            }
        }
    }
}
