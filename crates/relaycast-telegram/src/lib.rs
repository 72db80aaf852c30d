// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram messenger adapter for the relaycast broadcast bot.
//!
//! Implements [`Messenger`] for the Telegram Bot API via teloxide,
//! providing long polling, membership-update routing, and the outbound
//! primitives the broadcast engine fans out over.

pub mod handler;

use async_trait::async_trait;
use relaycast_config::model::TelegramConfig;
use relaycast_core::error::RelaycastError;
use relaycast_core::traits::{Messenger, PluginAdapter};
use relaycast_core::types::{AdapterType, BotEvent, ChatInfo, HealthStatus, VideoAsset};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberUpdated, FileId, InputFile};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Telegram messenger adapter implementing [`Messenger`].
///
/// Connects to Telegram via long polling. Membership updates for the bot
/// itself and operator DMs are funneled through an internal channel and
/// drained with [`TelegramMessenger::receive`]; outbound calls go straight
/// to the Bot API.
pub struct TelegramMessenger {
    bot: Bot,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<BotEvent>>,
    event_tx: mpsc::Sender<BotEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramMessenger {
    /// Creates a new Telegram messenger adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, RelaycastError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            RelaycastError::Config("telegram.bot_token is required for Telegram adapter".into())
        })?;

        if token.is_empty() {
            return Err(RelaycastError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (event_tx, event_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            event_rx: tokio::sync::Mutex::new(event_rx),
            event_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Starts long polling and begins feeding [`BotEvent`]s into the
    /// internal queue. Idempotent.
    pub fn connect(&mut self) {
        if self.polling_handle.is_some() {
            return; // Already connected
        }

        let bot = self.bot.clone();
        let member_tx = self.event_tx.clone();
        let message_tx = self.event_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let membership_branch =
                Update::filter_my_chat_member().endpoint(move |update: ChatMemberUpdated| {
                    let tx = member_tx.clone();
                    async move {
                        let change = handler::membership_change(&update);
                        debug!(
                            chat_id = change.chat_id,
                            status = %change.new_status,
                            "membership update"
                        );
                        if tx.send(BotEvent::MembershipChanged(change)).await.is_err() {
                            warn!("event channel closed, dropping membership update");
                        }
                        respond(())
                    }
                });

            let message_branch = Update::filter_message().endpoint(move |msg: Message| {
                let tx = message_tx.clone();
                async move {
                    match handler::extract_event(&msg) {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                warn!("event channel closed, dropping message");
                            }
                        }
                        None => {
                            debug!(chat_id = msg.chat.id.0, "ignoring message");
                        }
                    }
                    respond(())
                }
            });

            Dispatcher::builder(
                bot,
                dptree::entry()
                    .branch(membership_branch)
                    .branch(message_branch),
            )
            .default_handler(|_| async {}) // Silently ignore other update kinds
            .build()
            .dispatch()
            .await;
        });

        self.polling_handle = Some(handle);
    }

    /// Waits for the next inbound event.
    pub async fn receive(&self) -> Result<BotEvent, RelaycastError> {
        let mut rx = self.event_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| RelaycastError::messenger("Telegram event channel closed"))
    }
}

#[async_trait]
impl PluginAdapter for TelegramMessenger {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Messenger
    }

    async fn health_check(&self) -> Result<HealthStatus, RelaycastError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), RelaycastError> {
        debug!("Telegram messenger shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_video(&self, chat_id: i64, asset: &VideoAsset) -> Result<(), RelaycastError> {
        let input = InputFile::file_id(FileId(asset.file_id.clone()));
        let mut request = self.bot.send_video(ChatId(chat_id), input);
        if let Some(caption) = &asset.caption {
            request = request.caption(caption.clone());
        }
        request.await.map_err(|e| RelaycastError::Messenger {
            message: format!("failed to send video to {chat_id}: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }

    async fn member_count(&self, chat_id: i64) -> Result<i64, RelaycastError> {
        let count = self
            .bot
            .get_chat_member_count(ChatId(chat_id))
            .await
            .map_err(|e| RelaycastError::Messenger {
                message: format!("failed to get member count for {chat_id}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(i64::from(count))
    }

    async fn chat_info(&self, chat_id: i64) -> Result<ChatInfo, RelaycastError> {
        let info = self
            .bot
            .get_chat(ChatId(chat_id))
            .await
            .map_err(|e| RelaycastError::Messenger {
                message: format!("failed to get chat {chat_id}: {e}"),
                source: Some(Box::new(e)),
            })?;

        let kind = if info.is_channel() {
            relaycast_core::ChatType::Channel
        } else if info.is_supergroup() {
            relaycast_core::ChatType::Supergroup
        } else if info.is_group() {
            relaycast_core::ChatType::Group
        } else if info.is_private() {
            relaycast_core::ChatType::Private
        } else {
            relaycast_core::ChatType::Unknown
        };

        Ok(ChatInfo {
            title: info.title().map(str::to_owned),
            kind,
            username: info.username().map(str::to_owned),
        })
    }

    async fn leave_chat(&self, chat_id: i64) -> Result<(), RelaycastError> {
        self.bot
            .leave_chat(ChatId(chat_id))
            .await
            .map_err(|e| RelaycastError::Messenger {
                message: format!("failed to leave chat {chat_id}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), RelaycastError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(|e| RelaycastError::Messenger {
                message: format!("failed to send message to {chat_id}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<(), RelaycastError> {
        let input = InputFile::memory(data).file_name(filename.to_string());
        self.bot
            .send_document(ChatId(chat_id), input)
            .await
            .map_err(|e| RelaycastError::Messenger {
                message: format!("failed to send document to {chat_id}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}
