// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event routing for the bot.
//!
//! Consumes [`BotEvent`]s from the messenger and drives the engine:
//! membership events go to the reconciler, operator DMs go through the
//! password gate and then to the broadcast, stats, export, refresh, and
//! bulk-leave commands. Every reply is a plain text message back to the
//! operator's DM; all engine failures are contained here and reported as
//! text rather than propagated.

use std::sync::Arc;

use relaycast_config::model::RelaycastConfig;
use relaycast_core::{BotEvent, Messenger, RosterStore, VideoAsset};
use relaycast_engine::{
    stats, Broadcaster, LeaveFlow, LeaveReply, LeaveState, OperatorSessions, Reconciler,
};
use relaycast_engine::report;
use tracing::{error, info, warn};

const HELP_TEXT: &str = "Commands:\n\
    send a video - broadcast it to every chat\n\
    /stats [groups|channels] - roster statistics\n\
    /export - download the roster as CSV\n\
    /refresh - re-query every chat's metadata\n\
    /leaveall - leave every chat (confirmed)\n\
    /logout - lock commands again\n";

/// Routes inbound events to the engine components.
pub struct EventRouter {
    messenger: Arc<dyn Messenger>,
    roster: Arc<dyn RosterStore>,
    reconciler: Reconciler,
    broadcaster: Broadcaster,
    leave: LeaveFlow,
    sessions: OperatorSessions,
}

impl EventRouter {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        roster: Arc<dyn RosterStore>,
        config: &RelaycastConfig,
    ) -> Self {
        let reconciler = Reconciler::new(
            messenger.clone(),
            roster.clone(),
            config.roster.clone(),
            config.broadcast.max_concurrency,
        );
        let broadcaster = Broadcaster::new(
            messenger.clone(),
            roster.clone(),
            config.broadcast.clone(),
        );
        let leave = LeaveFlow::new(
            messenger.clone(),
            roster.clone(),
            config.telegram.leave_passphrase.clone(),
            config.broadcast.max_concurrency,
        );
        let sessions = OperatorSessions::new(config.telegram.operator_password.clone());

        Self {
            messenger,
            roster,
            reconciler,
            broadcaster,
            leave,
            sessions,
        }
    }

    /// Handles one inbound event. Never propagates engine failures; they are
    /// logged and, for operator-triggered actions, reported as a reply.
    pub async fn handle(&self, event: BotEvent) {
        match event {
            BotEvent::MembershipChanged(change) => {
                if let Err(e) = self.reconciler.on_membership_changed(&change).await {
                    error!(chat_id = change.chat_id, error = %e, "reconciliation failed");
                }
            }
            BotEvent::VideoReceived { operator_id, asset } => {
                self.handle_video(operator_id, asset).await;
            }
            BotEvent::TextReceived { operator_id, text } => {
                self.handle_text(operator_id, &text).await;
            }
        }
    }

    async fn handle_video(&self, operator_id: i64, asset: VideoAsset) {
        if !self.sessions.is_authorized(operator_id).await {
            self.reply(operator_id, "Send the password first.").await;
            return;
        }

        match self.broadcaster.broadcast(&asset).await {
            Ok(result) => {
                self.reply(
                    operator_id,
                    &format!("Delivered to {} of {} chats.", result.delivered, result.total),
                )
                .await;
            }
            Err(e) => {
                error!(error = %e, "broadcast failed");
                self.reply(operator_id, "Broadcast failed, see the logs.").await;
            }
        }
    }

    async fn handle_text(&self, operator_id: i64, text: &str) {
        let text = text.trim();

        if !self.sessions.is_authorized(operator_id).await {
            self.handle_login(operator_id, text).await;
            return;
        }

        // A pending leave confirmation consumes the next message.
        match self.leave.state(operator_id).await {
            LeaveState::AwaitingConfirmation => {
                let reply = self.leave.confirm(operator_id, text).await;
                self.reply_leave(operator_id, reply).await;
                return;
            }
            LeaveState::AwaitingPassphrase => {
                match self.leave.passphrase(operator_id, text).await {
                    Ok(reply) => self.reply_leave(operator_id, reply).await,
                    Err(e) => {
                        error!(error = %e, "bulk leave failed");
                        self.reply(operator_id, "Bulk leave failed, see the logs.").await;
                    }
                }
                return;
            }
            _ => {}
        }

        let (command, arg) = match text.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (text, ""),
        };

        match command {
            "/start" => self.reply(operator_id, HELP_TEXT).await,
            "/stats" => self.handle_stats(operator_id, arg).await,
            "/export" => self.handle_export(operator_id).await,
            "/refresh" => self.handle_refresh(operator_id).await,
            "/leaveall" => {
                let reply = self.leave.request(operator_id).await;
                self.reply_leave(operator_id, reply).await;
            }
            "/logout" => {
                self.sessions.revoke(operator_id).await;
                info!(operator_id, "operator logged out");
                self.reply(operator_id, "Logged out. Send the password to unlock commands.")
                    .await;
            }
            _ => self.reply(operator_id, HELP_TEXT).await,
        }
    }

    async fn handle_login(&self, operator_id: i64, text: &str) {
        if text == "/start" {
            self.reply(operator_id, "Send the password to unlock commands.")
                .await;
            return;
        }
        if self.sessions.authorize(operator_id, text).await {
            info!(operator_id, "operator unlocked");
            self.reply(operator_id, &format!("Authorized.\n{HELP_TEXT}"))
                .await;
        } else {
            self.reply(operator_id, "Wrong password.").await;
        }
    }

    async fn handle_stats(&self, operator_id: i64, arg: &str) {
        match self.roster.list_all().await {
            Ok(records) if records.is_empty() => {
                self.reply(operator_id, "The roster is empty.").await;
            }
            Ok(records) => {
                let filter = stats::StatsFilter::parse(arg);
                let aggregated = stats::aggregate(&records, filter);
                self.reply(operator_id, &stats::render(&aggregated)).await;
            }
            Err(e) => {
                error!(error = %e, "stats query failed");
                self.reply(operator_id, "Stats unavailable, see the logs.").await;
            }
        }
    }

    async fn handle_export(&self, operator_id: i64) {
        let result = match self.roster.list_all().await {
            Ok(records) => report::roster_csv(&records),
            Err(e) => Err(e),
        };
        match result {
            Ok(bytes) => {
                if let Err(e) = self
                    .messenger
                    .send_document(operator_id, report::EXPORT_FILENAME, bytes)
                    .await
                {
                    error!(error = %e, "export upload failed");
                    self.reply(operator_id, "Export failed, see the logs.").await;
                }
            }
            Err(e) => {
                error!(error = %e, "export failed");
                self.reply(operator_id, "Export failed, see the logs.").await;
            }
        }
    }

    async fn handle_refresh(&self, operator_id: i64) {
        match self.reconciler.refresh_all().await {
            Ok(result) => {
                self.reply(
                    operator_id,
                    &format!(
                        "Refreshed {} chats, {} marked left.",
                        result.refreshed, result.reclassified
                    ),
                )
                .await;
            }
            Err(e) => {
                error!(error = %e, "refresh failed");
                self.reply(operator_id, "Refresh failed, see the logs.").await;
            }
        }
    }

    async fn reply_leave(&self, operator_id: i64, reply: LeaveReply) {
        let text = match reply {
            LeaveReply::ConfirmationRequested => {
                "This removes the bot from every chat. Reply yes to continue.".to_string()
            }
            LeaveReply::PassphraseRequested => "Send the leave passphrase.".to_string(),
            LeaveReply::Cancelled => "Cancelled.".to_string(),
            LeaveReply::Busy => "A leave request is already in progress.".to_string(),
            LeaveReply::NotPending => HELP_TEXT.to_string(),
            LeaveReply::Completed(result) => {
                format!("Left {} of {} chats.", result.left, result.total)
            }
        };
        self.reply(operator_id, &text).await;
    }

    async fn reply(&self, operator_id: i64, text: &str) {
        // Operator DMs share the chat id with the operator id.
        if let Err(e) = self.messenger.send_message(operator_id, text).await {
            warn!(operator_id, error = %e, "failed to send reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaycast_core::{ChatRecord, ChatType, MembershipChange};
    use relaycast_test_utils::{MemoryRoster, MockMessenger};

    const PASSWORD: &str = "hunter2";
    const PASSPHRASE: &str = "really leave";
    const OPERATOR: i64 = 42;

    fn make_config() -> RelaycastConfig {
        let mut config = RelaycastConfig::default();
        config.telegram.operator_password = PASSWORD.to_string();
        config.telegram.leave_passphrase = PASSPHRASE.to_string();
        config
    }

    fn make_record(id: i64, title: &str, chat_type: ChatType) -> ChatRecord {
        ChatRecord {
            id,
            title: title.to_string(),
            member_count: 10,
            videos_sent: 0,
            date_added: "2026-01-01T00:00:00Z".to_string(),
            chat_type,
            link: String::new(),
        }
    }

    async fn setup(
        records: Vec<ChatRecord>,
    ) -> (Arc<MockMessenger>, Arc<MemoryRoster>, EventRouter) {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(MemoryRoster::with_records(records).await);
        let router = EventRouter::new(messenger.clone(), roster.clone(), &make_config());
        (messenger, roster, router)
    }

    async fn login(router: &EventRouter) {
        router
            .handle(BotEvent::TextReceived {
                operator_id: OPERATOR,
                text: PASSWORD.to_string(),
            })
            .await;
    }

    fn video_event() -> BotEvent {
        BotEvent::VideoReceived {
            operator_id: OPERATOR,
            asset: VideoAsset {
                file_id: "FILE".into(),
                caption: None,
            },
        }
    }

    fn text_event(text: &str) -> BotEvent {
        BotEvent::TextReceived {
            operator_id: OPERATOR,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn video_before_login_is_rejected() {
        let (messenger, _roster, router) = setup(vec![make_record(1, "A", ChatType::Group)]).await;

        router.handle(video_event()).await;

        assert!(messenger.sent_videos().await.is_empty());
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Send the password first.")
        );
    }

    #[tokio::test]
    async fn wrong_password_does_not_authorize() {
        let (messenger, _roster, router) = setup(vec![]).await;

        router.handle(text_event("guess")).await;
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Wrong password.")
        );

        router.handle(video_event()).await;
        assert!(messenger.sent_videos().await.is_empty());
    }

    #[tokio::test]
    async fn login_then_video_broadcasts_and_reports_count() {
        let (messenger, roster, router) = setup(vec![
            make_record(1, "A", ChatType::Group),
            make_record(2, "B", ChatType::Channel),
        ])
        .await;

        login(&router).await;
        router.handle(video_event()).await;

        assert_eq!(messenger.sent_videos().await.len(), 2);
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Delivered to 2 of 2 chats.")
        );
        assert_eq!(roster.get(1).await.unwrap().unwrap().videos_sent, 1);
    }

    #[tokio::test]
    async fn partial_failure_is_reported_in_tally() {
        let (messenger, _roster, router) = setup(vec![
            make_record(1, "A", ChatType::Group),
            make_record(2, "B", ChatType::Channel),
        ])
        .await;
        messenger.fail_send_for(1).await;

        login(&router).await;
        router.handle(video_event()).await;

        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Delivered to 1 of 2 chats.")
        );
    }

    #[tokio::test]
    async fn membership_event_needs_no_login() {
        let (messenger, roster, router) = setup(vec![]).await;
        messenger.set_member_count(-100, 12).await;

        router
            .handle(BotEvent::MembershipChanged(MembershipChange {
                chat_id: -100,
                title: Some("Fresh".into()),
                username: None,
                new_status: ChatType::Group,
            }))
            .await;

        assert!(roster.get(-100).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn stats_on_empty_roster_is_informational() {
        let (messenger, _roster, router) = setup(vec![]).await;
        login(&router).await;

        router.handle(text_event("/stats")).await;
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("The roster is empty.")
        );
    }

    #[tokio::test]
    async fn stats_renders_tally() {
        let (messenger, _roster, router) = setup(vec![
            make_record(1, "A", ChatType::Group),
            make_record(2, "B", ChatType::Left),
        ])
        .await;
        login(&router).await;

        router.handle(text_event("/stats")).await;
        let text = messenger.last_text_to(OPERATOR).await.unwrap();
        assert!(text.contains("1 active, 1 inactive"));
    }

    #[tokio::test]
    async fn export_sends_csv_document() {
        let (messenger, _roster, router) =
            setup(vec![make_record(1, "A", ChatType::Group)]).await;
        login(&router).await;

        router.handle(text_event("/export")).await;

        let documents = messenger.sent_documents().await;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].1, "roster.csv");
        let body = String::from_utf8(documents[0].2.clone()).unwrap();
        assert!(body.starts_with("id,title,"));
    }

    #[tokio::test]
    async fn refresh_reports_counts() {
        let (messenger, _roster, router) =
            setup(vec![make_record(1, "A", ChatType::Group)]).await;
        messenger.fail_lookup_for(1).await;
        login(&router).await;

        router.handle(text_event("/refresh")).await;
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Refreshed 0 chats, 1 marked left.")
        );
    }

    #[tokio::test]
    async fn full_leave_flow_via_text_events() {
        let (messenger, roster, router) = setup(vec![
            make_record(1, "A", ChatType::Group),
            make_record(2, "B", ChatType::Channel),
        ])
        .await;
        login(&router).await;

        router.handle(text_event("/leaveall")).await;
        router.handle(text_event("yes")).await;
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Send the leave passphrase.")
        );

        router.handle(text_event(PASSPHRASE)).await;
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Left 2 of 2 chats.")
        );
        assert_eq!(roster.get(1).await.unwrap().unwrap().chat_type, ChatType::Left);
        assert_eq!(roster.get(2).await.unwrap().unwrap().chat_type, ChatType::Left);
    }

    #[tokio::test]
    async fn leave_flow_cancelled_by_no() {
        let (messenger, roster, router) =
            setup(vec![make_record(1, "A", ChatType::Group)]).await;
        login(&router).await;

        router.handle(text_event("/leaveall")).await;
        router.handle(text_event("no")).await;
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Cancelled.")
        );
        assert_eq!(roster.get(1).await.unwrap().unwrap().chat_type, ChatType::Group);
        assert!(messenger.left_chats().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_command_gets_help() {
        let (messenger, _roster, router) = setup(vec![]).await;
        login(&router).await;

        router.handle(text_event("/bogus")).await;
        let text = messenger.last_text_to(OPERATOR).await.unwrap();
        assert!(text.starts_with("Commands:"));
    }

    #[tokio::test]
    async fn logout_locks_commands_until_reauthorization() {
        let (messenger, _roster, router) = setup(vec![make_record(1, "A", ChatType::Group)]).await;
        login(&router).await;

        router.handle(text_event("/logout")).await;
        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Logged out. Send the password to unlock commands.")
        );

        router.handle(video_event()).await;
        assert!(messenger.sent_videos().await.is_empty());

        login(&router).await;
        router.handle(video_event()).await;
        assert_eq!(messenger.sent_videos().await.len(), 1);
    }

    /// End to end against the real SQLite store: a membership event registers
    /// the chat, a broadcast delivers to it, and the counter lands on disk.
    #[tokio::test]
    async fn membership_then_broadcast_against_sqlite() {
        use relaycast_storage::SqliteRoster;

        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("router.db");
        let mut config = make_config();
        config.storage.database_path = db_path.to_str().unwrap().to_string();

        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(SqliteRoster::new(config.storage.clone()));
        roster.initialize().await.unwrap();
        let router = EventRouter::new(messenger.clone(), roster.clone(), &config);

        messenger.set_member_count(-100, 40).await;
        router
            .handle(BotEvent::MembershipChanged(MembershipChange {
                chat_id: -100,
                title: Some("Wired".into()),
                username: None,
                new_status: ChatType::Group,
            }))
            .await;

        login(&router).await;
        router.handle(video_event()).await;

        assert_eq!(
            messenger.last_text_to(OPERATOR).await.as_deref(),
            Some("Delivered to 1 of 1 chats.")
        );
        let stored = roster.get(-100).await.unwrap().unwrap();
        assert_eq!(stored.title, "Wired");
        assert_eq!(stored.member_count, 40);
        assert_eq!(stored.videos_sent, 1);
        roster.close().await.unwrap();
    }
}
