// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster reconciliation.
//!
//! Keeps stored chat records consistent with observed platform reality:
//! membership-change events drive inserts and reclassification, and the
//! on-demand refresh re-queries every active chat, marking unreachable ones
//! as left.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use relaycast_config::model::RosterConfig;
use relaycast_core::types::{link_for_username, UNTITLED};
use relaycast_core::{
    ChatPatch, ChatRecord, ChatType, MembershipChange, Messenger, RelaycastError, RosterStore,
};
use tracing::{debug, info, warn};

/// Outcome of a [`Reconciler::refresh_all`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Chats whose metadata was re-queried and updated.
    pub refreshed: usize,
    /// Chats that could not be reached and were marked left.
    pub reclassified: usize,
}

/// Reconciles the roster store against membership events and live platform
/// lookups.
pub struct Reconciler {
    messenger: Arc<dyn Messenger>,
    roster: Arc<dyn RosterStore>,
    policy: RosterConfig,
    max_concurrency: usize,
}

impl Reconciler {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        roster: Arc<dyn RosterStore>,
        policy: RosterConfig,
        max_concurrency: usize,
    ) -> Self {
        Self {
            messenger,
            roster,
            policy,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Handles one membership-change event for the bot.
    ///
    /// Terminal statuses only reclassify an existing record. Active statuses
    /// query the member count (falling back to the `-1` sentinel on lookup
    /// failure), apply the minimum-membership policy, and upsert the record.
    pub async fn on_membership_changed(
        &self,
        change: &MembershipChange,
    ) -> Result<(), RelaycastError> {
        if change.new_status.is_terminal() {
            info!(
                chat_id = change.chat_id,
                status = %change.new_status,
                "bot removed from chat"
            );
            return self
                .roster
                .update_fields(change.chat_id, &ChatPatch::chat_type(change.new_status.clone()))
                .await;
        }

        let member_count = match self.messenger.member_count(change.chat_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(chat_id = change.chat_id, error = %e, "member count lookup failed");
                -1
            }
        };

        // The policy only applies to an observed count; the -1 sentinel means
        // "unknown", not "empty".
        if let Some(min) = self.policy.min_members
            && member_count >= 0
            && member_count < min
        {
            info!(
                chat_id = change.chat_id,
                member_count,
                min,
                "below membership threshold, leaving"
            );
            self.roster
                .update_fields(change.chat_id, &ChatPatch::chat_type(ChatType::Left))
                .await?;
            if let Err(e) = self.messenger.leave_chat(change.chat_id).await {
                warn!(chat_id = change.chat_id, error = %e, "leave request failed");
            }
            return Ok(());
        }

        let title = match &change.title {
            Some(t) if !t.is_empty() => t.clone(),
            _ => UNTITLED.to_string(),
        };

        let record = ChatRecord {
            id: change.chat_id,
            title,
            member_count,
            videos_sent: 0,
            date_added: String::new(), // set by the store at first insertion
            chat_type: change.new_status.clone(),
            link: link_for_username(change.username.as_deref()),
        };

        info!(
            chat_id = record.id,
            title = %record.title,
            status = %record.chat_type,
            member_count,
            "chat registered"
        );
        self.roster.upsert(&record).await
    }

    /// Re-queries metadata for every active chat on the roster.
    ///
    /// Unreachable chats are marked left; this is how chats the bot was
    /// silently removed from get reclassified without a membership event.
    /// Per-chat failures are isolated; each chat gets exactly one attempt.
    pub async fn refresh_all(&self) -> Result<RefreshReport, RelaycastError> {
        let snapshot: Vec<ChatRecord> = self
            .roster
            .list_all()
            .await?
            .into_iter()
            .filter(|r| !r.chat_type.is_terminal())
            .collect();

        debug!(chats = snapshot.len(), "starting roster refresh");

        let outcomes: Vec<bool> = stream::iter(snapshot)
            .map(|chat| self.refresh_one(chat))
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let report = RefreshReport {
            refreshed: outcomes.iter().filter(|ok| **ok).count(),
            reclassified: outcomes.iter().filter(|ok| !**ok).count(),
        };
        info!(
            refreshed = report.refreshed,
            reclassified = report.reclassified,
            "roster refresh complete"
        );
        Ok(report)
    }

    /// Returns `true` when the chat was reachable and updated, `false` when
    /// it was reclassified as left.
    async fn refresh_one(&self, chat: ChatRecord) -> bool {
        let info = self.messenger.chat_info(chat.id).await;
        let count = self.messenger.member_count(chat.id).await;

        match (info, count) {
            (Ok(info), Ok(count)) => {
                let patch = ChatPatch {
                    title: Some(match info.title {
                        Some(t) if !t.is_empty() => t,
                        _ => UNTITLED.to_string(),
                    }),
                    member_count: Some(count),
                    chat_type: Some(info.kind),
                    link: Some(link_for_username(info.username.as_deref())),
                };
                match self.roster.update_fields(chat.id, &patch).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(chat_id = chat.id, error = %e, "refresh update failed");
                        false
                    }
                }
            }
            (info, count) => {
                let cause = info
                    .err()
                    .map(|e| e.to_string())
                    .or_else(|| count.err().map(|e| e.to_string()))
                    .unwrap_or_default();
                warn!(chat_id = chat.id, error = %cause, "chat unreachable, marking left");
                if let Err(e) = self
                    .roster
                    .update_fields(chat.id, &ChatPatch::chat_type(ChatType::Left))
                    .await
                {
                    warn!(chat_id = chat.id, error = %e, "failed to mark chat left");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaycast_core::ChatInfo;
    use relaycast_test_utils::{MemoryRoster, MockMessenger};

    fn make_record(id: i64, title: &str, chat_type: ChatType) -> ChatRecord {
        ChatRecord {
            id,
            title: title.to_string(),
            member_count: 25,
            videos_sent: 3,
            date_added: "2026-01-01T00:00:00Z".to_string(),
            chat_type,
            link: "https://t.me/somechat".to_string(),
        }
    }

    fn reconciler(
        messenger: Arc<MockMessenger>,
        roster: Arc<MemoryRoster>,
        min_members: Option<i64>,
    ) -> Reconciler {
        Reconciler::new(
            messenger,
            roster,
            RosterConfig { min_members },
            4,
        )
    }

    #[tokio::test]
    async fn membership_event_registers_chat() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(MemoryRoster::new());
        messenger.set_member_count(-100, 120).await;

        let change = MembershipChange {
            chat_id: -100,
            title: Some("News".into()),
            username: Some("newsfeed".into()),
            new_status: ChatType::Channel,
        };
        reconciler(messenger, roster.clone(), None)
            .on_membership_changed(&change)
            .await
            .unwrap();

        let stored = roster.get(-100).await.unwrap().unwrap();
        assert_eq!(stored.title, "News");
        assert_eq!(stored.member_count, 120);
        assert_eq!(stored.chat_type, ChatType::Channel);
        assert_eq!(stored.link, "https://t.me/newsfeed");
    }

    #[tokio::test]
    async fn count_lookup_failure_records_sentinel() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(MemoryRoster::new());
        messenger.fail_lookup_for(-100).await;

        let change = MembershipChange {
            chat_id: -100,
            title: Some("News".into()),
            username: None,
            new_status: ChatType::Group,
        };
        reconciler(messenger, roster.clone(), None)
            .on_membership_changed(&change)
            .await
            .unwrap();

        let stored = roster.get(-100).await.unwrap().unwrap();
        assert_eq!(stored.member_count, -1);
        assert_eq!(stored.chat_type, ChatType::Group);
        assert_eq!(stored.link, "");
    }

    #[tokio::test]
    async fn missing_title_gets_placeholder() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(MemoryRoster::new());

        let change = MembershipChange {
            chat_id: -5,
            title: None,
            username: None,
            new_status: ChatType::Group,
        };
        reconciler(messenger, roster.clone(), None)
            .on_membership_changed(&change)
            .await
            .unwrap();

        assert_eq!(roster.get(-5).await.unwrap().unwrap().title, UNTITLED);
    }

    #[tokio::test]
    async fn terminal_event_reclassifies_without_creating() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(
            MemoryRoster::with_records(vec![make_record(-1, "Known", ChatType::Group)]).await,
        );
        let rec = reconciler(messenger, roster.clone(), None);

        // Known chat: reclassified, other fields untouched.
        let change = MembershipChange {
            chat_id: -1,
            title: Some("Known".into()),
            username: None,
            new_status: ChatType::Kicked,
        };
        rec.on_membership_changed(&change).await.unwrap();
        let stored = roster.get(-1).await.unwrap().unwrap();
        assert_eq!(stored.chat_type, ChatType::Kicked);
        assert_eq!(stored.videos_sent, 3);

        // Unknown chat: no record springs into existence.
        let change = MembershipChange {
            chat_id: -2,
            title: None,
            username: None,
            new_status: ChatType::Left,
        };
        rec.on_membership_changed(&change).await.unwrap();
        assert!(roster.get(-2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn below_threshold_marks_left_and_leaves() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(
            MemoryRoster::with_records(vec![make_record(-9, "Tiny", ChatType::Group)]).await,
        );
        messenger.set_member_count(-9, 3).await;

        let change = MembershipChange {
            chat_id: -9,
            title: Some("Tiny".into()),
            username: None,
            new_status: ChatType::Group,
        };
        reconciler(messenger.clone(), roster.clone(), Some(50))
            .on_membership_changed(&change)
            .await
            .unwrap();

        let stored = roster.get(-9).await.unwrap().unwrap();
        assert_eq!(stored.chat_type, ChatType::Left);
        // Upsert was skipped: member count stays at its prior value.
        assert_eq!(stored.member_count, 25);
        assert_eq!(messenger.left_chats().await, vec![-9]);
    }

    #[tokio::test]
    async fn unknown_count_does_not_trigger_threshold() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(MemoryRoster::new());
        messenger.fail_lookup_for(-9).await;

        let change = MembershipChange {
            chat_id: -9,
            title: Some("Opaque".into()),
            username: None,
            new_status: ChatType::Group,
        };
        reconciler(messenger.clone(), roster.clone(), Some(50))
            .on_membership_changed(&change)
            .await
            .unwrap();

        let stored = roster.get(-9).await.unwrap().unwrap();
        assert_eq!(stored.member_count, -1);
        assert_eq!(stored.chat_type, ChatType::Group);
        assert!(messenger.left_chats().await.is_empty());
    }

    #[tokio::test]
    async fn refresh_updates_reachable_chats() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(
            MemoryRoster::with_records(vec![make_record(-1, "Old Name", ChatType::Group)]).await,
        );
        messenger.set_member_count(-1, 77).await;
        messenger
            .set_chat_info(
                -1,
                ChatInfo {
                    title: Some("New Name".into()),
                    kind: ChatType::Supergroup,
                    username: Some("upgraded".into()),
                },
            )
            .await;

        let report = reconciler(messenger, roster.clone(), None)
            .refresh_all()
            .await
            .unwrap();
        assert_eq!(report, RefreshReport { refreshed: 1, reclassified: 0 });

        let stored = roster.get(-1).await.unwrap().unwrap();
        assert_eq!(stored.title, "New Name");
        assert_eq!(stored.member_count, 77);
        assert_eq!(stored.chat_type, ChatType::Supergroup);
        assert_eq!(stored.link, "https://t.me/upgraded");
    }

    /// An unreachable chat is reclassified as left and nothing else changes.
    #[tokio::test]
    async fn refresh_marks_unreachable_chats_left() {
        let messenger = Arc::new(MockMessenger::new());
        let original = make_record(-1, "Gone", ChatType::Channel);
        let roster = Arc::new(MemoryRoster::with_records(vec![original.clone()]).await);
        messenger.fail_lookup_for(-1).await;

        let report = reconciler(messenger, roster.clone(), None)
            .refresh_all()
            .await
            .unwrap();
        assert_eq!(report, RefreshReport { refreshed: 0, reclassified: 1 });

        let stored = roster.get(-1).await.unwrap().unwrap();
        assert_eq!(stored.chat_type, ChatType::Left);
        assert_eq!(stored.title, original.title);
        assert_eq!(stored.member_count, original.member_count);
        assert_eq!(stored.link, original.link);
        assert_eq!(stored.videos_sent, original.videos_sent);
    }

    #[tokio::test]
    async fn refresh_failures_are_isolated_per_chat() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(
            MemoryRoster::with_records(vec![
                make_record(-1, "Reachable", ChatType::Group),
                make_record(-2, "Unreachable", ChatType::Group),
            ])
            .await,
        );
        messenger.set_member_count(-1, 10).await;
        messenger
            .set_chat_info(
                -1,
                ChatInfo {
                    title: Some("Reachable".into()),
                    kind: ChatType::Group,
                    username: None,
                },
            )
            .await;
        messenger.fail_lookup_for(-2).await;

        let report = reconciler(messenger, roster.clone(), None)
            .refresh_all()
            .await
            .unwrap();
        assert_eq!(report, RefreshReport { refreshed: 1, reclassified: 1 });
        assert_eq!(roster.get(-1).await.unwrap().unwrap().chat_type, ChatType::Group);
        assert_eq!(roster.get(-2).await.unwrap().unwrap().chat_type, ChatType::Left);
    }

    #[tokio::test]
    async fn refresh_skips_terminal_chats() {
        let messenger = Arc::new(MockMessenger::new());
        let roster = Arc::new(
            MemoryRoster::with_records(vec![make_record(-1, "Kicked", ChatType::Kicked)]).await,
        );
        messenger.fail_lookup_for(-1).await;

        let report = reconciler(messenger, roster.clone(), None)
            .refresh_all()
            .await
            .unwrap();
        assert_eq!(report, RefreshReport::default());
        assert_eq!(roster.get(-1).await.unwrap().unwrap().chat_type, ChatType::Kicked);
    }
}
