// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk leave controller.
//!
//! Operator-triggered exit from every chat on the roster, gated behind an
//! explicit yes/no confirmation plus a secondary passphrase. Each operator
//! has an independent flow; a second request from the same operator while
//! one is in flight is rejected until the flow returns to idle.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use relaycast_core::{ChatPatch, ChatRecord, ChatType, Messenger, RelaycastError, RosterStore};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Per-operator position in the confirmation flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeaveState {
    #[default]
    Idle,
    AwaitingConfirmation,
    AwaitingPassphrase,
    Executing,
}

/// Outcome of the executing phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveReport {
    /// Chats successfully left.
    pub left: usize,
    /// Chats where the leave request failed.
    pub failed: usize,
    /// Size of the roster snapshot.
    pub total: usize,
}

/// Reply to an operator step in the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveReply {
    /// Flow started; the operator must answer yes or no.
    ConfirmationRequested,
    /// Flow advanced; the operator must supply the passphrase.
    PassphraseRequested,
    /// Flow aborted by a negative answer or wrong passphrase.
    Cancelled,
    /// A flow for this operator is already in flight.
    Busy,
    /// No flow was pending for this operator.
    NotPending,
    /// The bulk leave ran to completion.
    Completed(LeaveReport),
}

/// Drives the confirmation state machine and the bulk leave itself.
pub struct LeaveFlow {
    messenger: Arc<dyn Messenger>,
    roster: Arc<dyn RosterStore>,
    passphrase: String,
    max_concurrency: usize,
    states: Mutex<HashMap<i64, LeaveState>>,
}

impl LeaveFlow {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        roster: Arc<dyn RosterStore>,
        passphrase: impl Into<String>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            messenger,
            roster,
            passphrase: passphrase.into(),
            max_concurrency: max_concurrency.max(1),
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current flow state for an operator.
    pub async fn state(&self, operator_id: i64) -> LeaveState {
        self.states
            .lock()
            .await
            .get(&operator_id)
            .copied()
            .unwrap_or_default()
    }

    /// Operator asked to leave all chats. Starts the confirmation flow.
    pub async fn request(&self, operator_id: i64) -> LeaveReply {
        let mut states = self.states.lock().await;
        match states.get(&operator_id).copied().unwrap_or_default() {
            LeaveState::Idle => {
                states.insert(operator_id, LeaveState::AwaitingConfirmation);
                debug!(operator_id, "leave flow started");
                LeaveReply::ConfirmationRequested
            }
            _ => LeaveReply::Busy,
        }
    }

    /// Operator answered the yes/no confirmation.
    pub async fn confirm(&self, operator_id: i64, answer: &str) -> LeaveReply {
        let mut states = self.states.lock().await;
        match states.get(&operator_id).copied().unwrap_or_default() {
            LeaveState::AwaitingConfirmation => {
                if answer.trim().eq_ignore_ascii_case("yes") {
                    states.insert(operator_id, LeaveState::AwaitingPassphrase);
                    LeaveReply::PassphraseRequested
                } else {
                    states.remove(&operator_id);
                    debug!(operator_id, "leave flow cancelled");
                    LeaveReply::Cancelled
                }
            }
            LeaveState::Idle => LeaveReply::NotPending,
            _ => LeaveReply::Busy,
        }
    }

    /// Operator supplied the passphrase. A correct one runs the bulk leave;
    /// a wrong one cancels with no roster mutation.
    pub async fn passphrase(
        &self,
        operator_id: i64,
        input: &str,
    ) -> Result<LeaveReply, RelaycastError> {
        {
            let mut states = self.states.lock().await;
            match states.get(&operator_id).copied().unwrap_or_default() {
                LeaveState::AwaitingPassphrase => {
                    if input.trim() != self.passphrase {
                        states.remove(&operator_id);
                        info!(operator_id, "leave flow rejected: wrong passphrase");
                        return Ok(LeaveReply::Cancelled);
                    }
                    states.insert(operator_id, LeaveState::Executing);
                }
                LeaveState::Idle => return Ok(LeaveReply::NotPending),
                _ => return Ok(LeaveReply::Busy),
            }
        }

        // Lock released while the fan-out runs; the Executing marker keeps
        // this operator's flow busy until it completes.
        let result = self.execute().await;
        self.states.lock().await.remove(&operator_id);
        result.map(LeaveReply::Completed)
    }

    /// Leaves every active chat, marking each record left in the store
    /// before the leave request so a crash mid-run still leaves the roster
    /// consistent with intent.
    async fn execute(&self) -> Result<LeaveReport, RelaycastError> {
        let snapshot: Vec<ChatRecord> = self
            .roster
            .list_all()
            .await?
            .into_iter()
            .filter(|r| !r.chat_type.is_terminal())
            .collect();

        let total = snapshot.len();
        info!(chats = total, "bulk leave executing");

        let left = stream::iter(snapshot)
            .map(|chat| self.leave_one(chat))
            .buffer_unordered(self.max_concurrency)
            .filter(|ok| futures::future::ready(*ok))
            .count()
            .await;

        let report = LeaveReport {
            left,
            failed: total - left,
            total,
        };
        info!(left = report.left, failed = report.failed, "bulk leave complete");
        Ok(report)
    }

    async fn leave_one(&self, chat: ChatRecord) -> bool {
        // Mark first; the record must reflect intent even if the leave call
        // or the process dies.
        if let Err(e) = self
            .roster
            .update_fields(chat.id, &ChatPatch::chat_type(ChatType::Left))
            .await
        {
            warn!(chat_id = chat.id, error = %e, "failed to mark chat left");
            return false;
        }
        match self.messenger.leave_chat(chat.id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(chat_id = chat.id, error = %e, "leave request failed");
                false
            }
        }
    }
}
