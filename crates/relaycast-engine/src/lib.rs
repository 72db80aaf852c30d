// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster reconciliation and fan-out broadcast engine.
//!
//! The engine consumes the [`relaycast_core::Messenger`] and
//! [`relaycast_core::RosterStore`] adapter traits and implements the bot's
//! behavior on top of them:
//!
//! - [`Reconciler`] keeps stored chat records consistent with observed
//!   platform reality (membership events, on-demand refresh).
//! - [`Broadcaster`] fans a single video out across the active roster with
//!   bounded concurrency and per-chat accounting.
//! - [`LeaveFlow`] drives the confirmed bulk "leave all chats" action.
//! - [`OperatorSessions`] gates broadcast commands behind a password.
//! - [`stats`] and [`report`] are pure functions over roster snapshots.

pub mod broadcast;
pub mod leave;
pub mod reconciler;
pub mod report;
pub mod sessions;
pub mod stats;

pub use broadcast::{BroadcastReport, Broadcaster};
pub use leave::{LeaveFlow, LeaveReply, LeaveReport, LeaveState};
pub use reconciler::{Reconciler, RefreshReport};
pub use sessions::OperatorSessions;
pub use stats::{aggregate, RosterStats, StatsFilter, TypeTally};
