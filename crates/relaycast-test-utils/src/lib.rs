// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Relaycast integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests
//! without a live Telegram connection or an on-disk database.
//!
//! # Components
//!
//! - [`MockMessenger`] - Mock messenger with scriptable per-chat failures and call capture
//! - [`MemoryRoster`] - In-memory roster store with the same contract as the SQLite store

pub mod memory_roster;
pub mod mock_messenger;

pub use memory_roster::MemoryRoster;
pub use mock_messenger::MockMessenger;
