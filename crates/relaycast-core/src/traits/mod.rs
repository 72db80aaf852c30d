// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by external collaborators.

pub mod adapter;
pub mod messenger;
pub mod roster;

pub use adapter::PluginAdapter;
pub use messenger::Messenger;
pub use roster::RosterStore;
