// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update routing and event extraction.
//!
//! Translates raw Telegram updates into the channel-agnostic [`BotEvent`]s
//! the engine consumes: membership changes for the bot itself, and operator
//! DMs carrying videos or text commands.

use relaycast_core::types::{BotEvent, ChatType, MembershipChange, VideoAsset};
use teloxide::prelude::*;
use teloxide::types::{Chat, ChatKind, ChatMemberStatus, ChatMemberUpdated};

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Maps a chat's structural kind onto the roster enumeration.
pub fn structural_kind(chat: &Chat) -> ChatType {
    if chat.is_channel() {
        ChatType::Channel
    } else if chat.is_supergroup() {
        ChatType::Supergroup
    } else if chat.is_group() {
        ChatType::Group
    } else if chat.is_private() {
        ChatType::Private
    } else {
        ChatType::Unknown
    }
}

/// Converts a `my_chat_member` update into a [`MembershipChange`].
///
/// Active statuses (member, administrator, owner, restricted) map to the
/// chat's structural kind; `left` and `banned` map to the terminal markers.
pub fn membership_change(update: &ChatMemberUpdated) -> MembershipChange {
    let new_status = match update.new_chat_member.status() {
        ChatMemberStatus::Left => ChatType::Left,
        ChatMemberStatus::Banned => ChatType::Kicked,
        _ => structural_kind(&update.chat),
    };

    MembershipChange {
        chat_id: update.chat.id.0,
        title: update.chat.title().map(str::to_owned),
        username: update.chat.username().map(str::to_owned),
        new_status,
    }
}

/// Extracts an operator event from a DM, if the message carries one.
///
/// Non-DM messages and messages without a sender produce nothing; so do
/// message types the bot has no use for (stickers, photos, locations).
pub fn extract_event(msg: &Message) -> Option<BotEvent> {
    if !is_dm(msg) {
        return None;
    }
    let operator_id = msg.from.as_ref()?.id.0 as i64;

    if let Some(video) = msg.video() {
        return Some(BotEvent::VideoReceived {
            operator_id,
            asset: VideoAsset {
                file_id: video.file.id.to_string(),
                caption: msg.caption().map(str::to_owned),
            },
        });
    }

    if let Some(text) = msg.text() {
        return Some(BotEvent::TextReceived {
            operator_id,
            text: text.to_string(),
        });
    }

    None
}
