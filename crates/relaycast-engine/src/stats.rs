// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster statistics.
//!
//! A single pass folds the roster into a per-type tally of active and
//! inactive chats. Pure functions over a roster snapshot; the rendering for
//! the operator lives alongside so it can be tested without a messenger.

use std::collections::BTreeMap;

use relaycast_core::{ChatRecord, ChatType};

/// Which slice of the roster to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsFilter {
    #[default]
    All,
    /// Groups and supergroups only.
    Groups,
    /// Channels only.
    Channels,
}

impl StatsFilter {
    /// Parses an operator-supplied filter argument. Unknown arguments fall
    /// back to [`StatsFilter::All`] (informational, not an error).
    pub fn parse(arg: &str) -> Self {
        match arg.trim().to_ascii_lowercase().as_str() {
            "groups" | "group" => StatsFilter::Groups,
            "channels" | "channel" => StatsFilter::Channels,
            _ => StatsFilter::All,
        }
    }

    fn matches(self, chat_type: &ChatType) -> bool {
        match self {
            StatsFilter::All => true,
            StatsFilter::Groups => {
                matches!(chat_type, ChatType::Group | ChatType::Supergroup)
            }
            StatsFilter::Channels => matches!(chat_type, ChatType::Channel),
        }
    }
}

/// Active/inactive split for one chat type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeTally {
    pub active: usize,
    pub inactive: usize,
}

/// Aggregated roster statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterStats {
    /// Tally per stored chat-type string, ordered by type name.
    pub by_type: BTreeMap<String, TypeTally>,
    pub active: usize,
    pub inactive: usize,
    /// Sum of known member counts across active chats. The `-1` sentinel
    /// contributes nothing.
    pub total_members: i64,
    /// Sum of delivery counters across the selected slice.
    pub total_videos: i64,
}

/// Folds a roster snapshot into [`RosterStats`] in one pass.
///
/// Terminal records lose their structural type when they are reclassified,
/// so filtered views (`Groups`, `Channels`) only cover active chats;
/// [`StatsFilter::All`] additionally tallies terminal records under their
/// terminal marker.
pub fn aggregate(records: &[ChatRecord], filter: StatsFilter) -> RosterStats {
    records.iter().fold(RosterStats::default(), |mut stats, record| {
        let terminal = record.chat_type.is_terminal();
        let included = if terminal {
            filter == StatsFilter::All
        } else {
            filter.matches(&record.chat_type)
        };
        if !included {
            return stats;
        }

        let tally = stats.by_type.entry(record.chat_type.to_string()).or_default();
        if terminal {
            tally.inactive += 1;
            stats.inactive += 1;
        } else {
            tally.active += 1;
            stats.active += 1;
            if record.member_count > 0 {
                stats.total_members += record.member_count;
            }
        }
        stats.total_videos += record.videos_sent;
        stats
    })
}

/// Renders the statistics as the operator-facing summary text.
pub fn render(stats: &RosterStats) -> String {
    let mut out = format!(
        "Chats: {} active, {} inactive\nMembers reached: {}\nVideos delivered: {}\n",
        stats.active, stats.inactive, stats.total_members, stats.total_videos
    );
    for (chat_type, tally) in &stats.by_type {
        out.push_str(&format!(
            "  {chat_type}: {} active, {} inactive\n",
            tally.active, tally.inactive
        ));
    }
    out
}
