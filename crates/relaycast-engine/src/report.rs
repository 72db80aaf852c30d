// SPDX-FileCopyrightText: 2026 Relaycast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Roster export.
//!
//! Pure formatting over a roster snapshot: one CSV row per chat, with an
//! explicit active/inactive status column so spreadsheet tooling can color
//! rows without re-deriving the terminal markers.

use relaycast_core::{ChatRecord, RelaycastError};

/// Default filename for the exported report.
pub const EXPORT_FILENAME: &str = "roster.csv";

/// Serializes the roster snapshot to CSV bytes.
pub fn roster_csv(records: &[ChatRecord]) -> Result<Vec<u8>, RelaycastError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "id",
            "title",
            "members",
            "videos_sent",
            "date_added",
            "type",
            "link",
            "status",
        ])
        .map_err(csv_err)?;

    for record in records {
        let status = if record.chat_type.is_terminal() {
            "inactive"
        } else {
            "active"
        };
        writer
            .write_record([
                record.id.to_string(),
                record.title.clone(),
                record.member_count.to_string(),
                record.videos_sent.to_string(),
                record.date_added.clone(),
                record.chat_type.to_string(),
                record.link.clone(),
                status.to_string(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| RelaycastError::Internal(format!("csv flush failed: {e}")))
}

fn csv_err(e: csv::Error) -> RelaycastError {
    RelaycastError::Internal(format!("csv write failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaycast_core::ChatType;

    fn make_record(id: i64, title: &str, chat_type: ChatType) -> ChatRecord {
        ChatRecord {
            id,
            title: title.to_string(),
            member_count: 42,
            videos_sent: 3,
            date_added: "2026-01-01T00:00:00Z".to_string(),
            chat_type,
            link: "https://t.me/example".to_string(),
        }
    }

    #[test]
    fn exports_header_and_rows() {
        let roster = vec![
            make_record(1, "Alpha", ChatType::Group),
            make_record(2, "Beta", ChatType::Left),
        ];
        let bytes = roster_csv(&roster).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "id,title,members,videos_sent,date_added,type,link,status"
        );
        assert!(lines[1].starts_with("1,Alpha,42,3,"));
        assert!(lines[1].ends_with(",active"));
        assert!(lines[2].ends_with(",inactive"));
    }

    #[test]
    fn empty_roster_exports_header_only() {
        let bytes = roster_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn titles_with_commas_are_quoted() {
        let roster = vec![make_record(1, "News, Weather", ChatType::Channel)];
        let bytes = roster_csv(&roster).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"News, Weather\""));
    }
}
