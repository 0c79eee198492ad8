// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Download file names.
//!
//! Saved projects are picked up by existing workflows by name, so these
//! patterns must not change:
//!
//! - manual save: `HH.MM.SS-<user> comments-<base>-MsMediaReview-<DD.MM.YYYY>.json`
//! - autosave: `HH.MM.SS-_Backup-<user> comments-<base>-MsMediaReview-<DD.MM.YYYY>-<H><M>.json`
//!
//! The autosave suffix uses unpadded hour and minute (`9:05` becomes `95`).

use chrono::{NaiveDateTime, Timelike};

/// Base name for downloads: the media file name without its last
/// extension, or the project name when no media file is known.
pub fn base_file_name(media_filename: &str, project_name: &str) -> String {
    if media_filename.is_empty() {
        return project_name.to_string();
    }
    match media_filename.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => String::new(),
    }
}

/// `HH.MM.SS-` prefix.
pub fn timestamp_prefix(now: NaiveDateTime) -> String {
    now.format("%H.%M.%S-").to_string()
}

/// `DD.MM.YYYY`.
fn date_stamp(now: NaiveDateTime) -> String {
    now.format("%d.%m.%Y").to_string()
}

/// Name for a manual project save.
pub fn save_file_name(
    username: &str,
    media_filename: &str,
    project_name: &str,
    now: NaiveDateTime,
) -> String {
    format!(
        "{}{} comments-{}-MsMediaReview-{}.json",
        timestamp_prefix(now),
        username,
        base_file_name(media_filename, project_name),
        date_stamp(now)
    )
}

/// Name for an autosave backup.
pub fn backup_file_name(
    username: &str,
    media_filename: &str,
    project_name: &str,
    now: NaiveDateTime,
) -> String {
    format!(
        "{}_Backup-{} comments-{}-MsMediaReview-{}-{}{}.json",
        timestamp_prefix(now),
        username,
        base_file_name(media_filename, project_name),
        date_stamp(now),
        now.hour(),
        now.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_save_file_name() {
        assert_eq!(
            save_file_name("ana", "final.cut.mp4", "final", at(14, 3, 9)),
            "14.03.09-ana comments-final.cut-MsMediaReview-07.03.2024.json"
        );
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(
            backup_file_name("ana", "clip.mov", "clip", at(9, 5, 0)),
            "09.05.00-_Backup-ana comments-clip-MsMediaReview-07.03.2024-95.json"
        );
    }

    #[test]
    fn test_base_file_name() {
        assert_eq!(base_file_name("", "Untitled Project"), "Untitled Project");
        assert_eq!(base_file_name("noext", "noext"), "");
        assert_eq!(base_file_name("a.b.wav", "a"), "a.b");
    }
}
