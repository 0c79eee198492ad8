// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A project is the portable part of a review: the comment tree plus enough
//! media metadata to make sense of it. The media itself is referenced by
//! file name only and must be supplied again when a project is reopened.

use super::annotation::{Comment, CommentId};
use super::store::next_comment_id;
use crate::util::timecode::{Timecode, TimecodeMode, DEFAULT_FRAME_RATE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to a project before any media is loaded.
pub const UNTITLED_PROJECT: &str = "Untitled Project";

/// Complete project data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub project_name: String,
    pub media_filename: String,
    pub is_video: bool,
    pub comments: Vec<Comment>,
    pub frame_rate: f64,
    pub created_at: DateTime<Utc>,
    pub next_comment_id: CommentId,
}

impl ProjectData {
    /// Create an empty project for the given media file.
    pub fn new(media_filename: &str, is_video: bool) -> Self {
        Self {
            project_name: project_name_for(media_filename),
            media_filename: media_filename.to_string(),
            is_video,
            comments: Vec::new(),
            frame_rate: DEFAULT_FRAME_RATE,
            created_at: Utc::now(),
            next_comment_id: 1,
        }
    }

    pub fn timecode(&self) -> Timecode {
        Timecode::new(TimecodeMode::from_is_video(self.is_video), self.frame_rate)
    }
}

impl Default for ProjectData {
    fn default() -> Self {
        Self {
            project_name: UNTITLED_PROJECT.to_string(),
            ..Self::new("", true)
        }
    }
}

/// Project name derived from a media file name: everything before the
/// first `.`.
pub fn project_name_for(media_filename: &str) -> String {
    media_filename
        .split('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// The id to hand out next for a set of loaded comments: one past the
/// largest top-level id, or 1 when there are none.
pub fn derive_next_comment_id(comments: &[Comment]) -> CommentId {
    comments
        .iter()
        .map(|c| c.id)
        .max()
        .map_or(1, next_comment_id)
}
