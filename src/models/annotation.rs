// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines comments, their replies and the freehand strokes that
//! can be attached to them. Field names serialize in camelCase so that
//! project files stay readable by existing review workflows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment identifier. Top-level comments use small sequential ids,
/// replies use wall-clock milliseconds.
pub type CommentId = u64;

/// Whether a point begins a new sub-path or continues the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Start,
    Line,
}

/// A single captured point of a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokePoint {
    #[serde(rename = "type")]
    pub kind: PointKind,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub line_width: f64,
}

impl StrokePoint {
    pub fn new(kind: PointKind, x: f64, y: f64, color: &str, line_width: f64) -> Self {
        Self {
            kind,
            x,
            y,
            color: color.to_string(),
            line_width,
        }
    }
}

/// A stroke is an ordered list of points.
pub type Stroke = Vec<StrokePoint>;

/// A timecoded comment; replies share the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub username: String,
    /// Position in the media, in seconds.
    #[serde(default)]
    pub timecode: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub replies: Vec<Comment>,
    #[serde(default)]
    pub done: bool,
    /// Media-normalized stroke.
    #[serde(default)]
    pub drawing: Option<Stroke>,
    #[serde(default)]
    pub line_width: Option<f64>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a comment without a drawing.
    pub fn new(id: CommentId, username: &str, timecode: f64, text: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            timecode,
            text: text.to_string(),
            replies: Vec::new(),
            done: false,
            drawing: None,
            line_width: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a normalized drawing. Empty strokes are not attached.
    pub fn with_drawing(mut self, drawing: Stroke, line_width: f64) -> Self {
        if !drawing.is_empty() {
            self.drawing = Some(drawing);
            self.line_width = Some(line_width);
        }
        self
    }

    pub fn has_drawing(&self) -> bool {
        self.drawing.as_ref().is_some_and(|d| !d.is_empty())
    }

    /// Count this comment and every reply below it.
    pub fn thread_len(&self) -> usize {
        1 + self.replies.iter().map(Comment::thread_len).sum::<usize>()
    }
}

/// Pick a marker colour for a user: the sum of the name's character codes
/// indexes a fixed six-colour palette.
pub fn username_color(username: &str) -> &'static str {
    const COLORS: [&str; 6] = [
        "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff",
    ];
    let hash: u64 = username.encode_utf16().map(u64::from).sum();
    COLORS[(hash % COLORS.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_drawing_ignores_empty_stroke() {
        let comment = Comment::new(1, "ana", 2.0, "hi").with_drawing(Vec::new(), 15.0);
        assert!(comment.drawing.is_none());
        assert!(comment.line_width.is_none());
    }

    #[test]
    fn test_reply_without_optional_fields_deserializes() {
        let json = r#"{"id":1717171717171,"username":"bo","timecode":3.5,
            "text":"ok","done":true,"createdAt":"2024-05-31T16:08:37.171Z"}"#;
        let reply: Comment = serde_json::from_str(json).unwrap();
        assert!(reply.replies.is_empty());
        assert!(reply.drawing.is_none());
        assert!(reply.done);
    }

    #[test]
    fn test_point_kind_serializes_as_type() {
        let point = StrokePoint::new(PointKind::Start, 1.0, 2.0, "#ff0000", 15.0);
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["lineWidth"], 15.0);
    }

    #[test]
    fn test_thread_len() {
        let mut root = Comment::new(1, "ana", 0.0, "a");
        let mut reply = Comment::new(2, "bo", 0.0, "b");
        reply.replies.push(Comment::new(3, "cy", 0.0, "c"));
        root.replies.push(reply);
        assert_eq!(root.thread_len(), 3);
    }

    #[test]
    fn test_username_color_is_stable() {
        // 'a' + 'b' = 97 + 98 = 195, 195 % 6 = 3
        assert_eq!(username_color("ab"), "#ffff00");
        assert_eq!(username_color(""), "#ff0000");
    }
}
