// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project data serialization and deserialization.
//!
//! This module handles exporting and importing project data in JSON (the
//! download format) and YAML, and rendering comments as an EDL.
//!
//! Reading is lenient: only a document that does not parse at all is an
//! error. Missing fields take defaults and individual comments that do not
//! fit the comment shape are skipped with a warning.

use crate::models::annotation::Comment;
use crate::models::project::{derive_next_comment_id, ProjectData, UNTITLED_PROJECT};
use crate::models::store::{sorted_view, ViewOptions};
use crate::util::timecode::{Timecode, DEFAULT_FRAME_RATE};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// Errors from reading or writing project files.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// The document could not be parsed at all.
    #[error("Malformed project: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not encode project: {0}")]
    Encode(String),

    #[error("Unsupported file extension: {0:?}")]
    UnsupportedFormat(Option<String>),
}

/// On-disk project formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectFormat {
    Json,
    Yaml,
}

impl ProjectFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ProjectError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(ProjectFormat::Json),
            Some("yaml") | Some("yml") => Ok(ProjectFormat::Yaml),
            _ => Err(ProjectError::UnsupportedFormat(extension)),
        }
    }
}

/// Render a project as pretty-printed JSON, stamped with the current time.
pub fn to_document(project: &ProjectData) -> Result<String, ProjectError> {
    serde_json::to_string_pretty(&stamped(project))
        .map_err(|e| ProjectError::Encode(e.to_string()))
}

/// Render a project as YAML, stamped with the current time.
pub fn to_yaml(project: &ProjectData) -> Result<String, ProjectError> {
    serde_yaml::to_string(&stamped(project)).map_err(|e| ProjectError::Encode(e.to_string()))
}

/// Parse a JSON project document.
pub fn from_document(text: &str) -> Result<ProjectData, ProjectError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProjectError::Malformed(e.to_string()))?;
    from_value(value)
}

/// Parse a YAML project document.
pub fn from_yaml(text: &str) -> Result<ProjectData, ProjectError> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| ProjectError::Malformed(e.to_string()))?;
    from_value(value)
}

/// Export project data to a file; the format follows the extension.
pub fn export_project(project: &ProjectData, path: &Path) -> Result<(), ProjectError> {
    let text = match ProjectFormat::from_path(path)? {
        ProjectFormat::Json => to_document(project)?,
        ProjectFormat::Yaml => to_yaml(project)?,
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Import project data from a file; the format follows the extension.
pub fn import_project(path: &Path) -> Result<ProjectData, ProjectError> {
    let format = ProjectFormat::from_path(path)?;
    let text = std::fs::read_to_string(path)?;
    match format {
        ProjectFormat::Json => from_document(&text),
        ProjectFormat::Yaml => from_yaml(&text),
    }
}

/// Render comments as a CMX3600-style edit decision list.
///
/// Events follow the display order given by `options`; the comment's
/// timecode fills all four timecode columns.
pub fn to_edl(
    comments: &[Comment],
    project_name: &str,
    timecode: Timecode,
    options: &ViewOptions,
) -> String {
    let mut lines = vec![
        format!("TITLE: {}", project_name),
        "FCM: NON-DROP FRAME".to_string(),
    ];

    for (index, comment) in sorted_view(comments, options).iter().enumerate() {
        let tc = timecode.format(comment.timecode);
        lines.push(format!(
            "{}  AX       V     C        {} {} {} {}",
            index + 1,
            tc,
            tc,
            tc,
            tc
        ));
        lines.push(format!("* COMMENT: ID-{:04}: {}", comment.id, comment.text));
    }

    lines.join("\n")
}

/// File name offered for an EDL download.
pub fn edl_file_name(project_name: &str) -> String {
    format!("{}_comments_export.edl", project_name)
}

fn stamped(project: &ProjectData) -> ProjectData {
    ProjectData {
        created_at: Utc::now(),
        ..project.clone()
    }
}

fn from_value(value: Value) -> Result<ProjectData, ProjectError> {
    let Value::Object(fields) = value else {
        return Err(ProjectError::Malformed(
            "expected an object at the top level".to_string(),
        ));
    };

    let comments = read_comments(&fields);
    let next_comment_id = fields
        .get("nextCommentId")
        .and_then(Value::as_u64)
        .filter(|id| *id > 0)
        .unwrap_or_else(|| derive_next_comment_id(&comments));

    Ok(ProjectData {
        project_name: string_field(&fields, "projectName")
            .unwrap_or_else(|| UNTITLED_PROJECT.to_string()),
        media_filename: string_field(&fields, "mediaFilename").unwrap_or_default(),
        is_video: fields
            .get("isVideo")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        frame_rate: fields
            .get("frameRate")
            .and_then(Value::as_f64)
            .filter(|rate| *rate > 0.0 && rate.is_finite())
            .unwrap_or(DEFAULT_FRAME_RATE),
        created_at: string_field(&fields, "createdAt")
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now),
        comments,
        next_comment_id,
    })
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}

fn read_comments(fields: &Map<String, Value>) -> Vec<Comment> {
    let Some(Value::Array(items)) = fields.get("comments") else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match Comment::deserialize(item) {
            Ok(comment) => Some(comment),
            Err(e) => {
                log::warn!("Skipping malformed comment at index {}: {}", index, e);
                None
            }
        })
        .collect()
}
