// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The comment tree and every operation that changes it.
//!
//! All writes to the comment tree go through [`AnnotationStore`]. Each
//! operation either applies completely or leaves the tree untouched, and
//! reports which of the two happened. Rejected intents (blank text, unknown
//! id, too deep) are not errors.

use super::annotation::{Comment, CommentId, Stroke};
use chrono::Utc;

/// Largest id handed to a top-level comment before wrapping back to 1.
pub const MAX_COMMENT_ID: CommentId = 9999;

/// Replies nest at most this many levels below a top-level comment.
pub const MAX_REPLY_DEPTH: usize = 10;

/// Addresses one node in the tree.
///
/// A top-level comment has no parent. A reply is found through the id of
/// the comment it was posted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef {
    pub id: CommentId,
    pub parent: Option<CommentId>,
}

impl NodeRef {
    pub fn top(id: CommentId) -> Self {
        Self { id, parent: None }
    }

    pub fn reply(id: CommentId, parent: CommentId) -> Self {
        Self {
            id,
            parent: Some(parent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Timecode,
    Created,
}

/// How top-level comments are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    pub key: SortKey,
    pub order: SortOrder,
    pub hide_done: bool,
}

impl ViewOptions {
    pub fn new(order: SortOrder, hide_done: bool) -> Self {
        Self {
            key: SortKey::Timecode,
            order,
            hide_done,
        }
    }
}

/// What a delete request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// First request for this id; waiting for confirmation.
    Armed,
    /// Second request; the node is gone.
    Deleted,
    /// Confirmed, but the node no longer exists.
    Missing,
}

/// A new reply before it is placed in the tree.
#[derive(Debug, Clone)]
pub struct ReplyDraft<'a> {
    pub text: &'a str,
    pub username: &'a str,
    /// Explicit timecode. `None` inherits the timecode of the comment being
    /// replied to.
    pub timecode: Option<f64>,
}

/// Owns the comment forest and the id counter.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    comments: Vec<Comment>,
    next_id: CommentId,
    pending_delete: Option<CommentId>,
    last_reply_id: CommentId,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::with_comments(Vec::new(), 1)
    }

    pub fn with_comments(comments: Vec<Comment>, next_id: CommentId) -> Self {
        Self {
            comments,
            next_id,
            pending_delete: None,
            last_reply_id: 0,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn next_id(&self) -> CommentId {
        self.next_id
    }

    /// Restart numbering, as happens when new media is loaded.
    pub fn reset_next_id(&mut self) {
        self.next_id = 1;
    }

    /// Replace the whole tree at once, e.g. after loading a project.
    pub fn replace(&mut self, comments: Vec<Comment>, next_id: CommentId) {
        self.comments = comments;
        self.next_id = next_id;
        self.pending_delete = None;
    }

    /// Find a node anywhere in the tree (depth-first, first match wins).
    pub fn find(&self, id: CommentId) -> Option<&Comment> {
        find_in(&self.comments, id, 0)
    }

    /// Add a top-level comment and advance the id counter.
    ///
    /// Rejected when the text is blank and there is no drawing.
    pub fn add_comment(
        &mut self,
        text: &str,
        timecode: f64,
        username: &str,
        drawing: Option<(Stroke, f64)>,
    ) -> Option<CommentId> {
        let drawing = drawing.filter(|(stroke, _)| !stroke.is_empty());
        if text.trim().is_empty() && drawing.is_none() {
            return None;
        }

        let id = self.next_id;
        let mut comment = Comment::new(id, username, timecode, text);
        if let Some((stroke, line_width)) = drawing {
            comment = comment.with_drawing(stroke, line_width);
        }

        self.comments.push(comment);
        self.next_id = next_comment_id(id);
        log::info!("Added comment #{:04}, total: {}", id, self.comments.len());
        Some(id)
    }

    /// Append a reply beneath `target`, wherever it is in the tree.
    ///
    /// Rejected when the text is blank, the target is unknown, or the target
    /// already sits at [`MAX_REPLY_DEPTH`].
    pub fn add_reply(&mut self, target: CommentId, draft: ReplyDraft<'_>) -> Option<CommentId> {
        if draft.text.trim().is_empty() {
            return None;
        }

        let id = self.reply_id();
        let mut reply = Comment::new(id, draft.username, draft.timecode.unwrap_or(0.0), draft.text);
        let inherit = draft.timecode.is_none();

        let inserted = insert_reply(&mut self.comments, target, 0, &mut |parent: &mut Comment| {
            if inherit {
                reply.timecode = parent.timecode;
            }
            parent.replies.push(reply.clone());
        });

        if inserted {
            self.last_reply_id = id;
            log::info!("Added reply {} to comment {}", id, target);
            Some(id)
        } else {
            log::debug!("Reply target {} not found within depth bound", target);
            None
        }
    }

    /// Flip `done` on the addressed node only.
    pub fn toggle_done(&mut self, node: NodeRef) -> bool {
        self.update(node, |comment| comment.done = !comment.done)
    }

    pub fn edit_text(&mut self, node: NodeRef, text: &str) -> bool {
        self.update(node, |comment| comment.text = text.to_string())
    }

    /// Set the timecode of a node to an already-parsed value.
    ///
    /// Non-finite or negative values are discarded and the prior value kept.
    pub fn edit_timecode(&mut self, node: NodeRef, seconds: f64) -> bool {
        if !seconds.is_finite() || seconds < 0.0 {
            log::warn!("Discarding timecode edit for {}: {}", node.id, seconds);
            return false;
        }
        self.update(node, |comment| comment.timecode = seconds)
    }

    /// Two-phase delete. The first call for an id arms it; a second call
    /// for the same id removes the node. Arming a different id disarms the
    /// previous one.
    pub fn delete(&mut self, node: NodeRef) -> DeleteOutcome {
        if self.pending_delete != Some(node.id) {
            self.pending_delete = Some(node.id);
            return DeleteOutcome::Armed;
        }

        self.pending_delete = None;
        let removed = match node.parent {
            None => {
                let before = self.comments.len();
                self.comments.retain(|c| c.id != node.id);
                self.comments.len() != before
            }
            Some(parent) => with_node(&mut self.comments, parent, 0, &mut |p: &mut Comment| {
                let before = p.replies.len();
                p.replies.retain(|r| r.id != node.id);
                p.replies.len() != before
            })
            .unwrap_or(false),
        };

        if removed {
            log::info!("Deleted comment {}", node.id);
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::Missing
        }
    }

    /// The id waiting for delete confirmation, if any.
    pub fn pending_delete(&self) -> Option<CommentId> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    fn update(&mut self, node: NodeRef, mut apply: impl FnMut(&mut Comment)) -> bool {
        let found = match node.parent {
            None => self
                .comments
                .iter_mut()
                .find(|c| c.id == node.id)
                .map(|c| apply(c))
                .is_some(),
            Some(parent) => with_node(&mut self.comments, parent, 0, &mut |p: &mut Comment| {
                p.replies
                    .iter_mut()
                    .find(|r| r.id == node.id)
                    .map(|r| apply(r))
                    .is_some()
            })
            .unwrap_or(false),
        };

        if !found {
            log::debug!("No comment {:?} to update", node);
        }
        found
    }

    /// Wall-clock based reply id, bumped if the clock has not moved since
    /// the previous reply.
    fn reply_id(&self) -> CommentId {
        let now = Utc::now().timestamp_millis().max(0) as CommentId;
        now.max(self.last_reply_id + 1)
    }
}

/// The id after `id`, wrapping from [`MAX_COMMENT_ID`] back to 1.
pub fn next_comment_id(id: CommentId) -> CommentId {
    if id >= MAX_COMMENT_ID {
        1
    } else {
        id + 1
    }
}

/// Top-level comments in display order.
///
/// Done comments are dropped when `hide_done` is set. Replies are never
/// filtered or reordered. The sort is stable, so equal keys keep their
/// insertion order.
pub fn sorted_view<'a>(comments: &'a [Comment], options: &ViewOptions) -> Vec<&'a Comment> {
    let mut view: Vec<&Comment> = comments
        .iter()
        .filter(|c| !(options.hide_done && c.done))
        .collect();

    view.sort_by(|a, b| {
        let ordering = match options.key {
            SortKey::Timecode => a.timecode.total_cmp(&b.timecode),
            SortKey::Created => a.created_at.cmp(&b.created_at),
        };
        match options.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    view
}

fn find_in(nodes: &[Comment], id: CommentId, depth: usize) -> Option<&Comment> {
    if depth > MAX_REPLY_DEPTH {
        return None;
    }
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.replies, id, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// Run `apply` on the first node with `id` at depth `0..=MAX_REPLY_DEPTH`.
fn with_node<R>(
    nodes: &mut [Comment],
    id: CommentId,
    depth: usize,
    apply: &mut dyn FnMut(&mut Comment) -> R,
) -> Option<R> {
    if depth > MAX_REPLY_DEPTH {
        return None;
    }
    for node in nodes.iter_mut() {
        if node.id == id {
            return Some(apply(node));
        }
        if let Some(result) = with_node(&mut node.replies, id, depth + 1, apply) {
            return Some(result);
        }
    }
    None
}

/// Like [`with_node`] but only for targets that can still take a reply.
fn insert_reply(
    nodes: &mut [Comment],
    target: CommentId,
    depth: usize,
    push: &mut dyn FnMut(&mut Comment),
) -> bool {
    if depth >= MAX_REPLY_DEPTH {
        return false;
    }
    for node in nodes.iter_mut() {
        if node.id == target {
            push(node);
            return true;
        }
        if insert_reply(&mut node.replies, target, depth + 1, push) {
            return true;
        }
    }
    false
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}
