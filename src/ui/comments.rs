// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Comment list panel.
//!
//! This module provides the side panel for writing comments and working
//! through the review thread: replies, done flags, edits, deletes and
//! stored drawings.

use super::hex_color;
use media_review::models::annotation::{username_color, Comment, CommentId};
use media_review::models::store::{NodeRef, SortKey, SortOrder, ViewOptions};
use media_review::review::Review;
use media_review::util::timecode::Timecode;

/// Result of comment panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentAction {
    Commit,
    Activate(CommentId),
    ToggleDone(NodeRef),
    ToggleReply(CommentId),
    SubmitReply,
    Delete(NodeRef),
    ToggleDrawing(CommentId),
    EditText(NodeRef, String),
    EditTimecode(NodeRef, String),
    SetView(ViewOptions),
}

/// An edit form open on one node.
struct Edit {
    node: NodeRef,
    original_text: String,
    original_timecode: String,
    text: String,
    timecode: String,
}

/// Panel state that only the UI needs.
#[derive(Default)]
pub struct CommentsPanel {
    editing: Option<Edit>,
}

/// Per-frame facts every row needs, copied out of the review.
struct RowContext {
    username: String,
    timecode: Timecode,
    pending_delete: Option<CommentId>,
    reply_target: Option<CommentId>,
    selected: Option<CommentId>,
    displayed: Option<CommentId>,
}

pub fn show(ui: &mut egui::Ui, panel: &mut CommentsPanel, review: &mut Review) -> Vec<CommentAction> {
    let mut actions = Vec::new();

    let total: usize = review.store().comments().iter().map(Comment::thread_len).sum();
    ui.heading(format!("Comments ({})", total));
    ui.separator();

    // New comment
    let at = review.format_time(review.playback().current_time());
    let focus = review.take_focus_request();
    let input_id = egui::Id::new("comment_input");
    // Plain Enter posts; it must not reach the text edit as a newline
    let enter = ui.memory(|m| m.has_focus(input_id))
        && ui.input_mut(|i| {
            !i.modifiers.shift && i.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
        });
    let input = ui.add(
        egui::TextEdit::multiline(&mut review.comment_draft)
            .id(input_id)
            .hint_text("Add a comment (Enter to post, Shift+Enter for a new line)")
            .desired_rows(2)
            .desired_width(f32::INFINITY),
    );
    if focus {
        input.request_focus();
    }
    if enter {
        actions.push(CommentAction::Commit);
    }
    ui.horizontal(|ui| {
        let label = if review.drawing().has_stroke() {
            format!("Post with drawing at {}", at)
        } else {
            format!("Post at {}", at)
        };
        if ui.button(label).clicked() {
            actions.push(CommentAction::Commit);
        }
    });

    ui.separator();

    // Sort and filter
    let mut view = review.view_options();
    ui.horizontal(|ui| {
        let arrow = match view.order {
            SortOrder::Asc => "⬆",
            SortOrder::Desc => "⬇",
        };
        if ui.button(arrow).on_hover_text("Reverse order").clicked() {
            view.order = view.order.toggled();
        }
        egui::ComboBox::from_id_source("sort_key")
            .selected_text(match view.key {
                SortKey::Timecode => "By time",
                SortKey::Created => "By creation",
            })
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut view.key, SortKey::Timecode, "By time");
                ui.selectable_value(&mut view.key, SortKey::Created, "By creation");
            });
        ui.checkbox(&mut view.hide_done, "Hide done");
    });
    if view != review.view_options() {
        actions.push(CommentAction::SetView(view));
    }

    ui.separator();

    let context = RowContext {
        username: review.session.username.clone(),
        timecode: review.playback().timecode(),
        pending_delete: review.pending_delete(),
        reply_target: review.reply_target(),
        selected: review.selected(),
        displayed: review.drawing().displayed().map(|d| d.comment_id),
    };
    let comments: Vec<Comment> = review.visible_comments().into_iter().cloned().collect();

    egui::ScrollArea::vertical().show(ui, |ui| {
        if comments.is_empty() {
            ui.label(egui::RichText::new("No comments yet").italics().weak());
        }
        for comment in &comments {
            show_node(
                ui,
                comment,
                None,
                &context,
                panel,
                &mut review.reply_draft,
                &mut actions,
            );
        }
    });

    actions
}

fn show_node(
    ui: &mut egui::Ui,
    comment: &Comment,
    parent: Option<CommentId>,
    context: &RowContext,
    panel: &mut CommentsPanel,
    reply_draft: &mut String,
    actions: &mut Vec<CommentAction>,
) {
    let node = NodeRef {
        id: comment.id,
        parent,
    };

    let mut frame = egui::Frame::group(ui.style());
    if context.selected == Some(comment.id) {
        frame = frame.fill(ui.visuals().selection.bg_fill.gamma_multiply(0.3));
    }

    frame.show(ui, |ui| {
        ui.set_width(ui.available_width());

        ui.horizontal(|ui| {
            let mut done = comment.done;
            if ui.checkbox(&mut done, "").on_hover_text("Done").changed() {
                actions.push(CommentAction::ToggleDone(node));
            }
            ui.label(
                egui::RichText::new(&comment.username)
                    .strong()
                    .color(hex_color(username_color(&comment.username))),
            );
            let time = context.timecode.format(comment.timecode);
            if ui.link(egui::RichText::new(time).monospace()).clicked() {
                actions.push(CommentAction::Activate(comment.id));
            }
            if parent.is_none() {
                ui.label(egui::RichText::new(format!("#{:04}", comment.id)).weak());
            }
        });

        let editing = panel.editing.as_ref().is_some_and(|e| e.node == node);
        if editing {
            show_edit_form(ui, panel, actions);
        } else {
            let mut text = egui::RichText::new(&comment.text);
            if comment.done {
                text = text.strikethrough().weak();
            }
            ui.label(text);
        }

        ui.horizontal(|ui| {
            if ui.small_button("Reply").clicked() {
                actions.push(CommentAction::ToggleReply(comment.id));
            }
            if comment.username == context.username && !editing && ui.small_button("Edit").clicked() {
                let timecode = context.timecode.format(comment.timecode);
                panel.editing = Some(Edit {
                    node,
                    original_text: comment.text.clone(),
                    original_timecode: timecode.clone(),
                    text: comment.text.clone(),
                    timecode,
                });
            }
            let delete_label = if context.pending_delete == Some(comment.id) {
                egui::RichText::new("Confirm delete").color(egui::Color32::LIGHT_RED)
            } else {
                egui::RichText::new("Delete")
            };
            if ui.small_button(delete_label).clicked() {
                actions.push(CommentAction::Delete(node));
            }
            if comment.has_drawing() {
                let label = if context.displayed == Some(comment.id) {
                    "Hide Drawing"
                } else {
                    "View Drawing"
                };
                if ui.small_button(label).clicked() {
                    actions.push(CommentAction::ToggleDrawing(comment.id));
                }
            }
        });

        if context.reply_target == Some(comment.id) {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(reply_draft)
                        .hint_text("Write a reply")
                        .desired_width(ui.available_width() - 60.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Send").clicked() || submitted {
                    actions.push(CommentAction::SubmitReply);
                }
            });
        }

        if !comment.replies.is_empty() {
            ui.indent(("replies", comment.id), |ui| {
                for reply in &comment.replies {
                    show_node(
                        ui,
                        reply,
                        Some(comment.id),
                        context,
                        panel,
                        reply_draft,
                        actions,
                    );
                }
            });
        }
    });
}

fn show_edit_form(ui: &mut egui::Ui, panel: &mut CommentsPanel, actions: &mut Vec<CommentAction>) {
    let Some(edit) = panel.editing.as_mut() else {
        return;
    };
    let mut close = false;

    ui.add(egui::TextEdit::multiline(&mut edit.text).desired_rows(2));
    ui.horizontal(|ui| {
        ui.label("Time:");
        ui.add(egui::TextEdit::singleline(&mut edit.timecode).desired_width(110.0));
        if ui.button("Save").clicked() {
            // Reparsing an untouched timecode would snap it to a frame
            if edit.text != edit.original_text {
                actions.push(CommentAction::EditText(edit.node, edit.text.clone()));
            }
            if edit.timecode != edit.original_timecode {
                actions.push(CommentAction::EditTimecode(edit.node, edit.timecode.clone()));
            }
            close = true;
        }
        if ui.button("Cancel").clicked() {
            close = true;
        }
    });

    if close {
        panel.editing = None;
    }
}
