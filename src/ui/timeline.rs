// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Progress bar with comment markers.
//!
//! Clicking or dragging the bar seeks. Each visible comment gets a marker
//! in its author's colour; clicking a marker jumps to that comment.

use super::hex_color;
use media_review::models::annotation::{username_color, CommentId};
use media_review::review::Review;

const BAR_HEIGHT: f32 = 18.0;
const MARKER_HIT_RADIUS: f32 = 5.0;

/// Result of timeline interaction.
pub enum TimelineAction {
    None,
    Seek(f64),
    JumpToComment(CommentId),
}

pub fn show(ui: &mut egui::Ui, review: &Review) -> TimelineAction {
    let mut action = TimelineAction::None;
    let playback = review.playback();

    let width = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(width, BAR_HEIGHT),
        egui::Sense::click_and_drag(),
    );
    let painter = ui.painter_at(rect);

    painter.rect_filled(rect, 3.0, egui::Color32::from_gray(60));
    let played = egui::Rect::from_min_size(
        rect.min,
        egui::vec2(rect.width() * playback.progress() as f32, rect.height()),
    );
    painter.rect_filled(played, 3.0, egui::Color32::from_rgb(70, 130, 200));

    let duration = playback.duration();
    let mut markers: Vec<(f32, CommentId)> = Vec::new();
    if duration > 0.0 {
        for comment in review.visible_comments() {
            let fraction = (comment.timecode / duration).clamp(0.0, 1.0) as f32;
            let x = rect.min.x + rect.width() * fraction;
            let color = hex_color(username_color(&comment.username));
            painter.line_segment(
                [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
                egui::Stroke::new(3.0, color),
            );
            markers.push((x, comment.id));
        }
    }

    let pointer_fraction = |pos: egui::Pos2| {
        f64::from(((pos.x - rect.min.x) / rect.width()).clamp(0.0, 1.0))
    };

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let hit = markers
                .iter()
                .find(|(x, _)| (x - pos.x).abs() <= MARKER_HIT_RADIUS);
            action = match hit {
                Some((_, id)) => TimelineAction::JumpToComment(*id),
                None => TimelineAction::Seek(pointer_fraction(pos)),
            };
        }
    } else if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            action = TimelineAction::Seek(pointer_fraction(pos));
        }
    }

    if let Some(pos) = response.hover_pos() {
        if duration > 0.0 {
            let time = review.format_time(pointer_fraction(pos) * duration);
            response.on_hover_text_at_pointer(time);
        }
    }

    action
}
