// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transport and drawing toolbar.
//!
//! This module provides the playback controls (transport, speed, volume)
//! and the pen controls for drawing on the frame.

use media_review::review::{Action, Review};

/// Display the toolbar. Returns the action picked this frame, if any.
pub fn show(ui: &mut egui::Ui, review: &Review) -> Option<Action> {
    let mut action = None;
    let playback = review.playback();
    let has_media = playback.has_media();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.add_enabled_ui(has_media, |ui| {
            let step = if playback.is_video() { "frame" } else { "ms" };
            if ui.button("⏮").on_hover_text(format!("Back one {}", step)).clicked() {
                action = Some(Action::FrameStep(-1));
            }
            if ui.button("⏪").on_hover_text("Skip back (←)").clicked() {
                action = Some(Action::SkipBackward);
            }
            let play_label = if playback.is_playing() { "⏸" } else { "▶" };
            if ui.button(play_label).on_hover_text("Play/Pause (Space)").clicked() {
                action = Some(Action::PlayPause);
            }
            if ui.button("⏩").on_hover_text("Skip forward (→)").clicked() {
                action = Some(Action::SkipForward);
            }
            if ui.button("⏭").on_hover_text(format!("Forward one {}", step)).clicked() {
                action = Some(Action::FrameStep(1));
            }
        });

        ui.label(
            egui::RichText::new(format!(
                "{} / {}",
                review.format_time(playback.current_time()),
                review.format_time(playback.duration())
            ))
            .monospace(),
        );

        ui.separator();

        // Playback speed
        let mut rate = playback.rate();
        egui::ComboBox::from_id_source("playback_speed")
            .width(60.0)
            .selected_text(format!("{}x", rate))
            .show_ui(ui, |ui| {
                for speed in &review.config().playback_speeds {
                    ui.selectable_value(&mut rate, *speed, format!("{}x", speed));
                }
            });
        if rate != playback.rate() {
            action = Some(Action::SetRate(rate));
        }

        // Volume
        let mute_label = if playback.is_muted() { "🔇" } else { "🔊" };
        if ui.button(mute_label).on_hover_text("Mute").clicked() {
            action = Some(Action::ToggleMute);
        }
        let mut volume = playback.volume();
        if ui
            .add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false))
            .changed()
        {
            action = Some(Action::SetVolume(volume));
        }

        ui.separator();

        // Pen
        let drawing = review.drawing();
        if ui
            .selectable_label(drawing.is_drawing_mode(), "✏ Draw")
            .on_hover_text("Draw on the frame; the stroke is attached to the next comment")
            .clicked()
        {
            action = Some(Action::ToggleDrawingMode);
        }
        if review.config().line_width_adjustable {
            let mut width = drawing.line_width();
            if ui
                .add(egui::Slider::new(&mut width, 1.0..=50.0).text("Width"))
                .changed()
            {
                action = Some(Action::SetLineWidth(width));
            }
        }
        if ui
            .add_enabled(drawing.has_stroke(), egui::Button::new("↶"))
            .on_hover_text("Undo (Ctrl+Z)")
            .clicked()
        {
            action = Some(Action::UndoStroke);
        }
        if ui
            .add_enabled(!drawing.undo_stack().is_empty(), egui::Button::new("↷"))
            .on_hover_text("Redo (Ctrl+Shift+Z)")
            .clicked()
        {
            action = Some(Action::RedoStroke);
        }

        ui.separator();

        let fullscreen = if review.is_fullscreen() { "Exit fullscreen" } else { "⛶" };
        if ui.button(fullscreen).on_hover_text("Fullscreen (F11)").clicked() {
            action = Some(Action::ToggleFullscreen);
        }

        if drawing.is_drawing_mode() {
            ui.label(
                egui::RichText::new("Drag to draw, Enter to attach to a comment, Esc to discard")
                    .italics()
                    .weak(),
            );
        }
    });

    action
}
