// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media display and drawing surface.
//!
//! The canvas covers the whole central area. Media content is letterboxed
//! inside it and the drawing overlay uses canvas-local pixels, so strokes
//! line up with the media however the window is sized.

use super::hex_color;
use media_review::models::drawing::{StrokeStyle, Surface};
use media_review::review::Review;
use media_review::util::geometry::content_rect;

/// [`Surface`] backed by an egui painter clipped to the canvas.
///
/// egui repaints from scratch every frame, so there is nothing to clear.
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    rect: egui::Rect,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, rect: egui::Rect) -> Self {
        Self { painter, rect }
    }

    fn to_screen(&self, (x, y): (f64, f64)) -> egui::Pos2 {
        self.rect.min + egui::vec2(x as f32, y as f32)
    }
}

impl Surface for PainterSurface<'_> {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.rect.width()), f64::from(self.rect.height()))
    }

    fn clear(&mut self) {}

    fn stroke_paths(&mut self, paths: &[Vec<(f64, f64)>], style: &StrokeStyle) {
        let color = hex_color(&style.color);
        let width = style.width as f32;
        let stroke = egui::Stroke::new(width, color);

        for path in paths {
            let points: Vec<egui::Pos2> = path.iter().map(|p| self.to_screen(*p)).collect();
            if points.len() > 1 {
                self.painter.add(egui::Shape::line(points.clone(), stroke));
            }
            // Round caps and joins
            for point in points {
                self.painter.circle_filled(point, width / 2.0, color);
            }
        }
    }
}

/// Display the media area, route pointer input to the drawing engine and
/// paint the current stroke.
pub fn show(ui: &mut egui::Ui, review: &mut Review) {
    let (rect, response) =
        ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

    review
        .drawing_mut()
        .resize(f64::from(rect.width()), f64::from(rect.height()));

    if review.playback().has_media() {
        draw_media(&painter, rect, review);
    } else {
        draw_welcome(&painter, rect);
    }

    if review.drawing().is_drawing_mode() {
        let local = |pos: egui::Pos2| {
            let offset = pos - rect.min;
            (f64::from(offset.x), f64::from(offset.y))
        };

        if response.drag_started() {
            let origin = ui.input(|i| i.pointer.press_origin());
            if let Some(pos) = origin.or(response.interact_pointer_pos()) {
                let (x, y) = local(pos);
                review.drawing_mut().begin_stroke(x, y);
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = local(pos);
                review.drawing_mut().extend_stroke(x, y);
            }
        } else if response.clicked() {
            // A click without movement leaves a dot
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = local(pos);
                review.drawing_mut().begin_stroke(x, y);
                review.drawing_mut().end_stroke();
            }
        }
        if response.drag_stopped() {
            review.drawing_mut().end_stroke();
        }
        response.on_hover_cursor(egui::CursorIcon::Crosshair);
    }

    let mut surface = PainterSurface::new(&painter, rect);
    review
        .drawing()
        .render(&mut surface, review.playback().dimensions());
}

fn draw_media(painter: &egui::Painter, rect: egui::Rect, review: &Review) {
    let playback = review.playback();
    let size = (f64::from(rect.width()), f64::from(rect.height()));

    // Stand-in for the decoded frame: the letterboxed content area
    let frame = content_rect(playback.dimensions(), size.0, size.1)
        .map(|c| {
            egui::Rect::from_min_size(
                rect.min + egui::vec2(c.x as f32, c.y as f32),
                egui::vec2(c.width as f32, c.height as f32),
            )
        })
        .unwrap_or(rect);
    painter.rect_filled(frame, 0.0, egui::Color32::BLACK);

    let title = if playback.is_video() {
        review.media_filename().to_string()
    } else {
        format!("♪ {}", review.media_filename())
    };
    painter.text(
        frame.center() - egui::vec2(0.0, 24.0),
        egui::Align2::CENTER_CENTER,
        title,
        egui::FontId::proportional(18.0),
        egui::Color32::from_gray(150),
    );
    painter.text(
        frame.center() + egui::vec2(0.0, 12.0),
        egui::Align2::CENTER_CENTER,
        review.format_time(playback.current_time()),
        egui::FontId::monospace(32.0),
        egui::Color32::from_gray(220),
    );
}

fn draw_welcome(painter: &egui::Painter, rect: egui::Rect) {
    painter.text(
        rect.center() - egui::vec2(0.0, 30.0),
        egui::Align2::CENTER_CENTER,
        "Media Review",
        egui::FontId::proportional(32.0),
        egui::Color32::from_gray(200),
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 10.0),
        egui::Align2::CENTER_CENTER,
        "Open a video or audio file to begin reviewing",
        egui::FontId::proportional(14.0),
        egui::Color32::from_gray(180),
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 34.0),
        egui::Align2::CENTER_CENTER,
        "File → Open Media... or drop a file here",
        egui::FontId::proportional(12.0),
        egui::Color32::from_gray(130),
    );
}
