// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Freehand drawing state.
//!
//! The engine keeps the stroke being drawn in surface pixels, a stack of
//! points removed by undo, and optionally a committed (media-normalized)
//! stroke picked for display. Rendering is stateless: every call clears the
//! surface and paints the whole stroke again.

use super::annotation::{CommentId, PointKind, Stroke, StrokePoint};
use crate::util::geometry::{denormalize_stroke, normalize_stroke, MediaDimensions};

/// Default pen colour.
pub const DEFAULT_STROKE_COLOR: &str = "#ff0000";

/// Default pen width in surface pixels.
pub const DEFAULT_LINE_WIDTH: f64 = 15.0;

/// Pen settings shared by every point of one stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
}

/// A 2D target the engine can paint on.
///
/// Implementations must draw with round line caps and round line joins so
/// that consecutive segments read as one continuous line.
pub trait Surface {
    /// Current size in pixels.
    fn size(&self) -> (f64, f64);

    fn clear(&mut self);

    /// Stroke each sub-path as a connected polyline.
    fn stroke_paths(&mut self, paths: &[Vec<(f64, f64)>], style: &StrokeStyle);
}

/// A committed stroke picked for viewing.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedStroke {
    pub comment_id: CommentId,
    pub stroke: Stroke,
    pub line_width: Option<f64>,
}

/// In-progress stroke plus undo state.
#[derive(Debug, Clone)]
pub struct DrawingEngine {
    drawing_mode: bool,
    pointer_down: bool,
    active: Stroke,
    undo_stack: Stroke,
    displayed: Option<DisplayedStroke>,
    color: String,
    line_width: f64,
    surface_size: (f64, f64),
}

impl Default for DrawingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_STROKE_COLOR, DEFAULT_LINE_WIDTH)
    }
}

impl DrawingEngine {
    pub fn new(color: &str, line_width: f64) -> Self {
        Self {
            drawing_mode: false,
            pointer_down: false,
            active: Vec::new(),
            undo_stack: Vec::new(),
            displayed: None,
            color: color.to_string(),
            line_width,
            surface_size: (0.0, 0.0),
        }
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    /// Enter or leave drawing mode. Leaving discards the in-progress stroke
    /// and the undo stack.
    pub fn set_drawing_mode(&mut self, enabled: bool) {
        self.drawing_mode = enabled;
        if !enabled {
            self.discard();
        }
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    /// Applies to strokes started after the change.
    pub fn set_line_width(&mut self, width: f64) {
        if width > 0.0 && width.is_finite() {
            self.line_width = width;
        }
    }

    /// Record the latest surface size; commits normalize against it.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.surface_size = (width, height);
    }

    pub fn surface_size(&self) -> (f64, f64) {
        self.surface_size
    }

    pub fn active_stroke(&self) -> &[StrokePoint] {
        &self.active
    }

    pub fn undo_stack(&self) -> &[StrokePoint] {
        &self.undo_stack
    }

    pub fn has_stroke(&self) -> bool {
        !self.active.is_empty()
    }

    /// Pointer down. Only valid in drawing mode.
    pub fn begin_stroke(&mut self, x: f64, y: f64) -> bool {
        if !self.drawing_mode {
            return false;
        }
        self.pointer_down = true;
        self.push(PointKind::Start, x, y);
        true
    }

    /// Pointer move. Ignored unless a stroke was begun.
    pub fn extend_stroke(&mut self, x: f64, y: f64) -> bool {
        if !self.drawing_mode || !self.pointer_down {
            return false;
        }
        self.push(PointKind::Line, x, y);
        true
    }

    /// Pointer up.
    pub fn end_stroke(&mut self) {
        self.pointer_down = false;
    }

    /// Move the last point of the active stroke onto the undo stack.
    pub fn undo(&mut self) -> bool {
        match self.active.pop() {
            Some(point) => {
                self.undo_stack.push(point);
                true
            }
            None => false,
        }
    }

    /// Move the most recently undone point back onto the active stroke.
    pub fn redo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(point) => {
                self.active.push(point);
                true
            }
            None => false,
        }
    }

    /// Hand the active stroke over for attaching to a comment.
    ///
    /// The points are normalized to media space against the current surface
    /// size, and the engine is reset (stroke, undo stack, drawing mode).
    /// Returns `None` when nothing was drawn.
    pub fn commit(&mut self, media: MediaDimensions) -> Option<(Stroke, f64)> {
        let (width, height) = self.surface_size;
        let taken = std::mem::take(&mut self.active);
        let line_width = taken.first().map_or(self.line_width, |p| p.line_width);
        self.undo_stack.clear();
        self.pointer_down = false;
        self.drawing_mode = false;

        if taken.is_empty() {
            return None;
        }
        Some((normalize_stroke(&taken, width, height, media), line_width))
    }

    /// Drop the in-progress stroke and undo history.
    pub fn discard(&mut self) {
        self.active.clear();
        self.undo_stack.clear();
        self.pointer_down = false;
    }

    pub fn displayed(&self) -> Option<&DisplayedStroke> {
        self.displayed.as_ref()
    }

    pub fn show(&mut self, comment_id: CommentId, stroke: Stroke, line_width: Option<f64>) {
        self.displayed = Some(DisplayedStroke {
            comment_id,
            stroke,
            line_width,
        });
    }

    pub fn hide(&mut self) {
        self.displayed = None;
    }

    /// Clear and repaint the surface.
    ///
    /// A displayed stroke is mapped from media space onto the surface and
    /// takes precedence over the in-progress stroke.
    pub fn render(&self, surface: &mut dyn Surface, media: MediaDimensions) {
        surface.clear();

        let (width, height) = surface.size();
        let (points, fallback_width) = match &self.displayed {
            Some(shown) => (
                denormalize_stroke(&shown.stroke, width, height, media),
                shown.line_width.unwrap_or(self.line_width),
            ),
            None => (self.active.clone(), self.line_width),
        };

        let Some(first) = points.first() else {
            return;
        };
        let style = StrokeStyle {
            color: first.color.clone(),
            width: if first.line_width > 0.0 {
                first.line_width
            } else {
                fallback_width
            },
        };

        surface.stroke_paths(&sub_paths(&points), &style);
    }

    fn push(&mut self, kind: PointKind, x: f64, y: f64) {
        self.active
            .push(StrokePoint::new(kind, x, y, &self.color, self.line_width));
    }
}

/// Split a stroke at its `Start` points. A leading `Line` point opens a
/// path of its own.
fn sub_paths(points: &[StrokePoint]) -> Vec<Vec<(f64, f64)>> {
    let mut paths: Vec<Vec<(f64, f64)>> = Vec::new();
    for point in points {
        match (point.kind, paths.last_mut()) {
            (PointKind::Line, Some(path)) => path.push((point.x, point.y)),
            _ => paths.push(vec![(point.x, point.y)]),
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSurface {
        size: (f64, f64),
        clears: usize,
        calls: Vec<(Vec<Vec<(f64, f64)>>, StrokeStyle)>,
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (f64, f64) {
            self.size
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.calls.clear();
        }

        fn stroke_paths(&mut self, paths: &[Vec<(f64, f64)>], style: &StrokeStyle) {
            self.calls.push((paths.to_vec(), style.clone()));
        }
    }

    fn drawing_engine() -> DrawingEngine {
        let mut engine = DrawingEngine::default();
        engine.set_drawing_mode(true);
        engine.resize(640.0, 360.0);
        engine
    }

    #[test]
    fn test_begin_requires_drawing_mode() {
        let mut engine = DrawingEngine::default();
        assert!(!engine.begin_stroke(1.0, 1.0));
        assert!(!engine.has_stroke());
    }

    #[test]
    fn test_extend_requires_pointer_down() {
        let mut engine = drawing_engine();
        assert!(!engine.extend_stroke(1.0, 1.0));
        engine.begin_stroke(0.0, 0.0);
        assert!(engine.extend_stroke(1.0, 1.0));
        engine.end_stroke();
        assert!(!engine.extend_stroke(2.0, 2.0));
        assert_eq!(engine.active_stroke().len(), 2);
    }

    #[test]
    fn test_undo_redo_single_points() {
        let mut engine = drawing_engine();
        engine.begin_stroke(0.0, 0.0);
        engine.extend_stroke(1.0, 1.0);
        engine.extend_stroke(2.0, 2.0);

        assert!(engine.undo());
        assert!(engine.undo());
        assert_eq!(engine.active_stroke().len(), 1);
        assert_eq!(engine.undo_stack().len(), 2);

        assert!(engine.redo());
        assert_eq!(engine.active_stroke().len(), 2);
        assert_eq!(engine.active_stroke()[1].x, 1.0);

        assert!(engine.undo());
        assert!(engine.undo());
        assert!(!engine.undo());
    }

    #[test]
    fn test_leaving_drawing_mode_discards() {
        let mut engine = drawing_engine();
        engine.begin_stroke(0.0, 0.0);
        engine.extend_stroke(1.0, 1.0);
        engine.undo();
        engine.set_drawing_mode(false);
        assert!(!engine.has_stroke());
        assert!(engine.undo_stack().is_empty());
    }

    #[test]
    fn test_commit_normalizes_and_resets() {
        let mut engine = drawing_engine();
        engine.set_line_width(9.0);
        engine.begin_stroke(320.0, 180.0);
        engine.extend_stroke(640.0, 360.0);
        engine.undo();
        engine.redo();

        let (stroke, width) = engine.commit(MediaDimensions::new(1280.0, 720.0)).unwrap();
        assert_eq!(width, 9.0);
        assert!((stroke[0].x - 640.0).abs() < 1e-9);
        assert!((stroke[1].y - 720.0).abs() < 1e-9);

        assert!(!engine.has_stroke());
        assert!(engine.undo_stack().is_empty());
        assert!(!engine.is_drawing_mode());
        assert!(engine.commit(MediaDimensions::default()).is_none());
    }

    #[test]
    fn test_render_active_stroke() {
        let mut engine = drawing_engine();
        engine.begin_stroke(0.0, 0.0);
        engine.extend_stroke(5.0, 5.0);
        engine.end_stroke();
        engine.begin_stroke(10.0, 0.0);
        engine.extend_stroke(10.0, 10.0);

        let mut surface = RecordingSurface {
            size: (640.0, 360.0),
            ..Default::default()
        };
        engine.render(&mut surface, MediaDimensions::default());

        assert_eq!(surface.clears, 1);
        let (paths, style) = &surface.calls[0];
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[1], vec![(10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(style.color, DEFAULT_STROKE_COLOR);
        assert_eq!(style.width, DEFAULT_LINE_WIDTH);
    }

    #[test]
    fn test_render_displayed_stroke_follows_surface() {
        let media = MediaDimensions::new(1280.0, 720.0);
        let mut engine = drawing_engine();
        engine.show(
            3,
            vec![StrokePoint::new(PointKind::Start, 640.0, 360.0, "#00ff00", 4.0)],
            Some(4.0),
        );
        engine.begin_stroke(1.0, 1.0);

        let mut small = RecordingSurface {
            size: (640.0, 360.0),
            ..Default::default()
        };
        engine.render(&mut small, media);
        assert_eq!(small.calls[0].0[0], vec![(320.0, 180.0)]);
        assert_eq!(small.calls[0].1.color, "#00ff00");

        let mut wide = RecordingSurface {
            size: (2000.0, 360.0),
            ..Default::default()
        };
        engine.render(&mut wide, media);
        assert_eq!(wide.calls[0].0[0], vec![(1000.0, 180.0)]);

        engine.hide();
        engine.render(&mut wide, media);
        assert_eq!(wide.calls[0].0[0], vec![(1.0, 1.0)]);
    }

    #[test]
    fn test_render_empty_only_clears() {
        let engine = drawing_engine();
        let mut surface = RecordingSurface::default();
        engine.render(&mut surface, MediaDimensions::default());
        assert_eq!(surface.clears, 1);
        assert!(surface.calls.is_empty());
    }
}
