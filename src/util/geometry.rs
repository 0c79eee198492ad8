// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides coordinate transformations between drawing-surface
//! pixels and media-intrinsic pixels. The media is displayed letterboxed
//! (aspect preserved, centered), so a surface point maps through the offset
//! and scale of the content rectangle rather than through the surface size.

use crate::models::annotation::StrokePoint;
use serde::{Deserialize, Serialize};

/// Native pixel size of the loaded media. Zero means "not known yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDimensions {
    pub width: f64,
    pub height: f64,
}

impl MediaDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether there is anything to normalize against.
    pub fn is_known(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// The area of the surface actually covered by media content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Compute the letterboxed content rectangle for a surface of
/// `surface_width` x `surface_height`.
///
/// Returns `None` when either the media or the surface has no area.
pub fn content_rect(
    media: MediaDimensions,
    surface_width: f64,
    surface_height: f64,
) -> Option<ContentRect> {
    if !media.is_known() || surface_width <= 0.0 || surface_height <= 0.0 {
        return None;
    }

    let aspect = media.aspect_ratio();
    let (width, height) = if surface_width / surface_height > aspect {
        // Surface is wider - bars left and right
        (surface_height * aspect, surface_height)
    } else {
        // Surface is taller (or equal) - bars top and bottom
        (surface_width, surface_width / aspect)
    };

    Some(ContentRect {
        x: (surface_width - width) / 2.0,
        y: (surface_height - height) / 2.0,
        width,
        height,
    })
}

/// Convert surface pixel coordinates to media-intrinsic coordinates.
///
/// Identity when the media size is unknown.
pub fn normalize_coordinates(
    x: f64,
    y: f64,
    surface_width: f64,
    surface_height: f64,
    media: MediaDimensions,
) -> (f64, f64) {
    match content_rect(media, surface_width, surface_height) {
        Some(rect) => (
            (x - rect.x) / rect.width * media.width,
            (y - rect.y) / rect.height * media.height,
        ),
        None => (x, y),
    }
}

/// Convert media-intrinsic coordinates back to surface pixel coordinates.
pub fn denormalize_coordinates(
    x: f64,
    y: f64,
    surface_width: f64,
    surface_height: f64,
    media: MediaDimensions,
) -> (f64, f64) {
    match content_rect(media, surface_width, surface_height) {
        Some(rect) => (
            x / media.width * rect.width + rect.x,
            y / media.height * rect.height + rect.y,
        ),
        None => (x, y),
    }
}

/// Map every point of a surface-local stroke into media space.
pub fn normalize_stroke(
    stroke: &[StrokePoint],
    surface_width: f64,
    surface_height: f64,
    media: MediaDimensions,
) -> Vec<StrokePoint> {
    stroke
        .iter()
        .map(|point| {
            let (x, y) =
                normalize_coordinates(point.x, point.y, surface_width, surface_height, media);
            StrokePoint { x, y, ..point.clone() }
        })
        .collect()
}

/// Map a media-space stroke onto a surface of the given size.
pub fn denormalize_stroke(
    stroke: &[StrokePoint],
    surface_width: f64,
    surface_height: f64,
    media: MediaDimensions,
) -> Vec<StrokePoint> {
    stroke
        .iter()
        .map(|point| {
            let (x, y) =
                denormalize_coordinates(point.x, point.y, surface_width, surface_height, media);
            StrokePoint { x, y, ..point.clone() }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: (f64, f64), b: (f64, f64)) {
        assert!((a.0 - b.0).abs() < 0.0001, "{:?} != {:?}", a, b);
        assert!((a.1 - b.1).abs() < 0.0001, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        let media = MediaDimensions::new(1920.0, 1080.0);
        let cases = [
            (800.0, 600.0, 123.0, 456.0),  // taller surface
            (1600.0, 600.0, 10.0, 20.0),   // wider surface
            (960.0, 540.0, 480.0, 270.0),  // exact aspect ratio
            (300.0, 900.0, 0.0, 0.0),
        ];

        for (sw, sh, x, y) in cases {
            let (nx, ny) = normalize_coordinates(x, y, sw, sh, media);
            let back = denormalize_coordinates(nx, ny, sw, sh, media);
            assert_close(back, (x, y));
        }
    }

    #[test]
    fn test_letterbox_wide_surface() {
        let media = MediaDimensions::new(1920.0, 1080.0);
        let rect = content_rect(media, 1600.0, 900.0 / 2.0).unwrap();
        assert!((rect.height - 450.0).abs() < 1e-9);
        assert!((rect.width - 800.0).abs() < 1e-9);
        assert!((rect.x - 400.0).abs() < 1e-9);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn test_letterbox_tall_surface() {
        let media = MediaDimensions::new(1920.0, 1080.0);
        let rect = content_rect(media, 960.0, 1000.0).unwrap();
        assert_eq!(rect.x, 0.0);
        assert!((rect.height - 540.0).abs() < 1e-9);
        assert!((rect.y - 230.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_corners_of_content() {
        let media = MediaDimensions::new(1920.0, 1080.0);

        // Top-left of the content area, not of the surface
        let tl = normalize_coordinates(400.0, 0.0, 1600.0, 450.0, media);
        assert_close(tl, (0.0, 0.0));

        // Bottom-right of the content area
        let br = normalize_coordinates(1200.0, 450.0, 1600.0, 450.0, media);
        assert_close(br, (1920.0, 1080.0));
    }

    #[test]
    fn test_unknown_media_is_identity() {
        let media = MediaDimensions::default();
        assert_eq!(normalize_coordinates(12.5, 7.0, 800.0, 600.0, media), (12.5, 7.0));
        assert_eq!(denormalize_coordinates(12.5, 7.0, 800.0, 600.0, media), (12.5, 7.0));
    }

    #[test]
    fn test_stroke_survives_resize() {
        use crate::models::annotation::PointKind;

        let media = MediaDimensions::new(1280.0, 720.0);
        let stroke = vec![
            StrokePoint::new(PointKind::Start, 100.0, 100.0, "#ff0000", 15.0),
            StrokePoint::new(PointKind::Line, 300.0, 200.0, "#ff0000", 15.0),
        ];
        let normalized = normalize_stroke(&stroke, 640.0, 480.0, media);

        // Same media point lands at the same relative spot on a bigger surface
        let bigger = denormalize_stroke(&normalized, 1280.0, 960.0, media);
        assert_close((bigger[0].x, bigger[0].y), (200.0, 200.0));
        assert_close((bigger[1].x, bigger[1].y), (600.0, 400.0));
        assert_eq!(bigger[1].kind, PointKind::Line);
        assert_eq!(bigger[1].color, "#ff0000");
    }
}
