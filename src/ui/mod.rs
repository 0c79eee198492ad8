// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the review application.

pub mod canvas;
pub mod comments;
pub mod timeline;
pub mod toolbar;

/// Parse a `#rrggbb` colour, falling back to red.
pub fn hex_color(hex: &str) -> egui::Color32 {
    egui::Color32::from_hex(hex).unwrap_or(egui::Color32::RED)
}
