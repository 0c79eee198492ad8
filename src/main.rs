// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media Review
//!
//! A desktop application for reviewing video and audio with timecoded,
//! threaded comments and freehand drawings over the frame.

mod app;
mod ui;

use anyhow::Result;
use app::ReviewApp;
use media_review::config::ReviewConfig;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = ReviewConfig::discover()?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Media Review")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Media Review",
        options,
        Box::new(|cc| Ok(Box::new(ReviewApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
