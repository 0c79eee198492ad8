// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media Review - timecoded comments and drawings on video and audio.
//!
//! The library holds everything below the UI: timecodes, the comment tree,
//! freehand drawing, project files and playback control. The desktop
//! binary drives it through [`review::Review`].

pub mod config;
pub mod io;
pub mod models;
pub mod playback;
pub mod review;
pub mod session;
pub mod util;
