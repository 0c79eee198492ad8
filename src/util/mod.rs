// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pure helpers shared by the models and the UI.

pub mod geometry;
pub mod timecode;
