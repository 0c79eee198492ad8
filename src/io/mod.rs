// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for media, project files and downloads.

pub mod autosave;
pub mod media;
pub mod naming;
pub mod serialization;
