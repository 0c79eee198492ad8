// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: comments, drawings and the project they belong to.

pub mod annotation;
pub mod drawing;
pub mod project;
pub mod store;
