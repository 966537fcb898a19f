// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for the portfolio document.

pub mod block;
pub mod project;
pub mod template;

pub use block::{BlockKey, GeoLocation, PageBlock};
pub use project::{Project, ProjectId, ProjectSummary};
pub use template::{TemplateKind, TemplateSpec, COVER_ASPECT};
