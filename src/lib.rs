// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Portfolio Bricks - page builder core
//!
//! Block-based project documents, an editor state machine over them, a
//! crop pipeline for photo slots and the storage seams the editor saves
//! through.

pub mod config;
pub mod crop;
pub mod editor;
pub mod error;
pub mod io;
pub mod models;
pub mod util;

pub use crop::{CropSession, CroppedPhoto, ImageTransformer, OutputFormat};
pub use editor::{DocumentEditor, EditorContext, PhotoTarget, SessionState};
pub use error::{EditorError, Result};
pub use models::{BlockKey, GeoLocation, PageBlock, Project, ProjectId, TemplateKind};
