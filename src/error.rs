// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error kinds surfaced by the editor, crop pipeline and storage seams.
//!
//! Every variant is recoverable at the UI boundary. [`EditorError::kind`]
//! gives a stable code the presentation layer can map to a localized
//! notification.

use crate::models::project::ProjectId;

/// Result alias for editor operations.
pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Every block of the document is blank.
    #[error("document has no content to save")]
    EmptyDocument,

    /// Uploaded bytes are not a readable image.
    #[error("unsupported image: {0}")]
    UnsupportedImage(String),

    /// Crop commit requested without a source image.
    #[error("no image selected")]
    NoImageSelected,

    #[error("image transform failed: {0}")]
    TransformFailed(String),

    #[error("photo upload failed: {0}")]
    UploadFailed(String),

    #[error("project not found: {0}")]
    NotFound(ProjectId),

    #[error("save failed: {0}")]
    SaveFailed(String),

    /// The store could not enumerate a user's projects.
    #[error("listing projects failed: {0}")]
    ListFailed(String),
}

impl EditorError {
    /// Stable notification code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            EditorError::EmptyDocument => "empty_document",
            EditorError::UnsupportedImage(_) => "unsupported_image",
            EditorError::NoImageSelected => "no_image_selected",
            EditorError::TransformFailed(_) => "transform_failed",
            EditorError::UploadFailed(_) => "upload_failed",
            EditorError::NotFound(_) => "not_found",
            EditorError::SaveFailed(_) => "save_failed",
            EditorError::ListFailed(_) => "list_failed",
        }
    }
}
