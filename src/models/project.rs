// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document.
//!
//! A project is persisted and loaded as one unit: attribution, title, cover
//! photo and the ordered page blocks.

use super::block::PageBlock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier of a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Complete project data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    #[serde(default)]
    pub title: String,
    pub owner_id: String,
    pub author_name: String,
    #[serde(default)]
    pub cover_image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Rendering order. Shared so that an unchanged sequence keeps its identity.
    #[serde(default)]
    pub pages: Arc<Vec<PageBlock>>,
}

impl Project {
    /// Create an empty project owned by the given user.
    pub fn new(owner_id: impl Into<String>, author_name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::generate(),
            title: String::new(),
            owner_id: owner_id.into(),
            author_name: author_name.into(),
            cover_image_url: String::new(),
            last_modified: None,
            pages: Arc::new(Vec::new()),
        }
    }

    /// True when no block carries any content.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(PageBlock::is_blank)
    }

    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            cover_image_url: self.cover_image_url.clone(),
            last_modified: self.last_modified,
        }
    }
}

/// Listing entry for a user's projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: ProjectId,
    pub title: String,
    pub cover_image_url: String,
    pub last_modified: Option<DateTime<Utc>>,
}
