// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session context.
//!
//! Everything an editor needs from the surrounding application is passed in
//! here explicitly: who is editing, the photos they have used before, and
//! the storage collaborators.

use crate::config::EditorConfig;
use crate::crop::ImageTransformer;
use crate::io::gateway::PersistenceGateway;
use crate::io::photos::PhotoStore;
use std::sync::Arc;

pub struct EditorContext {
    pub user_id: String,
    pub author_name: String,
    /// Urls of photos the user has uploaded, oldest first.
    pub collection: Vec<String>,
    pub gateway: Arc<dyn PersistenceGateway>,
    pub photos: Arc<dyn PhotoStore>,
    pub config: EditorConfig,
}

impl EditorContext {
    pub fn new(
        user_id: impl Into<String>,
        author_name: impl Into<String>,
        gateway: Arc<dyn PersistenceGateway>,
        photos: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            author_name: author_name.into(),
            collection: Vec::new(),
            gateway,
            photos,
            config: EditorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_collection(mut self, collection: Vec<String>) -> Self {
        self.collection = collection;
        self
    }

    /// Add an uploaded photo to the collection unless it is already there.
    pub fn remember_photo(&mut self, url: &str) {
        if !url.is_empty() && !self.collection.iter().any(|known| known == url) {
            self.collection.push(url.to_string());
        }
    }

    pub fn transformer(&self) -> ImageTransformer {
        ImageTransformer::new(self.config.output_format)
    }
}
