// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Photo storage.
//!
//! Cropped photos are uploaded here before their url is written into a
//! document. Previously uploaded photos are fetched back when the user picks
//! one from their collection.

use crate::crop::PhotoBlob;
use crate::error::{EditorError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Store a blob and return the url it is addressable at.
    async fn upload(&self, blob: &PhotoBlob) -> Result<String>;

    /// Bytes behind a url this store issued, if still available.
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// In-process photo store.
#[derive(Debug, Default)]
pub struct MemoryPhotoStore {
    photos: RwLock<HashMap<String, Vec<u8>>>,
    offline: AtomicBool,
}

impl MemoryPhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.photos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.photos.read().await.is_empty()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn upload(&self, blob: &PhotoBlob) -> Result<String> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(EditorError::UploadFailed("photo store is offline".to_string()));
        }
        let url = format!(
            "memory://photos/{}.{}",
            Uuid::new_v4(),
            extension_for(&blob.mime)
        );
        self.photos.write().await.insert(url.clone(), blob.bytes.clone());
        Ok(url)
    }

    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        self.photos.read().await.get(url).cloned()
    }
}

/// Photo store backed by a directory; urls are `file://` paths.
#[derive(Debug, Clone)]
pub struct DirPhotoStore {
    root: PathBuf,
}

impl DirPhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, url: &str) -> Option<PathBuf> {
        let path = PathBuf::from(url.strip_prefix("file://")?);
        let escapes = path.components().any(|c| c == Component::ParentDir);
        (!escapes && path.starts_with(&self.root)).then_some(path)
    }
}

#[async_trait]
impl PhotoStore for DirPhotoStore {
    async fn upload(&self, blob: &PhotoBlob) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| EditorError::UploadFailed(format!("{}: {e}", self.root.display())))?;

        let path = self
            .root
            .join(format!("{}.{}", Uuid::new_v4(), extension_for(&blob.mime)));
        tokio::fs::write(&path, &blob.bytes)
            .await
            .map_err(|e| EditorError::UploadFailed(format!("{}: {e}", path.display())))?;

        log::info!("Stored photo {} ({} bytes)", path.display(), blob.bytes.len());
        Ok(format!("file://{}", path.display()))
    }

    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.path_for(url)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Photo {} unavailable: {}", path.display(), e);
                None
            }
        }
    }
}
