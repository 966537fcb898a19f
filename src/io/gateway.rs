// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project persistence.
//!
//! A project is always loaded and saved as a whole document keyed by its id.
//! Saving overwrites whatever was there; the last save wins.

use crate::error::{EditorError, Result};
use crate::models::project::{Project, ProjectId, ProjectSummary};
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fetch the document stored at `id`.
    async fn load(&self, id: &ProjectId) -> Result<Project>;

    /// Overwrite the document stored at `project.id`.
    async fn save(&self, project: &Project) -> Result<()>;

    /// Summaries of every project owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ProjectSummary>>;
}

fn newest_first(summaries: &mut [ProjectSummary]) {
    summaries.sort_by_key(|s| Reverse(s.last_modified));
}

/// In-process document store.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    documents: RwLock<HashMap<ProjectId, Project>>,
    offline: AtomicBool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every save fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn contains(&self, id: &ProjectId) -> bool {
        self.documents.read().await.contains_key(id)
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn load(&self, id: &ProjectId) -> Result<Project> {
        self.documents
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound(id.clone()))
    }

    async fn save(&self, project: &Project) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(EditorError::SaveFailed("document store is offline".to_string()));
        }
        self.documents
            .write()
            .await
            .insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ProjectSummary>> {
        let mut summaries: Vec<ProjectSummary> = self
            .documents
            .read()
            .await
            .values()
            .filter(|p| p.owner_id == owner_id)
            .map(Project::summary)
            .collect();
        newest_first(&mut summaries);
        Ok(summaries)
    }
}

/// Document store with one pretty-printed JSON file per project.
///
/// Writes go to a temporary file that is renamed over the old document, so
/// a failed save leaves the previous copy intact.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    root: PathBuf,
}

impl JsonFileGateway {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding a project, or `None` for ids that are not plain file names.
    fn document_path(&self, id: &ProjectId) -> Option<PathBuf> {
        let name = id.as_str();
        let plain = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        plain.then(|| self.root.join(format!("{name}.json")))
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn load(&self, id: &ProjectId) -> Result<Project> {
        let path = self
            .document_path(id)
            .ok_or_else(|| EditorError::NotFound(id.clone()))?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("Failed to read {}: {}", path.display(), e);
                }
                return Err(EditorError::NotFound(id.clone()));
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            log::warn!("Unreadable project document {}: {}", path.display(), e);
            EditorError::NotFound(id.clone())
        })
    }

    async fn save(&self, project: &Project) -> Result<()> {
        let path = self.document_path(&project.id).ok_or_else(|| {
            EditorError::SaveFailed(format!("invalid project id: {}", project.id))
        })?;
        let json = serde_json::to_vec_pretty(project)
            .map_err(|e| EditorError::SaveFailed(e.to_string()))?;

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| EditorError::SaveFailed(format!("{}: {e}", self.root.display())))?;

        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, &json)
            .await
            .map_err(|e| EditorError::SaveFailed(format!("{}: {e}", staging.display())))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| EditorError::SaveFailed(format!("{}: {e}", path.display())))?;

        log::info!("Wrote project {} to {}", project.id, path.display());
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ProjectSummary>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(EditorError::ListFailed(format!("{}: {e}", self.root.display()))),
        };

        let mut summaries = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(EditorError::ListFailed(format!("{}: {e}", self.root.display())))
                }
            };
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::warn!("Skipping unreadable document {}: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_slice::<Project>(&bytes) {
                Ok(project) if project.owner_id == owner_id => summaries.push(project.summary()),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable document {}: {}", path.display(), e),
            }
        }
        newest_first(&mut summaries);
        Ok(summaries)
    }
}
