// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor configuration.
//!
//! Settings live in a YAML file. Missing keys take their defaults and an
//! unreadable file falls back to the defaults entirely.

use crate::crop::{zoom_bounds, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "bricks.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Directory holding project documents and uploaded photos.
    pub storage_root: PathBuf,
    /// Encoding for cropped photos.
    pub output_format: OutputFormat,
    pub zoom_min: f64,
    pub zoom_max: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from("portfolio-data"),
            output_format: OutputFormat::default(),
            zoom_min: zoom_bounds::MIN,
            zoom_max: zoom_bounds::MAX,
        }
    }
}

impl EditorConfig {
    pub fn projects_dir(&self) -> PathBuf {
        self.storage_root.join("projects")
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.storage_root.join("photos")
    }
}

pub fn load_from_path(path: &Path) -> Result<EditorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    match serde_yaml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            log::warn!("Invalid config {}, using defaults: {}", path.display(), e);
            Ok(EditorConfig::default())
        }
    }
}

/// Load `path` if it exists, otherwise the defaults.
pub fn load_or_default(path: &Path) -> Result<EditorConfig> {
    if path.exists() {
        return load_from_path(path);
    }
    Ok(EditorConfig::default())
}

pub fn save_to_path(config: &EditorConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_yaml::to_string(config)?;
    fs::write(path, content)?;
    Ok(())
}
