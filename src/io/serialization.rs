// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document export and import.
//!
//! This module handles writing project documents to disk and reading them
//! back in YAML and JSON formats.

use crate::models::project::Project;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Export a project to YAML format.
pub fn export_yaml(data: &Project, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a project to JSON format.
pub fn export_json(data: &Project, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a project from YAML format.
pub fn import_yaml(path: &Path) -> Result<Project> {
    let yaml = std::fs::read_to_string(path)?;
    let data = serde_yaml::from_str(&yaml)?;
    Ok(data)
}

/// Import a project from JSON format.
pub fn import_json(path: &Path) -> Result<Project> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

/// Export to YAML or JSON depending on the file extension.
pub fn export(data: &Project, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(data, path),
        Some("json") => export_json(data, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
    .with_context(|| format!("Failed to export project to {}", path.display()))?;

    log::info!("Exported project {} to {}", data.id, path.display());
    Ok(())
}

/// Import from YAML or JSON depending on the file extension.
pub fn import(path: &Path) -> Result<Project> {
    let project = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => import_yaml(path),
        Some("json") => import_json(path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
    .with_context(|| format!("Failed to import project from {}", path.display()))?;

    log::info!(
        "Imported project {} ({} blocks) from {}",
        project.id,
        project.pages.len(),
        path.display()
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoLocation, PageBlock, TemplateKind};
    use std::sync::Arc;

    fn sample() -> Project {
        let mut project = Project::new("u1", "Miho");
        project.title = "Kyoto".to_string();
        let mut map = PageBlock::new(TemplateKind::MapWithPin);
        map.set_location(GeoLocation::new(35.0, 135.7));
        project.pages = Arc::new(vec![PageBlock::new(TemplateKind::FeaturePhoto), map]);
        project
    }

    #[test]
    fn test_yaml_and_json_agree() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let project = sample();

        let yaml_path = temp.path().join("project.yaml");
        let json_path = temp.path().join("project.json");
        export(&project, &yaml_path).unwrap();
        export(&project, &json_path).unwrap();

        assert_eq!(import(&yaml_path).unwrap(), project);
        assert_eq!(import(&json_path).unwrap(), project);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = temp.path().join("project.txt");

        assert!(export(&sample(), &path).is_err());
        assert!(!path.exists());
        assert!(import(&path).is_err());
    }
}
