// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Document editor state machine.
//!
//! One [`DocumentEditor`] owns the editable state of one project for the
//! length of an editing session: title, cover photo and the ordered page
//! blocks. Every other component reads from it or hands results back to it;
//! nothing else mutates the page sequence.
//!
//! Pages are held behind an `Arc`. Any edit that changes them installs a new
//! sequence rather than mutating the shared one, so a presentation layer can
//! detect changes with `Arc::ptr_eq`. Edits that turn out to be no-ops keep
//! the existing sequence.

pub mod context;

pub use context::EditorContext;

use crate::crop::{CropSession, CroppedPhoto};
use crate::error::{EditorError, Result};
use crate::models::{
    BlockKey, GeoLocation, PageBlock, Project, ProjectId, TemplateKind, COVER_ASPECT,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

/// What the session is busy with. The UI shows a blocking indicator for
/// anything but `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Saving,
}

/// Where a cropped photo should land.
///
/// Blocks are addressed by key so a result still reaches the right block
/// when the user reorders pages while a crop session is open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PhotoTarget {
    Cover,
    Slot { key: BlockKey, slot: usize },
}

pub struct DocumentEditor {
    ctx: EditorContext,
    project: Project,
    /// Shared "currently edited" map position.
    position: GeoLocation,
    state: watch::Sender<SessionState>,
}

impl DocumentEditor {
    /// Start a new, empty project owned by the context's user.
    pub fn new(ctx: EditorContext) -> Self {
        let project = Project::new(ctx.user_id.clone(), ctx.author_name.clone());
        log::info!("Started project {}", project.id);
        Self {
            ctx,
            project,
            position: GeoLocation::default(),
            state: watch::Sender::new(SessionState::Idle),
        }
    }

    /// Edit a project that did not come from the gateway, such as an
    /// imported file. The document is repaired the same way a load is.
    pub fn from_project(ctx: EditorContext, project: Project) -> Self {
        let mut editor = Self::new(ctx);
        editor.install(project);
        editor
    }

    /// Open an existing project.
    pub async fn open(ctx: EditorContext, id: &ProjectId) -> Result<Self> {
        let mut editor = Self::new(ctx);
        editor.load(id).await?;
        Ok(editor)
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.ctx
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn pages(&self) -> &Arc<Vec<PageBlock>> {
        &self.project.pages
    }

    pub fn block(&self, index: usize) -> Option<&PageBlock> {
        self.project.pages.get(index)
    }

    /// Current index of the block with the given key.
    pub fn index_of(&self, key: &BlockKey) -> Option<usize> {
        self.project.pages.iter().position(|block| block.key() == key)
    }

    pub fn title(&self) -> &str {
        &self.project.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.project.title = title.into();
    }

    pub fn cover_photo(&self) -> &str {
        &self.project.cover_image_url
    }

    pub fn current_position(&self) -> GeoLocation {
        self.position
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receiver that follows the session state, including while a load or
    /// save is in flight.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Replace the document with the one stored at `id`.
    ///
    /// On failure the current document is left as it was.
    pub async fn load(&mut self, id: &ProjectId) -> Result<()> {
        self.state.send_replace(SessionState::Loading);
        let loaded = self.ctx.gateway.load(id).await;
        self.state.send_replace(SessionState::Idle);

        self.install(loaded?);
        Ok(())
    }

    fn install(&mut self, mut project: Project) {
        hydrate(&mut project);

        self.position = project
            .pages
            .iter()
            .find_map(|block| block.location().copied())
            .unwrap_or_default();
        log::info!(
            "Opened project {} ({} blocks)",
            project.id,
            project.pages.len()
        );
        self.project = project;
    }

    /// Append a block of the given template with default contents.
    pub fn add_block(&mut self, template: TemplateKind) -> BlockKey {
        let block = PageBlock::new(template);
        let key = block.key().clone();
        self.update_pages(|pages| {
            pages.push(block);
            true
        });
        log::info!("Added {} block, total: {}", template, self.project.pages.len());
        key
    }

    /// Remove the block at `index`. Out-of-range indices are ignored.
    pub fn delete_block(&mut self, index: usize) {
        let removed = self.update_pages(|pages| {
            if index >= pages.len() {
                return false;
            }
            pages.remove(index);
            true
        });
        if removed {
            log::info!("Deleted block {}, total: {}", index, self.project.pages.len());
        } else {
            log::debug!("Ignoring delete of missing block {}", index);
        }
    }

    /// Move the block at `source` to `destination`, shifting the blocks in
    /// between by one. A missing or out-of-range destination (a drag dropped
    /// outside any target) leaves the order untouched.
    pub fn reorder(&mut self, source: usize, destination: Option<usize>) {
        let moved = self.update_pages(|pages| match destination {
            Some(dest) if source < pages.len() && dest < pages.len() && source != dest => {
                let block = pages.remove(source);
                pages.insert(dest, block);
                true
            }
            _ => false,
        });
        if moved {
            log::debug!("Moved block {} to {:?}", source, destination);
        } else {
            log::debug!("Ignoring reorder {} -> {:?}", source, destination);
        }
    }

    /// Replace one text field. Empty text is a valid interim state.
    pub fn set_block_text(&mut self, index: usize, field: usize, value: impl Into<String>) {
        let value = value.into();
        let changed = self.update_pages(|pages| {
            pages
                .get_mut(index)
                .is_some_and(|block| block.set_text(field, value))
        });
        if !changed {
            log::debug!("Ignoring text edit of block {} field {}", index, field);
        }
    }

    pub fn set_cover_photo(&mut self, url: impl Into<String>) {
        self.project.cover_image_url = url.into();
    }

    /// Replace one photo slot of the block at `index`.
    pub fn set_block_photo(&mut self, index: usize, slot: usize, url: impl Into<String>) {
        let url = url.into();
        let changed = self.update_pages(|pages| {
            pages
                .get_mut(index)
                .is_some_and(|block| block.set_photo(slot, url))
        });
        if !changed {
            log::debug!("Ignoring photo for block {} slot {}", index, slot);
        }
    }

    /// Pin the edited map position on the first map block.
    ///
    /// Only the first map block follows the shared position; any later map
    /// blocks keep their own stored location. A fully unset position is
    /// ignored.
    pub fn sync_map_location(&mut self, position: GeoLocation) {
        if position.is_unset() {
            return;
        }
        self.position = position;
        let synced = self.update_pages(|pages| {
            pages
                .iter_mut()
                .find(|block| block.template() == TemplateKind::MapWithPin)
                .is_some_and(|block| block.set_location(position))
        });
        if !synced {
            log::debug!("No map block to receive position");
        }
    }

    /// Refuse to save a document whose blocks are all blank.
    pub fn validate_for_save(&self) -> Result<()> {
        if self.project.is_blank() {
            return Err(EditorError::EmptyDocument);
        }
        Ok(())
    }

    /// Persist the whole document and return the snapshot that was stored.
    ///
    /// Storage is not contacted when validation fails. When the store
    /// rejects the write the in-memory document is unchanged.
    pub async fn save(&mut self) -> Result<Project> {
        self.validate_for_save()?;

        let mut snapshot = self.project.clone();
        snapshot.last_modified = Some(Utc::now());

        self.state.send_replace(SessionState::Saving);
        let saved = self.ctx.gateway.save(&snapshot).await;
        self.state.send_replace(SessionState::Idle);

        if let Err(e) = saved {
            log::error!("Failed to save project {}: {}", snapshot.id, e);
            return Err(e);
        }

        log::info!(
            "Saved project {} ({} blocks)",
            snapshot.id,
            snapshot.pages.len()
        );
        self.project = snapshot.clone();
        Ok(snapshot)
    }

    /// Open a crop session for a photo target, framed at the target's aspect
    /// ratio. The session starts from the target's current photo, if any.
    ///
    /// Returns `None` when the target does not exist.
    pub fn begin_photo(&self, target: &PhotoTarget) -> Option<CropSession> {
        let (aspect, current) = match target {
            PhotoTarget::Cover => (COVER_ASPECT, self.project.cover_image_url.as_str()),
            PhotoTarget::Slot { key, slot } => {
                let block = &self.project.pages[self.index_of(key)?];
                let aspect = block.template().slot_aspect(*slot)?;
                let current = block.photos().and_then(|urls| urls.get(*slot))?;
                (aspect, current.as_str())
            }
        };

        let config = &self.ctx.config;
        let mut session = CropSession::new(aspect, Arc::clone(&self.ctx.photos))
            .with_transformer(self.ctx.transformer())
            .with_zoom_range(config.zoom_min, config.zoom_max);
        if !current.is_empty() {
            session.load_from_existing(current);
        }
        Some(session)
    }

    /// Upload a committed crop and write its url into the target.
    ///
    /// A slot whose block was deleted while cropping is skipped; the photo
    /// still lands in the user's collection. Returns the stored url.
    pub async fn complete_photo(&mut self, target: &PhotoTarget, photo: CroppedPhoto) -> Result<String> {
        let url = self.ctx.photos.upload(&photo.blob).await?;
        self.ctx.remember_photo(&url);

        match target {
            PhotoTarget::Cover => self.set_cover_photo(url.clone()),
            PhotoTarget::Slot { key, slot } => match self.index_of(key) {
                Some(index) => self.set_block_photo(index, *slot, url.clone()),
                None => log::warn!("Block {} is gone, dropping cropped photo", key),
            },
        }
        Ok(url)
    }

    /// Apply `edit` to a copy of the pages and install the copy if the edit
    /// reports a change.
    fn update_pages(&mut self, edit: impl FnOnce(&mut Vec<PageBlock>) -> bool) -> bool {
        let mut pages = Vec::clone(&self.project.pages);
        let changed = edit(&mut pages);
        if changed {
            self.project.pages = Arc::new(pages);
        }
        changed
    }
}

/// Repair a stored document so the block invariants hold.
fn hydrate(project: &mut Project) {
    let mut seen = HashSet::new();
    let mut pages = Vec::clone(&project.pages);

    for block in &mut pages {
        if block.key().as_str().is_empty() || !seen.insert(block.key().clone()) {
            let fresh = BlockKey::generate();
            log::warn!("Replacing duplicate block key {:?} with {}", block.key().as_str(), fresh);
            seen.insert(fresh.clone());
            block.rekey(fresh);
        }
        if block.conform() {
            log::warn!("Block {} did not match its {} template", block.key(), block.template());
        }
    }
    project.pages = Arc::new(pages);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gateway::{MemoryGateway, PersistenceGateway};
    use crate::io::photos::MemoryPhotoStore;
    use crate::crop::{OutputFormat, PhotoBlob};

    struct Harness {
        gateway: Arc<MemoryGateway>,
        photos: Arc<MemoryPhotoStore>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                gateway: Arc::new(MemoryGateway::new()),
                photos: Arc::new(MemoryPhotoStore::new()),
            }
        }

        fn editor(&self) -> DocumentEditor {
            let ctx = EditorContext::new("u1", "Miho", self.gateway.clone(), self.photos.clone());
            DocumentEditor::new(ctx)
        }
    }

    fn keys(editor: &DocumentEditor) -> Vec<BlockKey> {
        editor.pages().iter().map(|b| b.key().clone()).collect()
    }

    fn editor_with(templates: &[TemplateKind]) -> DocumentEditor {
        let mut editor = Harness::new().editor();
        for template in templates {
            editor.add_block(*template);
        }
        editor
    }

    fn fake_photo() -> CroppedPhoto {
        CroppedPhoto {
            url: "data:image/png;base64,AAAA".to_string(),
            blob: PhotoBlob {
                bytes: vec![1, 2, 3],
                mime: OutputFormat::Png.mime().to_string(),
                width: 1,
                height: 1,
            },
        }
    }

    #[test]
    fn test_add_block_appends_defaults() {
        let mut editor = Harness::new().editor();
        let key = editor.add_block(TemplateKind::PhotoTriptych);

        assert_eq!(editor.pages().len(), 1);
        let block = editor.block(0).unwrap();
        assert_eq!(block.key(), &key);
        assert_eq!(block.photos().unwrap(), &["", "", ""]);
        assert_eq!(block.text().unwrap(), &[""]);
    }

    #[test]
    fn test_reorder_preserves_keys_and_relative_order() {
        let n = 5;
        for source in 0..n {
            for dest in 0..n {
                let mut editor = editor_with(&[TemplateKind::TextPanel; 5]);
                let before = keys(&editor);

                editor.reorder(source, Some(dest));
                let after = keys(&editor);

                assert_eq!(after[dest], before[source], "{source} -> {dest}");
                let others_before: Vec<_> =
                    before.iter().filter(|k| **k != before[source]).collect();
                let others_after: Vec<_> =
                    after.iter().filter(|k| **k != before[source]).collect();
                assert_eq!(others_before, others_after, "{source} -> {dest}");

                let mut sorted_before = before.clone();
                let mut sorted_after = after.clone();
                sorted_before.sort();
                sorted_after.sort();
                assert_eq!(sorted_before, sorted_after);
            }
        }
    }

    #[test]
    fn test_reorder_moves_rather_than_swaps() {
        let mut editor = editor_with(&[TemplateKind::TextPanel; 4]);
        let before = keys(&editor);

        editor.reorder(0, Some(2));

        let after = keys(&editor);
        assert_eq!(
            after,
            vec![before[1].clone(), before[2].clone(), before[0].clone(), before[3].clone()]
        );
    }

    #[test]
    fn test_cancelled_reorder_is_noop() {
        let mut editor = editor_with(&[TemplateKind::TextPanel, TemplateKind::MapWithPin]);
        let before = Arc::clone(editor.pages());

        editor.reorder(0, None);
        editor.reorder(0, Some(2));
        editor.reorder(5, Some(0));

        assert!(Arc::ptr_eq(&before, editor.pages()));
        assert_eq!(*before, **editor.pages());
    }

    #[test]
    fn test_delete_block() {
        let mut editor = editor_with(&[
            TemplateKind::TextPanel,
            TemplateKind::FullBleed,
            TemplateKind::MapWithPin,
        ]);
        let before = keys(&editor);

        editor.delete_block(1);

        assert_eq!(keys(&editor), vec![before[0].clone(), before[2].clone()]);

        let snapshot = Arc::clone(editor.pages());
        editor.delete_block(7);
        assert!(Arc::ptr_eq(&snapshot, editor.pages()));
    }

    #[test]
    fn test_edits_never_change_template() {
        let templates = [
            TemplateKind::MapWithPin,
            TemplateKind::PhotoGrid,
            TemplateKind::FeaturePhoto,
            TemplateKind::TextPanel,
        ];
        let mut editor = editor_with(&templates);
        let kinds = |e: &DocumentEditor| -> Vec<(BlockKey, TemplateKind)> {
            e.pages().iter().map(|b| (b.key().clone(), b.template())).collect()
        };
        let mut expected = kinds(&editor);

        editor.reorder(3, Some(0));
        editor.set_block_text(0, 0, "hello");
        editor.set_block_photo(2, 3, "a.png");
        editor.delete_block(1);
        editor.sync_map_location(GeoLocation::new(1.0, 2.0));

        let mut actual = kinds(&editor);
        expected.retain(|(k, _)| actual.iter().any(|(a, _)| a == k));
        expected.sort_by(|a, b| a.0.cmp(&b.0));
        actual.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_text_edits() {
        let mut editor = editor_with(&[TemplateKind::TextPanel, TemplateKind::FullBleed]);

        editor.set_block_text(0, 0, "Kyoto in autumn");
        assert_eq!(editor.block(0).unwrap().text().unwrap(), &["Kyoto in autumn"]);

        let snapshot = Arc::clone(editor.pages());
        editor.set_block_text(0, 1, "no such field");
        editor.set_block_text(1, 0, "no text on this template");
        editor.set_block_text(9, 0, "no such block");
        assert!(Arc::ptr_eq(&snapshot, editor.pages()));
    }

    #[test]
    fn test_photo_replacement_builds_new_sequence() {
        let mut editor = editor_with(&[TemplateKind::PhotoTriptych]);
        let before = Arc::clone(editor.pages());

        editor.set_block_photo(0, 1, "memory://photos/a.png");

        assert!(!Arc::ptr_eq(&before, editor.pages()));
        assert_eq!(before[0].photos().unwrap()[1], "");
        assert_eq!(editor.block(0).unwrap().photos().unwrap()[1], "memory://photos/a.png");

        let after = Arc::clone(editor.pages());
        editor.set_block_photo(0, 3, "out-of-range.png");
        assert!(Arc::ptr_eq(&after, editor.pages()));
    }

    #[test]
    fn test_sync_updates_only_first_map() {
        let mut editor = editor_with(&[
            TemplateKind::TextPanel,
            TemplateKind::MapWithPin,
            TemplateKind::MapWithPin,
        ]);

        editor.sync_map_location(GeoLocation::new(1.0, 2.0));

        assert_eq!(
            editor.block(1).unwrap().location(),
            Some(&GeoLocation::new(1.0, 2.0))
        );
        assert_eq!(editor.block(2).unwrap().location(), Some(&GeoLocation::default()));
        assert_eq!(editor.current_position(), GeoLocation::new(1.0, 2.0));

        let snapshot = Arc::clone(editor.pages());
        editor.sync_map_location(GeoLocation::default());
        assert!(Arc::ptr_eq(&snapshot, editor.pages()));
    }

    #[test]
    fn test_validate_for_save() {
        let mut editor = Harness::new().editor();
        assert_eq!(editor.validate_for_save(), Err(EditorError::EmptyDocument));

        editor.add_block(TemplateKind::TextPanel);
        editor.set_block_text(0, 0, "");
        assert_eq!(editor.validate_for_save(), Err(EditorError::EmptyDocument));

        editor.add_block(TemplateKind::FullBleed);
        editor.set_block_photo(1, 0, "memory://photos/a.png");
        assert_eq!(editor.validate_for_save(), Ok(()));

        editor.delete_block(1);
        editor.add_block(TemplateKind::MapWithPin);
        assert_eq!(editor.validate_for_save(), Err(EditorError::EmptyDocument));
        editor.sync_map_location(GeoLocation::new(25.0, 121.5));
        assert_eq!(editor.validate_for_save(), Ok(()));
    }

    #[tokio::test]
    async fn test_empty_save_never_reaches_storage() {
        let harness = Harness::new();
        let mut editor = harness.editor();
        editor.add_block(TemplateKind::PhotoTriptych);

        let err = editor.save().await.unwrap_err();

        assert_eq!(err, EditorError::EmptyDocument);
        assert!(!harness.gateway.contains(&editor.project().id).await);
        assert_eq!(editor.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_save_stamps_time_and_persists_order() {
        let harness = Harness::new();
        let mut editor = harness.editor();
        editor.set_title("Kyoto");
        editor.add_block(TemplateKind::MapWithPin);
        editor.add_block(TemplateKind::TextPanel);
        editor.set_block_text(1, 0, "Temples");
        editor.reorder(1, Some(0));

        let saved = editor.save().await.unwrap();

        assert!(saved.last_modified.is_some());
        assert_eq!(editor.project().last_modified, saved.last_modified);
        let stored = harness.gateway.load(&saved.id).await.unwrap();
        assert_eq!(stored, saved);
        assert_eq!(stored.pages[0].template(), TemplateKind::TextPanel);
        assert_eq!(stored.author_name, "Miho");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_editor_state() {
        let harness = Harness::new();
        let mut editor = harness.editor();
        editor.add_block(TemplateKind::TextPanel);
        editor.set_block_text(0, 0, "draft");
        harness.gateway.set_offline(true);

        let err = editor.save().await.unwrap_err();

        assert!(matches!(err, EditorError::SaveFailed(_)));
        assert!(editor.project().last_modified.is_none());
        assert_eq!(editor.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_load_hydrates_position_and_repairs_blocks() {
        let harness = Harness::new();
        let mut stored = Project::new("u1", "Miho");
        let mut map = PageBlock::with_key(BlockKey::from("same"), TemplateKind::MapWithPin);
        map.set_location(GeoLocation::new(35.0, 135.7));
        let text = PageBlock::with_key(BlockKey::from("same"), TemplateKind::TextPanel);
        stored.pages = Arc::new(vec![text, map]);
        harness.gateway.save(&stored).await.unwrap();

        let ctx = EditorContext::new("u1", "Miho", harness.gateway.clone(), harness.photos.clone());
        let editor = DocumentEditor::open(ctx, &stored.id).await.unwrap();

        assert_eq!(editor.current_position(), GeoLocation::new(35.0, 135.7));
        let loaded = keys(&editor);
        assert_eq!(loaded[0].as_str(), "same");
        assert_ne!(loaded[1].as_str(), "same");
    }

    #[tokio::test]
    async fn test_load_missing_keeps_current_document() {
        let mut editor = editor_with(&[TemplateKind::TextPanel]);
        let id = editor.project().id.clone();

        let err = editor.load(&ProjectId::from("nope")).await.unwrap_err();

        assert_eq!(err, EditorError::NotFound(ProjectId::from("nope")));
        assert_eq!(editor.project().id, id);
        assert_eq!(editor.pages().len(), 1);
    }

    #[test]
    fn test_begin_photo_uses_slot_aspect() {
        let mut editor = editor_with(&[TemplateKind::PhotoTriptych]);
        let key = editor.block(0).unwrap().key().clone();

        let slot = PhotoTarget::Slot { key: key.clone(), slot: 2 };
        let session = editor.begin_photo(&slot).unwrap();
        assert_eq!(session.aspect(), 1.0);
        assert!(!session.has_source());

        editor.set_block_photo(0, 1, "memory://photos/old.png");
        let session = editor.begin_photo(&PhotoTarget::Slot { key: key.clone(), slot: 1 }).unwrap();
        assert_eq!(session.aspect(), 1.5);
        assert!(session.has_source());

        assert!(editor.begin_photo(&PhotoTarget::Slot { key, slot: 3 }).is_none());
        assert_eq!(editor.begin_photo(&PhotoTarget::Cover).unwrap().aspect(), COVER_ASPECT);
    }

    #[tokio::test]
    async fn test_photo_follows_block_through_reorder() {
        let harness = Harness::new();
        let mut editor = harness.editor();
        editor.add_block(TemplateKind::TextPanel);
        let key = editor.add_block(TemplateKind::FullBleed);
        let target = PhotoTarget::Slot { key: key.clone(), slot: 0 };
        let _session = editor.begin_photo(&target).unwrap();

        editor.reorder(1, Some(0));
        let url = editor.complete_photo(&target, fake_photo()).await.unwrap();

        assert_eq!(editor.index_of(&key), Some(0));
        assert_eq!(editor.block(0).unwrap().photos().unwrap(), &[url.clone()]);
        assert_eq!(editor.context().collection, vec![url]);
    }

    #[tokio::test]
    async fn test_photo_for_deleted_block_is_dropped() {
        let harness = Harness::new();
        let mut editor = harness.editor();
        let key = editor.add_block(TemplateKind::FullBleed);
        editor.add_block(TemplateKind::TextPanel);
        let target = PhotoTarget::Slot { key, slot: 0 };

        editor.delete_block(0);
        let before = Arc::clone(editor.pages());
        editor.complete_photo(&target, fake_photo()).await.unwrap();

        assert!(Arc::ptr_eq(&before, editor.pages()));
        assert_eq!(harness.photos.len().await, 1);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_target_empty() {
        let harness = Harness::new();
        let mut editor = harness.editor();
        harness.photos.set_offline(true);

        let err = editor
            .complete_photo(&PhotoTarget::Cover, fake_photo())
            .await
            .unwrap_err();

        assert!(matches!(err, EditorError::UploadFailed(_)));
        assert_eq!(editor.cover_photo(), "");
        assert!(editor.context().collection.is_empty());
    }

    /// Gateway that records the editor state it sees while serving calls.
    #[derive(Default)]
    struct ObservingGateway {
        inner: MemoryGateway,
        state: std::sync::OnceLock<watch::Receiver<SessionState>>,
        seen: std::sync::Mutex<Vec<SessionState>>,
    }

    impl ObservingGateway {
        fn record(&self) {
            if let Some(state) = self.state.get() {
                self.seen.lock().unwrap().push(*state.borrow());
            }
        }
    }

    #[async_trait::async_trait]
    impl PersistenceGateway for ObservingGateway {
        async fn load(&self, id: &ProjectId) -> Result<Project> {
            self.record();
            self.inner.load(id).await
        }

        async fn save(&self, project: &Project) -> Result<()> {
            self.record();
            self.inner.save(project).await
        }

        async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<crate::models::ProjectSummary>> {
            self.inner.list_by_owner(owner_id).await
        }
    }

    #[tokio::test]
    async fn test_state_is_published_while_storage_works() {
        let gateway = Arc::new(ObservingGateway::default());
        let ctx = EditorContext::new("u1", "Miho", gateway.clone(), Arc::new(MemoryPhotoStore::new()));
        let mut editor = DocumentEditor::new(ctx);
        let state = editor.watch_state();
        gateway.state.set(editor.watch_state()).unwrap();

        editor.add_block(TemplateKind::TextPanel);
        editor.set_block_text(0, 0, "Harbour at dusk");
        let saved = editor.save().await.unwrap();
        editor.load(&saved.id).await.unwrap();

        assert_eq!(
            *gateway.seen.lock().unwrap(),
            vec![SessionState::Saving, SessionState::Loading]
        );
        assert_eq!(*state.borrow(), SessionState::Idle);
        assert_eq!(editor.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_from_project_repairs_and_validates() {
        let harness = Harness::new();
        let ctx = || EditorContext::new("u1", "Miho", harness.gateway.clone(), harness.photos.clone());

        let mut imported = Project::new("u1", "Miho");
        let mut text = PageBlock::with_key(BlockKey::from(""), TemplateKind::TextPanel);
        text.set_text(0, "Notes".to_string());
        let map = PageBlock::with_key(BlockKey::from(""), TemplateKind::MapWithPin);
        imported.pages = Arc::new(vec![text, map]);

        let mut editor = DocumentEditor::from_project(ctx(), imported.clone());
        let repaired = keys(&editor);
        assert!(repaired.iter().all(|k| !k.as_str().is_empty()));
        assert_ne!(repaired[0], repaired[1]);
        editor.save().await.unwrap();
        assert!(harness.gateway.contains(&imported.id).await);

        let blank = Project::new("u1", "Miho");
        let mut editor = DocumentEditor::from_project(ctx(), blank.clone());
        assert_eq!(editor.save().await.unwrap_err(), EditorError::EmptyDocument);
        assert!(!harness.gateway.contains(&blank.id).await);
    }
}
