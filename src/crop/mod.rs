// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Crop session: acquiring and framing one photo.
//!
//! A session only knows the aspect ratio it must produce. Which block or
//! slot the result belongs to is the editor's business; the session hands
//! back a [`CroppedPhoto`] and never touches document state.

pub mod transform;

pub use transform::{CroppedPhoto, ImageTransformer, OutputFormat, PhotoBlob};

use crate::error::{EditorError, Result};
use crate::io::photos::PhotoStore;
use crate::util::geometry::{constrain_aspect, fit_aspect, rotated_bounds, CropRect};
use image::DynamicImage;
use std::sync::Arc;

/// Zoom bounds (100% to 300%).
pub mod zoom_bounds {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 3.0;
}

/// Image a session is framing.
#[derive(Debug, Clone)]
pub enum SourceImage {
    /// Freshly uploaded and already decoded.
    Decoded(Arc<DynamicImage>),
    /// A photo the user has used before, decoded only at commit.
    Existing(String),
}

/// Transient state of one photo acquisition.
pub struct CropSession {
    aspect: f64,
    source: Option<SourceImage>,
    /// Explicit region in the rotated frame; overrides zoom and pan but not
    /// the aspect ratio.
    crop: Option<CropRect>,
    pan: (f64, f64),
    zoom: f64,
    rotation: f64,
    zoom_range: (f64, f64),
    transformer: ImageTransformer,
    photos: Arc<dyn PhotoStore>,
}

impl CropSession {
    /// Start an empty session producing photos of the given width / height ratio.
    pub fn new(aspect: f64, photos: Arc<dyn PhotoStore>) -> Self {
        Self {
            aspect,
            source: None,
            crop: None,
            pan: (0.5, 0.5),
            zoom: zoom_bounds::MIN,
            rotation: 0.0,
            zoom_range: (zoom_bounds::MIN, zoom_bounds::MAX),
            transformer: ImageTransformer::default(),
            photos,
        }
    }

    pub fn with_transformer(mut self, transformer: ImageTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Override the zoom bounds. Inverted or sub-1.0 bounds are repaired.
    pub fn with_zoom_range(mut self, min: f64, max: f64) -> Self {
        let min = min.max(zoom_bounds::MIN);
        self.zoom_range = (min, max.max(min));
        self.zoom = self.zoom.clamp(self.zoom_range.0, self.zoom_range.1);
        self
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    pub fn pan(&self) -> (f64, f64) {
        self.pan
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Decode an uploaded file and make it the source.
    ///
    /// On failure the previous source stays in place.
    pub async fn load_from_file(&mut self, bytes: Vec<u8>) -> Result<()> {
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| EditorError::UnsupportedImage(format!("decoder task failed: {e}")))?
            .map_err(|e| EditorError::UnsupportedImage(e.to_string()))?;

        log::info!(
            "Loaded crop source ({}x{})",
            decoded.width(),
            decoded.height()
        );
        self.replace_source(SourceImage::Decoded(Arc::new(decoded)));
        Ok(())
    }

    /// Use a previously uploaded photo as the source.
    pub fn load_from_existing(&mut self, url: impl Into<String>) {
        self.replace_source(SourceImage::Existing(url.into()));
    }

    /// Drop the source so another image can be picked.
    pub fn change_image(&mut self) {
        self.source = None;
        self.reset_framing();
    }

    pub fn update_crop(&mut self, rect: CropRect) {
        if rect.is_finite() {
            self.crop = Some(rect.clamped());
        }
    }

    /// Move the center of the derived crop region (normalized).
    pub fn update_pan(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.pan = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
        }
    }

    pub fn update_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.zoom_range.0, self.zoom_range.1);
        }
    }

    /// Set the rotation, wrapped into [0, 360).
    pub fn update_rotation(&mut self, degrees: f64) {
        if degrees.is_finite() {
            let wrapped = degrees.rem_euclid(360.0);
            // rem_euclid rounds tiny negative angles up to 360.
            self.rotation = if wrapped >= 360.0 { 0.0 } else { wrapped };
        }
    }

    /// Crop region for a rotated frame of the given size, always at the
    /// session's aspect ratio.
    pub fn crop_region(&self, frame_width: u32, frame_height: u32) -> CropRect {
        match self.crop {
            Some(rect) => constrain_aspect(&rect, frame_width, frame_height, self.aspect),
            None => fit_aspect(frame_width, frame_height, self.aspect, self.zoom, self.pan),
        }
    }

    /// Rasterize the framed photo.
    ///
    /// Session state is left untouched whatever the outcome; closing the
    /// session is up to the caller.
    pub async fn commit(&self) -> Result<CroppedPhoto> {
        let source = self.source.as_ref().ok_or(EditorError::NoImageSelected)?;
        let image = self.resolve(source).await?;

        let (width, height) = rotated_bounds(image.width(), image.height(), self.rotation);
        let region = self.crop_region(width, height);
        let rotation = self.rotation;
        let transformer = self.transformer;

        let photo = tokio::task::spawn_blocking(move || transformer.transform(&image, &region, rotation))
            .await
            .map_err(|e| EditorError::TransformFailed(format!("transform task failed: {e}")))??;

        log::info!(
            "Committed crop {}x{} (rotation {:.1}, zoom {:.2})",
            photo.blob.width,
            photo.blob.height,
            self.rotation,
            self.zoom
        );
        Ok(photo)
    }

    /// Discard all session state.
    pub fn cancel(&mut self) {
        self.source = None;
        self.reset_framing();
    }

    fn replace_source(&mut self, source: SourceImage) {
        self.source = Some(source);
        self.reset_framing();
    }

    fn reset_framing(&mut self) {
        self.crop = None;
        self.pan = (0.5, 0.5);
        self.zoom = self.zoom_range.0;
        self.rotation = 0.0;
    }

    async fn resolve(&self, source: &SourceImage) -> Result<Arc<DynamicImage>> {
        let url = match source {
            SourceImage::Decoded(image) => return Ok(Arc::clone(image)),
            SourceImage::Existing(url) => url,
        };

        let bytes = match transform::decode_data_url(url) {
            Some(bytes) => bytes,
            None => self.photos.fetch(url).await.ok_or_else(|| {
                EditorError::TransformFailed(format!("photo no longer available: {url}"))
            })?,
        };

        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| EditorError::TransformFailed(format!("decoder task failed: {e}")))?
            .map_err(|e| EditorError::TransformFailed(format!("source not decodable: {e}")))?;
        Ok(Arc::new(image))
    }
}
