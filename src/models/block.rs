// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Page block data structures.
//!
//! A block is one addressable unit of a project: a template kind plus the
//! fields that kind defines. Which of the optional fields exist is decided
//! by the template alone; fields a template does not define are absent.

use super::template::TemplateKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a block within a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(String);

impl BlockKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A map pin. Either coordinate may be unset while the user has not placed it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl GeoLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    /// Both coordinates are present.
    pub fn is_set(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }

    /// Neither coordinate is present.
    pub fn is_unset(&self) -> bool {
        self.lat.is_none() && self.lng.is_none()
    }
}

/// One block of a project page sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBlock {
    key: BlockKey,
    template_type: TemplateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text_content: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geo_location: Option<GeoLocation>,
}

impl PageBlock {
    /// Create a block of the given kind with a fresh key and default fields.
    pub fn new(template: TemplateKind) -> Self {
        Self::with_key(BlockKey::generate(), template)
    }

    /// Create a block with an explicit key and default fields.
    pub fn with_key(key: BlockKey, template: TemplateKind) -> Self {
        let spec = template.spec();
        Self {
            key,
            template_type: template,
            text_content: (spec.text_slots > 0).then(|| vec![String::new(); spec.text_slots]),
            photo_urls: (!spec.photo_aspects.is_empty())
                .then(|| vec![String::new(); spec.photo_aspects.len()]),
            geo_location: spec.has_location.then(GeoLocation::default),
        }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn template(&self) -> TemplateKind {
        self.template_type
    }

    pub fn text(&self) -> Option<&[String]> {
        self.text_content.as_deref()
    }

    pub fn photos(&self) -> Option<&[String]> {
        self.photo_urls.as_deref()
    }

    pub fn location(&self) -> Option<&GeoLocation> {
        self.geo_location.as_ref()
    }

    /// Replace one text field. Returns false if the field does not exist.
    pub(crate) fn set_text(&mut self, field: usize, value: String) -> bool {
        match self.text_content.as_mut().and_then(|text| text.get_mut(field)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Replace one photo slot. Returns false if the slot does not exist.
    pub(crate) fn set_photo(&mut self, slot: usize, url: String) -> bool {
        match self.photo_urls.as_mut().and_then(|urls| urls.get_mut(slot)) {
            Some(current) => {
                *current = url;
                true
            }
            None => false,
        }
    }

    /// Overwrite the map pin. Returns false if this block has no location.
    pub(crate) fn set_location(&mut self, location: GeoLocation) -> bool {
        match self.geo_location.as_mut() {
            Some(current) => {
                *current = location;
                true
            }
            None => false,
        }
    }

    pub(crate) fn rekey(&mut self, key: BlockKey) {
        self.key = key;
    }

    /// True when no field carries user content.
    ///
    /// Whitespace-only text, empty photo urls and a partially placed pin all
    /// count as blank.
    pub fn is_blank(&self) -> bool {
        let text_blank = self
            .text()
            .map_or(true, |fields| fields.iter().all(|t| t.trim().is_empty()));
        let photos_blank = self
            .photos()
            .map_or(true, |urls| urls.iter().all(String::is_empty));
        let location_blank = self.location().map_or(true, |loc| !loc.is_set());
        text_blank && photos_blank && location_blank
    }

    /// Bring the fields in line with the template schema.
    ///
    /// Vectors are padded with empty entries or truncated, missing fields get
    /// defaults and fields the template does not define are dropped. Returns
    /// true if anything changed.
    pub(crate) fn conform(&mut self) -> bool {
        let spec = self.template_type.spec();
        let mut changed = false;

        changed |= conform_vec(&mut self.text_content, spec.text_slots);
        changed |= conform_vec(&mut self.photo_urls, spec.photo_aspects.len());

        match (spec.has_location, self.geo_location.is_some()) {
            (true, false) => {
                self.geo_location = Some(GeoLocation::default());
                changed = true;
            }
            (false, true) => {
                self.geo_location = None;
                changed = true;
            }
            _ => {}
        }

        changed
    }
}

fn conform_vec(field: &mut Option<Vec<String>>, len: usize) -> bool {
    if len == 0 {
        return field.take().is_some();
    }
    match field {
        Some(values) if values.len() == len => false,
        Some(values) => {
            values.resize(len, String::new());
            true
        }
        None => {
            *field = Some(vec![String::new(); len]);
            true
        }
    }
}
