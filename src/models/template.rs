// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Template registry.
//!
//! The closed set of block templates and the static table describing what
//! each one holds: how many text fields, how many photo slots and at which
//! aspect ratio, and whether it carries a map location.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aspect ratio of the full-width background panel (1200x760).
const BANNER_ASPECT: f64 = 1200.0 / 760.0;

/// Aspect ratio of the cover photo.
pub const COVER_ASPECT: f64 = 1.0;

/// Kind of block a page is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    TextPanel,
    FeaturePhoto,
    PhotoTriptych,
    FullBleed,
    PhotoGrid,
    MapWithPin,
}

/// Schema of one template kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateSpec {
    pub name: &'static str,
    pub text_slots: usize,
    /// Width / height of each photo slot, in slot order.
    pub photo_aspects: &'static [f64],
    pub has_location: bool,
}

const TEXT_PANEL: TemplateSpec = TemplateSpec {
    name: "text-panel",
    text_slots: 1,
    photo_aspects: &[],
    has_location: false,
};

const FEATURE_PHOTO: TemplateSpec = TemplateSpec {
    name: "feature-photo",
    text_slots: 1,
    photo_aspects: &[BANNER_ASPECT, 450.0 / 646.0],
    has_location: false,
};

const PHOTO_TRIPTYCH: TemplateSpec = TemplateSpec {
    name: "photo-triptych",
    text_slots: 1,
    photo_aspects: &[BANNER_ASPECT, 3.0 / 2.0, 1.0],
    has_location: false,
};

const FULL_BLEED: TemplateSpec = TemplateSpec {
    name: "full-bleed",
    text_slots: 0,
    photo_aspects: &[BANNER_ASPECT],
    has_location: false,
};

const PHOTO_GRID: TemplateSpec = TemplateSpec {
    name: "photo-grid",
    text_slots: 0,
    photo_aspects: &[1.0, 1.0, 1.0, 1.0],
    has_location: false,
};

const MAP_WITH_PIN: TemplateSpec = TemplateSpec {
    name: "map-with-pin",
    text_slots: 1,
    photo_aspects: &[],
    has_location: true,
};

impl TemplateKind {
    /// All kinds in picker order.
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::TextPanel,
        TemplateKind::FeaturePhoto,
        TemplateKind::PhotoTriptych,
        TemplateKind::FullBleed,
        TemplateKind::PhotoGrid,
        TemplateKind::MapWithPin,
    ];

    pub fn spec(self) -> &'static TemplateSpec {
        match self {
            TemplateKind::TextPanel => &TEXT_PANEL,
            TemplateKind::FeaturePhoto => &FEATURE_PHOTO,
            TemplateKind::PhotoTriptych => &PHOTO_TRIPTYCH,
            TemplateKind::FullBleed => &FULL_BLEED,
            TemplateKind::PhotoGrid => &PHOTO_GRID,
            TemplateKind::MapWithPin => &MAP_WITH_PIN,
        }
    }

    /// Look up a kind by its position in the picker.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn photo_slots(self) -> usize {
        self.spec().photo_aspects.len()
    }

    /// Aspect ratio of a photo slot, if the slot exists.
    pub fn slot_aspect(self, slot: usize) -> Option<f64> {
        self.spec().photo_aspects.get(slot).copied()
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    /// Accepts a template name (`photo-triptych`) or a picker index (`2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| format!("no template at index {index}"));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.spec().name == s)
            .ok_or_else(|| format!("unknown template: {s}"))
    }
}
