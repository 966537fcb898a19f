// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Crop rectangles are kept in normalized coordinates (0.0 to 1.0) of the
//! rotated frame so they stay valid whatever the source resolution. These
//! helpers convert them to pixels and derive the default crop for a target
//! aspect ratio.

use serde::{Deserialize, Serialize};

/// A rectangle in normalized coordinates (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const FULL: CropRect = CropRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Clamp the rectangle into the unit square. NaN components become 0.
    pub fn clamped(self) -> Self {
        let x = unit(self.x, 1.0);
        let y = unit(self.y, 1.0);
        Self {
            x,
            y,
            width: unit(self.width, 1.0 - x),
            height: unit(self.height, 1.0 - y),
        }
    }
}

fn unit(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// A rectangle in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Convert a pixel rectangle to normalized coordinates.
pub fn normalize_rect(rect: PixelRect, width: u32, height: u32) -> CropRect {
    CropRect {
        x: f64::from(rect.x) / f64::from(width),
        y: f64::from(rect.y) / f64::from(height),
        width: f64::from(rect.width) / f64::from(width),
        height: f64::from(rect.height) / f64::from(height),
    }
}

/// Convert a normalized rectangle to pixels of a `width` x `height` frame.
///
/// The result is clamped to the frame. Returns `None` when the rectangle
/// covers less than one pixel in either direction.
pub fn denormalize_rect(rect: &CropRect, width: u32, height: u32) -> Option<PixelRect> {
    let rect = rect.clamped();
    let (w, h) = (f64::from(width), f64::from(height));

    let x = ((rect.x * w).round() as u32).min(width);
    let y = ((rect.y * h).round() as u32).min(height);
    let px_width = ((rect.width * w).round() as u32).min(width - x);
    let px_height = ((rect.height * h).round() as u32).min(height - y);

    if px_width == 0 || px_height == 0 {
        return None;
    }
    Some(PixelRect {
        x,
        y,
        width: px_width,
        height: px_height,
    })
}

/// Size of the canvas that holds a `width` x `height` image rotated by
/// `degrees` without clipping.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let (w, h) = (f64::from(width), f64::from(height));

    // Trim float noise so right angles do not grow by a pixel.
    let out_w = (w * cos + h * sin - 1e-6).ceil().max(1.0);
    let out_h = (w * sin + h * cos - 1e-6).ceil().max(1.0);
    (out_w as u32, out_h as u32)
}

/// Largest rectangle with the given aspect ratio that fits a
/// `frame_width` x `frame_height` frame, shrunk by `zoom` and centered on
/// `center` (normalized). The rectangle is shifted back inside the frame
/// when the center is too close to an edge.
pub fn fit_aspect(
    frame_width: u32,
    frame_height: u32,
    aspect: f64,
    zoom: f64,
    center: (f64, f64),
) -> CropRect {
    let (fw, fh) = (f64::from(frame_width), f64::from(frame_height));
    let zoom = zoom.max(1.0);

    let (mut w, mut h) = if fw / fh > aspect {
        (fh * aspect, fh)
    } else {
        (fw, fw / aspect)
    };
    w /= zoom;
    h /= zoom;

    let width = w / fw;
    let height = h / fh;
    let x = (center.0 - width / 2.0).clamp(0.0, (1.0 - width).max(0.0));
    let y = (center.1 - height / 2.0).clamp(0.0, (1.0 - height).max(0.0));

    CropRect {
        x,
        y,
        width,
        height,
    }
}

/// Shrink `rect` around its center until it has the given aspect ratio in
/// a `frame_width` x `frame_height` frame.
pub fn constrain_aspect(rect: &CropRect, frame_width: u32, frame_height: u32, aspect: f64) -> CropRect {
    let rect = rect.clamped();
    let (fw, fh) = (f64::from(frame_width), f64::from(frame_height));
    let (w, h) = (rect.width * fw, rect.height * fh);
    if !(aspect.is_finite() && aspect > 0.0) || w <= 0.0 || h <= 0.0 {
        return rect;
    }

    let (w, h) = if w / h > aspect { (h * aspect, h) } else { (w, w / aspect) };
    let width = w / fw;
    let height = h / fh;
    CropRect {
        x: rect.x + (rect.width - width) / 2.0,
        y: rect.y + (rect.height - height) / 2.0,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        let rect = PixelRect {
            x: 480,
            y: 270,
            width: 960,
            height: 540,
        };

        let normalized = normalize_rect(rect, 1920, 1080);
        let back = denormalize_rect(&normalized, 1920, 1080);

        assert_eq!(back, Some(rect));
    }

    #[test]
    fn test_denormalize_clamps_and_rejects_empty() {
        let spill = CropRect::new(0.5, 0.5, 1.0, 1.0);
        let px = denormalize_rect(&spill, 100, 80).unwrap();
        assert_eq!((px.x, px.y, px.width, px.height), (50, 40, 50, 40));

        let sliver = CropRect::new(0.0, 0.0, 0.001, 1.0);
        assert_eq!(denormalize_rect(&sliver, 100, 80), None);
    }

    #[test]
    fn test_rotated_bounds() {
        assert_eq!(rotated_bounds(400, 300, 0.0), (400, 300));
        assert_eq!(rotated_bounds(400, 300, 90.0), (300, 400));
        assert_eq!(rotated_bounds(400, 300, 180.0), (400, 300));

        let (w, h) = rotated_bounds(100, 100, 45.0);
        assert_eq!((w, h), (142, 142));
    }

    #[test]
    fn test_fit_aspect_square_in_landscape() {
        let rect = fit_aspect(200, 100, 1.0, 1.0, (0.5, 0.5));
        assert!((rect.width - 0.5).abs() < 1e-9);
        assert!((rect.height - 1.0).abs() < 1e-9);
        assert!((rect.x - 0.25).abs() < 1e-9);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn test_fit_aspect_zoom_and_edge_center() {
        let rect = fit_aspect(100, 100, 1.0, 2.0, (0.0, 1.0));
        assert!((rect.width - 0.5).abs() < 1e-9);
        assert_eq!(rect.x, 0.0);
        assert!((rect.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_tolerates_nan() {
        let rect = CropRect::new(f64::NAN, 0.2, f64::NAN, 2.0).clamped();
        assert_eq!(rect, CropRect::new(0.0, 0.2, 0.0, 0.8));
        assert!(!CropRect::new(0.0, f64::INFINITY, 1.0, 1.0).is_finite());
    }

    #[test]
    fn test_constrain_aspect_keeps_center() {
        let rect = constrain_aspect(&CropRect::FULL, 200, 100, 1.0);
        assert!((rect.x - 0.25).abs() < 1e-9);
        assert!((rect.width - 0.5).abs() < 1e-9);
        assert_eq!((rect.y, rect.height), (0.0, 1.0));

        let tall = constrain_aspect(&CropRect::new(0.0, 0.0, 0.5, 1.0), 100, 100, 1.0);
        assert!((tall.y - 0.25).abs() < 1e-9);
        assert!((tall.height - 0.5).abs() < 1e-9);
    }
}
