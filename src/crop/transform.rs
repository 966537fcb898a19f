// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rotate-then-crop rasterization for committed crops.
//!
//! The image is rotated clockwise around its center onto a canvas large
//! enough to hold it, then the crop rectangle is cut out of that rotated
//! frame. This is the geometry the crop preview shows, so the exported
//! pixels match what the user framed.

use crate::error::{EditorError, Result};
use crate::util::geometry::{denormalize_rect, rotated_bounds, CropRect};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Encoding used for cropped output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum OutputFormat {
    Png,
    Jpeg { quality: u8 },
}

impl OutputFormat {
    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg { .. } => "jpg",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpeg { quality: 90 }
    }
}

/// Encoded photo ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoBlob {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub width: u32,
    pub height: u32,
}

/// Result of a committed crop: a url for immediate display and the blob to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedPhoto {
    pub url: String,
    pub blob: PhotoBlob,
}

/// Stateless rotate/crop/encode engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTransformer {
    format: OutputFormat,
}

impl ImageTransformer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Rotate, crop and encode `image`.
    pub fn transform(
        &self,
        image: &DynamicImage,
        crop: &CropRect,
        rotation_degrees: f64,
    ) -> Result<CroppedPhoto> {
        let raster = rasterize(image, crop, rotation_degrees)?;
        let (width, height) = raster.dimensions();
        let bytes = encode(&raster, self.format)?;
        let mime = self.format.mime().to_string();

        Ok(CroppedPhoto {
            url: data_url(&mime, &bytes),
            blob: PhotoBlob {
                bytes,
                mime,
                width,
                height,
            },
        })
    }

    /// Same as [`transform`](Self::transform) for a still-encoded source.
    pub fn transform_encoded(
        &self,
        source: &[u8],
        crop: &CropRect,
        rotation_degrees: f64,
    ) -> Result<CroppedPhoto> {
        let image = image::load_from_memory(source)
            .map_err(|e| EditorError::TransformFailed(format!("source not decodable: {e}")))?;
        self.transform(&image, crop, rotation_degrees)
    }
}

/// Rotate then crop, without encoding.
pub fn rasterize(image: &DynamicImage, crop: &CropRect, rotation_degrees: f64) -> Result<DynamicImage> {
    let rotated = rotate(image, rotation_degrees);
    let (width, height) = rotated.dimensions();
    let px = denormalize_rect(crop, width, height).ok_or_else(|| {
        EditorError::TransformFailed(format!("crop region is empty in a {width}x{height} frame"))
    })?;
    Ok(rotated.crop_imm(px.x, px.y, px.width, px.height))
}

/// Rotate clockwise by `degrees` around the center.
///
/// Right angles are exact pixel moves; anything else is resampled
/// bilinearly onto an expanded, transparent canvas.
pub fn rotate(image: &DynamicImage, degrees: f64) -> DynamicImage {
    let degrees = degrees.rem_euclid(360.0);
    let quarter = (degrees / 90.0).round();
    if (degrees - quarter * 90.0).abs() < 1e-9 {
        return match quarter as u32 % 4 {
            0 => image.clone(),
            1 => image.rotate90(),
            2 => image.rotate180(),
            _ => image.rotate270(),
        };
    }
    DynamicImage::ImageRgba8(rotate_bilinear(&image.to_rgba8(), degrees))
}

fn rotate_bilinear(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let (src_w, src_h) = src.dimensions();
    let (out_w, out_h) = rotated_bounds(src_w, src_h, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let (src_cx, src_cy) = (f64::from(src_w) / 2.0, f64::from(src_h) / 2.0);
    let (out_cx, out_cy) = (f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);

    RgbaImage::from_fn(out_w, out_h, |ox, oy| {
        let dx = f64::from(ox) + 0.5 - out_cx;
        let dy = f64::from(oy) + 0.5 - out_cy;
        // Inverse of the clockwise rotation.
        let sx = dx * cos + dy * sin + src_cx - 0.5;
        let sy = -dx * sin + dy * cos + src_cy - 0.5;
        sample_bilinear(src, sx, sy)
    })
}

fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let texel = |px: i64, py: i64| -> [f64; 4] {
        if px < 0 || py < 0 || px >= w || py >= h {
            return [0.0; 4];
        }
        let p = src.get_pixel(px as u32, py as u32).0;
        [f64::from(p[0]), f64::from(p[1]), f64::from(p[2]), f64::from(p[3])]
    };

    let (a, b) = (texel(x0, y0), texel(x0 + 1, y0));
    let (c, d) = (texel(x0, y0 + 1), texel(x0 + 1, y0 + 1));

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = a[i] * (1.0 - fx) + b[i] * fx;
        let bottom = c[i] * (1.0 - fx) + d[i] * fx;
        out[i] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

/// Encode an image in the given output format.
pub fn encode(image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let outcome = match format {
        OutputFormat::Png => image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png),
        OutputFormat::Jpeg { quality } => {
            // JPEG has no alpha channel.
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)
        }
    };
    outcome.map_err(|e| EditorError::TransformFailed(format!("encoding failed: {e}")))?;
    Ok(bytes)
}

/// Build a `data:` url for the given payload.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Payload of a base64 `data:` url, or `None` for any other url.
pub fn decode_data_url(url: &str) -> Option<Vec<u8>> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    base64::engine::general_purpose::STANDARD.decode(payload).ok()
}
