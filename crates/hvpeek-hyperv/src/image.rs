//! Thumbnail framebuffer assembly.
//!
//! The remote thumbnail API returns packed 16-bit color samples; the exact
//! channel layout (BGR 5-6-5) is a negotiated constant of that API, not a
//! choice made here. This module only describes the buffer — stride,
//! dimensions, format — and rejects buffers inconsistent with them.

use crate::error::{HyperVError, HyperVResult};
use serde::{Deserialize, Serialize};

/// Pixel format of a preview framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PixelFormat {
    /// Packed 16-bit color, 5 bits blue / 6 green / 5 red.
    Bgr565,
}

impl PixelFormat {
    pub fn bits_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgr565 => 16,
        }
    }
}

/// Bytes per row for a given width and pixel format, rounded up to whole
/// bytes.
pub fn stride_for(width: u16, format: PixelFormat) -> usize {
    (usize::from(width) * format.bits_per_pixel() + 7) / 8
}

/// A displayable description of a VM console thumbnail: raw pixel data plus
/// everything a renderer needs to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewImage {
    pub width: u16,
    pub height: u16,
    pub stride: usize,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl PreviewImage {
    /// Assemble a preview image from the raw thumbnail buffer and the
    /// dimensions that were requested from the host. Fails fast on an empty
    /// buffer or one whose length disagrees with `stride * height`.
    pub fn from_thumbnail(data: Vec<u8>, width: u16, height: u16) -> HyperVResult<Self> {
        let format = PixelFormat::Bgr565;

        if data.is_empty() {
            return Err(HyperVError::image_format("thumbnail buffer is empty"));
        }

        let stride = stride_for(width, format);
        let expected = stride * usize::from(height);
        if data.len() != expected {
            return Err(HyperVError::image_format(format!(
                "thumbnail buffer is {} bytes, expected {} for {}x{} at {} bpp",
                data.len(),
                expected,
                width,
                height,
                format.bits_per_pixel(),
            )));
        }

        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }
}
