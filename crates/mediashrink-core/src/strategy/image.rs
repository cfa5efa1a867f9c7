// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Raster image re-encoding
//!
//! PNG input stays PNG (lossless, encoder effort chosen from the quality
//! setting); every other supported raster type is re-encoded as baseline
//! JPEG. No resizing is performed.

use super::StrategyOutcome;
use crate::error::{CompressError, Result};
use crate::request::CompressionRequest;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::DynamicImage;
use tokio::task;
use tracing::debug;

/// Default JPEG quality for lossy re-encodes
pub const DEFAULT_JPEG_QUALITY: u8 = 50;

/// Default PNG quality setting
pub const DEFAULT_PNG_QUALITY: u8 = 60;

/// Output container chosen for an input key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageTarget {
    Png,
    Jpeg,
}

impl ImageTarget {
    fn for_extension(ext: &str) -> Self {
        if ext == "png" {
            ImageTarget::Png
        } else {
            ImageTarget::Jpeg
        }
    }
}

/// In-memory raster re-encoder
#[derive(Debug, Clone)]
pub struct ImageStrategy {
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// PNG quality (1-100), mapped to deflate effort
    pub png_quality: u8,
}

impl Default for ImageStrategy {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            png_quality: DEFAULT_PNG_QUALITY,
        }
    }
}

impl ImageStrategy {
    /// Create a strategy with explicit quality targets
    pub fn new(jpeg_quality: u8, png_quality: u8) -> Self {
        Self {
            jpeg_quality,
            png_quality,
        }
    }

    pub(crate) async fn compress(&self, request: &CompressionRequest) -> Result<StrategyOutcome> {
        let data = request.bytes().clone();
        let target = ImageTarget::for_extension(request.file_type().as_str());
        let jpeg_quality = self.jpeg_quality;
        let png_quality = self.png_quality;

        // Decoding and encoding are CPU bound
        let output = task::spawn_blocking(move || match target {
            ImageTarget::Png => reencode_png(&data, png_quality),
            ImageTarget::Jpeg => reencode_jpeg(&data, jpeg_quality),
        })
        .await??;

        debug!(
            format = ?target,
            input = request.len(),
            output = output.len(),
            "Image re-encoded"
        );
        Ok(StrategyOutcome::Compressed(output.into()))
    }
}

/// A freshly encoded JPEG plus the facts needed to embed it elsewhere
#[derive(Debug, Clone)]
pub struct JpegImage {
    /// Encoded JPEG bytes
    pub data: Vec<u8>,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// True when encoded with a single luma channel
    pub grayscale: bool,
}

/// Decode any supported raster and re-encode it as JPEG
pub fn reencode_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    Ok(reencode_jpeg_image(data, quality)?.data)
}

/// Decode any supported raster and re-encode it as JPEG, keeping dimensions
pub fn reencode_jpeg_image(data: &[u8], quality: u8) -> Result<JpegImage> {
    let img = image::load_from_memory(data)?;
    let quality = quality.clamp(1, 100);
    let mut output = Vec::new();

    // JPEG has no alpha channel; grey stays grey, everything else becomes RGB
    let grayscale = {
        let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);
        match &img {
            DynamicImage::ImageLuma8(gray) => {
                encoder.encode_image(gray)?;
                true
            }
            other => {
                encoder.encode_image(&other.to_rgb8())?;
                false
            }
        }
    };

    Ok(JpegImage {
        width: img.width(),
        height: img.height(),
        data: output,
        grayscale,
    })
}

/// Decode a raster and re-encode it as PNG
pub fn reencode_png(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    let mut output = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut output, png_compression(quality), FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(|e| CompressError::Image(format!("PNG encoding error: {}", e)))?;
    Ok(output)
}

fn png_compression(quality: u8) -> CompressionType {
    match quality {
        0..=30 => CompressionType::Fast,
        31..=70 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}
