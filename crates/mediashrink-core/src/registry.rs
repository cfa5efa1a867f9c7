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
//! Strategy registry
//!
//! Maps a [`FileTypeKey`] to the [`CompressionStrategy`] that handles it.
//! Built once at startup and shared read-only across requests.

use crate::error::{CompressError, Result};
use crate::file_type::FileTypeKey;
use crate::strategy::{
    ArchiveStrategy, CompressionStrategy, ImageStrategy, PdfStrategy, VideoStrategy,
};
use std::collections::HashMap;

/// Extensions handled by the image strategy
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Extensions handled by the video strategy
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi"];

/// Extensions handled by the PDF strategy
pub const PDF_EXTENSIONS: &[&str] = &["pdf"];

/// Extensions handled by the archive strategy
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip"];

/// Lookup table from file type key to strategy
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, CompressionStrategy>,
}

impl StrategyRegistry {
    /// Registry with no entries; every lookup is unsupported
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Standard extension table with the given strategy settings
    pub fn with_strategies(
        image: ImageStrategy,
        video: VideoStrategy,
        pdf: PdfStrategy,
        archive: ArchiveStrategy,
    ) -> Self {
        let mut registry = Self::empty();
        for ext in IMAGE_EXTENSIONS {
            registry.register(ext, CompressionStrategy::Image(image.clone()));
        }
        for ext in VIDEO_EXTENSIONS {
            registry.register(ext, CompressionStrategy::Video(video.clone()));
        }
        for ext in PDF_EXTENSIONS {
            registry.register(ext, CompressionStrategy::Pdf(pdf.clone()));
        }
        for ext in ARCHIVE_EXTENSIONS {
            registry.register(ext, CompressionStrategy::Archive(archive.clone()));
        }
        registry
    }

    /// Map an extension to a strategy, returning the entry it replaced
    pub fn register(
        &mut self,
        extension: &str,
        strategy: CompressionStrategy,
    ) -> Option<CompressionStrategy> {
        let key = FileTypeKey::from_extension(extension);
        self.strategies.insert(key.as_str().to_string(), strategy)
    }

    /// Strategy for a key, or `UnsupportedType`
    pub fn resolve(&self, key: &FileTypeKey) -> Result<&CompressionStrategy> {
        match key {
            FileTypeKey::Extension(ext) => self
                .strategies
                .get(ext)
                .ok_or_else(|| CompressError::UnsupportedType(ext.clone())),
            FileTypeKey::Unknown => Err(CompressError::UnsupportedType(key.to_string())),
        }
    }

    /// Whether a key resolves to a strategy
    pub fn supports(&self, key: &FileTypeKey) -> bool {
        self.resolve(key).is_ok()
    }

    /// Registered extensions in sorted order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_strategies(
            ImageStrategy::default(),
            VideoStrategy::default(),
            PdfStrategy::default(),
            ArchiveStrategy::default(),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let registry = StrategyRegistry::default();
        assert_eq!(
            registry.keys(),
            vec!["avi", "jpeg", "jpg", "mkv", "mov", "mp4", "pdf", "png", "webp", "zip"]
        );

        let strategy = registry
            .resolve(&FileTypeKey::from_file_name("scan.PDF"))
            .unwrap();
        assert_eq!(strategy.name(), "pdf");
        assert_eq!(
            registry.resolve(&FileTypeKey::from_extension("mkv")).unwrap().name(),
            "video"
        );
    }

    #[test]
    fn test_unsupported_keys() {
        let registry = StrategyRegistry::default();
        for name in ["setup.exe", "README", "trailing.", "photo.gif"] {
            let err = registry.resolve(&FileTypeKey::from_file_name(name)).unwrap_err();
            assert!(matches!(err, CompressError::UnsupportedType(_)), "{}", name);
        }
    }

    #[test]
    fn test_register_normalizes_and_replaces() {
        let mut registry = StrategyRegistry::empty();
        assert!(!registry.supports(&FileTypeKey::from_extension("gif")));

        let previous = registry.register(".GIF", CompressionStrategy::Image(ImageStrategy::default()));
        assert!(previous.is_none());
        assert!(registry.supports(&FileTypeKey::from_file_name("anim.gif")));

        let previous = registry.register("gif", CompressionStrategy::Pdf(PdfStrategy::default()));
        assert_eq!(previous.map(|s| s.name()), Some("image"));
    }
}
