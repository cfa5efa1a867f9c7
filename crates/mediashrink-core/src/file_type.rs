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
//! File type classification
//!
//! Uploads are classified by the extension of their declared file name only.
//! The same key selects the strategy and the response MIME type.

use std::fmt;

/// Normalized lowercase extension used to select a compression strategy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileTypeKey {
    /// Extension taken from the final `.` segment of the file name
    Extension(String),

    /// No usable extension
    Unknown,
}

impl FileTypeKey {
    /// Derive the key from a declared file name
    ///
    /// `photo.JPG` becomes `jpg`, `archive.tar.gz` becomes `gz`. Names without
    /// a dot, or ending in one, are `Unknown`.
    pub fn from_file_name(file_name: &str) -> Self {
        let trimmed = file_name.trim();
        match trimmed.rsplit_once('.') {
            Some((_, ext)) if !ext.trim().is_empty() => Self::from_extension(ext),
            _ => FileTypeKey::Unknown,
        }
    }

    /// Build a key from a bare extension (leading dots are ignored)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if ext.is_empty() {
            FileTypeKey::Unknown
        } else {
            FileTypeKey::Extension(ext)
        }
    }

    /// Extension string, or `unknown`
    pub fn as_str(&self) -> &str {
        match self {
            FileTypeKey::Extension(ext) => ext,
            FileTypeKey::Unknown => "unknown",
        }
    }

    /// True when no extension could be derived
    pub fn is_unknown(&self) -> bool {
        matches!(self, FileTypeKey::Unknown)
    }

    /// MIME type of the compressed payload for this key
    ///
    /// Independent of strategy internals: JPEG and WebP both come back as
    /// JPEG, PNG stays PNG.
    pub fn mime_type(&self) -> &'static str {
        match self.as_str() {
            "zip" => "application/zip",
            "pdf" => "application/pdf",
            "png" => "image/png",
            "jpg" | "jpeg" | "webp" => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Display for FileTypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
