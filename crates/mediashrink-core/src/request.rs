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
//! Inbound compression request

use crate::file_type::FileTypeKey;
use bytes::Bytes;

/// An uploaded file awaiting compression
///
/// Immutable once built. The payload is reference counted so a degraded
/// strategy can hand the original bytes back without copying them.
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    bytes: Bytes,
    file_name: String,
    file_type: FileTypeKey,
}

impl CompressionRequest {
    /// Build a request from a declared file name and its payload
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let file_type = FileTypeKey::from_file_name(&file_name);
        Self {
            bytes: bytes.into(),
            file_name,
            file_type,
        }
    }

    /// Raw uploaded bytes
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// File name as declared by the client
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Type key derived from the declared file name
    pub fn file_type(&self) -> &FileTypeKey {
        &self.file_type
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-byte upload
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
