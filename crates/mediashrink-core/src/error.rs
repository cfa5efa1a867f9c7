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
//! Error types for the compression dispatcher and its strategies

use thiserror::Error;

/// Who is at fault when a request does not produce a compressed result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The upload itself is unusable (missing, unsupported type)
    Client,

    /// A strategy or the staging area failed while handling a valid upload
    Internal,
}

/// Compression errors
#[derive(Debug, Error)]
pub enum CompressError {
    /// No file payload was supplied
    #[error("No file provided")]
    NoFile,

    /// The declared file name maps to no registered strategy
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// Raster decode or re-encode failure
    #[error("Image processing error: {0}")]
    Image(String),

    /// PDF parse or serialisation failure
    #[error("PDF processing error: {0}")]
    Pdf(String),

    /// ZIP extraction or re-compression failure
    #[error("Archive processing error: {0}")]
    Archive(String),

    /// Archive rejected before extraction because it declares too much content
    #[error("Archive exceeds extraction limit: {0}")]
    ArchiveLimit(String),

    /// Scratch area could not be prepared
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl CompressError {
    /// Classify the error for the response layer
    pub fn category(&self) -> ErrorCategory {
        match self {
            CompressError::NoFile | CompressError::UnsupportedType(_) => ErrorCategory::Client,
            _ => ErrorCategory::Internal,
        }
    }

    /// True for errors caused by the upload rather than by the server
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Client
    }
}

impl From<image::ImageError> for CompressError {
    fn from(err: image::ImageError) -> Self {
        CompressError::Image(err.to_string())
    }
}

impl From<lopdf::Error> for CompressError {
    fn from(err: lopdf::Error) -> Self {
        CompressError::Pdf(err.to_string())
    }
}

impl From<zip::result::ZipError> for CompressError {
    fn from(err: zip::result::ZipError) -> Self {
        CompressError::Archive(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CompressError {
    fn from(err: tokio::task::JoinError) -> Self {
        CompressError::Task(err.to_string())
    }
}

/// Result type for compression operations
pub type Result<T> = std::result::Result<T, CompressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert_eq!(CompressError::NoFile.category(), ErrorCategory::Client);
        assert!(CompressError::UnsupportedType("exe".to_string()).is_client_error());
    }

    #[test]
    fn test_internal_errors() {
        assert_eq!(
            CompressError::Image("bad header".to_string()).category(),
            ErrorCategory::Internal
        );
        assert!(!CompressError::ArchiveLimit("too many entries".to_string()).is_client_error());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(CompressError::from(io).category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CompressError::NoFile.to_string(), "No file provided");
        assert_eq!(
            CompressError::UnsupportedType("exe".to_string()).to_string(),
            "Unsupported file type: exe"
        );
    }
}
