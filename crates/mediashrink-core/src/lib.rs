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
//! MediaShrink compression core
//!
//! Picks a compression strategy from an upload's declared file type and
//! runs it, staging intermediate files in per-request scratch workspaces
//! that are always cleaned up.
//!
//! This crate provides:
//! - File type classification by extension
//! - Image re-encoding (JPEG, PNG, WebP)
//! - Video transcoding through an external process, with pass-through fallback
//! - PDF image re-embedding
//! - ZIP extraction and maximum-level re-packing
//! - A strategy registry, dispatcher and response builder
//!
//! # Example
//!
//! ```no_run
//! use mediashrink_core::{CompressionDispatcher, CompressionRequest, StrategyRegistry};
//!
//! # async fn run() -> mediashrink_core::Result<()> {
//! let dispatcher = CompressionDispatcher::new(StrategyRegistry::default(), "./temp");
//! let request = CompressionRequest::new("photo.jpg", std::fs::read("photo.jpg")?);
//! let response = dispatcher.dispatch(&request).await?;
//! println!("{} -> {} bytes", response.original_size, response.bytes().len());
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod error;
pub mod file_type;
pub mod registry;
pub mod request;
pub mod response;
pub mod strategy;
pub mod workspace;

// Re-export commonly used types
pub use dispatcher::CompressionDispatcher;
pub use error::{CompressError, ErrorCategory, Result};
pub use file_type::FileTypeKey;
pub use registry::StrategyRegistry;
pub use request::CompressionRequest;
pub use response::{CompressedResponse, CompressedResult, ResponseBuilder};
pub use strategy::{
    ArchiveLimits, ArchiveStrategy, CompressionStrategy, DegradeReason, ImageStrategy,
    PdfSizePolicy, PdfStrategy, StrategyOutcome, TranscodeProfile, VideoStrategy,
};
pub use workspace::{CleanupReport, TempWorkspace};
