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
//! File-type specific compression strategies
//!
//! Each strategy implements one algorithm behind the same `compress`
//! contract. Strategies that stage data on disk declare it through
//! [`CompressionStrategy::requires_workspace`] and receive a
//! [`TempWorkspace`] from the dispatcher.
//!
//! # Supported Formats
//!
//! - **Images**: JPEG, PNG, WebP re-encoded in memory
//! - **Video**: MP4, MOV, MKV, AVI transcoded by an external process
//! - **PDF**: embedded images re-encoded and redrawn page by page
//! - **ZIP**: extracted and re-packed at maximum deflate level

pub mod archive;
pub mod image;
pub mod pdf;
pub mod video;

pub use self::archive::{ArchiveLimits, ArchiveStrategy};
pub use self::image::ImageStrategy;
pub use self::pdf::{PdfSizePolicy, PdfStrategy};
pub use self::video::{TranscodeProfile, VideoStrategy};

use crate::error::{CompressError, Result};
use crate::request::CompressionRequest;
use crate::workspace::TempWorkspace;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// Why a strategy passed the input through unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    /// Transcoder binary could not be found
    TranscoderMissing,

    /// Transcoder binary exists but could not be started
    TranscoderUnavailable(String),

    /// Transcoder ran and reported failure
    TranscoderFailed(String),

    /// Transcoder exceeded its time budget and was killed
    TranscoderTimedOut(Duration),

    /// Transcoder succeeded but its output could not be read back
    OutputUnreadable(String),

    /// Rewritten output was not smaller than the input
    NotSmaller,
}

impl DegradeReason {
    /// Short machine-readable tag, used as a response header value
    pub fn tag(&self) -> &'static str {
        match self {
            DegradeReason::TranscoderMissing => "transcoder-missing",
            DegradeReason::TranscoderUnavailable(_) => "transcoder-unavailable",
            DegradeReason::TranscoderFailed(_) => "transcoder-failed",
            DegradeReason::TranscoderTimedOut(_) => "transcoder-timeout",
            DegradeReason::OutputUnreadable(_) => "output-unreadable",
            DegradeReason::NotSmaller => "not-smaller",
        }
    }
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::TranscoderMissing => write!(f, "transcoder not found"),
            DegradeReason::TranscoderUnavailable(e) => write!(f, "transcoder could not start: {}", e),
            DegradeReason::TranscoderFailed(status) => write!(f, "transcoder failed: {}", status),
            DegradeReason::TranscoderTimedOut(limit) => {
                write!(f, "transcoder timed out after {}s", limit.as_secs())
            }
            DegradeReason::OutputUnreadable(e) => write!(f, "transcoder output unreadable: {}", e),
            DegradeReason::NotSmaller => write!(f, "output not smaller than input"),
        }
    }
}

/// Result of a successful strategy invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// The transform ran; bytes are its output
    Compressed(Bytes),

    /// The transform could not complete; bytes are the untouched input
    Degraded {
        /// Original payload
        bytes: Bytes,
        /// Cause of the degradation
        reason: DegradeReason,
    },
}

impl StrategyOutcome {
    /// Payload to return to the caller
    pub fn bytes(&self) -> &Bytes {
        match self {
            StrategyOutcome::Compressed(bytes) | StrategyOutcome::Degraded { bytes, .. } => bytes,
        }
    }

    /// True when the input was passed through unchanged
    pub fn is_degraded(&self) -> bool {
        matches!(self, StrategyOutcome::Degraded { .. })
    }

    /// Degradation cause, if any
    pub fn degrade_reason(&self) -> Option<&DegradeReason> {
        match self {
            StrategyOutcome::Degraded { reason, .. } => Some(reason),
            StrategyOutcome::Compressed(_) => None,
        }
    }
}

/// Compression strategy selected for a file type
#[derive(Debug, Clone)]
pub enum CompressionStrategy {
    /// In-memory raster re-encode
    Image(ImageStrategy),

    /// External transcoder with pass-through fallback
    Video(VideoStrategy),

    /// Per-image re-embed inside a PDF document
    Pdf(PdfStrategy),

    /// Extract and re-pack a ZIP archive
    Archive(ArchiveStrategy),
}

impl CompressionStrategy {
    /// Strategy name for logs
    pub fn name(&self) -> &'static str {
        match self {
            CompressionStrategy::Image(_) => "image",
            CompressionStrategy::Video(_) => "video",
            CompressionStrategy::Pdf(_) => "pdf",
            CompressionStrategy::Archive(_) => "archive",
        }
    }

    /// Whether the strategy stages data on disk
    pub fn requires_workspace(&self) -> bool {
        matches!(
            self,
            CompressionStrategy::Video(_) | CompressionStrategy::Archive(_)
        )
    }

    /// Compress one request
    ///
    /// `workspace` must be `Some` for strategies that require one.
    #[instrument(skip_all, fields(strategy = self.name(), file_name = %request.file_name()))]
    pub async fn compress(
        &self,
        request: &CompressionRequest,
        workspace: Option<&mut TempWorkspace>,
    ) -> Result<StrategyOutcome> {
        match (self, workspace) {
            (CompressionStrategy::Image(strategy), _) => strategy.compress(request).await,
            (CompressionStrategy::Pdf(strategy), _) => strategy.compress(request).await,
            (CompressionStrategy::Video(strategy), Some(workspace)) => {
                strategy.compress(request, workspace).await
            }
            (CompressionStrategy::Archive(strategy), Some(workspace)) => {
                strategy.compress(request, workspace).await
            }
            (strategy, None) => Err(CompressError::Workspace(format!(
                "{} strategy invoked without a workspace",
                strategy.name()
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_requirements() {
        assert!(!CompressionStrategy::Image(ImageStrategy::default()).requires_workspace());
        assert!(!CompressionStrategy::Pdf(PdfStrategy::default()).requires_workspace());
        assert!(CompressionStrategy::Video(VideoStrategy::default()).requires_workspace());
        assert!(CompressionStrategy::Archive(ArchiveStrategy::default()).requires_workspace());
    }

    #[test]
    fn test_outcome_accessors() {
        let compressed = StrategyOutcome::Compressed(Bytes::from_static(b"small"));
        assert!(!compressed.is_degraded());
        assert_eq!(compressed.bytes().as_ref(), b"small");
        assert!(compressed.degrade_reason().is_none());

        let degraded = StrategyOutcome::Degraded {
            bytes: Bytes::from_static(b"original"),
            reason: DegradeReason::TranscoderMissing,
        };
        assert!(degraded.is_degraded());
        assert_eq!(degraded.degrade_reason(), Some(&DegradeReason::TranscoderMissing));
    }

    #[test]
    fn test_degrade_reason_tags() {
        assert_eq!(DegradeReason::TranscoderMissing.tag(), "transcoder-missing");
        assert_eq!(
            DegradeReason::TranscoderTimedOut(Duration::from_secs(3)).to_string(),
            "transcoder timed out after 3s"
        );
        assert_eq!(DegradeReason::NotSmaller.tag(), "not-smaller");
    }

    #[tokio::test]
    async fn test_staging_strategy_without_workspace_fails() {
        let strategy = CompressionStrategy::Archive(ArchiveStrategy::default());
        let request = CompressionRequest::new("a.zip", vec![0u8; 4]);
        let err = strategy.compress(&request, None).await.unwrap_err();
        assert!(matches!(err, CompressError::Workspace(_)));
    }
}
