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
//! Request dispatch
//!
//! One call to [`CompressionDispatcher::dispatch`] walks a request through:
//!
//! ```text
//! Received ──(empty payload)──────────────► Rejected (NoFile)
//!    │
//!    ├─(no strategy for key)──────────────► Rejected (UnsupportedType)
//!    │
//!    ├─(in-memory strategy)──► Compressing ─► Responded / Failed
//!    │
//!    └─(staging strategy)──► Staged ─► Compressing ─► Cleaning ─► Responded / Failed
//! ```
//!
//! Rejection happens before any scratch path exists. Staged requests run on
//! their own task, so once a workspace has been acquired it is released on
//! every path out of `Compressing`, including when the caller stops waiting.

use crate::error::{CompressError, Result};
use crate::registry::StrategyRegistry;
use crate::request::CompressionRequest;
use crate::response::{CompressedResponse, ResponseBuilder};
use crate::strategy::{CompressionStrategy, StrategyOutcome};
use crate::workspace::TempWorkspace;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn, Instrument};

/// Selects and runs the strategy for each request
#[derive(Debug, Clone)]
pub struct CompressionDispatcher {
    registry: StrategyRegistry,
    scratch_root: PathBuf,
}

impl CompressionDispatcher {
    /// Create a dispatcher; `scratch_root` is created lazily on first use
    pub fn new(registry: StrategyRegistry, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            scratch_root: scratch_root.into(),
        }
    }

    /// Strategy table in use
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Directory workspaces are created under
    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Compress one request
    #[instrument(skip_all, fields(file_name = %request.file_name(), file_type = %request.file_type(), size = request.len()))]
    pub async fn dispatch(&self, request: &CompressionRequest) -> Result<CompressedResponse> {
        if request.is_empty() {
            return Err(CompressError::NoFile);
        }

        let strategy = self.registry.resolve(request.file_type())?;

        let outcome = if strategy.requires_workspace() {
            // Runs to completion and release even if this future is dropped
            let staged = tokio::spawn(
                run_staged(
                    strategy.clone(),
                    request.clone(),
                    self.scratch_root.clone(),
                )
                .in_current_span(),
            );
            staged.await?
        } else {
            strategy.compress(request, None).await
        };

        let outcome = outcome.map_err(|e| {
            error!(strategy = strategy.name(), "Compression failed: {}", e);
            e
        })?;

        let response = ResponseBuilder::for_request(request).build(outcome);
        match &response.degraded {
            Some(reason) => warn!(
                strategy = strategy.name(),
                reason = reason.tag(),
                "Returning original bytes: {}",
                reason
            ),
            None => info!(
                strategy = strategy.name(),
                output = response.bytes().len(),
                ratio = %format!("{:.3}", response.ratio()),
                "Compressed"
            ),
        }

        Ok(response)
    }
}

/// Acquire a workspace, compress, and release on every path out
async fn run_staged(
    strategy: CompressionStrategy,
    request: CompressionRequest,
    scratch_root: PathBuf,
) -> Result<StrategyOutcome> {
    let mut workspace = TempWorkspace::acquire(&scratch_root).await?;
    let outcome = strategy.compress(&request, Some(&mut workspace)).await;
    let report = workspace.release().await;
    if !report.is_clean() {
        warn!(
            failed = report.failed.len(),
            "Scratch paths left behind after compression"
        );
    }
    outcome
}
