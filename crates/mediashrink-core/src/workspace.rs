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
//! Per-request scratch staging
//!
//! Strategies that cannot work purely in memory allocate their files and
//! directories through a [`TempWorkspace`]. Every path is recorded at
//! allocation time, before anything is written to it, so a failure halfway
//! through a strategy still leaves the path on the deletion list.
//!
//! Release is guaranteed two ways:
//! - [`TempWorkspace::release`] hands deletion to a blocking task that keeps
//!   running even if the awaiting request future is dropped.
//! - [`Drop`] removes whatever is still registered when a workspace goes out
//!   of scope without being released (panic, cancellation, early return).

use crate::error::{CompressError, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// A path registered for deletion
#[derive(Debug, Clone, PartialEq, Eq)]
enum StagedPath {
    File(PathBuf),
    Dir(PathBuf),
}

impl StagedPath {
    fn path(&self) -> &Path {
        match self {
            StagedPath::File(p) | StagedPath::Dir(p) => p,
        }
    }
}

/// Outcome of a cleanup pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Paths that existed and were deleted
    pub removed: usize,

    /// Paths that were never created (nothing to delete)
    pub absent: usize,

    /// Paths whose deletion failed; each failure has been logged
    pub failed: Vec<PathBuf>,
}

impl CleanupReport {
    /// True when no deletion failed
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Scoped set of scratch paths for exactly one compression attempt
#[derive(Debug)]
pub struct TempWorkspace {
    root: PathBuf,
    staged: Vec<StagedPath>,
}

impl TempWorkspace {
    /// Open a workspace under `root`, creating the root if absent
    pub async fn acquire(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            CompressError::Workspace(format!(
                "failed to create scratch root {}: {}",
                root.display(),
                e
            ))
        })?;

        debug!(root = %root.display(), "Workspace acquired");
        Ok(Self {
            root,
            staged: Vec::new(),
        })
    }

    /// Scratch root this workspace allocates under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a uniquely named file path `<uuid>.<ext>`
    pub fn file(&mut self, ext: &str) -> PathBuf {
        let path = self.root.join(format!("{}.{}", Uuid::new_v4(), ext));
        self.staged.push(StagedPath::File(path.clone()));
        path
    }

    /// Allocate a uniquely named output file path `<uuid>-compressed.<ext>`
    pub fn output_file(&mut self, ext: &str) -> PathBuf {
        let path = self
            .root
            .join(format!("{}-compressed.{}", Uuid::new_v4(), ext));
        self.staged.push(StagedPath::File(path.clone()));
        path
    }

    /// Allocate a uniquely named directory path; removed recursively on release
    pub fn dir(&mut self) -> PathBuf {
        let path = self.root.join(Uuid::new_v4().to_string());
        self.staged.push(StagedPath::Dir(path.clone()));
        path
    }

    /// Every path allocated so far, in allocation order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.staged.iter().map(StagedPath::path)
    }

    /// Delete every allocated path
    ///
    /// Deletion failures are logged and reported, never returned as errors.
    pub async fn release(mut self) -> CleanupReport {
        let staged = std::mem::take(&mut self.staged);
        if staged.is_empty() {
            return CleanupReport::default();
        }

        let count = staged.len();
        match tokio::task::spawn_blocking(move || remove_staged(staged)).await {
            Ok(report) => {
                debug!(
                    paths = count,
                    removed = report.removed,
                    failed = report.failed.len(),
                    "Workspace released"
                );
                report
            }
            Err(e) => {
                warn!("Workspace cleanup task did not complete: {}", e);
                CleanupReport::default()
            }
        }
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        let staged = std::mem::take(&mut self.staged);
        warn!(
            paths = staged.len(),
            "Workspace dropped without release, cleaning up synchronously"
        );
        remove_staged(staged);
    }
}

fn remove_staged(staged: Vec<StagedPath>) -> CleanupReport {
    let mut report = CleanupReport::default();

    for entry in staged {
        let result = match &entry {
            StagedPath::File(p) => std::fs::remove_file(p),
            StagedPath::Dir(p) => std::fs::remove_dir_all(p),
        };

        match result {
            Ok(()) => report.removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => report.absent += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), "Failed to remove scratch path: {}", e);
                report.failed.push(entry.path().to_path_buf());
            }
        }
    }

    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_acquire_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("nested").join("scratch");

        let ws = TempWorkspace::acquire(&root).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(ws.root(), root.as_path());
        ws.release().await;
    }

    #[tokio::test]
    async fn test_paths_are_unique_and_under_root() {
        let temp = TempDir::new().unwrap();
        let mut ws = TempWorkspace::acquire(temp.path()).await.unwrap();

        let a = ws.file("mp4");
        let b = ws.file("mp4");
        let out = ws.output_file("mp4");
        let dir = ws.dir();

        assert_ne!(a, b);
        assert!(out.to_string_lossy().ends_with("-compressed.mp4"));
        for p in [&a, &b, &out, &dir] {
            assert_eq!(p.parent().unwrap(), temp.path());
        }
        assert_eq!(ws.paths().count(), 4);
        ws.release().await;
    }

    #[tokio::test]
    async fn test_release_removes_files_and_directories() {
        let temp = TempDir::new().unwrap();
        let mut ws = TempWorkspace::acquire(temp.path()).await.unwrap();

        let file = ws.file("zip");
        let dir = ws.dir();
        std::fs::write(&file, b"payload").unwrap();
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested").join("a.txt"), b"hello").unwrap();

        let report = ws.release().await;
        assert_eq!(report.removed, 2);
        assert!(report.is_clean());
        assert_eq!(entries(temp.path()), 0);
    }

    #[tokio::test]
    async fn test_release_tolerates_paths_never_created() {
        let temp = TempDir::new().unwrap();
        let mut ws = TempWorkspace::acquire(temp.path()).await.unwrap();

        let written = ws.file("mp4");
        let _never_written = ws.output_file("mp4");
        std::fs::write(&written, b"frames").unwrap();

        let report = ws.release().await;
        assert_eq!(report.removed, 1);
        assert_eq!(report.absent, 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_drop_without_release_cleans_up() {
        let temp = TempDir::new().unwrap();
        {
            let mut ws = TempWorkspace::acquire(temp.path()).await.unwrap();
            let file = ws.file("zip");
            std::fs::write(&file, b"partial").unwrap();
        }
        assert_eq!(entries(temp.path()), 0);
    }
}
