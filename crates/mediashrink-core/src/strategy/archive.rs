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
//! ZIP re-compression
//!
//! Strictly ordered: persist the upload, extract it into a scratch
//! directory, re-pack that directory's contents at maximum deflate level,
//! read the new archive back. There is no pass-through fallback; a
//! malformed archive fails the request.

use super::StrategyOutcome;
use crate::error::{CompressError, Result};
use crate::request::CompressionRequest;
use crate::workspace::TempWorkspace;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tokio::task;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Maximum deflate level
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 9;

/// Extraction guard against archives that expand without bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Maximum number of entries in the central directory
    pub max_entries: usize,

    /// Maximum total bytes written during extraction
    pub max_extracted_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_extracted_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

/// Extract and re-pack strategy for ZIP archives
#[derive(Debug, Clone)]
pub struct ArchiveStrategy {
    /// Deflate level for the rebuilt archive (0-9)
    pub compression_level: i64,

    /// Extraction limits
    pub limits: ArchiveLimits,
}

impl Default for ArchiveStrategy {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            limits: ArchiveLimits::default(),
        }
    }
}

impl ArchiveStrategy {
    /// Create a strategy with an explicit level and limits
    pub fn new(compression_level: i64, limits: ArchiveLimits) -> Self {
        Self {
            compression_level,
            limits,
        }
    }

    pub(crate) async fn compress(
        &self,
        request: &CompressionRequest,
        workspace: &mut TempWorkspace,
    ) -> Result<StrategyOutcome> {
        let scratch_dir = workspace.dir();
        let uploaded = workspace.file("zip");
        let recompressed = workspace.output_file("zip");

        tokio::fs::write(&uploaded, request.bytes()).await?;

        let limits = self.limits;
        let level = self.compression_level;
        let packed = recompressed.clone();
        let entries = task::spawn_blocking(move || -> Result<usize> {
            let extracted = extract_archive(&uploaded, &scratch_dir, limits)?;
            debug!(bytes = extracted, "Archive extracted");
            pack_directory(&scratch_dir, &packed, level)
        })
        .await??;

        let data = tokio::fs::read(&recompressed).await?;
        info!(
            entries,
            input = request.len(),
            output = data.len(),
            "Archive recompressed"
        );
        Ok(StrategyOutcome::Compressed(data.into()))
    }
}

/// Extract every entry of `archive` under `dest`, returning bytes written
///
/// Entries whose names would land outside `dest` are rejected. The entry
/// count and the declared uncompressed total are checked against `limits`
/// before anything is written, and the bytes actually written are bounded
/// by the same budget.
pub fn extract_archive(archive: &Path, dest: &Path, limits: ArchiveLimits) -> Result<u64> {
    let mut zip = ZipArchive::new(File::open(archive)?)?;
    if zip.len() > limits.max_entries {
        return Err(CompressError::ArchiveLimit(format!(
            "{} entries, limit is {}",
            zip.len(),
            limits.max_entries
        )));
    }

    let declared = declared_size(&mut zip)?;
    if declared > limits.max_extracted_bytes {
        return Err(CompressError::ArchiveLimit(format!(
            "{} bytes declared, limit is {}",
            declared, limits.max_extracted_bytes
        )));
    }

    fs::create_dir_all(dest)?;
    let mut written: u64 = 0;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(CompressError::Archive(format!(
                "entry '{}' escapes the extraction directory",
                entry.name()
            )));
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let budget = limits.max_extracted_bytes.saturating_sub(written);
        let mut out = File::create(&target)?;
        written += io::copy(&mut (&mut entry).take(budget.saturating_add(1)), &mut out)?;
        if written > limits.max_extracted_bytes {
            return Err(CompressError::ArchiveLimit(format!(
                "more than {} bytes extracted",
                limits.max_extracted_bytes
            )));
        }
    }

    Ok(written)
}

/// Sum of the uncompressed sizes in the central directory
fn declared_size<R: Read + io::Seek>(zip: &mut ZipArchive<R>) -> Result<u64> {
    let mut total: u64 = 0;
    for index in 0..zip.len() {
        total = total.saturating_add(zip.by_index_raw(index)?.size());
    }
    Ok(total)
}

/// Pack the contents of `src` into a new archive at `dest`
///
/// Entry names are relative to `src` (the directory itself is not part of
/// any name) and always use `/` separators. Returns the number of entries.
pub fn pack_directory(src: &Path, dest: &Path, level: i64) -> Result<usize> {
    let mut writer = ZipWriter::new(File::create(dest)?);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level));
    let mut entries = 0;

    for item in WalkDir::new(src).min_depth(1).sort_by_file_name() {
        let item = item.map_err(|e| CompressError::Archive(e.to_string()))?;
        let relative = item
            .path()
            .strip_prefix(src)
            .map_err(|e| CompressError::Archive(e.to_string()))?;
        let name = entry_name(relative);

        let file_type = item.file_type();
        if file_type.is_dir() {
            writer.add_directory(format!("{}/", name), options)?;
        } else if file_type.is_file() {
            writer.start_file(name, options)?;
            io::copy(&mut File::open(item.path())?, &mut writer)?;
        } else {
            // symlinks and special files are not carried over
            continue;
        }
        entries += 1;
    }

    writer.finish()?;
    Ok(entries)
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in files {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let path: std::path::PathBuf = ["b", "c.txt"].iter().collect();
        assert_eq!(entry_name(&path), "b/c.txt");
    }

    #[test]
    fn test_extract_enforces_entry_limit() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("many.zip");
        write_zip(&archive, &[("a", b"1"), ("b", b"2"), ("c", b"3")]);

        let limits = ArchiveLimits {
            max_entries: 2,
            ..ArchiveLimits::default()
        };
        let err = extract_archive(&archive, &temp.path().join("out"), limits).unwrap_err();
        assert!(matches!(err, CompressError::ArchiveLimit(_)));
    }

    #[test]
    fn test_extract_enforces_size_limit() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("big.zip");
        let payload = vec![b'x'; 4096];
        write_zip(&archive, &[("big.bin", &payload)]);

        let limits = ArchiveLimits {
            max_extracted_bytes: 1024,
            ..ArchiveLimits::default()
        };
        let out_dir = temp.path().join("out");
        let err = extract_archive(&archive, &out_dir, limits).unwrap_err();
        assert!(matches!(err, CompressError::ArchiveLimit(_)));
        // rejected from the central directory alone
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_declared_size_sums_entries() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("sizes.zip");
        write_zip(&archive, &[("a", &[1u8; 300]), ("b/c", &[2u8; 700])]);

        let mut zip = ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        assert_eq!(declared_size(&mut zip).unwrap(), 1000);
    }

    #[test]
    fn test_extract_then_pack() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("in.zip");
        write_zip(&archive, &[("a.txt", b"hello"), ("b/c.txt", b"world")]);

        let out_dir = temp.path().join("out");
        let written = extract_archive(&archive, &out_dir, ArchiveLimits::default()).unwrap();
        assert_eq!(written, 10);
        assert_eq!(fs::read(out_dir.join("b").join("c.txt")).unwrap(), b"world");

        let packed = temp.path().join("packed.zip");
        let entries = pack_directory(&out_dir, &packed, 9).unwrap();
        // a.txt, b/, b/c.txt
        assert_eq!(entries, 3);

        let mut zip = ZipArchive::new(File::open(&packed).unwrap()).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b/", "b/c.txt"]);

        let mut content = String::new();
        zip.by_name("b/c.txt").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "world");
    }

    #[test]
    fn test_malformed_archive_is_an_error() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, b"PK\x03\x04 this is not a zip").unwrap();

        let err = extract_archive(&archive, &temp.path().join("out"), ArchiveLimits::default())
            .unwrap_err();
        assert!(matches!(err, CompressError::Archive(_)));
    }
}
