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

//! Fake transcoder executables.
//!
//! Each helper writes a small shell script standing in for the real
//! transcoder, so the video strategy's success, failure, timeout and
//! missing-binary paths can be tested without one installed.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A stand-in transcoder living in its own temporary directory.
pub struct FakeTranscoder {
    _dir: TempDir,
    path: PathBuf,
}

impl FakeTranscoder {
    /// Path to pass as the transcoder binary.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A path inside a fresh directory that does not exist.
    pub fn missing() -> Self {
        let dir = TempDir::new().expect("create transcoder dir");
        let path = dir.path().join("no-such-transcoder");
        Self { _dir: dir, path }
    }

    /// Exits with status 1 after writing to stderr.
    #[cfg(unix)]
    pub fn failing() -> Self {
        Self::script("echo 'simulated encoder failure' >&2\nexit 1\n")
    }

    /// Sleeps for `secs` seconds without producing output.
    #[cfg(unix)]
    pub fn sleeping(secs: u64) -> Self {
        Self::script(&format!("sleep {}\n", secs))
    }

    /// Copies the input (`-i <path>`) to the output (last argument).
    #[cfg(unix)]
    pub fn copying() -> Self {
        Self::script("in=\"$2\"\nfor last; do :; done\ncp \"$in\" \"$last\"\n")
    }

    /// Writes `payload` to the output (last argument), ignoring the input.
    #[cfg(unix)]
    pub fn writing(payload: &str) -> Self {
        Self::script(&format!(
            "for last; do :; done\nprintf '%s' '{}' > \"$last\"\n",
            payload
        ))
    }

    /// Succeeds without creating the output file.
    #[cfg(unix)]
    pub fn silent() -> Self {
        Self::script("exit 0\n")
    }

    /// An existing file without execute permission.
    #[cfg(unix)]
    pub fn not_executable() -> Self {
        let dir = TempDir::new().expect("create transcoder dir");
        let path = dir.path().join("transcoder");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write transcoder");
        Self { _dir: dir, path }
    }

    #[cfg(unix)]
    fn script(body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("create transcoder dir");
        let path = dir.path().join("transcoder");
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write transcoder");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("mark transcoder executable");
        Self { _dir: dir, path }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;

    #[test]
    fn test_copying_transcoder() {
        let fake = FakeTranscoder::copying();
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"frames").unwrap();

        let status = Command::new(fake.path())
            .arg("-i")
            .arg(&input)
            .arg("-crf")
            .arg("28")
            .arg(&output)
            .status()
            .unwrap();
        assert!(status.success());
        assert_eq!(std::fs::read(&output).unwrap(), b"frames");
    }

    #[test]
    fn test_missing_transcoder() {
        assert!(!FakeTranscoder::missing().path().exists());
    }
}
