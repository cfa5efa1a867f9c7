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
//! Video transcoding through an external process
//!
//! The input is staged to disk, handed to the transcoder with a fixed
//! argument profile, and the output file is read back. Any failure of the
//! transcoder itself (missing binary, non-zero exit, timeout, unreadable
//! output) degrades to returning the original bytes. Only failing to stage
//! the input is fatal.

use super::{DegradeReason, StrategyOutcome};
use crate::error::Result;
use crate::request::CompressionRequest;
use crate::workspace::TempWorkspace;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Default transcoder time budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Stderr lines kept for the failure diagnostic
const STDERR_TAIL_LINES: usize = 20;

/// Codec and quality flags passed to the transcoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeProfile {
    /// Video codec (`-vcodec`)
    pub video_codec: String,

    /// Audio codec (`-acodec`)
    pub audio_codec: String,

    /// Constant rate factor (`-crf`)
    pub crf: u8,

    /// Encoder preset (`-preset`)
    pub preset: String,

    /// Audio bitrate (`-b:a`)
    pub audio_bitrate: String,
}

impl Default for TranscodeProfile {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 28,
            preset: "fast".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

impl TranscodeProfile {
    /// Full argument list for one transcode
    pub fn args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        vec![
            "-i".into(),
            input.as_os_str().to_owned(),
            "-vcodec".into(),
            self.video_codec.clone().into(),
            "-crf".into(),
            self.crf.to_string().into(),
            "-preset".into(),
            self.preset.clone().into(),
            "-acodec".into(),
            self.audio_codec.clone().into(),
            "-b:a".into(),
            self.audio_bitrate.clone().into(),
            output.as_os_str().to_owned(),
        ]
    }
}

/// External-process video transcoder with pass-through fallback
#[derive(Debug, Clone)]
pub struct VideoStrategy {
    /// Transcoder executable (name on `PATH` or absolute path)
    pub transcoder: PathBuf,

    /// Argument profile
    pub profile: TranscodeProfile,

    /// Wall-clock limit for one transcode
    pub timeout: Duration,
}

impl Default for VideoStrategy {
    fn default() -> Self {
        Self {
            transcoder: PathBuf::from("ffmpeg"),
            profile: TranscodeProfile::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl VideoStrategy {
    /// Create a strategy for a specific transcoder binary
    pub fn new(transcoder: impl Into<PathBuf>, profile: TranscodeProfile, timeout: Duration) -> Self {
        Self {
            transcoder: transcoder.into(),
            profile,
            timeout,
        }
    }

    pub(crate) async fn compress(
        &self,
        request: &CompressionRequest,
        workspace: &mut TempWorkspace,
    ) -> Result<StrategyOutcome> {
        let ext = request.file_type().as_str().to_string();
        let input = workspace.file(&ext);
        let output = workspace.output_file(&ext);

        tokio::fs::write(&input, request.bytes()).await?;

        let reason = match self.transcode(&input, &output).await {
            Ok(()) => match tokio::fs::read(&output).await {
                Ok(data) => {
                    info!(input = request.len(), output = data.len(), "Video transcoded");
                    return Ok(StrategyOutcome::Compressed(data.into()));
                }
                Err(e) => DegradeReason::OutputUnreadable(e.to_string()),
            },
            Err(reason) => reason,
        };

        warn!("Video processing failed, returning original bytes: {}", reason);
        Ok(StrategyOutcome::Degraded {
            bytes: request.bytes().clone(),
            reason,
        })
    }

    /// Run the transcoder once; the error side is the degradation cause
    async fn transcode(&self, input: &Path, output: &Path) -> std::result::Result<(), DegradeReason> {
        let mut child = Command::new(&self.transcoder)
            .args(self.profile.args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    warn!(transcoder = %self.transcoder.display(), "Transcoder not found, skipping compression");
                    DegradeReason::TranscoderMissing
                } else {
                    DegradeReason::TranscoderUnavailable(e.to_string())
                }
            })?;

        let stderr_task = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "mediashrink::transcoder", "{}", line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
                tail
            })
        });

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(DegradeReason::TranscoderFailed(e.to_string())),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out transcoder: {}", e);
                }
                return Err(DegradeReason::TranscoderTimedOut(self.timeout));
            }
        };

        let tail = match stderr_task {
            Some(handle) => handle.await.unwrap_or_default(),
            None => VecDeque::new(),
        };

        if status.success() {
            Ok(())
        } else {
            let diagnostic = tail.into_iter().collect::<Vec<_>>().join("\n");
            warn!(%status, stderr = %diagnostic, "Transcoder exited with failure");
            Err(DegradeReason::TranscoderFailed(status.to_string()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_args() {
        let args = TranscodeProfile::default().args(Path::new("/tmp/in.mp4"), Path::new("/tmp/out.mp4"));
        let args: Vec<String> = args.into_iter().map(|a| a.into_string().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-i", "/tmp/in.mp4", "-vcodec", "libx264", "-crf", "28", "-preset", "fast",
                "-acodec", "aac", "-b:a", "128k", "/tmp/out.mp4",
            ]
        );
    }

    #[test]
    fn test_custom_profile_args() {
        let profile = TranscodeProfile {
            crf: 32,
            preset: "veryfast".to_string(),
            ..TranscodeProfile::default()
        };
        let args = profile.args(Path::new("a.mov"), Path::new("b.mov"));
        assert!(args.contains(&OsString::from("32")));
        assert!(args.contains(&OsString::from("veryfast")));
        assert_eq!(args.last(), Some(&OsString::from("b.mov")));
    }

    #[test]
    fn test_default_strategy() {
        let strategy = VideoStrategy::default();
        assert_eq!(strategy.transcoder, PathBuf::from("ffmpeg"));
        assert_eq!(strategy.timeout, DEFAULT_TIMEOUT);
    }
}
