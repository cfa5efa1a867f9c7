use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Scratch staging settings
    pub workspace: WorkspaceConfig,

    /// Raster image re-encoding
    pub image: ImageConfig,

    /// External transcoder settings
    pub video: VideoConfig,

    /// PDF image re-embedding
    pub pdf: PdfConfig,

    /// ZIP re-packing
    pub archive: ArchiveConfig,

    /// Observability settings
    pub observability: ObservabilityConfig,
}

impl Config {
    /// `host:port` string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Scratch staging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory per-request workspaces are created under
    pub scratch_root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            scratch_root: PathBuf::from("./temp"),
        }
    }
}

/// Raster image settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// JPEG quality (1-100) for JPEG and WebP inputs
    pub jpeg_quality: u8,

    /// PNG quality (1-100)
    pub png_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            jpeg_quality: 50,
            png_quality: 60,
        }
    }
}

/// External transcoder settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    /// Transcoder executable, looked up on `PATH` when not absolute
    pub transcoder_path: PathBuf,

    /// Video codec argument
    pub video_codec: String,

    /// Audio codec argument
    pub audio_codec: String,

    /// Constant rate factor (0-51)
    pub crf: u8,

    /// Encoder speed preset
    pub preset: String,

    /// Audio bitrate argument
    pub audio_bitrate: String,

    /// Wall-clock limit for one transcode, in seconds
    pub timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            transcoder_path: PathBuf::from("ffmpeg"),
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            crf: 28,
            preset: "fast".to_string(),
            audio_bitrate: "128k".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// What to return when a rewritten PDF is not smaller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PdfSizePolicySetting {
    /// Always return the rewritten document
    #[default]
    AlwaysKeep,

    /// Fall back to the upload when rewriting did not shrink it
    PreferSmaller,
}

/// PDF settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PdfConfig {
    /// JPEG quality (1-100) for re-embedded images
    pub jpeg_quality: u8,

    /// Size policy
    pub size_policy: PdfSizePolicySetting,
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            jpeg_quality: 50,
            size_policy: PdfSizePolicySetting::default(),
        }
    }
}

/// ZIP settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Deflate level (0-9)
    pub compression_level: u32,

    /// Maximum number of archive entries
    pub max_entries: usize,

    /// Maximum total extracted bytes
    pub max_extracted_bytes: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        ArchiveConfig {
            compression_level: 9,
            max_entries: 10_000,
            max_extracted_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

/// Observability settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Logging level
    pub log_level: String,

    /// Log format (pretty, compact, json)
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        ObservabilityConfig {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload_bytes() -> usize {
    512 * 1024 * 1024
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.workspace.scratch_root, PathBuf::from("./temp"));
        assert_eq!(config.video.crf, 28);
        assert_eq!(config.pdf.size_policy, PdfSizePolicySetting::AlwaysKeep);
        assert_eq!(config.archive.compression_level, 9);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config: Config = toml::from_str("[video]\ncrf = 30\n").unwrap();
        assert_eq!(config.video.crf, 30);
        assert_eq!(config.video.preset, "fast");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_size_policy_names() {
        let config: Config = toml::from_str("[pdf]\nsize_policy = \"prefer_smaller\"\n").unwrap();
        assert_eq!(config.pdf.size_policy, PdfSizePolicySetting::PreferSmaller);
    }
}
