use mediashrink_config::{Config, PdfSizePolicySetting};
use mediashrink_core::{
    ArchiveLimits, ArchiveStrategy, CompressionDispatcher, ImageStrategy, PdfSizePolicy,
    PdfStrategy, StrategyRegistry, TranscodeProfile, VideoStrategy,
};
use std::time::Duration;

/// Shared application state
pub struct AppState {
    /// Strategy selection and execution
    pub dispatcher: CompressionDispatcher,

    /// Request body limit in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create state around an existing dispatcher
    pub fn new(dispatcher: CompressionDispatcher, max_upload_bytes: usize) -> Self {
        Self {
            dispatcher,
            max_upload_bytes,
        }
    }

    /// Build the strategy table and dispatcher from service settings
    pub fn from_config(config: &Config) -> Self {
        let image = ImageStrategy::new(config.image.jpeg_quality, config.image.png_quality);

        let video = VideoStrategy::new(
            config.video.transcoder_path.clone(),
            TranscodeProfile {
                video_codec: config.video.video_codec.clone(),
                audio_codec: config.video.audio_codec.clone(),
                crf: config.video.crf,
                preset: config.video.preset.clone(),
                audio_bitrate: config.video.audio_bitrate.clone(),
            },
            Duration::from_secs(config.video.timeout_secs),
        );

        let size_policy = match config.pdf.size_policy {
            PdfSizePolicySetting::AlwaysKeep => PdfSizePolicy::AlwaysKeep,
            PdfSizePolicySetting::PreferSmaller => PdfSizePolicy::PreferSmaller,
        };
        let pdf = PdfStrategy::new(config.pdf.jpeg_quality, size_policy);

        let archive = ArchiveStrategy::new(
            i64::from(config.archive.compression_level),
            ArchiveLimits {
                max_entries: config.archive.max_entries,
                max_extracted_bytes: config.archive.max_extracted_bytes,
            },
        );

        let registry = StrategyRegistry::with_strategies(image, video, pdf, archive);
        let dispatcher =
            CompressionDispatcher::new(registry, config.workspace.scratch_root.clone());

        Self::new(dispatcher, config.server.max_upload_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediashrink_core::{CompressionStrategy, FileTypeKey};
    use std::path::Path;

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.video.transcoder_path = "/opt/bin/ffmpeg".into();
        config.video.timeout_secs = 12;
        config.workspace.scratch_root = "/tmp/shrink".into();

        let state = AppState::from_config(&config);
        assert_eq!(state.dispatcher.scratch_root(), Path::new("/tmp/shrink"));
        assert_eq!(state.max_upload_bytes, 512 * 1024 * 1024);

        match state
            .dispatcher
            .registry()
            .resolve(&FileTypeKey::from_extension("mkv"))
        {
            Ok(CompressionStrategy::Video(video)) => {
                assert_eq!(video.transcoder, Path::new("/opt/bin/ffmpeg"));
                assert_eq!(video.timeout, Duration::from_secs(12));
            }
            other => panic!("expected video strategy, got {:?}", other),
        }
    }
}
