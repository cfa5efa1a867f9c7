use crate::error::{ConfigError, ConfigResult};
use crate::schema::*;

/// Validator for configuration settings
pub trait Validator {
    fn validate(&self) -> ConfigResult<()>;
}

impl Validator for Config {
    fn validate(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.workspace.validate()?;
        self.image.validate()?;
        self.video.validate()?;
        self.pdf.validate()?;
        self.archive.validate()?;
        self.observability.validate()?;
        Ok(())
    }
}

impl Validator for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingRequired("server.host".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::invalid_value(
                "server.port",
                format!("port must be between 1 and 65535, got {}", self.port),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_upload_bytes",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validator for WorkspaceConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.scratch_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired(
                "workspace.scratch_root".to_string(),
            ));
        }
        Ok(())
    }
}

impl Validator for ImageConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_quality("image.jpeg_quality", self.jpeg_quality)?;
        validate_quality("image.png_quality", self.png_quality)
    }
}

impl Validator for VideoConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.transcoder_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired(
                "video.transcoder_path".to_string(),
            ));
        }

        if self.crf > 51 {
            return Err(ConfigError::invalid_value(
                "video.crf",
                format!("must be between 0 and 51, got {}", self.crf),
            ));
        }

        for (field, value) in [
            ("video.video_codec", &self.video_codec),
            ("video.audio_codec", &self.audio_codec),
            ("video.preset", &self.preset),
            ("video.audio_bitrate", &self.audio_bitrate),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingRequired(field.to_string()));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "video.timeout_secs",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validator for PdfConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_quality("pdf.jpeg_quality", self.jpeg_quality)
    }
}

impl Validator for ArchiveConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.compression_level > 9 {
            return Err(ConfigError::invalid_value(
                "archive.compression_level",
                format!("must be between 0 and 9, got {}", self.compression_level),
            ));
        }

        if self.max_entries == 0 {
            return Err(ConfigError::invalid_value(
                "archive.max_entries",
                "must be greater than 0",
            ));
        }

        if self.max_extracted_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "archive.max_extracted_bytes",
                "must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validator for ObservabilityConfig {
    fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["debug", "info", "warn", "error", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ConfigError::invalid_value(
                "observability.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        Ok(())
    }
}

fn validate_quality(field: &str, quality: u8) -> ConfigResult<()> {
    if !(1..=100).contains(&quality) {
        return Err(ConfigError::invalid_value(
            field,
            format!("must be between 1 and 100, got {}", quality),
        ));
    }
    Ok(())
}
