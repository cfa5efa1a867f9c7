use crate::error::{ConfigError, ConfigResult};
use crate::schema::Config;
use crate::validation::Validator;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, info};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "MEDIASHRINK_";

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::InvalidPath(path.to_path_buf())),
        }
    }

    /// Get format name as string
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    validate: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        ConfigLoader { validate: true }
    }

    /// Create a loader without validation
    pub fn without_validation() -> Self {
        ConfigLoader { validate: false }
    }

    /// Load configuration from a file
    pub async fn load_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        debug!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).await?;

        info!(
            "Loaded {} configuration file: {}",
            format.name(),
            path.display()
        );

        self.load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(&self, content: &str, format: ConfigFormat) -> ConfigResult<Config> {
        let config: Config = match format {
            ConfigFormat::Toml => toml::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };

        debug!("Configuration loaded from {}", format.name());

        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    /// Load a file (or defaults when `path` is `None`), then apply
    /// environment overrides and validate the result
    pub async fn load_with_overrides(&self, path: Option<&Path>) -> ConfigResult<Config> {
        let mut config = match path {
            Some(path) => ConfigLoader::without_validation().load_file(path).await?,
            None => {
                debug!("No configuration file given, using defaults");
                Config::default()
            }
        };

        self.apply_env_overrides(&mut config)?;

        if self.validate {
            config.validate()?;
            info!("Configuration validated successfully");
        }

        Ok(config)
    }

    /// Apply `MEDIASHRINK_*` environment variable overrides
    pub fn apply_env_overrides(&self, config: &mut Config) -> ConfigResult<()> {
        self.apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Keys are the full variable names, e.g. `MEDIASHRINK_PORT`.
    pub fn apply_overrides_from<F>(&self, config: &mut Config, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        // Server settings
        if let Some(value) = var("HOST") {
            config.server.host = value;
        }
        if let Some(value) = var("PORT") {
            config.server.port = parse_number("PORT", &value, "expected valid port number (1-65535)")?;
        }
        if let Some(value) = var("MAX_UPLOAD_BYTES") {
            config.server.max_upload_bytes =
                parse_number("MAX_UPLOAD_BYTES", &value, "expected byte count")?;
        }

        // Workspace settings
        if let Some(value) = var("SCRATCH_ROOT") {
            config.workspace.scratch_root = PathBuf::from(value);
        }

        // Video settings
        if let Some(value) = var("TRANSCODER_PATH") {
            config.video.transcoder_path = PathBuf::from(value);
        }
        if let Some(value) = var("TRANSCODE_TIMEOUT_SECS") {
            config.video.timeout_secs =
                parse_number("TRANSCODE_TIMEOUT_SECS", &value, "expected whole seconds")?;
        }

        // Observability settings
        if let Some(value) = var("LOG_LEVEL") {
            config.observability.log_level = value.to_lowercase();
        }
        if let Some(value) = var("LOG_FORMAT") {
            config.observability.log_format = value.to_lowercase();
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_number<T: FromStr>(name: &str, value: &str, reason: &str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::env_var_parsing_error(format!("{}{}", ENV_PREFIX, name), value, reason)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path("config.toml").unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path("config.yaml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("config.yml").unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path("config.json").unwrap(), ConfigFormat::Json);
    }

    #[test]
    fn test_format_detection_error() {
        assert!(ConfigFormat::from_path("config.xml").is_err());
        assert!(ConfigFormat::from_path("config").is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let loader = ConfigLoader::new();
        let mut config = Config::default();
        loader
            .apply_overrides_from(
                &mut config,
                lookup(&[
                    ("MEDIASHRINK_HOST", "0.0.0.0"),
                    ("MEDIASHRINK_PORT", "8088"),
                    ("MEDIASHRINK_SCRATCH_ROOT", "/var/tmp/shrink"),
                    ("MEDIASHRINK_TRANSCODER_PATH", "/opt/ffmpeg/bin/ffmpeg"),
                    ("MEDIASHRINK_TRANSCODE_TIMEOUT_SECS", "45"),
                    ("MEDIASHRINK_LOG_LEVEL", "DEBUG"),
                    ("MEDIASHRINK_LOG_FORMAT", "json"),
                    ("MEDIASHRINK_MAX_UPLOAD_BYTES", "1048576"),
                ]),
            )
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8088");
        assert_eq!(config.workspace.scratch_root, PathBuf::from("/var/tmp/shrink"));
        assert_eq!(config.video.transcoder_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.video.timeout_secs, 45);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.server.max_upload_bytes, 1_048_576);
    }

    #[test]
    fn test_bad_override_is_reported() {
        let loader = ConfigLoader::new();
        let mut config = Config::default();
        let err = loader
            .apply_overrides_from(&mut config, lookup(&[("MEDIASHRINK_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EnvVarParsingError { ref variable_name, .. } if variable_name == "MEDIASHRINK_PORT"
        ));
    }

    #[test]
    fn test_parse_each_format() {
        let loader = ConfigLoader::new();

        let toml = "[server]\nport = 4000\n";
        assert_eq!(loader.load_from_string(toml, ConfigFormat::Toml).unwrap().server.port, 4000);

        let yaml = "server:\n  port: 4001\n";
        assert_eq!(loader.load_from_string(yaml, ConfigFormat::Yaml).unwrap().server.port, 4001);

        let json = r#"{"server": {"port": 4002}}"#;
        assert_eq!(loader.load_from_string(json, ConfigFormat::Json).unwrap().server.port, 4002);
    }

    #[test]
    fn test_validation_can_be_skipped() {
        let json = r#"{"image": {"jpeg_quality": 0}}"#;
        assert!(ConfigLoader::new().load_from_string(json, ConfigFormat::Json).is_err());
        assert!(ConfigLoader::without_validation()
            .load_from_string(json, ConfigFormat::Json)
            .is_ok());
    }
}
