use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating service settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML in configuration file: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid YAML in configuration file: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    #[error("Invalid JSON in configuration file: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Unsupported configuration format '{0}' (expected toml, yaml, yml or json)")]
    UnsupportedFormat(String),

    #[error("Configuration file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Configuration path has no extension: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Cannot use {variable_name}={value}: {reason}")]
    EnvVarParsingError {
        variable_name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Required setting is empty: {0}")]
    MissingRequired(String),
}

impl ConfigError {
    pub fn env_var_parsing_error(
        variable_name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::EnvVarParsingError {
            variable_name: variable_name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_setting() {
        let err = ConfigError::invalid_value("image.jpeg_quality", "must be between 1 and 100");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'image.jpeg_quality': must be between 1 and 100"
        );

        let err = ConfigError::env_var_parsing_error("MEDIASHRINK_PORT", "http", "expected a number");
        assert_eq!(err.to_string(), "Cannot use MEDIASHRINK_PORT=http: expected a number");
    }
}
