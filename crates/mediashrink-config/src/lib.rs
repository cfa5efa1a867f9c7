//! Configuration management for the MediaShrink compression service
//!
//! Settings come from a TOML, YAML or JSON file (format chosen by extension),
//! every section falling back to defaults, followed by `MEDIASHRINK_*`
//! environment overrides and validation.
//!
//! # Example
//!
//! ```no_run
//! use mediashrink_config::ConfigLoader;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader = ConfigLoader::new();
//!     let config = loader
//!         .load_with_overrides(Some(Path::new("mediashrink.toml")))
//!         .await?;
//!
//!     println!("Listening on {}", config.bind_address());
//!     println!("Scratch root: {}", config.workspace.scratch_root.display());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

// Re-export commonly used items
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader, ENV_PREFIX};
pub use schema::*;
pub use validation::Validator;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("scratch_root"));
        assert!(json.contains("always_keep"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
