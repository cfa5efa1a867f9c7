use anyhow::{Context, Result};
use clap::Parser;
use mediashrink_config::{Config, ConfigLoader, Validator};
use std::path::PathBuf;

/// Command line arguments for the server binary
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "mediashrink-server", version, about = "File compression service")]
pub struct ServerArgs {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host to bind to, overrides the configuration file and environment
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overrides the configuration file and environment
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServerArgs {
    /// Apply command line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

/// Load configuration: file (or defaults), environment, then command line
pub async fn load(args: &ServerArgs) -> Result<Config> {
    let mut config = ConfigLoader::without_validation()
        .load_with_overrides(args.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = ServerArgs::parse_from([
            "mediashrink-server",
            "--config",
            "shrink.toml",
            "--host",
            "0.0.0.0",
            "--port",
            "8081",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("shrink.toml")));

        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config.bind_address(), "0.0.0.0:8081");
    }

    #[test]
    fn test_no_args_keeps_config() {
        let args = ServerArgs::parse_from(["mediashrink-server"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[tokio::test]
    async fn test_port_zero_is_rejected() {
        let args = ServerArgs {
            port: Some(0),
            ..ServerArgs::default()
        };
        assert!(load(&args).await.is_err());
    }
}
