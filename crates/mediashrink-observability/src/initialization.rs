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
//! Subscriber installation.
//!
//! One formatting layer, picked from [`LogFormat`] and the cosmetic switches
//! on [`LogConfig`], is stacked on a [`Registry`] underneath an
//! [`EnvFilter`]. The global subscriber can be set once per process; later
//! attempts return [`LogError::InitError`].

use crate::config::{LogConfig, LogError, LogFormat, LogOutput};
use std::io;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type FormatLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing with the specified format and optional log level.
///
/// # Example
///
/// ```ignore
/// use mediashrink_observability::{init_tracing, LogFormat};
///
/// init_tracing(LogFormat::Compact, Some("mediashrink_core=debug,info")).unwrap();
/// tracing::info!("Service started");
/// ```
pub fn init_tracing(format: LogFormat, level: Option<&str>) -> Result<(), LogError> {
    let config = match level {
        Some(level) => LogConfig::new().with_format(format).with_level(level),
        None => LogConfig::new().with_format(format),
    };
    init_tracing_with_config(config)
}

/// Initialize tracing with a detailed configuration.
pub fn init_tracing_with_config(config: LogConfig) -> Result<(), LogError> {
    let filter = build_env_filter(&config)?;

    Registry::default()
        .with(format_layer(&config))
        .with(filter)
        .try_init()
        .map_err(|e| LogError::InitError(e.to_string()))
}

/// Formatting layer for the configured output style
fn format_layer(config: &LogConfig) -> FormatLayer {
    let base = fmt::layer::<Registry>()
        .with_writer(writer_for(config.output))
        .with_target(config.include_targets);

    match (config.format, config.use_timestamps) {
        (LogFormat::Pretty, true) => base
            .pretty()
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        (LogFormat::Pretty, false) => base
            .pretty()
            .with_ansi(config.use_color)
            .with_span_events(FmtSpan::CLOSE)
            .without_time()
            .boxed(),
        (LogFormat::Compact, true) => base.compact().with_ansi(config.use_color).boxed(),
        (LogFormat::Compact, false) => base
            .compact()
            .with_ansi(config.use_color)
            .without_time()
            .boxed(),
        (LogFormat::Json, true) => base
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        (LogFormat::Json, false) => base
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .without_time()
            .boxed(),
    }
}

fn writer_for(output: LogOutput) -> fn() -> Box<dyn io::Write + Send> {
    match output {
        LogOutput::Stderr => || Box::new(io::stderr()),
        LogOutput::Stdout => || Box::new(io::stdout()),
    }
}

/// Level directives from the configuration, else `RUST_LOG`, else `info`
fn build_env_filter(config: &LogConfig) -> Result<EnvFilter, LogError> {
    let directives = config.get_effective_level();

    EnvFilter::try_new(&directives).map_err(|e| {
        LogError::ConfigError(format!("Failed to parse log filter '{}': {}", directives, e))
    })
}
