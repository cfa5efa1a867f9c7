//! MediaShrink Observability Module
//!
//! Structured logging for the compression service.
//!
//! # Features
//!
//! - **Multiple Output Formats**: Pretty, JSON, and compact output formats
//! - **Environment-based Filtering**: `RUST_LOG` is honoured when no level is configured
//! - **Span Context**: request spans from the HTTP layer carry through strategy logs
//!
//! # Example
//!
//! ```ignore
//! use mediashrink_observability::{init_tracing, LogFormat};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing(LogFormat::Json, Some("info")).unwrap();
//!     tracing::info!("Service started");
//! }
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
