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
//! Response construction
//!
//! Turns a strategy outcome into the payload, MIME type and download name
//! returned to the client. The MIME type depends only on the request's
//! [`FileTypeKey`](crate::file_type::FileTypeKey).

use crate::request::CompressionRequest;
use crate::strategy::{DegradeReason, StrategyOutcome};
use bytes::Bytes;

/// Prefix for the suggested download name
pub const OUTPUT_PREFIX: &str = "compressed-";

/// Output bytes paired with their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedResult {
    /// Compressed (or passed-through) payload
    pub bytes: Bytes,

    /// MIME type derived from the request's file type key
    pub mime_type: &'static str,
}

/// Everything the transport layer needs to answer a request
#[derive(Debug, Clone)]
pub struct CompressedResponse {
    /// Payload and MIME type
    pub result: CompressedResult,

    /// Suggested download name, already prefixed and sanitised
    pub file_name: String,

    /// Size of the uploaded payload
    pub original_size: usize,

    /// Set when a strategy passed the input through unchanged
    pub degraded: Option<DegradeReason>,
}

impl CompressedResponse {
    /// Payload to send
    pub fn bytes(&self) -> &Bytes {
        &self.result.bytes
    }

    /// Content-Type value
    pub fn mime_type(&self) -> &'static str {
        self.result.mime_type
    }

    /// Content-Disposition value
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }

    /// True when the payload is the unmodified upload
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// Output size divided by input size
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 1.0;
        }
        self.result.bytes.len() as f64 / self.original_size as f64
    }
}

/// Builds a [`CompressedResponse`] for one request
#[derive(Debug)]
pub struct ResponseBuilder<'a> {
    request: &'a CompressionRequest,
}

impl<'a> ResponseBuilder<'a> {
    /// Start a response for `request`
    pub fn for_request(request: &'a CompressionRequest) -> Self {
        Self { request }
    }

    /// Finish the response with a strategy outcome
    pub fn build(self, outcome: StrategyOutcome) -> CompressedResponse {
        let (bytes, degraded) = match outcome {
            StrategyOutcome::Compressed(bytes) => (bytes, None),
            StrategyOutcome::Degraded { bytes, reason } => (bytes, Some(reason)),
        };

        CompressedResponse {
            result: CompressedResult {
                bytes,
                mime_type: self.request.file_type().mime_type(),
            },
            file_name: suggested_file_name(self.request.file_name()),
            original_size: self.request.len(),
            degraded,
        }
    }
}

/// `compressed-<name>` with any directory prefix removed
///
/// Quotes, backslashes, control characters and non-ASCII characters are
/// replaced with `_` so the name can sit inside a quoted header parameter.
pub fn suggested_file_name(declared: &str) -> String {
    let base = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(declared);

    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{}{}", OUTPUT_PREFIX, sanitized)
}
