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

//! # MediaShrink Test Utilities
//!
//! Shared test utilities for MediaShrink crates providing:
//! - Generated media fixtures (images, archives, PDFs)
//! - Fake transcoder executables for exercising the video fallback paths
//! - Custom assertions for scratch directories and archive contents

pub mod assertions;
pub mod fixtures;
pub mod transcoder;

// Re-export commonly used items at crate root
pub use assertions::*;
pub use fixtures::{SharedResources, TestFixtures};
pub use transcoder::FakeTranscoder;
