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

//! Custom assertions for compression tests.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;

/// Assert that a directory exists and holds no entries.
pub fn assert_dir_empty(path: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(path)
        .unwrap_or_else(|e| panic!("read_dir {:?} failed: {}", path, e))
        .filter_map(|entry| entry.ok().map(|e| e.file_name()))
        .collect();
    assert!(
        leftovers.is_empty(),
        "expected {:?} to be empty, found {:?}",
        path,
        leftovers
    );
}

/// Assert that `path` has not been created.
pub fn assert_not_created(path: &Path) {
    assert!(!path.exists(), "{:?} should not have been created", path);
}

/// Assert that `data` is a decodable JPEG and return its dimensions.
pub fn assert_jpeg(data: &[u8]) -> (u32, u32) {
    assert_eq!(
        image::guess_format(data).ok(),
        Some(image::ImageFormat::Jpeg),
        "payload is not a JPEG"
    );
    let img = image::load_from_memory(data).expect("JPEG payload should decode");
    (img.width(), img.height())
}

/// Assert that `data` is a decodable PNG and return its dimensions.
pub fn assert_png(data: &[u8]) -> (u32, u32) {
    assert_eq!(
        image::guess_format(data).ok(),
        Some(image::ImageFormat::Png),
        "payload is not a PNG"
    );
    let img = image::load_from_memory(data).expect("PNG payload should decode");
    (img.width(), img.height())
}

/// Read every file entry of a ZIP archive, keyed by entry name.
///
/// Directory entries are skipped.
pub fn zip_contents(data: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).expect("payload should be a ZIP");
    let mut contents = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).expect("read zip entry");
        if entry.is_dir() {
            continue;
        }
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).expect("read zip entry data");
        contents.insert(entry.name().to_string(), buf);
    }
    contents
}

/// Assert that a ZIP archive holds exactly `expected` files.
pub fn assert_zip_entries(data: &[u8], expected: &[(&str, &[u8])]) {
    let actual = zip_contents(data);
    let expected: BTreeMap<String, Vec<u8>> = expected
        .iter()
        .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
        .collect();
    assert_eq!(actual, expected, "zip contents differ");
}
