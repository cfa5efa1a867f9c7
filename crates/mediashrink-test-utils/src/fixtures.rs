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

//! Generated test fixtures.
//!
//! Every fixture is built in memory so tests never depend on checked-in
//! binary files.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Image placed on one page of a generated PDF.
#[derive(Debug, Clone)]
pub enum PdfPageImage {
    /// A valid DCT-encoded image
    Jpeg(Vec<u8>),
    /// A stream that claims DCTDecode but holds garbage
    Malformed,
    /// No image resource on the page
    None,
}

/// How the pages of a generated PDF reach a shared resource dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedResources {
    /// Every page holds a reference to one Resources object
    Indirect,
    /// Only the page tree root declares Resources; pages inherit it
    Inherited,
}

/// Test fixture generators.
pub struct TestFixtures;

impl TestFixtures {
    /// A smooth gradient with some noise, so encoders have real work to do.
    pub fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let noise = ((x * 31 + y * 17) % 13) as u8;
            Rgb([
                ((x * 255) / width.max(1)) as u8 ^ noise,
                ((y * 255) / height.max(1)) as u8,
                (((x + y) * 127) / (width + height).max(1)) as u8,
            ])
        })
    }

    /// PNG encoding of [`TestFixtures::gradient`].
    pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        Self::gradient(width, height)
            .write_to(&mut out, ImageFormat::Png)
            .expect("encode png fixture");
        out.into_inner()
    }

    /// High quality JPEG encoding of [`TestFixtures::gradient`].
    pub fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        Self::jpeg_with_quality(width, height, 95)
    }

    /// JPEG encoding of [`TestFixtures::gradient`] at `quality`.
    pub fn jpeg_with_quality(width: u32, height: u32, quality: u8) -> Vec<u8> {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality)
            .encode_image(&Self::gradient(width, height))
            .expect("encode jpeg fixture");
        out
    }

    /// Lossless WebP encoding of [`TestFixtures::gradient`].
    pub fn sample_webp(width: u32, height: u32) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        Self::gradient(width, height)
            .write_to(&mut out, ImageFormat::WebP)
            .expect("encode webp fixture");
        out.into_inner()
    }

    /// Repeating text payload of exactly `size` bytes.
    pub fn compressible_text(size: usize) -> Vec<u8> {
        let pattern = b"MediaShrink compressible fixture line\n";
        pattern.iter().copied().cycle().take(size).collect()
    }

    /// ZIP archive holding `files`, stored without compression.
    ///
    /// Names ending in `/` become directory entries.
    pub fn sample_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in files {
            if name.ends_with('/') {
                writer
                    .add_directory(*name, options)
                    .expect("add zip directory");
            } else {
                writer.start_file(*name, options).expect("start zip entry");
                writer.write_all(data).expect("write zip entry");
            }
        }
        writer.finish().expect("finish zip fixture").into_inner()
    }

    /// Minimal PDF with one page per element of `pages`.
    ///
    /// Each page draws a small rectangle and, depending on its
    /// [`PdfPageImage`], references one image XObject named `Im0`.
    pub fn sample_pdf(pages: &[PdfPageImage]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();

        for page in pages {
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                b"0 0 1 rg 10 10 50 50 re f\n".to_vec(),
            ));

            let mut xobjects = Dictionary::new();
            match page {
                PdfPageImage::Jpeg(data) => {
                    let decoded = image::load_from_memory(data).expect("decode jpeg fixture");
                    let image_id = doc.add_object(Self::image_stream(
                        decoded.width(),
                        decoded.height(),
                        data.clone(),
                    ));
                    xobjects.set("Im0", image_id);
                }
                PdfPageImage::Malformed => {
                    let image_id =
                        doc.add_object(Self::image_stream(8, 8, b"not a jpeg at all".to_vec()));
                    xobjects.set("Im0", image_id);
                }
                PdfPageImage::None => {}
            }

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! { "XObject" => xobjects },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise pdf fixture");
        out
    }

    /// PDF whose `page_count` pages all draw one JPEG through a single
    /// shared resource dictionary.
    pub fn sample_pdf_shared_image(
        page_count: usize,
        jpeg: Vec<u8>,
        sharing: SharedResources,
    ) -> Vec<u8> {
        let decoded = image::load_from_memory(&jpeg).expect("decode jpeg fixture");
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Self::image_stream(decoded.width(), decoded.height(), jpeg));
        let resources = dictionary! { "XObject" => dictionary! { "Im0" => image_id } };
        let resources_id = doc.add_object(resources.clone());
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"q 100 0 0 100 0 0 cm /Im0 Do Q\n".to_vec(),
        ));

        let kids: Vec<Object> = (0..page_count)
            .map(|_| {
                let mut page = dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                };
                if sharing == SharedResources::Indirect {
                    page.set("Resources", resources_id);
                }
                Object::Reference(doc.add_object(page))
            })
            .collect();

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        };
        if sharing == SharedResources::Inherited {
            pages.set("Resources", resources);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("serialise pdf fixture");
        out
    }

    fn image_stream(width: u32, height: u32, data: Vec<u8>) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            data,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_fixtures_decode() {
        for data in [
            TestFixtures::sample_png(16, 8),
            TestFixtures::sample_jpeg(16, 8),
            TestFixtures::sample_webp(16, 8),
        ] {
            let img = image::load_from_memory(&data).unwrap();
            assert_eq!((img.width(), img.height()), (16, 8));
        }
    }

    #[test]
    fn test_pdf_fixture_pages() {
        let data = TestFixtures::sample_pdf(&[
            PdfPageImage::Jpeg(TestFixtures::sample_jpeg(8, 8)),
            PdfPageImage::Malformed,
            PdfPageImage::None,
        ]);
        let doc = Document::load_mem(&data).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_shared_image_pdf_pages() {
        for sharing in [SharedResources::Indirect, SharedResources::Inherited] {
            let data =
                TestFixtures::sample_pdf_shared_image(4, TestFixtures::sample_jpeg(8, 8), sharing);
            let doc = Document::load_mem(&data).unwrap();
            assert_eq!(doc.get_pages().len(), 4);
        }
    }

    #[test]
    fn test_compressible_text_size() {
        assert_eq!(TestFixtures::compressible_text(1000).len(), 1000);
    }
}
