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
//! PDF compression by re-embedding page images
//!
//! Every page's XObject resources are scanned for filtered image streams.
//! Each image is decoded, re-encoded as JPEG, embedded as a new XObject and
//! drawn over the full page box. Images are isolated from each other: one
//! that cannot be decoded or embedded is logged and left as it was, and the
//! rest of the document is still processed.

use super::image::reencode_jpeg_image;
use super::{DegradeReason, StrategyOutcome};
use crate::error::{CompressError, Result};
use crate::request::CompressionRequest;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use tokio::task;
use tracing::{info, warn};

/// Default JPEG quality for re-embedded images
pub const DEFAULT_PDF_JPEG_QUALITY: u8 = 50;

/// Parent chain depth limit when resolving inherited page attributes
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when neither the page nor its ancestors declare a MediaBox
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// What to do when the rewritten document is not smaller than the upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfSizePolicy {
    /// Always return the rewritten document
    #[default]
    AlwaysKeep,

    /// Return the original bytes (degraded) when rewriting did not shrink it
    PreferSmaller,
}

/// Image re-embedding strategy for PDF documents
#[derive(Debug, Clone)]
pub struct PdfStrategy {
    /// JPEG quality (1-100) for re-encoded images
    pub jpeg_quality: u8,

    /// Size policy for the rewritten document
    pub size_policy: PdfSizePolicy,
}

impl Default for PdfStrategy {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_PDF_JPEG_QUALITY,
            size_policy: PdfSizePolicy::default(),
        }
    }
}

/// Counters from one document rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfRewriteReport {
    /// Pages visited
    pub pages: usize,
    /// Images re-encoded and redrawn
    pub reembedded: usize,
    /// Images left untouched after a failure
    pub skipped: usize,
}

impl PdfStrategy {
    /// Create a strategy with an explicit quality and size policy
    pub fn new(jpeg_quality: u8, size_policy: PdfSizePolicy) -> Self {
        Self {
            jpeg_quality,
            size_policy,
        }
    }

    pub(crate) async fn compress(&self, request: &CompressionRequest) -> Result<StrategyOutcome> {
        let data = request.bytes().clone();
        let quality = self.jpeg_quality;

        let (rewritten, report) =
            task::spawn_blocking(move || rewrite_document(&data, quality)).await??;

        info!(
            pages = report.pages,
            reembedded = report.reembedded,
            skipped = report.skipped,
            input = request.len(),
            output = rewritten.len(),
            "PDF rewritten"
        );

        if self.size_policy == PdfSizePolicy::PreferSmaller && rewritten.len() >= request.len() {
            warn!("Rewritten PDF is not smaller, returning original bytes");
            return Ok(StrategyOutcome::Degraded {
                bytes: request.bytes().clone(),
                reason: DegradeReason::NotSmaller,
            });
        }

        Ok(StrategyOutcome::Compressed(rewritten.into()))
    }
}

/// Re-embed every filtered image of every page and serialise the result
///
/// Page image lists are collected before the document is modified, and each
/// source image is re-encoded at most once per document, so pages sharing a
/// resource dictionary reuse one replacement. Parse and save failures are
/// fatal; per-image failures are counted in [`PdfRewriteReport::skipped`].
pub fn rewrite_document(data: &[u8], quality: u8) -> Result<(Vec<u8>, PdfRewriteReport)> {
    let doc = Document::load_mem(data)?;
    let mut report = PdfRewriteReport::default();

    let pages: Vec<(u32, ObjectId, PageImages)> = doc
        .get_pages()
        .into_iter()
        .map(|(number, id)| (number, id, page_images(&doc, id)))
        .collect();
    report.pages = pages.len();

    let mut rewriter = Rewriter::new(doc, quality);

    for (page_number, page_id, images) in pages {
        if images.is_empty() {
            continue;
        }

        let page_size = page_size(&rewriter.doc, page_id);
        let mut wrapped = false;

        for (name, image_id) in images {
            match rewriter.reembed(page_id, image_id, page_size, !wrapped) {
                Ok(()) => {
                    wrapped = true;
                    report.reembedded += 1;
                }
                Err(e) => {
                    warn!(
                        page = page_number,
                        image = %String::from_utf8_lossy(&name),
                        "Failed compressing image in PDF page: {}",
                        e
                    );
                    report.skipped += 1;
                }
            }
        }
    }

    let mut output = Vec::new();
    rewriter.doc.save_to(&mut output)?;
    Ok((output, report))
}

/// Resource name and object id of each image on a page
type PageImages = Vec<(Vec<u8>, ObjectId)>;

/// Where the page's XObject dictionary lives, so it can be borrowed mutably
#[derive(Debug, Clone, Copy)]
enum XObjectSlot {
    /// Indirect XObject dictionary
    Object(ObjectId),
    /// Inline in an indirect Resources dictionary
    InResources(ObjectId),
    /// Inline in a Resources dictionary that is inline in a page tree node
    InNode(ObjectId),
}

/// Document being rewritten plus the replacement made for each source image
struct Rewriter {
    doc: Document,
    quality: u8,
    /// Source image to replacement; `None` once re-encoding has failed
    replacements: HashMap<ObjectId, Option<ObjectId>>,
}

impl Rewriter {
    fn new(doc: Document, quality: u8) -> Self {
        Self {
            doc,
            quality,
            replacements: HashMap::new(),
        }
    }

    /// Draw the replacement for `image_id` over the full page
    fn reembed(
        &mut self,
        page_id: ObjectId,
        image_id: ObjectId,
        (width, height): (f32, f32),
        wrap_existing: bool,
    ) -> Result<()> {
        // Everything that can fail on bad input happens before the page is touched
        let slot = xobject_slot(&self.doc, page_id)?;
        xobject_dict_mut(&mut self.doc, slot)?;
        let new_image_id = self.replacement(image_id)?;

        let xobjects = xobject_dict_mut(&mut self.doc, slot)?;
        let name = match name_referencing(xobjects, new_image_id) {
            Some(name) => name,
            None => {
                let name = unused_name(xobjects);
                xobjects.set(name.clone(), Object::Reference(new_image_id));
                name
            }
        };

        let draw = format!(
            "{}q {} 0 0 {} 0 0 cm /{} Do Q\n",
            if wrap_existing { "Q\n" } else { "" },
            width,
            height,
            name
        );
        let draw_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), draw.into_bytes()));
        let open_id = if wrap_existing {
            Some(
                self.doc
                    .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec())),
            )
        } else {
            None
        };

        append_contents(&mut self.doc, page_id, open_id, draw_id)
    }

    /// Replacement image object for `image_id`, encoding it on first use
    fn replacement(&mut self, image_id: ObjectId) -> Result<ObjectId> {
        if let Some(cached) = self.replacements.get(&image_id) {
            return (*cached).ok_or_else(|| {
                CompressError::Pdf("image already failed to re-encode on an earlier page".to_string())
            });
        }

        let result = self.encode(image_id);
        self.replacements
            .insert(image_id, result.as_ref().ok().copied());
        result
    }

    fn encode(&mut self, image_id: ObjectId) -> Result<ObjectId> {
        let source = match self.doc.get_object(image_id)? {
            Object::Stream(stream) => stream.content.clone(),
            _ => return Err(CompressError::Pdf("image is not a stream".to_string())),
        };
        let jpeg = reencode_jpeg_image(&source, self.quality)?;

        let color_space = if jpeg.grayscale { "DeviceGray" } else { "DeviceRGB" };
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => Object::Integer(i64::from(jpeg.width)),
                "Height" => Object::Integer(i64::from(jpeg.height)),
                "ColorSpace" => color_space,
                "BitsPerComponent" => Object::Integer(8),
                "Filter" => "DCTDecode",
            },
            jpeg.data,
        );
        Ok(self.doc.add_object(image_stream))
    }
}

/// Filtered image XObjects referenced by a page's resources
fn page_images(doc: &Document, page_id: ObjectId) -> PageImages {
    let Some(resources) = inherited(doc, page_id, b"Resources")
        .and_then(|(_, obj)| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
    else {
        return Vec::new();
    };

    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(name, value)| value.as_reference().ok().map(|id| (name.clone(), id)))
        .filter(|(_, id)| is_filtered_image(doc, *id))
        .collect()
}

fn is_filtered_image(doc: &Document, id: ObjectId) -> bool {
    match doc.get_object(id) {
        Ok(Object::Stream(stream)) => {
            let is_image = matches!(
                stream.dict.get(b"Subtype").and_then(Object::as_name),
                Ok(subtype) if subtype == b"Image"
            );
            is_image && stream.dict.has(b"Filter") && !stream.content.is_empty()
        }
        _ => false,
    }
}

/// Page width and height from the (possibly inherited) MediaBox
fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let bounds: Option<Vec<f32>> = inherited(doc, page_id, b"MediaBox")
        .and_then(|(_, obj)| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .and_then(|items| items.iter().map(|o| o.as_float().ok()).collect());

    match bounds.as_deref() {
        Some([x0, y0, x1, y1]) => ((x1 - x0).abs(), (y1 - y0).abs()),
        _ => FALLBACK_PAGE_SIZE,
    }
}

/// Look up `key` on the page or the nearest ancestor that defines it
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<(ObjectId, &'a Object)> {
    let mut node = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(node).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some((node, value));
        }
        node = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn xobject_slot(doc: &Document, page_id: ObjectId) -> Result<XObjectSlot> {
    let (node, resources) = inherited(doc, page_id, b"Resources")
        .ok_or_else(|| CompressError::Pdf("page has no resources".to_string()))?;

    let slot = match resources {
        Object::Reference(resources_id) => {
            match doc.get_dictionary(*resources_id)?.get(b"XObject")? {
                Object::Reference(xobject_id) => XObjectSlot::Object(*xobject_id),
                _ => XObjectSlot::InResources(*resources_id),
            }
        }
        Object::Dictionary(dict) => match dict.get(b"XObject")? {
            Object::Reference(xobject_id) => XObjectSlot::Object(*xobject_id),
            _ => XObjectSlot::InNode(node),
        },
        _ => return Err(CompressError::Pdf("malformed page resources".to_string())),
    };
    Ok(slot)
}

fn xobject_dict_mut(doc: &mut Document, slot: XObjectSlot) -> Result<&mut Dictionary> {
    let dict = match slot {
        XObjectSlot::Object(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        XObjectSlot::InResources(id) => doc
            .get_object_mut(id)?
            .as_dict_mut()?
            .get_mut(b"XObject")?
            .as_dict_mut()?,
        XObjectSlot::InNode(id) => doc
            .get_object_mut(id)?
            .as_dict_mut()?
            .get_mut(b"Resources")?
            .as_dict_mut()?
            .get_mut(b"XObject")?
            .as_dict_mut()?,
    };
    Ok(dict)
}

/// Name already bound to `id` in an XObject dictionary
fn name_referencing(xobjects: &Dictionary, id: ObjectId) -> Option<String> {
    xobjects
        .iter()
        .find(|(_, value)| value.as_reference().ok() == Some(id))
        .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
}

fn unused_name(xobjects: &Dictionary) -> String {
    (0..)
        .map(|n| format!("MsImg{}", n))
        .find(|name| !xobjects.has(name.as_bytes()))
        .unwrap_or_else(|| "MsImg".to_string())
}

/// Add content streams around the page's existing contents
fn append_contents(
    doc: &mut Document,
    page_id: ObjectId,
    prepend: Option<ObjectId>,
    append: ObjectId,
) -> Result<()> {
    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    let mut contents = match page.get(b"Contents") {
        Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    if let Some(id) = prepend {
        contents.insert(0, Object::Reference(id));
    }
    contents.push(Object::Reference(append));
    page.set("Contents", Object::Array(contents));
    Ok(())
}
