//! PDF document loading using lopdf.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::{sniff_bytes, sniff_path, PdfHeader};
use crate::error::{Error, Result};
use crate::model::{EmbeddedImage, Page, PredictorParams};

use super::layout::LayoutAnalyzer;
use super::objects::{dict_entry, page_box, page_resources, resolve, resolve_dict};

/// Form XObjects nested deeper than this are not searched for images.
const MAX_FORM_DEPTH: usize = 8;

/// A parsed PDF ready for inspection.
pub struct LoadedDocument {
    doc: LopdfDocument,
    header: PdfHeader,
    source: Option<String>,
}

impl LoadedDocument {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF
        let header = sniff_path(path)?;

        let doc = LopdfDocument::load(path)?;
        let mut loaded = Self::from_document(doc, header)?;
        loaded.source = Some(path.display().to_string());
        Ok(loaded)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = sniff_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc, header)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_document(doc: LopdfDocument, header: PdfHeader) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        log::debug!(
            "Loaded {} with {} pages",
            header,
            doc.get_pages().len()
        );
        Ok(Self {
            doc,
            header,
            source: None,
        })
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get PDF version from the file header.
    pub fn version(&self) -> &str {
        &self.header.version
    }

    /// Path the document was opened from, if it came from a file.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Extract every page with its text blocks, in page order.
    pub fn pages(&self) -> Result<Vec<Page>> {
        let analyzer = LayoutAnalyzer::new(&self.doc);
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| self.build_page(&analyzer, number, page_id))
            .collect()
    }

    /// Extract a single page (1-indexed).
    pub fn page(&self, number: u32) -> Result<Page> {
        let pages = self.doc.get_pages();
        let page_id = pages
            .get(&number)
            .ok_or(Error::PageOutOfRange(number, pages.len() as u32))?;
        self.build_page(&LayoutAnalyzer::new(&self.doc), number, *page_id)
    }

    fn build_page(&self, analyzer: &LayoutAnalyzer<'_>, number: u32, page_id: ObjectId) -> Result<Page> {
        let page_box = page_box(&self.doc, page_id);
        let mut page = Page::new(number, page_box.width(), page_box.height());
        page.blocks = analyzer
            .extract_blocks(page_id, &page_box)
            .map_err(|e| Error::PdfParse(format!("Page {}: {}", number, e)))?;
        Ok(page)
    }

    /// Enumerate image XObjects in document order.
    ///
    /// An image shared by several pages (or drawn twice on one) is listed
    /// once, under the first page that references it.
    pub fn images(&self) -> Vec<EmbeddedImage> {
        let mut images = Vec::new();
        let mut seen = HashSet::new();

        for (number, page_id) in self.doc.get_pages() {
            if let Some(resources) = page_resources(&self.doc, page_id) {
                self.collect_images(resources, number, 0, &mut seen, &mut images);
            }
        }

        for (i, image) in images.iter_mut().enumerate() {
            image.index = i + 1;
        }
        images
    }

    fn collect_images(
        &self,
        resources: &Dictionary,
        page: u32,
        depth: usize,
        seen: &mut HashSet<ObjectId>,
        images: &mut Vec<EmbeddedImage>,
    ) {
        let Some(xobjects) = dict_entry(&self.doc, resources, b"XObject") else {
            return;
        };

        for (name, obj) in xobjects.iter() {
            let Ok(id) = obj.as_reference() else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            let Ok(Object::Stream(stream)) = self.doc.get_object(id) else {
                continue;
            };
            let dict = &stream.dict;

            match dict.get(b"Subtype").and_then(Object::as_name_str) {
                Ok("Image") => {
                    let name = String::from_utf8_lossy(name).to_string();
                    images.push(self.embedded_image(id, page, name, dict, &stream.content));
                }
                Ok("Form") if depth < MAX_FORM_DEPTH => {
                    if let Some(form_resources) = dict_entry(&self.doc, dict, b"Resources") {
                        self.collect_images(form_resources, page, depth + 1, seen, images);
                    }
                }
                _ => {}
            }
        }
    }

    fn embedded_image(
        &self,
        id: ObjectId,
        page: u32,
        name: String,
        dict: &Dictionary,
        content: &[u8],
    ) -> EmbeddedImage {
        let int = |key: &[u8]| {
            dict.get(key)
                .ok()
                .and_then(|o| resolve(&self.doc, o))
                .and_then(|o| o.as_i64().ok())
        };

        let mut image = EmbeddedImage::new(content.to_vec()).with_origin(page, id, name);
        image.width = int(b"Width").and_then(|w| u32::try_from(w).ok());
        image.height = int(b"Height").and_then(|h| u32::try_from(h).ok());
        image.bits_per_component = int(b"BitsPerComponent").and_then(|b| u8::try_from(b).ok());
        image.image_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));

        if let Some(cs) = dict.get(b"ColorSpace").ok().and_then(|o| resolve(&self.doc, o)) {
            let (family, components) = self.color_space(cs);
            image.color_space = family;
            image.components = components;
        }

        image.filters = match dict.get(b"Filter").ok().and_then(|o| resolve(&self.doc, o)) {
            Some(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
            Some(Object::Array(arr)) => arr
                .iter()
                .filter_map(|o| o.as_name_str().ok())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        image.predictor = self.predictor(dict);

        image
    }

    /// Colour space family and its component count.
    fn color_space(&self, cs: &Object) -> (Option<String>, Option<u8>) {
        match cs {
            Object::Name(n) => {
                let family = String::from_utf8_lossy(n).to_string();
                let components = components_of(&family);
                (Some(family), components)
            }
            Object::Array(arr) => {
                let Some(family) = arr.first().and_then(|o| o.as_name_str().ok()) else {
                    return (None, None);
                };
                let components = match family {
                    "ICCBased" => arr
                        .get(1)
                        .and_then(|o| resolve_dict(&self.doc, o))
                        .and_then(|d| d.get(b"N").ok())
                        .and_then(|n| n.as_i64().ok())
                        .and_then(|n| u8::try_from(n).ok()),
                    // Indexed samples are palette indices
                    "Indexed" | "Separation" => Some(1),
                    "DeviceN" => arr
                        .get(1)
                        .and_then(|o| resolve(&self.doc, o))
                        .and_then(|o| o.as_array().ok())
                        .and_then(|names| u8::try_from(names.len()).ok()),
                    other => components_of(other),
                };
                (Some(family.to_string()), components)
            }
            _ => (None, None),
        }
    }

    fn predictor(&self, dict: &Dictionary) -> Option<PredictorParams> {
        let parms = match dict.get(b"DecodeParms").ok().and_then(|o| resolve(&self.doc, o))? {
            Object::Dictionary(d) => d,
            Object::Array(arr) => arr.iter().find_map(|o| resolve_dict(&self.doc, o))?,
            _ => return None,
        };

        let get = |key: &[u8], default: i64| {
            parms
                .get(key)
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(default)
        };

        let predictor = get(b"Predictor", 1);
        if predictor <= 1 {
            return None;
        }
        Some(PredictorParams {
            predictor,
            colors: get(b"Colors", 1).max(1) as usize,
            bits_per_component: get(b"BitsPerComponent", 8).max(1) as usize,
            columns: get(b"Columns", 1).max(1) as usize,
        })
    }
}

fn components_of(family: &str) -> Option<u8> {
    match family {
        "DeviceGray" | "CalGray" | "G" => Some(1),
        "DeviceRGB" | "CalRGB" | "Lab" | "RGB" => Some(3),
        "DeviceCMYK" | "CMYK" => Some(4),
        _ => None,
    }
}
