//! In-memory PDF fixtures for integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// A string drawn with Helvetica at a baseline position (PDF user space).
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

/// One page of a fixture document.
pub struct PageSpec {
    pub width: f32,
    pub height: f32,
    pub texts: Vec<TextRun>,
    /// (resource name, image key) pairs
    pub images: Vec<(String, usize)>,
}

impl PageSpec {
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            texts: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn text(mut self, x: f32, y: f32, text: &str) -> Self {
        self.texts.push(TextRun {
            x,
            y,
            size: 12.0,
            text: text.to_string(),
        });
        self
    }

    pub fn image(mut self, name: &str, key: usize) -> Self {
        self.images.push((name.to_string(), key));
        self
    }
}

/// Builds a small but structurally complete PDF with lopdf.
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<PageSpec>,
    images: Vec<Stream>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: PageSpec) -> Self {
        self.pages.push(page);
        self
    }

    /// Add a JPEG image XObject and return its key.
    pub fn add_jpeg(&mut self, width: u32, height: u32) -> usize {
        let dict = image_dict(width, height, "DeviceRGB", "DCTDecode");
        self.images.push(Stream::new(dict, jpeg_bytes(width, height)));
        self.images.len() - 1
    }

    /// Add a DCTDecode image whose payload is not a valid JPEG.
    pub fn add_corrupt_jpeg(&mut self, width: u32, height: u32) -> usize {
        let dict = image_dict(width, height, "DeviceRGB", "DCTDecode");
        self.images
            .push(Stream::new(dict, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A]));
        self.images.len() - 1
    }

    /// Add an uncompressed 8-bit grayscale image.
    pub fn add_gray(&mut self, width: u32, height: u32) -> usize {
        let mut dict = Dictionary::new();
        dict.set("Type", "XObject");
        dict.set("Subtype", "Image");
        dict.set("Width", width as i64);
        dict.set("Height", height as i64);
        dict.set("BitsPerComponent", 8);
        dict.set("ColorSpace", "DeviceGray");
        let mut stream = Stream::new(dict, vec![128; (width * height) as usize]);
        stream.allows_compression = false;
        self.images.push(stream);
        self.images.len() - 1
    }

    /// Add a raw CMYK image whose declared size dwarfs its 16 data bytes.
    pub fn add_oversized(&mut self, width: u32, height: u32) -> usize {
        let mut dict = Dictionary::new();
        dict.set("Type", "XObject");
        dict.set("Subtype", "Image");
        dict.set("Width", width as i64);
        dict.set("Height", height as i64);
        dict.set("BitsPerComponent", 8);
        dict.set("ColorSpace", "DeviceCMYK");
        let mut stream = Stream::new(dict, vec![0; 16]);
        stream.allows_compression = false;
        self.images.push(stream);
        self.images.len() - 1
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let image_ids: Vec<ObjectId> = self
            .images
            .into_iter()
            .map(|stream| doc.add_object(stream))
            .collect();

        let mut kids = Vec::new();
        for spec in self.pages {
            let mut xobjects = Dictionary::new();
            let mut ops = Vec::new();

            for run in &spec.texts {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec!["F1".into(), run.size.into()]));
                ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(run.text.as_str())],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            for (name, key) in &spec.images {
                xobjects.set(name.as_bytes().to_vec(), image_ids[*key]);
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        200.into(),
                        0.into(),
                        0.into(),
                        100.into(),
                        100.into(),
                        100.into(),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
                ops.push(Operation::new("Q", vec![]));
            }

            let content = Content { operations: ops };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let resources_id = doc.add_object(dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            });
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), spec.width.into(), spec.height.into()],
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("save pdf");
        buf
    }
}

fn image_dict(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "BitsPerComponent" => 8,
        "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
        "Filter" => Object::Name(filter.as_bytes().to_vec()),
    }
}

/// Encode a black RGB image as JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf
}

/// A one-page document with a single line of text at (x, y).
pub fn single_text_pdf(x: f32, y: f32, text: &str) -> Vec<u8> {
    PdfBuilder::new()
        .page(PageSpec::letter().text(x, y, text))
        .build()
}
