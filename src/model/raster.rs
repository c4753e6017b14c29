//! Embedded image types.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// PNG/TIFF predictor parameters from a `/DecodeParms` dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictorParams {
    /// 1 = none, 2 = TIFF, 10-15 = PNG
    pub predictor: i64,
    /// Interleaved colour components per sample
    pub colors: usize,
    /// Bits per colour component
    pub bits_per_component: usize,
    /// Samples per row
    pub columns: usize,
}

impl Default for PredictorParams {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
        }
    }
}

/// An image XObject found in the document, still in its encoded form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedImage {
    /// Position in document order (1-indexed)
    pub index: usize,

    /// First page that references the image
    pub page: u32,

    /// PDF object id (number, generation)
    pub object_id: (u32, u16),

    /// Resource name on the referencing page (e.g., "Im0")
    pub name: String,

    /// Declared width in pixels
    pub width: Option<u32>,

    /// Declared height in pixels
    pub height: Option<u32>,

    /// Bits per component (e.g., 8)
    pub bits_per_component: Option<u8>,

    /// Color space family (e.g., "DeviceRGB", "Indexed")
    pub color_space: Option<String>,

    /// Number of colour components implied by the colour space
    pub components: Option<u8>,

    /// Whether this is a stencil mask (`/ImageMask true`)
    pub image_mask: bool,

    /// Stream filters in application order
    pub filters: Vec<String>,

    /// Predictor applied after Flate decoding, if any
    pub predictor: Option<PredictorParams>,

    /// Raw (still encoded) stream bytes
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    /// Create an image with no metadata beyond its encoded bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            index: 0,
            page: 0,
            object_id: (0, 0),
            name: String::new(),
            width: None,
            height: None,
            bits_per_component: None,
            color_space: None,
            components: None,
            image_mask: false,
            filters: Vec::new(),
            predictor: None,
            data,
        }
    }

    /// A JPEG-encoded (`/DCTDecode`) image.
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self::new(data).with_filter("DCTDecode")
    }

    /// Set where the image was found.
    pub fn with_origin(mut self, page: u32, object_id: (u32, u16), name: impl Into<String>) -> Self {
        self.page = page;
        self.object_id = object_id;
        self.name = name.into();
        self
    }

    /// Set image dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set colour space and its component count.
    pub fn with_color_space(mut self, color_space: impl Into<String>, components: u8) -> Self {
        self.color_space = Some(color_space.into());
        self.components = Some(components);
        self
    }

    /// Set bits per component.
    pub fn with_bits_per_component(mut self, bits: u8) -> Self {
        self.bits_per_component = Some(bits);
        self
    }

    /// Append a stream filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Set predictor parameters.
    pub fn with_predictor(mut self, params: PredictorParams) -> Self {
        self.predictor = Some(params);
        self
    }

    /// Size of the encoded data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// MIME type of the encoded payload, judged from the last filter.
    pub fn mime_type(&self) -> &'static str {
        match self.filters.last().map(String::as_str) {
            Some("DCTDecode" | "DCT") => "image/jpeg",
            Some("JPXDecode") => "image/jp2",
            Some("JBIG2Decode") => "image/x-jbig2",
            Some("CCITTFaxDecode" | "CCF") => "image/x-ccitt",
            _ => "application/octet-stream",
        }
    }
}

/// A fully decoded raster.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: DynamicImage,
}

impl DecodedImage {
    /// Wrap decoded pixels.
    pub fn new(pixels: DynamicImage) -> Self {
        Self { pixels }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// The underlying pixel buffer.
    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(pixels: DynamicImage) -> Self {
        Self::new(pixels)
    }
}
