//! Effective resolution check for embedded images.

use crate::error::Error;
use crate::model::{DecodedImage, EmbeddedImage, Issue, IssueKind};
use crate::parser::decode_image;

/// Page width every image is assumed to span.
pub const ASSUMED_PAGE_WIDTH_INCHES: f64 = 8.5;

/// Resolution the assumed page width is scaled to.
pub const REFERENCE_DPI: f64 = 300.0;

/// Flags images whose estimated resolution is below the required DPI.
///
/// The estimate does not look at where or how large the image is drawn:
/// every image is treated as spanning an 8.5 inch page at 300 dpi.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionChecker;

impl ResolutionChecker {
    /// Create a new resolution checker.
    pub fn new() -> Self {
        Self
    }

    /// Estimated DPI for an image `width` pixels wide.
    pub fn effective_dpi(width: u32) -> f64 {
        (f64::from(width) / ASSUMED_PAGE_WIDTH_INCHES) * REFERENCE_DPI
    }

    /// Check a decoded image. `index` is its 1-indexed document position.
    pub fn check(&self, index: usize, image: &DecodedImage, required_dpi: i32) -> Option<Issue> {
        let effective_dpi = Self::effective_dpi(image.width());
        log::debug!(
            "Image {}: {}x{} px, effective {:.1} dpi",
            index,
            image.width(),
            image.height(),
            effective_dpi
        );

        (effective_dpi < f64::from(required_dpi)).then(|| {
            Issue::image(
                index,
                IssueKind::LowResolution {
                    effective_dpi,
                    required_dpi,
                },
            )
        })
    }

    /// Decode and check an embedded image.
    ///
    /// An image that cannot be decoded yields an [`IssueKind::ImageDecode`]
    /// issue rather than an error, so one bad stream never aborts the run.
    pub fn check_embedded(&self, image: &EmbeddedImage, required_dpi: i32) -> Option<Issue> {
        match decode_image(image) {
            Ok(decoded) => self.check(image.index, &decoded, required_dpi),
            Err(e) => {
                log::warn!("Image {} ({:?}) could not be decoded: {}", image.index, image.object_id, e);
                let reason = match e {
                    Error::ImageDecode(reason) => reason,
                    other => other.to_string(),
                };
                Some(Issue::image(image.index, IssueKind::ImageDecode { reason }))
            }
        }
    }
}
