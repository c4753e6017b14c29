//! # pdfverify
//!
//! Layout verification for PDF documents.
//!
//! This library checks every text block of a PDF against page margins and a
//! minimum left indentation, and every embedded image against a required
//! resolution. Violations are collected into a [`Report`], page issues first,
//! then image issues.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfverify::{verify_file, Margins, Thresholds};
//!
//! fn main() -> pdfverify::Result<()> {
//!     let thresholds = Thresholds::new()
//!         .with_margins(Margins::uniform(72))
//!         .with_indentation(72)
//!         .with_required_dpi(300);
//!
//!     let report = verify_file("thesis.pdf", &thresholds)?;
//!     print!("{}", pdfverify::render::to_text(&report));
//!     Ok(())
//! }
//! ```
//!
//! ## Coordinates
//!
//! Block rectangles use page coordinates in points with the origin at the
//! top-left corner of the visible page and y growing downward.
//!
//! ## Resolution estimate
//!
//! The effective DPI of an image is `(pixel_width / 8.5) * 300`, i.e. every
//! image is assumed to span an 8.5 inch page. Placement on the page is not
//! taken into account.

pub mod check;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use check::{LayoutChecker, ResolutionChecker};
pub use config::{Margins, ThresholdInput, Thresholds};
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, PdfHeader};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    DecodedImage, EmbeddedImage, Issue, IssueKind, IssueLocation, Page, Rect, Report, TextBlock,
};
pub use parser::{decode_image, LoadedDocument};
pub use render::JsonFormat;
pub use session::{RunState, Session, Verifier, VerifyEvent};

use std::io::Read;
use std::path::Path;

/// Load a PDF file and verify it.
///
/// # Arguments
///
/// * `path` - Path to the PDF file
/// * `thresholds` - Margins, indentation and required DPI
///
/// # Example
///
/// ```no_run
/// use pdfverify::{verify_file, Thresholds};
///
/// let report = verify_file("document.pdf", &Thresholds::default()).unwrap();
/// println!("{} issues", report.issues.len());
/// ```
pub fn verify_file<P: AsRef<Path>>(path: P, thresholds: &Thresholds) -> Result<Report> {
    Verifier::new(*thresholds).verify_file(path)
}

/// Verify a PDF held in memory.
///
/// # Example
///
/// ```no_run
/// use pdfverify::{verify_bytes, Thresholds};
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let report = verify_bytes(&data, &Thresholds::default()).unwrap();
/// ```
pub fn verify_bytes(data: &[u8], thresholds: &Thresholds) -> Result<Report> {
    Verifier::new(*thresholds).verify_bytes(data)
}

/// Verify a PDF read from any reader.
pub fn verify_reader<R: Read>(reader: R, thresholds: &Thresholds) -> Result<Report> {
    let doc = LoadedDocument::from_reader(reader)?;
    Verifier::new(*thresholds).verify_document(&doc)
}

/// Verify a PDF file and render the report as a text log.
///
/// # Example
///
/// ```no_run
/// use pdfverify::{to_text, ThresholdInput};
///
/// let input = ThresholdInput::new("72,72,72,72", "72", "300");
/// let log = to_text("document.pdf", &input.parse().unwrap()).unwrap();
/// print!("{}", log);
/// ```
pub fn to_text<P: AsRef<Path>>(path: P, thresholds: &Thresholds) -> Result<String> {
    let report = verify_file(path, thresholds)?;
    Ok(render::to_text(&report))
}

/// Verify a PDF file and render the report as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, thresholds: &Thresholds, format: JsonFormat) -> Result<String> {
    let report = verify_file(path, thresholds)?;
    render::to_json(&report, format)
}
