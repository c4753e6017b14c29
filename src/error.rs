//! Error types for pdfverify.

use std::io;
use thiserror::Error;

/// Result type alias for pdfverify operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`], used by front ends to decide how
/// to present a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Threshold input was missing or not numeric. The run never started.
    Config,
    /// No document was selected, or it could not be opened or parsed.
    Load,
    /// A single embedded image could not be decoded.
    ImageDecode,
    /// Anything else.
    Other,
}

/// Error types that can occur while loading or verifying a PDF.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Verification was requested before any document was loaded.
    #[error("No PDF document loaded")]
    NoDocument,

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we cannot make sense of.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure or a page content stream.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// A threshold field was left empty.
    #[error("Missing value for {0}")]
    MissingThreshold(&'static str),

    /// A threshold field contained something other than an integer.
    #[error("Invalid value for {field}: {value:?} is not an integer")]
    InvalidThreshold {
        /// Name of the offending field
        field: &'static str,
        /// The raw text that failed to parse
        value: String,
    },

    /// A threshold field had the wrong number of comma-separated values.
    #[error("{field} expects {expected} values, got {found}")]
    ThresholdCount {
        /// Name of the offending field
        field: &'static str,
        /// Number of values required
        expected: usize,
        /// Number of values supplied
        found: usize,
    },

    /// An embedded image could not be decoded.
    #[error("Image decoding error: {0}")]
    ImageDecode(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error while rendering a report.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingThreshold(_)
            | Error::InvalidThreshold { .. }
            | Error::ThresholdCount { .. } => ErrorKind::Config,
            Error::Io(_)
            | Error::NoDocument
            | Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::PdfParse(_)
            | Error::Encrypted
            | Error::PageOutOfRange(..) => ErrorKind::Load,
            Error::ImageDecode(_) => ErrorKind::ImageDecode,
            Error::Render(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// True for threshold parsing failures.
    pub fn is_config(&self) -> bool {
        self.kind() == ErrorKind::Config
    }

    /// True for failures to select, open or parse the document.
    pub fn is_load(&self) -> bool {
        self.kind() == ErrorKind::Load
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err.to_string())
    }
}
