//! PDF parsing module.
//!
//! [`LoadedDocument`] wraps a lopdf document and exposes the two views the
//! checkers need: pages as positioned text blocks, and embedded images.

mod decode;
mod layout;
mod objects;
mod pdf_parser;

pub use decode::decode_image;
pub use layout::LayoutAnalyzer;
pub use objects::PageBox;
pub use pdf_parser::LoadedDocument;
