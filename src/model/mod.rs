//! Document model types for verification.
//!
//! Pages and text blocks come out of the parser, embedded images are decoded
//! on demand, and issues are collected into a [`Report`].

mod page;
mod raster;
mod report;

pub use page::{Page, Rect, TextBlock};
pub use raster::{DecodedImage, EmbeddedImage, PredictorParams};
pub use report::{Issue, IssueKind, IssueLocation, Report};
