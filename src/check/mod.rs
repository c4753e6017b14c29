//! Layout and resolution rules.
//!
//! Each checker is a pure function of one input (a page or an image) and the
//! [`Thresholds`](crate::Thresholds) of the run. Ordering across pages and
//! images is left to the caller.

mod layout;
mod resolution;

pub use layout::LayoutChecker;
pub use resolution::{ResolutionChecker, ASSUMED_PAGE_WIDTH_INCHES, REFERENCE_DPI};
