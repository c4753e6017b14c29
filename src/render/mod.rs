//! Rendering module for turning verification reports into output.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{summary, to_text, COMPLETE_LINE, FIGURES_HEADER, LAYOUT_HEADER};
