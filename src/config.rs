//! Verification thresholds.
//!
//! Front ends collect raw text into a [`ThresholdInput`] and call
//! [`ThresholdInput::parse`] exactly once; the resulting [`Thresholds`] are
//! immutable for the rest of the run. Parsing never touches the document.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minimum distance between each page edge and any text block, in page units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top: i32,
    /// Bottom margin
    pub bottom: i32,
    /// Left margin
    pub left: i32,
    /// Right margin
    pub right: i32,
}

impl Margins {
    /// Create margins in top, bottom, left, right order.
    pub fn new(top: i32, bottom: i32, left: i32, right: i32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// The same margin on all four sides.
    pub fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Validated thresholds for one verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Page margins
    pub margins: Margins,

    /// Minimum x0 of every text block
    pub indentation: i32,

    /// Minimum effective resolution of every embedded image
    pub required_dpi: i32,
}

impl Thresholds {
    /// Create thresholds with no margins, no indentation and a 300 dpi floor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the indentation threshold.
    pub fn with_indentation(mut self, indentation: i32) -> Self {
        self.indentation = indentation;
        self
    }

    /// Set the required image resolution.
    pub fn with_required_dpi(mut self, dpi: i32) -> Self {
        self.required_dpi = dpi;
        self
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            indentation: 0,
            required_dpi: 300,
        }
    }
}

/// Raw, unvalidated threshold text as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdInput {
    /// "top,bottom,left,right"
    pub margins: String,
    /// Comma-separated integers; only the first is used
    pub indentation: String,
    /// A single integer
    pub resolution: String,
}

impl ThresholdInput {
    /// Bundle the three raw fields.
    pub fn new(
        margins: impl Into<String>,
        indentation: impl Into<String>,
        resolution: impl Into<String>,
    ) -> Self {
        Self {
            margins: margins.into(),
            indentation: indentation.into(),
            resolution: resolution.into(),
        }
    }

    /// Validate every field and build [`Thresholds`].
    pub fn parse(&self) -> Result<Thresholds> {
        let margins = parse_list("margins", &self.margins)?;
        if margins.len() != 4 {
            return Err(Error::ThresholdCount {
                field: "margins",
                expected: 4,
                found: margins.len(),
            });
        }

        // Every value must be numeric even though only the first one is used.
        let indentation = parse_list("indentation", &self.indentation)?;

        let required_dpi = parse_int("resolution", &self.resolution)?;

        Ok(Thresholds {
            margins: Margins::new(margins[0], margins[1], margins[2], margins[3]),
            indentation: indentation[0],
            required_dpi,
        })
    }
}

fn parse_int(field: &'static str, raw: &str) -> Result<i32> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::MissingThreshold(field));
    }
    value.parse().map_err(|_| Error::InvalidThreshold {
        field,
        value: value.to_string(),
    })
}

fn parse_list(field: &'static str, raw: &str) -> Result<Vec<i32>> {
    if raw.trim().is_empty() {
        return Err(Error::MissingThreshold(field));
    }
    raw.split(',').map(|part| parse_int(field, part)).collect()
}
