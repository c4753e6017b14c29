//! Issues and verification reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an issue was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum IssueLocation {
    /// Page number (1-indexed)
    Page(u32),
    /// Image number in document order (1-indexed)
    Image(usize),
}

impl fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLocation::Page(n) => write!(f, "Page {}", n),
            IssueLocation::Image(n) => write!(f, "Image {}", n),
        }
    }
}

/// What rule was violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    /// Block crosses the left or right margin
    HorizontalMargin { x0: f32, y0: f32 },
    /// Block crosses the top or bottom margin
    VerticalMargin { x0: f32, y0: f32 },
    /// Block starts left of the indentation threshold
    Indentation { x0: f32, y0: f32 },
    /// Image's estimated resolution is below the required DPI
    LowResolution { effective_dpi: f64, required_dpi: i32 },
    /// Image could not be decoded
    ImageDecode { reason: String },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::HorizontalMargin { x0, y0 } => {
                write!(f, "text outside horizontal margins at ({}, {})", x0, y0)
            }
            IssueKind::VerticalMargin { x0, y0 } => {
                write!(f, "text outside vertical margins at ({}, {})", x0, y0)
            }
            IssueKind::Indentation { x0, y0 } => {
                write!(f, "insufficient indentation at ({}, {})", x0, y0)
            }
            IssueKind::LowResolution { effective_dpi, .. } => {
                write!(f, "insufficient image resolution: {} dpi", effective_dpi)
            }
            IssueKind::ImageDecode { reason } => write!(f, "could not decode image: {}", reason),
        }
    }
}

/// A single reported violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Originating page or image
    pub location: IssueLocation,
    /// The violation
    pub kind: IssueKind,
}

impl Issue {
    /// Issue raised by the layout checker.
    pub fn page(number: u32, kind: IssueKind) -> Self {
        Self {
            location: IssueLocation::Page(number),
            kind,
        }
    }

    /// Issue raised by the image resolution checker.
    pub fn image(index: usize, kind: IssueKind) -> Self {
        Self {
            location: IssueLocation::Image(index),
            kind,
        }
    }

    /// The violation text without its location tag.
    pub fn description(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.kind)
    }
}

/// Result of one verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// File the document was loaded from, if any
    pub source: Option<String>,

    /// When the run finished
    pub checked_at: DateTime<Utc>,

    /// Number of pages scanned
    pub pages_checked: usize,

    /// Number of images scanned
    pub images_checked: usize,

    /// Page issues first, then image issues
    pub issues: Vec<Issue>,
}

impl Report {
    /// Create an empty report.
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            checked_at: Utc::now(),
            pages_checked: 0,
            images_checked: 0,
            issues: Vec::new(),
        }
    }

    /// True when nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues raised by the layout checker.
    pub fn page_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| matches!(i.location, IssueLocation::Page(_)))
    }

    /// Issues raised by the image resolution checker.
    pub fn image_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| matches!(i.location, IssueLocation::Image(_)))
    }

    /// One display line per issue, in report order.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(Issue::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_display() {
        let issue = Issue::page(
            3,
            IssueKind::HorizontalMargin {
                x0: 0.0,
                y0: 12.5,
            },
        );
        assert_eq!(
            issue.to_string(),
            "Page 3: text outside horizontal margins at (0, 12.5)"
        );

        let issue = Issue::image(
            1,
            IssueKind::LowResolution {
                effective_dpi: 150.0,
                required_dpi: 300,
            },
        );
        assert_eq!(
            issue.to_string(),
            "Image 1: insufficient image resolution: 150 dpi"
        );
        assert_eq!(issue.description(), "insufficient image resolution: 150 dpi");
    }

    #[test]
    fn test_report_partitions() {
        let mut report = Report::new(None);
        assert!(report.is_clean());
        report.issues.push(Issue::page(
            1,
            IssueKind::Indentation { x0: 5.0, y0: 5.0 },
        ));
        report.issues.push(Issue::image(
            1,
            IssueKind::ImageDecode {
                reason: "truncated".to_string(),
            },
        ));
        assert!(!report.is_clean());
        assert_eq!(report.page_issues().count(), 1);
        assert_eq!(report.image_issues().count(), 1);
        assert_eq!(
            report.messages(),
            vec![
                "Page 1: insufficient indentation at (5, 5)".to_string(),
                "Image 1: could not decode image: truncated".to_string(),
            ]
        );
    }
}
