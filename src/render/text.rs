//! Plain text rendering for verification reports.
//!
//! The output reads as a run log: a header before the page issues, another
//! before the image issues, and a closing line.

use crate::model::Report;

/// Printed before page issues.
pub const LAYOUT_HEADER: &str = "Checking margins and indentation...";

/// Printed before image issues.
pub const FIGURES_HEADER: &str = "Checking figures...";

/// Printed after the last issue.
pub const COMPLETE_LINE: &str = "Verification complete.";

/// Convert a report to its text log.
pub fn to_text(report: &Report) -> String {
    let mut lines = vec![LAYOUT_HEADER.to_string()];
    lines.extend(report.page_issues().map(ToString::to_string));
    lines.push(FIGURES_HEADER.to_string());
    lines.extend(report.image_issues().map(ToString::to_string));
    lines.push(COMPLETE_LINE.to_string());

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// One-line summary such as `2 issues (3 pages, 1 image checked)`.
pub fn summary(report: &Report) -> String {
    format!(
        "{} ({} {}, {} {} checked)",
        plural(report.issues.len(), "issue"),
        report.pages_checked,
        if report.pages_checked == 1 { "page" } else { "pages" },
        report.images_checked,
        if report.images_checked == 1 { "image" } else { "images" },
    )
}

fn plural(n: usize, word: &str) -> String {
    match n {
        0 => format!("no {}s", word),
        1 => format!("1 {}", word),
        n => format!("{} {}s", n, word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Issue, IssueKind};

    #[test]
    fn test_to_text() {
        let mut report = Report::new(None);
        report.issues.push(Issue::page(
            1,
            IssueKind::HorizontalMargin { x0: 10.0, y0: 20.0 },
        ));
        report.issues.push(Issue::image(
            1,
            IssueKind::LowResolution {
                effective_dpi: 150.0,
                required_dpi: 300,
            },
        ));

        let expected = "Checking margins and indentation...\n\
                        Page 1: text outside horizontal margins at (10, 20)\n\
                        Checking figures...\n\
                        Image 1: insufficient image resolution: 150 dpi\n\
                        Verification complete.\n";
        assert_eq!(to_text(&report), expected);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new(None);
        assert_eq!(
            to_text(&report),
            "Checking margins and indentation...\nChecking figures...\nVerification complete.\n"
        );
        assert_eq!(summary(&report), "no issues (0 pages, 0 images checked)");
    }

    #[test]
    fn test_summary() {
        let mut report = Report::new(None);
        report.pages_checked = 1;
        report.images_checked = 3;
        report.issues.push(Issue::page(1, IssueKind::Indentation { x0: 1.0, y0: 2.0 }));
        assert_eq!(summary(&report), "1 issue (1 page, 3 images checked)");
    }
}
