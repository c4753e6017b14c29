//! Margin and indentation checks over text blocks.

use crate::config::Thresholds;
use crate::model::{Issue, IssueKind, Page, TextBlock};

/// Flags text blocks that cross the configured margins or start left of
/// the indentation threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutChecker;

impl LayoutChecker {
    /// Create a new layout checker.
    pub fn new() -> Self {
        Self
    }

    /// Check every block of a page, in block order.
    ///
    /// A block can produce up to three issues, always in the order
    /// horizontal margin, vertical margin, indentation.
    pub fn check_page(&self, page: &Page, thresholds: &Thresholds) -> Vec<Issue> {
        page.blocks
            .iter()
            .flat_map(|block| self.check_block(block, page.width, page.height, thresholds))
            .map(|kind| Issue::page(page.number, kind))
            .collect()
    }

    /// Check a single block against a page of the given size.
    pub fn check_block(
        &self,
        block: &TextBlock,
        page_width: f32,
        page_height: f32,
        thresholds: &Thresholds,
    ) -> Vec<IssueKind> {
        let margins = &thresholds.margins;
        let bbox = &block.bbox;
        let (x0, y0) = (bbox.x0, bbox.y0);
        let mut issues = Vec::new();

        if x0 < margins.left as f32 || bbox.x1 > page_width - margins.right as f32 {
            issues.push(IssueKind::HorizontalMargin { x0, y0 });
        }
        if y0 < margins.top as f32 || bbox.y1 > page_height - margins.bottom as f32 {
            issues.push(IssueKind::VerticalMargin { x0, y0 });
        }
        if x0 < thresholds.indentation as f32 {
            issues.push(IssueKind::Indentation { x0, y0 });
        }

        if !issues.is_empty() {
            log::trace!("Block {:?} raised {} issue(s)", bbox, issues.len());
        }
        issues
    }
}
