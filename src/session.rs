//! Verification runs.
//!
//! [`Verifier`] sequences the layout and resolution checkers over one
//! document. [`Session`] wraps it in the load/verify lifecycle an interactive
//! front end needs: a document is selected first, thresholds arrive later as
//! raw text, and every outcome leaves the session in a well-defined
//! [`RunState`].
//!
//! # Example
//!
//! ```no_run
//! use pdfverify::{Session, ThresholdInput};
//!
//! fn main() -> pdfverify::Result<()> {
//!     let mut session = Session::new();
//!     session.load("thesis.pdf")?;
//!
//!     let input = ThresholdInput::new("72,72,72,72", "72", "300");
//!     let report = session.verify(&input)?;
//!     for line in report.messages() {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;

use crate::check::{LayoutChecker, ResolutionChecker};
use crate::config::{Margins, ThresholdInput, Thresholds};
use crate::error::{Error, Result};
use crate::model::Report;
use crate::parser::LoadedDocument;

/// Progress events emitted while a document is being verified.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyEvent {
    /// The layout pass is starting.
    LayoutStart {
        /// Number of pages to scan
        page_count: usize,
    },

    /// A page has been checked.
    PageChecked {
        /// 1-indexed page number
        number: u32,
        /// Issues raised on this page
        issues: usize,
    },

    /// The image pass is starting.
    ImagesStart {
        /// Number of distinct images to scan
        image_count: usize,
    },

    /// An image has been checked.
    ImageChecked {
        /// 1-indexed image number
        index: usize,
        /// Whether the image was flagged
        flagged: bool,
    },

    /// All checks have finished.
    Complete,
}

/// Runs both checkers with a fixed set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    thresholds: Thresholds,
    layout: LayoutChecker,
    resolution: ResolutionChecker,
}

impl Verifier {
    /// Create a verifier for the given thresholds.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            layout: LayoutChecker::new(),
            resolution: ResolutionChecker::new(),
        }
    }

    /// Parse raw threshold text and create a verifier from it.
    pub fn from_input(input: &ThresholdInput) -> Result<Self> {
        input.parse().map(Self::new)
    }

    /// Set all four margins.
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.thresholds = self.thresholds.with_margins(margins);
        self
    }

    /// Set the indentation threshold.
    pub fn with_indentation(mut self, indentation: i32) -> Self {
        self.thresholds = self.thresholds.with_indentation(indentation);
        self
    }

    /// Set the required image resolution.
    pub fn with_required_dpi(mut self, dpi: i32) -> Self {
        self.thresholds = self.thresholds.with_required_dpi(dpi);
        self
    }

    /// Thresholds in effect.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Load and verify a PDF file.
    pub fn verify_file<P: AsRef<Path>>(&self, path: P) -> Result<Report> {
        let doc = LoadedDocument::open(path)?;
        self.verify_document(&doc)
    }

    /// Load and verify a PDF held in memory.
    pub fn verify_bytes(&self, data: &[u8]) -> Result<Report> {
        let doc = LoadedDocument::from_bytes(data)?;
        self.verify_document(&doc)
    }

    /// Verify an already loaded document.
    pub fn verify_document(&self, doc: &LoadedDocument) -> Result<Report> {
        self.verify_document_with(doc, |_| {})
    }

    /// Verify an already loaded document, reporting progress to `observer`.
    ///
    /// Page issues come first, in page order, followed by image issues in
    /// document order. A page whose content cannot be parsed aborts the run;
    /// an image that cannot be decoded is reported as an issue instead.
    pub fn verify_document_with<F>(&self, doc: &LoadedDocument, mut observer: F) -> Result<Report>
    where
        F: FnMut(VerifyEvent),
    {
        let mut report = Report::new(doc.source().map(String::from));

        let pages = doc.pages()?;
        observer(VerifyEvent::LayoutStart {
            page_count: pages.len(),
        });
        for page in &pages {
            let issues = self.layout.check_page(page, &self.thresholds);
            log::debug!(
                "Page {}: {} blocks, {} issues",
                page.number,
                page.blocks.len(),
                issues.len()
            );
            observer(VerifyEvent::PageChecked {
                number: page.number,
                issues: issues.len(),
            });
            report.issues.extend(issues);
        }
        report.pages_checked = pages.len();

        let images = doc.images();
        observer(VerifyEvent::ImagesStart {
            image_count: images.len(),
        });
        for image in &images {
            let issue = self
                .resolution
                .check_embedded(image, self.thresholds.required_dpi);
            observer(VerifyEvent::ImageChecked {
                index: image.index,
                flagged: issue.is_some(),
            });
            report.issues.extend(issue);
        }
        report.images_checked = images.len();

        log::info!(
            "Checked {} pages and {} images: {} issues",
            report.pages_checked,
            report.images_checked,
            report.issues.len()
        );
        observer(VerifyEvent::Complete);
        Ok(report)
    }
}

/// Lifecycle state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// A document is loaded and waiting for thresholds
    DocumentLoaded,
    /// Checks are running
    Verifying,
    /// The last run produced a report
    Reported,
    /// The last load or run failed
    Error,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::DocumentLoaded => "document loaded",
            RunState::Verifying => "verifying",
            RunState::Reported => "reported",
            RunState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Holds the selected document between load and verify.
///
/// Loading a document starts a new run and clears the previous report.
/// Verifying again after a report (or after a failed run) re-checks the
/// same document with fresh thresholds.
#[derive(Default)]
pub struct Session {
    document: Option<LoadedDocument>,
    state: RunState,
    report: Option<Report>,
}

impl Session {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Report of the last successful run.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// Whether a document is held.
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Select a PDF file.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::debug!("Loading {}", path.display());
        self.replace_document(|| LoadedDocument::open(path))
    }

    /// Select a PDF held in memory.
    pub fn load_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.replace_document(|| LoadedDocument::from_bytes(data))
    }

    fn replace_document<F>(&mut self, open: F) -> Result<()>
    where
        F: FnOnce() -> Result<LoadedDocument>,
    {
        self.report = None;
        match open() {
            Ok(doc) => {
                self.document = Some(doc);
                self.state = RunState::DocumentLoaded;
                Ok(())
            }
            Err(e) => {
                self.document = None;
                self.state = RunState::Error;
                Err(e)
            }
        }
    }

    /// Parse `input` and verify the loaded document.
    ///
    /// Threshold errors are reported before the document is looked at and
    /// leave it loaded, so the caller can correct the input and retry.
    pub fn verify(&mut self, input: &ThresholdInput) -> Result<&Report> {
        let thresholds = match input.parse() {
            Ok(thresholds) => thresholds,
            Err(e) => {
                log::warn!("Rejected thresholds: {}", e);
                self.state = RunState::Error;
                return Err(e);
            }
        };
        self.verify_with(&thresholds)
    }

    /// Verify the loaded document with already validated thresholds.
    pub fn verify_with(&mut self, thresholds: &Thresholds) -> Result<&Report> {
        let Some(doc) = self.document.as_ref() else {
            self.state = RunState::Error;
            return Err(Error::NoDocument);
        };

        // Held exclusively for the whole run, so Verifying is never observed
        // from outside; it only names the step between load and report.
        self.state = RunState::Verifying;
        self.report = None;

        match Verifier::new(*thresholds).verify_document(doc) {
            Ok(report) => {
                self.state = RunState::Reported;
                Ok(&*self.report.insert(report))
            }
            Err(e) => {
                log::warn!("Verification aborted: {}", e);
                self.state = RunState::Error;
                Err(e)
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("source", &self.document.as_ref().and_then(|d| d.source()))
            .field("report", &self.report.as_ref().map(|r| r.issues.len()))
            .finish()
    }
}
