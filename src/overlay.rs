//! Overlay driver: parse, validate, apply, serialize.
//!
//! Every stage fails fast. A document is either fully patched or the call
//! returns an error naming the stage that rejected the input; no partial
//! output is produced.

use crate::apply::{apply_markers, PatchResult};
use crate::config::OverlayConfig;
use crate::document::{Document, LineEnding};
use crate::marker::{parse_markers, split_embedded, MalformedMarkerError, MarkerSyntax};
use crate::validate::{validate, ValidatedMarkerSet, ValidationError};
use std::fmt;
use thiserror::Error;

/// Pipeline stage that produced an [`OverlayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Locating an embedded marker block.
    Extract,
    ParseMarkers,
    Validate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::ParseMarkers => write!(f, "parse-markers"),
            Stage::Validate => write!(f, "validate"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    #[error("[extract] no marker block found (expected a line '{start_token}')")]
    NoMarkerBlock { start_token: String },

    #[error("[parse-markers] {0}")]
    Markers(#[from] MalformedMarkerError),

    #[error("[validate] {0}")]
    Validation(#[from] ValidationError),
}

impl OverlayError {
    pub fn stage(&self) -> Stage {
        match self {
            OverlayError::NoMarkerBlock { .. } => Stage::Extract,
            OverlayError::Markers(_) => Stage::ParseMarkers,
            OverlayError::Validation(_) => Stage::Validate,
        }
    }
}

/// Outcome of a successful overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "OverlayOutput holds the patched document"]
pub struct OverlayOutput {
    pub base: Document,
    pub patch: PatchResult,
}

impl OverlayOutput {
    pub fn document(&self) -> &Document {
        &self.patch.document
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.patch.document.to_bytes()
    }

    /// Whether the patched document differs from the base.
    pub fn changed(&self) -> bool {
        self.base.fingerprint() != self.patch.document.fingerprint()
    }
}

/// A configured overlay pipeline.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    syntax: MarkerSyntax,
    line_ending: Option<LineEnding>,
}

impl Overlay {
    pub fn new(syntax: MarkerSyntax) -> Self {
        Self {
            syntax,
            line_ending: None,
        }
    }

    pub fn from_config(config: &OverlayConfig) -> Self {
        Self {
            syntax: config.syntax(),
            line_ending: config.output.line_ending.forced(),
        }
    }

    /// Force the terminator of the patched document.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = Some(line_ending);
        self
    }

    pub fn syntax(&self) -> &MarkerSyntax {
        &self.syntax
    }

    /// Parse and validate without applying.
    pub fn check(&self, base: &[u8], spec: &[u8]) -> Result<ValidatedMarkerSet, OverlayError> {
        let doc = Document::parse(base);
        self.prepare(&doc, spec)
    }

    /// Apply the marker specification `spec` to `base`.
    pub fn apply(&self, base: &[u8], spec: &[u8]) -> Result<OverlayOutput, OverlayError> {
        let doc = Document::parse(base);
        let validated = self.prepare(&doc, spec)?;
        let mut patch = apply_markers(&doc, validated);

        if let Some(line_ending) = self.line_ending {
            patch.document = patch.document.with_line_ending(line_ending);
        }

        Ok(OverlayOutput { base: doc, patch })
    }

    /// Apply a file that carries its own marker block after the base text.
    pub fn apply_embedded(&self, text: &[u8]) -> Result<OverlayOutput, OverlayError> {
        let text = String::from_utf8_lossy(text);
        let embedded = split_embedded(&text, &self.syntax).ok_or_else(|| {
            OverlayError::NoMarkerBlock {
                start_token: self.syntax.start_token.clone(),
            }
        })?;
        self.apply(embedded.base.as_bytes(), embedded.spec.as_bytes())
    }

    /// Like [`Overlay::check`] for a file with an embedded marker block.
    pub fn check_embedded(&self, text: &[u8]) -> Result<ValidatedMarkerSet, OverlayError> {
        let text = String::from_utf8_lossy(text);
        let embedded = split_embedded(&text, &self.syntax).ok_or_else(|| {
            OverlayError::NoMarkerBlock {
                start_token: self.syntax.start_token.clone(),
            }
        })?;
        self.check(embedded.base.as_bytes(), embedded.spec.as_bytes())
    }

    fn prepare(&self, doc: &Document, spec: &[u8]) -> Result<ValidatedMarkerSet, OverlayError> {
        let spec = String::from_utf8_lossy(spec);
        let markers = parse_markers(&spec, &self.syntax)?;
        let validated = validate(doc, markers)?;
        Ok(validated)
    }
}

/// Apply `spec` to `base` with the default marker syntax.
///
/// ```
/// use marker_overlay::apply_overlay;
///
/// let base = b"var version = \"0.57\"\n\nfunc main() {}\n";
/// let spec = b"-- MARKERS:START --\nMARKER-1,1 | Bump version\nvar version = \"0.58\"\n-- MARKERS:END --\n";
///
/// let patched = apply_overlay(base, spec).unwrap();
/// assert_eq!(patched, b"var version = \"0.58\"\n\nfunc main() {}\n");
/// ```
pub fn apply_overlay(base: &[u8], spec: &[u8]) -> Result<Vec<u8>, OverlayError> {
    Overlay::default()
        .apply(base, spec)
        .map(|output| output.to_bytes())
}
