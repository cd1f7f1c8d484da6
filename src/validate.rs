//! Range validation for marker sets.
//!
//! # Hard Rules (Never Violate)
//!
//! 1. **Bounds**: a replacement consumes `[start, start + span - 1]` and both
//!    ends must be real lines; an insertion anchor must lie in `[0, len]`.
//! 2. **No overlap**: no original line is consumed twice, and no insertion
//!    point falls strictly inside a replacement.
//!
//! Insertions sitting on a replacement's boundary are legal. An insertion
//! after the replacement's last line lands after the replacement text; an
//! insertion after the line preceding a replacement lands before it.

use crate::document::Document;
use crate::marker::{Marker, MarkerSet};
use std::fmt;

/// A marker identified for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRef {
    /// Position in authoring order.
    pub index: usize,
    pub start: usize,
    pub span: usize,
    pub label: String,
}

impl MarkerRef {
    fn new(index: usize, marker: &Marker) -> Self {
        Self {
            index,
            start: marker.start,
            span: marker.span,
            label: marker.label.clone(),
        }
    }
}

impl fmt::Display for MarkerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker #{} at {},{}", self.index + 1, self.start, self.span)?;
        if !self.label.is_empty() {
            write!(f, " ({})", self.label)?;
        }
        Ok(())
    }
}

/// A single reason a marker set cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    OutOfBounds { marker: MarkerRef, doc_len: usize },
    Overlap { first: MarkerRef, second: MarkerRef },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::OutOfBounds { marker, doc_len } => write!(
                f,
                "{marker} is out of bounds for a document of {doc_len} lines"
            ),
            ValidationIssue::Overlap { first, second } => {
                write!(f, "{first} overlaps {second}")
            }
        }
    }
}

/// Every issue found in a marker set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn first(&self) -> Option<&ValidationIssue> {
        self.issues.first()
    }

    pub fn has_out_of_bounds(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, ValidationIssue::OutOfBounds { .. }))
    }

    pub fn has_overlap(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, ValidationIssue::Overlap { .. }))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid marker(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A marker set proven applicable to a document of `doc_len` lines.
///
/// Only [`validate`] constructs this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMarkerSet {
    markers: Vec<Marker>,
    doc_len: usize,
}

impl ValidatedMarkerSet {
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Line count of the document this set was validated against.
    pub fn doc_len(&self) -> usize {
        self.doc_len
    }

    pub(crate) fn into_parts(self) -> (Vec<Marker>, usize) {
        (self.markers, self.doc_len)
    }
}

/// Check `markers` against `doc` and against each other.
///
/// Reports every violation: bounds issues in authoring order, then overlapping
/// pairs `(i, j)` with `i < j`.
pub fn validate(doc: &Document, markers: MarkerSet) -> Result<ValidatedMarkerSet, ValidationError> {
    let doc_len = doc.len();
    let markers = markers.into_vec();
    let mut issues = Vec::new();

    for (index, marker) in markers.iter().enumerate() {
        if !in_bounds(marker, doc_len) {
            issues.push(ValidationIssue::OutOfBounds {
                marker: MarkerRef::new(index, marker),
                doc_len,
            });
        }
    }

    for (i, first) in markers.iter().enumerate() {
        for (j, second) in markers.iter().enumerate().skip(i + 1) {
            if overlaps(first, second) {
                issues.push(ValidationIssue::Overlap {
                    first: MarkerRef::new(i, first),
                    second: MarkerRef::new(j, second),
                });
            }
        }
    }

    if !issues.is_empty() {
        tracing::debug!(issues = issues.len(), doc_len, "marker set rejected");
        return Err(ValidationError { issues });
    }

    tracing::debug!(markers = markers.len(), doc_len, "marker set validated");
    Ok(ValidatedMarkerSet { markers, doc_len })
}

fn in_bounds(marker: &Marker, doc_len: usize) -> bool {
    if marker.is_insertion() {
        marker.start <= doc_len
    } else {
        marker.start >= 1 && marker.last_line() <= doc_len
    }
}

fn overlaps(a: &Marker, b: &Marker) -> bool {
    match (a.consumed(), b.consumed()) {
        (Some(x), Some(y)) => x.start() <= y.end() && y.start() <= x.end(),
        (Some(range), None) => splits(b.start, *range.start(), *range.end()),
        (None, Some(range)) => splits(a.start, *range.start(), *range.end()),
        (None, None) => false,
    }
}

/// Whether inserting after line `anchor` would land strictly inside
/// `[start, end]`.
fn splits(anchor: usize, start: usize, end: usize) -> bool {
    start <= anchor && anchor < end
}
