//! Marker application: tail accumulation from the bottom of the document up.
//!
//! Markers are processed by descending cut point. Each step only reads the
//! still-untouched original prefix `[1, cursor]`, so no marker's coordinates
//! ever need adjusting for edits made below it.

use crate::document::Document;
use crate::marker::Marker;
use crate::validate::ValidatedMarkerSet;

/// The patched document and the markers that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchResult holds the patched document"]
pub struct PatchResult {
    pub document: Document,
    /// Applied markers in document order.
    pub applied: Vec<Marker>,
}

impl PatchResult {
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Apply a validated marker set to `doc`, producing a new document.
///
/// Markers sharing a cut point are ordered insertions first (in authoring
/// order), then the replacement starting right after that cut. An insertion
/// anchored on the last line of a replacement therefore has a higher cut and
/// lands after the replacement text.
///
/// # Panics
///
/// Panics if `markers` was validated against a document of a different
/// length. That is a contract violation by the caller, not a data error.
pub fn apply_markers(doc: &Document, markers: ValidatedMarkerSet) -> PatchResult {
    let (mut markers, validated_len) = markers.into_parts();
    assert_eq!(
        validated_len,
        doc.len(),
        "marker set validated against a {validated_len}-line document applied to a {}-line one",
        doc.len()
    );

    // Stable: equal keys keep authoring order.
    markers.sort_by_key(|marker| (marker.cut(), !marker.is_insertion()));

    let original = doc.lines();
    let mut chunks: Vec<&[String]> = Vec::with_capacity(markers.len() * 2 + 1);
    let mut cursor = original.len();

    for marker in markers.iter().rev() {
        chunks.push(untouched(doc, marker.resume(), cursor));
        chunks.push(&marker.replacement);
        cursor = marker.cut();
        tracing::trace!(
            start = marker.start,
            span = marker.span,
            label = marker.label.as_str(),
            "applied marker"
        );
    }
    chunks.push(untouched(doc, 1, cursor));

    let total = chunks.iter().map(|chunk| chunk.len()).sum();
    let mut lines = Vec::with_capacity(total);
    for chunk in chunks.iter().rev() {
        lines.extend(chunk.iter().cloned());
    }

    tracing::debug!(
        markers = markers.len(),
        before = original.len(),
        after = lines.len(),
        "patched document"
    );

    PatchResult {
        document: Document::from_lines(lines, doc.line_ending(), doc.has_trailing_newline()),
        applied: markers,
    }
}

/// Original lines `[from, to]` between two processed markers.
fn untouched(doc: &Document, from: usize, to: usize) -> &[String] {
    doc.slice(from, to)
        .expect("validated markers never overlap or leave the document")
}
