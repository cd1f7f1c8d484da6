//! Marker Overlay: deterministic line-anchored patching
//!
//! Applies a set of markers (line-anchored edit directives) to a base text
//! document and produces the fully patched document, without context
//! matching or fuzzy diffs.
//!
//! # Architecture
//!
//! Every marker addresses the base document's *original* line numbers. The
//! pipeline is:
//!
//! 1. [`Document::parse`] splits the base into 1-indexed lines.
//! 2. [`parse_markers`] reads the marker specification.
//! 3. [`validate`] proves the markers are in bounds and non-overlapping.
//! 4. [`apply_markers`] rebuilds the document bottom-up, so no marker's
//!    coordinates ever shift.
//!
//! [`apply_overlay`] and [`Overlay`] run the whole pipeline.
//!
//! # Marker semantics
//!
//! - `start,span` with `span > 0` replaces original lines
//!   `[start, start + span - 1]`; an empty payload deletes them.
//! - `start,0` inserts after original line `start` (`0` = top of file).
//! - An insertion on the last line of a replacement lands after the
//!   replacement text, never inside it.
//!
//! # Example
//!
//! ```
//! use marker_overlay::{Document, Marker, MarkerSet, apply_markers, validate};
//!
//! let doc = Document::from("var version = \"0.57\"\n\nfunc main() {}\n");
//! let markers = MarkerSet::from(vec![
//!     Marker::new(1, 1, ["var version = \"0.58\""]).with_label("bump"),
//!     Marker::insertion(1, ["var revision = \"devel\""]),
//! ]);
//!
//! let validated = validate(&doc, markers)?;
//! let patched = apply_markers(&doc, validated).into_document();
//! assert_eq!(
//!     patched.serialize(),
//!     "var version = \"0.58\"\nvar revision = \"devel\"\n\nfunc main() {}\n"
//! );
//! # Ok::<(), marker_overlay::ValidationError>(())
//! ```

pub mod apply;
pub mod atomic;
pub mod config;
pub mod document;
pub mod marker;
pub mod overlay;
pub mod validate;

// Re-exports
pub use apply::{apply_markers, PatchResult};
pub use config::{load_from_path, load_from_str, ConfigError, ConfigOrigin, OverlayConfig};
pub use document::{Document, LineEnding, RangeError};
pub use marker::{
    parse_markers, split_embedded, Embedded, MalformedMarkerError, Marker, MarkerSet,
    MarkerSyntax, NegativeSpan,
};
pub use overlay::{apply_overlay, Overlay, OverlayError, OverlayOutput, Stage};
pub use validate::{validate, MarkerRef, ValidatedMarkerSet, ValidationError, ValidationIssue};
