//! Markers: line-anchored edit directives and their textual format.

pub mod embedded;
pub mod errors;
pub mod parser;
pub mod syntax;

pub use embedded::{split_embedded, Embedded};
pub use errors::MalformedMarkerError;
pub use parser::parse_markers;
pub use syntax::{MarkerSyntax, NegativeSpan};

use std::fmt;
use std::ops::RangeInclusive;

/// A single edit directive anchored to original line numbers.
///
/// With `span > 0` the marker replaces original lines
/// `[start, start + span - 1]`. With `span == 0` it inserts its replacement
/// immediately after original line `start` (`0` meaning the top of the
/// document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub start: usize,
    pub span: usize,
    /// Free text, diagnostics only.
    pub label: String,
    pub replacement: Vec<String>,
}

impl Marker {
    pub fn new<I, S>(start: usize, span: usize, replacement: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start,
            span,
            label: String::new(),
            replacement: replacement.into_iter().map(Into::into).collect(),
        }
    }

    /// Pure insertion after original line `after`.
    pub fn insertion<I, S>(after: usize, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(after, 0, lines)
    }

    /// Pure deletion of `span` lines starting at `start`.
    pub fn deletion(start: usize, span: usize) -> Self {
        Self::new(start, span, Vec::<String>::new())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_insertion(&self) -> bool {
        self.span == 0
    }

    /// Original lines consumed by this marker, `None` for insertions.
    pub fn consumed(&self) -> Option<RangeInclusive<usize>> {
        if self.span == 0 {
            None
        } else {
            Some(self.start..=self.last_line())
        }
    }

    /// Last original line this marker touches: the final consumed line of a
    /// replacement, or the anchor of an insertion.
    pub fn last_line(&self) -> usize {
        if self.span == 0 {
            self.start
        } else {
            self.start.saturating_add(self.span - 1)
        }
    }

    /// Number of original lines kept in front of this marker.
    pub fn cut(&self) -> usize {
        if self.span == 0 {
            self.start
        } else {
            self.start.saturating_sub(1)
        }
    }

    /// First original line after this marker.
    pub fn resume(&self) -> usize {
        self.cut() + self.span + 1
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.span)?;
        if !self.label.is_empty() {
            write!(f, " ({})", self.label)?;
        }
        Ok(())
    }
}

/// Markers in authoring order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn into_vec(self) -> Vec<Marker> {
        self.markers
    }
}

impl From<Vec<Marker>> for MarkerSet {
    fn from(markers: Vec<Marker>) -> Self {
        Self { markers }
    }
}

impl FromIterator<Marker> for MarkerSet {
    fn from_iter<T: IntoIterator<Item = Marker>>(iter: T) -> Self {
        Self {
            markers: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for MarkerSet {
    type Item = Marker;
    type IntoIter = std::vec::IntoIter<Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.into_iter()
    }
}

impl<'a> IntoIterator for &'a MarkerSet {
    type Item = &'a Marker;
    type IntoIter = std::slice::Iter<'a, Marker>;

    fn into_iter(self) -> Self::IntoIter {
        self.markers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_coordinates() {
        let marker = Marker::new(3, 4, ["x"]);
        assert_eq!(marker.consumed(), Some(3..=6));
        assert_eq!(marker.last_line(), 6);
        assert_eq!(marker.cut(), 2);
        assert_eq!(marker.resume(), 7);
    }

    #[test]
    fn test_insertion_coordinates() {
        let marker = Marker::insertion(8, ["x"]);
        assert!(marker.is_insertion());
        assert_eq!(marker.consumed(), None);
        assert_eq!(marker.cut(), 8);
        assert_eq!(marker.resume(), 9);

        let top = Marker::insertion(0, ["x"]);
        assert_eq!(top.cut(), 0);
        assert_eq!(top.resume(), 1);
    }

    #[test]
    fn test_display_includes_label() {
        let marker = Marker::deletion(3, 4).with_label("drop helper");
        assert_eq!(marker.to_string(), "3,4 (drop helper)");
        assert_eq!(Marker::insertion(1, ["x"]).to_string(), "1,0");
    }
}
