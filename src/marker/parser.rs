//! Forward scanner for marker specifications.
//!
//! ```text
//! -- MARKERS:START --
//! MARKER-<start>,<span> | <label>
//! <replacement line>
//! ...
//! -- MARKERS:END --
//! ```
//!
//! The scanner walks the specification once with an explicit state machine.
//! A content block ends at the next header or at the end token; any line
//! that starts with the header prefix must decode as a header.

use crate::marker::errors::MalformedMarkerError;
use crate::marker::syntax::{MarkerSyntax, NegativeSpan};
use crate::marker::{Marker, MarkerSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingStart,
    AwaitingHeader,
    InContent,
    Finished,
}

/// A header whose content block is still being collected.
struct Pending {
    marker: Marker,
    /// Written as a negative span; content is not allowed.
    deletion: bool,
}

enum Coord {
    Value(usize),
    Negative(usize),
}

/// Parse a marker specification into markers in authoring order.
pub fn parse_markers(spec: &str, syntax: &MarkerSyntax) -> Result<MarkerSet, MalformedMarkerError> {
    let mut state = State::AwaitingStart;
    let mut markers = MarkerSet::new();
    let mut pending: Option<Pending> = None;
    let mut last_line = 0;

    for (idx, raw) in spec.lines().enumerate() {
        let line = idx + 1;
        last_line = line;

        match state {
            State::AwaitingStart => {
                if syntax.is_start(raw) {
                    state = State::AwaitingHeader;
                } else if !raw.trim().is_empty() {
                    return Err(MalformedMarkerError::MissingStartToken {
                        line,
                        expected: syntax.start_token.clone(),
                        raw: raw.to_string(),
                    });
                }
            }
            State::AwaitingHeader | State::InContent => {
                if syntax.is_end(raw) {
                    if let Some(done) = pending.take() {
                        markers.push(done.marker);
                    }
                    state = State::Finished;
                    continue;
                }

                if syntax.is_start(raw) {
                    return Err(MalformedMarkerError::RepeatedStartToken {
                        line,
                        raw: raw.to_string(),
                    });
                }

                if let Some(body) = syntax.header_body(raw) {
                    if let Some(done) = pending.take() {
                        markers.push(done.marker);
                    }
                    pending = Some(parse_header(body, raw, line, syntax)?);
                    state = State::InContent;
                    continue;
                }

                match pending.as_mut() {
                    Some(current) if current.deletion => {
                        return Err(MalformedMarkerError::DeletionWithContent {
                            line,
                            raw: raw.to_string(),
                        });
                    }
                    Some(current) => current.marker.replacement.push(raw.to_string()),
                    None if raw.trim().is_empty() => {}
                    None => {
                        return Err(MalformedMarkerError::ContentOutsideMarker {
                            line,
                            raw: raw.to_string(),
                        });
                    }
                }
            }
            State::Finished => {
                if !raw.trim().is_empty() {
                    return Err(MalformedMarkerError::TrailingContent {
                        line,
                        raw: raw.to_string(),
                    });
                }
            }
        }
    }

    match state {
        State::Finished => {
            tracing::debug!(markers = markers.len(), "parsed marker specification");
            Ok(markers)
        }
        State::AwaitingStart => Err(MalformedMarkerError::Empty {
            expected: syntax.start_token.clone(),
        }),
        State::AwaitingHeader | State::InContent => Err(MalformedMarkerError::MissingEndToken {
            line: last_line,
            expected: syntax.end_token.clone(),
        }),
    }
}

/// Decode `<start>,<span> [| <label>]`.
fn parse_header(
    body: &str,
    raw: &str,
    line: usize,
    syntax: &MarkerSyntax,
) -> Result<Pending, MalformedMarkerError> {
    let invalid = |reason: &str| MalformedMarkerError::InvalidHeader {
        line,
        raw: raw.to_string(),
        reason: reason.to_string(),
    };
    let negative = |field: &'static str| MalformedMarkerError::NegativeValue {
        line,
        raw: raw.to_string(),
        field,
    };

    let (coords, label) = match body.split_once('|') {
        Some((coords, label)) => (coords, label.trim()),
        None => (body, ""),
    };

    let (start, span) = coords
        .split_once(',')
        .ok_or_else(|| invalid("expected '<start>,<span>'"))?;

    let start = match parse_coord(start).ok_or_else(|| invalid("start is not an integer"))? {
        Coord::Value(value) => value,
        Coord::Negative(_) => return Err(negative("start")),
    };

    let (span, deletion) = match parse_coord(span).ok_or_else(|| invalid("span is not an integer"))? {
        Coord::Value(value) => (value, false),
        Coord::Negative(value) if syntax.negative_span == NegativeSpan::Delete => (value, true),
        Coord::Negative(_) => return Err(negative("span")),
    };

    tracing::trace!(line, start, span, label, "marker header");

    Ok(Pending {
        marker: Marker::new(start, span, Vec::<String>::new()).with_label(label),
        deletion,
    })
}

fn parse_coord(text: &str) -> Option<Coord> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(magnitude) = text.strip_prefix('-') {
        if !magnitude.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        return magnitude.parse().ok().map(Coord::Negative);
    }
    if !text.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().map(Coord::Value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(spec: &str) -> Result<MarkerSet, MalformedMarkerError> {
        parse_markers(spec, &MarkerSyntax::default())
    }

    #[test]
    fn test_parse_basic_block() {
        let spec = "\
-- MARKERS:START --
MARKER-1,1 | Bump version
var version = \"0.58\"
MARKER-3,0 | Add revision
var revision = \"devel\"

-- MARKERS:END --
";
        let markers = parse(spec).unwrap();
        assert_eq!(markers.len(), 2);

        let first = &markers.as_slice()[0];
        assert_eq!((first.start, first.span), (1, 1));
        assert_eq!(first.label, "Bump version");
        assert_eq!(first.replacement, ["var version = \"0.58\""]);

        // Blank lines before the next header belong to the payload.
        let second = &markers.as_slice()[1];
        assert_eq!((second.start, second.span), (3, 0));
        assert_eq!(second.replacement, ["var revision = \"devel\"", ""]);
    }

    #[test]
    fn test_preserves_authoring_order() {
        let spec = "-- MARKERS:START --\nMARKER-9,0 | b\nMARKER-2,1 | a\n-- MARKERS:END --";
        let markers = parse(spec).unwrap();
        let starts: Vec<_> = markers.iter().map(|m| m.start).collect();
        assert_eq!(starts, [9, 2]);
    }

    #[test]
    fn test_empty_payload_is_deletion() {
        let spec = "-- MARKERS:START --\nMARKER-3,4 | drop\n-- MARKERS:END --";
        let markers = parse(spec).unwrap();
        assert!(markers.as_slice()[0].replacement.is_empty());
    }

    #[test]
    fn test_label_is_optional() {
        let spec = "-- MARKERS:START --\nMARKER-2,0\nx\n-- MARKERS:END --";
        let markers = parse(spec).unwrap();
        assert_eq!(markers.as_slice()[0].label, "");
    }

    #[test]
    fn test_label_may_contain_separator() {
        let spec = "-- MARKERS:START --\nMARKER-2,0 | a | b\n-- MARKERS:END --";
        let markers = parse(spec).unwrap();
        assert_eq!(markers.as_slice()[0].label, "a | b");
    }

    #[test]
    fn test_empty_block() {
        let markers = parse("-- MARKERS:START --\n-- MARKERS:END --\n").unwrap();
        assert!(markers.is_empty());
    }

    #[test]
    fn test_leading_and_trailing_blank_lines() {
        let spec = "\n\n-- MARKERS:START --\n\nMARKER-1,0\nx\n-- MARKERS:END --\n\n";
        assert_eq!(parse(spec).unwrap().len(), 1);
    }

    #[test]
    fn test_crlf_specification() {
        let spec = "-- MARKERS:START --\r\nMARKER-1,1 | x\r\nnew\r\n-- MARKERS:END --\r\n";
        let markers = parse(spec).unwrap();
        assert_eq!(markers.as_slice()[0].replacement, ["new"]);
    }

    #[test]
    fn test_rejects_empty_spec() {
        assert!(matches!(parse(""), Err(MalformedMarkerError::Empty { .. })));
        assert!(matches!(parse("\n  \n"), Err(MalformedMarkerError::Empty { .. })));
    }

    #[test]
    fn test_rejects_missing_start_token() {
        let err = parse("MARKER-1,0\nx\n-- MARKERS:END --").unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::MissingStartToken { line: 1, .. }
        ));
    }

    #[test]
    fn test_rejects_missing_end_token() {
        let err = parse("-- MARKERS:START --\nMARKER-1,0\nx").unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::MissingEndToken { line: 3, .. }
        ));
    }

    #[test]
    fn test_rejects_repeated_start_token() {
        let err = parse("-- MARKERS:START --\nMARKER-1,0\n-- MARKERS:START --\n-- MARKERS:END --")
            .unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::RepeatedStartToken { line: 3, .. }
        ));
    }

    #[test]
    fn test_rejects_content_before_first_header() {
        let err = parse("-- MARKERS:START --\nstray\nMARKER-1,0\n-- MARKERS:END --").unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::ContentOutsideMarker { line: 2, .. }
        ));
    }

    #[test]
    fn test_rejects_content_after_end_token() {
        let err = parse("-- MARKERS:START --\n-- MARKERS:END --\nmore").unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::TrailingContent { line: 3, .. }
        ));
    }

    #[test]
    fn test_rejects_unparseable_numbers() {
        for header in ["MARKER-a,1", "MARKER-1,b", "MARKER-1", "MARKER-,1", "MARKER-1,", "MARKER-1.5,2"] {
            let spec = format!("-- MARKERS:START --\n{header} | x\n-- MARKERS:END --");
            let err = parse(&spec).unwrap_err();
            assert!(
                matches!(err, MalformedMarkerError::InvalidHeader { line: 2, .. }),
                "{header}: {err:?}"
            );
        }
    }

    #[test]
    fn test_rejects_negative_values_by_default() {
        let err = parse("-- MARKERS:START --\nMARKER-3,-4 | x\n-- MARKERS:END --").unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::NegativeValue { field: "span", .. }
        ));

        let err = parse("-- MARKERS:START --\nMARKER--3,4 | x\n-- MARKERS:END --").unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::NegativeValue { field: "start", .. }
        ));
    }

    #[test]
    fn test_content_bleeding_into_header_syntax() {
        // A payload line that starts with the header prefix is ambiguous.
        let spec = "-- MARKERS:START --\nMARKER-1,1 | x\nMARKER-this is text\n-- MARKERS:END --";
        let err = parse(spec).unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::InvalidHeader { line: 3, .. }
        ));
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_negative_span_deletion_when_enabled() {
        let syntax = MarkerSyntax::default().with_negative_span(NegativeSpan::Delete);
        let spec = "-- MARKERS:START --\nMARKER-3,-4 | drop\nMARKER-9,0 | add\nnew\n-- MARKERS:END --";
        let markers = parse_markers(spec, &syntax).unwrap();
        let first = &markers.as_slice()[0];
        assert_eq!((first.start, first.span), (3, 4));
        assert!(first.replacement.is_empty());
    }

    #[test]
    fn test_negative_span_deletion_rejects_content() {
        let syntax = MarkerSyntax::default().with_negative_span(NegativeSpan::Delete);
        let spec = "-- MARKERS:START --\nMARKER-3,-4 | drop\nleftover\n-- MARKERS:END --";
        let err = parse_markers(spec, &syntax).unwrap_err();
        assert!(matches!(
            err,
            MalformedMarkerError::DeletionWithContent { line: 3, .. }
        ));
    }

    #[test]
    fn test_bare_syntax_without_prefix() {
        let syntax = MarkerSyntax::new("START", "END", "");
        let spec = "START\n1,1 | Bump\nvar version = \"0.58\"\n1,0 | Add\nvar revision = \"devel\"\nEND";
        let markers = parse_markers(spec, &syntax).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers.as_slice()[1].replacement, ["var revision = \"devel\""]);
    }
}
