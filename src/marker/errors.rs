use thiserror::Error;

/// A marker specification that cannot be read unambiguously.
///
/// Line numbers are 1-based positions inside the specification text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedMarkerError {
    #[error("line {line}: expected start token '{expected}', found {raw:?}")]
    MissingStartToken {
        line: usize,
        expected: String,
        raw: String,
    },

    #[error("marker specification is empty (expected start token '{expected}')")]
    Empty { expected: String },

    #[error("missing end token '{expected}' after line {line}")]
    MissingEndToken { line: usize, expected: String },

    #[error("line {line}: start token repeated inside marker block")]
    RepeatedStartToken { line: usize, raw: String },

    #[error("line {line}: malformed header {raw:?}: {reason}")]
    InvalidHeader {
        line: usize,
        raw: String,
        reason: String,
    },

    #[error("line {line}: negative {field} in header {raw:?}")]
    NegativeValue {
        line: usize,
        raw: String,
        field: &'static str,
    },

    #[error("line {line}: deletion marker must not carry content {raw:?}")]
    DeletionWithContent { line: usize, raw: String },

    #[error("line {line}: content before the first marker header {raw:?}")]
    ContentOutsideMarker { line: usize, raw: String },

    #[error("line {line}: unexpected content after end token {raw:?}")]
    TrailingContent { line: usize, raw: String },
}

impl MalformedMarkerError {
    /// The 1-based specification line the error points at.
    pub fn line(&self) -> usize {
        match self {
            MalformedMarkerError::Empty { .. } => 0,
            MalformedMarkerError::MissingStartToken { line, .. }
            | MalformedMarkerError::MissingEndToken { line, .. }
            | MalformedMarkerError::RepeatedStartToken { line, .. }
            | MalformedMarkerError::InvalidHeader { line, .. }
            | MalformedMarkerError::NegativeValue { line, .. }
            | MalformedMarkerError::DeletionWithContent { line, .. }
            | MalformedMarkerError::ContentOutsideMarker { line, .. }
            | MalformedMarkerError::TrailingContent { line, .. } => *line,
        }
    }
}
