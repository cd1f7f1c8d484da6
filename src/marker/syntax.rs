use serde::Deserialize;

pub const DEFAULT_START_TOKEN: &str = "-- MARKERS:START --";
pub const DEFAULT_END_TOKEN: &str = "-- MARKERS:END --";
pub const DEFAULT_HEADER_PREFIX: &str = "MARKER-";

/// How a negative span in a header is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NegativeSpan {
    /// Negative spans are malformed.
    #[default]
    Reject,
    /// `<start>,-<n>` deletes `n` lines starting at `start`.
    Delete,
}

/// Delimiters of a marker specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSyntax {
    pub start_token: String,
    pub end_token: String,
    /// Text every header line begins with. May be empty, in which case any
    /// line starting with a digit or `-` is read as a header.
    pub header_prefix: String,
    pub negative_span: NegativeSpan,
}

impl Default for MarkerSyntax {
    fn default() -> Self {
        Self {
            start_token: DEFAULT_START_TOKEN.to_string(),
            end_token: DEFAULT_END_TOKEN.to_string(),
            header_prefix: DEFAULT_HEADER_PREFIX.to_string(),
            negative_span: NegativeSpan::Reject,
        }
    }
}

impl MarkerSyntax {
    pub fn new(
        start_token: impl Into<String>,
        end_token: impl Into<String>,
        header_prefix: impl Into<String>,
    ) -> Self {
        Self {
            start_token: start_token.into(),
            end_token: end_token.into(),
            header_prefix: header_prefix.into(),
            negative_span: NegativeSpan::Reject,
        }
    }

    pub fn with_negative_span(mut self, negative_span: NegativeSpan) -> Self {
        self.negative_span = negative_span;
        self
    }

    pub fn is_start(&self, line: &str) -> bool {
        line.trim_end() == self.start_token
    }

    pub fn is_end(&self, line: &str) -> bool {
        line.trim_end() == self.end_token
    }

    /// The part after the header prefix, if `line` claims to be a header.
    ///
    /// A line that claims to be a header must decode as one; content lines
    /// that merely look like headers make the boundary ambiguous.
    pub(crate) fn header_body<'a>(&self, line: &'a str) -> Option<&'a str> {
        if self.header_prefix.is_empty() {
            let first = line.chars().next()?;
            (first.is_ascii_digit() || first == '-').then_some(line)
        } else {
            line.strip_prefix(self.header_prefix.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matching_ignores_trailing_whitespace() {
        let syntax = MarkerSyntax::default();
        assert!(syntax.is_start("-- MARKERS:START --  "));
        assert!(syntax.is_end("-- MARKERS:END --\r"));
        assert!(!syntax.is_start("  -- MARKERS:START --"));
    }

    #[test]
    fn test_header_body_with_prefix() {
        let syntax = MarkerSyntax::default();
        assert_eq!(syntax.header_body("MARKER-3,4 | x"), Some("3,4 | x"));
        assert_eq!(syntax.header_body("3,4 | x"), None);
    }

    #[test]
    fn test_header_body_without_prefix() {
        let syntax = MarkerSyntax::new("START", "END", "");
        assert_eq!(syntax.header_body("3,4 | x"), Some("3,4 | x"));
        assert_eq!(syntax.header_body("-1,0 | x"), Some("-1,0 | x"));
        assert_eq!(syntax.header_body("fn main() {}"), None);
        assert_eq!(syntax.header_body(""), None);
    }
}
