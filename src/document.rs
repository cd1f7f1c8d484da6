//! Line-oriented document model.
//!
//! A [`Document`] is an immutable, 1-indexed sequence of lines plus the
//! terminator style used to serialize it. Line index 0 is never a valid
//! line; it is used by markers as the "before the first line" sentinel.

use std::fmt;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Line terminator used when serializing a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Detect the terminator of `text`: CRLF if it occurs anywhere, LF otherwise.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Lf => write!(f, "lf"),
            LineEnding::CrLf => write!(f, "crlf"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid line range [{from}, {to}] in document of {len} lines")]
pub struct RangeError {
    pub from: usize,
    pub to: usize,
    pub len: usize,
}

/// An immutable text document addressed by 1-based line numbers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    lines: Vec<String>,
    line_ending: LineEnding,
    /// Whether the serialized form ends with a terminator.
    trailing_newline: bool,
}

impl Document {
    /// Parse raw bytes, detecting the line terminator.
    ///
    /// Never fails: invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn parse(input: &[u8]) -> Self {
        let text = String::from_utf8_lossy(input);
        let line_ending = LineEnding::detect(&text);
        Self::parse_str(&text, line_ending)
    }

    /// Parse raw bytes with an explicit terminator instead of detecting it.
    pub fn parse_with(input: &[u8], line_ending: LineEnding) -> Self {
        let text = String::from_utf8_lossy(input);
        Self::parse_str(&text, line_ending)
    }

    /// Lines always end at `\n`, so a stray LF in a CRLF file still starts a
    /// new line. Under CRLF one `\r` before each `\n` is part of the
    /// terminator; mixed input is normalized to CRLF on output.
    fn parse_str(text: &str, line_ending: LineEnding) -> Self {
        let trailing_newline = text.ends_with('\n');
        let lines = text
            .split_inclusive('\n')
            .map(|piece| match piece.strip_suffix('\n') {
                Some(line) if line_ending == LineEnding::CrLf => {
                    line.strip_suffix('\r').unwrap_or(line).to_string()
                }
                Some(line) => line.to_string(),
                None => piece.to_string(),
            })
            .collect();

        Self {
            lines,
            line_ending,
            trailing_newline,
        }
    }

    /// Build a document from already split lines.
    pub fn from_lines<I, S>(lines: I, line_ending: LineEnding, trailing_newline: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            line_ending,
            trailing_newline,
        }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line `n` (1-based), or `None` when out of range.
    pub fn line(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn has_trailing_newline(&self) -> bool {
        self.trailing_newline
    }

    /// Same lines, different terminator.
    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Lines `[from, to]`, inclusive and 1-based.
    ///
    /// The empty range `to == from - 1` is accepted for every `from` in
    /// `[1, len + 1]`, which covers "insert past the end of the file".
    pub fn slice(&self, from: usize, to: usize) -> Result<&[String], RangeError> {
        let len = self.lines.len();
        let err = || RangeError { from, to, len };

        if from == 0 || from > len + 1 {
            return Err(err());
        }
        if to + 1 == from {
            return Ok(&[]);
        }
        if from > to || to > len {
            return Err(err());
        }

        Ok(&self.lines[from - 1..to])
    }

    /// Join the lines with the declared terminator.
    pub fn serialize(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }

        let terminator = self.line_ending.as_str();
        let mut out = self.lines.join(terminator);
        if self.trailing_newline {
            out.push_str(terminator);
        }
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize().into_bytes()
    }

    /// xxh3 hash of the serialized form.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(self.serialize().as_bytes())
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Document::parse(text.as_bytes())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
