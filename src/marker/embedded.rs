//! Marker blocks embedded at the end of the file they patch.
//!
//! Generated edits are often delivered as the original file followed by a
//! marker block:
//!
//! ```text
//! <base document>
//!
//! -- MARKERS:START --
//! MARKER-8,0 | Add revision
//! var revision = "devel"
//! -- MARKERS:END --
//! ```

use crate::marker::syntax::MarkerSyntax;

/// A file split into its base document and the marker block after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Embedded<'a> {
    /// Base text, separator blank lines removed, final terminator kept.
    pub base: &'a str,
    /// The marker block, from the start token to the end of the file.
    pub spec: &'a str,
}

/// Locate the first line equal to the start token and split around it.
///
/// Returns `None` when the text carries no marker block.
pub fn split_embedded<'a>(text: &'a str, syntax: &MarkerSyntax) -> Option<Embedded<'a>> {
    let mut offset = 0;
    let mut block_start = None;

    for line in text.split_inclusive('\n') {
        if syntax.is_start(line) {
            block_start = Some(offset);
            break;
        }
        offset += line.len();
    }

    let block_start = block_start?;
    let before = &text[..block_start];

    Some(Embedded {
        base: &before[..base_end(before)],
        spec: &text[block_start..],
    })
}

/// Byte length of `before` with trailing blank lines dropped, keeping the
/// terminator of the last non-blank line.
fn base_end(before: &str) -> usize {
    let mut end = before.len();

    while let Some(rest) = before[..end].strip_suffix('\n') {
        let rest = rest.strip_suffix('\r').unwrap_or(rest);
        // The line this terminator closes.
        let line_start = rest.rfind('\n').map_or(0, |idx| idx + 1);
        if !rest[line_start..].trim().is_empty() {
            break;
        }
        end = line_start;
    }

    end
}
