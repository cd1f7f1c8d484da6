use crate::document::LineEnding;
use crate::marker::syntax::{
    MarkerSyntax, NegativeSpan, DEFAULT_END_TOKEN, DEFAULT_HEADER_PREFIX, DEFAULT_START_TOKEN,
};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    #[serde(default)]
    pub markers: MarkerSection,
    #[serde(default)]
    pub output: OutputSection,
}

impl OverlayConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        let markers = &self.markers;

        for (field, value) in [
            ("markers.start_token", &markers.start_token),
            ("markers.end_token", &markers.end_token),
        ] {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::MissingField { field });
            } else if value.trim() != value {
                issues.push(ValidationIssue::SurroundingWhitespace { field });
            }
        }

        if !markers.start_token.is_empty() && markers.start_token == markers.end_token {
            issues.push(ValidationIssue::InvalidCombo {
                message: "start_token and end_token must differ".to_string(),
            });
        }

        let prefix = &markers.header_prefix;
        if !prefix.is_empty()
            && (markers.start_token.starts_with(prefix.as_str())
                || markers.end_token.starts_with(prefix.as_str()))
        {
            issues.push(ValidationIssue::InvalidCombo {
                message: format!("header_prefix '{prefix}' would also match a block token"),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Marker syntax described by the `[markers]` table.
    pub fn syntax(&self) -> MarkerSyntax {
        MarkerSyntax::new(
            self.markers.start_token.clone(),
            self.markers.end_token.clone(),
            self.markers.header_prefix.clone(),
        )
        .with_negative_span(self.markers.negative_span)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MarkerSection {
    #[serde(default = "default_start_token")]
    pub start_token: String,
    #[serde(default = "default_end_token")]
    pub end_token: String,
    #[serde(default = "default_header_prefix")]
    pub header_prefix: String,
    #[serde(default)]
    pub negative_span: NegativeSpan,
}

impl Default for MarkerSection {
    fn default() -> Self {
        Self {
            start_token: default_start_token(),
            end_token: default_end_token(),
            header_prefix: default_header_prefix(),
            negative_span: NegativeSpan::default(),
        }
    }
}

fn default_start_token() -> String {
    DEFAULT_START_TOKEN.to_string()
}

fn default_end_token() -> String {
    DEFAULT_END_TOKEN.to_string()
}

fn default_header_prefix() -> String {
    DEFAULT_HEADER_PREFIX.to_string()
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub line_ending: LineEndingChoice,
}

/// Terminator of the patched document.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LineEndingChoice {
    /// Keep the base document's terminator.
    #[default]
    Auto,
    Lf,
    Crlf,
}

impl LineEndingChoice {
    /// The forced terminator, `None` for [`LineEndingChoice::Auto`].
    pub fn forced(self) -> Option<LineEnding> {
        match self {
            LineEndingChoice::Auto => None,
            LineEndingChoice::Lf => Some(LineEnding::Lf),
            LineEndingChoice::Crlf => Some(LineEnding::CrLf),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    SurroundingWhitespace { field: &'static str },
    InvalidCombo { message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => write!(f, "missing {}", field),
            ValidationIssue::SurroundingWhitespace { field } => {
                write!(f, "{} has leading or trailing whitespace", field)
            }
            ValidationIssue::InvalidCombo { message } => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
