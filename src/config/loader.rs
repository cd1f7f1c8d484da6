//! Reading `marker-overlay.toml`.

use crate::config::schema::{OverlayConfig, ValidationError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a config was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::Inline => write!(f, "inline overlay config"),
            ConfigOrigin::File(path) => write!(f, "overlay config {}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read overlay config {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// `section` is the table the TOML error points into, such as `[markers]`.
    #[error("{origin}: malformed TOML in {section}: {source}")]
    Toml {
        origin: ConfigOrigin,
        section: String,
        source: toml_edit::de::Error,
    },

    #[error("{origin}: {source}")]
    Invalid {
        origin: ConfigOrigin,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> Option<&ConfigOrigin> {
        match self {
            ConfigError::Io { .. } => None,
            ConfigError::Toml { origin, .. } | ConfigError::Invalid { origin, .. } => Some(origin),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<OverlayConfig, ConfigError> {
    parse(input, ConfigOrigin::Inline)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<OverlayConfig, ConfigError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&input, ConfigOrigin::File(path.to_path_buf()))
}

fn parse(input: &str, origin: ConfigOrigin) -> Result<OverlayConfig, ConfigError> {
    let config: OverlayConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => {
            let offset = source.span().map_or(0, |span| span.start);
            return Err(ConfigError::Toml {
                origin,
                section: section_at(input, offset),
                source,
            });
        }
    };

    if let Err(source) = config.validate() {
        return Err(ConfigError::Invalid { origin, source });
    }

    tracing::debug!(%origin, syntax = ?config.syntax(), "loaded overlay config");
    Ok(config)
}

/// The last table header at or before byte `offset`.
fn section_at(input: &str, offset: usize) -> String {
    let mut section = None;
    let mut pos = 0;

    for line in input.split_inclusive('\n') {
        if pos > offset {
            break;
        }
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            section = Some(trimmed.to_string());
        }
        pos += line.len();
    }

    section.unwrap_or_else(|| "the top level".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LineEndingChoice;
    use crate::marker::NegativeSpan;

    #[test]
    fn test_empty_input_uses_defaults() {
        let config = load_from_str("").unwrap();
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = load_from_str(
            r#"
[markers]
start_token = "-- CUSTOM:START --"
end_token = "-- CUSTOM:END --"
header_prefix = "CUSTOM:MARKER-"
negative_span = "delete"

[output]
line_ending = "crlf"
"#,
        )
        .unwrap();

        assert_eq!(config.markers.start_token, "-- CUSTOM:START --");
        assert_eq!(config.markers.header_prefix, "CUSTOM:MARKER-");
        assert_eq!(config.markers.negative_span, NegativeSpan::Delete);
        assert_eq!(config.output.line_ending, LineEndingChoice::Crlf);
    }

    #[test]
    fn test_partial_markers_table_keeps_defaults() {
        let config = load_from_str("[markers]\nheader_prefix = \"@@\"\n").unwrap();
        assert_eq!(config.markers.start_token, "-- MARKERS:START --");
        assert_eq!(config.markers.header_prefix, "@@");
    }

    #[test]
    fn test_unknown_field_is_a_toml_error() {
        let err = load_from_str("[markers]\nstart = \"x\"\n").unwrap_err();
        match err {
            ConfigError::Toml {
                origin: ConfigOrigin::Inline,
                ref section,
                ..
            } => assert_eq!(section, "[markers]"),
            ref other => panic!("expected TOML error, got {other:?}"),
        }
        assert!(err.to_string().contains("malformed TOML in [markers]"));
    }

    #[test]
    fn test_invalid_values_are_validation_errors() {
        let err = load_from_str("[markers]\nstart_token = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(err.origin(), Some(&ConfigOrigin::Inline));
        assert!(err.to_string().contains("missing markers.start_token"));
    }

    #[test]
    fn test_load_from_path_attaches_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.toml");
        fs::write(&path, "[output]\nline_ending = \"sideways\"\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        match err {
            ConfigError::Toml {
                origin: ConfigOrigin::File(p),
                section,
                ..
            } => {
                assert_eq!(p, path);
                assert_eq!(section, "[output]");
            }
            other => panic!("expected TOML error with path, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_from_path("/nonexistent/overlay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(err.origin(), None);
    }

    #[test]
    fn test_section_at_tracks_last_header() {
        let input = "[markers]\nheader_prefix = \"@\"\n\n[output]\nline_ending = \"lf\"\n";
        assert_eq!(section_at(input, 0), "[markers]");
        assert_eq!(section_at(input, 12), "[markers]");
        assert_eq!(section_at(input, input.len() - 3), "[output]");
        assert_eq!(section_at("x = 1\n", 0), "the top level");
    }
}
