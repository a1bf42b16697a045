use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn settings sources into a declared hierarchy.
///
/// `at` fields hold the dotted location inside the merged settings, such as
/// `levels[1].options.banner-mode`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("hierarchy settings file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("cannot read hierarchy settings from '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{path}' is not valid TOML: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("settings do not describe a hierarchy: {0}")]
    DeserializeError(#[from] toml::de::Error),

    #[error("{origin} sets level {index}, but only {depth} level(s) are declared before it")]
    LevelGap {
        origin: String,
        index: usize,
        depth: usize,
    },

    #[error("references never settle at {}", .at.join(", "))]
    CircularReference { at: Vec<String> },

    #[error("{at} refers to '${{{reference}}}', which is not set")]
    ReferenceNotFound { at: String, reference: String },

    #[error("{at} has a malformed reference '${{{reference}}}'")]
    InvalidReferencePath { at: String, reference: String },

    #[error("{at} refers to '${{{reference}}}', which is a table or array")]
    NonScalarReference { at: String, reference: String },

    #[error("{at} opens a reference without closing '}}'")]
    UnclosedReference { at: String },

    #[error("{at} must be a string, integer, float or boolean")]
    NonScalarOption { at: String },
}
