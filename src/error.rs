use crate::builder::ConfigurationError;
use crate::settings::SettingsError;
use thiserror::Error;

/// Top-level error type for the context-hierarchy library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}
