//! TOML file settings source.

use std::path::{Path, PathBuf};

use super::source::{SettingsEntry, SettingsSource};
use super::SettingsError;

/// Loads one TOML file. Missing optional files contribute nothing.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }
}

impl SettingsSource for FileSource {
    fn entries(&self) -> Result<Vec<SettingsEntry>, SettingsError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.required {
                    return Err(SettingsError::FileNotFound(self.path.clone()));
                }
                tracing::debug!(path = %self.path.display(), "optional settings file absent");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(SettingsError::ReadError {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let table = toml::from_str(&contents).map_err(|e| SettingsError::ParseError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(vec![SettingsEntry::root(
            self.path.display().to_string(),
            table,
        )])
    }
}
