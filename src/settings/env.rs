//! Environment variable settings source.

use toml::Value;

use super::source::{SettingsEntry, SettingsSource};
use super::SettingsError;

/// Reads `PREFIX<sep>SEGMENT...` variables as lowercased settings paths.
///
/// With prefix `APP` and separator `__`:
///
/// - `APP__OPTIONS__BANNER_MODE=off` sets the hierarchy-wide `banner-mode`
/// - `APP__LEVELS__1__SOURCES=Application,Admin` sets the sources of level 1
/// - `APP__LEVELS__1__OPTIONS__LAZY_INITIALIZATION=true` overrides one level
///
/// A `sources` value is split on commas. Every other value stays a string;
/// option values are interpreted when the hierarchy starts.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
    vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
            vars: None,
        }
    }

    /// Reads from `vars` instead of the process environment.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    fn entry_for(&self, key: &str, raw: &str) -> Option<SettingsEntry> {
        let rest = key
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix(self.separator.as_str())?;
        if rest.is_empty() {
            return None;
        }
        let path: Vec<String> = rest
            .split(self.separator.as_str())
            .map(str::to_lowercase)
            .collect();

        let value = if path.last().is_some_and(|segment| segment == "sources") {
            Value::Array(raw.split(',').map(|id| Value::String(id.trim().to_string())).collect())
        } else {
            Value::String(raw.to_string())
        };
        Some(SettingsEntry::at_path(key, path, value))
    }
}

impl SettingsSource for EnvSource {
    fn entries(&self) -> Result<Vec<SettingsEntry>, SettingsError> {
        let mut entries: Vec<SettingsEntry> = match &self.vars {
            Some(vars) => vars
                .iter()
                .filter_map(|(k, v)| self.entry_for(k, v))
                .collect(),
            None => std::env::vars()
                .filter_map(|(k, v)| self.entry_for(&k, &v))
                .collect(),
        };
        // Lower level indices first, so LEVELS__1 lands after LEVELS__0.
        entries.sort_by_cached_key(|entry| {
            entry
                .path
                .iter()
                .map(|segment| (segment.parse::<usize>().ok(), segment.clone()))
                .collect::<Vec<_>>()
        });
        Ok(entries)
    }
}
