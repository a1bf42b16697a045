//! Declaring a hierarchy in layered TOML settings.

mod env;
mod error;
mod file;
mod resolve;
mod source;

pub use env::EnvSource;
pub use error::SettingsError;
pub use file::FileSource;
pub use source::{SettingsEntry, SettingsSource};

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::Value;

use crate::builder::HierarchyBuilder;
use crate::Error;

/// A hierarchy as declared in settings.
///
/// ```toml
/// [options]
/// banner-mode = "off"
///
/// [[levels]]
/// sources = ["Parent"]
///
/// [[levels]]
/// sources = ["Application"]
/// options = { web-application-type = "servlet" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HierarchySettings {
    /// Options for every level.
    pub options: BTreeMap<String, Value>,
    /// Levels, root first.
    pub levels: Vec<LevelSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelSettings {
    pub sources: Vec<String>,
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

/// Builder for loading [`HierarchySettings`] from files and the environment.
///
/// Sources are layered in registration order; later ones override earlier
/// ones. `${path}` references are resolved once everything is merged.
///
/// ## Example
///
/// ```no_run
/// use context_hierarchy::{HierarchyBuilder, Settings};
///
/// let settings = Settings::builder()
///     .with_file("config/hierarchy.toml", true)
///     .with_env("APP", "__")
///     .build()?;
/// let builder = HierarchyBuilder::from_settings(&settings)?;
/// # Ok::<(), context_hierarchy::Error>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Settings {
    sources: Vec<Box<dyn SettingsSource>>,
}

impl Settings {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML file. Missing files fail the build only when `required`.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds environment variables named `PREFIX<separator>SEGMENT...`.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    pub fn with_source(mut self, source: impl SettingsSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn build(self) -> Result<HierarchySettings, SettingsError> {
        self.build_as()
    }

    /// Merges, resolves and deserializes into any settings shape.
    pub fn build_as<T: DeserializeOwned>(self) -> Result<T, SettingsError> {
        let mut merged = toml::Table::new();
        for source in &self.sources {
            for entry in source.entries()? {
                source::apply_entry(&mut merged, entry)?;
            }
        }
        resolve::resolve_references(&mut merged)?;
        Value::Table(merged)
            .try_into()
            .map_err(SettingsError::DeserializeError)
    }
}

impl HierarchyBuilder {
    /// Replays declared levels and options through the builder, so the same
    /// checks apply as for hand-written calls.
    pub fn from_settings(settings: &HierarchySettings) -> Result<Self, Error> {
        let mut builder = HierarchyBuilder::new();
        for (name, value) in &settings.options {
            builder.set_option(name, option_value(value, || format!("options.{name}"))?)?;
        }
        for (index, level) in settings.levels.iter().enumerate() {
            let sources = level.sources.iter().map(String::as_str);
            if index == 0 {
                builder.add_sources(0, sources)?;
            } else {
                builder.child(sources)?;
            }
            for (name, value) in &level.options {
                let at = || format!("levels[{index}].options.{name}");
                builder.set_level_option(name, option_value(value, at)?)?;
            }
        }
        tracing::debug!(depth = builder.hierarchy().depth(), "builder loaded from settings");
        Ok(builder)
    }
}

fn option_value(value: &Value, at: impl FnOnce() -> String) -> Result<String, SettingsError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        _ => Err(SettingsError::NonScalarOption { at: at() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BannerMode, ConfigurationError, OptionName, SourceId};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_file_declares_hierarchy() {
        let file = settings_file(
            r#"
            [options]
            bannerMode = "off"

            [[levels]]
            sources = ["Parent"]

            [[levels]]
            sources = ["Application"]
            options = { lazy-initialization = true }
            "#,
        );

        let settings = Settings::builder().with_file(file.path(), true).build().unwrap();
        let builder = HierarchyBuilder::from_settings(&settings).unwrap();

        let levels = builder.hierarchy().levels();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].sources(), [SourceId::from("Parent")]);
        assert_eq!(levels[1].sources(), [SourceId::from("Application")]);
        assert_eq!(builder.options().banner_mode(), Ok(BannerMode::Off));
        assert_eq!(
            levels[1].overrides().get(OptionName::LazyInitialization),
            Some("true")
        );
        assert!(levels[0].overrides().is_empty());
    }

    #[test]
    fn test_later_layers_override() {
        let base = settings_file(
            r#"
            [options]
            banner-mode = "console"
            [[levels]]
            sources = ["Parent"]
            "#,
        );
        let local = settings_file("[options]\nbanner-mode = \"log\"");

        let settings = Settings::builder()
            .with_file(base.path(), true)
            .with_file(local.path(), true)
            .with_file("/nonexistent/optional.toml", false)
            .with_source(
                EnvSource::new("HIER", "__").with_vars([("HIER__OPTIONS__LOG_STARTUP_INFO", "false")]),
            )
            .build()
            .unwrap();

        let builder = HierarchyBuilder::from_settings(&settings).unwrap();
        assert_eq!(builder.options().banner_mode(), Ok(BannerMode::Log));
        assert_eq!(builder.options().log_startup_info(), Ok(false));
    }

    #[test]
    fn test_unknown_option_in_settings() {
        let file = settings_file("[options]\nbanner-colour = \"red\"");
        let settings = Settings::builder().with_file(file.path(), true).build().unwrap();

        let result = HierarchyBuilder::from_settings(&settings);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::UnknownOption(_)))
        ));
    }

    #[test]
    fn test_non_scalar_option_in_settings() {
        let file = settings_file(
            "[[levels]]\nsources = [\"Parent\"]\noptions = { banner_mode = [\"off\"] }",
        );
        let settings = Settings::builder().with_file(file.path(), true).build().unwrap();

        let result = HierarchyBuilder::from_settings(&settings);
        assert!(matches!(
            result,
            Err(Error::Settings(SettingsError::NonScalarOption { ref at }))
                if at == "levels[0].options.banner-mode"
        ));
    }

    #[test]
    fn test_file_overrides_env_spelling() {
        let file = settings_file("[options]\nbanner-mode = \"log\"\n[[levels]]\nsources = [\"Parent\"]");
        let settings = Settings::builder()
            .with_source(
                EnvSource::new("HIER", "__").with_vars([("HIER__OPTIONS__BANNER_MODE", "console")]),
            )
            .with_file(file.path(), true)
            .build()
            .unwrap();

        assert_eq!(settings.options.len(), 1);
        let builder = HierarchyBuilder::from_settings(&settings).unwrap();
        assert_eq!(builder.options().banner_mode(), Ok(BannerMode::Log));
    }

    #[test]
    fn test_env_overrides_file_spelling() {
        let file = settings_file("[options]\nbannerMode = \"log\"\n[[levels]]\nsources = [\"Parent\"]");
        let settings = Settings::builder()
            .with_file(file.path(), true)
            .with_source(
                EnvSource::new("HIER", "__").with_vars([("HIER__OPTIONS__BANNER_MODE", "OFF")]),
            )
            .build()
            .unwrap();

        let builder = HierarchyBuilder::from_settings(&settings).unwrap();
        assert_eq!(builder.options().banner_mode(), Ok(BannerMode::Off));
    }

    #[test]
    fn test_env_declares_levels() {
        let file = settings_file("[[levels]]\nsources = [\"Parent\"]");
        let settings = Settings::builder()
            .with_file(file.path(), true)
            .with_source(EnvSource::new("HIER", "__").with_vars([
                ("HIER__LEVELS__1__SOURCES", "Application, Admin"),
                ("HIER__LEVELS__1__OPTIONS__LAZY_INITIALIZATION", "true"),
            ]))
            .build()
            .unwrap();

        let builder = HierarchyBuilder::from_settings(&settings).unwrap();
        let levels = builder.hierarchy().levels();
        assert_eq!(levels.len(), 2);
        assert_eq!(
            levels[1].sources(),
            [SourceId::from("Application"), SourceId::from("Admin")]
        );
        assert_eq!(
            levels[1].overrides().get(OptionName::LazyInitialization),
            Some("true")
        );
    }

    #[test]
    fn test_blank_source_in_settings() {
        let file = settings_file("[[levels]]\nsources = [\"Parent\"]\n[[levels]]\nsources = [\"\"]");
        let settings = Settings::builder().with_file(file.path(), true).build().unwrap();

        let result = HierarchyBuilder::from_settings(&settings);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::EmptySourceId { level: 1, position: 0 }))
        ));
    }

    #[test]
    fn test_level_without_sources() {
        let file = settings_file("[[levels]]\nsources = []");
        let settings = Settings::builder().with_file(file.path(), true).build().unwrap();

        let result = HierarchyBuilder::from_settings(&settings);
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::EmptySources { level: 0 }))
        ));
    }

    #[test]
    fn test_empty_settings_build_empty_builder() {
        let settings = Settings::builder().build().unwrap();
        let builder = HierarchyBuilder::from_settings(&settings).unwrap();
        assert!(builder.hierarchy().is_empty());
    }
}
