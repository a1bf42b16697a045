//! Known builder options and their typed readers.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ConfigurationError;

/// Name of an option understood by the builder.
///
/// Parsing is relaxed: case is ignored and `-`/`_` separators are dropped,
/// so `bannerMode`, `banner-mode` and `BANNER_MODE` all name the same option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionName {
    BannerMode,
    LogStartupInfo,
    WebApplicationType,
    LazyInitialization,
    RegisterShutdownHook,
}

impl OptionName {
    /// Every known option, in declaration order.
    pub const ALL: [OptionName; 5] = [
        OptionName::BannerMode,
        OptionName::LogStartupInfo,
        OptionName::WebApplicationType,
        OptionName::LazyInitialization,
        OptionName::RegisterShutdownHook,
    ];

    /// The canonical kebab-case spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            OptionName::BannerMode => "banner-mode",
            OptionName::LogStartupInfo => "log-startup-info",
            OptionName::WebApplicationType => "web-application-type",
            OptionName::LazyInitialization => "lazy-initialization",
            OptionName::RegisterShutdownHook => "register-shutdown-hook",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = relaxed(s);
        OptionName::ALL
            .into_iter()
            .find(|name| relaxed(name.as_str()) == wanted)
            .ok_or_else(|| ConfigurationError::UnknownOption(s.to_string()))
    }
}

fn relaxed(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// How the startup banner is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerMode {
    Off,
    #[default]
    Console,
    Log,
}

impl BannerMode {
    /// The lowercase spelling accepted by `banner-mode`.
    pub fn as_str(self) -> &'static str {
        match self {
            BannerMode::Off => "off",
            BannerMode::Console => "console",
            BannerMode::Log => "log",
        }
    }
}

impl FromStr for BannerMode {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(BannerMode::Off),
            "console" => Ok(BannerMode::Console),
            "log" => Ok(BannerMode::Log),
            _ => Err(invalid(OptionName::BannerMode, s)),
        }
    }
}

/// Kind of web server a context is expected to bring up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WebApplicationType {
    #[default]
    None,
    Servlet,
    Reactive,
}

impl FromStr for WebApplicationType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(WebApplicationType::None),
            "servlet" => Ok(WebApplicationType::Servlet),
            "reactive" => Ok(WebApplicationType::Reactive),
            _ => Err(invalid(OptionName::WebApplicationType, s)),
        }
    }
}

fn invalid(name: OptionName, value: &str) -> ConfigurationError {
    ConfigurationError::InvalidOptionValue {
        name: name.as_str(),
        value: value.to_string(),
    }
}

/// Reads an on/off option, ignoring case.
fn parse_flag(name: OptionName, raw: &str) -> Result<bool, ConfigurationError> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(invalid(name, raw))
    }
}

/// Recorded option values, keyed by option name.
///
/// Values are kept verbatim. Interpretation happens through the typed
/// readers, which fall back to the option's default when it is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    values: BTreeMap<OptionName, String>,
}

impl BuilderOptions {
    /// No options recorded.
    pub const EMPTY: BuilderOptions = BuilderOptions {
        values: BTreeMap::new(),
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for `name`, replacing any earlier value.
    pub fn set(&mut self, name: OptionName, value: impl Into<String>) {
        self.values.insert(name, value.into());
    }

    /// The raw value recorded for `name`, if any.
    pub fn get(&self, name: OptionName) -> Option<&str> {
        self.values.get(&name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Recorded values in option-name order.
    pub fn iter(&self) -> impl Iterator<Item = (OptionName, &str)> {
        self.values.iter().map(|(name, value)| (*name, value.as_str()))
    }

    /// Returns a copy of `self` with every value from `overrides` applied on top.
    pub fn merged_with(&self, overrides: &BuilderOptions) -> BuilderOptions {
        let mut merged = self.clone();
        for (name, value) in overrides.iter() {
            merged.set(name, value);
        }
        merged
    }

    /// `banner-mode`, defaulting to [`BannerMode::Console`].
    pub fn banner_mode(&self) -> Result<BannerMode, ConfigurationError> {
        self.read(OptionName::BannerMode, |raw| raw.parse())
    }

    /// `log-startup-info`, defaulting to `true`.
    pub fn log_startup_info(&self) -> Result<bool, ConfigurationError> {
        self.flag(OptionName::LogStartupInfo, true)
    }

    /// `web-application-type`, defaulting to [`WebApplicationType::None`].
    pub fn web_application_type(&self) -> Result<WebApplicationType, ConfigurationError> {
        self.read(OptionName::WebApplicationType, |raw| raw.parse())
    }

    /// `lazy-initialization`, defaulting to `false`.
    pub fn lazy_initialization(&self) -> Result<bool, ConfigurationError> {
        self.flag(OptionName::LazyInitialization, false)
    }

    /// `register-shutdown-hook`, defaulting to `true`.
    pub fn register_shutdown_hook(&self) -> Result<bool, ConfigurationError> {
        self.flag(OptionName::RegisterShutdownHook, true)
    }

    /// Checks that every recorded value can be read by its typed reader.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.banner_mode()?;
        self.log_startup_info()?;
        self.web_application_type()?;
        self.lazy_initialization()?;
        self.register_shutdown_hook()?;
        Ok(())
    }

    fn read<T: Default>(
        &self,
        name: OptionName,
        parse: impl Fn(&str) -> Result<T, ConfigurationError>,
    ) -> Result<T, ConfigurationError> {
        self.get(name)
            .map_or_else(|| Ok(T::default()), |raw| parse(raw.trim()))
    }

    fn flag(&self, name: OptionName, default: bool) -> Result<bool, ConfigurationError> {
        self.get(name)
            .map_or(Ok(default), |raw| parse_flag(name, raw.trim()))
    }
}
