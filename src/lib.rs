pub mod banner;
pub mod builder;
pub mod runtime;
pub mod settings;
mod error;

pub use builder::{
    BannerMode, BuilderOptions, BuilderState, ConfigurationError, HierarchyBuilder, OptionName,
    SourceId,
};
pub use error::Error;
pub use runtime::{ContextHandle, ContextRuntime, InMemoryRuntime, RuntimeError};
pub use settings::{HierarchySettings, Settings, SettingsError};
