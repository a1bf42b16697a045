use thiserror::Error;

/// Misuse of a [`HierarchyBuilder`](super::HierarchyBuilder) or an option
/// value a runtime could not interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("builder already consumed")]
    AlreadyConsumed,

    #[error("hierarchy has no levels")]
    EmptyHierarchy,

    #[error("no root level declared; call sources() before child()")]
    NoRootLevel,

    #[error("level {level} must declare at least one source")]
    EmptySources { level: usize },

    #[error("level {level} has a blank source id at position {position}")]
    EmptySourceId { level: usize, position: usize },

    #[error("level {level} does not exist (hierarchy depth is {depth})")]
    LevelOutOfRange { level: usize, depth: usize },

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidOptionValue { name: &'static str, value: String },
}
