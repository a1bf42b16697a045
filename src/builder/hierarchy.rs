//! Declared levels of a context hierarchy.

use std::fmt;

use super::{BuilderOptions, ConfigurationError};

/// Identifies a configuration-bearing unit that populates a context.
///
/// Blank identifiers are rejected when they are added to a level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Wraps `id` as given; see the type docs for when it is checked.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One level of the hierarchy: its sources and any options overridden for it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSpec {
    sources: Vec<SourceId>,
    overrides: BuilderOptions,
}

impl ContextSpec {
    /// Sources for this level, in declaration order.
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    pub fn overrides(&self) -> &BuilderOptions {
        &self.overrides
    }

    pub(crate) fn overrides_mut(&mut self) -> &mut BuilderOptions {
        &mut self.overrides
    }
}

/// Ordered levels, root first.
///
/// Levels are only ever appended at the leaf, so the parent of level `n` is
/// always level `n - 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    levels: Vec<ContextSpec>,
}

impl Hierarchy {
    pub fn levels(&self) -> &[ContextSpec] {
        &self.levels
    }

    /// Number of declared levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub(crate) fn leaf_mut(&mut self) -> Option<&mut ContextSpec> {
        self.levels.last_mut()
    }

    /// Appends `sources` to an existing level, or establishes the root when
    /// the hierarchy is empty and `level` is 0.
    pub(crate) fn extend_level(
        &mut self,
        level: usize,
        sources: Vec<SourceId>,
    ) -> Result<(), ConfigurationError> {
        check_sources(level, &sources)?;
        if level == 0 && self.levels.is_empty() {
            self.levels.push(ContextSpec::default());
        }
        let depth = self.levels.len();
        let spec = self
            .levels
            .get_mut(level)
            .ok_or(ConfigurationError::LevelOutOfRange { level, depth })?;
        spec.sources.extend(sources);
        Ok(())
    }

    /// Appends a new leaf level beneath the current deepest one.
    pub(crate) fn push_child(&mut self, sources: Vec<SourceId>) -> Result<(), ConfigurationError> {
        if self.levels.is_empty() {
            return Err(ConfigurationError::NoRootLevel);
        }
        check_sources(self.levels.len(), &sources)?;
        self.levels.push(ContextSpec {
            sources,
            overrides: BuilderOptions::default(),
        });
        Ok(())
    }
}

fn check_sources(level: usize, sources: &[SourceId]) -> Result<(), ConfigurationError> {
    if sources.is_empty() {
        return Err(ConfigurationError::EmptySources { level });
    }
    if let Some(position) = sources.iter().position(|id| id.as_str().trim().is_empty()) {
        return Err(ConfigurationError::EmptySourceId { level, position });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<SourceId> {
        names.iter().map(|n| SourceId::from(*n)).collect()
    }

    #[test]
    fn test_extend_establishes_root() {
        let mut hierarchy = Hierarchy::default();
        hierarchy.extend_level(0, ids(&["Parent"])).unwrap();
        hierarchy.extend_level(0, ids(&["Shared"])).unwrap();

        assert_eq!(hierarchy.depth(), 1);
        assert_eq!(hierarchy.levels()[0].sources(), ids(&["Parent", "Shared"]));
    }

    #[test]
    fn test_extend_missing_level() {
        let mut hierarchy = Hierarchy::default();
        let result = hierarchy.extend_level(1, ids(&["Orphan"]));

        assert_eq!(
            result,
            Err(ConfigurationError::LevelOutOfRange { level: 1, depth: 0 })
        );
        assert!(hierarchy.is_empty());
    }

    #[test]
    fn test_child_requires_root() {
        let mut hierarchy = Hierarchy::default();
        assert_eq!(
            hierarchy.push_child(ids(&["Application"])),
            Err(ConfigurationError::NoRootLevel)
        );
    }

    #[test]
    fn test_blank_source_id_rejected() {
        let mut hierarchy = Hierarchy::default();
        assert_eq!(
            hierarchy.extend_level(0, ids(&[""])),
            Err(ConfigurationError::EmptySourceId { level: 0, position: 0 })
        );
        assert!(hierarchy.is_empty());

        hierarchy.extend_level(0, ids(&["Parent"])).unwrap();
        assert_eq!(
            hierarchy.extend_level(0, ids(&["Shared", "  "])),
            Err(ConfigurationError::EmptySourceId { level: 0, position: 1 })
        );
        assert_eq!(
            hierarchy.push_child(ids(&["Application", ""])),
            Err(ConfigurationError::EmptySourceId { level: 1, position: 1 })
        );
        assert_eq!(hierarchy.depth(), 1);
        assert_eq!(hierarchy.levels()[0].sources(), ids(&["Parent"]));
    }

    #[test]
    fn test_empty_sources_rejected() {
        let mut hierarchy = Hierarchy::default();
        assert_eq!(
            hierarchy.extend_level(0, Vec::new()),
            Err(ConfigurationError::EmptySources { level: 0 })
        );

        hierarchy.extend_level(0, ids(&["Parent"])).unwrap();
        assert_eq!(
            hierarchy.push_child(Vec::new()),
            Err(ConfigurationError::EmptySources { level: 1 })
        );
        assert_eq!(hierarchy.depth(), 1);
    }
}
