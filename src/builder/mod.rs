//! Fluent builder for parent/child context hierarchies.

mod error;
mod hierarchy;
mod options;

pub use error::ConfigurationError;
pub use hierarchy::{ContextSpec, Hierarchy, SourceId};
pub use options::{BannerMode, BuilderOptions, OptionName, WebApplicationType};

use tracing::{debug, debug_span};

use crate::runtime::ContextRuntime;

/// Lifecycle of a [`HierarchyBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// Accepting sources, children and options.
    Configuring,
    /// [`run`](HierarchyBuilder::run) has been called; the builder is spent.
    Started,
}

/// Accumulates hierarchy levels and options, then starts them through a
/// [`ContextRuntime`].
///
/// Every configuring call returns `&mut Self` so calls chain with `?`.
///
/// ## Example
///
/// ```no_run
/// use context_hierarchy::{BannerMode, HierarchyBuilder, InMemoryRuntime};
///
/// let args: Vec<String> = std::env::args().skip(1).collect();
/// let mut runtime = InMemoryRuntime::new();
///
/// let app = HierarchyBuilder::new()
///     .sources(["Parent"])?
///     .child(["Application"])?
///     .banner_mode(BannerMode::Off)?
///     .run(&mut runtime, &args)?;
///
/// assert_eq!(app.parent().map(|p| p.id()), Some(1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct HierarchyBuilder {
    hierarchy: Hierarchy,
    options: BuilderOptions,
    state: BuilderState,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyBuilder {
    /// Creates an empty builder in the [`Configuring`](BuilderState::Configuring) state.
    pub fn new() -> Self {
        Self {
            hierarchy: Hierarchy::default(),
            options: BuilderOptions::default(),
            state: BuilderState::Configuring,
        }
    }

    /// Where the builder is in its lifecycle.
    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Levels declared so far, root first.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Options that apply to every level unless a level overrides them.
    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    /// Appends sources to an existing level.
    ///
    /// On an empty builder, level 0 establishes the root. Fails if `ids` is
    /// empty or holds a blank id, leaving the level untouched.
    pub fn add_sources<I, S>(&mut self, level: usize, ids: I) -> Result<&mut Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        self.ensure_configuring()?;
        self.hierarchy
            .extend_level(level, ids.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    /// Appends sources to the deepest level, establishing the root if needed.
    pub fn sources<I, S>(&mut self, ids: I) -> Result<&mut Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        let level = self.hierarchy.depth().saturating_sub(1);
        self.add_sources(level, ids)
    }

    /// Begins a new level one deeper than the current deepest level.
    pub fn child<I, S>(&mut self, ids: I) -> Result<&mut Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SourceId>,
    {
        self.ensure_configuring()?;
        self.hierarchy
            .push_child(ids.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    /// Records an option for the whole hierarchy. The last write for a name wins.
    pub fn set_option(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, ConfigurationError> {
        self.ensure_configuring()?;
        let name: OptionName = name.parse()?;
        self.options.set(name, value);
        Ok(self)
    }

    /// Records an option for the deepest level only, taking precedence over
    /// [`set_option`](Self::set_option) for that level.
    pub fn set_level_option(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<&mut Self, ConfigurationError> {
        self.ensure_configuring()?;
        let name: OptionName = name.parse()?;
        let leaf = self
            .hierarchy
            .leaf_mut()
            .ok_or(ConfigurationError::NoRootLevel)?;
        leaf.overrides_mut().set(name, value);
        Ok(self)
    }

    /// Shorthand for `set_option("banner-mode", mode)`.
    pub fn banner_mode(&mut self, mode: BannerMode) -> Result<&mut Self, ConfigurationError> {
        self.set_option(OptionName::BannerMode.as_str(), mode.as_str())
    }

    /// Constructs and starts every level, root first, and returns the leaf.
    ///
    /// Each non-root context is linked to the previously started one before
    /// its options are applied. `args` reach every level unchanged. Errors
    /// from the runtime are returned as they are; the builder stays spent.
    pub fn run<R: ContextRuntime>(
        &mut self,
        runtime: &mut R,
        args: &[String],
    ) -> Result<R::Context, R::Error> {
        self.ensure_configuring()?;
        if self.hierarchy.is_empty() {
            return Err(ConfigurationError::EmptyHierarchy.into());
        }
        self.state = BuilderState::Started;

        let mut parent: Option<R::Context> = None;
        for (level, spec) in self.hierarchy.levels().iter().enumerate() {
            let _span = debug_span!("level", level).entered();
            debug!(sources = ?spec.sources(), "constructing context");

            let context = runtime.construct(spec.sources())?;
            if let Some(parent) = &parent {
                runtime.set_parent(&context, parent)?;
            }
            let effective = self.options.merged_with(spec.overrides());
            runtime.apply_options(&context, &effective)?;
            parent = Some(runtime.start(context, args)?);
        }

        // Non-empty hierarchy guarantees at least one started level.
        parent.ok_or_else(|| ConfigurationError::EmptyHierarchy.into())
    }

    fn ensure_configuring(&self) -> Result<(), ConfigurationError> {
        match self.state {
            BuilderState::Configuring => Ok(()),
            BuilderState::Started => Err(ConfigurationError::AlreadyConsumed),
        }
    }
}
