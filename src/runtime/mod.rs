//! The context runtime seam the builder drives.

mod memory;

pub use memory::{ContextHandle, InMemoryRuntime, RuntimeError};

use crate::builder::{BuilderOptions, ConfigurationError, SourceId};

/// Constructs, links, configures and starts contexts on behalf of a
/// [`HierarchyBuilder`](crate::HierarchyBuilder).
///
/// The builder calls these in a fixed order per level: `construct`, then
/// `set_parent` (non-root levels only), then `apply_options`, then `start`.
/// The error type must absorb [`ConfigurationError`] so builder misuse and
/// runtime failures come back through one `Result`.
pub trait ContextRuntime {
    type Context;
    type Error: From<ConfigurationError>;

    fn construct(&mut self, sources: &[SourceId]) -> Result<Self::Context, Self::Error>;

    fn set_parent(
        &mut self,
        child: &Self::Context,
        parent: &Self::Context,
    ) -> Result<(), Self::Error>;

    fn apply_options(
        &mut self,
        context: &Self::Context,
        options: &BuilderOptions,
    ) -> Result<(), Self::Error>;

    fn start(&mut self, context: Self::Context, args: &[String]) -> Result<Self::Context, Self::Error>;
}
