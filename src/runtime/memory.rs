//! A runtime that keeps constructed contexts in memory.

use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::{debug, info};

use super::ContextRuntime;
use crate::banner::{print_banner, DEFAULT_BANNER};
use crate::builder::{BuilderOptions, ConfigurationError, SourceId};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RuntimeError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("context {0} already has a parent")]
    ParentAlreadySet(u64),

    #[error("parent context {0} has not been started")]
    ParentNotStarted(u64),

    #[error("context {0} has already been started")]
    AlreadyStarted(u64),

    #[error("options already applied to context {0}")]
    OptionsAlreadyApplied(u64),

    #[error("failed to print banner: {0}")]
    Banner(#[from] io::Error),
}

static NO_OPTIONS: BuilderOptions = BuilderOptions::EMPTY;

#[derive(Debug)]
struct ContextState {
    id: u64,
    sources: Vec<SourceId>,
    parent: OnceLock<ContextHandle>,
    options: OnceLock<BuilderOptions>,
    args: OnceLock<Vec<String>>,
}

/// Shared handle to a context created by [`InMemoryRuntime`].
///
/// Each field can be filled once; a context counts as started once its
/// arguments are recorded.
#[derive(Debug, Clone)]
pub struct ContextHandle {
    inner: Arc<ContextState>,
}

impl ContextHandle {
    /// Sequential identifier, starting at 1.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Sources the context was constructed from, in declaration order.
    pub fn sources(&self) -> &[SourceId] {
        &self.inner.sources
    }

    /// The enclosing context; `None` for the root.
    pub fn parent(&self) -> Option<&ContextHandle> {
        self.inner.parent.get()
    }

    /// Options applied to this context, or none if it was never configured.
    pub fn options(&self) -> &BuilderOptions {
        self.inner.options.get().unwrap_or(&NO_OPTIONS)
    }

    /// Arguments the context was started with; empty until started.
    pub fn args(&self) -> &[String] {
        self.inner.args.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether [`ContextRuntime::start`] has completed for this context.
    pub fn is_started(&self) -> bool {
        self.inner.args.get().is_some()
    }
}

/// Reference [`ContextRuntime`] that records every context it constructs.
///
/// Banners in `console` mode go to the configured writer (stdout by default).
#[derive(Debug)]
pub struct InMemoryRuntime<W = io::Stdout> {
    contexts: Vec<ContextHandle>,
    banner: Cow<'static, str>,
    out: W,
}

impl InMemoryRuntime<io::Stdout> {
    /// A runtime that prints `console` banners to stdout.
    pub fn new() -> Self {
        Self::with_banner_output(io::stdout())
    }
}

impl Default for InMemoryRuntime<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> InMemoryRuntime<W> {
    /// A runtime that prints `console` banners to `out`.
    pub fn with_banner_output(out: W) -> Self {
        Self {
            contexts: Vec::new(),
            banner: Cow::Borrowed(DEFAULT_BANNER),
            out,
        }
    }

    /// Replaces the banner text.
    pub fn with_banner(mut self, banner: impl Into<Cow<'static, str>>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Every context constructed so far, in construction order.
    pub fn contexts(&self) -> &[ContextHandle] {
        &self.contexts
    }
}

impl InMemoryRuntime<Vec<u8>> {
    /// Everything written in `console` banner mode.
    pub fn banner_output(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.out)
    }
}

impl<W: Write> ContextRuntime for InMemoryRuntime<W> {
    type Context = ContextHandle;
    type Error = RuntimeError;

    fn construct(&mut self, sources: &[SourceId]) -> Result<ContextHandle, RuntimeError> {
        let id = self.contexts.len() as u64 + 1;
        let handle = ContextHandle {
            inner: Arc::new(ContextState {
                id,
                sources: sources.to_vec(),
                parent: OnceLock::new(),
                options: OnceLock::new(),
                args: OnceLock::new(),
            }),
        };
        debug!(context = id, ?sources, "constructed context");
        self.contexts.push(handle.clone());
        Ok(handle)
    }

    fn set_parent(
        &mut self,
        child: &ContextHandle,
        parent: &ContextHandle,
    ) -> Result<(), RuntimeError> {
        if !parent.is_started() {
            return Err(RuntimeError::ParentNotStarted(parent.id()));
        }
        if child.is_started() {
            return Err(RuntimeError::AlreadyStarted(child.id()));
        }
        child
            .inner
            .parent
            .set(parent.clone())
            .map_err(|_| RuntimeError::ParentAlreadySet(child.id()))?;
        debug!(context = child.id(), parent = parent.id(), "linked parent");
        Ok(())
    }

    fn apply_options(
        &mut self,
        context: &ContextHandle,
        options: &BuilderOptions,
    ) -> Result<(), RuntimeError> {
        options.validate()?;
        context
            .inner
            .options
            .set(options.clone())
            .map_err(|_| RuntimeError::OptionsAlreadyApplied(context.id()))?;
        debug!(context = context.id(), ?options, "applied options");
        Ok(())
    }

    fn start(&mut self, context: ContextHandle, args: &[String]) -> Result<ContextHandle, RuntimeError> {
        if context.is_started() {
            return Err(RuntimeError::AlreadyStarted(context.id()));
        }
        let options = context.options();
        print_banner(options.banner_mode()?, &self.banner, &mut self.out)?;

        context
            .inner
            .args
            .set(args.to_vec())
            .map_err(|_| RuntimeError::AlreadyStarted(context.id()))?;

        if options.log_startup_info()? {
            info!(
                context = context.id(),
                sources = ?context.sources(),
                parent = ?context.parent().map(ContextHandle::id),
                web_application_type = ?options.web_application_type()?,
                lazy_initialization = options.lazy_initialization()?,
                "started context"
            );
        }
        Ok(context)
    }
}
