//! Transparency Management
//!
//! A [`TransparencyManager`] drives the transparent portion of a frame. The
//! renderer brackets its transparent draws with
//! [`begin_transparent_pass`](TransparencyManager::begin_transparent_pass) and
//! [`end_transparent_pass`](TransparencyManager::end_transparent_pass); the
//! latter reports whether the strategy needs another iteration.
//!
//! ```text
//!        begin_transparent_pass            end_transparent_pass
//! Idle ──────────────────────────▶ InPass ─────────────────────▶ Idle
//! ```
//!
//! Calling begin while a pass is active, or end while idle, is an error.
//! Ending a pass whose context is no longer current abandons it.
//!
//! The compositing technique itself lives in a [`TransparencyStrategy`]; the
//! manager owns the bookkeeping that is common to all of them.

mod sorted_blended;

pub use sorted_blended::SortedBlended;

use std::sync::Arc;

use glam::UVec2;
use smallvec::SmallVec;

use scenegl_core::{Result, SceneGlError};
use scenegl_gl::{Gl, RenderContext};

use crate::renderer::{RenderGroupId, Renderer, RendererId};
use crate::settings::{TransparencyMode, TransparencySettings};
use crate::snippets::SnippetLoader;

/// A compositing technique for transparent geometry.
pub trait TransparencyStrategy: Send {
    fn mode(&self) -> TransparencyMode;

    /// Applies the pass state.
    fn begin_pass(&mut self, gl: &dyn Gl);

    /// Restores the state applied in [`begin_pass`](Self::begin_pass).
    /// Returns `true` when another pass iteration is required.
    fn end_pass(&mut self, gl: &dyn Gl) -> bool;

    /// Snippet files the fragment program of a material needs.
    fn fragment_snippets(&self, transparent: bool, depth: bool) -> SmallVec<[&'static str; 2]>;

    /// Whether transparent primitives must be submitted back to front.
    fn needs_sorted_rendering(&self) -> bool;

    /// Allocates per-pass parameters for a viewport.
    fn initialize_parameter_container(&mut self, _renderer: &dyn Renderer, _viewport_size: UVec2) {}

    /// Binds per-pass parameters to the transparent render group.
    fn use_parameter_container(&mut self, _renderer: &dyn Renderer, _render_group: RenderGroupId) {}
}

/// Counters over the lifetime of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    pub begun: u64,
    pub completed: u64,
}

struct ActivePass {
    renderer: RendererId,
    context: Arc<RenderContext>,
}

pub struct TransparencyManager {
    strategy: Box<dyn TransparencyStrategy>,
    snippets: SnippetLoader,
    viewport_size: UVec2,
    active: Option<ActivePass>,
    /// Iteration index of the next pass within a multi-pass sequence.
    iteration: u32,
    stats: PassStats,
}

impl TransparencyManager {
    /// Creates the manager for `settings.mode`.
    pub fn new(settings: &TransparencySettings) -> Result<Self> {
        let strategy: Box<dyn TransparencyStrategy> = match settings.mode {
            TransparencyMode::SortedBlended => Box::new(SortedBlended::new()),
            mode => return Err(SceneGlError::UnsupportedTransparencyMode(mode.to_string())),
        };
        Ok(Self::with_strategy(
            strategy,
            SnippetLoader::new(settings.snippets.clone()),
        ))
    }

    #[must_use]
    pub fn with_strategy(strategy: Box<dyn TransparencyStrategy>, snippets: SnippetLoader) -> Self {
        log::debug!("Transparency manager created: {}", strategy.mode());
        Self {
            strategy,
            snippets,
            viewport_size: UVec2::ZERO,
            active: None,
            iteration: 0,
            stats: PassStats::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> TransparencyMode {
        self.strategy.mode()
    }

    #[inline]
    #[must_use]
    pub fn viewport_size(&self) -> UVec2 {
        self.viewport_size
    }

    #[inline]
    #[must_use]
    pub fn is_in_pass(&self) -> bool {
        self.active.is_some()
    }

    /// The renderer of the active pass.
    #[must_use]
    pub fn active_renderer(&self) -> Option<RendererId> {
        self.active.as_ref().map(|pass| pass.renderer)
    }

    /// Index of the current (or next) iteration in a multi-pass sequence.
    #[inline]
    #[must_use]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> PassStats {
        self.stats
    }

    #[inline]
    #[must_use]
    pub fn needs_sorted_rendering(&self) -> bool {
        self.strategy.needs_sorted_rendering()
    }

    pub fn begin_transparent_pass(&mut self, renderer: &dyn Renderer) -> Result<()> {
        if self.active.is_some() {
            return Err(SceneGlError::PassAlreadyActive);
        }
        let context = renderer.context();
        if !context.is_current() {
            return Err(SceneGlError::NoCurrentContext);
        }

        self.active = Some(ActivePass {
            renderer: renderer.id(),
            context: Arc::clone(context),
        });
        self.stats.begun += 1;
        log::trace!(
            "Transparent pass {} begun by renderer {:?}",
            self.iteration,
            renderer.id()
        );

        self.strategy.begin_pass(context.gl());
        Ok(())
    }

    /// Ends the active pass. Returns `true` when the strategy needs another
    /// iteration.
    ///
    /// If the pass's context is no longer current the pass is abandoned:
    /// no state is restored, the sequence resets and `NoCurrentContext` is
    /// returned.
    pub fn end_transparent_pass(&mut self) -> Result<bool> {
        let pass = self.active.take().ok_or(SceneGlError::NoActivePass)?;
        if !pass.context.is_current() {
            log::warn!(
                "Abandoning transparent pass {}: context {} is no longer current",
                self.iteration,
                pass.context.id()
            );
            self.iteration = 0;
            return Err(SceneGlError::NoCurrentContext);
        }

        let again = self.strategy.end_pass(pass.context.gl());

        self.stats.completed += 1;
        self.iteration = if again { self.iteration + 1 } else { 0 };
        Ok(again)
    }

    /// Runs begin/`draw`/end until the strategy stops requesting passes.
    /// `draw` receives the iteration index. Returns the number of passes.
    pub fn run_transparent_passes<F>(&mut self, renderer: &dyn Renderer, mut draw: F) -> Result<u32>
    where
        F: FnMut(u32),
    {
        let mut passes = 0;
        loop {
            self.begin_transparent_pass(renderer)?;
            draw(self.iteration);
            passes += 1;
            if !self.end_transparent_pass()? {
                return Ok(passes);
            }
        }
    }

    /// Appends the strategy's fragment snippets to `snippets`. Existing
    /// entries are left untouched; nothing is appended on error.
    pub fn add_fragment_code_snippets(
        &self,
        transparent: bool,
        depth: bool,
        snippets: &mut Vec<String>,
    ) -> Result<()> {
        let loaded = self
            .strategy
            .fragment_snippets(transparent, depth)
            .into_iter()
            .map(|name| self.snippets.load_text(name))
            .collect::<Result<SmallVec<[String; 2]>>>()?;
        snippets.extend(loaded);
        Ok(())
    }

    pub fn initialize_parameter_container(&mut self, renderer: &dyn Renderer, viewport_size: UVec2) {
        self.viewport_size = viewport_size;
        self.strategy
            .initialize_parameter_container(renderer, viewport_size);
    }

    pub fn use_parameter_container(&mut self, renderer: &dyn Renderer, render_group: RenderGroupId) {
        self.strategy.use_parameter_container(renderer, render_group);
    }
}

impl std::fmt::Debug for TransparencyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransparencyManager")
            .field("mode", &self.mode())
            .field("viewport_size", &self.viewport_size)
            .field("in_pass", &self.is_in_pass())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
