//! Renderer interface consumed by pass controllers.

use std::sync::Arc;

use scenegl_gl::RenderContext;

/// Identity of a renderer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererId(pub u64);

/// Handle of the render group holding transparent primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderGroupId(pub u64);

/// The renderer driving a transparent pass.
///
/// State changes made by a pass controller go to [`Renderer::context`],
/// which must be current on the calling thread while the pass runs.
pub trait Renderer {
    fn id(&self) -> RendererId;

    fn context(&self) -> &Arc<RenderContext>;
}
