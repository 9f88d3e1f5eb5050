//! # SceneGL
//!
//! GL object ownership and transparency compositing for a scene-graph
//! renderer.
//!
//! - [`gl`]: render contexts, share groups and reference-counted GL objects
//!   whose deletion is deferred to a context that owns them
//! - [`render`]: transparent-pass control and shader snippets
//! - [`errors`]: the error type shared by every crate
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scenegl::prelude::*;
//!
//! let gl = Arc::new(HeadlessGl::new());
//! let context = RenderContext::new(gl);
//! let _current = context.make_current()?;
//! let vao = GlObject::vertex_array()?;
//! ```

pub use glam;
pub use scenegl_core::errors;
pub use scenegl_core::gl_types;

/// Contexts, share groups and GL objects.
pub mod gl {
    pub use scenegl_gl::*;
}

/// Transparency pass control.
pub mod render {
    pub use scenegl_render::*;
}

pub use errors::{Result, SceneGlError};

pub mod prelude {
    pub use crate::errors::{Result, SceneGlError};
    pub use crate::gl::{
        CurrentContext, Gl, GlObject, HeadlessGl, ObjectKind, RenderContext, ShareGroup,
        ShareGroupTask,
    };
    pub use crate::render::{
        Renderer, RendererId, TransparencyManager, TransparencyMode, TransparencySettings,
    };
}
