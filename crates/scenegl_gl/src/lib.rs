//! SceneGL GL layer
//!
//! Provides:
//! - [`RenderContext`]: a native function table made current per thread
//! - [`ShareGroup`]: contexts sharing one object namespace, with a FIFO task queue
//! - [`GlObject`]: reference-counted native objects with deferred deletion
//! - [`HeadlessGl`]: a software function table for headless runs and tests

pub mod context;
pub mod gl;
pub mod headless;
pub mod kind;
pub mod object;
pub mod share_group;
pub mod task;

pub use context::{CurrentContext, RenderContext};
pub use gl::Gl;
pub use headless::{HeadlessGl, StateFlags};
pub use kind::{KindOps, ObjectFamily, ObjectKind, ShaderStage, TextureTarget};
pub use object::GlObject;
pub use share_group::{ContextKey, ShareGroup, ShareGroupStats};
pub use task::{CleanupTask, ShareGroupTask};
