//! SceneGL core: error types and GL type definitions shared by every crate.

pub mod errors;
pub mod gl_types;

pub use errors::{Result, SceneGlError};
pub use gl_types::{GLenum, GLuint};
