//! GL Type Definitions
//!
//! Native name/enum aliases and the subset of GL enumerants the engine
//! issues.

/// Native object name. `0` is never a valid object.
pub type GLuint = u32;
/// GL enumerant.
pub type GLenum = u32;

/// GL enumerants used by the engine.
pub mod consts {
    use super::GLenum;

    // Capabilities
    pub const BLEND: GLenum = 0x0BE2;
    pub const DEPTH_TEST: GLenum = 0x0B71;

    // Blend factors
    pub const ZERO: GLenum = 0;
    pub const ONE: GLenum = 1;
    pub const SRC_ALPHA: GLenum = 0x0302;
    pub const ONE_MINUS_SRC_ALPHA: GLenum = 0x0303;

    // Shader stages
    pub const FRAGMENT_SHADER: GLenum = 0x8B30;
    pub const VERTEX_SHADER: GLenum = 0x8B31;
    pub const GEOMETRY_SHADER: GLenum = 0x8DD9;
    pub const TESS_EVALUATION_SHADER: GLenum = 0x8E87;
    pub const TESS_CONTROL_SHADER: GLenum = 0x8E88;
    pub const COMPUTE_SHADER: GLenum = 0x91B9;

    // Texture targets
    pub const TEXTURE_1D: GLenum = 0x0DE0;
    pub const TEXTURE_2D: GLenum = 0x0DE1;
    pub const TEXTURE_3D: GLenum = 0x806F;
    pub const TEXTURE_RECTANGLE: GLenum = 0x84F5;
    pub const TEXTURE_CUBE_MAP: GLenum = 0x8513;
    pub const TEXTURE_1D_ARRAY: GLenum = 0x8C18;
    pub const TEXTURE_2D_ARRAY: GLenum = 0x8C1A;
    pub const TEXTURE_BUFFER: GLenum = 0x8C2A;
    pub const TEXTURE_CUBE_MAP_ARRAY: GLenum = 0x9009;
    pub const TEXTURE_2D_MULTISAMPLE: GLenum = 0x9100;
    pub const TEXTURE_2D_MULTISAMPLE_ARRAY: GLenum = 0x9102;
}
