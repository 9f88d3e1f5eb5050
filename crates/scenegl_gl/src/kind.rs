//! Object Kinds
//!
//! A single [`GlObject`](crate::GlObject) type covers every native object.
//! The kind selects a static [`KindOps`] capability table holding the
//! allocate/delete entry points for that object family.

use scenegl_core::gl_types::consts;
use scenegl_core::{GLenum, GLuint};

use crate::gl::Gl;

/// Programmable pipeline stage of a shader object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
}

impl ShaderStage {
    #[must_use]
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Vertex => consts::VERTEX_SHADER,
            Self::TessControl => consts::TESS_CONTROL_SHADER,
            Self::TessEvaluation => consts::TESS_EVALUATION_SHADER,
            Self::Geometry => consts::GEOMETRY_SHADER,
            Self::Fragment => consts::FRAGMENT_SHADER,
            Self::Compute => consts::COMPUTE_SHADER,
        }
    }
}

/// Binding target of a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    Buffer,
    Cubemap,
    CubemapArray,
    Texture2DMultisample,
    Texture2DMultisampleArray,
    Rectangle,
}

impl TextureTarget {
    #[must_use]
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Texture1D => consts::TEXTURE_1D,
            Self::Texture1DArray => consts::TEXTURE_1D_ARRAY,
            Self::Texture2D => consts::TEXTURE_2D,
            Self::Texture2DArray => consts::TEXTURE_2D_ARRAY,
            Self::Texture3D => consts::TEXTURE_3D,
            Self::Buffer => consts::TEXTURE_BUFFER,
            Self::Cubemap => consts::TEXTURE_CUBE_MAP,
            Self::CubemapArray => consts::TEXTURE_CUBE_MAP_ARRAY,
            Self::Texture2DMultisample => consts::TEXTURE_2D_MULTISAMPLE,
            Self::Texture2DMultisampleArray => consts::TEXTURE_2D_MULTISAMPLE_ARRAY,
            Self::Rectangle => consts::TEXTURE_RECTANGLE,
        }
    }
}

/// What a [`GlObject`](crate::GlObject) wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    Texture(TextureTarget),
    VertexArray,
    Renderbuffer,
    Framebuffer,
    Program,
    Shader(ShaderStage),
    Query,
    Sampler,
}

impl ObjectKind {
    /// The name namespace this kind allocates from.
    #[must_use]
    pub fn family(self) -> ObjectFamily {
        match self {
            Self::Buffer => ObjectFamily::Buffer,
            Self::Texture(_) => ObjectFamily::Texture,
            Self::VertexArray => ObjectFamily::VertexArray,
            Self::Renderbuffer => ObjectFamily::Renderbuffer,
            Self::Framebuffer => ObjectFamily::Framebuffer,
            Self::Program => ObjectFamily::Program,
            Self::Shader(_) => ObjectFamily::Shader,
            Self::Query => ObjectFamily::Query,
            Self::Sampler => ObjectFamily::Sampler,
        }
    }

    #[inline]
    #[must_use]
    pub fn ops(self) -> &'static KindOps {
        self.family().ops()
    }
}

/// Object kind with the per-kind payload erased; kinds in one family share
/// allocate/delete entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectFamily {
    Buffer,
    Texture,
    VertexArray,
    Renderbuffer,
    Framebuffer,
    Program,
    Shader,
    Query,
    Sampler,
}

impl ObjectFamily {
    #[must_use]
    pub fn ops(self) -> &'static KindOps {
        match self {
            Self::Buffer => &BUFFER_OPS,
            Self::Texture => &TEXTURE_OPS,
            Self::VertexArray => &VERTEX_ARRAY_OPS,
            Self::Renderbuffer => &RENDERBUFFER_OPS,
            Self::Framebuffer => &FRAMEBUFFER_OPS,
            Self::Program => &PROGRAM_OPS,
            Self::Shader => &SHADER_OPS,
            Self::Query => &QUERY_OPS,
            Self::Sampler => &SAMPLER_OPS,
        }
    }
}

/// Capability table of one object family.
pub struct KindOps {
    label: &'static str,
    allocate: fn(&dyn Gl, ObjectKind) -> GLuint,
    delete: fn(&dyn Gl, &[GLuint]),
}

impl KindOps {
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Allocates one native name; `0` on failure.
    #[inline]
    pub fn allocate(&self, gl: &dyn Gl, kind: ObjectKind) -> GLuint {
        (self.allocate)(gl, kind)
    }

    #[inline]
    pub fn delete(&self, gl: &dyn Gl, names: &[GLuint]) {
        (self.delete)(gl, names);
    }
}

impl std::fmt::Debug for KindOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindOps").field("label", &self.label).finish()
    }
}

macro_rules! gen_delete_ops {
    ($($ops:ident: $label:literal => $gen_fn:ident, $delete:ident;)*) => {
        $(
            static $ops: KindOps = KindOps {
                label: $label,
                allocate: {
                    fn allocate(gl: &dyn Gl, _kind: ObjectKind) -> GLuint {
                        let mut name = [0];
                        gl.$gen_fn(&mut name);
                        name[0]
                    }
                    allocate
                },
                delete: {
                    fn delete(gl: &dyn Gl, names: &[GLuint]) {
                        gl.$delete(names);
                    }
                    delete
                },
            };
        )*
    };
}

gen_delete_ops! {
    BUFFER_OPS: "buffer" => gen_buffers, delete_buffers;
    TEXTURE_OPS: "texture" => gen_textures, delete_textures;
    VERTEX_ARRAY_OPS: "vertex array" => gen_vertex_arrays, delete_vertex_arrays;
    RENDERBUFFER_OPS: "renderbuffer" => gen_renderbuffers, delete_renderbuffers;
    FRAMEBUFFER_OPS: "framebuffer" => gen_framebuffers, delete_framebuffers;
    QUERY_OPS: "query" => gen_queries, delete_queries;
    SAMPLER_OPS: "sampler" => gen_samplers, delete_samplers;
}

static PROGRAM_OPS: KindOps = KindOps {
    label: "program",
    allocate: allocate_program,
    delete: delete_programs,
};

static SHADER_OPS: KindOps = KindOps {
    label: "shader",
    allocate: allocate_shader,
    delete: delete_shaders,
};

fn allocate_program(gl: &dyn Gl, _kind: ObjectKind) -> GLuint {
    gl.create_program()
}

fn delete_programs(gl: &dyn Gl, names: &[GLuint]) {
    for &name in names {
        gl.delete_program(name);
    }
}

fn allocate_shader(gl: &dyn Gl, kind: ObjectKind) -> GLuint {
    match kind {
        ObjectKind::Shader(stage) => gl.create_shader(stage.gl_enum()),
        _ => 0,
    }
}

fn delete_shaders(gl: &dyn Gl, names: &[GLuint]) {
    for &name in names {
        gl.delete_shader(name);
    }
}
