//! GL Function Table
//!
//! [`Gl`] is the set of native entry points a render context exposes. Every
//! call on it is only meaningful while the owning context is current on the
//! calling thread; the context layer enforces that, implementations do not.
//!
//! Names follow the native API: `gen_*`/`delete_*` fill and consume name
//! slices, a written name of `0` signals allocation failure.

use scenegl_core::{GLenum, GLuint};

pub trait Gl: Send + Sync {
    fn gen_buffers(&self, names: &mut [GLuint]);
    fn delete_buffers(&self, names: &[GLuint]);

    fn gen_textures(&self, names: &mut [GLuint]);
    fn delete_textures(&self, names: &[GLuint]);

    fn gen_vertex_arrays(&self, names: &mut [GLuint]);
    fn delete_vertex_arrays(&self, names: &[GLuint]);

    fn gen_renderbuffers(&self, names: &mut [GLuint]);
    fn delete_renderbuffers(&self, names: &[GLuint]);

    fn gen_framebuffers(&self, names: &mut [GLuint]);
    fn delete_framebuffers(&self, names: &[GLuint]);

    fn gen_queries(&self, names: &mut [GLuint]);
    fn delete_queries(&self, names: &[GLuint]);

    fn gen_samplers(&self, names: &mut [GLuint]);
    fn delete_samplers(&self, names: &[GLuint]);

    fn create_program(&self) -> GLuint;
    fn delete_program(&self, program: GLuint);

    fn create_shader(&self, stage: GLenum) -> GLuint;
    fn delete_shader(&self, shader: GLuint);

    // Fixed-function state
    fn enable(&self, cap: GLenum);
    fn disable(&self, cap: GLenum);
    fn depth_mask(&self, flag: bool);
    fn blend_func(&self, src_factor: GLenum, dst_factor: GLenum);
}
