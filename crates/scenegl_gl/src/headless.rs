//! Headless GL
//!
//! A software [`Gl`] implementation. It hands out names, tracks which names
//! are alive per object family, records every deletion and mirrors the
//! blend/depth state the engine toggles. Used for headless runs, tests and
//! benchmarks.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use bitflags::bitflags;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use scenegl_core::gl_types::consts;
use scenegl_core::{GLenum, GLuint};

use crate::gl::Gl;
use crate::kind::ObjectFamily;

bitflags! {
    /// Fixed-function state tracked by [`HeadlessGl`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StateFlags: u32 {
        const BLEND       = 1 << 0;
        const DEPTH_WRITE = 1 << 1;
        const DEPTH_TEST  = 1 << 2;
    }
}

impl Default for StateFlags {
    /// Native defaults: blending off, depth writes on, depth test off.
    fn default() -> Self {
        Self::DEPTH_WRITE
    }
}

#[derive(Debug, Default)]
struct HeadlessState {
    live: FxHashMap<GLuint, ObjectFamily>,
    deletions: Vec<(ObjectFamily, GLuint)>,
    invalid_deletions: u64,
    flags: StateFlags,
    blend_func: (GLenum, GLenum),
}

pub struct HeadlessGl {
    state: Mutex<HeadlessState>,
    next_name: AtomicU32,
    fail_allocations: AtomicBool,
}

impl Default for HeadlessGl {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessGl {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HeadlessState {
                blend_func: (consts::ONE, consts::ZERO),
                ..HeadlessState::default()
            }),
            next_name: AtomicU32::new(1),
            fail_allocations: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent allocation write the invalid name `0`.
    pub fn set_fail_allocations(&self, fail: bool) {
        self.fail_allocations.store(fail, Ordering::Relaxed);
    }

    #[must_use]
    pub fn state_flags(&self) -> StateFlags {
        self.state.lock().flags
    }

    #[must_use]
    pub fn blend_func(&self) -> (GLenum, GLenum) {
        self.state.lock().blend_func
    }

    #[must_use]
    pub fn is_live(&self, name: GLuint) -> bool {
        self.state.lock().live.contains_key(&name)
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Every successful deletion so far, in call order.
    #[must_use]
    pub fn deletions(&self) -> Vec<(ObjectFamily, GLuint)> {
        self.state.lock().deletions.clone()
    }

    /// How many times `name` was deleted while alive.
    #[must_use]
    pub fn deletion_count(&self, name: GLuint) -> usize {
        self.state
            .lock()
            .deletions
            .iter()
            .filter(|(_, n)| *n == name)
            .count()
    }

    /// Deletions of names that were not alive (double deletes, foreign
    /// names). `0` is silently ignored like the native API does.
    #[must_use]
    pub fn invalid_deletions(&self) -> u64 {
        self.state.lock().invalid_deletions
    }

    fn allocate(&self, family: ObjectFamily) -> GLuint {
        if self.fail_allocations.load(Ordering::Relaxed) {
            return 0;
        }
        let name = self.next_name.fetch_add(1, Ordering::Relaxed);
        self.state.lock().live.insert(name, family);
        name
    }

    fn gen_names(&self, family: ObjectFamily, names: &mut [GLuint]) {
        for slot in names {
            *slot = self.allocate(family);
        }
    }

    fn delete(&self, family: ObjectFamily, names: &[GLuint]) {
        let mut state = self.state.lock();
        for &name in names {
            if name == 0 {
                continue;
            }
            match state.live.get(&name) {
                Some(&live) if live == family => {
                    state.live.remove(&name);
                    state.deletions.push((family, name));
                }
                _ => state.invalid_deletions += 1,
            }
        }
    }

    fn set_cap(&self, cap: GLenum, enabled: bool) {
        let flag = match cap {
            consts::BLEND => StateFlags::BLEND,
            consts::DEPTH_TEST => StateFlags::DEPTH_TEST,
            _ => return,
        };
        self.state.lock().flags.set(flag, enabled);
    }
}

impl Gl for HeadlessGl {
    fn gen_buffers(&self, names: &mut [GLuint]) {
        self.gen_names(ObjectFamily::Buffer, names);
    }

    fn delete_buffers(&self, names: &[GLuint]) {
        self.delete(ObjectFamily::Buffer, names);
    }

    fn gen_textures(&self, names: &mut [GLuint]) {
        self.gen_names(ObjectFamily::Texture, names);
    }

    fn delete_textures(&self, names: &[GLuint]) {
        self.delete(ObjectFamily::Texture, names);
    }

    fn gen_vertex_arrays(&self, names: &mut [GLuint]) {
        self.gen_names(ObjectFamily::VertexArray, names);
    }

    fn delete_vertex_arrays(&self, names: &[GLuint]) {
        self.delete(ObjectFamily::VertexArray, names);
    }

    fn gen_renderbuffers(&self, names: &mut [GLuint]) {
        self.gen_names(ObjectFamily::Renderbuffer, names);
    }

    fn delete_renderbuffers(&self, names: &[GLuint]) {
        self.delete(ObjectFamily::Renderbuffer, names);
    }

    fn gen_framebuffers(&self, names: &mut [GLuint]) {
        self.gen_names(ObjectFamily::Framebuffer, names);
    }

    fn delete_framebuffers(&self, names: &[GLuint]) {
        self.delete(ObjectFamily::Framebuffer, names);
    }

    fn gen_queries(&self, names: &mut [GLuint]) {
        self.gen_names(ObjectFamily::Query, names);
    }

    fn delete_queries(&self, names: &[GLuint]) {
        self.delete(ObjectFamily::Query, names);
    }

    fn gen_samplers(&self, names: &mut [GLuint]) {
        self.gen_names(ObjectFamily::Sampler, names);
    }

    fn delete_samplers(&self, names: &[GLuint]) {
        self.delete(ObjectFamily::Sampler, names);
    }

    fn create_program(&self) -> GLuint {
        self.allocate(ObjectFamily::Program)
    }

    fn delete_program(&self, program: GLuint) {
        self.delete(ObjectFamily::Program, &[program]);
    }

    fn create_shader(&self, _stage: GLenum) -> GLuint {
        self.allocate(ObjectFamily::Shader)
    }

    fn delete_shader(&self, shader: GLuint) {
        self.delete(ObjectFamily::Shader, &[shader]);
    }

    fn enable(&self, cap: GLenum) {
        self.set_cap(cap, true);
    }

    fn disable(&self, cap: GLenum) {
        self.set_cap(cap, false);
    }

    fn depth_mask(&self, flag: bool) {
        self.state.lock().flags.set(StateFlags::DEPTH_WRITE, flag);
    }

    fn blend_func(&self, src_factor: GLenum, dst_factor: GLenum) {
        self.state.lock().blend_func = (src_factor, dst_factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_matches_native_defaults() {
        let gl = HeadlessGl::new();
        assert_eq!(gl.state_flags(), StateFlags::DEPTH_WRITE);
        assert_eq!(gl.blend_func(), (consts::ONE, consts::ZERO));
    }

    #[test]
    fn double_delete_is_counted_as_invalid() {
        let gl = HeadlessGl::new();
        let mut names = [0; 2];
        gl.gen_buffers(&mut names);
        assert!(names.iter().all(|&n| gl.is_live(n)));

        gl.delete_buffers(&names[..1]);
        gl.delete_buffers(&names[..1]);
        assert_eq!(gl.deletion_count(names[0]), 1);
        assert_eq!(gl.invalid_deletions(), 1);
        assert_eq!(gl.live_count(), 1);
    }

    #[test]
    fn deleting_through_the_wrong_family_is_invalid() {
        let gl = HeadlessGl::new();
        let program = gl.create_program();
        gl.delete_shader(program);
        assert!(gl.is_live(program));
        assert_eq!(gl.invalid_deletions(), 1);
    }

    #[test]
    fn failing_allocation_yields_zero() {
        let gl = HeadlessGl::new();
        gl.set_fail_allocations(true);
        let mut name = [7];
        gl.gen_textures(&mut name);
        assert_eq!(name[0], 0);
        assert_eq!(gl.create_program(), 0);
    }
}
