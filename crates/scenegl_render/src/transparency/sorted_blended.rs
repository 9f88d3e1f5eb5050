//! Sorted-Blended Transparency
//!
//! Single-pass compositing: transparent primitives are submitted back to
//! front and alpha-blended over the opaque result with depth writes off.
//!
//! # Pass state
//! - begin: depth mask off, blending on, `(SRC_ALPHA, ONE_MINUS_SRC_ALPHA)`
//! - end: blending off, depth mask on

use smallvec::{SmallVec, smallvec};

use scenegl_core::gl_types::consts;
use scenegl_gl::Gl;

use super::TransparencyStrategy;
use crate::settings::TransparencyMode;
use crate::snippets::{EMIT_COLOR, EMIT_COLOR_DEPTH};

#[derive(Debug, Default, Clone, Copy)]
pub struct SortedBlended;

impl SortedBlended {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TransparencyStrategy for SortedBlended {
    fn mode(&self) -> TransparencyMode {
        TransparencyMode::SortedBlended
    }

    fn begin_pass(&mut self, gl: &dyn Gl) {
        gl.depth_mask(false);
        gl.enable(consts::BLEND);
        gl.blend_func(consts::SRC_ALPHA, consts::ONE_MINUS_SRC_ALPHA);
    }

    fn end_pass(&mut self, gl: &dyn Gl) -> bool {
        gl.disable(consts::BLEND);
        gl.depth_mask(true);
        // One pass suffices.
        false
    }

    fn fragment_snippets(&self, _transparent: bool, depth: bool) -> SmallVec<[&'static str; 2]> {
        smallvec![if depth { EMIT_COLOR_DEPTH } else { EMIT_COLOR }]
    }

    fn needs_sorted_rendering(&self) -> bool {
        true
    }
}
