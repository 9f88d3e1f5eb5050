//! Share Group Tasks
//!
//! Work submitted to a [`ShareGroup`](crate::ShareGroup) runs later, on
//! whichever thread next has one of the group's contexts current. A task
//! receives that context's function table and runs exactly once.

use smallvec::SmallVec;

use scenegl_core::GLuint;

use crate::gl::Gl;
use crate::kind::ObjectFamily;

/// A deferred unit of work executed with a share group context current.
///
/// Tasks must not fail outward: the queue catches panics and logs them.
pub trait ShareGroupTask: Send {
    fn execute(self: Box<Self>, gl: &dyn Gl);
}

impl<F> ShareGroupTask for F
where
    F: FnOnce(&dyn Gl) + Send,
{
    fn execute(self: Box<Self>, gl: &dyn Gl) {
        (*self)(gl);
    }
}

/// Deletes native names captured when their owning object was dropped
/// without a share group context current.
#[derive(Debug, Clone)]
pub struct CleanupTask {
    family: ObjectFamily,
    names: SmallVec<[GLuint; 4]>,
}

impl CleanupTask {
    #[must_use]
    pub fn new(family: ObjectFamily, name: GLuint) -> Self {
        Self {
            family,
            names: SmallVec::from_slice(&[name]),
        }
    }

    #[must_use]
    pub fn with_names(family: ObjectFamily, names: &[GLuint]) -> Self {
        Self {
            family,
            names: SmallVec::from_slice(names),
        }
    }

    #[inline]
    #[must_use]
    pub fn family(&self) -> ObjectFamily {
        self.family
    }

    #[inline]
    #[must_use]
    pub fn names(&self) -> &[GLuint] {
        &self.names
    }
}

impl ShareGroupTask for CleanupTask {
    fn execute(self: Box<Self>, gl: &dyn Gl) {
        let ops = self.family.ops();
        log::trace!("Deleting {} {:?}", ops.label(), self.names.as_slice());
        ops.delete(gl, &self.names);
    }
}
