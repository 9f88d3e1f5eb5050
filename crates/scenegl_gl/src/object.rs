//! Reference-Counted GL Objects
//!
//! [`GlObject`] owns one native name. It is created while a context is
//! current and remembers that context's share group through a [`Weak`]
//! reference, so an object never keeps its group alive.
//!
//! # Release
//!
//! When the last `Arc<GlObject>` goes away the name is released exactly once:
//!
//! | Situation                                      | Action                          |
//! |------------------------------------------------|---------------------------------|
//! | name is `0`                                    | nothing                         |
//! | a context of the owning group is current       | delete inline                   |
//! | owning group alive, none of its contexts current | queue a [`CleanupTask`]       |
//! | no owning group, some context current          | delete inline with that context |
//! | owning group gone, or queue closed             | leak, log a warning             |
//!
//! Nothing on the release path propagates failure; leaking the native name
//! is preferred over failing inside `Drop`.

use std::sync::{Arc, Weak};

use scenegl_core::{GLuint, Result, SceneGlError};

use crate::context::RenderContext;
use crate::kind::{ObjectKind, ShaderStage, TextureTarget};
use crate::share_group::ShareGroup;
use crate::task::CleanupTask;

pub struct GlObject {
    kind: ObjectKind,
    name: GLuint,
    share_group: Option<Weak<ShareGroup>>,
}

impl GlObject {
    /// Allocates a native object of `kind` with the current context.
    pub fn create(kind: ObjectKind) -> Result<Arc<Self>> {
        let context = RenderContext::current().ok_or(SceneGlError::NoCurrentContext)?;
        let ops = kind.ops();
        let name = ops.allocate(context.gl(), kind);
        if name == 0 {
            return Err(SceneGlError::AllocationFailed { kind: ops.label() });
        }
        Ok(Arc::new(Self {
            kind,
            name,
            share_group: context.share_group().map(Arc::downgrade),
        }))
    }

    /// Takes ownership of an existing native name. It is bound to the share
    /// group of the current context, if any. A name of `0` is accepted and
    /// never deleted.
    #[must_use]
    pub fn adopt(kind: ObjectKind, name: GLuint) -> Arc<Self> {
        let share_group = RenderContext::current()
            .and_then(|context| context.share_group().map(Arc::downgrade));
        Arc::new(Self {
            kind,
            name,
            share_group,
        })
    }

    pub fn buffer() -> Result<Arc<Self>> {
        Self::create(ObjectKind::Buffer)
    }

    pub fn texture(target: TextureTarget) -> Result<Arc<Self>> {
        Self::create(ObjectKind::Texture(target))
    }

    pub fn vertex_array() -> Result<Arc<Self>> {
        Self::create(ObjectKind::VertexArray)
    }

    pub fn renderbuffer() -> Result<Arc<Self>> {
        Self::create(ObjectKind::Renderbuffer)
    }

    pub fn framebuffer() -> Result<Arc<Self>> {
        Self::create(ObjectKind::Framebuffer)
    }

    pub fn program() -> Result<Arc<Self>> {
        Self::create(ObjectKind::Program)
    }

    pub fn shader(stage: ShaderStage) -> Result<Arc<Self>> {
        Self::create(ObjectKind::Shader(stage))
    }

    pub fn query() -> Result<Arc<Self>> {
        Self::create(ObjectKind::Query)
    }

    pub fn sampler() -> Result<Arc<Self>> {
        Self::create(ObjectKind::Sampler)
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Native name; `0` only for adopted invalid names.
    #[inline]
    #[must_use]
    pub fn name(&self) -> GLuint {
        self.name
    }

    /// The owning share group, if it still exists.
    #[must_use]
    pub fn share_group(&self) -> Option<Arc<ShareGroup>> {
        self.share_group.as_ref().and_then(Weak::upgrade)
    }

    /// Whether the object was bound to a share group that no longer exists.
    #[must_use]
    pub fn is_orphaned(&self) -> bool {
        self.share_group
            .as_ref()
            .is_some_and(|group| group.strong_count() == 0)
    }

    fn release(&mut self) {
        let name = std::mem::take(&mut self.name);
        if name == 0 {
            return;
        }
        let family = self.kind.family();
        let ops = family.ops();
        let current = RenderContext::current();

        let Some(weak_group) = self.share_group.take() else {
            match current {
                Some(context) => ops.delete(context.gl(), &[name]),
                None => log::warn!(
                    "Leaking {} {name}: dropped with no render context current",
                    ops.label()
                ),
            }
            return;
        };

        let Some(group) = weak_group.upgrade() else {
            log::warn!(
                "Skipping deletion of {} {name}: its share group no longer exists",
                ops.label()
            );
            return;
        };

        if let Some(context) = current
            && group.contains(&context)
        {
            ops.delete(context.gl(), &[name]);
            return;
        }

        match group.execute_task(Box::new(CleanupTask::new(family, name))) {
            Ok(()) => log::debug!(
                "Queued deletion of {} {name} on share group {}",
                ops.label(),
                group.id()
            ),
            Err(err) => log::warn!("Leaking {} {name}: {err}", ops.label()),
        }
    }
}

impl Drop for GlObject {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for GlObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlObject")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
