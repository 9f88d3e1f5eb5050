//! Render Contexts
//!
//! A [`RenderContext`] pairs a native function table with the share group
//! whose namespace it allocates in. At most one context is current per
//! thread, and a context is bound to at most one thread.
//!
//! [`RenderContext::make_current`] returns a [`CurrentContext`] guard and
//! pushes an entry on the calling thread's context stack; the top entry is
//! the current context. Dropping a guard removes its own entry wherever it
//! sits, so guards released out of order never resurrect a context. A
//! context stays bound to its thread while any of that thread's guards
//! refer to it. Making a member context current also runs any tasks its
//! share group has queued.
//!
//! When the last member of a share group is destroyed, the group's pending
//! tasks run with a stand-in for the dying context current: same id, same
//! function table, same group.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use scenegl_core::{Result, SceneGlError};

use crate::gl::Gl;
use crate::share_group::{ContextKey, ShareGroup};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Per-thread stack of current contexts, one entry per live guard.
#[derive(Default)]
struct CurrentStack {
    entries: Vec<(u64, Arc<RenderContext>)>,
    next_entry: u64,
}

impl CurrentStack {
    fn push(&mut self, context: Arc<RenderContext>) -> u64 {
        let entry = self.next_entry;
        self.next_entry += 1;
        self.entries.push((entry, context));
        entry
    }

    fn top(&self) -> Option<&Arc<RenderContext>> {
        self.entries.last().map(|(_, context)| context)
    }

    /// Removes `entry`, returning its context and whether it was on top.
    fn remove(&mut self, entry: u64) -> Option<(Arc<RenderContext>, bool)> {
        let index = self.entries.iter().rposition(|(id, _)| *id == entry)?;
        let was_top = index + 1 == self.entries.len();
        let (_, context) = self.entries.remove(index);
        Some((context, was_top))
    }
}

impl Drop for CurrentStack {
    // Thread exit with guards leaked: unbind every context left behind.
    fn drop(&mut self) {
        for (_, context) in &self.entries {
            *context.owner.lock() = None;
        }
    }
}

thread_local! {
    static CURRENT: RefCell<CurrentStack> = RefCell::new(CurrentStack::default());
}

/// Binding of a context to the thread whose stack refers to it.
#[derive(Debug, Clone, Copy)]
struct Owner {
    thread: ThreadId,
    /// Stack entries of `thread` referring to the context.
    entries: usize,
}

pub struct RenderContext {
    id: u64,
    gl: Arc<dyn Gl>,
    share_group: Option<Arc<ShareGroup>>,
    member_key: Option<ContextKey>,
    owner: Mutex<Option<Owner>>,
}

impl RenderContext {
    /// Creates a context with a fresh share group of its own.
    #[must_use]
    pub fn new(gl: Arc<dyn Gl>) -> Arc<Self> {
        let group = ShareGroup::new();
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        // A fresh group is never closed.
        let member_key = group.join(id).ok();
        Arc::new(Self {
            id,
            gl,
            share_group: Some(group),
            member_key,
            owner: Mutex::new(None),
        })
    }

    /// Creates a context sharing `group`'s object namespace.
    pub fn new_shared(gl: Arc<dyn Gl>, group: &Arc<ShareGroup>) -> Result<Arc<Self>> {
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        let member_key = group.join(id)?;
        log::debug!("Render context {id} joined share group {}", group.id());
        Ok(Arc::new(Self {
            id,
            gl,
            share_group: Some(Arc::clone(group)),
            member_key: Some(member_key),
            owner: Mutex::new(None),
        }))
    }

    /// Creates a context outside any share group. Objects allocated while
    /// it is current carry no group and are deleted with whatever context
    /// is current when they are dropped.
    #[must_use]
    pub fn detached(gl: Arc<dyn Gl>) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            gl,
            share_group: None,
            member_key: None,
            owner: Mutex::new(None),
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn gl(&self) -> &dyn Gl {
        &*self.gl
    }

    #[inline]
    #[must_use]
    pub fn share_group(&self) -> Option<&Arc<ShareGroup>> {
        self.share_group.as_ref()
    }

    /// The context current on the calling thread.
    ///
    /// Returns `None` during thread teardown.
    #[must_use]
    pub fn current() -> Option<Arc<RenderContext>> {
        CURRENT
            .try_with(|stack| stack.borrow().top().cloned())
            .ok()
            .flatten()
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        CURRENT
            .try_with(|stack| {
                stack
                    .borrow()
                    .top()
                    .is_some_and(|current| std::ptr::eq(Arc::as_ptr(current), self))
            })
            .unwrap_or(false)
    }

    /// Makes this context current on the calling thread until the returned
    /// guard is dropped, then runs its share group's pending tasks.
    pub fn make_current(self: &Arc<Self>) -> Result<CurrentContext> {
        let this_thread = thread::current().id();
        {
            let mut owner = self.owner.lock();
            match owner.as_mut() {
                Some(bound) if bound.thread != this_thread => {
                    return Err(SceneGlError::ContextCurrentElsewhere);
                }
                Some(bound) => bound.entries += 1,
                None => {
                    *owner = Some(Owner {
                        thread: this_thread,
                        entries: 1,
                    });
                }
            }
        }

        let entry = CURRENT.with(|stack| stack.borrow_mut().push(Arc::clone(self)));
        log::trace!("Render context {} made current", self.id);

        self.run_pending_tasks();

        Ok(CurrentContext {
            context: Arc::clone(self),
            entry,
            _not_send: PhantomData,
        })
    }

    fn release_entry(&self) {
        let mut owner = self.owner.lock();
        let unbound = match owner.as_mut() {
            Some(bound) => {
                bound.entries = bound.entries.saturating_sub(1);
                bound.entries == 0
            }
            None => false,
        };
        if unbound {
            *owner = None;
        }
    }

    fn run_pending_tasks(&self) {
        if let Some(group) = &self.share_group
            && group.pending_tasks() > 0
        {
            group.drain(self.gl());
        }
    }

    /// Runs the closed `group`'s remaining tasks with a stand-in for this
    /// context current on the calling thread.
    fn drain_on_close(&self, group: &Arc<ShareGroup>) {
        if group.pending_tasks() == 0 {
            log::debug!("Share group {} closed", group.id());
            return;
        }

        let stand_in = Arc::new(RenderContext {
            id: self.id,
            gl: Arc::clone(&self.gl),
            share_group: Some(Arc::clone(group)),
            member_key: None,
            owner: Mutex::new(None),
        });
        let Ok(entry) = CURRENT.try_with(|stack| stack.borrow_mut().push(Arc::clone(&stand_in)))
        else {
            log::warn!(
                "Share group {} closed during thread teardown; {} pending task(s) dropped",
                group.id(),
                group.pending_tasks()
            );
            return;
        };

        let drained = group.drain(self.gl());
        let removed = CURRENT
            .try_with(|stack| stack.borrow_mut().remove(entry))
            .ok()
            .flatten();
        drop(removed);

        log::debug!(
            "Share group {} closed, {drained} pending task(s) executed",
            group.id()
        );
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        if let (Some(group), Some(key)) = (&self.share_group, self.member_key)
            && group.leave(key)
        {
            self.drain_on_close(group);
        }
        log::trace!("Render context {} destroyed", self.id);
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("id", &self.id)
            .field("share_group", &self.share_group.as_ref().map(|g| g.id()))
            .finish_non_exhaustive()
    }
}

/// Scope during which a context is current on this thread.
///
/// Not `Send`: currency is a property of the thread that created the guard.
#[must_use = "the context stops being current when the guard is dropped"]
pub struct CurrentContext {
    context: Arc<RenderContext>,
    /// This guard's entry on the thread's context stack.
    entry: u64,
    _not_send: PhantomData<*const ()>,
}

impl CurrentContext {
    #[inline]
    #[must_use]
    pub fn context(&self) -> &Arc<RenderContext> {
        &self.context
    }
}

impl std::ops::Deref for CurrentContext {
    type Target = RenderContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl Drop for CurrentContext {
    fn drop(&mut self) {
        // The stack is gone if the guard outlives thread-local teardown; its
        // destructor already unbound the contexts.
        let Ok(Some((removed, was_top, top))) = CURRENT.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            stack
                .remove(self.entry)
                .map(|(removed, was_top)| (removed, was_top, stack.top().cloned()))
        }) else {
            return;
        };
        removed.release_entry();

        if was_top
            && let Some(top) = top
            && !Arc::ptr_eq(&top, &removed)
        {
            top.run_pending_tasks();
        }
    }
}
