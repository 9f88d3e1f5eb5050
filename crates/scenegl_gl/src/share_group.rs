//! Share Groups
//!
//! A [`ShareGroup`] is the set of render contexts that share one namespace
//! of native object names. It owns a FIFO task queue: work that must run in
//! the group's namespace (typically deleting objects dropped on a thread
//! with no group context current) is queued here and executed the next time
//! a member context is current.
//!
//! # Ordering
//!
//! Tasks execute strictly in submission order. Submission is serialized by
//! the channel; execution is serialized by a re-entrant lock so a task may
//! itself submit further tasks.
//!
//! # Teardown
//!
//! When the last member context is destroyed the group closes, and the
//! remaining tasks run with that context still current on the destroying
//! thread. Submissions to a closed group fail with
//! [`SceneGlError::ShareGroupClosed`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, ReentrantMutex};
use slotmap::{SlotMap, new_key_type};

use scenegl_core::{Result, SceneGlError};

use crate::context::RenderContext;
use crate::gl::Gl;
use crate::task::ShareGroupTask;

new_key_type! {
    /// Membership slot of a context inside its share group.
    pub struct ContextKey;
}

static NEXT_SHARE_GROUP_ID: AtomicU64 = AtomicU64::new(1);

type BoxedTask = Box<dyn ShareGroupTask>;

/// Counters describing a share group's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShareGroupStats {
    pub submitted: u64,
    pub executed: u64,
    pub pending: usize,
}

pub struct ShareGroup {
    id: u64,
    /// Member context ids. Also guards the closed transition against
    /// concurrent submissions.
    members: Mutex<SlotMap<ContextKey, u64>>,
    sender: flume::Sender<BoxedTask>,
    receiver: flume::Receiver<BoxedTask>,
    execution: ReentrantMutex<()>,
    closed: AtomicBool,
    submitted: AtomicU64,
    executed: AtomicU64,
}

impl ShareGroup {
    #[must_use]
    pub fn new() -> Arc<Self> {
        let (sender, receiver) = flume::unbounded();
        Arc::new(Self {
            id: NEXT_SHARE_GROUP_ID.fetch_add(1, Ordering::Relaxed),
            members: Mutex::new(SlotMap::with_key()),
            sender,
            receiver,
            execution: ReentrantMutex::new(()),
            closed: AtomicBool::new(false),
            submitted: AtomicU64::new(0),
            executed: AtomicU64::new(0),
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.lock().len()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.receiver.len()
    }

    #[must_use]
    pub fn stats(&self) -> ShareGroupStats {
        ShareGroupStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            executed: self.executed.load(Ordering::Relaxed),
            pending: self.pending_tasks(),
        }
    }

    /// Whether `context` belongs to this group.
    #[must_use]
    pub fn contains(&self, context: &RenderContext) -> bool {
        context
            .share_group()
            .is_some_and(|group| std::ptr::eq(Arc::as_ptr(group), self))
    }

    /// Queues `task` for execution in this group's namespace.
    ///
    /// If a member context is current on the calling thread the queue is
    /// drained before returning, so the task has run by then. Otherwise it
    /// runs on the next `make_current` of a member context or an explicit
    /// [`flush`](Self::flush).
    pub fn execute_task(&self, task: BoxedTask) -> Result<()> {
        {
            let _members = self.members.lock();
            if self.is_closed() {
                return Err(SceneGlError::ShareGroupClosed);
            }
            self.sender
                .send(task)
                .map_err(|_| SceneGlError::ShareGroupClosed)?;
        }
        self.submitted.fetch_add(1, Ordering::Relaxed);

        if let Some(context) = RenderContext::current()
            && self.contains(&context)
        {
            self.drain(context.gl());
        }
        Ok(())
    }

    /// Runs every pending task with the current member context.
    ///
    /// Returns the number of tasks executed.
    pub fn flush(&self) -> Result<usize> {
        let context = RenderContext::current()
            .filter(|context| self.contains(context))
            .ok_or(SceneGlError::NoCurrentContext)?;
        Ok(self.drain(context.gl()))
    }

    pub(crate) fn join(&self, context_id: u64) -> Result<ContextKey> {
        let mut members = self.members.lock();
        if self.is_closed() {
            return Err(SceneGlError::ShareGroupClosed);
        }
        Ok(members.insert(context_id))
    }

    /// Removes a member. Returns `true` when it was the last one: the group
    /// is then closed and the caller drains the remaining tasks.
    pub(crate) fn leave(&self, key: ContextKey) -> bool {
        let mut members = self.members.lock();
        members.remove(key);
        let last = members.is_empty();
        if last {
            self.closed.store(true, Ordering::Release);
        }
        last
    }

    /// Executes queued tasks in FIFO order with `gl`.
    pub(crate) fn drain(&self, gl: &dyn Gl) -> usize {
        let _execution = self.execution.lock();
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            if panic::catch_unwind(AssertUnwindSafe(|| task.execute(gl))).is_err() {
                log::error!("Share group {} task panicked; continuing", self.id);
            }
            self.executed.fetch_add(1, Ordering::Relaxed);
            ran += 1;
        }
        if ran > 0 {
            log::trace!("Share group {} executed {ran} task(s)", self.id);
        }
        ran
    }
}

impl Drop for ShareGroup {
    fn drop(&mut self) {
        let pending = self.receiver.len();
        if pending > 0 {
            log::warn!(
                "Share group {} dropped with {pending} unexecuted task(s)",
                self.id
            );
        }
    }
}

impl std::fmt::Debug for ShareGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareGroup")
            .field("id", &self.id)
            .field("members", &self.member_count())
            .field("pending", &self.pending_tasks())
            .field("closed", &self.is_closed())
            .finish()
    }
}
