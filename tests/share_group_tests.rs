//! Share Group Task Queue Tests
//!
//! Tests for:
//! - FIFO execution across successive and concurrent submitting threads
//! - Concurrent releases racing a flushing owner thread
//! - Inline execution when a member context is current
//! - flush() context requirements
//! - Re-entrant submission from inside a task
//! - Panicking tasks do not stall the queue
//! - Statistics and membership
//! - Teardown: remaining tasks run with the dying member current

use std::sync::{Arc, Barrier};
use std::thread;

use parking_lot::Mutex;

use scenegl::SceneGlError;
use scenegl::gl::{
    CleanupTask, Gl, GlObject, HeadlessGl, ObjectFamily, RenderContext, ShareGroup,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Journal = Arc<Mutex<Vec<u32>>>;

fn failing_task(_gl: &dyn Gl) {
    panic!("task failure");
}

fn record(group: &ShareGroup, journal: &Journal, value: u32) -> scenegl::Result<()> {
    let journal = Arc::clone(journal);
    group.execute_task(Box::new(move |_gl: &dyn Gl| journal.lock().push(value)))
}

#[test]
fn tasks_from_successive_threads_run_in_submission_order() -> anyhow::Result<()> {
    init_logging();
    let gl = Arc::new(HeadlessGl::new());
    let context = RenderContext::new(gl);
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    for batch in 0..4u32 {
        let group = Arc::clone(&group);
        let journal = Arc::clone(&journal);
        thread::spawn(move || {
            for i in 0..5 {
                record(&group, &journal, batch * 5 + i).unwrap();
            }
        })
        .join()
        .unwrap();
    }
    assert!(journal.lock().is_empty(), "nothing runs without a context");
    assert_eq!(group.pending_tasks(), 20);

    let _current = context.make_current()?;
    assert_eq!(*journal.lock(), (0..20).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn concurrent_submitters_keep_their_own_order() -> anyhow::Result<()> {
    const THREADS: u32 = 4;
    const PER_THREAD: u32 = 100;

    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();
    let barrier = Barrier::new(THREADS as usize);

    thread::scope(|scope| {
        for thread_index in 0..THREADS {
            let (group, journal, barrier) = (&group, &journal, &barrier);
            scope.spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    record(group, journal, thread_index * PER_THREAD + i).unwrap();
                }
            });
        }
    });
    assert_eq!(group.pending_tasks(), (THREADS * PER_THREAD) as usize);

    let _current = context.make_current()?;
    let journal = journal.lock();
    assert_eq!(journal.len(), (THREADS * PER_THREAD) as usize);
    for thread_index in 0..THREADS {
        let range = thread_index * PER_THREAD..(thread_index + 1) * PER_THREAD;
        let seen: Vec<u32> = journal
            .iter()
            .copied()
            .filter(|value| range.contains(value))
            .collect();
        assert_eq!(seen, range.collect::<Vec<_>>());
    }
    Ok(())
}

#[test]
fn concurrent_releases_race_a_flushing_owner() -> anyhow::Result<()> {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 64;

    init_logging();
    let gl = Arc::new(HeadlessGl::new());
    let context = RenderContext::new(gl.clone());
    let group = Arc::clone(context.share_group().unwrap());
    let _current = context.make_current()?;

    let mut batches = Vec::with_capacity(THREADS);
    for _ in 0..THREADS {
        let batch = (0..PER_THREAD)
            .map(|_| GlObject::buffer())
            .collect::<scenegl::Result<Vec<_>>>()?;
        batches.push(batch);
    }
    let names: Vec<_> = batches.iter().flatten().map(|object| object.name()).collect();
    let barrier = Barrier::new(THREADS + 1);

    thread::scope(|scope| -> anyhow::Result<()> {
        let workers: Vec<_> = batches
            .into_iter()
            .map(|batch| {
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    for object in batch {
                        drop(object);
                    }
                })
            })
            .collect();

        barrier.wait();
        while !workers.iter().all(|worker| worker.is_finished()) {
            group.flush()?;
            thread::yield_now();
        }
        for worker in workers {
            worker.join().expect("release thread panicked");
        }
        Ok(())
    })?;
    group.flush()?;

    for name in names {
        assert_eq!(gl.deletion_count(name), 1, "name {name}");
    }
    assert_eq!(gl.invalid_deletions(), 0);
    assert_eq!(gl.live_count(), 0);
    assert_eq!(group.pending_tasks(), 0);
    Ok(())
}

#[test]
fn tasks_run_inline_when_a_member_is_current() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    let _current = context.make_current()?;
    record(&group, &journal, 7)?;
    assert_eq!(*journal.lock(), vec![7]);
    assert_eq!(group.pending_tasks(), 0);
    Ok(())
}

#[test]
fn queued_tasks_run_before_a_new_inline_task() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    record(&group, &journal, 1)?;
    record(&group, &journal, 2)?;

    let current = context.make_current()?;
    record(&group, &journal, 3)?;
    drop(current);

    assert_eq!(*journal.lock(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn flush_requires_a_member_context() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let stranger = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());

    assert!(matches!(group.flush(), Err(SceneGlError::NoCurrentContext)));

    let _current = stranger.make_current()?;
    assert!(matches!(group.flush(), Err(SceneGlError::NoCurrentContext)));
    Ok(())
}

#[test]
fn flush_returns_the_number_of_tasks_run() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    let _current = context.make_current()?;
    assert_eq!(group.flush()?, 0);

    // Submissions from another thread wait for the owning thread.
    let remote = Arc::clone(&group);
    let remote_journal = Arc::clone(&journal);
    thread::spawn(move || {
        record(&remote, &remote_journal, 1).unwrap();
        record(&remote, &remote_journal, 2).unwrap();
    })
    .join()
    .unwrap();

    assert_eq!(group.flush()?, 2);
    assert_eq!(*journal.lock(), vec![1, 2]);
    Ok(())
}

#[test]
fn tasks_may_submit_further_tasks() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    let outer_group = Arc::clone(&group);
    let outer_journal = Arc::clone(&journal);
    group.execute_task(Box::new(move |_gl: &dyn Gl| {
        outer_journal.lock().push(1);
        record(&outer_group, &outer_journal, 2).unwrap();
    }))?;

    let _current = context.make_current()?;
    assert_eq!(*journal.lock(), vec![1, 2]);
    assert_eq!(group.pending_tasks(), 0);
    Ok(())
}

#[test]
fn a_panicking_task_does_not_stall_the_queue() -> anyhow::Result<()> {
    init_logging();
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    group.execute_task(Box::new(failing_task))?;
    record(&group, &journal, 42)?;

    let _current = context.make_current()?;
    assert_eq!(*journal.lock(), vec![42]);
    assert_eq!(group.stats().executed, 2);
    Ok(())
}

#[test]
fn cleanup_tasks_delete_batched_names() -> anyhow::Result<()> {
    let gl = Arc::new(HeadlessGl::new());
    let context = RenderContext::new(gl.clone());
    let group = Arc::clone(context.share_group().unwrap());

    let mut names = [0; 3];
    gl.gen_buffers(&mut names);
    group.execute_task(Box::new(CleanupTask::with_names(ObjectFamily::Buffer, &names)))?;
    assert_eq!(gl.live_count(), 3);

    let _current = context.make_current()?;
    assert_eq!(gl.live_count(), 0);
    for name in names {
        assert_eq!(gl.deletion_count(name), 1);
    }
    Ok(())
}

#[test]
fn stats_track_submitted_and_executed_tasks() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    for i in 0..3 {
        record(&group, &journal, i)?;
    }
    let stats = group.stats();
    assert_eq!((stats.submitted, stats.executed, stats.pending), (3, 0, 3));

    let _current = context.make_current()?;
    let stats = group.stats();
    assert_eq!((stats.submitted, stats.executed, stats.pending), (3, 3, 0));
    Ok(())
}

#[test]
fn membership_follows_context_lifetime() -> anyhow::Result<()> {
    let gl = Arc::new(HeadlessGl::new());
    let group = ShareGroup::new();
    let first = RenderContext::new_shared(gl.clone(), &group)?;
    let second = RenderContext::new_shared(gl, &group)?;

    assert_eq!(group.member_count(), 2);
    assert!(group.contains(&first));
    assert!(group.contains(&second));

    drop(first);
    assert_eq!(group.member_count(), 1);
    assert!(!group.is_closed());

    drop(second);
    assert_eq!(group.member_count(), 0);
    assert!(group.is_closed());

    let journal = Journal::default();
    assert!(matches!(
        record(&group, &journal, 1),
        Err(SceneGlError::ShareGroupClosed)
    ));
    Ok(())
}

#[test]
fn closing_a_group_runs_pending_tasks_with_the_last_member() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let journal = Journal::default();

    record(&group, &journal, 1)?;
    record(&group, &journal, 2)?;
    drop(context);

    assert!(group.is_closed());
    assert_eq!(*journal.lock(), vec![1, 2]);
    Ok(())
}

#[test]
fn teardown_tasks_run_with_a_member_context_current() -> anyhow::Result<()> {
    let context = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(context.share_group().unwrap());
    let context_id = context.id();
    let observed = Arc::new(Mutex::new(None));

    let task_group = Arc::clone(&group);
    let seen = Arc::clone(&observed);
    group.execute_task(Box::new(move |_gl: &dyn Gl| {
        let current = RenderContext::current();
        let member = current
            .as_ref()
            .is_some_and(|context| task_group.contains(context));
        *seen.lock() = Some((member, current.map(|context| context.id())));
    }))?;

    drop(context);
    assert_eq!(*observed.lock(), Some((true, Some(context_id))));
    assert!(RenderContext::current().is_none());
    Ok(())
}

#[test]
fn teardown_restores_the_previously_current_context() -> anyhow::Result<()> {
    let dying = RenderContext::new(Arc::new(HeadlessGl::new()));
    let other = RenderContext::new(Arc::new(HeadlessGl::new()));
    let group = Arc::clone(dying.share_group().unwrap());
    let journal = Journal::default();

    let _other = other.make_current()?;
    record(&group, &journal, 1)?;
    assert_eq!(group.pending_tasks(), 1);

    drop(dying);
    assert_eq!(*journal.lock(), vec![1]);
    assert!(other.is_current());
    Ok(())
}
