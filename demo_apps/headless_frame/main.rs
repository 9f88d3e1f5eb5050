//! Headless Frame
//!
//! Walks through one frame without a window:
//! - two contexts sharing one object namespace
//! - a vertex array released from a worker thread and cleaned up later
//! - a sorted-blended transparent pass with its fragment snippets
//!
//! Run with `RUST_LOG=debug` to see the queue at work.

use std::sync::Arc;
use std::thread;

use scenegl::glam::UVec2;
use scenegl::prelude::*;
use scenegl::gl::TextureTarget;
use scenegl::render::SnippetSource;

struct HeadlessRenderer {
    id: RendererId,
    context: Arc<RenderContext>,
}

impl Renderer for HeadlessRenderer {
    fn id(&self) -> RendererId {
        self.id
    }

    fn context(&self) -> &Arc<RenderContext> {
        &self.context
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let gl = Arc::new(HeadlessGl::new());
    let group = ShareGroup::new();
    let main_context = RenderContext::new_shared(gl.clone(), &group)?;
    let upload_context = RenderContext::new_shared(gl.clone(), &group)?;
    log::info!(
        "Share group {} with {} contexts",
        group.id(),
        group.member_count()
    );

    // Resources created on the upload context are visible to the main one.
    let (vao, texture) = {
        let _upload = upload_context.make_current()?;
        (
            GlObject::vertex_array()?,
            GlObject::texture(TextureTarget::Texture2D)?,
        )
    };
    log::info!("Allocated {vao:?} and {texture:?}");

    // A worker thread drops the last reference with no context current.
    thread::spawn(move || drop(vao))
        .join()
        .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
    log::info!("Pending cleanup tasks: {}", group.pending_tasks());

    let renderer = HeadlessRenderer {
        id: RendererId(1),
        context: Arc::clone(&main_context),
    };
    let _current = main_context.make_current()?;
    log::info!(
        "After make_current: pending {}, live objects {}",
        group.pending_tasks(),
        gl.live_count()
    );

    let settings = TransparencySettings {
        snippets: SnippetSource::from_env(),
        ..TransparencySettings::default()
    };
    let mut transparency = TransparencyManager::new(&settings)?;
    transparency.initialize_parameter_container(&renderer, UVec2::new(1920, 1080));

    let mut fragment_code = Vec::new();
    transparency.add_fragment_code_snippets(true, true, &mut fragment_code)?;
    log::info!(
        "Mode {}: {} fragment snippet(s), sorted rendering {}",
        transparency.mode(),
        fragment_code.len(),
        transparency.needs_sorted_rendering()
    );

    let passes = transparency.run_transparent_passes(&renderer, |iteration| {
        log::info!(
            "Drawing transparent geometry (iteration {iteration}), state {:?}",
            gl.state_flags()
        );
    })?;
    log::info!("Transparent passes: {passes}, state after: {:?}", gl.state_flags());

    drop(texture);
    let stats = group.stats();
    log::info!(
        "Queue stats: submitted {}, executed {}, pending {}; deletions {}",
        stats.submitted,
        stats.executed,
        stats.pending,
        gl.deletions().len()
    );
    Ok(())
}
