//! Core engine implementation
//!
//! The [`GameEngine`] owns the [`World`] and the scene stack and runs frames,
//! either on a background thread ([`GameEngine::start`]) or one at a time on
//! the caller's thread ([`GameEngine::step`]). A frame is:
//!
//! 1. measure `delta_time` from the clock,
//! 2. apply queued scene operations in FIFO order,
//! 3. `on_update` the scene on top of the stack,
//! 4. [`World::update`].
//!
//! The world sits behind a frame lock held for exactly one frame. The scene
//! stack and its operation queue sit behind a second lock that is never held
//! while a scene callback runs, so scenes and systems can queue scene
//! operations at any time through an [`EngineHandle`].

use crate::config::ConfigError;
use crate::core::GameContext;
use crate::ecs::World;
use crate::foundation::time::{Clock, FrameTimer, MonotonicClock};
use crate::scene::{Scene, SceneResources, SceneScope};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

/// Sleep between two frames of the background loop unless configured
pub const DEFAULT_FRAME_YIELD: Duration = Duration::from_millis(1);

/// Identifier assigned to a scene when it is queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(u64);

impl SceneId {
    /// Raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene {}", self.0)
    }
}

enum SceneOp {
    Push(SceneId, Box<dyn Scene>),
    Pop,
    Replace(SceneId, Box<dyn Scene>),
    Clear,
}

struct SceneEntry {
    scene: Box<dyn Scene>,
    resources: SceneResources,
}

struct StackEntry {
    id: SceneId,
    name: String,
    entry: Arc<Mutex<SceneEntry>>,
}

#[derive(Default)]
struct SceneState {
    stack: Vec<StackEntry>,
    pending: VecDeque<SceneOp>,
}

/// Scene stack plus pending operations, shared by the engine and its handles
#[derive(Default)]
struct SceneQueue {
    state: Mutex<SceneState>,
    next_id: AtomicU64,
}

impl SceneQueue {
    fn next_id(&self) -> SceneId {
        SceneId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn enqueue(&self, op: SceneOp) {
        self.state.lock().pending.push_back(op);
    }

    fn drain_pending(&self) -> Vec<SceneOp> {
        self.state.lock().pending.drain(..).collect()
    }

    fn top(&self) -> Option<Arc<Mutex<SceneEntry>>> {
        self.state.lock().stack.last().map(|top| Arc::clone(&top.entry))
    }

    fn pop(&self) -> Option<StackEntry> {
        self.state.lock().stack.pop()
    }

    /// Apply the operations queued so far; ones queued by the callbacks
    /// themselves wait for the next flush.
    fn flush(&self, world: &mut World, context: &GameContext) {
        for op in self.drain_pending() {
            match op {
                SceneOp::Push(id, scene) => self.enter(id, scene, world, context),
                SceneOp::Pop => {
                    if let Some(top) = self.pop() {
                        Self::exit(top, world, context);
                    }
                }
                SceneOp::Replace(id, scene) => {
                    if let Some(top) = self.pop() {
                        Self::exit(top, world, context);
                    }
                    self.enter(id, scene, world, context);
                }
                SceneOp::Clear => self.exit_all(world, context),
            }
        }
    }

    fn enter(&self, id: SceneId, scene: Box<dyn Scene>, world: &mut World, context: &GameContext) {
        let name = scene.name().to_owned();
        log::debug!("entering {id} ({name})");

        let entry = Arc::new(Mutex::new(SceneEntry { scene, resources: SceneResources::default() }));
        self.state.lock().stack.push(StackEntry { id, name, entry: Arc::clone(&entry) });

        let mut entry = entry.lock();
        let SceneEntry { scene, resources } = &mut *entry;
        scene.on_enter(&mut SceneScope::new(world, context, resources));
    }

    fn exit(top: StackEntry, world: &mut World, context: &GameContext) {
        log::debug!("exiting {} ({})", top.id, top.name);
        let mut entry = top.entry.lock();
        let SceneEntry { scene, resources } = &mut *entry;
        scene.on_exit(&mut SceneScope::new(world, context, resources));
        resources.dispose(world);
    }

    fn exit_all(&self, world: &mut World, context: &GameContext) {
        while let Some(top) = self.pop() {
            Self::exit(top, world, context);
        }
    }
}

/// Cloneable scene-stack control, usable from any thread and from inside
/// systems and scenes
///
/// Every operation is queued and applied at the start of the next frame.
#[derive(Clone)]
pub struct EngineHandle {
    scenes: Arc<SceneQueue>,
}

impl EngineHandle {
    /// Handle over a scene queue no engine drives
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        Self { scenes: Arc::default() }
    }

    /// Queue `scene` to be pushed on top of the stack
    pub fn push_scene(&self, scene: impl Scene) -> SceneId {
        let id = self.scenes.next_id();
        self.scenes.enqueue(SceneOp::Push(id, Box::new(scene)));
        id
    }

    /// Queue removal of the top scene
    pub fn pop_scene(&self) {
        self.scenes.enqueue(SceneOp::Pop);
    }

    /// Queue replacing the top scene (or pushing onto an empty stack)
    pub fn replace_scene(&self, scene: impl Scene) -> SceneId {
        let id = self.scenes.next_id();
        self.scenes.enqueue(SceneOp::Replace(id, Box::new(scene)));
        id
    }

    /// Queue removal of every scene
    pub fn clear_scenes(&self) {
        self.scenes.enqueue(SceneOp::Clear);
    }

    /// Scene currently on top of the stack
    pub fn current_scene(&self) -> Option<SceneId> {
        self.scenes.state.lock().stack.last().map(|top| top.id)
    }

    /// Name of the scene currently on top of the stack
    pub fn current_scene_name(&self) -> Option<String> {
        self.scenes.state.lock().stack.last().map(|top| top.name.clone())
    }

    /// Number of scenes on the stack
    pub fn scene_depth(&self) -> usize {
        self.scenes.state.lock().stack.len()
    }

    /// Number of operations waiting for the next frame
    pub fn pending_operations(&self) -> usize {
        self.scenes.state.lock().pending.len()
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.scenes.state.lock();
        f.debug_struct("EngineHandle")
            .field("scenes", &state.stack.iter().map(|top| top.id).collect::<Vec<_>>())
            .field("pending", &state.pending.len())
            .finish()
    }
}

struct FrameState {
    world: World,
    timer: FrameTimer,
    context: Option<GameContext>,
}

struct EngineShared {
    frame: Mutex<FrameState>,
    scenes: Arc<SceneQueue>,
    running: AtomicBool,
}

impl EngineShared {
    fn run_frame(&self) -> bool {
        let mut frame = self.frame.lock();
        if !self.running.load(Ordering::Acquire) {
            return false;
        }

        let FrameState { world, timer, context } = &mut *frame;
        let delta_time = timer.tick();

        if let Some(context) = context.as_ref() {
            self.scenes.flush(world, context);
            if let Some(top) = self.scenes.top() {
                let mut entry = top.lock();
                let SceneEntry { scene, resources } = &mut *entry;
                scene.on_update(delta_time, &mut SceneScope::new(world, context, resources));
            }
        }

        world.update(delta_time);
        true
    }
}

/// Coordinates the frame loop, the scene stack and the ECS world
pub struct GameEngine {
    shared: Arc<EngineShared>,
    frame_yield: Duration,
    loop_thread: Option<JoinHandle<()>>,
    stopped: bool,
}

impl GameEngine {
    /// Engine over `world` timed by the system monotonic clock
    pub fn new(world: World) -> Self {
        Self::with_clock(world, Box::new(MonotonicClock::new()))
    }

    /// Engine over `world` timed by a custom clock
    pub fn with_clock(world: World, clock: Box<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                frame: Mutex::new(FrameState {
                    world,
                    timer: FrameTimer::new(clock),
                    context: None,
                }),
                scenes: Arc::default(),
                running: AtomicBool::new(true),
            }),
            frame_yield: DEFAULT_FRAME_YIELD,
            loop_thread: None,
            stopped: false,
        }
    }

    /// Change the cooperative sleep of the background loop; takes effect on
    /// the next [`start`](Self::start)
    pub fn set_frame_yield(&mut self, frame_yield: Duration) {
        self.frame_yield = frame_yield;
    }

    /// Cloneable scene-stack control
    pub fn handle(&self) -> EngineHandle {
        EngineHandle { scenes: Arc::clone(&self.shared.scenes) }
    }

    /// Bind the services scenes receive and apply scene operations queued so far
    pub fn attach_context(&self, context: GameContext) {
        let mut frame = self.shared.frame.lock();
        let FrameState { world, context: slot, .. } = &mut *frame;
        let context = slot.insert(context);
        if self.shared.running.load(Ordering::Acquire) {
            self.shared.scenes.flush(world, context);
        }
    }

    /// Whether a context is attached
    pub fn has_context(&self) -> bool {
        self.shared.frame.lock().context.is_some()
    }

    /// Run frames on a background thread until [`stop`](Self::stop)
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.stopped {
            return Err(EngineError::Stopped);
        }
        if self.loop_thread.is_some() {
            return Err(EngineError::AlreadyStarted);
        }

        // Time spent idle before the loop starts is not a frame.
        self.shared.frame.lock().timer.reset();

        let shared = Arc::clone(&self.shared);
        let frame_yield = self.frame_yield;
        let thread = thread::Builder::new()
            .name("kollider-frame-loop".to_string())
            .spawn(move || {
                while shared.running.load(Ordering::Acquire) {
                    if !shared.run_frame() {
                        break;
                    }
                    thread::sleep(frame_yield);
                }
            })?;

        self.loop_thread = Some(thread);
        log::info!("engine started (frame yield {frame_yield:?})");
        Ok(())
    }

    /// Run exactly one frame on the calling thread
    ///
    /// Returns `false` once the engine has been stopped.
    pub fn step(&self) -> bool {
        self.shared.run_frame()
    }

    /// Pause the world; the loop and scene updates keep running
    pub fn pause(&self) {
        self.shared.frame.lock().world.pause();
    }

    /// Resume the world
    pub fn resume(&self) {
        self.shared.frame.lock().world.resume();
    }

    /// Whether the world is paused
    pub fn is_paused(&self) -> bool {
        self.shared.frame.lock().world.is_paused()
    }

    /// Forward a surface resize to every system
    pub fn resize(&self, width: u32, height: u32) {
        self.shared.frame.lock().world.resize(width, height);
    }

    /// Synchronous world access between frames
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.shared.frame.lock().world)
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.shared.frame.lock().timer.frame_count()
    }

    /// Whether frames still run; `false` after [`stop`](Self::stop)
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Stop the loop, exit every scene and dispose the world
    ///
    /// Pending scene operations are dropped; scenes on the stack exit top
    /// first without going through the queue. Terminal: the engine cannot be
    /// started again. Dropping the engine runs this as well.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.shared.running.store(false, Ordering::Release);
        if !self.join_loop() {
            log::error!("frame loop thread panicked; skipping scene and world teardown");
            return;
        }

        let mut frame = self.shared.frame.lock();
        let FrameState { world, timer, context } = &mut *frame;
        self.shared.scenes.state.lock().pending.clear();
        if let Some(context) = context.as_ref() {
            self.shared.scenes.exit_all(world, context);
        }
        world.dispose();
        log::info!("engine stopped after {} frames", timer.frame_count());
    }

    /// Join the loop thread; `false` if it panicked
    fn join_loop(&mut self) -> bool {
        self.loop_thread.take().map_or(true, |thread| thread.join().is_ok())
    }

    /// Queue `scene` to be pushed on top of the stack
    pub fn push_scene(&self, scene: impl Scene) -> SceneId {
        self.handle().push_scene(scene)
    }

    /// Queue removal of the top scene
    pub fn pop_scene(&self) {
        self.handle().pop_scene();
    }

    /// Queue replacing the top scene
    pub fn replace_scene(&self, scene: impl Scene) -> SceneId {
        self.handle().replace_scene(scene)
    }

    /// Queue removal of every scene
    pub fn clear_scenes(&self) {
        self.handle().clear_scenes();
    }

    /// Scene currently on top of the stack
    pub fn current_scene(&self) -> Option<SceneId> {
        self.handle().current_scene()
    }

    /// Number of scenes on the stack
    pub fn scene_depth(&self) -> usize {
        self.handle().scene_depth()
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        if thread::panicking() {
            // The world may be mid-update; only stop the loop.
            self.shared.running.store(false, Ordering::Release);
            self.join_loop();
        } else {
            self.stop();
        }
    }
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameEngine")
            .field("running", &self.is_running())
            .field("threaded", &self.loop_thread.is_some())
            .field("frame_yield", &self.frame_yield)
            .finish_non_exhaustive()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The background loop is already running
    #[error("Engine loop already started")]
    AlreadyStarted,

    /// The engine was stopped and cannot run again
    #[error("Engine has been stopped")]
    Stopped,

    /// The loop thread could not be created
    #[error("Failed to spawn frame loop thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
