//=========================================================================
// Engine Context
//=========================================================================
//
// Owns the active scene and drives its per-frame tick; implements the
// scene swap protocol.
//
// Lifecycle:
// ```text
//  new() ─► Constructed ─initialize()─► Initializing ─► Active ─poll_swap()─► Retiring
//                                        (scene.setup)           (swap surfaced)
// ```
//
// Per-frame `update()` (owner thread only):
//   1. frame delta
//   2. event dispatch, hit-testing against the scene's UI root
//   3. deferred tasks, within the task budget
//   4. surface resize check (new last-frame buffer on change)
//   5. last-frame capture
//
// Scene swap:
// ```text
//  request_swap(scene)                      poll_swap() each frame
//    ├─ next = context sharing events,        ├─ no pending swap → None
//    │  executor, audio and surface,          ├─ loader incomplete → None
//    │  with a fresh loader(scene id)         ├─ token.mark_ready() + notify
//    ├─ next starts loading its manifest      ├─ token not Confirmed → None
//    └─ older pending swap → Superseded       └─ self → Retiring, Some(next)
// ```
//
// Contexts are single-threaded objects: only `SwapToken` and the shared
// services are meant to cross threads.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, trace};
use parking_lot::RwLock;

//=== Internal Dependencies ===============================================

use super::clock::FrameClock;
use super::services::{AudioHandle, ContextServices};
use super::surface::{DisplaySurface, FrameImage, SharedFrame};
use super::swap::{SwapSignal, SwapState, SwapToken};
use crate::core::events::{DispatchSummary, EventManager};
use crate::core::executor::TaskExecutor;
use crate::core::loader::{LoaderFactory, ResourceHandle, ResourceLoader};
use crate::core::scene::Scene;

//=== ContextState ========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// Built; the scene's resources may be loading. `setup` has not run.
    Constructed,

    /// Inside `Scene::setup`.
    Initializing,

    /// Set up and ticking.
    Active,

    /// Its successor has been handed out by `poll_swap`.
    Retiring,
}

//=== ContextConfig =======================================================

/// Tunables carried by a context and inherited by the contexts it swaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextConfig {
    /// Slice of each frame reserved for deferred tasks.
    pub task_budget: Duration,
}

impl ContextConfig {
    pub const DEFAULT_TASK_BUDGET: Duration = Duration::from_millis(10);
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            task_budget: Self::DEFAULT_TASK_BUDGET,
        }
    }
}

//=== UpdateSummary =======================================================

/// What one [`EngineContext::update`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateSummary {
    pub delta: Duration,
    pub dispatch: DispatchSummary,
    pub tasks_run: usize,
    pub resized: bool,
}

//=== EngineContext =======================================================

struct PendingSwap {
    token: Arc<SwapToken>,
    next: Box<EngineContext>,
}

/// The running engine state for one scene.
pub struct EngineContext {
    state: ContextState,
    config: ContextConfig,
    scene: Box<dyn Scene>,
    services: ContextServices,
    surface: Arc<dyn DisplaySurface>,
    loader_factory: Arc<dyn LoaderFactory>,
    manifest: Vec<ResourceHandle>,

    clock: FrameClock,
    frame_size: (u32, u32),
    last_frame: SharedFrame,

    swap_signal: Arc<SwapSignal>,
    pending_swap: Option<PendingSwap>,
}

impl EngineContext {
    //--- Construction -----------------------------------------------------

    /// Creates the first context of a window.
    ///
    /// `events` and `audio` belong to the window and are handed down to
    /// every context swapped in after this one; a fresh executor is created
    /// here and shared the same way. The scene's loader comes from
    /// `loader_factory`, and its resource manifest starts loading now.
    pub fn new(
        surface: Arc<dyn DisplaySurface>,
        scene: Box<dyn Scene>,
        events: Arc<EventManager>,
        loader_factory: Arc<dyn LoaderFactory>,
        audio: Option<AudioHandle>,
        config: ContextConfig,
    ) -> Self {
        let loader = loader_factory.create(scene.identifier());
        let services = ContextServices::new(events, Arc::new(TaskExecutor::new()), loader, audio);
        Self::assemble(surface, scene, services, loader_factory, config)
    }

    fn assemble(
        surface: Arc<dyn DisplaySurface>,
        scene: Box<dyn Scene>,
        services: ContextServices,
        loader_factory: Arc<dyn LoaderFactory>,
        config: ContextConfig,
    ) -> Self {
        let manifest: Vec<ResourceHandle> = scene
            .resources()
            .into_iter()
            .map(|request| services.loader().load(request))
            .collect();

        let (width, height) = surface.framebuffer_size();

        debug!(
            target: "context",
            "Context for '{}' constructed ({} resources requested, {}x{})",
            scene.identifier(),
            manifest.len(),
            width,
            height
        );

        Self {
            state: ContextState::Constructed,
            config,
            scene,
            services,
            surface,
            loader_factory,
            manifest,
            clock: FrameClock::new(),
            frame_size: (width, height),
            last_frame: Arc::new(RwLock::new(FrameImage::new(width, height))),
            swap_signal: Arc::new(SwapSignal::default()),
            pending_swap: None,
        }
    }

    /// Runs the scene's `setup` if it has not run yet. Returns whether it
    /// ran.
    pub fn initialize(&mut self) -> bool {
        if self.state != ContextState::Constructed {
            debug!(
                target: "context",
                "initialize: '{}' already {:?}",
                self.scene.identifier(),
                self.state
            );
            return false;
        }

        self.state = ContextState::Initializing;
        self.scene.setup(&self.services);
        self.state = ContextState::Active;
        self.clock.reset();

        info!(target: "context", "Scene '{}' active", self.scene.identifier());
        true
    }

    //--- Frame Tick -------------------------------------------------------

    /// Advances one frame. Owner thread only.
    pub fn update(&mut self) -> UpdateSummary {
        let delta = self.clock.tick();
        self.services.set_delta_time(delta.as_secs_f64());

        let dispatch = self
            .services
            .event_manager()
            .process_waiting_events(self.scene.ui_root());

        let tasks_run = self.services.executor().run(self.config.task_budget);

        let size = self.surface.framebuffer_size();
        let resized = size != self.frame_size;
        if resized {
            debug!(
                target: "context",
                "Surface resized {:?} -> {:?}, reallocating last frame",
                self.frame_size,
                size
            );
            self.frame_size = size;
            self.last_frame = Arc::new(RwLock::new(FrameImage::new(size.0, size.1)));
        }

        self.surface.read_back(&mut self.last_frame.write());

        trace!(
            target: "context",
            "Frame {} ({:?}): {} events, {} tasks",
            self.clock.frame_index(),
            delta,
            dispatch.total(),
            tasks_run
        );

        UpdateSummary {
            delta,
            dispatch,
            tasks_run,
            resized,
        }
    }

    //--- Scene Swap -------------------------------------------------------

    /// Starts building a context for `scene` in the background.
    ///
    /// Replaces any swap still pending on this context: the older token
    /// becomes `Superseded` and its prospective context is dropped.
    pub fn request_swap(&mut self, scene: Box<dyn Scene>) -> Arc<SwapToken> {
        let loader = self.loader_factory.create(scene.identifier());
        let services = self.services.inherit(Arc::clone(&loader));
        let next = Self::assemble(
            Arc::clone(&self.surface),
            scene,
            services,
            Arc::clone(&self.loader_factory),
            self.config,
        );

        let token = Arc::new(SwapToken::new(
            next.scene.identifier().to_string(),
            loader,
            Arc::clone(&self.swap_signal),
        ));

        info!(
            target: "swap",
            "Swap requested: '{}' -> '{}'",
            self.scene.identifier(),
            token.scene_identifier()
        );

        let previous = self.pending_swap.replace(PendingSwap {
            token: Arc::clone(&token),
            next: Box::new(next),
        });
        if let Some(previous) = previous {
            info!(
                target: "swap",
                "Swap to '{}' superseded",
                previous.token.scene_identifier()
            );
            previous.token.supersede();
        }

        token
    }

    /// Hands out the prospective context once its resources are loaded and
    /// its token is confirmed; `None` otherwise. Owner thread, once per
    /// frame.
    ///
    /// On success `self` is `Retiring`: the caller should drop it and call
    /// [`EngineContext::initialize`] on the returned context.
    pub fn poll_swap(&mut self) -> Option<EngineContext> {
        let pending = self.pending_swap.as_ref()?;

        let progress = pending.token.progress();
        if !progress.is_complete() {
            trace!(
                target: "swap",
                "'{}' loading: {}/{} bytes",
                pending.token.scene_identifier(),
                progress.bytes_read,
                progress.bytes_total
            );
            return None;
        }

        pending.token.mark_ready();
        if pending.token.state() != SwapState::Confirmed {
            return None;
        }

        let PendingSwap { token, next } = self.pending_swap.take()?;
        self.state = ContextState::Retiring;

        info!(
            target: "swap",
            "Handing off '{}' -> '{}'",
            self.scene.identifier(),
            token.scene_identifier()
        );
        Some(*next)
    }

    /// Token of the swap currently pending on this context.
    pub fn pending_swap(&self) -> Option<&Arc<SwapToken>> {
        self.pending_swap.as_ref().map(|pending| &pending.token)
    }

    //--- Accessors --------------------------------------------------------

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Seconds between the two most recent `update` calls.
    pub fn delta_time(&self) -> f64 {
        self.services.delta_time()
    }

    pub fn event_manager(&self) -> &Arc<EventManager> {
        self.services.event_manager()
    }

    pub fn executor(&self) -> &Arc<TaskExecutor> {
        self.services.executor()
    }

    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        self.services.loader()
    }

    pub fn services(&self) -> &ContextServices {
        &self.services
    }

    pub fn surface(&self) -> &Arc<dyn DisplaySurface> {
        &self.surface
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    /// Handles for the scene's resource manifest, in manifest order.
    pub fn resources(&self) -> &[ResourceHandle] {
        &self.manifest
    }

    /// Capture of the most recently presented frame.
    ///
    /// A resize replaces the buffer; handles taken earlier keep the old
    /// image.
    pub fn last_frame(&self) -> SharedFrame {
        Arc::clone(&self.last_frame)
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_swap.take() {
            pending.token.supersede();
        }

        // Scenes whose setup never ran have nothing to tear down.
        if self.state != ContextState::Constructed {
            self.scene.teardown(&self.services);
        }

        debug!(target: "context", "Context for '{}' dropped", self.scene.identifier());
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::surface::tests::FakeSurface;
    use crate::core::input::cursor::tests::FakePointer;
    use crate::core::input::{InputAction, KeyCode, Modifiers, MouseButton, PointerEvent};
    use crate::core::loader::tests::{ManualLoader, ManualLoaderFactory};
    use crate::core::loader::{ResourceKind, ResourceRequest};
    use crate::core::scene::UiRoot;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    //--- Test Helpers -----------------------------------------------------

    #[derive(Default)]
    struct Hooks {
        setups: AtomicUsize,
        teardowns: AtomicUsize,
    }

    struct Screen {
        clicks: Mutex<Vec<PointerEvent>>,
    }

    impl UiRoot for Screen {
        fn position(&self) -> (f64, f64) {
            (0.0, 0.0)
        }

        fn dimensions(&self) -> (f64, f64) {
            (100.0, 100.0)
        }

        fn handle_click(&self, event: &PointerEvent) {
            self.clicks.lock().push(*event);
        }
    }

    struct TestScene {
        id: &'static str,
        manifest: Vec<ResourceRequest>,
        hooks: Arc<Hooks>,
        ui: Option<Screen>,
    }

    impl TestScene {
        fn boxed(id: &'static str) -> (Box<dyn Scene>, Arc<Hooks>) {
            let hooks = Arc::new(Hooks::default());
            let scene = Self {
                id,
                manifest: Vec::new(),
                hooks: Arc::clone(&hooks),
                ui: None,
            };
            (Box::new(scene), hooks)
        }
    }

    impl Scene for TestScene {
        fn identifier(&self) -> &str {
            self.id
        }

        fn resources(&self) -> Vec<ResourceRequest> {
            self.manifest.clone()
        }

        fn setup(&mut self, _services: &ContextServices) {
            self.hooks.setups.fetch_add(1, Ordering::SeqCst);
        }

        fn teardown(&mut self, _services: &ContextServices) {
            self.hooks.teardowns.fetch_add(1, Ordering::SeqCst);
        }

        fn ui_root(&self) -> Option<&dyn UiRoot> {
            self.ui.as_ref().map(|ui| ui as &dyn UiRoot)
        }
    }

    struct Fixture {
        surface: Arc<FakeSurface>,
        pointer: Arc<FakePointer>,
        loaders: Arc<ManualLoaderFactory>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                surface: FakeSurface::new(4, 3),
                pointer: FakePointer::at(10.0, 10.0),
                loaders: Arc::new(ManualLoaderFactory::default()),
            }
        }

        fn context(&self, scene: Box<dyn Scene>) -> EngineContext {
            EngineContext::new(
                self.surface.clone(),
                scene,
                Arc::new(EventManager::new(self.pointer.clone())),
                self.loaders.clone(),
                Some(Arc::new("audio")),
                ContextConfig::default(),
            )
        }

        fn loader(&self, namespace: &str) -> Arc<ManualLoader> {
            self.loaders.loader(namespace).unwrap()
        }
    }

    //--- Initialization ---------------------------------------------------

    #[test]
    fn initialize_runs_setup_exactly_once() {
        let fixture = Fixture::new();
        let (scene, hooks) = TestScene::boxed("title");
        let mut context = fixture.context(scene);
        assert_eq!(context.state(), ContextState::Constructed);

        assert!(context.initialize());
        assert!(!context.initialize());

        assert_eq!(context.state(), ContextState::Active);
        assert_eq!(hooks.setups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_task_budget_is_ten_millis() {
        assert_eq!(ContextConfig::default().task_budget, Duration::from_millis(10));
    }

    #[test]
    fn manifest_is_submitted_to_a_scene_scoped_loader() {
        let fixture = Fixture::new();
        let scene = TestScene {
            id: "level-1",
            manifest: vec![
                ResourceRequest::new(ResourceKind::Model, "ship.obj"),
                ResourceRequest::new(ResourceKind::Audio, "engine.ogg"),
            ],
            hooks: Arc::default(),
            ui: None,
        };

        let context = fixture.context(Box::new(scene));

        assert_eq!(context.loader().namespace(), "level-1");
        assert_eq!(fixture.loader("level-1").requests.lock().len(), 2);
        assert_eq!(context.resources().len(), 2);
    }

    //--- Frame Tick -------------------------------------------------------

    #[test]
    fn update_records_delta_time() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        context.initialize();

        thread::sleep(Duration::from_millis(5));
        let summary = context.update();

        assert!(summary.delta >= Duration::from_millis(5));
        assert!(context.delta_time() >= 0.005);
        assert_eq!(context.services().delta_time(), context.delta_time());
    }

    #[test]
    fn update_dispatches_events_then_runs_tasks() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        context.initialize();

        let order = Arc::new(Mutex::new(Vec::new()));
        {
            let order = Arc::clone(&order);
            context
                .event_manager()
                .register_key_listener(KeyCode::Space, move |_| order.lock().push("event"));
        }
        {
            let order = Arc::clone(&order);
            context.executor().submit(move || order.lock().push("task"));
        }
        context
            .event_manager()
            .enqueue_key_event(KeyCode::Space, None, InputAction::Press, Modifiers::NONE);

        let summary = context.update();

        assert_eq!(summary.dispatch.key_events, 1);
        assert_eq!(summary.tasks_run, 1);
        assert_eq!(*order.lock(), vec!["event", "task"]);
    }

    #[test]
    fn update_hit_tests_against_scene_ui_root() {
        let fixture = Fixture::new();
        let scene = TestScene {
            id: "menu",
            manifest: Vec::new(),
            hooks: Arc::default(),
            ui: Some(Screen {
                clicks: Mutex::new(Vec::new()),
            }),
        };
        let mut context = fixture.context(Box::new(scene));
        context.initialize();

        context
            .event_manager()
            .enqueue_pointer_event(MouseButton::Left, InputAction::Press, Modifiers::NONE);
        let summary = context.update();

        assert_eq!(summary.dispatch.ui_clicks, 1);
    }

    #[test]
    fn update_captures_last_frame_and_follows_resizes() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        context.initialize();
        *fixture.surface.fill.lock() = [9, 8, 7, 255];

        let summary = context.update();
        let before = context.last_frame();
        assert!(!summary.resized);
        assert_eq!(before.read().pixel(3, 2), Some([9, 8, 7, 255]));

        fixture.surface.resize(8, 6);
        let summary = context.update();
        let after = context.last_frame();

        assert!(summary.resized);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.read().dimensions(), (8, 6));
        assert_eq!(after.read().pixel(7, 5), Some([9, 8, 7, 255]));
        assert_eq!(before.read().dimensions(), (4, 3));
        assert_eq!(context.frame_size(), (8, 6));
    }

    //--- Scene Swap -------------------------------------------------------

    #[test]
    fn poll_swap_without_request_is_none() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        assert!(context.poll_swap().is_none());
        assert!(context.pending_swap().is_none());
    }

    #[test]
    fn swap_requires_loaded_resources_and_confirmation() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        context.initialize();

        let token = context.request_swap(TestScene::boxed("level-1").0);
        let loader = fixture.loader("level-1");
        loader.set_progress(10, 100);

        // Still loading.
        assert!(context.poll_swap().is_none());
        assert_eq!(token.state(), SwapState::Pending);
        assert!(!token.confirm());

        // Loaded, not confirmed.
        loader.set_progress(100, 100);
        assert!(context.poll_swap().is_none());
        assert_eq!(token.state(), SwapState::ResourcesReady);

        // Both.
        assert!(token.confirm());
        let next = context.poll_swap().expect("swap should complete");

        assert_eq!(next.scene().identifier(), "level-1");
        assert_eq!(next.state(), ContextState::Constructed);
        assert_eq!(context.state(), ContextState::Retiring);
        assert!(context.pending_swap().is_none());
    }

    #[test]
    fn confirmed_swap_waits_while_loader_grows_again() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);

        let token = context.request_swap(TestScene::boxed("level-1").0);
        let loader = fixture.loader("level-1");
        loader.set_progress(50, 50);
        assert!(context.poll_swap().is_none());
        assert!(token.confirm());

        loader.set_progress(50, 200);
        assert!(context.poll_swap().is_none());

        loader.set_progress(200, 200);
        assert!(context.poll_swap().is_some());
    }

    #[test]
    fn second_request_supersedes_the_first() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);

        let first = context.request_swap(TestScene::boxed("a").0);
        let second = context.request_swap(TestScene::boxed("b").0);

        assert_eq!(first.state(), SwapState::Superseded);
        assert_eq!(context.pending_swap().unwrap().scene_identifier(), "b");

        fixture.loader("a").set_progress(1, 1);
        fixture.loader("b").set_progress(1, 1);
        assert!(context.poll_swap().is_none());

        assert!(!first.confirm());
        assert!(second.confirm());

        let next = context.poll_swap().unwrap();
        assert_eq!(next.scene().identifier(), "b");
    }

    #[test]
    fn swapped_context_shares_window_collaborators_with_fresh_loader() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);

        let token = context.request_swap(TestScene::boxed("level-1").0);
        context.poll_swap();
        token.confirm();
        let next = context.poll_swap().unwrap();

        assert!(Arc::ptr_eq(context.event_manager(), next.event_manager()));
        assert!(Arc::ptr_eq(context.executor(), next.executor()));
        assert!(Arc::ptr_eq(context.surface(), next.surface()));
        assert_eq!(next.services().audio_as::<&'static str>().as_deref(), Some(&"audio"));
        assert!(!Arc::ptr_eq(context.loader(), next.loader()));
        assert_eq!(next.loader().namespace(), "level-1");
        assert_eq!(next.config(), context.config());
    }

    #[test]
    fn waiter_thread_confirms_after_ready_signal() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        let token = context.request_swap(TestScene::boxed("level-1").0);

        let consumer = {
            let token = Arc::clone(&token);
            thread::spawn(move || {
                let state = token.wait_ready();
                (state, token.confirm())
            })
        };

        fixture.loader("level-1").set_progress(64, 64);
        let first = context.poll_swap();

        let (state, confirmed) = consumer.join().unwrap();
        assert_eq!(state, SwapState::ResourcesReady);
        assert!(confirmed);
        // The consumer may confirm between the ready signal and the check.
        assert!(first.is_some() || context.poll_swap().is_some());
    }

    //--- Teardown ---------------------------------------------------------

    #[test]
    fn dropping_initialized_context_tears_scene_down() {
        let fixture = Fixture::new();
        let (scene, hooks) = TestScene::boxed("title");
        let mut context = fixture.context(scene);
        context.initialize();

        drop(context);

        assert_eq!(hooks.teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn superseded_context_is_dropped_without_teardown() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        let (scene, hooks) = TestScene::boxed("a");

        context.request_swap(scene);
        context.request_swap(TestScene::boxed("b").0);

        assert_eq!(hooks.setups.load(Ordering::SeqCst), 0);
        assert_eq!(hooks.teardowns.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropping_owner_supersedes_pending_token() {
        let fixture = Fixture::new();
        let mut context = fixture.context(TestScene::boxed("title").0);
        let token = context.request_swap(TestScene::boxed("a").0);

        drop(context);

        assert_eq!(token.state(), SwapState::Superseded);
    }
}
