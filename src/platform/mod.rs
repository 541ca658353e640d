//=========================================================================
// Platform Subsystem
//
// Hosts engine contexts in a winit window and drives them from the event
// loop.
//
// Architecture:
// ```text
//  Main Thread (winit event loop = context owner thread)
//  ┌─────────────────────────────────────────────────────────────┐
//  │  KeyboardInput / MouseInput                                  │
//  │   ↓ InputProcessor (key mapping, sticky modifiers)           │
//  │  EventManager::enqueue ───────────────► queue                │
//  │                                                              │
//  │  CursorMoved / CursorLeft / MouseMotion ─► WindowPointer     │
//  │  Resized ─────────────────────────────────► WindowSurface    │
//  │                                                              │
//  │  RedrawRequested (frame boundary)                            │
//  │   ├─ context.update()     dispatch, tasks, last frame        │
//  │   ├─ frame hook           render, present, request swaps     │
//  │   └─ context.poll_swap()  Some(next) → drop old, initialize  │
//  └─────────────────────────────────────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **Window-scoped collaborators**: the event manager, pointer and surface
//   are created once with the window and shared by every context it hosts
// - **Lazy window creation**: the window and first context are built in
//   `resumed()` (required on mobile, harmless elsewhere)
// - **Main thread requirement**: winit mandates the main thread on
//   macOS/iOS, so this runs on the thread that called `Engine::run()`
//
//=========================================================================

//=== Submodules ==========================================================

mod input_processor;
mod pointer;
mod surface;

//=== External Crates =====================================================

use std::sync::Arc;

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::context::EngineContext;
use crate::core::events::EventManager;
use crate::core::input::MouseButton;
use crate::core::scene::Scene;
use crate::engine::{EngineConfig, FrameHook};
use input_processor::InputProcessor;
use pointer::WindowPointer;

pub use surface::WindowSurface;

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal: without an event loop or a window the engine cannot
/// run.
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to create event loop (rare, indicates OS-level issue).
    EventLoopCreation(winit::error::EventLoopError),

    /// Event loop execution error (rare, indicates corruption).
    EventLoopExecution(winit::error::EventLoopError),

    /// The OS refused to create the window.
    WindowCreation(winit::error::OsError),
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventLoopCreation(e) => write!(f, "Event loop creation failed: {}", e),
            Self::EventLoopExecution(e) => write!(f, "Event loop error: {}", e),
            Self::WindowCreation(e) => write!(f, "Window creation failed: {}", e),
        }
    }
}

impl std::error::Error for PlatformError {}

//=== Frame Driving =======================================================

/// Runs one frame on the context in `slot`: update, frame hook, swap poll.
///
/// When a swap completes, the retiring context is dropped (tearing its
/// scene down) before the incoming one is initialized. Returns whether a
/// swap happened.
pub(crate) fn advance_frame(
    slot: &mut Option<EngineContext>,
    surface: &WindowSurface,
    on_frame: &mut FrameHook,
) -> bool {
    let Some(context) = slot.as_mut() else {
        return false;
    };

    context.update();
    on_frame(context, surface);

    let Some(next) = context.poll_swap() else {
        return false;
    };

    drop(slot.take());
    let next = slot.insert(next);
    next.initialize();
    true
}

//=== Platform ============================================================

/// Window owner and context driver.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(config, scene, hook)`
/// 2. **Execution**: `platform.run()` starts the event loop (blocks)
/// 3. **resumed()**: window, shared collaborators and first context
/// 4. **RedrawRequested**: one [`advance_frame`] per frame
/// 5. **Shutdown**: close requested → context dropped → loop exits
///
/// # Thread Safety
///
/// This type is NOT Send/Sync - it must remain on the main thread, which
/// is the owner thread of every context it hosts.
pub(crate) struct Platform {
    config: EngineConfig,

    /// Scene for the first context (taken in `resumed()`).
    initial_scene: Option<Box<dyn Scene>>,

    /// User render hook, run after each `update()`.
    on_frame: FrameHook,

    /// OS window handle (None until `resumed()` called).
    window: Option<Arc<Window>>,

    /// Pointer device behind the shared cursor.
    pointer: Option<Arc<WindowPointer>>,

    /// Shared by every context hosted in the window.
    surface: Arc<WindowSurface>,

    /// The active context.
    context: Option<EngineContext>,

    /// Converts winit events to engine InputEvents.
    input_processor: InputProcessor,

    /// Fatal error raised inside a callback, reported by `run()`.
    error: Option<PlatformError>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Does not create the window yet - that happens lazily in `resumed()`.
    pub fn new(config: EngineConfig, scene: Box<dyn Scene>, on_frame: FrameHook) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        let (width, height) = config.size;
        Self {
            config,
            initial_scene: Some(scene),
            on_frame,
            window: None,
            pointer: None,
            surface: Arc::new(WindowSurface::new(width, height)),
            context: None,
            input_processor: InputProcessor::new(),
            error: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// fails, or if the window cannot be created.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS winit requirement).
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)?;

        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    /// Builds the window-scoped collaborators and the first context.
    fn install_first_context(&mut self, window: &Arc<Window>) {
        let Some(scene) = self.initial_scene.take() else {
            error!(target: "platform", "No initial scene to install");
            return;
        };

        let size = window.inner_size();
        self.surface.set_size(size.width, size.height);

        let pointer = Arc::new(WindowPointer::new(Arc::clone(window)));
        let events = Arc::new(EventManager::new(pointer.clone()));

        let mut context = EngineContext::new(
            self.surface.clone(),
            scene,
            events,
            Arc::clone(&self.config.loader_factory),
            self.config.audio.clone(),
            self.config.context,
        );
        context.initialize();

        self.pointer = Some(pointer);
        self.context = Some(context);
    }

    fn enqueue(&self, event: crate::core::input::InputEvent) {
        if let Some(context) = &self.context {
            context.event_manager().enqueue(event);
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Arc<Window>> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Called when app becomes active (startup or mobile resume).
    ///
    /// Creates the window and first context if they don't exist yet.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let (width, height) = self.config.size;
        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(width, height));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                let window = Arc::new(window);
                self.install_first_context(&window);
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.error = Some(PlatformError::WindowCreation(e));
                event_loop.exit();
            }
        }
    }

    /// Handles per-window events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.context = None;
                event_loop.exit();
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(pointer) = &self.pointer {
                    pointer.moved(position.x, position.y);
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(pointer) = &self.pointer {
                    pointer.left();
                }
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                match self.input_processor.process_key_event(&key_event) {
                    Some(event) => self.enqueue(event),
                    None => trace!(target: "platform::input", "Unmapped key ignored"),
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(pointer) = &self.pointer {
                    pointer.set_button(MouseButton::from(button), state == ElementState::Pressed);
                }
                let event = self.input_processor.process_mouse_button(button, state);
                self.enqueue(event);
            }

            WindowEvent::Resized(size) => {
                self.surface.set_size(size.width, size.height);
            }

            WindowEvent::RedrawRequested => {
                if advance_frame(&mut self.context, &self.surface, &mut self.on_frame) {
                    info!(target: "platform", "Scene swap completed");
                }

                // Request next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    /// Raw pointer motion feeds the virtual position while captured.
    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            if let Some(pointer) = &self.pointer {
                pointer.motion(dx, dy);
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
