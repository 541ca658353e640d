//=========================================================================
// Halcyon Engine
//
// Main entry point: configuration and the run loop.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run(scene, hook)──>  [Runtime]
//         │                          │
//         ├─ with_task_budget()      └─ runs platform event loop
//         ├─ with_title()               hosts contexts in the window
//         ├─ with_size()                blocks until exit
//         ├─ with_loader_factory()
//         └─ with_audio()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::context::{AudioHandle, ContextConfig, EngineContext};
use crate::core::loader::{FileLoaderFactory, LoaderFactory};
use crate::core::scene::Scene;
use crate::platform::{Platform, PlatformError, WindowSurface};

//=== FrameHook ===========================================================

/// Per-frame callback, run on the event-loop thread after the active
/// context's `update()` and before its `poll_swap()`.
///
/// This is where rendering happens (hand the finished frame to
/// [`WindowSurface::present`]) and where swaps are requested or confirmed.
pub type FrameHook = Box<dyn FnMut(&mut EngineContext, &WindowSurface)>;

//=== EngineConfig ========================================================

/// Settings an [`Engine`] runs with.
#[derive(Clone)]
pub struct EngineConfig {
    pub title: String,
    pub size: (u32, u32),
    pub context: ContextConfig,
    pub loader_factory: Arc<dyn LoaderFactory>,
    pub audio: Option<AudioHandle>,
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("title", &self.title)
            .field("size", &self.size)
            .field("context", &self.context)
            .field("audio", &self.audio.is_some())
            .finish_non_exhaustive()
    }
}

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Task budget**: 10 ms of deferred work per frame
/// - **Title**: "Halcyon Engine"
/// - **Size**: 800x600 logical pixels
/// - **Loader factory**: [`FileLoaderFactory`] rooted at `assets/`
/// - **Audio**: none
///
/// # Examples
///
/// ```no_run
/// use halcyon_engine::prelude::*;
/// use std::time::Duration;
///
/// struct Title;
///
/// impl Scene for Title {
///     fn identifier(&self) -> &str {
///         "title"
///     }
/// }
///
/// EngineBuilder::new()
///     .with_title("Demo")
///     .with_task_budget(Duration::from_millis(4))
///     .build()
///     .run(Title)
///     .unwrap();
/// ```
pub struct EngineBuilder {
    title: String,
    size: (u32, u32),
    task_budget: Duration,
    loader_factory: Option<Arc<dyn LoaderFactory>>,
    audio: Option<AudioHandle>,
}

impl EngineBuilder {
    pub const DEFAULT_ASSET_ROOT: &'static str = "assets";

    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            title: "Halcyon Engine".to_string(),
            size: (800, 600),
            task_budget: ContextConfig::DEFAULT_TASK_BUDGET,
            loader_factory: None,
            audio: None,
        }
    }

    /// Sets the slice of each frame reserved for deferred tasks.
    ///
    /// Tasks beyond the budget wait for the next frame; a task that has
    /// started always finishes.
    ///
    /// Default: 10 ms
    ///
    /// # Panics
    ///
    /// Panics if `budget` is zero.
    pub fn with_task_budget(mut self, budget: Duration) -> Self {
        assert!(!budget.is_zero(), "Task budget must be positive");
        self.task_budget = budget;
        self
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial window size in logical pixels.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive, got {}x{}", width, height);
        self.size = (width, height);
        self
    }

    /// Sets the factory that builds each context's resource loader.
    pub fn with_loader_factory<F>(mut self, factory: F) -> Self
    where
        F: LoaderFactory + 'static,
    {
        self.loader_factory = Some(Arc::new(factory));
        self
    }

    /// Sets the audio collaborator handed to every context.
    pub fn with_audio<A>(mut self, audio: A) -> Self
    where
        A: Any + Send + Sync,
    {
        self.audio = Some(Arc::new(audio));
        self
    }

    /// Builds the engine instance.
    pub fn build(self) -> Engine {
        info!(
            "Building engine ('{}', {}x{}, task budget {:?})",
            self.title, self.size.0, self.size.1, self.task_budget
        );

        let loader_factory = self
            .loader_factory
            .unwrap_or_else(|| Arc::new(FileLoaderFactory::new(Self::DEFAULT_ASSET_ROOT)));

        Engine {
            config: EngineConfig {
                title: self.title,
                size: self.size,
                context: ContextConfig {
                    task_budget: self.task_budget,
                },
                loader_factory,
                audio: self.audio,
            },
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Halcyon Engine runtime.
///
/// Create via [`EngineBuilder`] with `EngineBuilder::new().build()`.
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   └─► Platform (winit event loop)
///         ├─► Window, WindowPointer, WindowSurface
///         ├─► EventManager (shared by every context)
///         └─► EngineContext (active scene)
///               └─► pending swap → next EngineContext
/// ```
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn into_config(self) -> EngineConfig {
        self.config
    }

    //--- Execution --------------------------------------------------------

    /// Runs `scene` with no per-frame hook. See [`Engine::run_with`].
    pub fn run<S>(self, scene: S) -> Result<(), PlatformError>
    where
        S: Scene + 'static,
    {
        self.run_with(scene, |_: &mut EngineContext, _: &WindowSurface| {})
    }

    /// Opens the window, activates `scene` and drives it until the window
    /// closes, calling `on_frame` once per frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop or window cannot be
    /// created.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread on platforms where winit
    /// requires it (macOS/iOS).
    pub fn run_with<S, F>(self, scene: S, on_frame: F) -> Result<(), PlatformError>
    where
        S: Scene + 'static,
        F: FnMut(&mut EngineContext, &WindowSurface) + 'static,
    {
        info!("Starting engine runtime with scene '{}'", scene.identifier());

        let platform = Platform::new(self.config, Box::new(scene), Box::new(on_frame));
        let result = platform.run();

        match &result {
            Ok(()) => info!("Engine shutdown complete"),
            Err(e) => error!("Platform error: {}", e),
        }

        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
