//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use halcyon_engine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine facade
pub use crate::engine::{Engine, EngineBuilder, EngineConfig, FrameHook};
pub use crate::platform::{PlatformError, WindowSurface};

// Context and swap
pub use crate::core::context::{
    ContextConfig, ContextServices, ContextState, DisplaySurface, EngineContext, FrameImage,
    SwapState, SwapToken,
};

// Events and input
pub use crate::core::events::EventManager;
pub use crate::core::id::UniqueId;
pub use crate::core::input::{
    Cursor, CursorPosition, InputAction, KeyCode, KeyEvent, Modifiers, MouseButton, PointerEvent,
};

// Tasks and resources
pub use crate::core::executor::TaskExecutor;
pub use crate::core::loader::{
    FileLoaderFactory, LoaderFactory, LoaderProgress, ResourceHandle, ResourceKind,
    ResourceLoader, ResourceRequest,
};

// Scenes
pub use crate::core::scene::{Scene, UiRoot};
