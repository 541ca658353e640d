//=========================================================================
// Scene Contract
//=========================================================================
//
// The narrow interface an engine context needs from a scene.
//
// The scene graph, its transforms and the UI widget tree are external
// collaborators: the context only calls the lifecycle hooks below and
// asks for the UI root when hit-testing pointer events.
//
// Lifecycle (driven by `EngineContext`):
//   resources() → [background loading] → setup() → ... → teardown()
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== Internal Dependencies ===============================================

use crate::core::context::ContextServices;
use crate::core::input::PointerEvent;
use crate::core::loader::ResourceRequest;

//=== UiRoot ==============================================================

/// Root of a scene's UI tree, as seen by pointer hit-testing.
pub trait UiRoot {
    /// Top-left corner in window pixels.
    fn position(&self) -> (f64, f64);

    /// Width and height in window pixels.
    fn dimensions(&self) -> (f64, f64);

    /// Receives a click that landed inside the root's bounds.
    ///
    /// `event.local_position` is relative to [`UiRoot::position`].
    fn handle_click(&self, event: &PointerEvent);
}

//=== Scene ===============================================================

/// A deployable set of assets owned by one engine context.
///
/// Only `identifier()` is required.
///
/// ```rust
/// # use halcyon_engine::prelude::*;
/// struct Title;
///
/// impl Scene for Title {
///     fn identifier(&self) -> &str {
///         "title"
///     }
/// }
/// ```
pub trait Scene: Send {
    /// Stable name used to namespace this scene's resource loader.
    fn identifier(&self) -> &str;

    /// Resources to start streaming as soon as the owning context exists.
    ///
    /// For an incoming scene this runs while the previous scene is still
    /// active, which is what lets a swap load in the background.
    fn resources(&self) -> Vec<ResourceRequest> {
        Vec::new()
    }

    /// Builds the scene's objects. Called exactly once per context.
    fn setup(&mut self, _services: &ContextServices) {}

    /// Called when the owning context is destroyed, before the scene is
    /// dropped. Listeners registered on the shared event manager should be
    /// removed here.
    fn teardown(&mut self, _services: &ContextServices) {}

    /// Root of the scene graph, opaque to the engine core.
    fn root_object(&self) -> Option<&dyn Any> {
        None
    }

    /// Root of the UI tree, if the scene has one.
    fn ui_root(&self) -> Option<&dyn UiRoot> {
        None
    }
}
