//=========================================================================
// Core Systems
//
// Platform-independent engine substrate: everything an engine context
// aggregates, and the context itself.
//
// Dependency order (leaves first):
//   id → input (cursor) → events → executor → loader → scene → context
//
// Notes:
// Nothing in here knows about winit. The platform layer implements the
// `PointerDevice` and `DisplaySurface` traits and drives
// `EngineContext::update()` / `poll_swap()` once per frame from the
// event-loop thread, which is the owner thread of every context.
//
//=========================================================================

pub mod context;
pub mod events;
pub mod executor;
pub mod id;
pub mod input;
pub mod loader;
pub mod scene;
