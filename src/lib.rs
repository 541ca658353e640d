//=========================================================================
// Halcyon Engine: Library Root
//
// Engine-context lifecycle for interactive scenes: per-frame update loop,
// thread-safe input dispatch, frame-budgeted deferred tasks, and scene
// swaps that load the incoming scene in the background.
//
// Responsibilities:
// - Expose the engine facade (`EngineBuilder` → `Engine::run`)
// - Expose the core substrate (`core`) scenes and their objects use
// - Keep the winit integration (`platform`) internal
//
// Typical usage:
// ```no_run
// use halcyon_engine::prelude::*;
//
// struct Title;
//
// impl Scene for Title {
//     fn identifier(&self) -> &str {
//         "title"
//     }
// }
//
// fn main() -> Result<(), PlatformError> {
//     EngineBuilder::new().build().run(Title)
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the platform-independent systems: ids, input, events,
// executor, loader contract, scene contract and the engine context.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the winit window and event loop integration.
// `engine` defines the entry point and configuration.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder, EngineConfig, FrameHook};
pub use platform::{PlatformError, WindowSurface};
