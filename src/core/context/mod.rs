//=========================================================================
// Engine Context
//=========================================================================
//
// Per-scene engine state and the scene swap handoff.
//
// Components:
// - `engine_context`: lifecycle, per-frame tick, swap protocol
// - `swap`: two-phase handoff token
// - `services`: collaborator handles shared with scenes
// - `surface`: display surface contract and last-frame image
// - `clock`: frame delta measurement
//
//=========================================================================

//=== Module Declarations =================================================

mod clock;
mod engine_context;
mod services;
pub(crate) mod surface;
mod swap;

//=== Public API ==========================================================

pub use engine_context::{ContextConfig, ContextState, EngineContext, UpdateSummary};
pub use services::{AudioHandle, ContextServices};
pub use surface::{DisplaySurface, FrameImage, SharedFrame};
pub use swap::{SwapState, SwapToken};
