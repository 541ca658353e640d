//=========================================================================
// Event System
//=========================================================================
//
// Input ingestion queue and listener dispatch.
//
// Components:
// - `event_manager`: queue, dispatch pass, UI hit-testing
// - `registry`: key/pointer listener bookkeeping
//
//=========================================================================

//=== Module Declarations =================================================

mod event_manager;
mod registry;

//=== Public API ==========================================================

pub use event_manager::{DispatchSummary, EventManager};
pub use registry::{KeyCallback, PointerCallback};
