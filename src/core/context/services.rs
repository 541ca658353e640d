//=========================================================================
// Context Services
//=========================================================================
//
// Cloneable bundle of the collaborators a scene and its objects reach
// through the engine context.
//
// Sharing across a scene swap:
// ```text
//              old context            new context
//  events     ─────────── same Arc ──────────────
//  executor   ─────────── same Arc ──────────────
//  audio      ─────────── same Arc ──────────────
//  loader       loader("title")       loader("level-1")   (always fresh)
//  delta        own counter           own counter
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use crate::core::events::EventManager;
use crate::core::executor::TaskExecutor;
use crate::core::loader::ResourceLoader;

//=== AudioHandle =========================================================

/// Opaque audio collaborator, passed through the context unmodified.
pub type AudioHandle = Arc<dyn Any + Send + Sync>;

//=== ContextServices =====================================================

/// Handles to one context's collaborators.
///
/// Scenes receive this in `setup`/`teardown` and may clone it into
/// listeners or tasks; every clone observes the same frame delta.
#[derive(Clone)]
pub struct ContextServices {
    events: Arc<EventManager>,
    executor: Arc<TaskExecutor>,
    loader: Arc<dyn ResourceLoader>,
    audio: Option<AudioHandle>,
    delta_bits: Arc<AtomicU64>,
}

impl ContextServices {
    pub(crate) fn new(
        events: Arc<EventManager>,
        executor: Arc<TaskExecutor>,
        loader: Arc<dyn ResourceLoader>,
        audio: Option<AudioHandle>,
    ) -> Self {
        Self {
            events,
            executor,
            loader,
            audio,
            delta_bits: Arc::new(AtomicU64::new(0f64.to_bits())),
        }
    }

    /// Same shared collaborators, fresh loader and delta.
    pub(crate) fn inherit(&self, loader: Arc<dyn ResourceLoader>) -> Self {
        Self::new(
            Arc::clone(&self.events),
            Arc::clone(&self.executor),
            loader,
            self.audio.clone(),
        )
    }

    //--- Accessors --------------------------------------------------------

    pub fn event_manager(&self) -> &Arc<EventManager> {
        &self.events
    }

    pub fn executor(&self) -> &Arc<TaskExecutor> {
        &self.executor
    }

    pub fn loader(&self) -> &Arc<dyn ResourceLoader> {
        &self.loader
    }

    pub fn audio(&self) -> Option<&AudioHandle> {
        self.audio.as_ref()
    }

    /// The audio handle downcast to its concrete type.
    pub fn audio_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.audio.clone()?.downcast::<T>().ok()
    }

    /// Seconds between the two most recent updates of the owning context.
    pub fn delta_time(&self) -> f64 {
        f64::from_bits(self.delta_bits.load(Ordering::Acquire))
    }

    pub(crate) fn set_delta_time(&self, seconds: f64) {
        self.delta_bits.store(seconds.to_bits(), Ordering::Release);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
