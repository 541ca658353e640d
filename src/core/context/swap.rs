//=========================================================================
// Scene Swap Token
//=========================================================================
//
// Two-phase handoff between an active context and the one replacing it.
//
// State machine:
// ```text
//            poll_swap() sees            confirm()
//            bytes_read == total         (any thread)
//  Pending ───────────────────► ResourcesReady ─────────► Confirmed
//     │                               │
//     └──── request_swap() again ─────┴──────────────────► Superseded
//           or owner dropped
// ```
//
// Resource readiness and consumer acceptance are separate signals: the
// loader being byte-complete says nothing about GPU uploads or other work
// the consumer still has to finish, so the consumer confirms explicitly.
//
// Every state change happens under the owning context's signal mutex and
// is followed by `notify_all`, so a thread in `wait_ready` cannot miss it.
// The signal is shared by all tokens a context issues; waiters re-check
// their own token's state on every wake.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use parking_lot::{Condvar, Mutex};

//=== Internal Dependencies ===============================================

use crate::core::loader::{LoaderProgress, ResourceLoader};

//=== SwapState ===========================================================

/// Where a [`SwapToken`] is in the handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapState {
    /// The incoming scene's resources are still loading.
    Pending,

    /// The loader reported completion; waiting for the consumer.
    ResourcesReady,

    /// The consumer accepted the handoff.
    Confirmed,

    /// Replaced by a newer request, or its owner went away. Terminal.
    Superseded,
}

impl SwapState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::ResourcesReady,
            2 => Self::Confirmed,
            _ => Self::Superseded,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::ResourcesReady => 1,
            Self::Confirmed => 2,
            Self::Superseded => 3,
        }
    }
}

//=== SwapSignal ==========================================================

/// Mutex/condvar pair owned by a context and shared with its tokens.
#[derive(Default)]
pub(crate) struct SwapSignal {
    lock: Mutex<()>,
    changed: Condvar,
}

//=== SwapToken ===========================================================

/// Handle to one scene swap request.
///
/// Returned by `EngineContext::request_swap`. The owner thread advances it
/// to `ResourcesReady` from `poll_swap`; any thread may block on
/// [`SwapToken::wait_ready`] and then call [`SwapToken::confirm`].
pub struct SwapToken {
    scene_identifier: String,
    loader: Arc<dyn ResourceLoader>,
    state: AtomicU8,
    signal: Arc<SwapSignal>,
}

impl SwapToken {
    pub(crate) fn new(
        scene_identifier: String,
        loader: Arc<dyn ResourceLoader>,
        signal: Arc<SwapSignal>,
    ) -> Self {
        Self {
            scene_identifier,
            loader,
            state: AtomicU8::new(SwapState::Pending.as_u8()),
            signal,
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> SwapState {
        SwapState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Byte progress of the incoming scene's loader.
    pub fn progress(&self) -> LoaderProgress {
        self.loader.progress()
    }

    /// Identifier of the incoming scene.
    pub fn scene_identifier(&self) -> &str {
        &self.scene_identifier
    }

    //--- Waiting ----------------------------------------------------------

    /// Blocks until the token leaves `Pending` and returns the new state.
    ///
    /// Must not be called from the owner thread: only its `poll_swap`
    /// advances the token.
    pub fn wait_ready(&self) -> SwapState {
        let mut guard = self.signal.lock.lock();
        loop {
            let state = self.state();
            if state != SwapState::Pending {
                return state;
            }
            self.signal.changed.wait(&mut guard);
        }
    }

    /// Like [`SwapToken::wait_ready`], giving up after `timeout`. Returns
    /// `Pending` on timeout.
    pub fn wait_ready_timeout(&self, timeout: Duration) -> SwapState {
        let deadline = Instant::now() + timeout;
        let mut guard = self.signal.lock.lock();
        loop {
            let state = self.state();
            if state != SwapState::Pending {
                return state;
            }
            if self.signal.changed.wait_until(&mut guard, deadline).timed_out() {
                return self.state();
            }
        }
    }

    //--- Transitions ------------------------------------------------------

    /// Accepts the handoff. Only valid once resources are ready; returns
    /// `false` from any other state.
    pub fn confirm(&self) -> bool {
        let confirmed = self.transition(SwapState::ResourcesReady, SwapState::Confirmed);
        if confirmed {
            info!(target: "swap", "Swap to '{}' confirmed", self.scene_identifier);
        } else {
            debug!(
                target: "swap",
                "Swap to '{}' cannot be confirmed from {:?}",
                self.scene_identifier,
                self.state()
            );
        }
        confirmed
    }

    /// Called by the owner whenever the loader reports completion. Wakes
    /// waiters even if the state was already advanced.
    pub(crate) fn mark_ready(&self) {
        if self.transition(SwapState::Pending, SwapState::ResourcesReady) {
            debug!(target: "swap", "Resources for '{}' ready", self.scene_identifier);
        }
    }

    pub(crate) fn supersede(&self) {
        let _guard = self.signal.lock.lock();
        self.state.store(SwapState::Superseded.as_u8(), Ordering::Release);
        self.signal.changed.notify_all();
    }

    fn transition(&self, from: SwapState, to: SwapState) -> bool {
        let _guard = self.signal.lock.lock();
        let moved = self
            .state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        self.signal.changed.notify_all();
        moved
    }
}

impl std::fmt::Debug for SwapToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapToken")
            .field("scene_identifier", &self.scene_identifier)
            .field("state", &self.state())
            .field("progress", &self.progress())
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
