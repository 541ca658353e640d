//=========================================================================
// Cursor
//=========================================================================
//
// Cached view of the pointer device, re-sampled once per frame.
//
// Architecture:
//   PointerDevice (platform) ──refresh()──> CursorState cache ──> readers
//
// Reads never touch the device: every query between two `refresh()`
// calls observes the same sample, so callers accept up to one frame of
// staleness. `refresh()` is driven by the event manager at the start of
// each dispatch pass and is never run concurrently with itself.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use winit::window::CursorIcon;

//=== Internal Dependencies ===============================================

use super::event::MouseButton;

//=== PointerDevice =======================================================

/// Platform-side pointer sampling contract.
///
/// Implemented by the window layer and by test doubles. All methods may
/// be called from the owner thread while the platform updates the device
/// from its own callbacks.
pub trait PointerDevice: Send + Sync {
    /// Current pointer position in window pixels.
    ///
    /// Returns `None` when the pointer is outside the window. While
    /// captured, returns the virtual (unbounded) position instead.
    fn position(&self) -> Option<(f64, f64)>;

    /// Whether `button` is held right now.
    fn is_button_pressed(&self, button: MouseButton) -> bool;

    /// Enters or leaves capture mode (hidden, grabbed pointer).
    fn set_captured(&self, captured: bool);

    /// Changes the pointer image.
    fn set_icon(&self, icon: CursorIcon);
}

//=== CursorPosition ======================================================

/// Last sampled pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorPosition {
    /// Inside the window (or virtual, while locked).
    Inside { x: f64, y: f64 },

    /// Outside the window bounds.
    OutOfBounds,
}

impl CursorPosition {
    /// Sentinel reported for [`CursorPosition::OutOfBounds`].
    pub const OUT_OF_BOUNDS: (f64, f64) = (-1.0, -1.0);

    /// Coordinates, or the `(-1, -1)` sentinel when out of bounds.
    pub fn to_pair(self) -> (f64, f64) {
        match self {
            Self::Inside { x, y } => (x, y),
            Self::OutOfBounds => Self::OUT_OF_BOUNDS,
        }
    }
}

//=== Cursor ==============================================================

#[derive(Debug)]
struct CursorState {
    position: CursorPosition,
    locked: bool,
    icon: CursorIcon,
}

/// Per-window cursor: position cache, lock flag and pointer image.
pub struct Cursor {
    device: Arc<dyn PointerDevice>,
    state: RwLock<CursorState>,
}

impl Cursor {
    /// Creates a cursor over `device`. Nothing is sampled until the first
    /// [`Cursor::refresh`].
    pub fn new(device: Arc<dyn PointerDevice>) -> Self {
        Self {
            device,
            state: RwLock::new(CursorState {
                position: CursorPosition::OutOfBounds,
                locked: false,
                icon: CursorIcon::Default,
            }),
        }
    }

    //--- Sampling ---------------------------------------------------------

    /// Re-samples the device and updates the cache.
    pub fn refresh(&self) {
        let sampled = match self.device.position() {
            Some((x, y)) => CursorPosition::Inside { x, y },
            None => CursorPosition::OutOfBounds,
        };
        self.state.write().position = sampled;
    }

    /// Last cached position.
    pub fn position(&self) -> CursorPosition {
        self.state.read().position
    }

    /// Whether `button` is currently held, as reported by the device.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.device.is_button_pressed(button)
    }

    //--- Capture ----------------------------------------------------------

    /// Captures the pointer. While locked, positions are virtual and UI
    /// hit-testing is suppressed.
    pub fn lock(&self) {
        let mut state = self.state.write();
        if !state.locked {
            debug!(target: "events", "Cursor locked");
            self.device.set_captured(true);
            state.locked = true;
        }
    }

    /// Releases a previous [`Cursor::lock`].
    pub fn unlock(&self) {
        let mut state = self.state.write();
        if state.locked {
            debug!(target: "events", "Cursor unlocked");
            self.device.set_captured(false);
            state.locked = false;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.state.read().locked
    }

    //--- Image ------------------------------------------------------------

    pub fn set_icon(&self, icon: CursorIcon) {
        let mut state = self.state.write();
        if state.icon != icon {
            self.device.set_icon(icon);
            state.icon = icon;
        }
    }

    pub fn icon(&self) -> CursorIcon {
        self.state.read().icon
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
