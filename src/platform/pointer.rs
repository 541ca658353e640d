//=========================================================================
// Window Pointer
//=========================================================================
//
// `PointerDevice` backed by a winit window.
//
// Architecture:
// ```text
//  Event loop callbacks                  Cursor::refresh (owner thread)
//  CursorMoved ──► moved(x, y) ──┐
//  CursorLeft  ──► left()        ├──► Mutex<PointerState> ──► position()
//  MouseMotion ──► motion(dx,dy) │
//  MouseInput  ──► set_button()  ┘
// ```
//
// While captured the window position is frozen and raw device motion
// accumulates into an unbounded virtual position instead, which is what
// `position()` reports.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;
use winit::window::{CursorGrabMode, CursorIcon, Window};

//=== Internal Dependencies ===============================================

use crate::core::input::{MouseButton, PointerDevice};

//=== PointerState ========================================================

#[derive(Debug, Default)]
struct PointerState {
    position: Option<(f64, f64)>,
    virtual_position: (f64, f64),
    captured: bool,
    pressed: HashSet<MouseButton>,
}

//=== WindowPointer =======================================================

/// Pointer state fed by the event loop, sampled by the cursor.
pub(crate) struct WindowPointer {
    window: Option<Arc<Window>>,
    state: Mutex<PointerState>,
}

impl WindowPointer {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window: Some(window),
            state: Mutex::new(PointerState::default()),
        }
    }

    /// Pointer with no window behind it; capture and icon changes only
    /// update local state.
    #[cfg(test)]
    pub fn detached() -> Self {
        Self {
            window: None,
            state: Mutex::new(PointerState::default()),
        }
    }

    //--- Event Loop Feed --------------------------------------------------

    pub fn moved(&self, x: f64, y: f64) {
        self.state.lock().position = Some((x, y));
    }

    pub fn left(&self) {
        self.state.lock().position = None;
    }

    /// Raw device motion. Only moves the virtual position while captured.
    pub fn motion(&self, dx: f64, dy: f64) {
        let mut state = self.state.lock();
        if state.captured {
            state.virtual_position.0 += dx;
            state.virtual_position.1 += dy;
        }
    }

    pub fn set_button(&self, button: MouseButton, pressed: bool) {
        let mut state = self.state.lock();
        if pressed {
            state.pressed.insert(button);
        } else {
            state.pressed.remove(&button);
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn grab(window: &Window, captured: bool) {
        if captured {
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                warn!(target: "platform::input", "Cursor grab unavailable: {}", e);
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                warn!(target: "platform::input", "Cursor release failed: {}", e);
            }
            window.set_cursor_visible(true);
        }
    }
}

impl PointerDevice for WindowPointer {
    fn position(&self) -> Option<(f64, f64)> {
        let state = self.state.lock();
        if state.captured {
            Some(state.virtual_position)
        } else {
            state.position
        }
    }

    fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.state.lock().pressed.contains(&button)
    }

    fn set_captured(&self, captured: bool) {
        {
            let mut state = self.state.lock();
            if state.captured == captured {
                return;
            }
            state.captured = captured;
            if captured {
                state.virtual_position = state.position.unwrap_or((0.0, 0.0));
            }
        }

        debug!(target: "platform::input", "Pointer capture: {}", captured);
        if let Some(window) = &self.window {
            Self::grab(window, captured);
        }
    }

    fn set_icon(&self, icon: CursorIcon) {
        if let Some(window) = &self.window {
            window.set_cursor(icon);
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_window_position() {
        let pointer = WindowPointer::detached();
        assert_eq!(pointer.position(), None);

        pointer.moved(12.0, 34.0);
        assert_eq!(pointer.position(), Some((12.0, 34.0)));

        pointer.left();
        assert_eq!(pointer.position(), None);
    }

    #[test]
    fn motion_ignored_unless_captured() {
        let pointer = WindowPointer::detached();
        pointer.moved(10.0, 10.0);
        pointer.motion(5.0, 5.0);

        assert_eq!(pointer.position(), Some((10.0, 10.0)));
    }

    #[test]
    fn captured_pointer_reports_unbounded_virtual_position() {
        let pointer = WindowPointer::detached();
        pointer.moved(10.0, 10.0);
        pointer.set_captured(true);

        pointer.motion(-50.0, 3.0);
        pointer.moved(400.0, 400.0);

        assert_eq!(pointer.position(), Some((-40.0, 13.0)));

        pointer.set_captured(false);
        assert_eq!(pointer.position(), Some((400.0, 400.0)));
    }

    #[test]
    fn button_state() {
        let pointer = WindowPointer::detached();
        pointer.set_button(MouseButton::Right, true);

        assert!(pointer.is_button_pressed(MouseButton::Right));
        assert!(!pointer.is_button_pressed(MouseButton::Left));

        pointer.set_button(MouseButton::Right, false);
        assert!(!pointer.is_button_pressed(MouseButton::Right));
    }
}
