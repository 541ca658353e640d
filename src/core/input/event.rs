//=========================================================================
// Input Event Types
//
// Platform-independent representation of keyboard and pointer input.
//
// The platform layer (winit) converts native events into these types
// before handing them to the `EventManager`. Listeners only ever see
// engine types, never platform types.
//
// Event Flow:
// ```text
// Platform Layer (winit)
//         ↓
//    InputProcessor (key/button mapping, sticky modifiers)
//         ↓
//    EventManager::enqueue_*  (any thread)
//         ↓
//    EventManager::process_waiting_events  (owner thread)
//         ↓
//    KeyEvent / PointerEvent listeners, UI hit-test
// ```
//
//=========================================================================

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// The `Other` variant covers side buttons, macro buttons, and any
/// non-standard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (typically left).
    Left,

    /// Secondary button (typically right).
    Right,

    /// Middle button (wheel click).
    Middle,

    /// Any other button (side buttons, thumb buttons, macro keys).
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// `KeyA` is always the same physical key regardless of keyboard layout.
///
/// Listeners are registered per `KeyCode`, so this type is also the key
/// of the event manager's listener registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Function Keys ----------------------------------------------------

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Fallback for keys not explicitly mapped by the input layer.
    ///
    /// The platform layer drops these before they reach the queue.
    Unidentified,
}

//=== InputAction =========================================================

/// What happened to a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Went down.
    Press,

    /// Went up.
    Release,

    /// Held long enough for the OS to auto-repeat (keys only).
    Repeat,
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// The platform does not distinguish left/right variants. Ctrl is
/// Command on macOS, Alt is Option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key held (either left or right).
    pub shift: bool,

    /// Ctrl key held (either left or right, Command on macOS).
    pub ctrl: bool,

    /// Alt key held (either left or right, Option on macOS).
    pub alt: bool,
}

//--- Modifier Constants --------------------------------------------------

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };

    /// Shift only.
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };

    /// Ctrl only.
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };

    /// Alt only.
    pub const ALT: Self = Self { shift: false, ctrl: false, alt: true };

    /// All modifiers held (Shift + Ctrl + Alt).
    pub const ALL: Self = Self { shift: true, ctrl: true, alt: true };

    /// True when no modifier is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

impl Default for Modifiers {
    /// Defaults to no modifiers held.
    fn default() -> Self {
        Self::NONE
    }
}

//=== KeyEvent ============================================================

/// A keyboard event as delivered to key listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Physical key.
    pub key: KeyCode,

    /// Raw platform scancode, when the backend reports one.
    pub scancode: Option<u32>,

    /// Press, release or auto-repeat.
    pub action: InputAction,

    /// Modifier state at the time of the event.
    pub modifiers: Modifiers,
}

//=== PointerEvent ========================================================

/// A mouse button event as delivered to pointer listeners and the UI.
///
/// Positions are in window pixels with a top-left origin. The absolute
/// position is the cursor sample taken at the start of the dispatch pass.
/// `local_position` equals `absolute_position` for pointer listeners and
/// is rebased onto the UI root's origin before a UI click is delivered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub button: MouseButton,
    pub action: InputAction,
    pub modifiers: Modifiers,
    pub absolute_position: (f64, f64),
    pub local_position: (f64, f64),
}

impl PointerEvent {
    /// Returns a copy with `local_position` rebased onto `origin`.
    pub fn relative_to(&self, origin: (f64, f64)) -> Self {
        Self {
            local_position: (
                self.absolute_position.0 - origin.0,
                self.absolute_position.1 - origin.1,
            ),
            ..*self
        }
    }
}

//=== InputEvent ==========================================================

/// One queued input event, keyed by origin.
///
/// Pointer entries carry no position: the position is sampled from the
/// cursor when the queue is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Pointer {
        button: MouseButton,
        action: InputAction,
        modifiers: Modifiers,
    },
}

//=========================================================================
// Unit Tests
//=========================================================================
