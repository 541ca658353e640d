//=========================================================================
// Input
//=========================================================================
//
// Engine input vocabulary and the per-window cursor.
//
// Components:
// - `event`: key codes, buttons, modifiers, key/pointer events
// - `cursor`: cached pointer position, lock state, pointer image
//
//=========================================================================

//=== Module Declarations =================================================

pub mod cursor;
pub mod event;

//=== Public API ==========================================================

pub use cursor::{Cursor, CursorPosition, PointerDevice};
pub use event::{InputAction, InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton, PointerEvent};
