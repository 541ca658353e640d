//=========================================================================
// Input Processor
//=========================================================================
//
// Converts winit keyboard and mouse button events into engine
// `InputEvent`s ready for the event manager's queue.
//
// Architecture:
//   winit WindowEvent → InputProcessor → InputEvent → EventManager::enqueue
//
// Stateful modifier tracking: caches modifier state from ModifiersChanged
// events and applies it to all subsequent key/button events. Keys with no
// engine `KeyCode` (F13-F24, media keys, exotic layouts) are filtered
// (returns None). Pointer positions are not carried here: the cursor
// samples them at dispatch time.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::ElementState,
    event::{KeyEvent as WinitKeyEvent, MouseButton as WinitMouseButton},
    keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::input::{InputAction, InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton};

//=== InputProcessor ======================================================

/// Converts winit events to engine InputEvents with stateful modifier
/// tracking.
pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
}

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
        }
    }

    //--- Modifier State Management ----------------------------------------

    /// Updates cached modifier state (applied to subsequent events).
    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a winit key event (filters unmapped keys).
    pub(crate) fn process_key_event(&self, key_event: &WinitKeyEvent) -> Option<InputEvent> {
        let key_code = match key_event.physical_key {
            PhysicalKey::Code(code) => KeyCode::from(code),
            PhysicalKey::Unidentified(_) => return None,
        };

        if matches!(key_code, KeyCode::Unidentified) {
            return None;
        }

        Some(self.create_key_input_event(
            key_code,
            scancode_of(key_event.physical_key),
            key_action(key_event.state, key_event.repeat),
        ))
    }

    /// Converts a winit mouse button event (with modifiers).
    pub(crate) fn process_mouse_button(
        &self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> InputEvent {
        InputEvent::Pointer {
            button: MouseButton::from(button),
            action: key_action(state, false),
            modifiers: self.current_modifiers,
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn create_key_input_event(
        &self,
        key: KeyCode,
        scancode: Option<u32>,
        action: InputAction,
    ) -> InputEvent {
        InputEvent::Key(KeyEvent {
            key,
            scancode,
            action,
            modifiers: self.current_modifiers,
        })
    }
}

fn key_action(state: ElementState, repeat: bool) -> InputAction {
    match (state, repeat) {
        (ElementState::Pressed, false) => InputAction::Press,
        (ElementState::Pressed, true) => InputAction::Repeat,
        (ElementState::Released, _) => InputAction::Release,
    }
}

//--- Scancodes -----------------------------------------------------------

#[cfg(any(target_os = "windows", target_os = "macos", target_os = "linux"))]
fn scancode_of(key: PhysicalKey) -> Option<u32> {
    use winit::platform::scancode::PhysicalKeyExtScancode;
    key.to_scancode()
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn scancode_of(_key: PhysicalKey) -> Option<u32> {
    None
}

//=========================================================================
// Winit Conversions
//=========================================================================

/// Converts winit ModifiersState to engine Modifiers.
///
/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Converts winit physical key codes to engine key codes.
///
/// Maps A-Z, 0-9, F1-F12, arrows, and common special keys. Everything else
/// returns `KeyCode::Unidentified`.
impl From<WinitKeyCode> for KeyCode {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Digits -------------------------------------------------------

            Digit0 => KeyCode::Digit0,
            Digit1 => KeyCode::Digit1,
            Digit2 => KeyCode::Digit2,
            Digit3 => KeyCode::Digit3,
            Digit4 => KeyCode::Digit4,
            Digit5 => KeyCode::Digit5,
            Digit6 => KeyCode::Digit6,
            Digit7 => KeyCode::Digit7,
            Digit8 => KeyCode::Digit8,
            Digit9 => KeyCode::Digit9,

            //--- Letters ------------------------------------------------------

            KeyA => KeyCode::KeyA,
            KeyB => KeyCode::KeyB,
            KeyC => KeyCode::KeyC,
            KeyD => KeyCode::KeyD,
            KeyE => KeyCode::KeyE,
            KeyF => KeyCode::KeyF,
            KeyG => KeyCode::KeyG,
            KeyH => KeyCode::KeyH,
            KeyI => KeyCode::KeyI,
            KeyJ => KeyCode::KeyJ,
            KeyK => KeyCode::KeyK,
            KeyL => KeyCode::KeyL,
            KeyM => KeyCode::KeyM,
            KeyN => KeyCode::KeyN,
            KeyO => KeyCode::KeyO,
            KeyP => KeyCode::KeyP,
            KeyQ => KeyCode::KeyQ,
            KeyR => KeyCode::KeyR,
            KeyS => KeyCode::KeyS,
            KeyT => KeyCode::KeyT,
            KeyU => KeyCode::KeyU,
            KeyV => KeyCode::KeyV,
            KeyW => KeyCode::KeyW,
            KeyX => KeyCode::KeyX,
            KeyY => KeyCode::KeyY,
            KeyZ => KeyCode::KeyZ,

            //--- Function Keys ------------------------------------------------

            F1 => KeyCode::F1,
            F2 => KeyCode::F2,
            F3 => KeyCode::F3,
            F4 => KeyCode::F4,
            F5 => KeyCode::F5,
            F6 => KeyCode::F6,
            F7 => KeyCode::F7,
            F8 => KeyCode::F8,
            F9 => KeyCode::F9,
            F10 => KeyCode::F10,
            F11 => KeyCode::F11,
            F12 => KeyCode::F12,

            //--- Arrows -------------------------------------------------------

            ArrowUp => KeyCode::ArrowUp,
            ArrowDown => KeyCode::ArrowDown,
            ArrowLeft => KeyCode::ArrowLeft,
            ArrowRight => KeyCode::ArrowRight,

            //--- Special ------------------------------------------------------

            Space => KeyCode::Space,
            Enter => KeyCode::Enter,
            Escape => KeyCode::Escape,
            Tab => KeyCode::Tab,
            Backspace => KeyCode::Backspace,
            Delete => KeyCode::Delete,

            //--- Unmapped -----------------------------------------------------

            _ => KeyCode::Unidentified,
        }
    }
}

/// Converts winit mouse buttons to engine buttons.
///
/// Left/Right/Middle mapped directly; Back/Forward/Other → Other.
impl From<WinitMouseButton> for MouseButton {
    fn from(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => MouseButton::Left,
            WinitMouseButton::Right => MouseButton::Right,
            WinitMouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_modifiers(shift: bool, ctrl: bool, alt: bool) -> ModifiersState {
        let mut state = ModifiersState::empty();
        if shift { state.insert(ModifiersState::SHIFT); }
        if ctrl { state.insert(ModifiersState::CONTROL); }
        if alt { state.insert(ModifiersState::ALT); }
        state
    }

    fn key_parts(event: InputEvent) -> KeyEvent {
        match event {
            InputEvent::Key(key_event) => key_event,
            other => panic!("Expected key event, got {:?}", other),
        }
    }

    #[test]
    fn starts_with_no_modifiers() {
        let processor = InputProcessor::new();
        assert!(processor.current_modifiers().is_empty());
    }

    #[test]
    fn update_modifiers_works() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(true, false, true));

        let mods = processor.current_modifiers();
        assert!(mods.shift && !mods.ctrl && mods.alt);
    }

    #[test]
    fn key_press_carries_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(false, true, false));

        let event = key_parts(processor.create_key_input_event(
            KeyCode::KeyS,
            Some(31),
            InputAction::Press,
        ));

        assert_eq!(event.key, KeyCode::KeyS);
        assert_eq!(event.scancode, Some(31));
        assert_eq!(event.action, InputAction::Press);
        assert_eq!(event.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn element_state_maps_to_action() {
        assert_eq!(key_action(ElementState::Pressed, false), InputAction::Press);
        assert_eq!(key_action(ElementState::Pressed, true), InputAction::Repeat);
        assert_eq!(key_action(ElementState::Released, false), InputAction::Release);
        assert_eq!(key_action(ElementState::Released, true), InputAction::Release);
    }

    #[test]
    fn keycode_conversion_filters_unidentified() {
        assert_eq!(KeyCode::from(WinitKeyCode::F13), KeyCode::Unidentified);
        assert_eq!(KeyCode::from(WinitKeyCode::MediaPlayPause), KeyCode::Unidentified);
    }

    #[test]
    fn mouse_button_has_modifiers() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(false, false, true));

        let event = processor.process_mouse_button(WinitMouseButton::Left, ElementState::Pressed);

        assert_eq!(
            event,
            InputEvent::Pointer {
                button: MouseButton::Left,
                action: InputAction::Press,
                modifiers: Modifiers::ALT,
            }
        );
    }

    #[test]
    fn modifiers_persist_across_events() {
        let mut processor = InputProcessor::new();
        processor.update_modifiers(make_modifiers(true, false, false));

        let pointer = processor.process_mouse_button(WinitMouseButton::Right, ElementState::Released);
        let key = key_parts(processor.create_key_input_event(KeyCode::Space, None, InputAction::Press));

        match pointer {
            InputEvent::Pointer { modifiers, action, .. } => {
                assert!(modifiers.shift);
                assert_eq!(action, InputAction::Release);
            }
            other => panic!("Expected pointer event, got {:?}", other),
        }
        assert!(key.modifiers.shift);
    }

    #[test]
    fn keycode_conversion_alphabetic() {
        assert_eq!(KeyCode::from(WinitKeyCode::KeyA), KeyCode::KeyA);
        assert_eq!(KeyCode::from(WinitKeyCode::KeyZ), KeyCode::KeyZ);
    }

    #[test]
    fn keycode_conversion_function_keys() {
        assert_eq!(KeyCode::from(WinitKeyCode::F1), KeyCode::F1);
        assert_eq!(KeyCode::from(WinitKeyCode::F12), KeyCode::F12);
    }

    #[test]
    fn keycode_conversion_special() {
        assert_eq!(KeyCode::from(WinitKeyCode::Space), KeyCode::Space);
        assert_eq!(KeyCode::from(WinitKeyCode::Enter), KeyCode::Enter);
    }

    #[test]
    fn mouse_button_conversion() {
        assert_eq!(MouseButton::from(WinitMouseButton::Left), MouseButton::Left);
        assert_eq!(MouseButton::from(WinitMouseButton::Right), MouseButton::Right);
        assert_eq!(MouseButton::from(WinitMouseButton::Middle), MouseButton::Middle);
        assert_eq!(MouseButton::from(WinitMouseButton::Back), MouseButton::Other);
    }
}
