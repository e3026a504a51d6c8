//! Virtual keyboard and mouse using evdev/uinput
//!
//! Creates a virtual input device that performs the synthesized strokes.
//! Keysyms are mapped to the Linux key codes of a US layout, the way the
//! X server would resolve them to keycodes; shifted characters map to
//! their unshifted key.

use crate::dispatch::OutputSink;
use crate::error::OutputError;
use crate::keysym::{pointer, xk, Symbol};
use crate::stroke::StrokeOp;
use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, Key, RelativeAxisType,
};
use tracing::warn;

/// Name of the virtual device (shown in `evtest` and `xinput`).
pub const DEVICE_NAME: &str = "ShuttlePro Translator";

/// What a symbol turns into on the virtual device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Key(Key),
    /// One wheel tick (positive is up), sent on press only.
    Wheel(i32),
}

/// Virtual output device
pub struct VirtualKeyboard {
    device: VirtualDevice,
}

impl VirtualKeyboard {
    /// Create the virtual device with every key a symbol can map to.
    pub fn new(name: &str) -> Result<Self, OutputError> {
        let mut keys = AttributeSet::<Key>::new();
        for symbol in Symbol::known() {
            if let Some(Target::Key(key)) = target(symbol) {
                keys.insert(key);
            }
        }

        let mut axes = AttributeSet::<RelativeAxisType>::new();
        axes.insert(RelativeAxisType::REL_WHEEL);

        let device = VirtualDeviceBuilder::new()
            .map_err(OutputError::CreateDevice)?
            .name(name)
            .with_keys(&keys)
            .map_err(OutputError::CreateDevice)?
            .with_relative_axes(&axes)
            .map_err(OutputError::CreateDevice)?
            .build()
            .map_err(OutputError::CreateDevice)?;

        Ok(Self { device })
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}

impl OutputSink for VirtualKeyboard {
    fn emit(&mut self, op: StrokeOp) -> Result<(), OutputError> {
        let pressed = op.action.is_press();
        let event = match target(op.symbol) {
            Some(Target::Key(key)) => {
                InputEvent::new(EventType::KEY, key.code(), i32::from(pressed))
            }
            Some(Target::Wheel(delta)) if pressed => {
                InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_WHEEL.0, delta)
            }
            Some(Target::Wheel(_)) => return Ok(()),
            None => {
                warn!("No key code for {}", op.symbol);
                return Ok(());
            }
        };
        // emit() appends the SYN_REPORT, so every operation is its own report.
        self.device
            .emit(&[event])
            .map_err(OutputError::EmitEvent)
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Map a symbol to its key or wheel action.
pub fn target(symbol: Symbol) -> Option<Target> {
    let raw = symbol.raw();
    match raw {
        pointer::SCROLL_UP => return Some(Target::Wheel(1)),
        pointer::SCROLL_DOWN => return Some(Target::Wheel(-1)),
        _ => {}
    }
    if let Some(c) = char::from_u32(raw).filter(|c| (' '..='~').contains(c)) {
        return ascii_key(c).map(Target::Key);
    }
    NAMED_KEYS
        .iter()
        .find(|&&(value, _)| value == raw)
        .map(|&(_, key)| Target::Key(key))
}

const LETTERS: [Key; 26] = [
    Key::KEY_A, Key::KEY_B, Key::KEY_C, Key::KEY_D, Key::KEY_E, Key::KEY_F, Key::KEY_G,
    Key::KEY_H, Key::KEY_I, Key::KEY_J, Key::KEY_K, Key::KEY_L, Key::KEY_M, Key::KEY_N,
    Key::KEY_O, Key::KEY_P, Key::KEY_Q, Key::KEY_R, Key::KEY_S, Key::KEY_T, Key::KEY_U,
    Key::KEY_V, Key::KEY_W, Key::KEY_X, Key::KEY_Y, Key::KEY_Z,
];

const DIGITS: [Key; 10] = [
    Key::KEY_0, Key::KEY_1, Key::KEY_2, Key::KEY_3, Key::KEY_4, Key::KEY_5, Key::KEY_6,
    Key::KEY_7, Key::KEY_8, Key::KEY_9,
];

fn ascii_key(c: char) -> Option<Key> {
    let key = match c {
        'a'..='z' => LETTERS[(c as u8 - b'a') as usize],
        'A'..='Z' => LETTERS[(c as u8 - b'A') as usize],
        '0'..='9' => DIGITS[(c as u8 - b'0') as usize],
        ' ' => Key::KEY_SPACE,
        '!' => Key::KEY_1,
        '@' => Key::KEY_2,
        '#' => Key::KEY_3,
        '$' => Key::KEY_4,
        '%' => Key::KEY_5,
        '^' => Key::KEY_6,
        '&' => Key::KEY_7,
        '*' => Key::KEY_8,
        '(' => Key::KEY_9,
        ')' => Key::KEY_0,
        '\'' | '"' => Key::KEY_APOSTROPHE,
        ',' | '<' => Key::KEY_COMMA,
        '.' | '>' => Key::KEY_DOT,
        '/' | '?' => Key::KEY_SLASH,
        ';' | ':' => Key::KEY_SEMICOLON,
        '-' | '_' => Key::KEY_MINUS,
        '=' | '+' => Key::KEY_EQUAL,
        '[' | '{' => Key::KEY_LEFTBRACE,
        ']' | '}' => Key::KEY_RIGHTBRACE,
        '\\' | '|' => Key::KEY_BACKSLASH,
        '`' | '~' => Key::KEY_GRAVE,
        _ => return None,
    };
    Some(key)
}

/// Non-ASCII keysyms with a key on a standard keyboard.
#[rustfmt::skip]
const NAMED_KEYS: &[(u32, Key)] = &[
    // TTY functions
    (xk::BACKSPACE, Key::KEY_BACKSPACE), (xk::TAB, Key::KEY_TAB), (0xff0a, Key::KEY_LINEFEED),
    (0xff0b, Key::KEY_CLEAR), (xk::RETURN, Key::KEY_ENTER), (0xff13, Key::KEY_PAUSE),
    (0xff14, Key::KEY_SCROLLLOCK), (0xff15, Key::KEY_SYSRQ), (xk::ESCAPE, Key::KEY_ESC),
    (xk::DELETE, Key::KEY_DELETE),
    // Cursor control
    (xk::HOME, Key::KEY_HOME), (xk::LEFT, Key::KEY_LEFT), (xk::UP, Key::KEY_UP),
    (xk::RIGHT, Key::KEY_RIGHT), (xk::DOWN, Key::KEY_DOWN), (xk::PAGE_UP, Key::KEY_PAGEUP),
    (xk::PAGE_DOWN, Key::KEY_PAGEDOWN), (xk::END, Key::KEY_END),
    // Misc functions
    (0xff60, Key::KEY_SELECT), (0xff61, Key::KEY_SYSRQ), (xk::INSERT, Key::KEY_INSERT),
    (0xff65, Key::KEY_UNDO), (0xff66, Key::KEY_REDO), (0xff67, Key::KEY_COMPOSE),
    (0xff68, Key::KEY_FIND), (0xff69, Key::KEY_CANCEL), (0xff6a, Key::KEY_HELP),
    (0xff7f, Key::KEY_NUMLOCK),
    // Keypad
    (0xff8d, Key::KEY_KPENTER), (0xff95, Key::KEY_KP7), (0xff96, Key::KEY_KP4),
    (0xff97, Key::KEY_KP8), (0xff98, Key::KEY_KP6), (0xff99, Key::KEY_KP2),
    (0xff9a, Key::KEY_KP9), (0xff9b, Key::KEY_KP3), (0xff9c, Key::KEY_KP1),
    (0xff9d, Key::KEY_KP5), (0xff9e, Key::KEY_KP0), (0xff9f, Key::KEY_KPDOT),
    (0xffaa, Key::KEY_KPASTERISK), (0xffab, Key::KEY_KPPLUS), (0xffac, Key::KEY_KPCOMMA),
    (0xffad, Key::KEY_KPMINUS), (0xffae, Key::KEY_KPDOT), (0xffaf, Key::KEY_KPSLASH),
    (0xffb0, Key::KEY_KP0), (0xffb1, Key::KEY_KP1), (0xffb2, Key::KEY_KP2),
    (0xffb3, Key::KEY_KP3), (0xffb4, Key::KEY_KP4), (0xffb5, Key::KEY_KP5),
    (0xffb6, Key::KEY_KP6), (0xffb7, Key::KEY_KP7), (0xffb8, Key::KEY_KP8),
    (0xffb9, Key::KEY_KP9), (0xffbd, Key::KEY_KPEQUAL),
    // Function keys
    (0xffbe, Key::KEY_F1), (0xffbf, Key::KEY_F2), (0xffc0, Key::KEY_F3),
    (0xffc1, Key::KEY_F4), (0xffc2, Key::KEY_F5), (0xffc3, Key::KEY_F6),
    (0xffc4, Key::KEY_F7), (0xffc5, Key::KEY_F8), (0xffc6, Key::KEY_F9),
    (0xffc7, Key::KEY_F10), (0xffc8, Key::KEY_F11), (0xffc9, Key::KEY_F12),
    (0xffca, Key::KEY_F13), (0xffcb, Key::KEY_F14), (0xffcc, Key::KEY_F15),
    (0xffcd, Key::KEY_F16), (0xffce, Key::KEY_F17), (0xffcf, Key::KEY_F18),
    (0xffd0, Key::KEY_F19), (0xffd1, Key::KEY_F20), (0xffd2, Key::KEY_F21),
    (0xffd3, Key::KEY_F22), (0xffd4, Key::KEY_F23), (0xffd5, Key::KEY_F24),
    // Modifiers
    (xk::SHIFT_L, Key::KEY_LEFTSHIFT), (xk::SHIFT_R, Key::KEY_RIGHTSHIFT),
    (xk::CONTROL_L, Key::KEY_LEFTCTRL), (xk::CONTROL_R, Key::KEY_RIGHTCTRL),
    (0xffe5, Key::KEY_CAPSLOCK), (0xffe7, Key::KEY_LEFTMETA), (0xffe8, Key::KEY_RIGHTMETA),
    (xk::ALT_L, Key::KEY_LEFTALT), (xk::ALT_R, Key::KEY_RIGHTALT),
    (xk::SUPER_L, Key::KEY_LEFTMETA), (xk::SUPER_R, Key::KEY_RIGHTMETA),
    (0xfe03, Key::KEY_RIGHTALT),
    // Media keys
    (0x1008_ff11, Key::KEY_VOLUMEDOWN), (0x1008_ff12, Key::KEY_MUTE),
    (0x1008_ff13, Key::KEY_VOLUMEUP), (0x1008_ff14, Key::KEY_PLAYPAUSE),
    (0x1008_ff15, Key::KEY_STOPCD), (0x1008_ff16, Key::KEY_PREVIOUSSONG),
    (0x1008_ff17, Key::KEY_NEXTSONG), (0x1008_ff31, Key::KEY_PAUSECD),
    // Pointer buttons
    (pointer::BUTTON_1, Key::BTN_LEFT), (pointer::BUTTON_2, Key::BTN_MIDDLE),
    (pointer::BUTTON_3, Key::BTN_RIGHT),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Option<Target> {
        target(Symbol::from_name(name).unwrap())
    }

    #[test]
    fn test_ascii_targets() {
        assert_eq!(named("a"), Some(Target::Key(Key::KEY_A)));
        assert_eq!(named("A"), Some(Target::Key(Key::KEY_A)));
        assert_eq!(named("7"), Some(Target::Key(Key::KEY_7)));
        assert_eq!(named("exclam"), Some(Target::Key(Key::KEY_1)));
        assert_eq!(named("space"), Some(Target::Key(Key::KEY_SPACE)));
    }

    #[test]
    fn test_named_targets() {
        assert_eq!(named("Return"), Some(Target::Key(Key::KEY_ENTER)));
        assert_eq!(named("Page_Up"), Some(Target::Key(Key::KEY_PAGEUP)));
        assert_eq!(named("F13"), Some(Target::Key(Key::KEY_F13)));
        assert_eq!(named("Control_L"), Some(Target::Key(Key::KEY_LEFTCTRL)));
    }

    #[test]
    fn test_pointer_targets() {
        assert_eq!(named("Button_2"), Some(Target::Key(Key::BTN_MIDDLE)));
        assert_eq!(named("Scroll_Up"), Some(Target::Wheel(1)));
        assert_eq!(named("Scroll_Down"), Some(Target::Wheel(-1)));
    }

    #[test]
    fn test_every_ascii_symbol_has_a_key() {
        for c in ' '..='~' {
            assert!(target(Symbol::from_char(c).unwrap()).is_some(), "{c:?}");
        }
    }

    #[test]
    fn test_unmapped_symbol() {
        assert_eq!(target(Symbol::from_raw(0x1234_5678)), None);
        assert_eq!(named("KP_Space"), None);
    }

    #[test]
    #[ignore] // Requires uinput access (run with: cargo test -- --ignored)
    fn test_create_virtual_keyboard() {
        let keyboard = VirtualKeyboard::new("Test ShuttlePro Translator");
        assert!(keyboard.is_ok());
    }
}
