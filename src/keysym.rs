//! Symbol names and values.
//!
//! A [`Symbol`] is the logical identity of a key, mouse button or scroll
//! tick. Values follow the X11 keysym numbering, so rule files use X11
//! names (`XK_Right`, `XK_Alt_L/D`, ...).
//! Mouse buttons and scroll ticks live in a private range above the
//! keysym space.
//!
//! Names are accepted with or without the `XK_` prefix and are
//! case-sensitive (`XK_a` and `XK_A` are different keysyms).

use std::fmt;

/// Logical key / button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Wrap a raw keysym value.
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Raw keysym value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Symbol for a printable ASCII character, as used in quoted strings.
    ///
    /// Latin-1 keysyms share their code points with ASCII, so the
    /// character code is the keysym. Returns `None` outside `' '..='~'`.
    pub fn from_char(c: char) -> Option<Self> {
        if (' '..='~').contains(&c) {
            Some(Self(c as u32))
        } else {
            None
        }
    }

    /// Look up a symbol by name (`XK_Right` or `Right`).
    pub fn from_name(name: &str) -> Option<Self> {
        let bare = name.strip_prefix("XK_").unwrap_or(name);
        if bare.is_empty() {
            return None;
        }
        if let Some(pos) = ASCII_NAMES.iter().position(|&n| n == bare) {
            return Some(Self(0x20 + pos as u32));
        }
        NAMED
            .iter()
            .find(|(n, _)| *n == bare)
            .map(|&(_, value)| Self(value))
    }

    /// Canonical name without the `XK_` prefix, if the symbol is known.
    pub fn name(self) -> Option<&'static str> {
        if (0x20..=0x7e).contains(&self.0) {
            return ASCII_NAMES.get((self.0 - 0x20) as usize).copied();
        }
        NAMED
            .iter()
            .find(|(_, value)| *value == self.0)
            .map(|&(n, _)| n)
    }

    /// Every symbol with a name, printable ASCII first.
    pub fn known() -> impl Iterator<Item = Symbol> {
        (0x20..=0x7e)
            .chain(NAMED.iter().map(|&(_, value)| value))
            .map(Symbol)
    }

    /// True for the pseudo-symbols standing for mouse buttons and scroll ticks.
    pub fn is_pointer(self) -> bool {
        (pointer::BUTTON_1..=pointer::SCROLL_DOWN).contains(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "XK_{name}"),
            None => write!(f, "0x{:x}", self.0),
        }
    }
}

/// Pseudo-keysyms for pointer events.
pub mod pointer {
    pub const BUTTON_1: u32 = 0x200_0001;
    pub const BUTTON_2: u32 = 0x200_0002;
    pub const BUTTON_3: u32 = 0x200_0003;
    pub const SCROLL_UP: u32 = 0x200_0004;
    pub const SCROLL_DOWN: u32 = 0x200_0005;
}

/// Well-known keysym values.
pub mod xk {
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const DELETE: u32 = 0xffff;
    pub const HOME: u32 = 0xff50;
    pub const LEFT: u32 = 0xff51;
    pub const UP: u32 = 0xff52;
    pub const RIGHT: u32 = 0xff53;
    pub const DOWN: u32 = 0xff54;
    pub const PAGE_UP: u32 = 0xff55;
    pub const PAGE_DOWN: u32 = 0xff56;
    pub const END: u32 = 0xff57;
    pub const INSERT: u32 = 0xff63;
    pub const SHIFT_L: u32 = 0xffe1;
    pub const SHIFT_R: u32 = 0xffe2;
    pub const CONTROL_L: u32 = 0xffe3;
    pub const CONTROL_R: u32 = 0xffe4;
    pub const ALT_L: u32 = 0xffe9;
    pub const ALT_R: u32 = 0xffea;
    pub const SUPER_L: u32 = 0xffeb;
    pub const SUPER_R: u32 = 0xffec;
}

/// Names for keysyms 0x20..=0x7e, indexed by `keysym - 0x20`.
const ASCII_NAMES: [&str; 95] = [
    "space", "exclam", "quotedbl", "numbersign", "dollar", "percent", "ampersand",
    "apostrophe", "parenleft", "parenright", "asterisk", "plus", "comma", "minus",
    "period", "slash", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "colon",
    "semicolon", "less", "equal", "greater", "question", "at", "A", "B", "C", "D", "E",
    "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V",
    "W", "X", "Y", "Z", "bracketleft", "backslash", "bracketright", "asciicircum",
    "underscore", "grave", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l",
    "m", "n", "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft",
    "bar", "braceright", "asciitilde",
];

/// Non-ASCII keysyms. The first entry for a value is its canonical name.
#[rustfmt::skip]
const NAMED: &[(&str, u32)] = &[
    // TTY functions
    ("BackSpace", xk::BACKSPACE), ("Tab", xk::TAB), ("Linefeed", 0xff0a),
    ("Clear", 0xff0b), ("Return", xk::RETURN), ("Pause", 0xff13),
    ("Scroll_Lock", 0xff14), ("Sys_Req", 0xff15), ("Escape", xk::ESCAPE),
    ("Delete", xk::DELETE),
    // Cursor control
    ("Home", xk::HOME), ("Left", xk::LEFT), ("Up", xk::UP), ("Right", xk::RIGHT),
    ("Down", xk::DOWN), ("Prior", xk::PAGE_UP), ("Page_Up", xk::PAGE_UP),
    ("Next", xk::PAGE_DOWN), ("Page_Down", xk::PAGE_DOWN), ("End", xk::END),
    ("Begin", 0xff58),
    // Misc functions
    ("Select", 0xff60), ("Print", 0xff61), ("Execute", 0xff62), ("Insert", xk::INSERT),
    ("Undo", 0xff65), ("Redo", 0xff66), ("Menu", 0xff67), ("Find", 0xff68),
    ("Cancel", 0xff69), ("Help", 0xff6a), ("Break", 0xff6b), ("Num_Lock", 0xff7f),
    // Keypad
    ("KP_Space", 0xff80), ("KP_Tab", 0xff89), ("KP_Enter", 0xff8d),
    ("KP_Home", 0xff95), ("KP_Left", 0xff96), ("KP_Up", 0xff97), ("KP_Right", 0xff98),
    ("KP_Down", 0xff99), ("KP_Prior", 0xff9a), ("KP_Page_Up", 0xff9a),
    ("KP_Next", 0xff9b), ("KP_Page_Down", 0xff9b), ("KP_End", 0xff9c),
    ("KP_Begin", 0xff9d), ("KP_Insert", 0xff9e), ("KP_Delete", 0xff9f),
    ("KP_Multiply", 0xffaa), ("KP_Add", 0xffab), ("KP_Separator", 0xffac),
    ("KP_Subtract", 0xffad), ("KP_Decimal", 0xffae), ("KP_Divide", 0xffaf),
    ("KP_0", 0xffb0), ("KP_1", 0xffb1), ("KP_2", 0xffb2), ("KP_3", 0xffb3),
    ("KP_4", 0xffb4), ("KP_5", 0xffb5), ("KP_6", 0xffb6), ("KP_7", 0xffb7),
    ("KP_8", 0xffb8), ("KP_9", 0xffb9), ("KP_Equal", 0xffbd),
    // Function keys
    ("F1", 0xffbe), ("F2", 0xffbf), ("F3", 0xffc0), ("F4", 0xffc1), ("F5", 0xffc2),
    ("F6", 0xffc3), ("F7", 0xffc4), ("F8", 0xffc5), ("F9", 0xffc6), ("F10", 0xffc7),
    ("F11", 0xffc8), ("F12", 0xffc9), ("F13", 0xffca), ("F14", 0xffcb),
    ("F15", 0xffcc), ("F16", 0xffcd), ("F17", 0xffce), ("F18", 0xffcf),
    ("F19", 0xffd0), ("F20", 0xffd1), ("F21", 0xffd2), ("F22", 0xffd3),
    ("F23", 0xffd4), ("F24", 0xffd5),
    // Modifiers
    ("Shift_L", xk::SHIFT_L), ("Shift_R", xk::SHIFT_R), ("Control_L", xk::CONTROL_L),
    ("Control_R", xk::CONTROL_R), ("Caps_Lock", 0xffe5), ("Shift_Lock", 0xffe6),
    ("Meta_L", 0xffe7), ("Meta_R", 0xffe8), ("Alt_L", xk::ALT_L), ("Alt_R", xk::ALT_R),
    ("Super_L", xk::SUPER_L), ("Super_R", xk::SUPER_R), ("Hyper_L", 0xffed),
    ("Hyper_R", 0xffee), ("ISO_Level3_Shift", 0xfe03),
    // Media keys
    ("XF86AudioLowerVolume", 0x1008_ff11), ("XF86AudioMute", 0x1008_ff12),
    ("XF86AudioRaiseVolume", 0x1008_ff13), ("XF86AudioPlay", 0x1008_ff14),
    ("XF86AudioStop", 0x1008_ff15), ("XF86AudioPrev", 0x1008_ff16),
    ("XF86AudioNext", 0x1008_ff17), ("XF86AudioPause", 0x1008_ff31),
    // Pointer
    ("Button_1", pointer::BUTTON_1), ("Button_2", pointer::BUTTON_2),
    ("Button_3", pointer::BUTTON_3), ("Scroll_Up", pointer::SCROLL_UP),
    ("Scroll_Down", pointer::SCROLL_DOWN),
];
