//! Sequence builder: expands a slot's token stream into press/release strokes.
//!
//! All state lives in a [`BuilderContext`] created fresh for each slot, so a
//! slot's output depends only on its own tokens.
//!
//! # Token semantics
//!
//! ```text
//! sym        tap: release the previously tapped key, press sym and keep it down
//! sym/D      press sym and track it as a modifier
//! sym/U      release sym
//! sym/H      press sym and keep it down until the very end (survives RELEASE)
//! RELEASE    key slots only: switch from the press half to the release half
//! ```
//!
//! When a key slot reaches `RELEASE` (explicit, or implied at the end of the
//! line) every `/D` modifier is released at the end of the press half while
//! the last tapped key stays down; the release half starts by releasing that
//! key. The first tap of the release half re-presses the modifiers released
//! at the boundary. Modifiers still down at the end of the whole construct
//! are released in the order they were first pressed, `/H` modifiers last
//! for key slots.

use crate::keysym::Symbol;
use crate::stroke::{StrokeOp, StrokeSequence};
use std::collections::HashMap;
use std::fmt;

/// One resolved token of a rule line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeToken {
    Tap(Symbol),
    Down(Symbol),
    Up(Symbol),
    Hold(Symbol),
    Release,
}

/// Tracking state of a modifier within one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModifierMark {
    Down,
    Held,
    /// Released at the press/release boundary, re-pressed by the next tap.
    PendingRepress,
    Released,
}

/// Modifier marks keyed by symbol, remembering first-press order.
#[derive(Debug, Default)]
struct ModifierState {
    order: Vec<Symbol>,
    marks: HashMap<Symbol, ModifierMark>,
}

impl ModifierState {
    fn mark(&mut self, symbol: Symbol, mark: ModifierMark) {
        if self.marks.insert(symbol, mark).is_none() {
            self.order.push(symbol);
        }
    }

    fn get(&self, symbol: Symbol) -> Option<ModifierMark> {
        self.marks.get(&symbol).copied()
    }
}

/// Result of building one slot definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltSequence {
    /// Key slots: strokes sent on key press and on key release.
    Key {
        press: StrokeSequence,
        release: StrokeSequence,
    },
    /// Shuttle, increment and jog slots.
    Single(StrokeSequence),
}

/// Errors reported while feeding tokens. The offending token is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
    /// `RELEASE` on a slot that has no release half.
    ReleaseOnNonKey,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::ReleaseOnNonKey => write!(f, "RELEASE is only valid for key slots"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Builder state for a single slot definition.
#[derive(Debug)]
pub struct BuilderContext {
    is_key: bool,
    press: StrokeSequence,
    release: StrokeSequence,
    /// Strokes currently go to the release half.
    in_release_half: bool,
    /// No tap has happened since the last press/release boundary.
    awaiting_first_release_tap: bool,
    /// Last tapped key, still down.
    ordinary: Option<Symbol>,
    modifiers: ModifierState,
}

impl BuilderContext {
    /// Start building a slot. `is_key` selects the two-half form.
    pub fn new(is_key: bool) -> Self {
        Self {
            is_key,
            press: StrokeSequence::new(),
            release: StrokeSequence::new(),
            in_release_half: false,
            awaiting_first_release_tap: false,
            ordinary: None,
            modifiers: ModifierState::default(),
        }
    }

    /// Feed one token.
    pub fn push(&mut self, token: StrokeToken) -> Result<(), BuildError> {
        match token {
            StrokeToken::Tap(sym) => self.tap(sym),
            StrokeToken::Down(sym) => {
                self.emit(StrokeOp::press(sym));
                self.modifiers.mark(sym, ModifierMark::Down);
            }
            StrokeToken::Up(sym) => {
                self.emit(StrokeOp::release(sym));
                self.modifiers.mark(sym, ModifierMark::Released);
            }
            StrokeToken::Hold(sym) => {
                self.emit(StrokeOp::press(sym));
                self.modifiers.mark(sym, ModifierMark::Held);
            }
            StrokeToken::Release => {
                if !self.is_key {
                    return Err(BuildError::ReleaseOnNonKey);
                }
                self.enter_release_half();
            }
        }
        Ok(())
    }

    /// Feed every printable character of `text` as a tap.
    pub fn push_str(&mut self, text: &str) {
        for sym in text.chars().filter_map(Symbol::from_char) {
            self.tap(sym);
        }
    }

    /// Finish the slot, releasing everything still down.
    pub fn finish(mut self) -> BuiltSequence {
        if self.is_key {
            self.enter_release_half();
        }
        self.release_modifiers(true);
        self.release_ordinary();

        if self.is_key {
            BuiltSequence::Key {
                press: self.press,
                release: self.release,
            }
        } else {
            BuiltSequence::Single(self.press)
        }
    }

    fn emit(&mut self, op: StrokeOp) {
        if self.in_release_half {
            self.release.push(op);
        } else {
            self.press.push(op);
        }
    }

    fn tap(&mut self, sym: Symbol) {
        self.release_ordinary();
        if self.awaiting_first_release_tap {
            self.repress_pending();
            self.awaiting_first_release_tap = false;
        }
        self.emit(StrokeOp::press(sym));
        self.ordinary = Some(sym);
    }

    fn enter_release_half(&mut self) {
        self.release_modifiers(false);
        self.in_release_half = true;
        self.release_ordinary();
        self.awaiting_first_release_tap = true;
    }

    fn release_ordinary(&mut self) {
        if let Some(sym) = self.ordinary.take() {
            self.emit(StrokeOp::release(sym));
        }
    }

    /// Release `Down` modifiers (they become pending re-press), and `Held`
    /// ones too when `include_held` is set.
    fn release_modifiers(&mut self, include_held: bool) {
        for i in 0..self.modifiers.order.len() {
            let sym = self.modifiers.order[i];
            let next = match self.modifiers.get(sym) {
                Some(ModifierMark::Down) => ModifierMark::PendingRepress,
                Some(ModifierMark::Held) if include_held => ModifierMark::Released,
                _ => continue,
            };
            self.emit(StrokeOp::release(sym));
            self.modifiers.mark(sym, next);
        }
    }

    fn repress_pending(&mut self) {
        for i in 0..self.modifiers.order.len() {
            let sym = self.modifiers.order[i];
            if self.modifiers.get(sym) == Some(ModifierMark::PendingRepress) {
                self.emit(StrokeOp::press(sym));
                self.modifiers.mark(sym, ModifierMark::Down);
            }
        }
    }
}

/// Build a whole token stream in one go. `RELEASE` on non-key slots is skipped.
pub fn build(is_key: bool, tokens: impl IntoIterator<Item = StrokeToken>) -> BuiltSequence {
    let mut ctx = BuilderContext::new(is_key);
    for token in tokens {
        let _ = ctx.push(token);
    }
    ctx.finish()
}
