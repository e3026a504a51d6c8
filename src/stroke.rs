//! Stroke operations and sequences.

use crate::keysym::Symbol;
use std::fmt;

/// Whether a stroke presses or releases its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeAction {
    Press,
    Release,
}

impl StrokeAction {
    pub fn is_press(self) -> bool {
        matches!(self, StrokeAction::Press)
    }
}

/// A single press or release of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeOp {
    pub symbol: Symbol,
    pub action: StrokeAction,
}

impl StrokeOp {
    pub fn press(symbol: Symbol) -> Self {
        Self {
            symbol,
            action: StrokeAction::Press,
        }
    }

    pub fn release(symbol: Symbol) -> Self {
        Self {
            symbol,
            action: StrokeAction::Release,
        }
    }
}

impl fmt::Display for StrokeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.action.is_press() { 'D' } else { 'U' };
        write!(f, "{}/{}", self.symbol, marker)
    }
}

/// Ordered list of stroke operations bound to a slot.
///
/// Append-only while it is being built; order is significant and is
/// preserved exactly when the sequence is emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrokeSequence {
    ops: Vec<StrokeOp>,
}

impl StrokeSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: StrokeOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[StrokeOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StrokeOp> {
        self.ops.iter()
    }
}

impl From<Vec<StrokeOp>> for StrokeSequence {
    fn from(ops: Vec<StrokeOp>) -> Self {
        Self { ops }
    }
}

impl<'a> IntoIterator for &'a StrokeSequence {
    type Item = &'a StrokeOp;
    type IntoIter = std::slice::Iter<'a, StrokeOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// Space-separated `XK_name/D XK_name/U` listing, as printed by the debug traces.
impl fmt::Display for StrokeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}
