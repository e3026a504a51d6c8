//! Event dispatch: raw device event in, stroke operations out.
//!
//! The dispatcher owns the collaborators it needs for one event:
//!
//! - a [`TableSource`] that may reload the rules before each lookup,
//! - a [`WindowFocus`] that names the focused window,
//! - an [`OutputSink`] that performs the synthesized strokes.
//!
//! Jog and shuttle samples go through the [`SignalInterpreter`] first.

use crate::config::{Compiled, ConfigLoader, DebugFlags};
use crate::error::{DispatchError, OutputError};
use crate::signal::SignalInterpreter;
use crate::slot::{Slot, NUM_KEYS};
use crate::stroke::StrokeOp;
use crate::table::TranslationTable;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Event code of the first key; key `n` reports `KEY_CODE_BASE + n - 1`.
pub const KEY_CODE_BASE: u16 = 256;
/// Jog dial code within jog/shuttle events.
pub const JOG_CODE: u16 = 7;
/// Shuttle ring code within jog/shuttle events.
pub const SHUTTLE_CODE: u16 = 8;

/// Window text used when the focused window has no title.
pub const UNLABELED_WINDOW: &str = "-- Unlabeled Window --";

/// Kind of a raw device event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Key,
    JogShuttle,
    /// Any other event type, carrying the raw type number.
    Other(u16),
}

/// One raw record from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    /// Key `number` (1-based) pressed or released.
    pub fn key(number: u8, pressed: bool) -> Self {
        Self {
            kind: EventKind::Key,
            code: KEY_CODE_BASE + u16::from(number) - 1,
            value: i32::from(pressed),
        }
    }

    pub fn jog(value: i32) -> Self {
        Self {
            kind: EventKind::JogShuttle,
            code: JOG_CODE,
            value,
        }
    }

    pub fn shuttle(value: i32) -> Self {
        Self {
            kind: EventKind::JogShuttle,
            code: SHUTTLE_CODE,
            value,
        }
    }
}

/// Identifying text of the focused window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedWindow {
    /// Window title, matched against section patterns.
    pub title: String,
    pub class: Option<String>,
}

/// Source of the focused window's identity.
pub trait WindowFocus {
    /// `None` when no titled window has focus or the query failed.
    fn focused_window(&mut self) -> Option<FocusedWindow>;
}

/// No window system available: every window is unlabeled.
impl<W: WindowFocus> WindowFocus for Option<W> {
    fn focused_window(&mut self) -> Option<FocusedWindow> {
        self.as_mut()?.focused_window()
    }
}

/// Receiver of synthesized strokes.
pub trait OutputSink {
    /// Perform one operation immediately.
    fn emit(&mut self, op: StrokeOp) -> Result<(), OutputError>;

    /// Called after each complete sequence.
    fn flush(&mut self) -> Result<(), OutputError>;
}

/// Provider of the current translation table.
pub trait TableSource {
    /// Reload if the backing rules changed. Returns `true` on reload.
    fn refresh(&mut self) -> bool;

    fn table(&self) -> &TranslationTable;

    fn debug(&self) -> DebugFlags;

    /// Changes whenever [`table`](Self::table) is replaced.
    fn generation(&self) -> u64;
}

impl TableSource for ConfigLoader {
    fn refresh(&mut self) -> bool {
        ConfigLoader::refresh(self)
    }

    fn table(&self) -> &TranslationTable {
        ConfigLoader::table(self)
    }

    fn debug(&self) -> DebugFlags {
        ConfigLoader::debug(self)
    }

    fn generation(&self) -> u64 {
        ConfigLoader::generation(self)
    }
}

/// A fixed, already compiled rule set.
impl TableSource for Compiled {
    fn refresh(&mut self) -> bool {
        false
    }

    fn table(&self) -> &TranslationTable {
        &self.table
    }

    fn debug(&self) -> DebugFlags {
        self.debug
    }

    fn generation(&self) -> u64 {
        0
    }
}

/// Records every operation; flushes are no-ops.
impl OutputSink for Vec<StrokeOp> {
    fn emit(&mut self, op: StrokeOp) -> Result<(), OutputError> {
        self.push(op);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

/// Routes device events through the translation table to the output sink.
pub struct Dispatcher<T, W, O> {
    tables: T,
    window: W,
    output: O,
    signal: SignalInterpreter,
    /// Window text and table generation of the last traced selection.
    last_context: Option<(String, u64)>,
}

impl<T: TableSource, W: WindowFocus, O: OutputSink> Dispatcher<T, W, O> {
    pub fn new(tables: T, window: W, output: O) -> Self {
        Self {
            tables,
            window,
            output,
            signal: SignalInterpreter::new(),
            last_context: None,
        }
    }

    pub fn tables(&self) -> &T {
        &self.tables
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Translate one raw event and send the resulting strokes.
    ///
    /// `now` is the arrival time, used for shuttle-center inference.
    pub fn handle_event(&mut self, event: RawEvent, now: Instant) -> Result<(), DispatchError> {
        self.tables.refresh();
        let focused = self.window.focused_window();
        let (title, class) = match &focused {
            Some(w) => (w.title.as_str(), w.class.as_deref()),
            None => (UNLABELED_WINDOW, None),
        };

        let table = self.tables.table();
        let flags = self.tables.debug();
        let section = table.select(title);

        if flags.regex {
            let context = (title.to_string(), self.tables.generation());
            if self.last_context.as_ref() != Some(&context) {
                let class = class.unwrap_or("(null)");
                match section {
                    Some(s) => info!("translation: {} for {} (class {})", s.name(), title, class),
                    None => info!("no translation found for {} (class {})", title, class),
                }
                self.last_context = Some(context);
            }
        }

        // Increments bound only in the default section still ratchet.
        let is_bound = |slot: Slot| table.lookup(section, slot).is_some();
        let slots = match event.kind {
            EventKind::Key => key_slots(event.code, event.value),
            EventKind::JogShuttle => match event.code {
                JOG_CODE => self.signal.jog(event.value, now, is_bound),
                SHUTTLE_CODE => self.signal.shuttle(event.value, now, is_bound),
                code => {
                    warn!("jogshuttle({}, {}) invalid code", code, event.value);
                    Vec::new()
                }
            },
            EventKind::Other(kind) => {
                warn!("Ignoring event of type {} (code {})", kind, event.code);
                Vec::new()
            }
        };

        for slot in slots {
            let Some(sequence) = table.lookup(section, slot) else {
                debug!("{} unbound", slot);
                continue;
            };
            if flags.keys {
                info!("{}: {}", slot, sequence);
            }
            for op in sequence {
                self.output.emit(*op)?;
            }
            self.output.flush()?;
        }

        Ok(())
    }
}

/// Slot for a key event; autorepeat and out-of-range codes give none.
fn key_slots(code: u16, value: i32) -> Vec<Slot> {
    let number = code
        .checked_sub(KEY_CODE_BASE)
        .map(|offset| offset + 1)
        .filter(|&n| n <= u16::from(NUM_KEYS));
    let Some(number) = number else {
        warn!("key({}, {}) out of range", code, value);
        return Vec::new();
    };
    let number = number as u8;
    match value {
        1 => vec![Slot::KeyDown(number)],
        0 => vec![Slot::KeyUp(number)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::compile;
    use crate::keysym::Symbol;

    struct FixedWindow(Option<&'static str>);

    impl WindowFocus for FixedWindow {
        fn focused_window(&mut self) -> Option<FocusedWindow> {
            self.0.map(|title| FocusedWindow {
                title: title.to_string(),
                class: None,
            })
        }
    }

    fn dispatcher(
        rules: &str,
        title: Option<&'static str>,
    ) -> Dispatcher<Compiled, FixedWindow, Vec<StrokeOp>> {
        let compiled = compile(rules, DebugFlags::default());
        Dispatcher::new(compiled, FixedWindow(title), Vec::new())
    }

    fn sym(c: char) -> Symbol {
        Symbol::from_char(c).unwrap()
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(key_slots(256, 1), vec![Slot::KeyDown(1)]);
        assert_eq!(key_slots(270, 0), vec![Slot::KeyUp(15)]);
        assert!(key_slots(271, 1).is_empty());
        assert!(key_slots(100, 1).is_empty());
        assert!(key_slots(256, 2).is_empty());
    }

    #[test]
    fn test_key_press_and_release() {
        let mut d = dispatcher("[]\nK1 a\n", Some("xterm"));
        let now = Instant::now();
        d.handle_event(RawEvent::key(1, true), now).unwrap();
        assert_eq!(d.output(), &vec![StrokeOp::press(sym('a'))]);
        d.handle_event(RawEvent::key(1, false), now).unwrap();
        assert_eq!(
            d.output(),
            &vec![StrokeOp::press(sym('a')), StrokeOp::release(sym('a'))]
        );
    }

    #[test]
    fn test_untitled_window_uses_placeholder() {
        let rules = "[Unlabeled] ^-- Unlabeled\nK2 u\n[]\nK2 d\n";
        let mut d = dispatcher(rules, None);
        d.handle_event(RawEvent::key(2, true), Instant::now()).unwrap();
        assert_eq!(d.output(), &vec![StrokeOp::press(sym('u'))]);
    }

    #[test]
    fn test_no_section_emits_nothing() {
        let mut d = dispatcher("[Emacs] emacs\nK1 a\n", Some("xterm"));
        d.handle_event(RawEvent::key(1, true), Instant::now()).unwrap();
        assert!(d.output().is_empty());
    }

    #[test]
    fn test_empty_binding_falls_through_to_default() {
        let rules = "[Editor] edit\nK1\nK2 RELEASE b\n[]\nK1 a\nK2 c\n";
        let mut d = dispatcher(rules, Some("edit"));
        let now = Instant::now();
        d.handle_event(RawEvent::key(1, true), now).unwrap();
        d.handle_event(RawEvent::key(2, true), now).unwrap();
        d.handle_event(RawEvent::key(2, false), now).unwrap();
        assert_eq!(
            d.output(),
            &vec![
                StrokeOp::press(sym('a')),
                StrokeOp::press(sym('c')),
                StrokeOp::press(sym('b')),
                StrokeOp::release(sym('b')),
            ]
        );
    }

    #[test]
    fn test_jog_dispatch() {
        let mut d = dispatcher("[]\nJR r\nJL l\n", Some("any"));
        let now = Instant::now();
        d.handle_event(RawEvent::jog(10), now).unwrap();
        assert!(d.output().is_empty());
        d.handle_event(RawEvent::jog(12), now).unwrap();
        let r = [StrokeOp::press(sym('r')), StrokeOp::release(sym('r'))];
        assert_eq!(d.output(), &[r, r].concat());
    }

    #[test]
    fn test_shuttle_increment_from_default() {
        let rules = "[Editor] edit\nS2 x\n[]\nIR i\n";
        let mut d = dispatcher(rules, Some("editor: edit"));
        d.handle_event(RawEvent::shuttle(2), Instant::now()).unwrap();
        let x = [StrokeOp::press(sym('x')), StrokeOp::release(sym('x'))];
        let i = [StrokeOp::press(sym('i')), StrokeOp::release(sym('i'))];
        assert_eq!(d.output(), &[x, i, i].concat());
    }

    #[test]
    fn test_invalid_codes_ignored() {
        let mut d = dispatcher("[]\nK1 a\n", Some("any"));
        let now = Instant::now();
        let bogus = RawEvent {
            kind: EventKind::JogShuttle,
            code: 9,
            value: 1,
        };
        d.handle_event(bogus, now).unwrap();
        let other = RawEvent {
            kind: EventKind::Other(4),
            code: 4,
            value: 1,
        };
        d.handle_event(other, now).unwrap();
        assert!(d.output().is_empty());
    }
}
