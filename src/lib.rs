//! Contour ShuttlePro key translator
//!
//! Turns the keys, jog dial and shuttle ring of a ShuttlePro into
//! keystroke and mouse-button sequences. The sequences come from a rule
//! file with one section per application, chosen by the title of the
//! focused window.

pub mod builder;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod keysym;
pub mod output;
pub mod signal;
pub mod slot;
pub mod stroke;
pub mod table;
pub mod window;

pub use builder::{build, BuildError, BuilderContext, BuiltSequence, StrokeToken};
pub use config::{compile, Compiled, ConfigLoader, DebugFlags, Diagnostic, DiagnosticKind};
pub use dispatch::{
    Dispatcher, EventKind, FocusedWindow, OutputSink, RawEvent, TableSource, WindowFocus,
    UNLABELED_WINDOW,
};
pub use error::{ConfigError, DeviceError, DispatchError, OutputError, WindowError};
pub use keysym::Symbol;
pub use signal::SignalInterpreter;
pub use slot::{Direction, Slot, SlotDesignator};
pub use stroke::{StrokeAction, StrokeOp, StrokeSequence};
pub use table::{TranslationSection, TranslationTable};
