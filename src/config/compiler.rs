//! Rule-file compiler.
//!
//! Turns the text of a rule file into a [`TranslationTable`]. Problems in the
//! file never abort compilation: each one is logged, recorded as a
//! [`Diagnostic`], and the smallest enclosing unit (token, line or section)
//! is skipped.
//!
//! # Grammar
//!
//! ```text
//! # comment
//! [name] pattern          open a section matched against window titles
//! []                      open the default section (empty pattern)
//! K<1..15> tokens...      key press/release
//! S<-7..7> tokens...      absolute shuttle level
//! I<L|R>   tokens...      one shuttle ratchet step
//! J<L|R>   tokens...      one jog detent
//! DEBUG_REGEX             trace section selection
//! DEBUG_STROKES           trace compiled sequences
//! ```

use super::tokenizer::{tokenize_next, tokens, Delimiter};
use super::DebugFlags;
use crate::builder::{BuilderContext, BuiltSequence, StrokeToken};
use crate::keysym::Symbol;
use crate::slot::SlotDesignator;
use crate::table::{TranslationSection, TranslationTable};
use regex::Regex;
use std::fmt;
use tracing::{info, warn};

/// Category of a compile-time problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Unknown slot designator or index out of range.
    BadSlot,
    /// Slot already bound in the current section.
    DuplicateSlot,
    /// Section pattern failed to compile; the section is dropped.
    BadPattern,
    /// Symbol name not found.
    UnknownSymbol,
    /// Suffix other than `/D`, `/U` or `/H`.
    BadSuffix,
    /// `/` at the end of a line.
    MissingSuffix,
    /// `RELEASE` on a non-key slot.
    ReleaseOnNonKey,
    /// Slot definition outside any valid section.
    NoSection,
    /// A second default section replaced the first.
    DefaultReplaced,
}

/// A non-fatal problem found while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based line number.
    pub line: usize,
    /// Section the line belongs to, if any.
    pub section: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        if let Some(section) = &self.section {
            write!(f, "[{section}] ")?;
        }
        write!(f, "{}", self.message)
    }
}

/// Output of a compilation.
#[derive(Debug, Clone, Default)]
pub struct Compiled {
    pub table: TranslationTable,
    pub diagnostics: Vec<Diagnostic>,
    /// Debug flags in effect at the end of the file.
    pub debug: DebugFlags,
}

/// Compile rule-file text. `debug` holds the flags enabled before the
/// file's own `DEBUG_*` directives are seen.
pub fn compile(source: &str, debug: DebugFlags) -> Compiled {
    let mut compiler = Compiler {
        compiled: Compiled {
            debug,
            ..Compiled::default()
        },
        current: None,
        section_name: None,
        section_line: 0,
        line: 0,
    };

    for (i, line) in source.lines().enumerate() {
        compiler.line = i + 1;
        compiler.process_line(line);
    }
    compiler.close_section();
    compiler.compiled
}

struct Compiler {
    compiled: Compiled,
    /// Section being filled; `None` before the first header or after a bad one.
    current: Option<TranslationSection>,
    /// Name of the last header seen, kept for diagnostics even when dropped.
    section_name: Option<String>,
    /// Line of the header that opened `current`.
    section_line: usize,
    line: usize,
}

impl Compiler {
    fn report(&mut self, kind: DiagnosticKind, message: String) {
        self.report_at(self.line, kind, message);
    }

    fn report_at(&mut self, line: usize, kind: DiagnosticKind, message: String) {
        let diagnostic = Diagnostic {
            kind,
            line,
            section: self.section_name.clone(),
            message,
        };
        warn!("{}", diagnostic);
        self.compiled.diagnostics.push(diagnostic);
    }

    fn process_line(&mut self, line: &str) {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        if let Some(header) = line.strip_prefix('[') {
            self.open_section(header);
            return;
        }

        let Some((first, _, rest)) = tokenize_next(line) else {
            return;
        };
        match first {
            "DEBUG_REGEX" => self.compiled.debug.regex = true,
            "DEBUG_STROKES" => self.compiled.debug.strokes = true,
            _ => self.define_slot(first, rest),
        }
    }

    fn close_section(&mut self) {
        if let Some(section) = self.current.take() {
            let name = section.name().to_string();
            if self.compiled.table.push(section) {
                self.report_at(
                    self.section_line,
                    DiagnosticKind::DefaultReplaced,
                    format!("default section [{name}] replaces an earlier default section"),
                );
            }
        }
    }

    /// `[name] pattern`; `header` is the line after the opening bracket.
    fn open_section(&mut self, header: &str) {
        self.close_section();

        let (name, pattern) = match header.find(']') {
            Some(end) => (&header[..end], header[end + 1..].trim()),
            None => (header.trim_end(), ""),
        };
        self.section_name = Some(name.to_string());
        self.section_line = self.line;

        if self.compiled.debug.strokes {
            info!("------------------------ [{}] {}", name, pattern);
        }

        if pattern.is_empty() {
            self.current = Some(TranslationSection::new(name, None));
            return;
        }
        match Regex::new(pattern) {
            Ok(re) => self.current = Some(TranslationSection::new(name, Some(re))),
            Err(e) => self.report(
                DiagnosticKind::BadPattern,
                format!("error compiling pattern \"{pattern}\": {e}"),
            ),
        }
    }

    fn define_slot(&mut self, designator: &str, rest: &str) {
        let Some(section) = self.current.as_ref() else {
            self.report(
                DiagnosticKind::NoSection,
                format!("need to start translation section before defining key: {designator}"),
            );
            return;
        };
        let slot: SlotDesignator = match designator.parse() {
            Ok(slot) => slot,
            Err(e) => {
                self.report(DiagnosticKind::BadSlot, e.to_string());
                return;
            }
        };
        if section.is_bound(slot.primary_slot()) {
            self.report(
                DiagnosticKind::DuplicateSlot,
                format!("can't redefine key: {slot}"),
            );
            return;
        }

        let built = self.build_slot(slot, rest);
        self.bind(slot, built);
    }

    fn build_slot(&mut self, slot: SlotDesignator, rest: &str) -> BuiltSequence {
        let mut ctx = BuilderContext::new(slot.is_key());
        let mut tokens = tokens(rest);

        while let Some((token, delim)) = tokens.next() {
            if delim != Delimiter::Quote && token.starts_with('#') {
                break;
            }
            match delim {
                Delimiter::Quote => ctx.push_str(token),
                Delimiter::Slash => {
                    let Some((suffix, _)) = tokens.next().filter(|(s, _)| !s.starts_with('#'))
                    else {
                        self.report(
                            DiagnosticKind::MissingSuffix,
                            format!("{slot}: missing up/down modifier after {token}/"),
                        );
                        break;
                    };
                    let Some(sym) = self.resolve(slot, token) else {
                        continue;
                    };
                    let stroke = match suffix.chars().next().map(|c| c.to_ascii_uppercase()) {
                        Some('U') => StrokeToken::Up(sym),
                        Some('D') => StrokeToken::Down(sym),
                        Some('H') => StrokeToken::Hold(sym),
                        _ => {
                            self.report(
                                DiagnosticKind::BadSuffix,
                                format!("{slot}: invalid up/down modifier: {suffix}"),
                            );
                            StrokeToken::Down(sym)
                        }
                    };
                    self.push(&mut ctx, slot, stroke);
                }
                Delimiter::Whitespace | Delimiter::End => {
                    if token == "RELEASE" {
                        self.push(&mut ctx, slot, StrokeToken::Release);
                    } else if let Some(sym) = self.resolve(slot, token) {
                        self.push(&mut ctx, slot, StrokeToken::Tap(sym));
                    }
                }
            }
        }

        ctx.finish()
    }

    fn resolve(&mut self, slot: SlotDesignator, name: &str) -> Option<Symbol> {
        let sym = Symbol::from_name(name);
        if sym.is_none() {
            self.report(
                DiagnosticKind::UnknownSymbol,
                format!("{slot}: unrecognized KeySym: {name}"),
            );
        }
        sym
    }

    fn push(&mut self, ctx: &mut BuilderContext, slot: SlotDesignator, token: StrokeToken) {
        if let Err(e) = ctx.push(token) {
            self.report(DiagnosticKind::ReleaseOnNonKey, format!("{slot}: {e}"));
        }
    }

    fn bind(&mut self, slot: SlotDesignator, built: BuiltSequence) {
        let strokes = self.compiled.debug.strokes;
        let Some(section) = self.current.as_mut() else {
            return;
        };
        // Empty halves stay unbound so lookup falls through to the default section.
        match built {
            BuiltSequence::Key { press, release } => {
                if strokes {
                    info!("{}[D]: {}", slot, press);
                    info!("{}[U]: {}", slot, release);
                }
                if !press.is_empty() {
                    section.bind(slot.primary_slot(), press);
                }
                if let Some(release_slot) = slot.release_slot().filter(|_| !release.is_empty()) {
                    section.bind(release_slot, release);
                }
            }
            BuiltSequence::Single(seq) => {
                if strokes {
                    info!("{}: {}", slot, seq);
                }
                if !seq.is_empty() {
                    section.bind(slot.primary_slot(), seq);
                }
            }
        }
    }
}
