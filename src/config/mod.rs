//! Rule-file location, debug flags and hot reloading.
//!
//! The rule file is re-read whenever its modification time moves past the
//! one seen at the last load. A failed stat or read keeps the previous
//! table in place.

pub mod compiler;
pub mod tokenizer;

pub use compiler::{compile, Compiled, Diagnostic, DiagnosticKind};

use crate::error::ConfigError;
use crate::table::TranslationTable;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info};

/// Environment variable overriding the rule file location.
pub const CONFIG_ENV_VAR: &str = "SHUTTLE_CONFIG_FILE";

/// Rule file name in the home directory.
pub const DEFAULT_FILE_NAME: &str = ".shuttlerc";

/// Diagnostic trace categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    /// Section selection per window.
    pub regex: bool,
    /// Compiled sequences while loading.
    pub strokes: bool,
    /// Sequences sent per event.
    pub keys: bool,
}

impl DebugFlags {
    pub fn all() -> Self {
        Self {
            regex: true,
            strokes: true,
            keys: true,
        }
    }

    /// Parse category letters (`r`, `s`, `k`). An empty string enables all.
    pub fn from_letters(letters: &str) -> Result<Self, ConfigError> {
        if letters.is_empty() {
            return Ok(Self::all());
        }
        let mut flags = Self::default();
        for c in letters.chars() {
            match c {
                'r' => flags.regex = true,
                's' => flags.strokes = true,
                'k' => flags.keys = true,
                other => return Err(ConfigError::UnknownDebugCategory(other)),
            }
        }
        Ok(flags)
    }
}

/// Rule file path: explicit override, then `$SHUTTLE_CONFIG_FILE`, then `~/.shuttlerc`.
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_FILE_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

/// Owns the current translation table and reloads it when the file changes.
#[derive(Debug)]
pub struct ConfigLoader {
    path: PathBuf,
    base_debug: DebugFlags,
    last_modified: Option<SystemTime>,
    compiled: Compiled,
    generation: u64,
}

impl ConfigLoader {
    /// Create a loader. Nothing is read until the first [`refresh`](Self::refresh).
    pub fn new(path: impl Into<PathBuf>, base_debug: DebugFlags) -> Self {
        Self {
            path: path.into(),
            base_debug,
            last_modified: None,
            compiled: Compiled {
                debug: base_debug,
                ..Compiled::default()
            },
            generation: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recompile if the file is newer than the last load.
    ///
    /// Returns `true` when a new table was installed.
    pub fn refresh(&mut self) -> bool {
        let modified = match std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) if t == UNIX_EPOCH => UNIX_EPOCH + Duration::from_secs(1),
            Ok(t) => t,
            Err(e) => {
                error!("{}: {}", self.path.display(), e);
                return false;
            }
        };
        if self.last_modified.is_some_and(|last| modified <= last) {
            return false;
        }
        // Recorded before reading so an unreadable file is not retried on every event.
        self.last_modified = Some(modified);

        let source = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("{}: {}", self.path.display(), e);
                return false;
            }
        };

        self.compiled = compile(&String::from_utf8_lossy(&source), self.base_debug);
        self.generation += 1;
        info!(
            "Loaded {} translation sections from {} ({} problems)",
            self.compiled.table.sections().len(),
            self.path.display(),
            self.compiled.diagnostics.len()
        );
        true
    }

    pub fn table(&self) -> &TranslationTable {
        &self.compiled.table
    }

    /// Flags from the command line combined with the file's directives.
    pub fn debug(&self) -> DebugFlags {
        self.compiled.debug
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.compiled.diagnostics
    }

    /// Number of successful loads so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
