//! Error types
//!
//! Rule-file problems are not errors: they are reported as
//! [`Diagnostic`](crate::config::Diagnostic)s and the rest of the file
//! still compiles. The types here cover the environment around the
//! translation engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors resolving configuration inputs
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Debug category letter other than `r`, `s` or `k`
    #[error("Unknown debugging option '{0}', must be r, s or k")]
    UnknownDebugCategory(char),

    /// No explicit path, no environment override and no home directory
    #[error("Cannot locate the rule file: no home directory")]
    NoHomeDir,
}

/// Errors from the input device
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Opening the event node failed
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Exclusive grab was refused
    #[error("Failed to grab {path}: {source}")]
    Grab {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading events failed (usually the device went away)
    #[error("Failed to read events: {0}")]
    Read(#[source] std::io::Error),

    /// Auto-discovery found no candidate
    #[error("No shuttle device found in {0}")]
    NotFound(String),
}

/// Errors from the virtual output device
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),

    #[error("Failed to emit event: {0}")]
    EmitEvent(#[source] std::io::Error),
}

/// Errors talking to the X server
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Unable to open X display: {0}")]
    Connect(#[from] x11rb::errors::ConnectError),

    #[error("X connection error: {0}")]
    Connection(#[from] x11rb::errors::ConnectionError),

    #[error("X request failed: {0}")]
    Reply(#[from] x11rb::errors::ReplyError),
}

/// Errors while dispatching one device event
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}
