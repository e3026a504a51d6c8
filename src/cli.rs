//! Command-line interface

use clap::Parser;
use shuttlepro::config::DebugFlags;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "shuttlepro")]
#[command(about = "Translate ShuttlePro keys, jog and shuttle into keystrokes for the focused window")]
#[command(version)]
pub struct Cli {
    /// Rule file (default: $SHUTTLE_CONFIG_FILE or ~/.shuttlerc)
    #[arg(short = 'r', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug tracing: r = regex, s = strokes, k = keys; no letters enables all.
    /// Letters must be attached (-drk).
    #[arg(
        short = 'd',
        long = "debug",
        value_name = "rsk",
        num_args = 0..=1,
        default_missing_value = "",
        value_parser = DebugFlags::from_letters
    )]
    pub debug: Option<DebugFlags>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Event device to open (default: first ShuttlePro under /dev/input/by-id)
    pub device: Option<PathBuf>,
}
