//! ShuttlePro key translator
//!
//! Main entry point and device read loop.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use shuttlepro::config::{self, ConfigLoader};
use shuttlepro::device::{self, ShuttleDevice};
use shuttlepro::dispatch::{Dispatcher, OutputSink, TableSource, WindowFocus};
use shuttlepro::output::{VirtualKeyboard, DEVICE_NAME};
use shuttlepro::window::X11Focus;
use shuttlepro::DeviceError;

use cli::Cli;

/// Pause before reopening a device that went away.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = config::resolve_path(cli.config)?;
    info!("Using rules from {}", config_path.display());
    let mut loader = ConfigLoader::new(config_path, cli.debug.unwrap_or_default());
    loader.refresh();

    let device_path = match cli.device {
        Some(path) => path,
        None => device::discover()
            .context("Is the ShuttlePro plugged in? Otherwise pass its event device")?,
    };

    let window = match X11Focus::connect() {
        Ok(focus) => Some(focus),
        Err(e) => {
            warn!("{}; all windows are treated as unlabeled", e);
            None
        }
    };

    let mut output = VirtualKeyboard::new(DEVICE_NAME)?;
    info!("Created virtual device: {}", DEVICE_NAME);
    if let Some(path) = output.device_path() {
        info!("Device path: {}", path.display());
    }

    let mut dispatcher = Dispatcher::new(loader, window, output);
    run(&device_path, &mut dispatcher)
}

/// Read and dispatch events forever, reopening the device when it goes away.
///
/// Only a failure to open the device the first time is fatal.
fn run<T, W, O>(path: &Path, dispatcher: &mut Dispatcher<T, W, O>) -> Result<()>
where
    T: TableSource,
    W: WindowFocus,
    O: OutputSink,
{
    let mut first_time = true;
    loop {
        let mut device = match ShuttleDevice::open(path) {
            Ok(device) => device,
            Err(e @ DeviceError::Grab { .. }) => {
                warn!("{}; retrying", e);
                thread::sleep(RECONNECT_DELAY);
                continue;
            }
            Err(e) if first_time => return Err(e.into()),
            Err(e) => {
                debug!("{}", e);
                thread::sleep(RECONNECT_DELAY);
                continue;
            }
        };
        first_time = false;

        info!("Entering main loop. Press Ctrl+C to exit.");
        loop {
            match device.read_events() {
                Ok(events) => {
                    for event in events {
                        if let Err(e) = dispatcher.handle_event(event, Instant::now()) {
                            error!("Failed to send strokes: {}", e);
                        }
                    }
                }
                Err(e) => {
                    warn!("{}: {}; waiting for it to come back", device.path().display(), e);
                    break;
                }
            }
        }

        drop(device);
        thread::sleep(RECONNECT_DELAY);
    }
}
