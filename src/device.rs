//! Input device access.
//!
//! Opens the ShuttlePro event node with evdev, grabs it exclusively so the
//! desktop does not also see its raw events, and converts evdev events to
//! [`RawEvent`]s.

use crate::dispatch::{EventKind, RawEvent};
use crate::error::DeviceError;
use evdev::{Device, EventType, InputEvent};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory scanned for devices when none is given.
pub const BY_ID_DIR: &str = "/dev/input/by-id";
/// Name prefix of ShuttlePro (v1 and v2) nodes under [`BY_ID_DIR`].
pub const NAME_PREFIX: &str = "usb-Contour_Design_Shuttle";
/// Marker for event (not joystick/mouse) interfaces.
pub const EVENT_MARKER: &str = "-event-if";

/// Find the first ShuttlePro event node.
pub fn discover() -> Result<PathBuf, DeviceError> {
    discover_in(Path::new(BY_ID_DIR))
}

/// [`discover`] in an arbitrary directory; candidates are tried in name order.
pub fn discover_in(dir: &Path) -> Result<PathBuf, DeviceError> {
    let not_found = || DeviceError::NotFound(dir.display().to_string());
    let entries = std::fs::read_dir(dir).map_err(|_| not_found())?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(NAME_PREFIX) && name.contains(EVENT_MARKER)
        })
        .map(|entry| entry.path())
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or_else(not_found)
}

/// Translate an evdev event. Sync and misc reports yield `None`.
pub fn raw_event(event: &InputEvent) -> Option<RawEvent> {
    let kind = match event.event_type() {
        EventType::SYNCHRONIZATION | EventType::MISC => return None,
        EventType::KEY => EventKind::Key,
        EventType::RELATIVE => EventKind::JogShuttle,
        other => EventKind::Other(other.0),
    };
    Some(RawEvent {
        kind,
        code: event.code(),
        value: event.value(),
    })
}

/// An opened, exclusively grabbed ShuttlePro.
pub struct ShuttleDevice {
    path: PathBuf,
    device: Device,
}

impl ShuttleDevice {
    /// Open and grab the device at `path`.
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let mut device = Device::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        device.grab().map_err(|source| DeviceError::Grab {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Opened {} ({})",
            path.display(),
            device.name().unwrap_or("unnamed device")
        );
        Ok(Self {
            path: path.to_path_buf(),
            device,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the device reports events and return them in order.
    pub fn read_events(&mut self) -> Result<Vec<RawEvent>, DeviceError> {
        let events = self.device.fetch_events().map_err(DeviceError::Read)?;
        let raw: Vec<RawEvent> = events.filter_map(|e| raw_event(&e)).collect();
        debug!("Read {} events", raw.len());
        Ok(raw)
    }
}
