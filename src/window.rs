//! Focused window lookup on X11.
//!
//! The focused window is often an unnamed child of the application's
//! top-level window, so the tree is walked upwards to the first window
//! that carries a `WM_NAME`. Results are cached per focused window id.

use crate::dispatch::{FocusedWindow, WindowFocus};
use crate::error::WindowError;
use tracing::warn;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

/// Longest property value read, in 32-bit units.
const PROPERTY_LENGTH: u32 = 1024;

/// Focus values that are not real windows (`None` and `PointerRoot`).
const NO_WINDOW: [Window; 2] = [x11rb::NONE, 1];

pub struct X11Focus {
    conn: RustConnection,
    cached: Option<(Window, Option<FocusedWindow>)>,
}

impl X11Focus {
    /// Connect to the display named by `$DISPLAY`.
    pub fn connect() -> Result<Self, WindowError> {
        let (conn, _screen) = x11rb::connect(None)?;
        Ok(Self { conn, cached: None })
    }

    fn input_focus(&self) -> Result<Window, WindowError> {
        Ok(self.conn.get_input_focus()?.reply()?.focus)
    }

    /// Raw property bytes, `None` if the window lacks the property.
    fn property(&self, window: Window, atom: AtomEnum) -> Result<Option<Vec<u8>>, WindowError> {
        let reply = self
            .conn
            .get_property(false, window, atom, AtomEnum::ANY, 0, PROPERTY_LENGTH)?
            .reply()?;
        if reply.type_ == x11rb::NONE {
            return Ok(None);
        }
        Ok(Some(reply.value))
    }

    fn describe(&self, window: Window) -> Result<Option<FocusedWindow>, WindowError> {
        let Some(name) = self.property(window, AtomEnum::WM_NAME)? else {
            return Ok(None);
        };
        // WM_CLASS holds "instance\0class\0"; the instance name is reported.
        let class = self.property(window, AtomEnum::WM_CLASS)?.and_then(|bytes| {
            bytes
                .split(|&b| b == 0)
                .find(|part| !part.is_empty())
                .map(|part| String::from_utf8_lossy(part).into_owned())
        });
        Ok(Some(FocusedWindow {
            title: String::from_utf8_lossy(&name).into_owned(),
            class,
        }))
    }

    /// First window from `window` up to (not including) the root that has a title.
    fn walk(&self, mut window: Window) -> Result<Option<FocusedWindow>, WindowError> {
        loop {
            if NO_WINDOW.contains(&window) {
                return Ok(None);
            }
            if let Some(found) = self.describe(window)? {
                return Ok(Some(found));
            }
            let tree = self.conn.query_tree(window)?.reply()?;
            if tree.parent == x11rb::NONE || tree.parent == tree.root {
                return Ok(None);
            }
            window = tree.parent;
        }
    }
}

impl WindowFocus for X11Focus {
    fn focused_window(&mut self) -> Option<FocusedWindow> {
        let focus = match self.input_focus() {
            Ok(focus) => focus,
            Err(e) => {
                warn!("Focus query failed: {}", e);
                return None;
            }
        };
        if let Some((id, window)) = &self.cached {
            if *id == focus {
                return window.clone();
            }
        }

        let window = self.walk(focus).unwrap_or_else(|e| {
            warn!("Window lookup failed for 0x{:x}: {}", focus, e);
            None
        });
        self.cached = Some((focus, window.clone()));
        window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires an X server (run with: cargo test -- --ignored)
    fn test_focused_window_is_cached() {
        let mut focus = X11Focus::connect().unwrap();
        let first = focus.focused_window();
        assert_eq!(focus.focused_window(), first);
        assert!(focus.cached.is_some());
    }
}
