//! Jog dial and shuttle ring interpretation.
//!
//! The device has two reporting defects this module compensates for:
//!
//! - the jog dial reports an 8-bit wrapping *position*, and the position
//!   0 is never reported while passing through it;
//! - the shuttle ring never reports its return to center. The return shows
//!   up only as a jog event shortly afterwards, so a `Shuttle(0)` is
//!   synthesized when a jog sample arrives and the last shuttle sample was
//!   nonzero and older than [`SYNTHETIC_CENTER_DELAY`].
//!
//! The interpreter is a plain state machine. Time is passed in by the
//! caller and the "is this slot bound" question is answered by a callback,
//! so it never touches the clock or the translation table itself.

use crate::slot::{Direction, Slot, MAX_SHUTTLE};
use std::time::{Duration, Instant};
use tracing::warn;

/// Minimum age of the last nonzero shuttle sample before a jog event is
/// taken as evidence that the ring went back to center.
pub const SYNTHETIC_CENTER_DELAY: Duration = Duration::from_millis(5);

/// Stateful translator from raw jog/shuttle samples to slot events.
#[derive(Debug, Default)]
pub struct SignalInterpreter {
    jog: Option<u8>,
    shuttle: Option<i8>,
    last_shuttle: Option<Instant>,
    need_synthetic_center: bool,
}

impl SignalInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last jog position seen, `None` before the first sample.
    pub fn jog_position(&self) -> Option<u8> {
        self.jog
    }

    /// Current shuttle level, `None` before the first sample.
    pub fn shuttle_level(&self) -> Option<i8> {
        self.shuttle
    }

    /// Interpret a raw jog sample.
    ///
    /// Returns the slots to dispatch, in order. A synthesized `Shuttle(0)`
    /// (and its increments) comes first when the ring is inferred to have
    /// returned to center. The very first jog sample only records the
    /// position.
    pub fn jog(&mut self, raw: i32, now: Instant, is_bound: impl Fn(Slot) -> bool) -> Vec<Slot> {
        let mut slots = Vec::new();

        if self.need_synthetic_center {
            let elapsed = self
                .last_shuttle
                .map_or(Duration::MAX, |last| now.saturating_duration_since(last));
            if elapsed >= SYNTHETIC_CENTER_DELAY {
                slots.extend(self.shuttle(0, now, &is_bound));
                self.need_synthetic_center = false;
            }
        }

        let value = (raw & 0xff) as u8;
        if let Some(mut position) = self.jog {
            let direction = if value.wrapping_sub(position) & 0x80 != 0 {
                Direction::Left
            } else {
                Direction::Right
            };
            while position != value {
                // The driver never reports position 0, so no step starts there.
                if position != 0 {
                    slots.push(Slot::Jog(direction));
                }
                position = match direction {
                    Direction::Left => position.wrapping_sub(1),
                    Direction::Right => position.wrapping_add(1),
                };
            }
        }
        self.jog = Some(value);

        slots
    }

    /// Interpret a raw shuttle sample.
    ///
    /// On a level change the absolute `Shuttle(new)` slot comes first. If an
    /// increment is bound for the direction of travel, one
    /// `ShuttleIncrement` per step follows; otherwise the level jumps.
    /// Out-of-range samples are logged and ignored.
    pub fn shuttle(&mut self, raw: i32, now: Instant, is_bound: impl Fn(Slot) -> bool) -> Vec<Slot> {
        let max = i32::from(MAX_SHUTTLE);
        if !(-max..=max).contains(&raw) {
            warn!("shuttle({}) out of range", raw);
            return Vec::new();
        }
        let value = raw as i8;

        self.last_shuttle = Some(now);
        self.need_synthetic_center = value != 0;

        if self.shuttle == Some(value) {
            return Vec::new();
        }

        // Not yet initialized: assume center.
        let mut level = self.shuttle.unwrap_or(0);
        let direction = if value < level {
            Direction::Left
        } else {
            Direction::Right
        };

        let mut slots = vec![Slot::Shuttle(value)];
        let increment = Slot::ShuttleIncrement(direction);
        if is_bound(increment) {
            let step = if direction == Direction::Left { -1 } else { 1 };
            while level != value {
                slots.push(increment);
                level += step;
            }
        }
        self.shuttle = Some(value);

        slots
    }
}
