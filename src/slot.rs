//! Addressable binding points of a translation section.
//!
//! Every section exposes the same 49 slots: a press and a release half for
//! each of the 15 keys, one slot per absolute shuttle level, one shuttle
//! increment per direction and one jog detent per direction.

use std::fmt;
use std::str::FromStr;

/// Number of physical keys on the device.
pub const NUM_KEYS: u8 = 15;
/// Largest absolute shuttle level (levels run from `-MAX_SHUTTLE` to `MAX_SHUTTLE`).
pub const MAX_SHUTTLE: i8 = 7;
/// Number of addressable slots per section.
pub const SLOT_COUNT: usize = 2 * NUM_KEYS as usize + (2 * MAX_SHUTTLE as usize + 1) + 2 + 2;

const KEY_UP_BASE: usize = NUM_KEYS as usize;
const SHUTTLE_BASE: usize = 2 * NUM_KEYS as usize;
const INCREMENT_BASE: usize = SHUTTLE_BASE + 2 * MAX_SHUTTLE as usize + 1;
const JOG_BASE: usize = INCREMENT_BASE + 2;

/// Rotation direction of the jog dial or shuttle ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    fn offset(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }

    fn letter(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// One binding point.
///
/// Key numbers are 1-based (`KeyDown(1)` is the first key), shuttle
/// levels are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    KeyDown(u8),
    KeyUp(u8),
    Shuttle(i8),
    ShuttleIncrement(Direction),
    Jog(Direction),
}

impl Slot {
    /// Dense index in `0..SLOT_COUNT`, or `None` for an out-of-range key or level.
    pub fn index(self) -> Option<usize> {
        match self {
            Slot::KeyDown(k) if (1..=NUM_KEYS).contains(&k) => Some(k as usize - 1),
            Slot::KeyUp(k) if (1..=NUM_KEYS).contains(&k) => Some(KEY_UP_BASE + k as usize - 1),
            Slot::Shuttle(level) if (-MAX_SHUTTLE..=MAX_SHUTTLE).contains(&level) => {
                Some(SHUTTLE_BASE + (level + MAX_SHUTTLE) as usize)
            }
            Slot::ShuttleIncrement(dir) => Some(INCREMENT_BASE + dir.offset()),
            Slot::Jog(dir) => Some(JOG_BASE + dir.offset()),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::KeyDown(k) => write!(f, "K{k}[D]"),
            Slot::KeyUp(k) => write!(f, "K{k}[U]"),
            Slot::Shuttle(level) => write!(f, "S{level}"),
            Slot::ShuttleIncrement(dir) => write!(f, "I{}", dir.letter()),
            Slot::Jog(dir) => write!(f, "J{}", dir.letter()),
        }
    }
}

/// Slot designator at the start of a rule line.
///
/// A key designator addresses both the press and the release slot of
/// that key; every other designator addresses exactly one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotDesignator {
    Key(u8),
    Shuttle(i8),
    Increment(Direction),
    Jog(Direction),
}

impl SlotDesignator {
    /// True for `K` designators, the only ones with a release half.
    pub fn is_key(self) -> bool {
        matches!(self, SlotDesignator::Key(_))
    }

    /// Slot receiving the (first) sequence built for this designator.
    pub fn primary_slot(self) -> Slot {
        match self {
            SlotDesignator::Key(k) => Slot::KeyDown(k),
            SlotDesignator::Shuttle(level) => Slot::Shuttle(level),
            SlotDesignator::Increment(dir) => Slot::ShuttleIncrement(dir),
            SlotDesignator::Jog(dir) => Slot::Jog(dir),
        }
    }

    /// Slot receiving the release half, for key designators.
    pub fn release_slot(self) -> Option<Slot> {
        match self {
            SlotDesignator::Key(k) => Some(Slot::KeyUp(k)),
            _ => None,
        }
    }
}

impl fmt::Display for SlotDesignator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotDesignator::Key(k) => write!(f, "K{k}"),
            SlotDesignator::Shuttle(level) => write!(f, "S{level}"),
            SlotDesignator::Increment(dir) => write!(f, "I{}", dir.letter()),
            SlotDesignator::Jog(dir) => write!(f, "J{}", dir.letter()),
        }
    }
}

/// Error for an unknown or out-of-range slot designator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSlotError(pub String);

impl fmt::Display for ParseSlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bad key name: \"{}\"", self.0)
    }
}

impl std::error::Error for ParseSlotError {}

impl FromStr for SlotDesignator {
    type Err = ParseSlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSlotError(s.to_string());
        let mut chars = s.chars();
        let kind = chars.next().ok_or_else(err)?.to_ascii_uppercase();
        let rest = chars.as_str();

        match kind {
            'J' | 'I' => {
                let mut rest_chars = rest.chars();
                let dir = rest_chars
                    .next()
                    .and_then(Direction::from_letter)
                    .ok_or_else(err)?;
                if rest_chars.next().is_some() {
                    return Err(err());
                }
                Ok(if kind == 'J' {
                    SlotDesignator::Jog(dir)
                } else {
                    SlotDesignator::Increment(dir)
                })
            }
            'K' => {
                let k: i32 = rest.parse().map_err(|_| err())?;
                if !(1..=NUM_KEYS as i32).contains(&k) {
                    return Err(err());
                }
                Ok(SlotDesignator::Key(k as u8))
            }
            'S' => {
                let level: i32 = rest.parse().map_err(|_| err())?;
                if !(-(MAX_SHUTTLE as i32)..=MAX_SHUTTLE as i32).contains(&level) {
                    return Err(err());
                }
                Ok(SlotDesignator::Shuttle(level as i8))
            }
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_slots() -> Vec<Slot> {
        let mut slots = Vec::new();
        for k in 1..=NUM_KEYS {
            slots.push(Slot::KeyDown(k));
            slots.push(Slot::KeyUp(k));
        }
        for level in -MAX_SHUTTLE..=MAX_SHUTTLE {
            slots.push(Slot::Shuttle(level));
        }
        for dir in [Direction::Left, Direction::Right] {
            slots.push(Slot::ShuttleIncrement(dir));
            slots.push(Slot::Jog(dir));
        }
        slots
    }

    #[test]
    fn test_slot_indices_are_dense_and_unique() {
        let slots = all_slots();
        assert_eq!(slots.len(), SLOT_COUNT);
        assert_eq!(SLOT_COUNT, 49);
        let indices: HashSet<usize> = slots.iter().map(|s| s.index().unwrap()).collect();
        assert_eq!(indices.len(), SLOT_COUNT);
        assert!(indices.iter().all(|&i| i < SLOT_COUNT));
    }

    #[test]
    fn test_out_of_range_slots_have_no_index() {
        assert_eq!(Slot::KeyDown(0).index(), None);
        assert_eq!(Slot::KeyUp(16).index(), None);
        assert_eq!(Slot::Shuttle(8).index(), None);
        assert_eq!(Slot::Shuttle(-8).index(), None);
    }

    #[test]
    fn test_parse_designators() {
        assert_eq!("K1".parse(), Ok(SlotDesignator::Key(1)));
        assert_eq!("k15".parse(), Ok(SlotDesignator::Key(15)));
        assert_eq!("S-7".parse(), Ok(SlotDesignator::Shuttle(-7)));
        assert_eq!("s7".parse(), Ok(SlotDesignator::Shuttle(7)));
        assert_eq!("S0".parse(), Ok(SlotDesignator::Shuttle(0)));
        assert_eq!("IL".parse(), Ok(SlotDesignator::Increment(Direction::Left)));
        assert_eq!("ir".parse(), Ok(SlotDesignator::Increment(Direction::Right)));
        assert_eq!("jL".parse(), Ok(SlotDesignator::Jog(Direction::Left)));
        assert_eq!("JR".parse(), Ok(SlotDesignator::Jog(Direction::Right)));
    }

    #[test]
    fn test_parse_rejects_bad_designators() {
        for bad in ["", "K0", "K16", "S8", "S-8", "K", "Kx", "JX", "JLR", "X1", "K1a"] {
            assert!(bad.parse::<SlotDesignator>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn test_designator_slots() {
        let key = SlotDesignator::Key(3);
        assert!(key.is_key());
        assert_eq!(key.primary_slot(), Slot::KeyDown(3));
        assert_eq!(key.release_slot(), Some(Slot::KeyUp(3)));

        let jog = SlotDesignator::Jog(Direction::Right);
        assert!(!jog.is_key());
        assert_eq!(jog.primary_slot(), Slot::Jog(Direction::Right));
        assert_eq!(jog.release_slot(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Slot::KeyDown(4).to_string(), "K4[D]");
        assert_eq!(Slot::Shuttle(-3).to_string(), "S-3");
        assert_eq!(Slot::Jog(Direction::Left).to_string(), "JL");
        assert_eq!(SlotDesignator::Increment(Direction::Right).to_string(), "IR");
    }
}
