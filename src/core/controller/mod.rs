//! Host pad (16-bit shift-register controller)
//!
//! This module models the pad the adapter reads from: its button bit layout,
//! the snapshot produced by one read, and the [`HostReader`] that performs the
//! latch/clock/data protocol.
//!
//! # Wire Format
//!
//! One read shifts out 16 bits, most significant first:
//!
//! ```text
//! bit:  15 14  13     12    11 10   9    8    7 6 5 4  3-0
//!        B  Y  Select Start Up Down Left Right A X L R  (unused)
//! ```
//!
//! # Button Encoding
//!
//! Buttons use active-low encoding (0 = pressed, 1 = released), exactly as they
//! arrive on the data line. The unused low nibble reads as 1 on a real pad.

mod reader;

pub use reader::HostReader;

use crate::core::error::{AdapterError, Result};

bitflags::bitflags! {
    /// Host pad buttons, positioned at their bit in a raw snapshot
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SfcButtons: u16 {
        const B = 1 << 15;
        const Y = 1 << 14;
        const SELECT = 1 << 13;
        const START = 1 << 12;
        const UP = 1 << 11;
        const DOWN = 1 << 10;
        const LEFT = 1 << 9;
        const RIGHT = 1 << 8;
        const A = 1 << 7;
        const X = 1 << 6;
        const L = 1 << 5;
        const R = 1 << 4;
    }
}

impl SfcButtons {
    /// Parse a single button name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use sixpad::core::controller::SfcButtons;
    ///
    /// assert_eq!(SfcButtons::parse("left").unwrap(), SfcButtons::LEFT);
    /// assert!(SfcButtons::parse("turbo").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        const NAMES: [(&str, SfcButtons); 12] = [
            ("b", SfcButtons::B),
            ("y", SfcButtons::Y),
            ("select", SfcButtons::SELECT),
            ("start", SfcButtons::START),
            ("up", SfcButtons::UP),
            ("down", SfcButtons::DOWN),
            ("left", SfcButtons::LEFT),
            ("right", SfcButtons::RIGHT),
            ("a", SfcButtons::A),
            ("x", SfcButtons::X),
            ("l", SfcButtons::L),
            ("r", SfcButtons::R),
        ];

        let name = name.trim();
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, button)| button)
            .ok_or(AdapterError::UnknownButton)
    }

    /// Parse a comma separated list of button names
    ///
    /// An empty string yields no buttons.
    pub fn parse_list(list: &str) -> Result<Self> {
        list.split(',')
            .filter(|name| !name.trim().is_empty())
            .try_fold(SfcButtons::empty(), |acc, name| Ok(acc | Self::parse(name)?))
    }
}

/// One atomic read of the host pad
///
/// Stores the raw active-low word. A snapshot is never edited in place; the
/// next read replaces it wholesale.
///
/// # Examples
///
/// ```
/// use sixpad::core::controller::{ButtonSnapshot, SfcButtons};
///
/// let snapshot = ButtonSnapshot::from_pressed(SfcButtons::A | SfcButtons::UP);
/// assert!(snapshot.is_pressed(SfcButtons::A));
/// assert!(!snapshot.is_pressed(SfcButtons::B));
/// assert_eq!(ButtonSnapshot::RELEASED.raw(), 0xFFFF);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonSnapshot {
    /// Raw shifted word (active low: 0 = pressed, 1 = released)
    raw: u16,
}

impl ButtonSnapshot {
    /// Every button released
    pub const RELEASED: Self = Self { raw: 0xFFFF };

    /// Wrap a raw active-low word as read from the data line
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    /// Build a snapshot in which exactly `buttons` are pressed
    #[inline]
    pub const fn from_pressed(buttons: SfcButtons) -> Self {
        Self {
            raw: !buttons.bits(),
        }
    }

    /// Raw active-low word
    #[inline]
    pub const fn raw(self) -> u16 {
        self.raw
    }

    /// Set of pressed buttons
    #[inline]
    pub fn pressed(self) -> SfcButtons {
        SfcButtons::from_bits_truncate(!self.raw)
    }

    /// `true` if every button in `buttons` is pressed
    #[inline]
    pub const fn is_pressed(self, buttons: SfcButtons) -> bool {
        self.raw & buttons.bits() == 0
    }
}

impl Default for ButtonSnapshot {
    fn default() -> Self {
        Self::RELEASED
    }
}
