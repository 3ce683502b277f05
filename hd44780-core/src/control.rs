//! Display control state
//!
//! The controller has no instruction to change a single display-control
//! bit, so the driver keeps the whole mask and re-sends it on every toggle.

use crate::instruction::{self, BLINK_ON, CURSOR_ON, DISPLAY_ON};

/// Display/cursor/blink mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayControl(u8);

impl DisplayControl {
    /// Everything off
    pub const OFF: Self = Self(0);

    /// Display on, cursor and blink off (state after initialisation)
    pub const DISPLAY_ONLY: Self = Self(DISPLAY_ON);

    /// Build from a raw mask; bits outside the 3-bit field are dropped
    pub const fn from_mask(mask: u8) -> Self {
        Self(mask & (DISPLAY_ON | CURSOR_ON | BLINK_ON))
    }

    /// Raw 3-bit mask
    pub const fn mask(self) -> u8 {
        self.0
    }

    /// Full "set display control" instruction for this mask
    pub const fn instruction(self) -> u8 {
        instruction::display_control(self.0)
    }

    pub const fn display(self) -> bool {
        self.0 & DISPLAY_ON != 0
    }

    pub const fn cursor(self) -> bool {
        self.0 & CURSOR_ON != 0
    }

    pub const fn blink(self) -> bool {
        self.0 & BLINK_ON != 0
    }

    /// Copy with the display bit set or cleared
    pub const fn with_display(self, on: bool) -> Self {
        self.with_bit(DISPLAY_ON, on)
    }

    /// Copy with the cursor bit set or cleared
    pub const fn with_cursor(self, on: bool) -> Self {
        self.with_bit(CURSOR_ON, on)
    }

    /// Copy with the blink bit set or cleared
    pub const fn with_blink(self, on: bool) -> Self {
        self.with_bit(BLINK_ON, on)
    }

    const fn with_bit(self, bit: u8, on: bool) -> Self {
        if on {
            Self(self.0 | bit)
        } else {
            Self(self.0 & !bit)
        }
    }
}
