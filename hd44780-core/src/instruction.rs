//! HD44780 instruction set
//!
//! Opcodes, flag bits and the nibble framing used by the controller's
//! 4-bit bus mode. Every 8-bit value crosses the bus as two nibbles, high
//! first.

/// Clear display, cursor to address 0
pub const CLEAR_DISPLAY: u8 = 0x01;
/// Cursor to address 0, undo display shift
pub const RETURN_HOME: u8 = 0x02;
/// Entry mode set
pub const ENTRY_MODE_SET: u8 = 0x04;
/// Display on/off control
pub const DISPLAY_CONTROL: u8 = 0x08;
/// Cursor or display shift
pub const SHIFT: u8 = 0x10;
/// Function set
pub const FUNCTION_SET: u8 = 0x20;
/// Set CGRAM address
pub const SET_CGRAM_ADDRESS: u8 = 0x40;
/// Set DDRAM address
pub const SET_DDRAM_ADDRESS: u8 = 0x80;

/// Entry mode: increment address after each write
pub const ENTRY_INCREMENT: u8 = 0x02;
/// Entry mode: shift the display on each write
pub const ENTRY_SHIFT: u8 = 0x01;

/// Display control: display on
pub const DISPLAY_ON: u8 = 0x04;
/// Display control: underline cursor on
pub const CURSOR_ON: u8 = 0x02;
/// Display control: blinking block on
pub const BLINK_ON: u8 = 0x01;

/// Shift: move the display rather than the cursor
pub const SHIFT_DISPLAY: u8 = 0x08;
/// Shift: move right rather than left
pub const SHIFT_RIGHT: u8 = 0x04;

/// Function set: 8-bit interface
pub const FUNCTION_8BIT: u8 = 0x10;
/// Function set: two display lines
pub const FUNCTION_2LINE: u8 = 0x08;

/// 8-bit interface, 2 lines: resynchronises a controller left in any mode
pub const BOOTSTRAP_FUNCTION_SET: u8 = FUNCTION_SET | FUNCTION_8BIT | FUNCTION_2LINE;
/// Bare nibble that switches the controller to 4-bit mode
pub const SWITCH_TO_4BIT: Nibble = Nibble::new(FUNCTION_SET >> 4);
/// 4-bit interface, 2 lines
pub const FUNCTION_SET_4BIT_2LINE: u8 = FUNCTION_SET | FUNCTION_2LINE;

/// Number of user-definable glyphs in CGRAM
pub const CGRAM_SLOTS: u8 = 8;

/// Register a transaction addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSelect {
    /// Instruction register (RS low)
    Instruction,
    /// Data register (RS high)
    Data,
}

impl RegisterSelect {
    /// Logic level of the RS line
    pub const fn is_high(self) -> bool {
        matches!(self, RegisterSelect::Data)
    }
}

/// A 4-bit value as presented on DB4..DB7
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Nibble(u8);

impl Nibble {
    /// Create a nibble, masking off the upper four bits
    pub const fn new(value: u8) -> Self {
        Self(value & 0x0F)
    }

    /// Raw value (0-15)
    pub const fn value(self) -> u8 {
        self.0
    }

    /// State of data bit `n` of the nibble (0 = DB4, 3 = DB7)
    pub const fn bit(self, n: u8) -> bool {
        (self.0 >> n) & 1 != 0
    }
}

/// Split a byte into (high, low) nibbles
pub const fn split_byte(byte: u8) -> (Nibble, Nibble) {
    (Nibble::new(byte >> 4), Nibble::new(byte))
}

/// Entry mode set instruction
pub const fn entry_mode(increment: bool, shift: bool) -> u8 {
    let mut byte = ENTRY_MODE_SET;
    if increment {
        byte |= ENTRY_INCREMENT;
    }
    if shift {
        byte |= ENTRY_SHIFT;
    }
    byte
}

/// Display control instruction carrying the full 3-bit mask
pub const fn display_control(mask: u8) -> u8 {
    DISPLAY_CONTROL | (mask & (DISPLAY_ON | CURSOR_ON | BLINK_ON))
}

/// What a shift instruction moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftTarget {
    /// Move the cursor, leave the display
    Cursor,
    /// Scroll the whole display (DDRAM content is unchanged)
    Display,
}

/// Shift direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftDirection {
    Left,
    Right,
}

/// Cursor/display shift instruction
pub const fn shift(target: ShiftTarget, direction: ShiftDirection) -> u8 {
    let mut byte = SHIFT;
    if matches!(target, ShiftTarget::Display) {
        byte |= SHIFT_DISPLAY;
    }
    if matches!(direction, ShiftDirection::Right) {
        byte |= SHIFT_RIGHT;
    }
    byte
}

/// Set DDRAM address instruction (7-bit address)
pub const fn set_ddram_address(address: u8) -> u8 {
    SET_DDRAM_ADDRESS | (address & 0x7F)
}

/// Set CGRAM address instruction (6-bit address)
pub const fn set_cgram_address(address: u8) -> u8 {
    SET_CGRAM_ADDRESS | (address & 0x3F)
}

/// CGRAM address of the first row of glyph `slot`
pub const fn glyph_address(slot: u8) -> u8 {
    (slot & (CGRAM_SLOTS - 1)) << 3
}
