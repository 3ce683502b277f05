//! Bus pin assignment
//!
//! Maps the seven bus signals to GPIO numbers and catches conflicting or
//! malformed assignments before any line is claimed.

use crate::gpio::LineRole;

/// Highest GPIO count supported by the allocator bitmask
pub const GPIO_COUNT: u8 = 48;

/// Pin assignment errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin string could not be parsed
    Invalid(LineRole),
    /// GPIO number beyond [`GPIO_COUNT`]
    OutOfRange { role: LineRole, pin: u8 },
    /// GPIO already assigned to another bus line
    Duplicate { role: LineRole, pin: u8 },
}

/// GPIO allocator to track pin usage
pub struct PinAllocator {
    /// Bitmask of allocated GPIO pins
    allocated: u64,
}

impl Default for PinAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PinAllocator {
    /// Create an empty allocator
    pub const fn new() -> Self {
        Self { allocated: 0 }
    }

    /// Allocate `pin` for `role`
    pub fn allocate(&mut self, role: LineRole, pin: u8) -> Result<(), PinError> {
        if pin >= GPIO_COUNT {
            return Err(PinError::OutOfRange { role, pin });
        }
        let mask = 1u64 << pin;
        if self.allocated & mask != 0 {
            return Err(PinError::Duplicate { role, pin });
        }
        self.allocated |= mask;
        Ok(())
    }
}

/// Parse a pin string such as `"gpio11"`
///
/// Leading/trailing whitespace is ignored. Inversion (`!`) and pull-up
/// (`^`) markers are rejected: every bus line is a plain active-high
/// output.
pub fn parse_pin_string(s: &str) -> Option<u8> {
    let num_str = s.trim().strip_prefix("gpio")?;
    if num_str.is_empty() || !num_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let pin: u8 = num_str.parse().ok()?;
    if pin >= GPIO_COUNT {
        return None;
    }
    Some(pin)
}

/// GPIO numbers for the seven bus lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusPinConfig {
    /// RS line
    pub register_select: u8,
    /// R/W line
    pub read_write: u8,
    /// E line
    pub enable: u8,
    /// DB4..DB7, in that order
    pub data: [u8; 4],
}

impl BusPinConfig {
    /// Parse pin strings in the order RS, R/W, E, DB4, DB5, DB6, DB7
    ///
    /// The result is validated before it is returned.
    pub fn parse(pins: [&str; 7]) -> Result<Self, PinError> {
        let roles = Self::roles();
        let mut numbers = [0u8; 7];
        for ((slot, s), role) in numbers.iter_mut().zip(pins.iter()).zip(roles.iter()) {
            *slot = parse_pin_string(s).ok_or(PinError::Invalid(*role))?;
        }

        let config = Self {
            register_select: numbers[0],
            read_write: numbers[1],
            enable: numbers[2],
            data: [numbers[3], numbers[4], numbers[5], numbers[6]],
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every pin is in range and no pin is used twice
    pub fn validate(&self) -> Result<(), PinError> {
        let mut alloc = PinAllocator::new();
        for (role, pin) in self.assignments() {
            alloc.allocate(role, pin)?;
        }
        Ok(())
    }

    /// `(role, pin)` pairs in bus order
    pub fn assignments(&self) -> [(LineRole, u8); 7] {
        let roles = Self::roles();
        [
            (roles[0], self.register_select),
            (roles[1], self.read_write),
            (roles[2], self.enable),
            (roles[3], self.data[0]),
            (roles[4], self.data[1]),
            (roles[5], self.data[2]),
            (roles[6], self.data[3]),
        ]
    }

    fn roles() -> [LineRole; 7] {
        [
            LineRole::RegisterSelect,
            LineRole::ReadWrite,
            LineRole::Enable,
            LineRole::DATA[0],
            LineRole::DATA[1],
            LineRole::DATA[2],
            LineRole::DATA[3],
        ]
    }
}
