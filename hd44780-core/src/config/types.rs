//! Configuration type definitions
//!
//! Plain data with conservative defaults for a 20x4 panel. Timing values
//! substitute for polling the busy flag, which the write-only bus cannot
//! read.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shortest settle the controller needs after clear / return home (µs)
pub const MIN_CLEAR_SETTLE_US: u32 = 10_000;

/// Widest row the controller can address
pub const MAX_COLUMNS: u8 = 40;

/// Most rows the address table covers
pub const MAX_ROWS: u8 = 4;

/// DDRAM capacity in characters
const DDRAM_CHARS: u16 = 80;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Columns or rows are zero or beyond the controller's limits
    InvalidGeometry,
    /// Clear/home settle shorter than [`MIN_CLEAR_SETTLE_US`]
    ClearSettleTooShort,
    /// Enable pulse of zero length
    InvalidEnablePulse,
}

/// Visible panel size in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    pub columns: u8,
    pub rows: u8,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 4,
        }
    }
}

impl Geometry {
    /// 16x2 panel
    pub const LCD1602: Self = Self {
        columns: 16,
        rows: 2,
    };

    /// 20x4 panel
    pub const LCD2004: Self = Self {
        columns: 20,
        rows: 4,
    };

    fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::InvalidGeometry);
        }
        if self.columns > MAX_COLUMNS || self.rows > MAX_ROWS {
            return Err(ConfigError::InvalidGeometry);
        }
        if u16::from(self.columns) * u16::from(self.rows) > DDRAM_CHARS {
            return Err(ConfigError::InvalidGeometry);
        }
        Ok(())
    }
}

/// Bus timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    /// Enable high time (ns)
    pub enable_pulse_ns: u32,
    /// Settle after ordinary instructions and data writes (µs)
    pub instruction_settle_us: u32,
    /// Settle after clear and return home (µs)
    pub clear_settle_us: u32,
    /// Settle after the 8-bit bootstrap and the bare 4-bit switch (µs)
    pub bootstrap_settle_us: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            enable_pulse_ns: 1_000,
            instruction_settle_us: 50,
            clear_settle_us: MIN_CLEAR_SETTLE_US,
            bootstrap_settle_us: 5_000,
        }
    }
}

/// Entry mode applied during initialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntryMode {
    /// Advance the address after each write
    pub increment: bool,
    /// Shift the display instead of the cursor
    pub shift: bool,
}

impl Default for EntryMode {
    fn default() -> Self {
        Self {
            increment: true,
            shift: false,
        }
    }
}

impl EntryMode {
    /// Entry mode set instruction
    pub const fn instruction(self) -> u8 {
        crate::instruction::entry_mode(self.increment, self.shift)
    }
}

/// What a transaction fault does to the rest of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultPolicy {
    /// Report the fault to its own request and keep going
    #[default]
    Continue,
    /// Refuse new requests until the next attach
    Degrade,
}

/// Complete driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    pub geometry: Geometry,
    pub timing: Timing,
    pub entry_mode: EntryMode,
    pub fault_policy: FaultPolicy,
}

impl DriverConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.geometry.validate()?;
        if self.timing.clear_settle_us < MIN_CLEAR_SETTLE_US {
            return Err(ConfigError::ClearSettleTooShort);
        }
        if self.timing.enable_pulse_ns == 0 {
            return Err(ConfigError::InvalidEnablePulse);
        }
        Ok(())
    }
}
