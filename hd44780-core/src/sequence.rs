//! Power-on initialisation sequence
//!
//! The controller may come up in 8-bit mode, or half-way through a nibble
//! pair from an earlier session. The 8-bit function set realigns it, the
//! bare nibble switches it to 4-bit mode, and only then is the real
//! function set interpreted correctly. Each step must complete before the
//! next one is sent.

use crate::config::DriverConfig;
use crate::control::DisplayControl;
use crate::instruction::{
    Nibble, BOOTSTRAP_FUNCTION_SET, CLEAR_DISPLAY, FUNCTION_SET_4BIT_2LINE, RETURN_HOME,
    SWITCH_TO_4BIT,
};

/// Number of steps in the initialisation sequence
pub const INIT_STEPS: usize = 7;

/// One step of the initialisation sequence (always the instruction register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStep {
    /// Full instruction, sent as a nibble pair
    Byte { value: u8, settle_us: u32 },
    /// Single bare nibble
    Nibble { value: Nibble, settle_us: u32 },
}

impl InitStep {
    /// Settle delay after this step (µs)
    pub const fn settle_us(&self) -> u32 {
        match self {
            InitStep::Byte { settle_us, .. } | InitStep::Nibble { settle_us, .. } => *settle_us,
        }
    }
}

/// Initialisation steps for `config`, in the order they must be sent
pub fn init_sequence(config: &DriverConfig) -> [InitStep; INIT_STEPS] {
    let timing = &config.timing;
    [
        InitStep::Byte {
            value: BOOTSTRAP_FUNCTION_SET,
            settle_us: timing.bootstrap_settle_us,
        },
        InitStep::Nibble {
            value: SWITCH_TO_4BIT,
            settle_us: timing.bootstrap_settle_us,
        },
        InitStep::Byte {
            value: FUNCTION_SET_4BIT_2LINE,
            settle_us: timing.instruction_settle_us,
        },
        InitStep::Byte {
            value: DisplayControl::DISPLAY_ONLY.instruction(),
            settle_us: timing.instruction_settle_us,
        },
        InitStep::Byte {
            value: CLEAR_DISPLAY,
            settle_us: timing.clear_settle_us,
        },
        InitStep::Byte {
            value: config.entry_mode.instruction(),
            settle_us: timing.instruction_settle_us,
        },
        InitStep::Byte {
            value: RETURN_HOME,
            settle_us: timing.clear_settle_us,
        },
    ]
}
