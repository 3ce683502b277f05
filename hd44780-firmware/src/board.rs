//! Board wiring
//!
//! LCD header pin assignment and a line provider over the RP2040 outputs
//! behind it.

use embassy_rp::gpio::Output;
use hd44780_hal::{LineProvider, PushPull};

/// LCD header, in the order RS, R/W, E, DB4, DB5, DB6, DB7
pub const LCD_PINS: [&str; 7] = [
    "gpio2", "gpio3", "gpio4", "gpio6", "gpio7", "gpio8", "gpio9",
];

/// One LCD bus line
pub type LcdLine = PushPull<Output<'static>>;

/// Outputs wired to the LCD header, claimable by GPIO number
pub struct BoardLines {
    slots: [(u8, Option<Output<'static>>); 7],
}

impl BoardLines {
    pub fn new(outputs: [(u8, Output<'static>); 7]) -> Self {
        Self {
            slots: outputs.map(|(pin, output)| (pin, Some(output))),
        }
    }
}

impl LineProvider for BoardLines {
    type Line = LcdLine;

    fn claim(&mut self, pin: u8) -> Option<LcdLine> {
        let (_, slot) = self.slots.iter_mut().find(|(n, _)| *n == pin)?;
        slot.take().map(PushPull::new)
    }
}
