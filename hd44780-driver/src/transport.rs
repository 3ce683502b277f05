//! Bus transport: one 4-bit nibble transaction at a time.
//!
//! [`BusTransport`] owns the seven bus lines and a delay provider. It has
//! no queueing of its own; [`TransactionQueue::run`](crate::TransactionQueue::run)
//! is its only caller once the driver is attached.

use embedded_hal::digital::PinState;
use embedded_hal_async::delay::DelayNs;
use hd44780_core::config::Timing;
use hd44780_core::{Nibble, RegisterSelect};
use hd44780_hal::{BusPinConfig, Line, LineProvider, LineRole};

use crate::error::{ConfigurationFault, TransactionFault};

/// The seven lines of a 4-bit HD44780 bus
pub struct BusLines<L> {
    pub register_select: L,
    pub read_write: L,
    pub enable: L,
    /// DB4..DB7, in that order
    pub data: [L; 4],
}

impl<L: Line> BusLines<L> {
    /// Claim all bus lines named by `pins` from `provider`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationFault::Pins`] for an invalid assignment and
    /// [`ConfigurationFault::MissingLine`] for the first pin the provider
    /// cannot supply.
    pub fn claim<P>(pins: &BusPinConfig, provider: &mut P) -> Result<Self, ConfigurationFault>
    where
        P: LineProvider<Line = L>,
    {
        pins.validate()?;

        let mut take = |role: LineRole, pin: u8| {
            provider
                .claim(pin)
                .ok_or(ConfigurationFault::MissingLine(role))
        };

        Ok(Self {
            register_select: take(LineRole::RegisterSelect, pins.register_select)?,
            read_write: take(LineRole::ReadWrite, pins.read_write)?,
            enable: take(LineRole::Enable, pins.enable)?,
            data: [
                take(LineRole::DATA[0], pins.data[0])?,
                take(LineRole::DATA[1], pins.data[1])?,
                take(LineRole::DATA[2], pins.data[2])?,
                take(LineRole::DATA[3], pins.data[3])?,
            ],
        })
    }
}

/// Nibble-level access to the bus
pub struct BusTransport<L, D> {
    lines: BusLines<L>,
    delay: D,
    /// Enable high time (ns)
    enable_pulse_ns: u32,
}

impl<L: Line, D: DelayNs> BusTransport<L, D> {
    /// Take ownership of the lines and drive them all low
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationFault::Line`] if any line refuses the write.
    pub async fn new(
        lines: BusLines<L>,
        delay: D,
        timing: &Timing,
    ) -> Result<Self, ConfigurationFault> {
        let mut bus = Self {
            lines,
            delay,
            enable_pulse_ns: timing.enable_pulse_ns,
        };
        bus.idle().await?;
        Ok(bus)
    }

    /// Perform one nibble transaction
    ///
    /// Resolves only after the enable falling edge has been applied and
    /// `settle_us` has elapsed. A failed line write aborts the transaction
    /// where it stands; nothing is retried.
    pub async fn send_nibble(
        &mut self,
        register: RegisterSelect,
        nibble: Nibble,
        settle_us: u32,
    ) -> Result<(), TransactionFault> {
        let rs = level(register.is_high());
        drive(&mut self.lines.register_select, LineRole::RegisterSelect, rs).await?;
        drive(&mut self.lines.read_write, LineRole::ReadWrite, PinState::Low).await?;

        // DB7 first
        for bit in (0..4u8).rev() {
            let line = &mut self.lines.data[usize::from(bit)];
            drive(line, LineRole::Data(4 + bit), level(nibble.bit(bit))).await?;
        }

        // Latch on the falling edge
        drive(&mut self.lines.enable, LineRole::Enable, PinState::Low).await?;
        drive(&mut self.lines.enable, LineRole::Enable, PinState::High).await?;
        self.delay.delay_ns(self.enable_pulse_ns).await;
        drive(&mut self.lines.enable, LineRole::Enable, PinState::Low).await?;

        if settle_us > 0 {
            self.delay.delay_us(settle_us).await;
        }
        Ok(())
    }

    /// Hand back the lines and the delay provider
    pub fn release(self) -> (BusLines<L>, D) {
        (self.lines, self.delay)
    }

    async fn idle(&mut self) -> Result<(), TransactionFault> {
        drive(&mut self.lines.enable, LineRole::Enable, PinState::Low).await?;
        drive(&mut self.lines.register_select, LineRole::RegisterSelect, PinState::Low).await?;
        drive(&mut self.lines.read_write, LineRole::ReadWrite, PinState::Low).await?;
        for (line, role) in self.lines.data.iter_mut().zip(LineRole::DATA) {
            drive(line, role, PinState::Low).await?;
        }
        Ok(())
    }
}

fn level(high: bool) -> PinState {
    if high {
        PinState::High
    } else {
        PinState::Low
    }
}

async fn drive<L: Line>(line: &mut L, role: LineRole, state: PinState) -> Result<(), TransactionFault> {
    line.set_level(state)
        .await
        .map_err(|e| TransactionFault::new(role, e))
}
