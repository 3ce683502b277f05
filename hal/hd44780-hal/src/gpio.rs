//! GPIO line abstractions
//!
//! Provides the output-line trait the bus transport drives, plus an adapter
//! that turns any `embedded-hal` output pin into a line.

use embedded_hal::digital::{self, OutputPin, PinState};

/// Which bus signal a line carries
///
/// Used to name the culprit when a line fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineRole {
    /// RS: low selects the instruction register, high the data register
    RegisterSelect,
    /// R/W: held low (write) at all times
    ReadWrite,
    /// E: data is latched on the falling edge
    Enable,
    /// One of DB4..DB7, identified by its bit number (4-7)
    Data(u8),
}

impl LineRole {
    /// Data line roles in bus order (DB4 first)
    pub const DATA: [LineRole; 4] = [
        LineRole::Data(4),
        LineRole::Data(5),
        LineRole::Data(6),
        LineRole::Data(7),
    ];
}

/// Digital output line
///
/// Setting a level is asynchronous: the returned future resolves once the
/// new level has physically taken effect on the wire. Implementations on
/// plain push-pull GPIO resolve immediately; slower transports (I/O
/// expanders, simulated buses) resolve when their write completes.
#[allow(async_fn_in_trait)]
pub trait Line {
    /// Error type for line writes
    type Error: digital::Error;

    /// Drive the line to `level` and wait until it has propagated
    async fn set_level(&mut self, level: PinState) -> Result<(), Self::Error>;

    /// Drive the line high
    async fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(PinState::High).await
    }

    /// Drive the line low
    async fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(PinState::Low).await
    }
}

/// Source of lines keyed by GPIO number
///
/// Board code implements this over its pin set so the driver can claim the
/// seven bus lines from a [`BusPinConfig`](crate::pins::BusPinConfig).
pub trait LineProvider {
    /// Line type handed out by this provider
    type Line: Line;

    /// Take ownership of the line on `pin`
    ///
    /// Returns `None` if the pin does not exist or was already claimed.
    fn claim(&mut self, pin: u8) -> Option<Self::Line>;
}

/// Push-pull GPIO line
///
/// Wraps an `embedded-hal` [`OutputPin`]. Register writes take effect
/// before `set_state` returns, so propagation is acknowledged immediately.
pub struct PushPull<P> {
    pin: P,
}

impl<P: OutputPin> PushPull<P> {
    /// Wrap an output pin
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Release the underlying pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Line for PushPull<P> {
    type Error = P::Error;

    async fn set_level(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.pin.set_state(level)
    }
}
