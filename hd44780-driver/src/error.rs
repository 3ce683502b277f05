//! Error types for the bus driver.
//!
//! Faults are split by when they surface: configuration faults stop
//! [`Hd44780::attach`](crate::Hd44780::attach) synchronously, transaction
//! faults travel to the failing request's notifier only, and enqueue errors
//! are returned to the submitter before anything reaches the bus.

use embedded_hal::digital::{self, ErrorKind};
use hd44780_core::{AddressError, ConfigError};
use hd44780_hal::{LineRole, PinError};

/// A line write failed during a nibble transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransactionFault {
    /// Line that refused the write
    pub line: LineRole,
    /// Error reported by the line
    pub kind: ErrorKind,
}

impl TransactionFault {
    pub(crate) fn new<E: digital::Error>(line: LineRole, error: E) -> Self {
        Self {
            line,
            kind: error.kind(),
        }
    }
}

/// Request rejected before reaching the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnqueueError {
    /// Not enough free slots for the whole request
    Full,
    /// The driver was detached; the runner is shutting down
    Detached,
    /// An earlier fault put the driver in degraded mode
    Degraded,
}

/// Attach could not produce a usable driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationFault {
    /// A line could not be claimed from the provider
    MissingLine(LineRole),
    /// Invalid or conflicting pin assignment
    Pins(PinError),
    /// Invalid driver configuration
    InvalidConfig(ConfigError),
    /// A line failed while idling the bus or during initialisation
    Line(TransactionFault),
    /// The queue refused an initialisation step
    Queue(EnqueueError),
}

impl From<PinError> for ConfigurationFault {
    fn from(e: PinError) -> Self {
        ConfigurationFault::Pins(e)
    }
}

impl From<ConfigError> for ConfigurationFault {
    fn from(e: ConfigError) -> Self {
        ConfigurationFault::InvalidConfig(e)
    }
}

impl From<TransactionFault> for ConfigurationFault {
    fn from(e: TransactionFault) -> Self {
        ConfigurationFault::Line(e)
    }
}

impl From<EnqueueError> for ConfigurationFault {
    fn from(e: EnqueueError) -> Self {
        ConfigurationFault::Queue(e)
    }
}

/// Errors returned by driver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Request could not be queued
    Enqueue(EnqueueError),
    /// A transaction the operation waited on failed
    Transaction(TransactionFault),
    /// Cursor position outside the configured panel
    InvalidPosition { column: u8, row: u8 },
    /// CGRAM slot beyond 7
    InvalidGlyphSlot(u8),
}

impl From<EnqueueError> for DriverError {
    fn from(e: EnqueueError) -> Self {
        DriverError::Enqueue(e)
    }
}

impl From<TransactionFault> for DriverError {
    fn from(e: TransactionFault) -> Self {
        DriverError::Transaction(e)
    }
}

impl From<AddressError> for DriverError {
    fn from(e: AddressError) -> Self {
        DriverError::InvalidPosition {
            column: e.column,
            row: e.row,
        }
    }
}
