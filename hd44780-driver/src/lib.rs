//! Queued async driver for HD44780 character LCDs in 4-bit mode
//!
//! The controller has no bus arbitration and a single mode register that
//! any split or reordered nibble pair corrupts for good. This crate keeps
//! the bus safe under concurrent use:
//!
//! - [`BusTransport`] performs one nibble transaction on the seven lines
//! - [`TransactionQueue`] serialises requests from any number of callers
//!   and is the only owner of the bus while [`TransactionQueue::run`] is
//!   active
//! - [`Hd44780`] turns display operations into queued instructions
//!
//! # Quick Start
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use hd44780_driver::{BusTransport, Hd44780, TransactionQueue};
//!
//! static QUEUE: TransactionQueue<CriticalSectionRawMutex, 32> = TransactionQueue::new();
//!
//! // Runner task (Embassy tasks cannot be generic, so wrap it concretely):
//! #[embassy_executor::task]
//! async fn lcd_bus(bus: BusTransport<MyLine, embassy_time::Delay>) {
//!     QUEUE.run(bus).await;
//! }
//!
//! // Anywhere else:
//! let lcd = Hd44780::attach(&QUEUE, DriverConfig::default()).await?;
//! lcd.print("Hello", None).await?;
//! lcd.set_cursor(0, 1, None)?;
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging and `defmt::Format` on all types.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod driver;
pub mod error;
pub mod notify;
pub mod queue;
pub mod transport;

#[cfg(test)]
mod sim;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use driver::Hd44780;
pub use error::{ConfigurationFault, DriverError, EnqueueError, TransactionFault};
pub use notify::{Completion, Notifier};
pub use queue::{Request, TransactionQueue};
pub use transport::{BusLines, BusTransport};
