//! Board-agnostic core logic for the HD44780 bus driver
//!
//! This crate contains everything that does not touch a line or a timer:
//!
//! - Instruction opcodes and nibble splitting
//! - Display control mask composition
//! - Row/column to DDRAM address mapping
//! - The power-on initialisation sequence, as data
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod address;
pub mod config;
pub mod control;
pub mod instruction;
pub mod sequence;

pub use address::{ddram_address, AddressError, ROW_OFFSETS};
pub use config::{ConfigError, DriverConfig, EntryMode, FaultPolicy, Geometry, Timing};
pub use control::DisplayControl;
pub use instruction::{Nibble, RegisterSelect, ShiftDirection, ShiftTarget};
pub use sequence::{init_sequence, InitStep, INIT_STEPS};
