//! hd44780 Hardware Abstraction Layer
//!
//! This crate defines the line abstraction the bus driver is written
//! against, so the same driver runs on any chip whose GPIO can be wrapped
//! as a [`gpio::Line`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  hd44780-driver (queue + transport)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  hd44780-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ embedded-hal  │       │  simulated /  │
//! │ OutputPin     │       │  custom lines │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Contents
//!
//! - [`gpio::Line`] - Digital output with propagation acknowledgement
//! - [`gpio::PushPull`] - `Line` adapter for any `embedded_hal` output pin
//! - [`gpio::LineProvider`] - Hands out lines by GPIO number
//! - [`pins::BusPinConfig`] - Pin assignment for the seven bus lines

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pins;

// Re-export key types at crate root for convenience
pub use embedded_hal::digital::PinState;
pub use gpio::{Line, LineProvider, LineRole, PushPull};
pub use pins::{BusPinConfig, PinAllocator, PinError};
