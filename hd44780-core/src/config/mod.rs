//! Configuration types
//!
//! Panel geometry, bus timing and fault handling for one driver instance.

pub mod types;

pub use types::*;
