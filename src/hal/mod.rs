//! Hardware Abstraction Layer implementations.
//!
//! Concrete implementations of the traits defined in [`crate::traits`]:
//!
//! - `mock`: deterministic test doubles for desktop development
//! - `atmega`: ATmega328P register-level backend (requires the `atmega`
//!   feature)

pub mod mock;

#[cfg(feature = "atmega")]
pub mod atmega;

pub use mock::*;

#[cfg(feature = "atmega")]
pub use atmega::*;
