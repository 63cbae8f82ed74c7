//! Trait definitions for hardware abstraction.
//!
//! This module defines the seams that let the bridge run on the real board
//! and against deterministic test doubles:
//!
//! - [`AdcConverter`]: polled analog-to-digital conversion primitives
//! - [`SensorArray`]: the external line-sensor collaborator
//! - [`SignalPins`]: pin configuration, input sampling, and output writes
//!
//! Concrete implementations live in [`crate::hal`].

pub mod hardware;

pub use hardware::*;
