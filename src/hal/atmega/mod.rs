//! ATmega328P hardware abstraction layer for the passthrough bridge.
//!
//! Register-level implementations of the three hardware traits for the
//! Pololu 3pi-class board: the converter on the chip's single ADC, the
//! five-channel line-sensor array on ADC0-ADC4 with the IR emitters on PC5,
//! and the two digital banks on PORTB/PORTD.
//!
//! # Ownership
//!
//! [`AtmegaBoard::split`] consumes the device [`Peripherals`] singleton and
//! hands out the three implementations exactly once. The converter and the
//! sensor array both touch the same ADC register block; that is sound here
//! because the bridge is a single-context polling loop (no interrupts, no
//! preemption) and every conversion fully reprograms the converter before
//! use, so call-granularity interleaving cannot observe stale configuration.
//!
//! [`Peripherals`]: avr_device::atmega328p::Peripherals

mod adc;
mod pins;
mod sensors;

pub use adc::AtmegaAdc;
pub use pins::AtmegaPins;
pub use sensors::AtmegaSensorArray;

use avr_device::atmega328p::Peripherals;

/// Entry point for carving the board peripherals into bridge parts.
pub struct AtmegaBoard;

impl AtmegaBoard {
    /// Consumes the peripheral singleton and returns the converter, sensor
    /// array, and pin banks.
    pub fn split(peripherals: Peripherals) -> (AtmegaAdc, AtmegaSensorArray, AtmegaPins) {
        // The singleton is dropped; from here on all access goes through
        // the register-block pointers inside the three wrappers.
        let _ = peripherals;
        (
            AtmegaAdc::new(),
            AtmegaSensorArray::new(),
            AtmegaPins::new(),
        )
    }
}
