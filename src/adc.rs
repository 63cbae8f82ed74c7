//! Analog acquisition driver: one blocking conversion per call.
//!
//! [`AcquisitionDriver`] owns an [`AdcConverter`] and hides its
//! configuration and timing from callers. Each [`convert`] call performs a
//! complete conversion: wait for the converter to go idle, reprogram it from
//! scratch, trigger, spin on the completion flag, and assemble the result
//! from the split byte pair.
//!
//! There is no error path. The only failure mode, a conversion that never
//! completes, is unobservable at this layer; the converter is a
//! bounded-latency peripheral on a controlled clock, so a stall here means a
//! hardware fault the bridge cannot recover from anyway.
//!
//! # Example
//!
//! ```rust
//! use sigbridge::{AcquisitionDriver, hal::MockAdc, traits::AdcChannel};
//!
//! let mut adc = MockAdc::new();
//! adc.set_channel_value(AdcChannel::TRIMPOT, 300);
//!
//! let mut driver = AcquisitionDriver::new(adc);
//! let threshold = driver.convert(AdcChannel::TRIMPOT);
//! assert_eq!(threshold, 300);
//! ```
//!
//! [`convert`]: AcquisitionDriver::convert

use crate::traits::{AdcChannel, AdcConverter, ConversionSettings};

/// Converter result width in bits.
pub const ADC_RESOLUTION_BITS: u8 = 10;

/// Largest representable conversion result.
pub const ADC_MAX: u16 = (1 << ADC_RESOLUTION_BITS) - 1;

/// Blocking acquisition driver over a polled converter.
///
/// # Concurrency
///
/// [`convert`](Self::convert) blocks and must be called from a single
/// control-flow context. There is no reentrancy guard; exclusive ownership
/// of the converter is the caller's responsibility. In this crate the
/// controller owns the driver for the process lifetime, so the discipline
/// holds structurally.
#[derive(Debug)]
pub struct AcquisitionDriver<A: AdcConverter> {
    adc: A,
    settings: ConversionSettings,
}

impl<A: AdcConverter> AcquisitionDriver<A> {
    /// Creates a driver with the board's default conversion settings
    /// (AVCC reference, right-adjusted, prescaler 128).
    pub fn new(adc: A) -> Self {
        Self::with_settings(adc, ConversionSettings::default())
    }

    /// Creates a driver with explicit conversion settings.
    pub fn with_settings(adc: A, settings: ConversionSettings) -> Self {
        Self { adc, settings }
    }

    /// The settings applied before every conversion.
    pub fn settings(&self) -> ConversionSettings {
        self.settings
    }

    /// Performs one complete conversion on `channel`.
    ///
    /// Blocks until any in-flight conversion finishes before reconfiguring,
    /// then blocks again until the new conversion completes. The converter
    /// is fully reprogrammed on every call; nothing is assumed to persist
    /// between conversions.
    ///
    /// The low result byte is read before the high byte. Real hardware
    /// latches the high byte when the low byte is read, so the reverse
    /// order would combine bytes from two different conversions.
    pub fn convert(&mut self, channel: AdcChannel) -> u16 {
        while self.adc.is_busy() {}

        self.adc.configure(self.settings, channel);
        self.adc.start_conversion();

        while !self.adc.is_ready() {}

        let low = self.adc.read_result_low() as u16;
        let high = self.adc.read_result_high() as u16;
        (low | (high << 8)) & ADC_MAX
    }

    /// Borrows the underlying converter (used by tests to inspect mocks).
    pub fn inner(&self) -> &A {
        &self.adc
    }

    /// Mutably borrows the underlying converter.
    pub fn inner_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    /// Consumes the driver, returning the converter.
    pub fn into_inner(self) -> A {
        self.adc
    }
}
