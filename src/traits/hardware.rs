//! Hardware abstraction traits for the converter, sensor array, and I/O pins.
//!
//! These interfaces let the bridge run against real registers on the board
//! and against deterministic test doubles on the desktop.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`AdcConverter`] | Polled analog-to-digital conversion primitives |
//! | [`SensorArray`] | Line-sensor collaborator (init + read-all) |
//! | [`SignalPins`] | Pin direction/pull-up setup, input sampling, port writes |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations from
//! [`crate::hal::mock`]. For the ATmega328P board, use the implementations
//! from `hal::atmega` (requires the `atmega` feature).
//!
//! # Example
//!
//! ```rust
//! use sigbridge::traits::{AdcChannel, AdcConverter};
//! use sigbridge::hal::MockAdc;
//! use sigbridge::AcquisitionDriver;
//!
//! let mut adc = MockAdc::new();
//! adc.set_channel_value(AdcChannel::TRIMPOT, 512);
//!
//! let mut driver = AcquisitionDriver::new(adc);
//! assert_eq!(driver.convert(AdcChannel::TRIMPOT), 512);
//! ```

use crate::signal::{OutputFrame, PinConfig, LINE_SENSOR_COUNT};

// ============================================================================
// Converter types
// ============================================================================

/// Analog input channel routed to the converter's mux.
///
/// Channel roles on this board: ADC0-ADC4 carry the five line-sensor
/// photodiodes, ADC6 carries battery voltage scaled by 2/3, and ADC7 carries
/// the threshold trimpot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdcChannel {
    /// ADC0 (line sensor 0).
    Adc0 = 0,
    /// ADC1 (line sensor 1).
    Adc1 = 1,
    /// ADC2 (line sensor 2).
    Adc2 = 2,
    /// ADC3 (line sensor 3).
    Adc3 = 3,
    /// ADC4 (line sensor 4).
    Adc4 = 4,
    /// ADC5 (unused on this board; the pin drives the IR emitters).
    Adc5 = 5,
    /// ADC6 (battery voltage, scaled by 2/3 in hardware).
    Adc6 = 6,
    /// ADC7 (threshold trimpot).
    Adc7 = 7,
}

impl AdcChannel {
    /// The threshold trimpot channel.
    pub const TRIMPOT: AdcChannel = AdcChannel::Adc7;

    /// The battery-sense channel (battery voltage * 2/3).
    pub const BATTERY: AdcChannel = AdcChannel::Adc6;

    /// The five line-sensor channels in physical order.
    pub const LINE_SENSORS: [AdcChannel; LINE_SENSOR_COUNT] = [
        AdcChannel::Adc0,
        AdcChannel::Adc1,
        AdcChannel::Adc2,
        AdcChannel::Adc3,
        AdcChannel::Adc4,
    ];

    /// Channel-select field value for the mux register.
    pub const fn mux_bits(self) -> u8 {
        self as u8
    }
}

/// Voltage reference selection for a conversion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reference {
    /// External reference on the AREF pin.
    Aref,
    /// Supply voltage as reference (the board's wiring).
    #[default]
    Avcc,
    /// Internal 1.1V bandgap reference.
    Internal1V1,
}

/// Result alignment within the 16-bit data register pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alignment {
    /// Low 8 bits in the low byte, top 2 bits in the high byte.
    #[default]
    Right,
    /// Left-adjusted (top 8 bits readable in one byte).
    Left,
}

/// Converter clock prescaler.
///
/// Slower conversion clocks give better accuracy; the bridge always runs the
/// slowest available divider since loop rate is dominated by the sensor
/// array anyway.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prescaler {
    /// System clock / 2.
    Div2,
    /// System clock / 4.
    Div4,
    /// System clock / 8.
    Div8,
    /// System clock / 16.
    Div16,
    /// System clock / 32.
    Div32,
    /// System clock / 64.
    Div64,
    /// System clock / 128 (slowest, default).
    #[default]
    Div128,
}

impl Prescaler {
    /// Prescaler-select field value.
    pub const fn bits(self) -> u8 {
        match self {
            Prescaler::Div2 => 0b001,
            Prescaler::Div4 => 0b010,
            Prescaler::Div8 => 0b011,
            Prescaler::Div16 => 0b100,
            Prescaler::Div32 => 0b101,
            Prescaler::Div64 => 0b110,
            Prescaler::Div128 => 0b111,
        }
    }
}

/// Full converter configuration applied before every conversion.
///
/// Applied idempotently on each call; nothing is assumed to persist in the
/// hardware between conversions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionSettings {
    /// Voltage reference.
    pub reference: Reference,
    /// Result alignment.
    pub alignment: Alignment,
    /// Converter clock divider.
    pub prescaler: Prescaler,
}

// ============================================================================
// Traits
// ============================================================================

/// Polled analog-to-digital converter primitives.
///
/// This is the seam between the blocking [`AcquisitionDriver`] and the
/// hardware: the driver owns all sequencing (wait-idle, configure, start,
/// wait-ready, read low then high) and the implementation only exposes the
/// individual register-level steps. A test double can simulate the converter
/// without real timing.
///
/// # Implementation Notes
///
/// - `configure` must fully reprogram the converter; callers rely on it
///   being idempotent.
/// - `read_result_low` must be called before `read_result_high`: reading the
///   low byte latches the high byte on real hardware, so the reverse order
///   returns a stale pair.
/// - No error type: the converter is a bounded-latency peripheral on a
///   controlled clock, and a conversion that never completes simply blocks
///   the caller. That is an accepted limitation, not a masked fault.
///
/// [`AcquisitionDriver`]: crate::adc::AcquisitionDriver
pub trait AdcConverter {
    /// True while a previously started conversion is still running.
    ///
    /// Takes `&mut self` so simulated converters can advance their state on
    /// each poll.
    fn is_busy(&mut self) -> bool;

    /// Reprograms reference, alignment, prescaler, and channel mux.
    ///
    /// Must not be called while [`is_busy`](Self::is_busy) is true.
    fn configure(&mut self, settings: ConversionSettings, channel: AdcChannel);

    /// Triggers a single conversion on the configured channel.
    fn start_conversion(&mut self);

    /// True once the triggered conversion has completed.
    fn is_ready(&mut self) -> bool;

    /// Low byte of the result. Latches the high byte.
    fn read_result_low(&mut self) -> u8;

    /// High byte of the result, as latched by the preceding low-byte read.
    fn read_result_high(&mut self) -> u8;
}

/// External line-sensor collaborator.
///
/// The bridge does not own sensor-array bring-up; it sees the array as a
/// single blocking read returning raw analog counts for all five channels.
/// Read duration is bounded by the configured per-conversion tick budget
/// times the channel count.
pub trait SensorArray {
    /// Error type for sensor-array operations.
    type Error;

    /// One-time initialization with the per-conversion timing budget.
    ///
    /// `conversion_ticks` is in timer ticks (0.4us each on this board); it
    /// trades conversion accuracy against loop latency and must not be
    /// changed after init.
    fn init(&mut self, conversion_ticks: u16) -> Result<(), Self::Error>;

    /// Blocking read of all five line sensors, in physical order 0..4.
    fn read_line_sensors(&mut self) -> Result<[u16; LINE_SENSOR_COUNT], Self::Error>;
}

/// Digital pin banks used by the bridge.
///
/// Covers the one-time direction/pull-up setup, the per-iteration level
/// sample of the motor input lines, and the per-iteration output writes.
/// Reads return the actual pin state (line level), not the driven port
/// state; with pull-ups enabled a floating input reads high.
///
/// GPIO access on this class of hardware cannot fail, so there is no error
/// type (same as the input-sampling traits elsewhere in the crate).
pub trait SignalPins {
    /// Applies directions and pull-ups. Called once before the loop.
    fn apply_config(&mut self, config: &PinConfig);

    /// Level sample of the port B input register.
    fn read_input_b(&self) -> u8;

    /// Level sample of the port D input register.
    fn read_input_d(&self) -> u8;

    /// Writes the port B output register in a single store.
    fn write_port_b(&mut self, value: u8);

    /// Writes the port D output register in a single store.
    fn write_port_d(&mut self, value: u8);

    /// Emits a full output frame, port D first then port B.
    ///
    /// The D-then-B order matches the original board so the observer sees
    /// the sensor-heavy port settle first.
    fn write_frame(&mut self, frame: OutputFrame) {
        self.write_port_d(frame.port_d);
        self.write_port_b(frame.port_b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_mux_bits() {
        assert_eq!(AdcChannel::Adc0.mux_bits(), 0);
        assert_eq!(AdcChannel::TRIMPOT.mux_bits(), 7);
        assert_eq!(AdcChannel::BATTERY.mux_bits(), 6);
    }

    #[test]
    fn line_sensor_channels_in_order() {
        for (i, ch) in AdcChannel::LINE_SENSORS.iter().enumerate() {
            assert_eq!(ch.mux_bits() as usize, i);
        }
    }

    #[test]
    fn settings_default_matches_board() {
        let settings = ConversionSettings::default();
        assert_eq!(settings.reference, Reference::Avcc);
        assert_eq!(settings.alignment, Alignment::Right);
        assert_eq!(settings.prescaler, Prescaler::Div128);
    }

    #[test]
    fn prescaler_bits_are_distinct_and_div128_is_slowest() {
        let all = [
            Prescaler::Div2,
            Prescaler::Div4,
            Prescaler::Div8,
            Prescaler::Div16,
            Prescaler::Div32,
            Prescaler::Div64,
            Prescaler::Div128,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.bits(), b.bits());
            }
        }
        assert_eq!(Prescaler::Div128.bits(), 0b111);
    }

    // =========================================================================
    // SignalPins default write_frame
    // =========================================================================

    struct RecordingPins {
        writes: std::vec::Vec<(char, u8)>,
    }

    impl SignalPins for RecordingPins {
        fn apply_config(&mut self, _config: &PinConfig) {}

        fn read_input_b(&self) -> u8 {
            0
        }

        fn read_input_d(&self) -> u8 {
            0
        }

        fn write_port_b(&mut self, value: u8) {
            self.writes.push(('B', value));
        }

        fn write_port_d(&mut self, value: u8) {
            self.writes.push(('D', value));
        }
    }

    #[test]
    fn write_frame_default_impl_writes_d_then_b() {
        let mut pins = RecordingPins { writes: Vec::new() };
        pins.write_frame(OutputFrame {
            port_b: 0x33,
            port_d: 0x85,
        });
        assert_eq!(pins.writes, vec![('D', 0x85), ('B', 0x33)]);
    }
}
