//! # sigbridge
//!
//! A signal-passthrough bridge for a small differential-drive robot: five
//! analog line sensors are digitized against a trimpot threshold, the four
//! H-bridge motor control lines are sampled, and the combined digital
//! vector is re-emitted on two 8-bit ports for an external observer board.
//!
//! ## Features
//!
//! - **Hardware abstraction**: traits for the analog converter, the
//!   line-sensor collaborator, and the digital pin banks
//! - **Blocking acquisition driver**: one complete polled conversion per
//!   call, fully reconfigured every time
//! - **Fixed bit-mapping contract**: two documented board revisions, with
//!   constant bits held on every frame
//! - **Testable run loop**: runs forever on the board, bounded under test
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - hardware seams (`AdcConverter`, `SensorArray`, `SignalPins`)
//! - `adc` - the blocking acquisition driver
//! - `signal` - threshold decisions, motor-line sampling, output mapping
//! - `config` - build-time constants and the config builder
//! - `controller` - the sense-decide-emit loop
//! - `hal` - concrete implementations (mock for testing, atmega for hardware)
//!
//! ## Example
//!
//! ```rust
//! use sigbridge::{BridgeConfig, PassthroughController, RunBudget};
//! use sigbridge::hal::{MockAdc, MockPins, MockSensorArray};
//! use sigbridge::traits::AdcChannel;
//!
//! let mut adc = MockAdc::new();
//! adc.set_channel_value(AdcChannel::TRIMPOT, 50);
//!
//! let mut sensors = MockSensorArray::new();
//! sensors.set_levels([400, 0, 400, 0, 400]);
//!
//! let mut bridge =
//!     PassthroughController::new(adc, sensors, MockPins::new(), BridgeConfig::default());
//! bridge.init().unwrap();
//!
//! let frame = bridge.step().unwrap();
//! assert_eq!(frame.decisions.as_array(), [true, false, true, false, true]);
//!
//! // On the board this would be RunBudget::Forever.
//! bridge.run(RunBudget::Iterations(10)).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// Blocking analog acquisition driver.
pub mod adc;
/// Build-time configuration and the config builder.
pub mod config;
/// The passthrough controller and its run loop.
pub mod controller;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Bit-level signal protocol: decisions, motor lines, output mapping.
pub mod signal;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use adc::{AcquisitionDriver, ADC_MAX, ADC_RESOLUTION_BITS};
pub use config::{BridgeConfig, SENSOR_CONVERSION_TICKS, SENSOR_SCALE_SHIFT};
pub use controller::{BridgeFrame, PassthroughController, RunBudget};
pub use signal::{
    BoardRevision, MotorLines, OutputFrame, OutputMap, PinConfig, SensorDecisions,
    LINE_SENSOR_COUNT, MOTOR_LINE_COUNT,
};
pub use traits::{
    AdcChannel, AdcConverter, Alignment, ConversionSettings, Prescaler, Reference, SensorArray,
    SignalPins,
};
