//! Mock implementations for testing without hardware.
//!
//! Test doubles for the three hardware traits, enabling development and
//! testing on the desktop with deterministic behavior.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockAdc`] | [`AdcConverter`] | Scripted per-channel values, busy/latch simulation |
//! | [`MockSensorArray`] | [`SensorArray`] | Queued readings, init tracking |
//! | [`MockPins`] | [`SignalPins`] | Device-state struct recording config and writes |
//!
//! # Example
//!
//! ```rust
//! use sigbridge::{BridgeConfig, PassthroughController};
//! use sigbridge::hal::{MockAdc, MockPins, MockSensorArray};
//! use sigbridge::traits::AdcChannel;
//!
//! let mut adc = MockAdc::new();
//! adc.set_channel_value(AdcChannel::TRIMPOT, 50);
//!
//! let mut sensors = MockSensorArray::new();
//! sensors.set_levels([400, 0, 400, 0, 400]);
//!
//! let mut controller =
//!     PassthroughController::new(adc, sensors, MockPins::new(), BridgeConfig::default());
//! controller.init().unwrap();
//!
//! let frame = controller.step().unwrap();
//! assert_eq!(frame.decisions.as_array(), [true, false, true, false, true]);
//! ```
//!
//! [`AdcConverter`]: crate::traits::AdcConverter
//! [`SensorArray`]: crate::traits::SensorArray
//! [`SignalPins`]: crate::traits::SignalPins

use crate::adc::ADC_MAX;
use crate::signal::{
    MotorLines, PinConfig, Port, M1A_IN, M1B_IN, M2A_IN, M2B_IN, LINE_SENSOR_COUNT,
};
use crate::traits::{AdcChannel, AdcConverter, ConversionSettings, SensorArray, SignalPins};

use heapless::Vec;

// ============================================================================
// MockAdc
// ============================================================================

/// Mock converter with scripted per-channel values.
///
/// Simulates the hardware details the acquisition driver must respect:
/// an in-flight-busy flag, a completion flag, the low/high byte split, and
/// the high-byte latch (reading the high byte before the low byte returns
/// the latch from the *previous* conversion). Optional bounded noise
/// exercises the idempotence-within-tolerance property.
///
/// # Example
///
/// ```rust
/// use sigbridge::hal::MockAdc;
/// use sigbridge::traits::{AdcChannel, AdcConverter};
///
/// let mut adc = MockAdc::new();
/// adc.set_channel_value(AdcChannel::Adc2, 0x1FF);
///
/// adc.configure(Default::default(), AdcChannel::Adc2);
/// adc.start_conversion();
/// assert!(adc.is_ready());
/// let low = adc.read_result_low();
/// let high = adc.read_result_high();
/// assert_eq!((high as u16) << 8 | low as u16, 0x1FF);
/// ```
#[derive(Debug, Default)]
pub struct MockAdc {
    /// Scripted value per channel, indexed by mux bits.
    pub channel_values: [u16; 8],
    /// Remaining `is_busy` polls that report an in-flight conversion.
    pub busy_cycles: u32,
    /// `is_ready` polls to burn before a conversion reports complete.
    pub ready_delay: u32,
    /// Peak deviation applied to conversion results (0 = exact).
    pub noise_amplitude: u16,
    /// Number of `configure` calls observed.
    pub configure_calls: usize,
    /// `configure` calls that arrived while the converter was busy.
    pub configured_while_busy: usize,
    /// Number of conversions started.
    pub conversions: usize,
    /// Conversions whose low byte was read before the high byte.
    pub low_reads_first: usize,
    /// Channel selected by the most recent `configure`.
    pub last_channel: Option<AdcChannel>,
    /// Settings applied by the most recent `configure`.
    pub last_settings: Option<ConversionSettings>,

    result: u16,
    stale_high: u8,
    ready_countdown: u32,
    pending: bool,
    low_read: bool,
    high_read: bool,
    noise_state: u32,
}

impl MockAdc {
    /// Creates a mock converter with all channels reading 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the value returned for conversions on `channel`.
    ///
    /// Values are clamped to the converter's 10-bit range, as the hardware
    /// result register would.
    pub fn set_channel_value(&mut self, channel: AdcChannel, value: u16) {
        self.channel_values[channel.mux_bits() as usize] = value.min(ADC_MAX);
    }

    fn noise(&mut self) -> i32 {
        if self.noise_amplitude == 0 {
            return 0;
        }
        // Tiny LCG; deterministic across runs.
        self.noise_state = self.noise_state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let span = 2 * self.noise_amplitude as i32 + 1;
        (self.noise_state >> 16) as i32 % span - self.noise_amplitude as i32
    }
}

impl AdcConverter for MockAdc {
    fn is_busy(&mut self) -> bool {
        if self.busy_cycles > 0 {
            self.busy_cycles -= 1;
            true
        } else {
            false
        }
    }

    fn configure(&mut self, settings: ConversionSettings, channel: AdcChannel) {
        self.configure_calls += 1;
        if self.busy_cycles > 0 {
            self.configured_while_busy += 1;
        }
        self.last_settings = Some(settings);
        self.last_channel = Some(channel);
    }

    fn start_conversion(&mut self) {
        let base = self
            .last_channel
            .map(|ch| self.channel_values[ch.mux_bits() as usize])
            .unwrap_or(0);
        let noisy = (base as i32 + self.noise()).clamp(0, ADC_MAX as i32);

        // High byte of the previous result stays latched until the new
        // low byte is read.
        self.stale_high = (self.result >> 8) as u8;
        self.result = noisy as u16;
        self.ready_countdown = self.ready_delay;
        self.pending = true;
        self.low_read = false;
        self.high_read = false;
        self.conversions += 1;
    }

    fn is_ready(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        if self.ready_countdown > 0 {
            self.ready_countdown -= 1;
            return false;
        }
        true
    }

    fn read_result_low(&mut self) -> u8 {
        if !self.low_read && !self.high_read {
            self.low_reads_first += 1;
        }
        self.low_read = true;
        self.pending = false;
        (self.result & 0xFF) as u8
    }

    fn read_result_high(&mut self) -> u8 {
        let value = if self.low_read {
            (self.result >> 8) as u8
        } else {
            // Out-of-order read: hand back the stale latch.
            self.stale_high
        };
        self.high_read = true;
        value
    }
}

// ============================================================================
// MockSensorArray
// ============================================================================

/// Mock line-sensor array with queued readings.
///
/// Returns queued readings in FIFO order, falling back to a settable level
/// set once the queue drains. Reading before [`init`] fails, which lets
/// tests catch a controller that skips initialization.
///
/// # Example
///
/// ```rust
/// use sigbridge::hal::MockSensorArray;
/// use sigbridge::traits::SensorArray;
///
/// let mut sensors = MockSensorArray::new();
/// sensors.init(5000).unwrap();
/// sensors.queue_reading([10, 20, 30, 40, 50]);
///
/// assert_eq!(sensors.read_line_sensors().unwrap(), [10, 20, 30, 40, 50]);
/// assert_eq!(sensors.read_line_sensors().unwrap(), [0, 0, 0, 0, 0]);
/// assert_eq!(sensors.init_ticks, Some(5000));
/// ```
///
/// [`init`]: crate::traits::SensorArray::init
#[derive(Debug, Default)]
pub struct MockSensorArray {
    /// Tick budget passed to `init`, if it was called.
    pub init_ticks: Option<u16>,
    /// Number of completed reads.
    pub read_count: usize,
    /// When set, the next read fails once.
    pub fail_next_read: bool,

    queue: Vec<[u16; LINE_SENSOR_COUNT], 16>,
    levels: [u16; LINE_SENSOR_COUNT],
}

impl MockSensorArray {
    /// Creates a mock array with all sensors reading 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the steady-state reading returned once the queue is empty.
    pub fn set_levels(&mut self, levels: [u16; LINE_SENSOR_COUNT]) {
        self.levels = levels;
    }

    /// Queues a one-shot reading (FIFO order).
    pub fn queue_reading(&mut self, reading: [u16; LINE_SENSOR_COUNT]) {
        self.queue.push(reading).expect("mock queue full");
    }
}

impl SensorArray for MockSensorArray {
    type Error = ();

    fn init(&mut self, conversion_ticks: u16) -> Result<(), ()> {
        self.init_ticks = Some(conversion_ticks);
        Ok(())
    }

    fn read_line_sensors(&mut self) -> Result<[u16; LINE_SENSOR_COUNT], ()> {
        if self.init_ticks.is_none() {
            return Err(());
        }
        if self.fail_next_read {
            self.fail_next_read = false;
            return Err(());
        }
        self.read_count += 1;
        if self.queue.is_empty() {
            Ok(self.levels)
        } else {
            Ok(self.queue.remove(0))
        }
    }
}

// ============================================================================
// MockPins
// ============================================================================

/// Mock pin banks: the explicit device-state a real port pair would hold.
///
/// Directions, pull-ups, input levels, and driven port values are all plain
/// fields, so tests can set up line levels and inspect exactly what the
/// controller emitted. Every port write is also appended to a bounded log
/// for order assertions.
///
/// # Example
///
/// ```rust
/// use sigbridge::hal::MockPins;
/// use sigbridge::signal::MotorLines;
/// use sigbridge::traits::SignalPins;
///
/// let mut pins = MockPins::new();
/// pins.set_motor_lines(MotorLines { m1a: true, m1b: false, m2a: true, m2b: false });
///
/// let lines = MotorLines::sample(pins.read_input_b(), pins.read_input_d());
/// assert!(lines.m1a && lines.m2a);
/// assert!(!lines.m1b && !lines.m2b);
/// ```
#[derive(Debug, Default)]
pub struct MockPins {
    /// Applied configuration, if `apply_config` ran.
    pub config: Option<PinConfig>,
    /// Input levels sampled from port B.
    pub pin_b: u8,
    /// Input levels sampled from port D.
    pub pin_d: u8,
    /// Last value driven on port B.
    pub port_b: u8,
    /// Last value driven on port D.
    pub port_d: u8,
    /// Chronological log of port writes.
    pub writes: Vec<(Port, u8), 64>,
}

impl MockPins {
    /// Creates a mock pin bank with all lines low and nothing configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives the four motor input lines to the given state.
    pub fn set_motor_lines(&mut self, lines: MotorLines) {
        for (pin, level) in [
            (M1A_IN, lines.m1a),
            (M1B_IN, lines.m1b),
            (M2A_IN, lines.m2a),
            (M2B_IN, lines.m2b),
        ] {
            let bank = match pin.port {
                Port::B => &mut self.pin_b,
                Port::D => &mut self.pin_d,
            };
            if level {
                *bank |= pin.mask();
            } else {
                *bank &= !pin.mask();
            }
        }
    }

    /// Simulates a disconnected host: every pulled-up input floats high.
    ///
    /// Requires `apply_config` to have run (the pull-ups come from the
    /// applied configuration).
    pub fn float_inputs(&mut self) {
        if let Some(config) = self.config {
            self.pin_b |= config.pullup_b & !config.ddr_b;
            self.pin_d |= config.pullup_d & !config.ddr_d;
        }
    }
}

impl SignalPins for MockPins {
    fn apply_config(&mut self, config: &PinConfig) {
        self.config = Some(*config);
    }

    fn read_input_b(&self) -> u8 {
        self.pin_b
    }

    fn read_input_d(&self) -> u8 {
        self.pin_d
    }

    fn write_port_b(&mut self, value: u8) {
        self.port_b = value;
        let _ = self.writes.push((Port::B, value));
    }

    fn write_port_d(&mut self, value: u8) {
        self.port_d = value;
        let _ = self.writes.push((Port::D, value));
    }
}

// ============================================================================
// Tests
// ============================================================================
