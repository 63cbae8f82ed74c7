//! Passthrough controller: the sense-decide-emit loop.
//!
//! [`PassthroughController`] orchestrates one full cycle per [`step`]:
//! sample the motor lines, read the sensor array, convert the threshold
//! channel, binarize, pack, emit. [`run`] repeats it, forever on the board
//! or for a bounded number of iterations under test.
//!
//! # Example
//!
//! ```rust
//! use sigbridge::{BridgeConfig, PassthroughController, RunBudget};
//! use sigbridge::hal::{MockAdc, MockPins, MockSensorArray};
//! use sigbridge::signal::MotorLines;
//! use sigbridge::traits::AdcChannel;
//!
//! let mut adc = MockAdc::new();
//! adc.set_channel_value(AdcChannel::TRIMPOT, 50);
//! let mut sensors = MockSensorArray::new();
//! sensors.set_levels([400, 0, 400, 0, 400]);
//! let mut pins = MockPins::new();
//! pins.set_motor_lines(MotorLines { m1a: true, m1b: false, m2a: true, m2b: false });
//!
//! let mut controller = PassthroughController::new(adc, sensors, pins, BridgeConfig::default());
//! controller.init().unwrap();
//! controller.run(RunBudget::Iterations(3)).unwrap();
//! ```
//!
//! # Failure semantics
//!
//! The only fallible collaborator is the sensor array; its error propagates
//! out of [`step`] untouched. On the board the sensor array is infallible
//! and the loop runs until power-off: faults manifest as wrong output
//! levels, never as termination.
//!
//! [`step`]: PassthroughController::step
//! [`run`]: PassthroughController::run

use crate::adc::AcquisitionDriver;
use crate::config::BridgeConfig;
use crate::signal::{
    MotorLines, OutputFrame, SensorDecisions, BRIDGE_PINS, LINE_SENSOR_COUNT,
};
use crate::traits::{AdcConverter, SensorArray, SignalPins};

/// How long [`PassthroughController::run`] should iterate.
///
/// The board always runs [`Forever`](Self::Forever); the bounded variant
/// exists so tests can drive a finite number of cycles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunBudget {
    /// Loop until power loss or reset.
    #[default]
    Forever,
    /// Run exactly this many iterations, then return.
    Iterations(usize),
}

/// Snapshot of everything one iteration derived and emitted.
///
/// All of this is transient loop state; it is returned by value for
/// observability and discarded by the firmware loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BridgeFrame {
    /// Raw analog counts from the five line sensors.
    pub readings: [u16; LINE_SENSOR_COUNT],
    /// Raw trimpot reading used as the threshold.
    pub threshold: u16,
    /// Per-sensor threshold decisions.
    pub decisions: SensorDecisions,
    /// Sampled motor control lines.
    pub motors: MotorLines,
    /// The port bytes that were written out.
    pub output: OutputFrame,
}

/// The passthrough controller.
///
/// Generic over the three hardware seams so the same loop body runs against
/// registers on the board and against mocks in tests.
///
/// # Type Parameters
///
/// - `A`: the analog converter ([`AdcConverter`])
/// - `S`: the line-sensor collaborator ([`SensorArray`])
/// - `P`: the digital pin banks ([`SignalPins`])
pub struct PassthroughController<A: AdcConverter, S: SensorArray, P: SignalPins> {
    adc: AcquisitionDriver<A>,
    sensors: S,
    pins: P,
    config: BridgeConfig,
}

impl<A: AdcConverter, S: SensorArray, P: SignalPins> PassthroughController<A, S, P> {
    /// Creates a controller. Call [`init`](Self::init) before stepping.
    pub fn new(adc: A, sensors: S, pins: P, config: BridgeConfig) -> Self {
        Self {
            adc: AcquisitionDriver::with_settings(adc, config.adc_settings),
            sensors,
            pins,
            config,
        }
    }

    /// One-time setup before the loop.
    ///
    /// Applies pin directions and pull-ups, then initializes the sensor
    /// array with the configured conversion tick budget. Pin configuration
    /// happens first so the motor inputs are pulled up before anything
    /// samples them.
    pub fn init(&mut self) -> Result<(), S::Error> {
        self.pins.apply_config(&BRIDGE_PINS);
        self.sensors.init(self.config.conversion_ticks)?;
        Ok(())
    }

    /// Runs one full sense-decide-emit cycle.
    ///
    /// Ordering within the cycle is fixed: motor lines are level-sampled
    /// first, then the sensor array is read (the slow part), then the
    /// threshold is converted, and only then are decisions computed and the
    /// frame written, port D before port B.
    pub fn step(&mut self) -> Result<BridgeFrame, S::Error> {
        let motors = MotorLines::sample(self.pins.read_input_b(), self.pins.read_input_d());
        let readings = self.sensors.read_line_sensors()?;
        let threshold = self.adc.convert(self.config.threshold_channel);

        let decisions =
            SensorDecisions::from_readings(&readings, threshold, self.config.sensor_scale_shift);
        let output = self
            .config
            .revision
            .output_map()
            .assemble(&decisions, &motors);
        self.pins.write_frame(output);

        Ok(BridgeFrame {
            readings,
            threshold,
            decisions,
            motors,
            output,
        })
    }

    /// Repeats [`step`](Self::step) according to the budget.
    ///
    /// With [`RunBudget::Forever`] this only returns if the sensor array
    /// fails; the loop itself adds no delay, so the iteration rate is set
    /// entirely by conversion latency.
    pub fn run(&mut self, budget: RunBudget) -> Result<(), S::Error> {
        match budget {
            RunBudget::Forever => loop {
                self.step()?;
            },
            RunBudget::Iterations(count) => {
                for _ in 0..count {
                    self.step()?;
                }
                Ok(())
            }
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Borrows the pin banks (used by tests to inspect emitted frames).
    pub fn pins(&self) -> &P {
        &self.pins
    }

    /// Mutably borrows the pin banks (used by tests to change line levels).
    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    /// Borrows the sensor array.
    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    /// Mutably borrows the sensor array.
    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }

    /// Borrows the acquisition driver.
    pub fn adc(&self) -> &AcquisitionDriver<A> {
        &self.adc
    }

    /// Mutably borrows the acquisition driver.
    pub fn adc_mut(&mut self) -> &mut AcquisitionDriver<A> {
        &mut self.adc
    }

    /// Tears the controller down into its hardware parts.
    pub fn into_parts(self) -> (A, S, P) {
        (self.adc.into_inner(), self.sensors, self.pins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockAdc, MockPins, MockSensorArray};
    use crate::signal::{BoardRevision, Port, BRIDGE_PINS};
    use crate::traits::AdcChannel;

    fn controller(
        config: BridgeConfig,
    ) -> PassthroughController<MockAdc, MockSensorArray, MockPins> {
        let mut adc = MockAdc::new();
        adc.set_channel_value(AdcChannel::TRIMPOT, 50);
        let mut sensors = MockSensorArray::new();
        sensors.set_levels([400, 0, 400, 0, 400]);
        PassthroughController::new(adc, sensors, MockPins::new(), config)
    }

    #[test]
    fn init_applies_pins_then_sensor_budget() {
        let mut c = controller(BridgeConfig::default());
        c.init().unwrap();
        assert_eq!(c.pins().config, Some(BRIDGE_PINS));
        assert_eq!(c.sensors().init_ticks, Some(5000));
    }

    #[test]
    fn step_without_init_propagates_sensor_error() {
        let mut c = controller(BridgeConfig::default());
        assert!(c.step().is_err());
    }

    #[test]
    fn step_emits_rev_a_scenario_bytes() {
        let mut c = controller(BridgeConfig::default());
        c.init().unwrap();

        let frame = c.step().unwrap();
        assert_eq!(frame.threshold, 50);
        assert_eq!(frame.decisions.as_array(), [true, false, true, false, true]);
        assert_eq!(frame.output.port_d, 0x85);
        assert_eq!(frame.output.port_b, 0x33);
        assert_eq!(c.pins().port_d, 0x85);
        assert_eq!(c.pins().port_b, 0x33);
    }

    #[test]
    fn step_writes_port_d_before_port_b() {
        let mut c = controller(BridgeConfig::default());
        c.init().unwrap();
        c.step().unwrap();

        let writes = c.pins().writes.as_slice();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].0, Port::D);
        assert_eq!(writes[1].0, Port::B);
    }

    #[test]
    fn step_converts_configured_threshold_channel() {
        let config = BridgeConfig::default().with_threshold_channel(AdcChannel::BATTERY);
        let mut c = controller(config);
        c.init().unwrap();
        c.step().unwrap();
        assert_eq!(c.adc().inner().last_channel, Some(AdcChannel::BATTERY));
    }

    #[test]
    fn step_passes_motor_lines_through() {
        let mut c = controller(BridgeConfig::default());
        c.init().unwrap();
        c.pins_mut().set_motor_lines(MotorLines {
            m1a: false,
            m1b: true,
            m2a: false,
            m2b: true,
        });

        let frame = c.step().unwrap();
        assert_eq!(frame.motors.as_array(), [false, true, false, true]);
        let map = BoardRevision::RevA.output_map();
        assert!(!frame.output.bit(map.motor_pin(0)));
        assert!(frame.output.bit(map.motor_pin(1)));
        assert!(!frame.output.bit(map.motor_pin(2)));
        assert!(frame.output.bit(map.motor_pin(3)));
    }

    #[test]
    fn run_bounded_iterations() {
        let mut c = controller(BridgeConfig::default());
        c.init().unwrap();
        c.run(RunBudget::Iterations(7)).unwrap();
        assert_eq!(c.sensors().read_count, 7);
        assert_eq!(c.adc().inner().conversions, 7);
    }

    #[test]
    fn run_stops_on_sensor_error() {
        let mut c = controller(BridgeConfig::default());
        c.init().unwrap();
        c.sensors_mut().fail_next_read = true;
        assert!(c.run(RunBudget::Iterations(5)).is_err());
        // The failing iteration produced no frame write.
        assert!(c.pins().writes.is_empty());
    }

    #[test]
    fn frame_recomputed_fresh_each_iteration() {
        let mut c = controller(BridgeConfig::default());
        c.init().unwrap();
        c.sensors_mut().queue_reading([1023; 5]);
        c.sensors_mut().queue_reading([0; 5]);

        let first = c.step().unwrap();
        let second = c.step().unwrap();
        assert_eq!(first.decisions.as_array(), [true; 5]);
        assert_eq!(second.decisions.as_array(), [false; 5]);
    }
}
