//! Bit-level signal protocol: threshold decisions, motor-line sampling, and
//! the packed output frame.
//!
//! Everything in this module is pure data manipulation with no hardware
//! access, so the whole mapping contract is testable on the desktop.
//!
//! # Overview
//!
//! Each loop iteration produces three transient values:
//!
//! - [`MotorLines`]: the four H-bridge control lines, sampled as levels
//! - [`SensorDecisions`]: five booleans from comparing scaled sensor
//!   readings against the trimpot threshold
//! - [`OutputFrame`]: the two port bytes emitted to the observer board
//!
//! The placement of each bit is a build-time contract captured in
//! [`OutputMap`]. Two board revisions exist with different output layouts
//! ([`BoardRevision::RevA`] and [`BoardRevision::RevB`]); both share the same
//! input pins, pin directions, and constant bits.
//!
//! # Example
//!
//! ```rust
//! use sigbridge::signal::{BoardRevision, MotorLines, SensorDecisions};
//!
//! let readings = [400, 0, 400, 0, 400];
//! let decisions = SensorDecisions::from_readings(&readings, 50, 2);
//! assert_eq!(decisions.as_array(), [true, false, true, false, true]);
//!
//! let motors = MotorLines { m1a: true, m1b: false, m2a: true, m2b: false };
//! let frame = BoardRevision::RevA.output_map().assemble(&decisions, &motors);
//!
//! // Constant bits are always present regardless of input.
//! assert_eq!(frame.port_d & 0x01, 0x01);
//! assert_eq!(frame.port_b & 0x04, 0x00); // buzzer held low
//! ```

/// Number of line-sensor photodiode channels.
pub const LINE_SENSOR_COUNT: usize = 5;

/// Number of observed H-bridge control lines (m1a, m1b, m2a, m2b).
pub const MOTOR_LINE_COUNT: usize = 4;

// ============================================================================
// Ports and pins
// ============================================================================

/// The two 8-bit I/O banks used by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Port {
    /// Port B (PB0-PB7).
    B,
    /// Port D (PD0-PD7).
    D,
}

/// A single pin position within one of the two ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortPin {
    /// Which port bank the pin belongs to.
    pub port: Port,
    /// Bit position within the port (0-7).
    pub bit: u8,
}

impl PortPin {
    /// Creates a pin reference. `bit` must be 0-7.
    pub const fn new(port: Port, bit: u8) -> Self {
        Self { port, bit }
    }

    /// Single-bit mask for this pin within its port byte.
    pub const fn mask(&self) -> u8 {
        1 << self.bit
    }
}

// ============================================================================
// Input side: motor control lines
// ============================================================================

/// Motor 1 side A observation line (PD0).
pub const M1A_IN: PortPin = PortPin::new(Port::D, 0);
/// Motor 1 side B observation line (PB1).
pub const M1B_IN: PortPin = PortPin::new(Port::B, 1);
/// Motor 2 side A observation line (PB4).
pub const M2A_IN: PortPin = PortPin::new(Port::B, 4);
/// Motor 2 side B observation line (PB5).
pub const M2B_IN: PortPin = PortPin::new(Port::B, 5);

/// Sampled state of the four H-bridge control lines.
///
/// The bridge never drives these lines; they are read as plain levels from
/// the input pin registers once per iteration. With both sides of a bridge
/// high the driver brakes, which is why the input pull-ups matter: a
/// disconnected host reads as (1,1) = brake rather than a floating level.
///
/// # Example
///
/// ```rust
/// use sigbridge::signal::MotorLines;
///
/// // PB1 high (m1b), PB4 low (m2a), PB5 high (m2b); PD0 low (m1a)
/// let lines = MotorLines::sample(0b0010_0010, 0b0000_0000);
/// assert!(!lines.m1a);
/// assert!(lines.m1b);
/// assert!(!lines.m2a);
/// assert!(lines.m2b);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorLines {
    /// Motor 1 side A.
    pub m1a: bool,
    /// Motor 1 side B.
    pub m1b: bool,
    /// Motor 2 side A.
    pub m2a: bool,
    /// Motor 2 side B.
    pub m2b: bool,
}

impl MotorLines {
    /// Extracts the four motor lines from raw input-bank reads.
    ///
    /// `pin_b` and `pin_d` are the level samples of the B and D input
    /// registers. Any value present at sample time is trusted; there is no
    /// debouncing or change detection.
    pub fn sample(pin_b: u8, pin_d: u8) -> Self {
        let bit = |pins: u8, pin: PortPin| pins & pin.mask() != 0;
        Self {
            m1a: bit(pin_d, M1A_IN),
            m1b: bit(pin_b, M1B_IN),
            m2a: bit(pin_b, M2A_IN),
            m2b: bit(pin_b, M2B_IN),
        }
    }

    /// Lines in fixed order: m1a, m1b, m2a, m2b.
    pub fn as_array(&self) -> [bool; MOTOR_LINE_COUNT] {
        [self.m1a, self.m1b, self.m2a, self.m2b]
    }
}

// ============================================================================
// Sensor decisions
// ============================================================================

/// Per-sensor threshold comparison results, index-aligned with the raw
/// sensor readings.
///
/// Recomputed fresh every iteration; never retained across iterations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorDecisions([bool; LINE_SENSOR_COUNT]);

impl SensorDecisions {
    /// Binarizes raw sensor readings against the threshold reading.
    ///
    /// Each reading is right-shifted by `scale_shift` to bring the sensor
    /// channel's dynamic range in line with the trimpot channel, then
    /// compared with strict greater-than. Equality yields `false`.
    ///
    /// Each sensor is decided independently; there is no cross-sensor
    /// coupling.
    pub fn from_readings(
        readings: &[u16; LINE_SENSOR_COUNT],
        threshold: u16,
        scale_shift: u8,
    ) -> Self {
        let mut decisions = [false; LINE_SENSOR_COUNT];
        for (decision, reading) in decisions.iter_mut().zip(readings) {
            *decision = (reading >> scale_shift) > threshold;
        }
        Self(decisions)
    }

    /// Decisions in physical sensor order 0..4.
    pub fn as_array(&self) -> [bool; LINE_SENSOR_COUNT] {
        self.0
    }

    /// Decision for a single sensor index.
    pub fn get(&self, index: usize) -> bool {
        self.0[index]
    }
}

// ============================================================================
// Pin directions and pull-ups
// ============================================================================

/// Direction and pull-up configuration for the two I/O banks.
///
/// This is the explicit device-state that the controller applies once at
/// startup. A set bit in `ddr_*` makes the pin an output; a set bit in
/// `pullup_*` enables the pull-up on an input pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinConfig {
    /// Data direction bits for port B.
    pub ddr_b: u8,
    /// Data direction bits for port D.
    pub ddr_d: u8,
    /// Pull-up enable bits for port B inputs.
    pub pullup_b: u8,
    /// Pull-up enable bits for port D inputs.
    pub pullup_d: u8,
}

/// Fixed pin roles for the bridge, shared by both board revisions.
///
/// Port D: PD0 input (m1a, pull-up), PD1-PD7 outputs.
/// Port B: PB0/PB2/PB3 outputs, PB1/PB4/PB5 inputs (motor lines, pull-ups),
/// PB6/PB7 unused inputs. The pull-ups make floating motor lines read as
/// brake (both sides high) instead of an undefined level.
pub const BRIDGE_PINS: PinConfig = PinConfig {
    ddr_b: 0x0D,
    ddr_d: 0xFE,
    pullup_b: 0x32,
    pullup_d: 0x01,
};

// ============================================================================
// Output frame and mapping tables
// ============================================================================

/// The two port bytes emitted to the observer board each iteration.
///
/// Each port write is a single register store, so the frame is atomic from
/// the bridge's perspective at port granularity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputFrame {
    /// Value written to port B.
    pub port_b: u8,
    /// Value written to port D.
    pub port_d: u8,
}

impl OutputFrame {
    /// Reads back a single bit at the given pin position.
    pub fn bit(&self, pin: PortPin) -> bool {
        let byte = match pin.port {
            Port::B => self.port_b,
            Port::D => self.port_d,
        };
        byte & pin.mask() != 0
    }

    fn set(&mut self, pin: PortPin) {
        match pin.port {
            Port::B => self.port_b |= pin.mask(),
            Port::D => self.port_d |= pin.mask(),
        }
    }
}

/// Build-time table placing each signal at its output-port bit position.
///
/// The mapping is a contract with the external observer board: it is chosen
/// once per build and must not drift between iterations. Bits not listed in
/// `sensor` or `motor` are held at the constants baked into `constant_b` /
/// `constant_d` on every frame. The constants carry the input pull-up
/// convention (writing 1 to an input pin's port bit keeps its pull-up on)
/// and hold the buzzer line low.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputMap {
    sensor: [PortPin; LINE_SENSOR_COUNT],
    motor: [PortPin; MOTOR_LINE_COUNT],
    constant_b: u8,
    constant_d: u8,
}

impl OutputMap {
    /// Output position of sensor decision `index` (0..4).
    pub fn sensor_pin(&self, index: usize) -> PortPin {
        self.sensor[index]
    }

    /// Output position of motor line `index` (m1a, m1b, m2a, m2b).
    pub fn motor_pin(&self, index: usize) -> PortPin {
        self.motor[index]
    }

    /// Constant bits held on port B every frame.
    pub fn constant_b(&self) -> u8 {
        self.constant_b
    }

    /// Constant bits held on port D every frame.
    pub fn constant_d(&self) -> u8 {
        self.constant_d
    }

    /// Packs decisions and motor lines into the two port bytes.
    ///
    /// Starts from the constant bits and ORs in one bit per signal, so every
    /// position not carrying data keeps its fixed value no matter what the
    /// inputs are.
    pub fn assemble(&self, decisions: &SensorDecisions, motors: &MotorLines) -> OutputFrame {
        let mut frame = OutputFrame {
            port_b: self.constant_b,
            port_d: self.constant_d,
        };
        for (pin, on) in self.sensor.iter().zip(decisions.as_array()) {
            if on {
                frame.set(*pin);
            }
        }
        for (pin, on) in self.motor.iter().zip(motors.as_array()) {
            if on {
                frame.set(*pin);
            }
        }
        frame
    }
}

/// Revision A layout.
///
/// PORTD = s0<<7 | m1b<<6 | m1a<<5 | s3<<4 | m2a<<3 | s2<<2 | s1<<1 | 1,
/// PORTB = pull-ups | m2b<<3 | s4<<0.
pub const REV_A_MAP: OutputMap = OutputMap {
    sensor: [
        PortPin::new(Port::D, 7),
        PortPin::new(Port::D, 1),
        PortPin::new(Port::D, 2),
        PortPin::new(Port::D, 4),
        PortPin::new(Port::B, 0),
    ],
    motor: [
        PortPin::new(Port::D, 5),
        PortPin::new(Port::D, 6),
        PortPin::new(Port::D, 3),
        PortPin::new(Port::B, 3),
    ],
    constant_b: BRIDGE_PINS.pullup_b,
    constant_d: BRIDGE_PINS.pullup_d,
};

/// Revision B layout: sensors contiguous on PD7..PD3, motors on PD2, PD1,
/// PB0, PB3. Same inputs, directions, and constant bits as revision A.
pub const REV_B_MAP: OutputMap = OutputMap {
    sensor: [
        PortPin::new(Port::D, 7),
        PortPin::new(Port::D, 6),
        PortPin::new(Port::D, 5),
        PortPin::new(Port::D, 4),
        PortPin::new(Port::D, 3),
    ],
    motor: [
        PortPin::new(Port::D, 2),
        PortPin::new(Port::D, 1),
        PortPin::new(Port::B, 0),
        PortPin::new(Port::B, 3),
    ],
    constant_b: BRIDGE_PINS.pullup_b,
    constant_d: BRIDGE_PINS.pullup_d,
};

/// Observed hardware revisions of the observer-board wiring.
///
/// Selects which [`OutputMap`] is in effect. The default is
/// [`RevA`](Self::RevA), the layout of the original board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardRevision {
    /// Original wiring with motor bits interleaved among sensor bits.
    #[default]
    RevA,
    /// Later wiring with sensors contiguous on the high bits of port D.
    RevB,
}

impl BoardRevision {
    /// The output mapping table for this revision.
    pub fn output_map(&self) -> &'static OutputMap {
        match self {
            BoardRevision::RevA => &REV_A_MAP,
            BoardRevision::RevB => &REV_B_MAP,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn all_revisions() -> [BoardRevision; 2] {
        [BoardRevision::RevA, BoardRevision::RevB]
    }

    // =========================================================================
    // MotorLines
    // =========================================================================

    #[test]
    fn motor_lines_sample_all_low() {
        let lines = MotorLines::sample(0x00, 0x00);
        assert_eq!(lines, MotorLines::default());
    }

    #[test]
    fn motor_lines_sample_all_high() {
        let lines = MotorLines::sample(0xFF, 0xFF);
        assert_eq!(lines.as_array(), [true; 4]);
    }

    #[test]
    fn motor_lines_sample_positions() {
        // m1a lives on PD0, everything else on port B.
        let lines = MotorLines::sample(0x00, 0x01);
        assert!(lines.m1a);
        assert!(!lines.m1b && !lines.m2a && !lines.m2b);

        let lines = MotorLines::sample(M1B_IN.mask(), 0x00);
        assert_eq!(lines.as_array(), [false, true, false, false]);

        let lines = MotorLines::sample(M2A_IN.mask() | M2B_IN.mask(), 0x00);
        assert_eq!(lines.as_array(), [false, false, true, true]);
    }

    #[test]
    fn motor_lines_ignore_unrelated_bits() {
        // Output and unused bits in the sampled banks must not leak in.
        let lines = MotorLines::sample(!(M1B_IN.mask() | M2A_IN.mask() | M2B_IN.mask()), 0xFE);
        assert_eq!(lines, MotorLines::default());
    }

    // =========================================================================
    // SensorDecisions
    // =========================================================================

    #[test]
    fn decisions_scenario_alternating() {
        let decisions = SensorDecisions::from_readings(&[400, 0, 400, 0, 400], 50, 2);
        assert_eq!(decisions.as_array(), [true, false, true, false, true]);
    }

    #[test]
    fn decisions_strict_greater_than() {
        // 200 >> 2 == 50 exactly; equality must not trip the decision.
        let decisions = SensorDecisions::from_readings(&[200, 201, 204, 199, 0], 50, 2);
        assert_eq!(decisions.as_array(), [false, false, true, false, false]);
    }

    #[test]
    fn decisions_independent_per_sensor() {
        for i in 0..LINE_SENSOR_COUNT {
            let mut readings = [0u16; LINE_SENSOR_COUNT];
            readings[i] = 1023;
            let decisions = SensorDecisions::from_readings(&readings, 100, 2);
            for j in 0..LINE_SENSOR_COUNT {
                assert_eq!(decisions.get(j), i == j);
            }
        }
    }

    #[test]
    fn decisions_zero_shift() {
        let decisions = SensorDecisions::from_readings(&[51, 50, 49, 1023, 0], 50, 0);
        assert_eq!(decisions.as_array(), [true, false, false, true, false]);
    }

    #[test]
    fn decisions_threshold_at_full_scale() {
        // Nothing can exceed a saturated trimpot.
        let decisions = SensorDecisions::from_readings(&[1023; 5], 1023, 0);
        assert_eq!(decisions.as_array(), [false; 5]);
    }

    // =========================================================================
    // Pin configuration
    // =========================================================================

    #[test]
    fn bridge_pins_motor_inputs_have_pullups() {
        for pin in [M1B_IN, M2A_IN, M2B_IN] {
            assert_eq!(BRIDGE_PINS.ddr_b & pin.mask(), 0, "must be input");
            assert_ne!(BRIDGE_PINS.pullup_b & pin.mask(), 0, "pull-up required");
        }
        assert_eq!(BRIDGE_PINS.ddr_d & M1A_IN.mask(), 0);
        assert_ne!(BRIDGE_PINS.pullup_d & M1A_IN.mask(), 0);
    }

    #[test]
    fn output_pins_are_configured_as_outputs() {
        for rev in all_revisions() {
            let map = rev.output_map();
            for i in 0..LINE_SENSOR_COUNT {
                let pin = map.sensor_pin(i);
                let ddr = match pin.port {
                    Port::B => BRIDGE_PINS.ddr_b,
                    Port::D => BRIDGE_PINS.ddr_d,
                };
                assert_ne!(ddr & pin.mask(), 0, "{rev:?} sensor {i} not an output");
            }
            for i in 0..MOTOR_LINE_COUNT {
                let pin = map.motor_pin(i);
                let ddr = match pin.port {
                    Port::B => BRIDGE_PINS.ddr_b,
                    Port::D => BRIDGE_PINS.ddr_d,
                };
                assert_ne!(ddr & pin.mask(), 0, "{rev:?} motor {i} not an output");
            }
        }
    }

    #[test]
    fn mapped_output_pins_are_distinct() {
        for rev in all_revisions() {
            let map = rev.output_map();
            let mut seen: Vec<PortPin> = Vec::new();
            for i in 0..LINE_SENSOR_COUNT {
                seen.push(map.sensor_pin(i));
            }
            for i in 0..MOTOR_LINE_COUNT {
                seen.push(map.motor_pin(i));
            }
            for (i, a) in seen.iter().enumerate() {
                for b in &seen[i + 1..] {
                    assert_ne!(a, b, "{rev:?} has overlapping output pins");
                }
            }
        }
    }

    #[test]
    fn data_pins_do_not_collide_with_constants() {
        for rev in all_revisions() {
            let map = rev.output_map();
            for i in 0..LINE_SENSOR_COUNT {
                let pin = map.sensor_pin(i);
                let constant = match pin.port {
                    Port::B => map.constant_b(),
                    Port::D => map.constant_d(),
                };
                assert_eq!(constant & pin.mask(), 0);
            }
            for i in 0..MOTOR_LINE_COUNT {
                let pin = map.motor_pin(i);
                let constant = match pin.port {
                    Port::B => map.constant_b(),
                    Port::D => map.constant_d(),
                };
                assert_eq!(constant & pin.mask(), 0);
            }
        }
    }

    // =========================================================================
    // Frame assembly
    // =========================================================================

    #[test]
    fn rev_a_exact_bytes_scenario() {
        // Sensors [400,0,400,0,400] at threshold 50, shift 2 -> [1,0,1,0,1];
        // motors all off. Expected straight from the revision A expression:
        // PORTD = 1<<7 | 0<<6 | 0<<5 | 0<<4 | 0<<3 | 1<<2 | 0<<1 | 1 = 0x85
        // PORTB = 0x32 | 0<<3 | 1<<0 = 0x33
        let decisions = SensorDecisions::from_readings(&[400, 0, 400, 0, 400], 50, 2);
        let frame = REV_A_MAP.assemble(&decisions, &MotorLines::default());
        assert_eq!(frame.port_d, 0x85);
        assert_eq!(frame.port_b, 0x33);
    }

    #[test]
    fn rev_a_motor_only_bytes() {
        // m1a=1, m1b=0, m2a=1, m2b=0, no sensor bits:
        // PORTD = 1<<5 | 1<<3 | 1 = 0x29, PORTB = 0x32
        let motors = MotorLines {
            m1a: true,
            m1b: false,
            m2a: true,
            m2b: false,
        };
        let frame = REV_A_MAP.assemble(&SensorDecisions::default(), &motors);
        assert_eq!(frame.port_d, 0x29);
        assert_eq!(frame.port_b, 0x32);
    }

    #[test]
    fn motor_round_trip_both_revisions() {
        let patterns = [
            [true, false, true, false],
            [false, true, false, true],
            [true, true, true, true],
            [false, false, false, false],
        ];
        for rev in all_revisions() {
            let map = rev.output_map();
            for pattern in patterns {
                let motors = MotorLines {
                    m1a: pattern[0],
                    m1b: pattern[1],
                    m2a: pattern[2],
                    m2b: pattern[3],
                };
                let frame = map.assemble(&SensorDecisions::default(), &motors);
                for (i, expected) in pattern.iter().enumerate() {
                    assert_eq!(
                        frame.bit(map.motor_pin(i)),
                        *expected,
                        "{rev:?} motor line {i}"
                    );
                }
            }
        }
    }

    #[test]
    fn sensor_bits_low_when_decisions_false() {
        let motors = MotorLines {
            m1a: false,
            m1b: true,
            m2a: false,
            m2b: true,
        };
        for rev in all_revisions() {
            let map = rev.output_map();
            let frame = map.assemble(&SensorDecisions::default(), &motors);
            for i in 0..LINE_SENSOR_COUNT {
                assert!(!frame.bit(map.sensor_pin(i)), "{rev:?} sensor {i}");
            }
            assert_eq!(
                [
                    frame.bit(map.motor_pin(0)),
                    frame.bit(map.motor_pin(1)),
                    frame.bit(map.motor_pin(2)),
                    frame.bit(map.motor_pin(3)),
                ],
                [false, true, false, true]
            );
        }
    }

    #[test]
    fn constant_bits_invariant_over_all_inputs() {
        for rev in all_revisions() {
            let map = rev.output_map();
            let mut data_mask_b = 0u8;
            let mut data_mask_d = 0u8;
            for i in 0..LINE_SENSOR_COUNT {
                match map.sensor_pin(i).port {
                    Port::B => data_mask_b |= map.sensor_pin(i).mask(),
                    Port::D => data_mask_d |= map.sensor_pin(i).mask(),
                }
            }
            for i in 0..MOTOR_LINE_COUNT {
                match map.motor_pin(i).port {
                    Port::B => data_mask_b |= map.motor_pin(i).mask(),
                    Port::D => data_mask_d |= map.motor_pin(i).mask(),
                }
            }

            // Sweep all 512 combinations of decision and motor bits.
            for bits in 0u16..512 {
                let readings = core::array::from_fn(|i| if bits & (1 << i) != 0 { 1023 } else { 0 });
                let decisions = SensorDecisions::from_readings(&readings, 0, 0);
                let motors = MotorLines {
                    m1a: bits & 0x020 != 0,
                    m1b: bits & 0x040 != 0,
                    m2a: bits & 0x080 != 0,
                    m2b: bits & 0x100 != 0,
                };
                let frame = map.assemble(&decisions, &motors);
                assert_eq!(frame.port_b & !data_mask_b, map.constant_b());
                assert_eq!(frame.port_d & !data_mask_d, map.constant_d());
            }
        }
    }

    #[test]
    fn default_revision_is_rev_a() {
        assert_eq!(BoardRevision::default(), BoardRevision::RevA);
        assert_eq!(BoardRevision::RevA.output_map(), &REV_A_MAP);
        assert_eq!(BoardRevision::RevB.output_map(), &REV_B_MAP);
    }
}
