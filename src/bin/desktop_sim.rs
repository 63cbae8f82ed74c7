//! Desktop simulation of the passthrough bridge.
//!
//! Drives the controller with the mock HAL for a bounded number of
//! iterations and prints each emitted frame. Useful for eyeballing the
//! mapping contract without hardware.
//!
//! ```bash
//! cargo run --bin desktop_sim
//! ```

use anyhow::{anyhow, Result};
use sigbridge::hal::{MockAdc, MockPins, MockSensorArray};
use sigbridge::signal::MotorLines;
use sigbridge::traits::AdcChannel;
use sigbridge::{BridgeConfig, PassthroughController};

fn main() -> Result<()> {
    let mut adc = MockAdc::new();
    adc.set_channel_value(AdcChannel::TRIMPOT, 120);
    adc.noise_amplitude = 2;

    let mut sensors = MockSensorArray::new();
    sensors.set_levels([512, 48, 900, 48, 512]);

    let mut bridge = PassthroughController::new(adc, sensors, MockPins::new(), BridgeConfig::default());
    bridge
        .init()
        .map_err(|_| anyhow!("sensor array init failed"))?;

    // Walk the motor lines through a few commanded states while the line
    // "moves" under the sensors.
    let motor_script = [
        MotorLines { m1a: false, m1b: false, m2a: false, m2b: false },
        MotorLines { m1a: false, m1b: true, m2a: false, m2b: true },
        MotorLines { m1a: true, m1b: false, m2a: true, m2b: false },
        MotorLines { m1a: true, m1b: true, m2a: true, m2b: true },
    ];

    for (iteration, motors) in motor_script.iter().cycle().take(12).enumerate() {
        bridge.pins_mut().set_motor_lines(*motors);
        let frame = bridge
            .step()
            .map_err(|_| anyhow!("sensor read failed at iteration {iteration}"))?;

        println!(
            "[{iteration:02}] threshold={:>4} readings={:?} decisions={:?} motors={:?} -> PORTD={:#04x} PORTB={:#04x}",
            frame.threshold,
            frame.readings,
            frame.decisions.as_array(),
            frame.motors.as_array(),
            frame.output.port_d,
            frame.output.port_b,
        );
    }

    Ok(())
}
