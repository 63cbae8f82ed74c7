//! ATmega328P passthrough bridge firmware.
//!
//! Freestanding entry point for the board: no arguments, no exit, no
//! operator interface. The loop rate is set entirely by conversion latency.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --no-default-features --features atmega \
//!     --target avr-atmega328p.json -Z build-std=core
//! ```

#![no_std]
#![no_main]

use panic_halt as _;

use sigbridge::hal::atmega::AtmegaBoard;
use sigbridge::{BridgeConfig, PassthroughController, RunBudget};

#[avr_device::entry]
fn main() -> ! {
    let peripherals = avr_device::atmega328p::Peripherals::take().unwrap();
    let (adc, sensors, pins) = AtmegaBoard::split(peripherals);

    let mut bridge = PassthroughController::new(adc, sensors, pins, BridgeConfig::default());

    loop {
        // Init cannot fail on this backend and the run budget is Forever,
        // so control never actually comes back around.
        let _ = bridge.init();
        let _ = bridge.run(RunBudget::Forever);
    }
}
