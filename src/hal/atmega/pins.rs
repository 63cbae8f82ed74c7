//! ATmega328P digital pin banks (PORTB/PORTD).

use crate::signal::PinConfig;
use crate::traits::SignalPins;

use avr_device::atmega328p;

fn portb() -> &'static atmega328p::portb::RegisterBlock {
    // Safety: see `AtmegaBoard::split`; single-context access only.
    unsafe { &*atmega328p::PORTB::ptr() }
}

fn portd() -> &'static atmega328p::portd::RegisterBlock {
    unsafe { &*atmega328p::PORTD::ptr() }
}

/// The two I/O banks the bridge owns for its process lifetime.
pub struct AtmegaPins {
    _private: (),
}

impl AtmegaPins {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

impl SignalPins for AtmegaPins {
    fn apply_config(&mut self, config: &PinConfig) {
        portb().ddrb().write(|w| unsafe { w.bits(config.ddr_b) });
        portd().ddrd().write(|w| unsafe { w.bits(config.ddr_d) });
        // Writing an input pin's port bit enables its pull-up; output pins
        // start low until the first frame is emitted.
        portb().portb().write(|w| unsafe { w.bits(config.pullup_b) });
        portd().portd().write(|w| unsafe { w.bits(config.pullup_d) });
    }

    fn read_input_b(&self) -> u8 {
        portb().pinb().read().bits()
    }

    fn read_input_d(&self) -> u8 {
        portd().pind().read().bits()
    }

    fn write_port_b(&mut self, value: u8) {
        portb().portb().write(|w| unsafe { w.bits(value) });
    }

    fn write_port_d(&mut self, value: u8) {
        portd().portd().write(|w| unsafe { w.bits(value) });
    }
}
