//! ATmega328P line-sensor array backend.
//!
//! The five photodiodes sit on ADC0-ADC4 (PC0-PC4) with the IR emitters
//! switched by PC5. A read lights the emitters, converts each channel in
//! physical order through the acquisition driver, then turns the emitters
//! back off so ambient-light drift stays bounded.

use core::convert::Infallible;

use crate::adc::AcquisitionDriver;
use crate::signal::LINE_SENSOR_COUNT;
use crate::traits::{AdcChannel, SensorArray};

use avr_device::atmega328p;

use super::AtmegaAdc;

const EMITTER_MASK: u8 = 1 << 5;
const SENSOR_INPUT_MASK: u8 = 0x1F;

fn portc() -> &'static atmega328p::portc::RegisterBlock {
    // Safety: see `AtmegaBoard::split`; single-context access only.
    unsafe { &*atmega328p::PORTC::ptr() }
}

/// Line-sensor array with emitter control.
///
/// Holds its own [`AcquisitionDriver`] over the shared converter; every
/// conversion reprograms the converter from scratch, so interleaving with
/// the bridge's threshold conversions is safe at call granularity.
pub struct AtmegaSensorArray {
    driver: AcquisitionDriver<AtmegaAdc>,
    conversion_ticks: u16,
}

impl AtmegaSensorArray {
    pub(crate) fn new() -> Self {
        Self {
            driver: AcquisitionDriver::new(AtmegaAdc::new()),
            conversion_ticks: 0,
        }
    }

    /// The tick budget recorded at init.
    pub fn conversion_ticks(&self) -> u16 {
        self.conversion_ticks
    }
}

impl SensorArray for AtmegaSensorArray {
    type Error = Infallible;

    fn init(&mut self, conversion_ticks: u16) -> Result<(), Infallible> {
        self.conversion_ticks = conversion_ticks;
        // Sensor pins are analog inputs; the emitter line is a driven
        // output, off until a read is in progress.
        portc()
            .ddrc()
            .modify(|r, w| unsafe { w.bits((r.bits() & !SENSOR_INPUT_MASK) | EMITTER_MASK) });
        portc()
            .portc()
            .modify(|r, w| unsafe { w.bits(r.bits() & !EMITTER_MASK) });
        Ok(())
    }

    fn read_line_sensors(&mut self) -> Result<[u16; LINE_SENSOR_COUNT], Infallible> {
        portc()
            .portc()
            .modify(|r, w| unsafe { w.bits(r.bits() | EMITTER_MASK) });

        let mut readings = [0u16; LINE_SENSOR_COUNT];
        for (reading, channel) in readings.iter_mut().zip(AdcChannel::LINE_SENSORS) {
            *reading = self.driver.convert(channel);
        }

        portc()
            .portc()
            .modify(|r, w| unsafe { w.bits(r.bits() & !EMITTER_MASK) });
        Ok(readings)
    }
}
