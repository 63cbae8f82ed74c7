//! ATmega328P analog-to-digital converter backend.

use crate::traits::{AdcChannel, AdcConverter, Alignment, ConversionSettings, Reference};

use avr_device::atmega328p;

fn regs() -> &'static atmega328p::adc::RegisterBlock {
    // Safety: the bridge runs a single execution context and the wrappers
    // are only constructed by `AtmegaBoard::split`, which consumed the
    // peripheral singleton.
    unsafe { &*atmega328p::ADC::ptr() }
}

const fn reference_bits(reference: Reference) -> u8 {
    match reference {
        Reference::Aref => 0b00,
        Reference::Avcc => 0b01,
        Reference::Internal1V1 => 0b11,
    }
}

/// Polled converter over the chip's ADCSRA/ADMUX/ADC registers.
pub struct AtmegaAdc {
    high_latch: u8,
}

impl AtmegaAdc {
    pub(crate) fn new() -> Self {
        Self { high_latch: 0 }
    }
}

impl AdcConverter for AtmegaAdc {
    fn is_busy(&mut self) -> bool {
        regs().adcsra().read().adsc().bit_is_set()
    }

    fn configure(&mut self, settings: ConversionSettings, channel: AdcChannel) {
        // ADEN set, ADSC/ADATE/ADIE clear, prescaler select in the low
        // bits. Writing ADIF back clears any completion flag left over
        // from an earlier conversion.
        let adcsra = 0x80 | 0x10 | settings.prescaler.bits();
        regs().adcsra().write(|w| unsafe { w.bits(adcsra) });

        let adlar = match settings.alignment {
            Alignment::Right => 0,
            Alignment::Left => 1 << 5,
        };
        let admux = (reference_bits(settings.reference) << 6) | adlar | channel.mux_bits();
        regs().admux().write(|w| unsafe { w.bits(admux) });
    }

    fn start_conversion(&mut self) {
        regs().adcsra().modify(|_, w| w.adsc().set_bit());
    }

    fn is_ready(&mut self) -> bool {
        regs().adcsra().read().adif().bit_is_set()
    }

    fn read_result_low(&mut self) -> u8 {
        // The device presents the result as a byte pair; the generated API
        // reads the pair as one 16-bit access in the required low-then-high
        // order, so the high byte is latched here for the follow-up read.
        let value = regs().adc().read().bits();
        self.high_latch = (value >> 8) as u8;
        (value & 0xFF) as u8
    }

    fn read_result_high(&mut self) -> u8 {
        self.high_latch
    }
}
