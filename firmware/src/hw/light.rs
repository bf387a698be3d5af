//! ADC sampling of the photodiode divider input.
//!
//! Wires the Embassy ADC driver into the [`LightSource`] seam consumed by
//! the sampling task. Readings are scaled from the converter's 12-bit range
//! to the full `u16` span the trigger thresholds are calibrated against.

#![cfg(target_os = "none")]

use embassy_stm32::Peri;
use embassy_stm32::adc::{Adc, SampleTime};
use embassy_stm32::peripherals::{ADC1, PA0};

use sensor_core::trigger::Sample;

use crate::sensing::LightSource;

/// Embassy ADC wrapper reading the light sensor divider on PA0.
pub struct LightSensorAdc<'d> {
    adc: Adc<'d, ADC1>,
    pin: Peri<'d, PA0>,
    discard_next: bool,
}

impl<'d> LightSensorAdc<'d> {
    /// Constructs a new reader with a long sample window for the
    /// high-impedance divider.
    pub fn new(mut adc: Adc<'d, ADC1>, pin: Peri<'d, PA0>) -> Self {
        adc.set_sample_time(SampleTime::CYCLES160_5);
        Self {
            adc,
            pin,
            discard_next: true,
        }
    }

    fn read_once(&mut self) -> u16 {
        self.adc.blocking_read(&mut self.pin)
    }
}

impl<'d> LightSource for LightSensorAdc<'d> {
    fn read_raw(&mut self) -> Sample {
        if self.discard_next {
            // The first conversion after power-up reads the sampling
            // capacitor, not the divider.
            let _ = self.read_once();
            self.discard_next = false;
        }

        // 12-bit conversion scaled to the u16 range.
        self.read_once() << 4
    }
}
