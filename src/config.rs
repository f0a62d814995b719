//! Static board configuration consumed at bring-up.

use crate::bcd::HourMode;
use crate::registers::MAX31335_ADDR;
use crate::trickle::TrickleConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit I2C address.
    pub address: u8,
    /// Trickle charger path, applied once at bring-up.
    pub trickle: Option<TrickleConfig>,
    /// A clock consumer is declared for the CLKOUT pin; gates clock-output registration.
    pub clock_output: bool,
    /// Interrupt line wired to INTA, if any. Without one the alarm feature is disabled.
    pub irq: Option<u32>,
    /// Format used when writing hour registers.
    pub hour_mode: HourMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: MAX31335_ADDR,
            trickle: None,
            clock_output: false,
            irq: None,
            hour_mode: HourMode::H24,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    pub fn with_trickle(mut self, resistor_ohms: u32, diode: bool) -> Self {
        self.trickle = Some(TrickleConfig::new(resistor_ohms, diode));
        self
    }

    pub fn with_clock_output(mut self, present: bool) -> Self {
        self.clock_output = present;
        self
    }

    pub fn with_irq(mut self, line: u32) -> Self {
        self.irq = Some(line);
        self
    }

    pub fn with_hour_mode(mut self, mode: HourMode) -> Self {
        self.hour_mode = mode;
        self
    }
}
