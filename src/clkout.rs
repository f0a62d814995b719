//! CLKOUT pin as a rate-controllable clock source
//!
//! RTC_CONFIG2 bits 1:0 select one of four frequencies, bit 2 gates the pin.
//! Only registered when the board declares a consumer for the clock.

use core::ops::Deref;

use crate::config::Config;
use crate::device::{Features, Max31335};
use crate::error::Error;
use crate::interface::RegisterAccess;
use crate::registers::{reg, CLKOUT_FREQ, ENCLKO};

/// Selectable output frequencies in Hz, indexed by the CLKOUT_FREQ field.
pub const CLKOUT_FREQ_HZ: [u32; 4] = [1, 64, 1024, 32768];

pub const CLKOUT_NAME: &str = "max31335-clkout";

/// Index of the closest supported rate; ties go to the lower index.
pub fn find_closest(rate: u32) -> usize {
    let mut best = 0;
    for (i, &f) in CLKOUT_FREQ_HZ.iter().enumerate().skip(1) {
        if f.abs_diff(rate) < CLKOUT_FREQ_HZ[best].abs_diff(rate) {
            best = i;
        }
    }
    best
}

/// Closest supported rate to `rate`.
pub fn round_rate(rate: u32) -> u32 {
    CLKOUT_FREQ_HZ[find_closest(rate)]
}

pub struct ClockOutput<D> {
    rtc: D,
}

impl<D, A> ClockOutput<D>
where
    D: Deref<Target = Max31335<A>>,
    A: RegisterAccess,
{
    /// Register the clock source if the board asks for it and turn the
    /// output on. Returns `Ok(None)` when no consumer is declared.
    pub fn register(rtc: D, config: &Config) -> Result<Option<Self>, Error<A::Error>> {
        if !config.clock_output {
            return Ok(None);
        }

        let clk = Self { rtc };
        if let Err(e) = clk.enable() {
            error!("cannot enable clkout: {}", e.as_str());
            return Err(e);
        }
        clk.rtc.set_feature(Features::CLOCK_OUTPUT);
        info!("{} registered", CLKOUT_NAME);
        Ok(Some(clk))
    }

    pub fn name(&self) -> &'static str {
        CLKOUT_NAME
    }

    /// Rate currently selected in hardware, 0 if it cannot be read.
    pub fn recalc_rate(&self) -> u32 {
        match self.rtc.lock().read(reg::RTC_CONFIG2) {
            Ok(v) => CLKOUT_FREQ_HZ[CLKOUT_FREQ.get(v) as usize],
            Err(_) => 0,
        }
    }

    pub fn round_rate(&self, rate: u32) -> u32 {
        round_rate(rate)
    }

    /// Select the closest supported rate.
    pub fn set_rate(&self, rate: u32) -> Result<(), Error<A::Error>> {
        let index = find_closest(rate) as u8;
        self.rtc
            .lock()
            .update_bits(reg::RTC_CONFIG2, CLKOUT_FREQ.mask(), CLKOUT_FREQ.prep(index))
            .map_err(Error::Bus)
    }

    pub fn enable(&self) -> Result<(), Error<A::Error>> {
        self.rtc.lock().set_bits(reg::RTC_CONFIG2, ENCLKO).map_err(Error::Bus)
    }

    pub fn disable(&self) -> Result<(), Error<A::Error>> {
        let res = self.rtc.lock().clear_bits(reg::RTC_CONFIG2, ENCLKO).map_err(Error::Bus);
        if let Err(e) = &res {
            warn!("cannot disable clkout: {}", e.as_str());
        }
        res
    }

    pub fn is_enabled(&self) -> Result<bool, Error<A::Error>> {
        let v = self.rtc.lock().read(reg::RTC_CONFIG2).map_err(Error::Bus)?;
        Ok(v & ENCLKO != 0)
    }
}
