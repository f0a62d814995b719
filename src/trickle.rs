//! Backup-supply trickle charger
//!
//! TRICKLE bits 3:1 pick the charge path: 1..=3 select 3k/6k/11k through a
//! Schottky diode, 4..=6 the same resistors with an extra standard diode.
//! Bit 0 enables charging. Written once at bring-up.

use crate::error::Error;
use crate::interface::RegisterAccess;
use crate::registers::{reg, EN_TRICKLE, TRICKLE_SEL};

/// Supported series resistors, in ohms.
pub const TRICKLE_RESISTORS: [u32; 3] = [3000, 6000, 11000];

const SCHOTTKY_OFFSET: u8 = 1;
const DIODE_OFFSET: u8 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrickleConfig {
    pub resistor_ohms: u32,
    pub diode: bool,
}

impl TrickleConfig {
    pub const fn new(resistor_ohms: u32, diode: bool) -> Self {
        Self { resistor_ohms, diode }
    }

    /// Position of the resistor in [`TRICKLE_RESISTORS`].
    pub fn lookup(ohms: u32) -> Option<u8> {
        TRICKLE_RESISTORS.iter().position(|&r| r == ohms).map(|i| i as u8)
    }

    /// Charge-path selector for bits 3:1.
    pub fn selector<E>(&self) -> Result<u8, Error<E>> {
        let index = Self::lookup(self.resistor_ohms).ok_or(Error::UnsupportedValue)?;
        Ok(if self.diode { index + DIODE_OFFSET } else { index + SCHOTTKY_OFFSET })
    }

    /// Full TRICKLE register value, charger enabled.
    pub fn register_value<E>(&self) -> Result<u8, Error<E>> {
        Ok(TRICKLE_SEL.prep(self.selector()?) | EN_TRICKLE)
    }
}

/// Apply `config`. An unsupported resistor is logged and skipped; only a bus
/// failure is returned.
pub fn setup<A: RegisterAccess>(bus: &mut A, config: &TrickleConfig) -> Result<(), Error<A::Error>> {
    let value = match config.register_value::<A::Error>() {
        Ok(v) => v,
        Err(_) => {
            warn!("invalid trickle resistor value {}", config.resistor_ohms);
            return Ok(());
        }
    };
    debug!("trickle charger: 0x{:02X}", value);
    bus.write(reg::TRICKLE, value).map_err(Error::Bus)
}
