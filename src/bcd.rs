//! Packed-BCD codec for the calendar registers
//!
//! Besides plain two-digit fields this covers the two overloaded bytes:
//! - HOURS: bit6 selects 12h mode; in 12h mode bit5 is PM and the value is
//!   5-bit BCD 1..=12, in 24h mode the value is 6-bit BCD 0..=23.
//! - MONTH: bit7 is the century flag, the month itself is 5-bit BCD.

use crate::registers::{HRS_F_12_24, HRS_F_AM_PM, MONTH_CENTURY};

/// Mask for seconds/minutes (bit7 reserved).
pub const SEC_MIN_MASK: u8 = 0x7F;
/// Mask for a 24h hour value.
pub const HOUR24_MASK: u8 = 0x3F;
/// Mask for a 12h hour value.
pub const HOUR12_MASK: u8 = 0x1F;
/// Mask for the weekday register.
pub const WEEKDAY_MASK: u8 = 0x07;
/// Mask for day-of-month.
pub const DATE_MASK: u8 = 0x3F;
/// Mask for the month (century bit stripped).
pub const MONTH_MASK: u8 = 0x1F;
/// Year registers use the full byte.
pub const YEAR_MASK: u8 = 0xFF;

/// Raw byte that failed to decode, or binary value that cannot be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidBcd(pub u8);

/// Decode the BCD digits left after applying `mask`. Nibbles above 9 are rejected.
#[inline]
pub fn decode_bcd(value: u8, mask: u8) -> Result<u8, InvalidBcd> {
    let b = value & mask;
    let hi = b >> 4;
    let lo = b & 0x0F;
    if hi <= 9 && lo <= 9 {
        Ok(hi * 10 + lo)
    } else {
        Err(InvalidBcd(value))
    }
}

/// Encode 0..=99 as packed BCD.
#[inline]
pub fn encode_bcd(value: u8) -> Result<u8, InvalidBcd> {
    if value > 99 {
        return Err(InvalidBcd(value));
    }
    Ok(((value / 10) << 4) | (value % 10))
}

/// Hour format used when writing the HOURS register.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourMode {
    #[default]
    H24,
    H12,
}

/// Decoded content of an hours register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HourRegister {
    /// 24h mode, 0..=23
    H24(u8),
    /// 12h mode, 1..=12 plus meridiem
    H12 { hour: u8, pm: bool },
}

impl HourRegister {
    /// Branch on the 12/24 bit before applying the width mask.
    pub fn from_raw(raw: u8) -> Result<Self, InvalidBcd> {
        if raw & HRS_F_12_24 == 0 {
            let hour = decode_bcd(raw, HOUR24_MASK)?;
            if hour > 23 {
                return Err(InvalidBcd(raw));
            }
            Ok(HourRegister::H24(hour))
        } else {
            let hour = decode_bcd(raw, HOUR12_MASK)?;
            if hour == 0 || hour > 12 {
                return Err(InvalidBcd(raw));
            }
            Ok(HourRegister::H12 { hour, pm: raw & HRS_F_AM_PM != 0 })
        }
    }

    pub fn to_raw(self) -> Result<u8, InvalidBcd> {
        match self {
            HourRegister::H24(hour) if hour <= 23 => encode_bcd(hour),
            HourRegister::H12 { hour, pm } if (1..=12).contains(&hour) => {
                let mut raw = HRS_F_12_24 | encode_bcd(hour)?;
                if pm {
                    raw |= HRS_F_AM_PM;
                }
                Ok(raw)
            }
            HourRegister::H24(hour) | HourRegister::H12 { hour, .. } => Err(InvalidBcd(hour)),
        }
    }

    /// Representation of a 0..=23 hour in the given mode.
    pub fn from_hour(hour: u8, mode: HourMode) -> Self {
        match mode {
            HourMode::H24 => HourRegister::H24(hour),
            HourMode::H12 => {
                let pm = hour >= 12;
                let h = match hour % 12 {
                    0 => 12,
                    h => h,
                };
                HourRegister::H12 { hour: h, pm }
            }
        }
    }

    /// Hour normalised to 0..=23.
    pub fn hour(self) -> u8 {
        match self {
            HourRegister::H24(hour) => hour,
            HourRegister::H12 { hour, pm } => {
                let h = if hour == 12 { 0 } else { hour };
                if pm { h + 12 } else { h }
            }
        }
    }
}

/// Decode an hours register to 0..=23 regardless of mode.
pub fn decode_hour(raw: u8) -> Result<u8, InvalidBcd> {
    HourRegister::from_raw(raw).map(HourRegister::hour)
}

/// Encode a 0..=23 hour in the given mode.
pub fn encode_hour(hour: u8, mode: HourMode) -> Result<u8, InvalidBcd> {
    if hour > 23 {
        return Err(InvalidBcd(hour));
    }
    HourRegister::from_hour(hour, mode).to_raw()
}

/// Decode a month register into (month 1..=12, century flag).
pub fn decode_month(raw: u8) -> Result<(u8, bool), InvalidBcd> {
    let month = decode_bcd(raw, MONTH_MASK)?;
    if month == 0 || month > 12 {
        return Err(InvalidBcd(raw));
    }
    Ok((month, raw & MONTH_CENTURY != 0))
}

/// Encode month 1..=12 and the century flag.
pub fn encode_month(month: u8, century: bool) -> Result<u8, InvalidBcd> {
    if month == 0 || month > 12 {
        return Err(InvalidBcd(month));
    }
    let mut raw = encode_bcd(month)?;
    if century {
        raw |= MONTH_CENTURY;
    }
    Ok(raw)
}
