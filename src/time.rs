//! Calendar time and the timekeeping register block
//!
//! SECONDS..YEAR (0x0A..=0x10) are read and written as one 7-byte burst. The
//! hardware epoch is 2000; the century bit in MONTH adds another 100 years,
//! giving a supported range of 2000-01-01 to 2199-12-31.

use core::fmt::Write as _;
use heapless::String;

use crate::bcd::{self, HourMode, InvalidBcd};
use crate::error::Error;
use crate::interface::RegisterAccess;
use crate::registers::{reg, TIME_SIZE};

/// First year representable by the two-digit year register.
pub const BASE_YEAR: u16 = 2000;
/// Last supported year (century bit set, year register 99).
pub const MAX_YEAR: u16 = 2199;

/// Earliest supported time.
pub const RANGE_MIN: CivilTime = CivilTime {
    year: 2000,
    month: 1,
    day: 1,
    weekday: 6,
    hour: 0,
    minute: 0,
    second: 0,
};

/// Latest supported time.
pub const RANGE_MAX: CivilTime = CivilTime {
    year: 2199,
    month: 12,
    day: 31,
    weekday: 2,
    hour: 23,
    minute: 59,
    second: 59,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CivilTime {
    pub year: u16,   // full year, 2000..=2199
    pub month: u8,   // 1..=12
    pub day: u8,     // 1..=31
    pub weekday: u8, // 0..=6, 0 = Sunday
    pub hour: u8,    // 0..=23
    pub minute: u8,  // 0..=59
    pub second: u8,  // 0..=59
}

impl CivilTime {
    /// Build a time and fill in the weekday from the date.
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let mut t = Self { year, month, day, weekday: 0, hour, minute, second };
        t.calculate_weekday();
        t
    }

    /// Set `weekday` from the date (Zeller's congruence, 0 = Sunday).
    pub fn calculate_weekday(&mut self) {
        let mut year = self.year as i32;
        let mut month = self.month as i32;

        if month < 3 {
            month += 12;
            year -= 1;
        }

        let k = year % 100;
        let j = year / 100;

        // h: 0 = Saturday
        let h = (self.day as i32 + (13 * (month + 1)) / 5 + k + k / 4 + j / 4 - 2 * j).rem_euclid(7);

        self.weekday = ((h + 6) % 7) as u8;
    }

    /// True when every field is in range and the date lies within
    /// [`RANGE_MIN`, `RANGE_MAX`].
    pub fn is_valid(&self) -> bool {
        (BASE_YEAR..=MAX_YEAR).contains(&self.year)
            && (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.weekday <= 6
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59
    }

    pub fn format_iso8601(&self) -> String<32> {
        let mut s = String::new();
        let _ = core::write!(
            s,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        );
        s
    }
}

pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Map a codec failure on register `reg` to a driver error.
pub(crate) fn corrupt<E>(reg: u8) -> impl Fn(InvalidBcd) -> Error<E> {
    move |InvalidBcd(value)| Error::CorruptRegister { reg, value }
}

/// Decode a two-digit field and check it against `max`.
pub(crate) fn decode_field<E>(reg: u8, raw: u8, mask: u8, min: u8, max: u8) -> Result<u8, Error<E>> {
    let v = bcd::decode_bcd(raw, mask).map_err(corrupt(reg))?;
    if v < min || v > max {
        return Err(Error::CorruptRegister { reg, value: raw });
    }
    Ok(v)
}

/// Decode a SECONDS..YEAR register snapshot.
pub fn decode_time<E>(raw: &[u8; TIME_SIZE]) -> Result<CivilTime, Error<E>> {
    let second = decode_field(reg::SECONDS, raw[0], bcd::SEC_MIN_MASK, 0, 59)?;
    let minute = decode_field(reg::MINUTES, raw[1], bcd::SEC_MIN_MASK, 0, 59)?;
    let hour = bcd::decode_hour(raw[2]).map_err(corrupt(reg::HOURS))?;
    // 1-based on the chip
    let weekday = decode_field(reg::DAY, raw[3], bcd::WEEKDAY_MASK, 1, 7)? - 1;
    let day = decode_field(reg::DATE, raw[4], bcd::DATE_MASK, 1, 31)?;
    let (month, century) = bcd::decode_month(raw[5]).map_err(corrupt(reg::MONTH))?;
    let mut year = BASE_YEAR + decode_field(reg::YEAR, raw[6], bcd::YEAR_MASK, 0, 99)? as u16;
    if century {
        year += 100;
    }

    if day > days_in_month(year, month) {
        return Err(Error::CorruptRegister { reg: reg::DATE, value: raw[4] });
    }

    Ok(CivilTime { year, month, day, weekday, hour, minute, second })
}

/// Encode a time into a SECONDS..YEAR register block. Hours are written in `mode`.
pub fn encode_time<E>(t: &CivilTime, mode: HourMode) -> Result<[u8; TIME_SIZE], Error<E>> {
    if !t.is_valid() {
        return Err(Error::InvalidTime);
    }
    let enc = |v: u8| bcd::encode_bcd(v).map_err(|_| Error::InvalidTime);

    let month = bcd::encode_month(t.month, century_of(t)).map_err(|_| Error::InvalidTime)?;

    Ok([
        enc(t.second)?,
        enc(t.minute)?,
        bcd::encode_hour(t.hour, mode).map_err(|_| Error::InvalidTime)?,
        enc(t.weekday + 1)?,
        enc(t.day)?,
        month,
        enc((t.year % 100) as u8)?,
    ])
}

/// Whether the running clock has crossed into the second century (year >= 2100).
pub fn century_of(t: &CivilTime) -> bool {
    t.year >= BASE_YEAR + 100
}

/// One burst read of the timekeeping block.
pub fn read_time<A: RegisterAccess>(bus: &mut A) -> Result<CivilTime, Error<A::Error>> {
    let mut raw = [0u8; TIME_SIZE];
    bus.bulk_read(reg::SECONDS, &mut raw).map_err(Error::Bus)?;
    decode_time(&raw)
}

/// One burst write of the timekeeping block; never split into per-field writes.
pub fn write_time<A: RegisterAccess>(
    bus: &mut A,
    t: &CivilTime,
    mode: HourMode,
) -> Result<(), Error<A::Error>> {
    let raw = encode_time(t, mode)?;
    bus.bulk_write(reg::SECONDS, &raw).map_err(Error::Bus)
}
