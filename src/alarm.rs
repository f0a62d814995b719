//! Alarm 1 translation
//!
//! ALM1_SEC..ALM1_YEAR hold a two-digit year with no century bit of their own,
//! so the century is borrowed from the running clock. Enable and pending state
//! live in INT_EN1.A1IE and STATUS1.A1F and are never shadowed here.

use crate::bcd::{self, HourMode};
use crate::error::Error;
use crate::interface::RegisterAccess;
use crate::registers::{reg, ALARM_SIZE, INT_EN1_A1IE, STATUS1_A1F};
use crate::time::{self, decode_field, CivilTime, BASE_YEAR};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmDescriptor {
    /// Match time. `weekday` is derived from the date on read and ignored on write.
    pub time: CivilTime,
    pub enabled: bool,
    pub pending: bool,
}

/// Decode an alarm register snapshot; `century` comes from the live clock.
pub fn decode_alarm<E>(raw: &[u8; ALARM_SIZE], century: bool) -> Result<CivilTime, Error<E>> {
    let second = decode_field(reg::ALM1_SEC, raw[0], bcd::SEC_MIN_MASK, 0, 59)?;
    let minute = decode_field(reg::ALM1_MIN, raw[1], bcd::SEC_MIN_MASK, 0, 59)?;
    let hour = bcd::decode_hour(raw[2]).map_err(time::corrupt(reg::ALM1_HRS))?;
    let day = decode_field(reg::ALM1_DAY_DATE, raw[3], bcd::DATE_MASK, 1, 31)?;
    // Top bits of ALM1_MON are match-mask bits, not a century flag
    let month = decode_field(reg::ALM1_MON, raw[4], bcd::MONTH_MASK, 1, 12)?;
    let mut year = BASE_YEAR + decode_field(reg::ALM1_YEAR, raw[5], bcd::YEAR_MASK, 0, 99)? as u16;
    if century {
        year += 100;
    }

    if day > time::days_in_month(year, month) {
        return Err(Error::CorruptRegister { reg: reg::ALM1_DAY_DATE, value: raw[3] });
    }

    Ok(CivilTime::new(year, month, day, hour, minute, second))
}

pub fn encode_alarm<E>(t: &CivilTime, mode: HourMode) -> Result<[u8; ALARM_SIZE], Error<E>> {
    let mut checked = *t;
    checked.calculate_weekday();
    if !checked.is_valid() {
        return Err(Error::InvalidTime);
    }
    let enc = |v: u8| bcd::encode_bcd(v).map_err(|_| Error::InvalidTime);

    Ok([
        enc(t.second)?,
        enc(t.minute)?,
        bcd::encode_hour(t.hour, mode).map_err(|_| Error::InvalidTime)?,
        enc(t.day)?,
        enc(t.month)?,
        enc((t.year % 100) as u8)?,
    ])
}

/// Read the alarm, the live clock (for the century) and the enable/pending bits.
pub fn read_alarm<A: RegisterAccess>(bus: &mut A) -> Result<AlarmDescriptor, Error<A::Error>> {
    let mut raw = [0u8; ALARM_SIZE];
    bus.bulk_read(reg::ALM1_SEC, &mut raw).map_err(Error::Bus)?;

    let now = time::read_time(bus)?;
    let alarm_time = decode_alarm(&raw, time::century_of(&now))?;

    let ctrl = bus.read(reg::INT_EN1).map_err(Error::Bus)?;
    let status = bus.read(reg::STATUS1).map_err(Error::Bus)?;

    Ok(AlarmDescriptor {
        time: alarm_time,
        enabled: ctrl & INT_EN1_A1IE != 0,
        pending: status & STATUS1_A1F != 0,
    })
}

/// Program the alarm time, apply the enable bit and clear a stale pending flag.
///
/// Both register updates after the time burst are always attempted; the first
/// failure is returned so a half-configured alarm is never reported as success.
pub fn write_alarm<A: RegisterAccess>(
    bus: &mut A,
    alarm: &AlarmDescriptor,
    mode: HourMode,
) -> Result<(), Error<A::Error>> {
    let raw = encode_alarm(&alarm.time, mode)?;
    bus.bulk_write(reg::ALM1_SEC, &raw).map_err(Error::Bus)?;

    let enable = set_alarm_enabled(bus, alarm.enabled);
    let clear = bus.clear_bits(reg::STATUS1, STATUS1_A1F).map_err(Error::Bus);
    enable.and(clear)
}

/// Masked update of the alarm interrupt enable; the alarm time is untouched.
pub fn set_alarm_enabled<A: RegisterAccess>(bus: &mut A, enabled: bool) -> Result<(), Error<A::Error>> {
    let value = if enabled { INT_EN1_A1IE } else { 0 };
    bus.update_bits(reg::INT_EN1, INT_EN1_A1IE, value).map_err(Error::Bus)
}
