//! MAX31335 register map
//!
//! Addresses, bit fields and the volatile-register predicate used by the
//! caching register layer. All timekeeping registers are packed BCD.

/// Default 7-bit I2C address of the MAX31335.
pub const MAX31335_ADDR: u8 = 0x69;

/// Highest valid register address.
pub const MAX_REGISTER: u8 = 0x5F;

/// Number of registers in the map (0x00..=MAX_REGISTER).
pub const REGISTER_COUNT: usize = MAX_REGISTER as usize + 1;

/// Register addresses.
#[allow(dead_code)]
pub mod reg {
    // Status / control
    pub const STATUS1: u8 = 0x00;
    pub const INT_EN1: u8 = 0x01;
    pub const STATUS2: u8 = 0x02;
    pub const INT_EN2: u8 = 0x03;
    pub const RTC_RESET: u8 = 0x04;
    pub const RTC_CONFIG: u8 = 0x05;
    pub const RTC_CONFIG2: u8 = 0x06;
    pub const TIMESTAMP_CONFIG: u8 = 0x07;
    pub const TIMER_CONFIG: u8 = 0x08;

    // Timekeeping (sequential BCD, seconds..year)
    pub const SECONDS_1_128: u8 = 0x09;
    pub const SECONDS: u8 = 0x0A; // bit7 reserved
    pub const MINUTES: u8 = 0x0B;
    pub const HOURS: u8 = 0x0C; // bit6 12/24, bit5 AM/PM in 12h mode
    pub const DAY: u8 = 0x0D; // weekday 1-7
    pub const DATE: u8 = 0x0E;
    pub const MONTH: u8 = 0x0F; // bit7 century
    pub const YEAR: u8 = 0x10;

    // Alarm 1 (seconds..year)
    pub const ALM1_SEC: u8 = 0x11;
    pub const ALM1_MIN: u8 = 0x12;
    pub const ALM1_HRS: u8 = 0x13;
    pub const ALM1_DAY_DATE: u8 = 0x14;
    pub const ALM1_MON: u8 = 0x15;
    pub const ALM1_YEAR: u8 = 0x16;

    // Alarm 2 (minutes..day/date)
    pub const ALM2_MIN: u8 = 0x17;
    pub const ALM2_HRS: u8 = 0x18;
    pub const ALM2_DAY_DATE: u8 = 0x19;

    pub const TIMER_COUNT: u8 = 0x1A;
    pub const TIMER_INIT: u8 = 0x1B;
    pub const PWR_MGMT: u8 = 0x1C;
    pub const TRICKLE: u8 = 0x1D;
    pub const AGING_OFFSET: u8 = 0x1E;

    // Temperature sensor
    pub const TS_CONFIG: u8 = 0x30;
    pub const TEMP_ALARM_HIGH_MSB: u8 = 0x31;
    pub const TEMP_ALARM_HIGH_LSB: u8 = 0x32;
    pub const TEMP_ALARM_LOW_MSB: u8 = 0x33;
    pub const TEMP_ALARM_LOW_LSB: u8 = 0x34;
    pub const TEMP_DATA_MSB: u8 = 0x35;
    pub const TEMP_DATA_LSB: u8 = 0x36;

    // Timestamp banks, 8 registers each: sec/128, sec, min, hour, date, month, year, flags
    pub const TS0_BASE: u8 = 0x40;
    pub const TS1_BASE: u8 = 0x48;
    pub const TS2_BASE: u8 = 0x50;
    pub const TS3_BASE: u8 = 0x58;
}

/// Number of calendar registers read/written as one block (seconds..year).
pub const TIME_SIZE: usize = 7;

/// Number of alarm 1 registers read/written as one block (seconds..year).
pub const ALARM_SIZE: usize = 6;

// STATUS1
pub const STATUS1_A1F: u8 = 1 << 0;

// INT_EN1
pub const INT_EN1_A1IE: u8 = 1 << 0;

// TRICKLE: bits 3:1 select the resistor/diode path, bit 0 enables charging
pub const TRICKLE_SEL: Field = Field::new(1, 3);
pub const EN_TRICKLE: u8 = 1 << 0;

// HOURS
pub const HRS_F_AM_PM: u8 = 1 << 5;
pub const HRS_F_12_24: u8 = 1 << 6;

// MONTH
pub const MONTH_CENTURY: u8 = 1 << 7;

// RTC_CONFIG2: bits 1:0 clock-out frequency, bit 2 clock-out enable
pub const CLKOUT_FREQ: Field = Field::new(0, 2);
pub const ENCLKO: u8 = 1 << 2;

/// A contiguous bit range inside a register byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub offset: u8,
    pub width: u8,
}

impl Field {
    pub const fn new(offset: u8, width: u8) -> Self {
        Self { offset, width }
    }

    /// Mask of the field in register position.
    pub const fn mask(&self) -> u8 {
        (((1u16 << self.width) - 1) as u8) << self.offset
    }

    /// Extract the field value from a register byte.
    pub const fn get(&self, reg: u8) -> u8 {
        (reg & self.mask()) >> self.offset
    }

    /// Place `value` into the field position; bits outside the width are dropped.
    pub const fn prep(&self, value: u8) -> u8 {
        (value << self.offset) & self.mask()
    }
}

/// Registers that must always be fetched live: the timekeeping block,
/// the interrupt status register and the temperature data.
pub fn is_volatile(register: u8) -> bool {
    let time_end = reg::SECONDS + TIME_SIZE as u8;
    (reg::SECONDS..time_end).contains(&register)
        || register == reg::STATUS1
        || register == reg::TEMP_DATA_MSB
        || register == reg::TEMP_DATA_LSB
}
