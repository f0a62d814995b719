//! MAX31335 Real-Time Clock driver
//!
//! Driver for the Analog Devices MAX31335 I2C RTC.
//!
//! Features:
//! - Read/write calendar time (2000-01-01 ..= 2199-12-31, 12h or 24h hour registers)
//! - Alarm 1 with interrupt handling
//! - Aging offset (oscillator trim)
//! - Trickle charger setup
//! - Clock output (1 Hz, 64 Hz, 1024 Hz, 32768 Hz)
//!
//! The driver is written against [`RegisterAccess`]; [`I2cInterface`] binds it
//! to any `embedded_hal::i2c::I2c` bus.
//!
//! ```ignore
//! let config = Config::new().with_irq(INTA_LINE).with_trickle(6000, true);
//! let rtc: &'static Max31335<_> = RTC.init(Max31335::new_i2c(i2c, &config)?);
//! rtc.attach_irq(|line| platform.request_irq(line));
//! let irq = AlarmIrq::new(rtc, host_events);
//! let now = rtc.read_time()?;
//! ```

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod alarm;
pub mod bcd;
pub mod clkout;
pub mod config;
pub mod device;
pub mod error;
pub mod interface;
pub mod irq;
pub mod offset;
pub mod registers;
pub mod time;
pub mod trickle;

#[cfg(test)]
mod testing;

pub use alarm::AlarmDescriptor;
pub use bcd::HourMode;
pub use clkout::ClockOutput;
pub use config::Config;
pub use device::{Features, Max31335, RtcOps};
pub use error::Error;
pub use interface::{CachedInterface, I2cInterface, RegisterAccess};
pub use irq::{AlarmIrq, IrqReturn, RtcEventSink, RtcEvents};
pub use time::CivilTime;
pub use trickle::TrickleConfig;
