//! MAX31335 device context
//!
//! One `Max31335` per chip. The register interface sits behind a spin mutex;
//! every host operation locks once and runs its whole register sequence under
//! that lock, which is what serialises alarm programming against the alarm
//! interrupt handler. Share it with the handler and clock output through any
//! `Deref` handle (`&'static` on firmware, `Arc` on hosted targets). The lock
//! spins, so nothing here may be called from a hard ISR; see `AlarmIrq`.

use core::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use spin::{Mutex, MutexGuard};

use crate::alarm::{self, AlarmDescriptor};
use crate::bcd::HourMode;
use crate::config::Config;
use crate::error::Error;
use crate::interface::{I2cInterface, RegisterAccess};
use crate::offset;
use crate::registers::reg;
use crate::time::{self, CivilTime};
use crate::trickle;

bitflags! {
    /// Capabilities exposed to the host.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Features: u8 {
        const ALARM = 1 << 0;
        const CLOCK_OUTPUT = 1 << 1;
    }
}

/// Time, alarm and offset operations the host RTC framework calls into.
pub trait RtcOps {
    type Error;

    /// Supported range, inclusive.
    fn range(&self) -> (CivilTime, CivilTime) {
        (time::RANGE_MIN, time::RANGE_MAX)
    }

    fn read_time(&self) -> Result<CivilTime, Self::Error>;
    fn set_time(&self, t: &CivilTime) -> Result<(), Self::Error>;
    fn read_offset(&self) -> Result<i32, Self::Error>;
    fn set_offset(&self, offset: i32) -> Result<(), Self::Error>;
    fn read_alarm(&self) -> Result<AlarmDescriptor, Self::Error>;
    fn set_alarm(&self, alarm: &AlarmDescriptor) -> Result<(), Self::Error>;
    fn alarm_irq_enable(&self, enabled: bool) -> Result<(), Self::Error>;
}

pub struct Max31335<A> {
    bus: Mutex<A>,
    hour_mode: HourMode,
    irq: Option<u32>,
    features: AtomicU8,
}

impl<I2C: embedded_hal::i2c::I2c> Max31335<I2cInterface<I2C>> {
    /// Bring up a chip on an I2C bus at `config.address`.
    pub fn new_i2c(
        i2c: I2C,
        config: &Config,
    ) -> Result<Self, Error<embedded_hal::i2c::ErrorKind>> {
        Self::probe(I2cInterface::new(i2c, config.address), config)
    }
}

impl<A: RegisterAccess> Max31335<A> {
    /// Check the chip answers, apply the trickle charger and record features.
    ///
    /// A chip that does not answer fails bring-up. Trickle charger problems
    /// are logged and do not.
    pub fn probe(mut bus: A, config: &Config) -> Result<Self, Error<A::Error>> {
        let status = bus.read(reg::STATUS1).map_err(Error::Bus)?;
        debug!("MAX31335 STATUS1: 0x{:02X}", status);

        if let Some(tc) = &config.trickle {
            if let Err(e) = trickle::setup(&mut bus, tc) {
                warn!("MAX31335 trickle charger setup failed: {}", e.as_str());
            }
        }

        // Alarm needs an interrupt line; attach_irq drops it again if the request fails
        let features = if config.irq.is_some() { Features::ALARM } else { Features::empty() };

        info!("MAX31335 initialized");
        Ok(Self {
            bus: Mutex::new(bus),
            hour_mode: config.hour_mode,
            irq: config.irq,
            features: AtomicU8::new(features.bits()),
        })
    }

    /// Hook the alarm interrupt up. `request` asks the platform to route the
    /// configured line to an [`AlarmIrq`](crate::irq::AlarmIrq). Without a
    /// line, or when the request fails, the alarm feature is cleared and the
    /// device keeps working as a plain clock.
    pub fn attach_irq<F, E2>(&self, request: F) -> bool
    where
        F: FnOnce(u32) -> Result<(), E2>,
    {
        let attached = match self.irq {
            Some(line) => match request(line) {
                Ok(()) => true,
                Err(_) => {
                    warn!("unable to request IRQ {}, alarm disabled", line);
                    false
                }
            },
            None => false,
        };
        if !attached {
            self.clear_feature(Features::ALARM);
        }
        attached
    }

    pub fn features(&self) -> Features {
        Features::from_bits_truncate(self.features.load(Ordering::Acquire))
    }

    pub(crate) fn set_feature(&self, f: Features) {
        self.features.fetch_or(f.bits(), Ordering::AcqRel);
    }

    pub(crate) fn clear_feature(&self, f: Features) {
        self.features.fetch_and(!f.bits(), Ordering::AcqRel);
    }

    pub fn hour_mode(&self) -> HourMode {
        self.hour_mode
    }

    pub fn irq_line(&self) -> Option<u32> {
        self.irq
    }

    /// Exclusive access to the register interface for a multi-register sequence.
    pub(crate) fn lock(&self) -> MutexGuard<'_, A> {
        self.bus.lock()
    }

    pub fn release(self) -> A {
        self.bus.into_inner()
    }

    fn require_alarm(&self) -> Result<(), Error<A::Error>> {
        if self.features().contains(Features::ALARM) {
            Ok(())
        } else {
            Err(Error::NotSupported)
        }
    }
}

impl<A: RegisterAccess> RtcOps for Max31335<A> {
    type Error = Error<A::Error>;

    fn read_time(&self) -> Result<CivilTime, Self::Error> {
        let mut bus = self.lock();
        time::read_time(&mut *bus)
    }

    fn set_time(&self, t: &CivilTime) -> Result<(), Self::Error> {
        let mut bus = self.lock();
        time::write_time(&mut *bus, t, self.hour_mode)?;
        info!("MAX31335 time set: {}", t.format_iso8601().as_str());
        Ok(())
    }

    fn read_offset(&self) -> Result<i32, Self::Error> {
        let mut bus = self.lock();
        offset::read_offset(&mut *bus).map(i32::from)
    }

    fn set_offset(&self, value: i32) -> Result<(), Self::Error> {
        let value = i8::try_from(value).map_err(|_| Error::OutOfRange)?;
        let mut bus = self.lock();
        offset::write_offset(&mut *bus, value)
    }

    fn read_alarm(&self) -> Result<AlarmDescriptor, Self::Error> {
        self.require_alarm()?;
        let mut bus = self.lock();
        alarm::read_alarm(&mut *bus)
    }

    fn set_alarm(&self, a: &AlarmDescriptor) -> Result<(), Self::Error> {
        self.require_alarm()?;
        let mut bus = self.lock();
        alarm::write_alarm(&mut *bus, a, self.hour_mode)
    }

    fn alarm_irq_enable(&self, enabled: bool) -> Result<(), Self::Error> {
        self.require_alarm()?;
        let mut bus = self.lock();
        alarm::set_alarm_enabled(&mut *bus, enabled)
    }
}
