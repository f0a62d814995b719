//! Register access layer
//!
//! `RegisterAccess` is the byte-register view the driver is written against.
//! `I2cInterface` binds it to an `embedded_hal::i2c::I2c` bus the same way the
//! other RTC drivers in this firmware talk to their chips: `write_read` with
//! the start register for reads, one `write` of `[reg, data..]` for bursts so
//! the chip latches the whole block at once. `CachedInterface` shadows the
//! non-volatile registers.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use heapless::Vec;

use crate::registers::{is_volatile, REGISTER_COUNT};

/// Longest burst write supported by `I2cInterface`, in data bytes.
pub const MAX_BURST: usize = 16;

pub trait RegisterAccess {
    type Error;

    /// Read `buf.len()` consecutive registers starting at `reg` in one transaction.
    fn bulk_read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` to consecutive registers starting at `reg` in one transaction.
    fn bulk_write(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error>;

    fn read(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut b = [0u8; 1];
        self.bulk_read(reg, &mut b)?;
        Ok(b[0])
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        self.bulk_write(reg, &[value])
    }

    /// Read-modify-write of the bits in `mask`. No write is issued when the
    /// register already holds the requested bits.
    fn update_bits(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), Self::Error> {
        let old = self.read(reg)?;
        let new = (old & !mask) | (value & mask);
        if new != old {
            self.write(reg, new)?;
        }
        Ok(())
    }

    fn set_bits(&mut self, reg: u8, bits: u8) -> Result<(), Self::Error> {
        self.update_bits(reg, bits, bits)
    }

    fn clear_bits(&mut self, reg: u8, bits: u8) -> Result<(), Self::Error> {
        self.update_bits(reg, bits, 0)
    }
}

impl<A: RegisterAccess + ?Sized> RegisterAccess for &mut A {
    type Error = A::Error;

    fn bulk_read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).bulk_read(reg, buf)
    }

    fn bulk_write(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).bulk_write(reg, data)
    }

    fn read(&mut self, reg: u8) -> Result<u8, Self::Error> {
        (**self).read(reg)
    }

    fn write(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        (**self).write(reg, value)
    }

    fn update_bits(&mut self, reg: u8, mask: u8, value: u8) -> Result<(), Self::Error> {
        (**self).update_bits(reg, mask, value)
    }
}

/// Register access over I2C.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> RegisterAccess for I2cInterface<I2C> {
    type Error = ErrorKind;

    fn bulk_read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[reg], buf).map_err(|e| e.kind())
    }

    fn bulk_write(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        // Register byte + payload go out as a single write
        let mut frame: Vec<u8, { MAX_BURST + 1 }> = Vec::new();
        frame.push(reg).map_err(|_| ErrorKind::Other)?;
        frame.extend_from_slice(data).map_err(|_| ErrorKind::Other)?;
        self.i2c.write(self.address, &frame).map_err(|e| e.kind())
    }
}

/// Caching register layer. Non-volatile registers are served from a shadow
/// copy once seen; writes go through to the device and refresh the shadow.
pub struct CachedInterface<A> {
    inner: A,
    cache: [Option<u8>; REGISTER_COUNT],
}

impl<A: RegisterAccess> CachedInterface<A> {
    pub fn new(inner: A) -> Self {
        Self { inner, cache: [None; REGISTER_COUNT] }
    }

    /// Forget every shadowed value.
    pub fn invalidate(&mut self) {
        self.cache = [None; REGISTER_COUNT];
    }

    pub fn release(self) -> A {
        self.inner
    }

    fn cached(&self, reg: u8) -> Option<u8> {
        if is_volatile(reg) {
            return None;
        }
        self.cache.get(reg as usize).copied().flatten()
    }

    fn store(&mut self, reg: u8, data: &[u8]) {
        for (i, &value) in data.iter().enumerate() {
            let r = reg as usize + i;
            if r >= REGISTER_COUNT {
                break;
            }
            if !is_volatile(r as u8) {
                self.cache[r] = Some(value);
            }
        }
    }
}

impl<A: RegisterAccess> RegisterAccess for CachedInterface<A> {
    type Error = A::Error;

    fn bulk_read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        let hit = (0..buf.len()).all(|i| {
            u8::try_from(reg as usize + i)
                .ok()
                .and_then(|r| self.cached(r))
                .is_some()
        });
        if hit {
            for (i, b) in buf.iter_mut().enumerate() {
                *b = self.cache[reg as usize + i].unwrap_or_default();
            }
            return Ok(());
        }

        self.inner.bulk_read(reg, buf)?;
        self.store(reg, buf);
        Ok(())
    }

    fn bulk_write(&mut self, reg: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.bulk_write(reg, data)?;
        self.store(reg, data);
        Ok(())
    }
}
