//! Aging offset (oscillator trim)
//!
//! AGING_OFFSET is a single two's-complement byte; no further range checks.

use crate::error::Error;
use crate::interface::RegisterAccess;
use crate::registers::reg;

pub fn read_offset<A: RegisterAccess>(bus: &mut A) -> Result<i8, Error<A::Error>> {
    let raw = bus.read(reg::AGING_OFFSET).map_err(Error::Bus)?;
    Ok(raw as i8)
}

pub fn write_offset<A: RegisterAccess>(bus: &mut A, offset: i8) -> Result<(), Error<A::Error>> {
    bus.write(reg::AGING_OFFSET, offset as u8).map_err(Error::Bus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRegisters;

    #[test]
    fn signed_byte() {
        let mut bus = FakeRegisters::new().with(reg::AGING_OFFSET, &[0xF6]);
        assert_eq!(read_offset(&mut bus), Ok(-10));

        write_offset(&mut bus, 127).unwrap();
        assert_eq!(bus.get(reg::AGING_OFFSET), 0x7F);
        write_offset(&mut bus, -128).unwrap();
        assert_eq!(bus.get(reg::AGING_OFFSET), 0x80);
        assert_eq!(read_offset(&mut bus), Ok(-128));
    }
}
