//! Driver error type

use core::fmt;

/// Errors returned by driver operations. `E` is the register interface error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// Transport failure reported by the register interface.
    Bus(E),
    /// A register held a value that is not valid packed BCD, or decoded to an
    /// impossible calendar field.
    CorruptRegister { reg: u8, value: u8 },
    /// Time or alarm outside 2000-01-01..=2199-12-31, or with a malformed field.
    InvalidTime,
    /// Offset does not fit the 8-bit aging register.
    OutOfRange,
    /// Configuration value with no hardware encoding (e.g. trickle resistor).
    UnsupportedValue,
    /// The alarm feature is disabled on this device (no usable interrupt line).
    NotSupported,
}

impl<E> Error<E> {
    /// Short, allocation-free name for log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Error::Bus(_) => "bus error",
            Error::CorruptRegister { .. } => "corrupt register",
            Error::InvalidTime => "invalid time",
            Error::OutOfRange => "value out of range",
            Error::UnsupportedValue => "unsupported value",
            Error::NotSupported => "not supported",
        }
    }
}

impl<E> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CorruptRegister { reg, value } => {
                write!(f, "corrupt register 0x{:02X} = 0x{:02X}", reg, value)
            }
            other => f.write_str(other.as_str()),
        }
    }
}

// Manual impl so the bus error type does not need to be defmt::Format
#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::CorruptRegister { reg, value } => {
                defmt::write!(f, "CorruptRegister(0x{:02X} = 0x{:02X})", reg, value)
            }
            other => defmt::write!(f, "{=str}", other.as_str()),
        }
    }
}
