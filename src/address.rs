//! I2C address of the INA219 on the bus
//!
//! The INA219 answers on one of 16 addresses in `0x40..=0x4F`, picked by wiring the A0 and A1
//! pins (table 1 of the datasheet). UPS boards usually strap A0 to SDA which puts the sensor on
//! `0x42`, so that is the default here.

use core::fmt::Formatter;
use core::ops::RangeInclusive;

/// Signal an address pin is tied to, valued as the two address bits it contributes
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Pin {
    Gnd = 0,
    Vcc = 1,
    Sda = 2,
    Scl = 3,
}

impl Pin {
    const fn from_lowest_bits(byte: u8) -> Self {
        match byte & 0b11 {
            0 => Self::Gnd,
            1 => Self::Vcc,
            2 => Self::Sda,
            _ => Self::Scl,
        }
    }
}

/// Validated 7 bit address of an INA219
///
/// # Example
/// ```rust
/// use ups_stats::address::{Address, Pin};
///
/// assert_eq!(Address::default().as_byte(), 0x42);
/// assert_eq!(Address::from_pins(Pin::Sda, Pin::Gnd), Address::default());
/// assert!(Address::from_byte(0x3C).is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Address {
    byte: u8,
}

impl Address {
    const VALID: RangeInclusive<u8> = 0x40..=0x4F;
    const MIN: u8 = *Self::VALID.start();
    const MAX: u8 = *Self::VALID.end();

    /// Build the address selected by wiring A0 and A1 to the given signals
    #[must_use]
    pub const fn from_pins(a0: Pin, a1: Pin) -> Self {
        Self {
            byte: Self::MIN | (a0 as u8) | ((a1 as u8) << 2),
        }
    }

    /// Check that `byte` is a possible INA219 address
    ///
    /// # Errors
    /// Returns [`OutOfRange`] for anything outside `0x40..=0x4F`.
    pub const fn from_byte(byte: u8) -> Result<Self, OutOfRange> {
        match byte {
            Self::MIN..=Self::MAX => Ok(Self { byte }),
            which => Err(OutOfRange { which }),
        }
    }

    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.byte
    }

    /// The (A0, A1) wiring that selects this address
    #[must_use]
    pub const fn as_pins(self) -> (Pin, Pin) {
        (
            Pin::from_lowest_bits(self.byte),
            Pin::from_lowest_bits(self.byte >> 2),
        )
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::from_pins(Pin::Sda, Pin::Gnd)
    }
}

impl TryFrom<u8> for Address {
    type Error = OutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Address::from_byte(value)
    }
}

/// The given byte is not an address an INA219 can be strapped to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OutOfRange {
    which: u8,
}

impl OutOfRange {
    /// The rejected byte
    #[must_use]
    pub const fn byte(self) -> u8 {
        self.which
    }
}

impl core::fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "INA219 address {:#04x} out of range {:#04x}..={:#04x}",
            self.which,
            Address::MIN,
            Address::MAX,
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRange {}
