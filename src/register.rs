/// Addresses of the internal registers of the INA219
///
/// All registers are 16 bit wide and transferred big endian, see [`crate::SyncIna219`].
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegisterAddress {
    /// Configuration register, see [`Configuration`](crate::configuration::Configuration)
    Configuration = 0x00,
    /// Shunt voltage register, see [`ShuntVoltage`](crate::measurements::ShuntVoltage)
    ShuntVoltage = 0x01,
    /// Bus voltage register, see [`BusVoltage`](crate::measurements::BusVoltage)
    BusVoltage = 0x02,
    /// Power register, see [`Power`](crate::measurements::Power)
    Power = 0x03,
    /// Current register, see [`Current`](crate::measurements::Current)
    Current = 0x04,
    /// Calibration register, see [`CalibrationProfile`](crate::calibration::CalibrationProfile)
    Calibration = 0x05,
}

impl RegisterAddress {
    /// The one byte offset sent on the bus to select this register
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

pub trait Register {
    const ADDRESS: RegisterAddress;
}

pub trait ReadRegister: Register {
    fn from_bits(bits: u16) -> Self;
}

pub trait WriteRegister: Register {
    fn as_bits(&self) -> u16;
}
