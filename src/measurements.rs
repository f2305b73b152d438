use crate::register::{ReadRegister, Register, RegisterAddress};

/// Shunt voltage per register step in mV
pub const SHUNT_VOLTAGE_LSB_MV: f64 = 0.01;

/// Bus voltage per register step in V
pub const BUS_VOLTAGE_LSB_V: f64 = 0.004;

/// Interpret a register as a signed value the way the UPS board firmware does
///
/// Values above `i16::MAX` have 65535 subtracted. That is one off from a two's complement
/// conversion: `0xFFFF` comes out as `0` instead of `-1` and every other negative value is one
/// step too high.
///
/// ```rust
/// use ups_stats::measurements::signed_from_register;
///
/// assert_eq!(signed_from_register(32_767), 32_767);
/// assert_eq!(signed_from_register(32_768), -32_767);
/// assert_eq!(signed_from_register(0xFFFF), 0);
/// ```
#[must_use]
pub const fn signed_from_register(raw: u16) -> i32 {
    if raw > 32_767 {
        raw as i32 - 65_535
    } else {
        raw as i32
    }
}

/// A full set of values read during one poll
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Reading {
    pub bus_voltage_v: f64,
    pub shunt_voltage_mv: f64,
    pub current_ma: f64,
    pub power_w: f64,
    /// Conversion ready flag of the bus voltage register
    pub conversion_ready: bool,
    /// Math overflow flag of the bus voltage register, current and power are invalid when set
    pub math_overflow: bool,
}

/// Raw contents of the shunt voltage register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct ShuntVoltageRegister(pub u16);

/// Raw contents of the bus voltage register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct BusVoltageRegister(pub u16);

/// Raw contents of the power register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct PowerRegister(pub u16);

/// Raw contents of the current register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct CurrentRegister(pub u16);

macro_rules! impl_read_register {
    ($($reg:ident => $addr:ident),+ $(,)?) => {
        $(
            impl Register for $reg {
                const ADDRESS: RegisterAddress = RegisterAddress::$addr;
            }

            impl ReadRegister for $reg {
                fn from_bits(bits: u16) -> Self {
                    Self(bits)
                }
            }
        )+
    };
}

impl_read_register!(
    ShuntVoltageRegister => ShuntVoltage,
    BusVoltageRegister => BusVoltage,
    PowerRegister => Power,
    CurrentRegister => Current,
);

/// A shunt voltage measurement, 10µV per step
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct ShuntVoltage(u16);

impl ShuntVoltage {
    #[must_use]
    pub const fn from_register(reg: ShuntVoltageRegister) -> Self {
        Self(reg.0)
    }

    /// The register value after sign correction, see [`signed_from_register`]
    #[must_use]
    pub const fn raw(self) -> i32 {
        signed_from_register(self.0)
    }

    /// The shunt voltage in mV
    #[must_use]
    pub fn millivolts(self) -> f64 {
        f64::from(self.raw()) * SHUNT_VOLTAGE_LSB_MV
    }
}

/// Contents of the bus voltage register
///
/// The lowest three bits are status flags, the voltage is in the 13 bits above them.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct BusVoltage(u16);

impl BusVoltage {
    #[must_use]
    pub const fn from_register(reg: BusVoltageRegister) -> Self {
        Self(reg.0)
    }

    /// The bus voltage in steps of 4mV
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0 >> 3
    }

    /// The bus voltage in V
    #[must_use]
    pub fn volts(self) -> f64 {
        f64::from(self.raw()) * BUS_VOLTAGE_LSB_V
    }

    /// A conversion finished since the power register was last read or the mode was last written
    #[must_use]
    pub const fn is_conversion_ready(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// The current or power calculation overflowed, those values are not to be trusted
    #[must_use]
    pub const fn has_math_overflowed(self) -> bool {
        self.0 & 0b1 != 0
    }
}

/// A current measurement together with the scale it was calibrated with
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Current {
    reg: u16,
    lsb: f64,
}

impl Current {
    #[must_use]
    pub const fn from_register(reg: CurrentRegister, lsb: f64) -> Self {
        Self { reg: reg.0, lsb }
    }

    /// The register value after sign correction, see [`signed_from_register`]
    #[must_use]
    pub const fn raw(self) -> i32 {
        signed_from_register(self.reg)
    }

    /// The current in mA
    ///
    /// This is the raw value times the profile's `current_lsb`, see
    /// [`CalibrationProfile`](crate::calibration::CalibrationProfile) for its unit.
    #[must_use]
    pub fn milliamps(self) -> f64 {
        f64::from(self.raw()) * self.lsb
    }
}

/// A power measurement together with the scale it was calibrated with
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Power {
    reg: u16,
    lsb: f64,
}

impl Power {
    #[must_use]
    pub const fn from_register(reg: PowerRegister, lsb: f64) -> Self {
        Self { reg: reg.0, lsb }
    }

    /// The register value after sign correction, see [`signed_from_register`]
    #[must_use]
    pub const fn raw(self) -> i32 {
        signed_from_register(self.reg)
    }

    /// The power in W
    #[must_use]
    pub fn watts(self) -> f64 {
        f64::from(self.raw()) * self.lsb
    }
}
