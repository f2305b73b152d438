//! The INA219 configuration word
//!
//! [`Configuration`] is packed into the configuration register from five fields, each backed by
//! the integer the datasheet assigns to it:
//!
//! | bits  | field                  |
//! |-------|------------------------|
//! | 13    | [`BusVoltageRange`]    |
//! | 12-11 | [`Gain`]               |
//! | 10-7  | bus [`Resolution`]     |
//! | 6-3   | shunt [`Resolution`]   |
//! | 2-0   | [`Mode`]               |
//!
//! # Example
//! ```rust
//! use ups_stats::configuration::{Configuration, Mode};
//!
//! let conf = Configuration {
//!     mode: Mode::ShuntAndBusTriggered,
//!     ..Default::default()
//! };
//! assert_eq!(conf.as_bits() & 0b111, 3);
//! ```

use crate::errors::{Field, InvalidField};
use crate::register::{ReadRegister, Register, RegisterAddress, WriteRegister};

/// Measurement range for the bus voltage
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[repr(u8)]
pub enum BusVoltageRange {
    /// Maximum bus voltage of 16V
    Range16V = 0,
    /// Maximum bus voltage of 32V (still limited by the 26V IC maximum)
    #[default]
    Range32V = 1,
}

impl BusVoltageRange {
    const SHIFT: u8 = 13;
    const MASK: u16 = 0b1;

    /// Full scale of the range in volts
    #[must_use]
    pub const fn full_scale_v(self) -> u8 {
        match self {
            Self::Range16V => 16,
            Self::Range32V => 32,
        }
    }
}

impl TryFrom<u8> for BusVoltageRange {
    type Error = InvalidField;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Range16V),
            1 => Ok(Self::Range32V),
            value => Err(InvalidField::new(Field::BusVoltageRange, value)),
        }
    }
}

/// Gain of the shunt voltage amplifier, which sets the shunt voltage range
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[repr(u8)]
pub enum Gain {
    /// Gain 1, ±40mV
    Div1 = 0,
    /// Gain 1/2, ±80mV
    Div2 = 1,
    /// Gain 1/4, ±160mV
    Div4 = 2,
    /// Gain 1/8, ±320mV
    #[default]
    Div8 = 3,
}

impl Gain {
    const SHIFT: u8 = 11;
    const MASK: u16 = 0b11;

    /// Full scale of the shunt voltage in mV for this gain
    #[must_use]
    pub const fn full_scale_mv(self) -> u16 {
        match self {
            Self::Div1 => 40,
            Self::Div2 => 80,
            Self::Div4 => 160,
            Self::Div8 => 320,
        }
    }
}

impl TryFrom<u8> for Gain {
    type Error = InvalidField;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Div1),
            1 => Ok(Self::Div2),
            2 => Ok(Self::Div4),
            3 => Ok(Self::Div8),
            value => Err(InvalidField::new(Field::Gain, value)),
        }
    }
}

/// ADC resolution or number of averaged samples, used for both the bus and the shunt ADC
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[repr(u8)]
pub enum Resolution {
    /// Single 9 bit sample
    Res9Bit = 0b0000,
    /// Single 10 bit sample
    Res10Bit = 0b0001,
    /// Single 11 bit sample
    Res11Bit = 0b0010,
    /// Single 12 bit sample
    Res12Bit = 0b0011,
    /// 2 averaged 12 bit samples
    Avg2 = 0b1001,
    /// 4 averaged 12 bit samples
    Avg4 = 0b1010,
    /// 8 averaged 12 bit samples
    Avg8 = 0b1011,
    /// 16 averaged 12 bit samples
    Avg16 = 0b1100,
    /// 32 averaged 12 bit samples
    #[default]
    Avg32 = 0b1101,
    /// 64 averaged 12 bit samples
    Avg64 = 0b1110,
    /// 128 averaged 12 bit samples
    Avg128 = 0b1111,
}

impl Resolution {
    const SHIFT_BUS: u8 = 7;
    const SHIFT_SHUNT: u8 = 3;
    const MASK: u16 = 0b1111;

    /// Decode the four ADC bits, accepting the aliases the datasheet lists for the single sample
    /// modes
    const fn from_nibble(bits: u16) -> Self {
        match bits & Self::MASK {
            0b0000 | 0b0100 => Self::Res9Bit,
            0b0001 | 0b0101 => Self::Res10Bit,
            0b0010 | 0b0110 => Self::Res11Bit,
            0b1001 => Self::Avg2,
            0b1010 => Self::Avg4,
            0b1011 => Self::Avg8,
            0b1100 => Self::Avg16,
            0b1101 => Self::Avg32,
            0b1110 => Self::Avg64,
            0b1111 => Self::Avg128,
            // 0b0011, 0b0111 and 0b1000
            _ => Self::Res12Bit,
        }
    }

    /// Conversion time in µs, see table 5 of the datasheet
    #[must_use]
    pub const fn conversion_time_us(self) -> u32 {
        match self {
            Self::Res9Bit => 84,
            Self::Res10Bit => 148,
            Self::Res11Bit => 276,
            Self::Res12Bit => 532,
            Self::Avg2 => 1_060,
            Self::Avg4 => 2_130,
            Self::Avg8 => 4_260,
            Self::Avg16 => 8_510,
            Self::Avg32 => 17_020,
            Self::Avg64 => 34_050,
            Self::Avg128 => 68_100,
        }
    }

    fn try_from_field(value: u8, field: Field) -> Result<Self, InvalidField> {
        match value {
            0b0000 => Ok(Self::Res9Bit),
            0b0001 => Ok(Self::Res10Bit),
            0b0010 => Ok(Self::Res11Bit),
            0b0011 => Ok(Self::Res12Bit),
            0b1001 => Ok(Self::Avg2),
            0b1010 => Ok(Self::Avg4),
            0b1011 => Ok(Self::Avg8),
            0b1100 => Ok(Self::Avg16),
            0b1101 => Ok(Self::Avg32),
            0b1110 => Ok(Self::Avg64),
            0b1111 => Ok(Self::Avg128),
            value => Err(InvalidField::new(field, value)),
        }
    }
}

/// Operating mode: which voltages are converted and whether continuously or once per trigger
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Mode {
    PowerDown = 0b000,
    ShuntTriggered = 0b001,
    BusTriggered = 0b010,
    ShuntAndBusTriggered = 0b011,
    AdcOff = 0b100,
    ShuntContinuous = 0b101,
    BusContinuous = 0b110,
    #[default]
    ShuntAndBusContinuous = 0b111,
}

impl Mode {
    const SHIFT: u8 = 0;
    const MASK: u16 = 0b111;

    const fn from_bits(bits: u16) -> Self {
        match bits & Self::MASK {
            0b000 => Self::PowerDown,
            0b001 => Self::ShuntTriggered,
            0b010 => Self::BusTriggered,
            0b011 => Self::ShuntAndBusTriggered,
            0b100 => Self::AdcOff,
            0b101 => Self::ShuntContinuous,
            0b110 => Self::BusContinuous,
            _ => Self::ShuntAndBusContinuous,
        }
    }

    /// Whether the shunt voltage is converted in this mode
    #[must_use]
    pub const fn measures_shunt(self) -> bool {
        !matches!(self, Self::PowerDown | Self::AdcOff) && (self as u8) & 0b001 != 0
    }

    /// Whether the bus voltage is converted in this mode
    #[must_use]
    pub const fn measures_bus(self) -> bool {
        !matches!(self, Self::PowerDown | Self::AdcOff) && (self as u8) & 0b010 != 0
    }
}

impl TryFrom<u8> for Mode {
    type Error = InvalidField;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if u16::from(value) > Self::MASK {
            return Err(InvalidField::new(Field::Mode, value));
        }
        Ok(Self::from_bits(u16::from(value)))
    }
}

/// Contents of the configuration register
///
/// The default is what the UPS boards run with: 32V range, gain /8 (±320mV), both ADCs averaging
/// 32 12-bit samples, shunt and bus converted continuously. That packs to `0x3EEF`.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Configuration {
    pub bus_voltage_range: BusVoltageRange,
    pub gain: Gain,
    pub bus_adc_resolution: Resolution,
    pub shunt_adc_resolution: Resolution,
    pub mode: Mode,
}

impl Configuration {
    /// Assemble a configuration from the raw integer value of each field
    ///
    /// # Errors
    /// Returns [`InvalidField`] naming the first field whose value has no meaning for the INA219.
    pub fn from_fields(
        bus_voltage_range: u8,
        gain: u8,
        bus_adc_resolution: u8,
        shunt_adc_resolution: u8,
        mode: u8,
    ) -> Result<Self, InvalidField> {
        Ok(Self {
            bus_voltage_range: BusVoltageRange::try_from(bus_voltage_range)?,
            gain: Gain::try_from(gain)?,
            bus_adc_resolution: Resolution::try_from_field(
                bus_adc_resolution,
                Field::BusAdcResolution,
            )?,
            shunt_adc_resolution: Resolution::try_from_field(
                shunt_adc_resolution,
                Field::ShuntAdcResolution,
            )?,
            mode: Mode::try_from(mode)?,
        })
    }

    /// Decode the configuration register
    ///
    /// The reset bit and the unused bit 14 are ignored.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        let bus_voltage_range = match (bits >> BusVoltageRange::SHIFT) & BusVoltageRange::MASK {
            0 => BusVoltageRange::Range16V,
            _ => BusVoltageRange::Range32V,
        };
        let gain = match (bits >> Gain::SHIFT) & Gain::MASK {
            0 => Gain::Div1,
            1 => Gain::Div2,
            2 => Gain::Div4,
            _ => Gain::Div8,
        };

        Self {
            bus_voltage_range,
            gain,
            bus_adc_resolution: Resolution::from_nibble(bits >> Resolution::SHIFT_BUS),
            shunt_adc_resolution: Resolution::from_nibble(bits >> Resolution::SHIFT_SHUNT),
            mode: Mode::from_bits(bits >> Mode::SHIFT),
        }
    }

    /// Pack the fields into the register word
    #[must_use]
    pub const fn as_bits(self) -> u16 {
        (self.bus_voltage_range as u16) << BusVoltageRange::SHIFT
            | (self.gain as u16) << Gain::SHIFT
            | (self.bus_adc_resolution as u16) << Resolution::SHIFT_BUS
            | (self.shunt_adc_resolution as u16) << Resolution::SHIFT_SHUNT
            | (self.mode as u16) << Mode::SHIFT
    }

    /// Time in µs one full conversion takes with this configuration
    ///
    /// Returns `None` if the mode does not convert anything.
    #[must_use]
    pub const fn conversion_time_us(self) -> Option<u32> {
        let shunt = if self.mode.measures_shunt() {
            self.shunt_adc_resolution.conversion_time_us()
        } else {
            0
        };
        let bus = if self.mode.measures_bus() {
            self.bus_adc_resolution.conversion_time_us()
        } else {
            0
        };

        match shunt + bus {
            0 => None,
            total => Some(total),
        }
    }
}

impl Register for Configuration {
    const ADDRESS: RegisterAddress = RegisterAddress::Configuration;
}

impl ReadRegister for Configuration {
    fn from_bits(bits: u16) -> Self {
        Configuration::from_bits(bits)
    }
}

impl WriteRegister for Configuration {
    fn as_bits(&self) -> u16 {
        Configuration::as_bits(*self)
    }
}
