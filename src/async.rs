use crate::address::Address;
use crate::calibration::CalibrationProfile;
use crate::configuration::Configuration;
use crate::errors::InitializationError;
use crate::measurements::{
    BusVoltage, BusVoltageRegister, Current, CurrentRegister, Power, PowerRegister, Reading,
    ShuntVoltage, ShuntVoltageRegister,
};
use crate::register::{ReadRegister, WriteRegister};
use embedded_hal_async::i2c::I2c;

/// Read a 16 bit register of the device at `device`
///
/// The register offset is written and two bytes are read back in the same transfer. The first
/// byte on the wire is the high byte.
///
/// # Errors
/// Returns the bus error if the device is missing or does not acknowledge.
pub async fn read16<I2C: I2c>(i2c: &mut I2C, device: u8, register: u8) -> Result<u16, I2C::Error> {
    let mut buf: [u8; 2] = [0x00; 2];
    i2c.write_read(device, &[register], &mut buf).await?;
    Ok(u16::from_be_bytes(buf))
}

/// Write a 16 bit register of the device at `device`, high byte first
///
/// # Errors
/// Returns the bus error if the device is missing or does not acknowledge.
pub async fn write16<I2C: I2c>(
    i2c: &mut I2C,
    device: u8,
    register: u8,
    value: u16,
) -> Result<(), I2C::Error> {
    let [high, low] = value.to_be_bytes();
    i2c.write(device, &[register, high, low]).await
}

/// Embedded HAL compatible driver for the INA219
///
/// The calibration value is written again before every shunt voltage, bus voltage and power read.
/// The current register is read without doing so.
pub struct INA219<I2C> {
    i2c: I2C,
    address: Address,
    calib: CalibrationProfile,
    config: Configuration,
}

impl<I2C> INA219<I2C>
where
    I2C: I2c,
{
    /// Open an INA219 with the 32V / 2A calibration and the default configuration
    ///
    /// # Errors
    /// If writing the calibration or configuration fails the bus is returned inside the
    /// [`InitializationError`].
    pub async fn new(
        i2c: I2C,
        address: Address,
    ) -> Result<Self, InitializationError<I2C, I2C::Error>> {
        Self::new_with(
            i2c,
            address,
            CalibrationProfile::default(),
            Configuration::default(),
        )
        .await
    }

    /// Open an INA219, writing the given calibration and then the given configuration
    ///
    /// # Errors
    /// If writing the calibration or configuration fails the bus is returned inside the
    /// [`InitializationError`].
    pub async fn new_with(
        i2c: I2C,
        address: Address,
        calibration: CalibrationProfile,
        configuration: Configuration,
    ) -> Result<Self, InitializationError<I2C, I2C::Error>> {
        let mut new = Self::new_unchecked(i2c, address, calibration, configuration);

        match new.init().await {
            Ok(()) => Ok(new),
            Err(e) => Err(InitializationError::new(e, new.destroy())),
        }
    }

    async fn init(&mut self) -> Result<(), I2C::Error> {
        self.refresh_calibration().await?;
        let config = self.config;
        self.write(&config).await
    }

    /// Wrap a device that is already calibrated and configured as given, no bus traffic happens
    #[must_use]
    pub const fn new_unchecked(
        i2c: I2C,
        address: Address,
        calib: CalibrationProfile,
        config: Configuration,
    ) -> Self {
        INA219 {
            i2c,
            address,
            calib,
            config,
        }
    }

    /// Destroy the driver returning the underlying I2C device
    ///
    /// This does leave the device in its current state.
    #[must_use]
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// The calibration written during setup
    #[must_use]
    pub const fn calibration(&self) -> &CalibrationProfile {
        &self.calib
    }

    /// The configuration written during setup
    #[must_use]
    pub const fn configuration(&self) -> Configuration {
        self.config
    }

    /// Read back the configuration register
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    pub async fn read_configuration(&mut self) -> Result<Configuration, I2C::Error> {
        self.read().await
    }

    /// Read the shunt voltage
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    pub async fn shunt_voltage(&mut self) -> Result<ShuntVoltage, I2C::Error> {
        self.refresh_calibration().await?;
        let reg: ShuntVoltageRegister = self.read().await?;
        Ok(ShuntVoltage::from_register(reg))
    }

    /// Read the bus voltage including its status flags
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    pub async fn bus_voltage(&mut self) -> Result<BusVoltage, I2C::Error> {
        self.refresh_calibration().await?;
        let reg: BusVoltageRegister = self.read().await?;
        Ok(BusVoltage::from_register(reg))
    }

    /// Read the current
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    pub async fn current(&mut self) -> Result<Current, I2C::Error> {
        let reg: CurrentRegister = self.read().await?;
        Ok(self.calib.current_from_register(reg))
    }

    /// Read the power
    ///
    /// # Errors
    /// Returns Err() when the underlying I2C device returns an error.
    pub async fn power(&mut self) -> Result<Power, I2C::Error> {
        self.refresh_calibration().await?;
        let reg: PowerRegister = self.read().await?;
        Ok(self.calib.power_from_register(reg))
    }

    /// Read bus voltage, shunt voltage, current and power, in that order
    ///
    /// The status flags of the bus voltage register are kept in the [`Reading`].
    ///
    /// # Errors
    /// Returns the first error of the underlying I2C device, later registers are not read then.
    pub async fn reading(&mut self) -> Result<Reading, I2C::Error> {
        let bus_voltage = self.bus_voltage().await?;
        let shunt_voltage = self.shunt_voltage().await?;
        let current = self.current().await?;
        let power = self.power().await?;

        Ok(Reading {
            bus_voltage_v: bus_voltage.volts(),
            shunt_voltage_mv: shunt_voltage.millivolts(),
            current_ma: current.milliamps(),
            power_w: power.watts(),
            conversion_ready: bus_voltage.is_conversion_ready(),
            math_overflow: bus_voltage.has_math_overflowed(),
        })
    }

    /// The device derives current and power from the calibration register, so it is written
    /// before those values are used
    async fn refresh_calibration(&mut self) -> Result<(), I2C::Error> {
        let calib = self.calib;
        self.write(&calib).await
    }

    async fn read<Reg: ReadRegister>(&mut self) -> Result<Reg, I2C::Error> {
        let bits = read16(
            &mut self.i2c,
            self.address.as_byte(),
            Reg::ADDRESS.as_byte(),
        )
        .await?;
        Ok(Reg::from_bits(bits))
    }

    async fn write<Reg: WriteRegister>(&mut self, reg: &Reg) -> Result<(), I2C::Error> {
        write16(
            &mut self.i2c,
            self.address.as_byte(),
            Reg::ADDRESS.as_byte(),
            reg.as_bits(),
        )
        .await
    }
}
