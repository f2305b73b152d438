use std::path::PathBuf;

use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;
use tracing::{debug, info, warn};

use super::error::{MonitorError, Result};
use crate::address::Address;
use crate::calibration::CalibrationProfile;
use crate::configuration::Configuration;
use crate::measurements::Reading;
use crate::SyncIna219;

/// Source of the power page values
pub trait PowerSensor {
    /// # Errors
    /// Fails with [`MonitorError::Transport`] if the sensor could not be set up or read.
    fn read(&mut self) -> Result<Reading>;
}

/// INA219 on the UPS board
///
/// The sensor is set up on the first read. A failed read drops the driver, the next read opens
/// the bus and writes calibration and configuration again.
pub struct UpsSensor<I2C, F> {
    open: F,
    address: Address,
    calibration: CalibrationProfile,
    device: Option<SyncIna219<I2C>>,
}

impl<I2C, F> UpsSensor<I2C, F>
where
    I2C: I2c,
    F: FnMut() -> Result<I2C>,
{
    /// `open` is called whenever the sensor has to be set up
    #[must_use]
    pub fn new(open: F, address: Address, calibration: CalibrationProfile) -> Self {
        Self {
            open,
            address,
            calibration,
            device: None,
        }
    }

    fn connect(&mut self) -> Result<SyncIna219<I2C>> {
        let i2c = (self.open)()?;
        let ina = SyncIna219::new_with(i2c, self.address, self.calibration, Configuration::default())
            .map_err(|err| MonitorError::transport(self.address.as_byte(), err.error))?;

        info!(
            "INA219 initialized at {:#04x}, calibration {}",
            self.address.as_byte(),
            self.calibration.calibration_value()
        );
        if let Some(us) = ina.configuration().conversion_time_us() {
            debug!("INA219 conversion takes {us}µs");
        }
        Ok(ina)
    }

    #[cfg(test)]
    fn is_connected(&self) -> bool {
        self.device.is_some()
    }
}

impl UpsSensor<I2cdev, Box<dyn FnMut() -> Result<I2cdev>>> {
    /// The sensor on the Linux I2C character device at `bus`
    #[must_use]
    pub fn linux(bus: PathBuf, address: Address, calibration: CalibrationProfile) -> Self {
        let device = address.as_byte();
        let open = move || I2cdev::new(&bus).map_err(|err| MonitorError::transport(device, err));
        Self::new(Box::new(open), address, calibration)
    }
}

impl<I2C, F> PowerSensor for UpsSensor<I2C, F>
where
    I2C: I2c,
    F: FnMut() -> Result<I2C>,
{
    fn read(&mut self) -> Result<Reading> {
        let mut ina = match self.device.take() {
            Some(ina) => ina,
            None => self.connect()?,
        };

        match ina.reading() {
            Ok(reading) => {
                if reading.math_overflow {
                    warn!("INA219 math overflow, current and power are out of range");
                }
                if !reading.conversion_ready {
                    debug!("INA219 conversion not ready, values are from the previous one");
                }
                self.device = Some(ina);
                Ok(reading)
            }
            Err(err) => Err(MonitorError::transport(self.address.as_byte(), err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegisterAddress;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = 0x42;

    #[allow(clippy::cast_possible_truncation)]
    fn write_reg(reg: RegisterAddress, value: u16) -> Transaction {
        Transaction::write(ADDR, vec![reg as u8, (value >> 8) as u8, value as u8])
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_reg(reg: RegisterAddress, value: u16) -> Transaction {
        Transaction::write_read(ADDR, vec![reg as u8], vec![(value >> 8) as u8, value as u8])
    }

    fn setup() -> Vec<Transaction> {
        vec![
            write_reg(RegisterAddress::Calibration, 4096),
            write_reg(RegisterAddress::Configuration, 0x3EEF),
        ]
    }

    fn cycle(bus: u16, shunt: u16, current: u16, power: u16) -> Vec<Transaction> {
        vec![
            write_reg(RegisterAddress::Calibration, 4096),
            read_reg(RegisterAddress::BusVoltage, bus),
            write_reg(RegisterAddress::Calibration, 4096),
            read_reg(RegisterAddress::ShuntVoltage, shunt),
            read_reg(RegisterAddress::Current, current),
            write_reg(RegisterAddress::Calibration, 4096),
            read_reg(RegisterAddress::Power, power),
        ]
    }

    fn sensor(mock: &I2cMock) -> UpsSensor<I2cMock, impl FnMut() -> Result<I2cMock>> {
        let mock = mock.clone();
        UpsSensor::new(
            move || Ok(mock.clone()),
            Address::default(),
            CalibrationProfile::default(),
        )
    }

    #[test]
    fn sets_up_once_then_reads() {
        let mut transactions = setup();
        transactions.extend(cycle((2000 << 3) | 0b10, 100, 500, 50));
        transactions.extend(cycle(2100 << 3, 0, 0, 0));
        let mut mock = I2cMock::new(&transactions);
        let mut sensor = sensor(&mock);

        let reading = sensor.read().unwrap();
        assert!((reading.bus_voltage_v - 8.0).abs() < 1e-9);
        assert!((reading.shunt_voltage_mv - 1.0).abs() < 1e-9);
        assert!((reading.current_ma - 50.0).abs() < 1e-9);
        assert!((reading.power_w - 0.1).abs() < 1e-9);
        assert!(reading.conversion_ready);
        assert!(sensor.is_connected());

        let reading = sensor.read().unwrap();
        assert!((reading.bus_voltage_v - 8.4).abs() < 1e-9);

        mock.done();
    }

    #[test]
    fn absent_sensor_is_a_transport_error() {
        let mut mock = I2cMock::new(&[
            write_reg(RegisterAddress::Calibration, 4096).with_error(ErrorKind::Other)
        ]);
        let mut sensor = sensor(&mock);

        assert!(matches!(
            sensor.read(),
            Err(MonitorError::Transport { address: ADDR, .. })
        ));
        assert!(!sensor.is_connected());
        mock.done();
    }

    #[test]
    fn failed_read_sets_up_again() {
        let mut transactions = setup();
        transactions.push(write_reg(RegisterAddress::Calibration, 4096));
        transactions.push(read_reg(RegisterAddress::BusVoltage, 0).with_error(ErrorKind::Other));
        transactions.extend(setup());
        transactions.extend(cycle(2000 << 3, 0, 0, 0));
        let mut mock = I2cMock::new(&transactions);
        let mut sensor = sensor(&mock);

        assert!(sensor.read().is_err());
        assert!(!sensor.is_connected());

        let reading = sensor.read().unwrap();
        assert!((reading.bus_voltage_v - 8.0).abs() < 1e-9);
        mock.done();
    }

    #[test]
    fn bus_open_failure_is_reported() {
        let mut sensor: UpsSensor<I2cMock, _> = UpsSensor::new(
            || Err(MonitorError::transport(ADDR, "No such file or directory")),
            Address::default(),
            CalibrationProfile::default(),
        );

        assert!(matches!(
            sensor.read(),
            Err(MonitorError::Transport { address: ADDR, .. })
        ));
    }
}
