//! Calibration of the current and power registers
//!
//! The INA219 only produces current and power values after a calibration value was written. It
//! multiplies the shunt voltage with that value to get the current register and multiplies the
//! current with the bus voltage for the power register. [`CalibrationProfile`] carries the value
//! written to the device together with the scale of one register step.

use crate::measurements::{Current, CurrentRegister, Power, PowerRegister};
use crate::register::{Register, RegisterAddress, WriteRegister};

/// Scaling factor derived from the datasheet and µ SI prefix: 0.04096 * (1/µ)^2
const SCALING_FACTOR: u64 = 40_960_000_000;

/// Calibration value plus the scale of the current and power registers
///
/// `current_lsb` is applied as is by [`Current::milliamps`], so the value effectively has the unit
/// mA per bit. The 32V / 2A profile uses `0.1`, i.e. 100µA per bit, even though the UPS board
/// documentation calls that number "A per bit".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CalibrationProfile {
    calibration_value: u16,
    current_lsb: f64,
    power_lsb: f64,
}

impl CalibrationProfile {
    /// Measure up to 32V and 2A through a 0.1Ω shunt, overflowing at 3.2A
    ///
    /// ```text
    /// Max possible current = 0.32V / 0.1Ω = 3.2A
    /// Current LSB          = 100µA
    /// Calibration          = trunc(0.04096 / (100µA * 0.1Ω)) = 4096
    /// Power LSB            = 20 * 100µA = 2mW
    /// ```
    pub const RANGE_32V_2A: Self = Self::new(4096, 0.1, 0.002);

    /// Use an explicit set of constants
    #[must_use]
    pub const fn new(calibration_value: u16, current_lsb: f64, power_lsb: f64) -> Self {
        Self {
            calibration_value,
            current_lsb,
            power_lsb,
        }
    }

    /// Derive the profile for a shunt of `shunt_uohm` µΩ with a current step of
    /// `current_lsb_ua` µA
    ///
    /// Returns `None` if the calibration value does not fit the register.
    ///
    /// # Example
    /// ```rust
    /// use ups_stats::calibration::CalibrationProfile;
    ///
    /// let profile = CalibrationProfile::from_shunt(100, 100_000).unwrap();
    /// assert_eq!(profile, CalibrationProfile::RANGE_32V_2A);
    /// ```
    #[must_use]
    pub fn from_shunt(current_lsb_ua: u32, shunt_uohm: u32) -> Option<Self> {
        let product = u64::from(current_lsb_ua) * u64::from(shunt_uohm);
        if product == 0 {
            return None;
        }

        let cal = u16::try_from(SCALING_FACTOR / product).ok()?;
        // According to Figure 27 of the datasheet the lowest bit is always 0
        let cal = cal & !1;
        if cal == 0 {
            return None;
        }

        Some(Self::new(
            cal,
            f64::from(current_lsb_ua) / 1_000.0,
            f64::from(current_lsb_ua.checked_mul(20)?) / 1_000_000.0,
        ))
    }

    /// Value written to the calibration register
    #[must_use]
    pub const fn calibration_value(&self) -> u16 {
        self.calibration_value
    }

    /// Scale of one step of the current register
    #[must_use]
    pub const fn current_lsb(&self) -> f64 {
        self.current_lsb
    }

    /// Scale of one step of the power register in W
    #[must_use]
    pub const fn power_lsb(&self) -> f64 {
        self.power_lsb
    }

    /// Scale the contents of the current register
    #[must_use]
    pub const fn current_from_register(&self, reg: CurrentRegister) -> Current {
        Current::from_register(reg, self.current_lsb)
    }

    /// Scale the contents of the power register
    #[must_use]
    pub const fn power_from_register(&self, reg: PowerRegister) -> Power {
        Power::from_register(reg, self.power_lsb)
    }
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self::RANGE_32V_2A
    }
}

impl Register for CalibrationProfile {
    const ADDRESS: RegisterAddress = RegisterAddress::Calibration;
}

impl WriteRegister for CalibrationProfile {
    fn as_bits(&self) -> u16 {
        self.calibration_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_constants() {
        let profile = CalibrationProfile::default();
        assert_eq!(profile.calibration_value(), 4096);
        assert!((profile.current_lsb() - 0.1).abs() < f64::EPSILON);
        assert!((profile.power_lsb() - 0.002).abs() < f64::EPSILON);
        assert_eq!(profile.as_bits(), 0x1000);
    }

    #[test]
    fn derived_profiles() {
        // 40mΩ shunt with 50µA steps: 0.04096 / (50µA * 40mΩ) = 20480
        let profile = CalibrationProfile::from_shunt(50, 40_000).unwrap();
        assert_eq!(profile.calibration_value(), 20_480);
        assert!((profile.power_lsb() - 0.001).abs() < 1e-12);

        // Odd results get their lowest bit cleared
        let profile = CalibrationProfile::from_shunt(3, 1_000_000).unwrap();
        assert_eq!(profile.calibration_value(), 13_652);
    }

    #[test]
    fn rejects_unrepresentable_profiles() {
        assert!(CalibrationProfile::from_shunt(0, 100_000).is_none());
        assert!(CalibrationProfile::from_shunt(100, 0).is_none());
        // Calibration would need more than 16 bit
        assert!(CalibrationProfile::from_shunt(1, 100_000).is_none());
        // Calibration would be zero
        assert!(CalibrationProfile::from_shunt(1_000_000, 1_000_000).is_none());
    }
}
