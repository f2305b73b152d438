//! Errors returned by the driver
//!
//! Register reads and writes return the error type of the I2C bus unchanged. Only setup and
//! assembling a [`Configuration`](crate::configuration::Configuration) from raw integers have
//! their own error types.

use core::fmt::{Debug, Display, Formatter};

/// Writing the calibration or configuration during setup failed
///
/// Contains the bus so it can be reused, for example to retry later.
pub struct InitializationError<I2C, E> {
    /// The error reported by the bus
    pub error: E,
    device: I2C,
}

impl<I2C, E> InitializationError<I2C, E> {
    pub(crate) const fn new(error: E, device: I2C) -> Self {
        Self { error, device }
    }

    /// Take back the I2C bus
    #[must_use]
    pub fn into_device(self) -> I2C {
        self.device
    }
}

impl<I2C, E: Debug> Debug for InitializationError<I2C, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InitializationError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<I2C, E: Debug> Display for InitializationError<I2C, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "INA219 setup failed, I2C error: {:?}", self.error)
    }
}

#[cfg(feature = "std")]
impl<I2C, E> std::error::Error for InitializationError<I2C, E>
where
    E: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// A field of the configuration word
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Field {
    BusVoltageRange,
    Gain,
    BusAdcResolution,
    ShuntAdcResolution,
    Mode,
}

/// A raw value that does not encode any setting of its configuration field
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct InvalidField {
    field: Field,
    value: u8,
}

impl InvalidField {
    pub(crate) const fn new(field: Field, value: u8) -> Self {
        Self { field, value }
    }

    #[must_use]
    pub const fn field(self) -> Field {
        self.field
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.value
    }
}

impl Display for InvalidField {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#x} is not a valid value for {:?}", self.value, self.field)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidField {}
