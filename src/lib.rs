#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! INA219 power monitor driver and the UPS status service built on top of it
//!
//! The driver talks to an INA219 over any `embedded-hal` (or `embedded-hal-async`) I2C bus and
//! reproduces the register protocol of the common "UPS HAT" boards: a fixed 32V / 2A calibration
//! that is refreshed before every shunt voltage, bus voltage and power read.
//!
//! With the `daemon` feature the crate also contains the Linux service which polls the sensor and
//! some host metrics and shows them on an SH1106 OLED, see [`daemon`].
//!
//! # Example
//! ```rust,no_run
//! # #[cfg(feature = "sync")]
//! # fn main() {
//! use ups_stats::address::Address;
//! use ups_stats::SyncIna219;
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//!
//! let mut ina = match SyncIna219::new(i2c, Address::default()) {
//!     Ok(ina) => ina,
//!     Err(e) => panic!("INA219 did not respond: {:?}", e.error),
//! };
//! if let Ok(reading) = ina.reading() {
//!     println!("{:.3} V", reading.bus_voltage_v);
//! }
//! # }
//! # #[cfg(not(feature = "sync"))]
//! # fn main() {}
//! ```

pub mod address;
pub mod calibration;
pub mod configuration;
pub mod errors;
pub mod measurements;
mod register;

pub use register::RegisterAddress;

#[cfg(feature = "async")]
mod r#async;

#[cfg(feature = "async")]
pub use r#async::{read16 as read16_async, write16 as write16_async, INA219 as AsyncIna219};

#[cfg(feature = "sync")]
mod sync {
    include!(concat!(env!("OUT_DIR"), "/blocking.rs"));
}

#[cfg(feature = "sync")]
pub use sync::{read16, write16, INA219 as SyncIna219};

#[cfg(feature = "daemon")]
pub mod daemon;
