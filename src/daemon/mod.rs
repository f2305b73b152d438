//! The UPS status service
//!
//! Polls the INA219 and a few host metrics and shows them on an SH1106 OLED, alternating between
//! a system page and a power page. The pieces are tied together by [`Monitor`], the binary only
//! loads the [`Config`] and wires the Linux devices in.

mod battery;
mod config;
mod display;
mod error;
pub mod logging;
mod metrics;
mod monitor;
mod pages;
mod sensor;
pub mod sh1106;

pub use battery::BatteryProfile;
pub use config::{
    Config, DisplayConfig, MetricsConfig, PollConfig, SensorConfig, ShuntConfig, CONFIG_ENV,
    DEFAULT_CONFIG_PATH,
};
pub use display::{DisplayConnector, OledConnector, OledDisplay, TextDisplay};
pub use error::{MonitorError, Result};
pub use metrics::{HostMetrics, HostProbe, MetricsCollector, MetricsSource, SystemProbe, UNAVAILABLE};
pub use monitor::{Monitor, ShutdownSignal};
pub use pages::{cpu_temperature_label, power_page, system_page, Page};
pub use sensor::{PowerSensor, UpsSensor};
