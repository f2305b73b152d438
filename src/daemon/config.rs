use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::battery::BatteryProfile;
use crate::address::Address;
use crate::calibration::CalibrationProfile;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "UPS_STATS_CONFIG";

/// Read when [`CONFIG_ENV`] is not set and the file exists
pub const DEFAULT_CONFIG_PATH: &str = "/etc/ups-stats.toml";

/// Service configuration, every key is optional
///
/// ```toml
/// i2c_bus = "/dev/i2c-1"
///
/// [sensor]
/// address = 0x42
///
/// [display]
/// address = 0x3C
///
/// [poll]
/// interval_secs = 4
/// display_retry_secs = 5
///
/// [battery]
/// empty_v = 6.0
/// span_v = 2.4
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub i2c_bus: PathBuf,
    pub sensor: SensorConfig,
    pub display: DisplayConfig,
    pub poll: PollConfig,
    pub battery: BatteryProfile,
    pub metrics: MetricsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            i2c_bus: PathBuf::from("/dev/i2c-1"),
            sensor: SensorConfig::default(),
            display: DisplayConfig::default(),
            poll: PollConfig::default(),
            battery: BatteryProfile::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorConfig {
    pub address: u8,
    /// Derive the calibration from the shunt instead of using the 32V / 2A profile
    pub shunt: Option<ShuntConfig>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: Address::default().as_byte(),
            shunt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShuntConfig {
    pub current_lsb_ua: u32,
    pub shunt_uohm: u32,
}

impl SensorConfig {
    /// # Errors
    /// Fails if the address is not one an INA219 can have.
    pub fn address(&self) -> Result<Address> {
        Address::from_byte(self.address).context("sensor.address")
    }

    /// # Errors
    /// Fails if the configured shunt gives a calibration value outside the register range.
    pub fn calibration(&self) -> Result<CalibrationProfile> {
        match self.shunt {
            None => Ok(CalibrationProfile::RANGE_32V_2A),
            Some(shunt) => CalibrationProfile::from_shunt(shunt.current_lsb_ua, shunt.shunt_uohm)
                .with_context(|| {
                    format!(
                        "sensor.shunt: no calibration for {}µA steps on {}µΩ",
                        shunt.current_lsb_ua, shunt.shunt_uohm
                    )
                }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub address: u8,
    /// Vertical distance between text lines in pixels
    pub line_pitch_px: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            address: 0x3C,
            line_pitch_px: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub display_retry_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 4,
            display_retry_secs: 5,
        }
    }
}

impl PollConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn display_retry(&self) -> Duration {
        Duration::from_secs(self.display_retry_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub thermal_path: PathBuf,
    pub loadavg_path: PathBuf,
    /// Mount point whose usage is shown
    pub disk_mount: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            thermal_path: PathBuf::from("/sys/class/thermal/thermal_zone0/temp"),
            loadavg_path: PathBuf::from("/proc/loadavg"),
            disk_mount: "/".to_string(),
        }
    }
}

impl Config {
    /// Load the file named by [`CONFIG_ENV`], or [`DEFAULT_CONFIG_PATH`] if that exists, or fall
    /// back to the defaults
    ///
    /// # Errors
    /// Fails if the file can not be read or parsed, or holds invalid values.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_PATH))
            }
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// # Errors
    /// Fails if the file can not be read or parsed, or holds invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("loading {}", path.display()))
    }

    /// # Errors
    /// Fails on malformed TOML, unknown keys or invalid values.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Reports the first setting that can not work.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<()> {
        self.sensor.address()?;
        self.sensor.calibration()?;
        if self.display.address > 0x7F {
            bail!("display.address {:#04x} is not a 7 bit address", self.display.address);
        }
        if self.display.line_pitch_px == 0 {
            bail!("display.line_pitch_px must be positive");
        }
        if self.poll.interval_secs == 0 {
            bail!("poll.interval_secs must be positive");
        }
        if self.poll.display_retry_secs == 0 {
            bail!("poll.display_retry_secs must be positive");
        }
        // Also rejects NaN
        if !(self.battery.span_v > 0.0) {
            bail!("battery.span_v must be positive, got {}", self.battery.span_v);
        }
        Ok(())
    }
}
