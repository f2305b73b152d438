use thiserror::Error;

/// Things that can go wrong while the service runs
///
/// None of them stops the poll loop: transport and metric errors turn into `N/A` on the display,
/// a missing display is looked for again after the retry interval.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("I2C transfer with device {address:#04x} failed: {reason}")]
    Transport { address: u8, reason: String },

    #[error("Display not detected at {address:#04x}: {reason}")]
    DeviceAbsent { address: u8, reason: String },

    #[error("{metric} unavailable: {reason}")]
    MetricUnavailable { metric: &'static str, reason: String },
}

impl MonitorError {
    pub(crate) fn transport(address: u8, err: impl core::fmt::Debug) -> Self {
        Self::Transport {
            address,
            reason: format!("{err:?}"),
        }
    }

    pub(crate) fn device_absent(address: u8, err: impl core::fmt::Debug) -> Self {
        Self::DeviceAbsent {
            address,
            reason: format!("{err:?}"),
        }
    }

    pub(crate) fn metric(metric: &'static str, reason: impl ToString) -> Self {
        Self::MetricUnavailable {
            metric,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
