use serde::Deserialize;

/// Voltage window of the battery pack, used to turn the bus voltage into a charge estimate
///
/// The default fits the two cell Li-ion packs on UPS boards: empty at 6.0V, full 2.4V above that.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryProfile {
    pub empty_v: f64,
    pub span_v: f64,
}

impl Default for BatteryProfile {
    fn default() -> Self {
        Self {
            empty_v: 6.0,
            span_v: 2.4,
        }
    }
}

impl BatteryProfile {
    /// Linear charge estimate in percent, clamped to `0..=100`
    #[must_use]
    pub fn percentage(&self, bus_voltage_v: f64) -> f64 {
        ((bus_voltage_v - self.empty_v) / self.span_v * 100.0).clamp(0.0, 100.0)
    }
}
