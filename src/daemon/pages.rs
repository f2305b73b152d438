//! The two pages the display alternates between

use super::battery::BatteryProfile;
use super::error::Result;
use super::metrics::{HostMetrics, UNAVAILABLE};
use crate::measurements::Reading;

/// Which page a cycle shows
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Page {
    System,
    Power,
}

impl Page {
    /// Even cycles show the system page, odd ones the power page
    #[must_use]
    pub const fn for_cycle(counter: u64) -> Self {
        if counter.is_multiple_of(2) {
            Page::System
        } else {
            Page::Power
        }
    }
}

/// `CPU Temp: 48.3°C`, or `CPU Temp: N/A` if the temperature could not be read
#[must_use]
pub fn cpu_temperature_label(temperature: &Result<f64>) -> String {
    match temperature {
        Ok(t) => format!("CPU Temp: {t:.1}\u{b0}C"),
        Err(_) => format!("CPU Temp: {UNAVAILABLE}"),
    }
}

#[must_use]
pub fn system_page(metrics: &HostMetrics, temperature: &Result<f64>) -> Vec<String> {
    vec![
        format!("IP: {}", metrics.ip),
        format!(
            "CPU: {} {}",
            metrics.cpu_load,
            cpu_temperature_label(temperature)
        ),
        format!("Mem: {}", metrics.mem_usage),
        format!("Disk: {}", metrics.disk_usage),
    ]
}

/// Load voltage, current in amps, power and charge estimate
///
/// Every value shows as `N/A` when the sensor could not be read.
#[must_use]
pub fn power_page(reading: &Result<Reading>, battery: &BatteryProfile) -> Vec<String> {
    match reading {
        Ok(r) => vec![
            format!("Load Vol: {:.3} V", r.bus_voltage_v),
            format!("Current: {:.3} A", r.current_ma / 1000.0),
            format!("Power: {:.3} W", r.power_w),
            format!("Percent: {:.1}%", battery.percentage(r.bus_voltage_v)),
        ],
        Err(_) => vec![
            format!("Load Vol: {UNAVAILABLE}"),
            format!("Current: {UNAVAILABLE}"),
            format!("Power: {UNAVAILABLE}"),
            format!("Percent: {UNAVAILABLE}"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::error::MonitorError;

    fn metrics() -> HostMetrics {
        HostMetrics {
            ip: "192.168.1.23".to_string(),
            cpu_load: "0.08".to_string(),
            mem_usage: "612/3794MB 16.13%".to_string(),
            disk_usage: "3/29GB 13%".to_string(),
            timestamp: "Mon Oct 19 12:00:00 2026".to_string(),
        }
    }

    #[test]
    fn pages_alternate() {
        assert_eq!(Page::for_cycle(0), Page::System);
        assert_eq!(Page::for_cycle(1), Page::Power);
        assert_eq!(Page::for_cycle(2), Page::System);
        assert_eq!(Page::for_cycle(u64::MAX), Page::Power);
    }

    #[test]
    fn system_page_lines() {
        assert_eq!(
            system_page(&metrics(), &Ok(48.312)),
            [
                "IP: 192.168.1.23",
                "CPU: 0.08 CPU Temp: 48.3\u{b0}C",
                "Mem: 612/3794MB 16.13%",
                "Disk: 3/29GB 13%",
            ]
        );
    }

    #[test]
    fn missing_temperature() {
        let temperature = Err(MonitorError::metric("cpu temperature", "gone"));
        assert_eq!(
            system_page(&metrics(), &temperature)[1],
            "CPU: 0.08 CPU Temp: N/A"
        );
    }

    #[test]
    fn power_page_lines() {
        let reading = Reading {
            bus_voltage_v: 8.0,
            shunt_voltage_mv: 1.0,
            current_ma: 50.0,
            power_w: 0.1,
            ..Reading::default()
        };

        assert_eq!(
            power_page(&Ok(reading), &BatteryProfile::default()),
            [
                "Load Vol: 8.000 V",
                "Current: 0.050 A",
                "Power: 0.100 W",
                "Percent: 83.3%",
            ]
        );
    }

    #[test]
    fn power_page_clamps_percentage() {
        let reading = Reading {
            bus_voltage_v: 12.5,
            shunt_voltage_mv: 0.0,
            current_ma: -999.0,
            power_w: 0.0,
            ..Reading::default()
        };

        let page = power_page(&Ok(reading), &BatteryProfile::default());
        assert_eq!(page[1], "Current: -0.999 A");
        assert_eq!(page[3], "Percent: 100.0%");
    }

    #[test]
    fn power_page_without_sensor() {
        let reading = Err(MonitorError::transport(0x42, "NoAcknowledge"));
        assert_eq!(
            power_page(&reading, &BatteryProfile::default()),
            [
                "Load Vol: N/A",
                "Current: N/A",
                "Power: N/A",
                "Percent: N/A",
            ]
        );
    }
}
