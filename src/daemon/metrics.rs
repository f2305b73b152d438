//! Host statistics shown on the system page
//!
//! Values come from the usual command line tools and from procfs/sysfs. Every value is collected
//! on its own, a failing one is logged and shown as [`UNAVAILABLE`] without affecting the others.

use std::io;
use std::path::Path;
use std::process::Command;

use chrono::Local;
use tracing::warn;

use super::config::MetricsConfig;
use super::error::{MonitorError, Result};

/// Shown in place of any value that could not be collected
pub const UNAVAILABLE: &str = "N/A";

/// Access to the host the metrics are taken from
pub trait HostProbe {
    /// Run `program` with `args` and return its standard output
    ///
    /// # Errors
    /// Fails if the program can not be started or exits unsuccessfully.
    fn run(&self, program: &str, args: &[&str]) -> io::Result<String>;

    /// # Errors
    /// Fails if the file can not be read.
    fn read_file(&self, path: &Path) -> io::Result<String>;
}

/// Probe of the machine the service runs on
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<String> {
        let output = Command::new(program).args(args).output()?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{program} exited with {}",
                output.status
            )));
        }
        String::from_utf8(output.stdout).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Values of the system page, each already formatted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMetrics {
    pub ip: String,
    pub cpu_load: String,
    pub mem_usage: String,
    pub disk_usage: String,
    pub timestamp: String,
}

/// Source of the host values, the poll loop only depends on this
pub trait MetricsSource {
    fn collect_host_metrics(&mut self) -> HostMetrics;

    /// CPU temperature in °C
    ///
    /// # Errors
    /// Fails with [`MonitorError::MetricUnavailable`] if there is no readable thermal zone.
    fn collect_cpu_temperature(&mut self) -> Result<f64>;
}

pub struct MetricsCollector<P> {
    probe: P,
    config: MetricsConfig,
}

impl<P: HostProbe> MetricsCollector<P> {
    #[must_use]
    pub fn new(probe: P, config: MetricsConfig) -> Self {
        Self { probe, config }
    }

    fn ip(&self) -> Result<String> {
        let out = self
            .probe
            .run("hostname", &["-I"])
            .map_err(|err| MonitorError::metric("ip", err))?;
        parse_first_ip(&out).ok_or_else(|| MonitorError::metric("ip", "no address assigned"))
    }

    fn cpu_load(&self) -> Result<String> {
        let out = self
            .probe
            .read_file(&self.config.loadavg_path)
            .map_err(|err| MonitorError::metric("cpu load", err))?;
        parse_loadavg(&out).ok_or_else(|| MonitorError::metric("cpu load", "malformed loadavg"))
    }

    fn mem_usage(&self) -> Result<String> {
        let out = self
            .probe
            .run("free", &["-m"])
            .map_err(|err| MonitorError::metric("memory usage", err))?;
        parse_free(&out).ok_or_else(|| MonitorError::metric("memory usage", "malformed free output"))
    }

    fn disk_usage(&self) -> Result<String> {
        let out = self
            .probe
            .run("df", &["-h"])
            .map_err(|err| MonitorError::metric("disk usage", err))?;
        parse_df(&out, &self.config.disk_mount).ok_or_else(|| {
            MonitorError::metric(
                "disk usage",
                format!("{} not found in df output", self.config.disk_mount),
            )
        })
    }
}

impl<P: HostProbe> MetricsSource for MetricsCollector<P> {
    fn collect_host_metrics(&mut self) -> HostMetrics {
        HostMetrics {
            ip: or_unavailable(self.ip()),
            cpu_load: or_unavailable(self.cpu_load()),
            mem_usage: or_unavailable(self.mem_usage()),
            disk_usage: or_unavailable(self.disk_usage()),
            timestamp: Local::now().format("%a %b %e %H:%M:%S %Y").to_string(),
        }
    }

    fn collect_cpu_temperature(&mut self) -> Result<f64> {
        let out = self
            .probe
            .read_file(&self.config.thermal_path)
            .map_err(|err| MonitorError::metric("cpu temperature", err))?;
        parse_millidegrees(&out)
            .ok_or_else(|| MonitorError::metric("cpu temperature", "malformed thermal zone"))
    }
}

fn or_unavailable(value: Result<String>) -> String {
    value.unwrap_or_else(|err| {
        warn!("{err}");
        UNAVAILABLE.to_string()
    })
}

/// First address printed by `hostname -I`
fn parse_first_ip(out: &str) -> Option<String> {
    out.split_whitespace().next().map(str::to_string)
}

/// One minute load average from `/proc/loadavg`, two decimals
fn parse_loadavg(out: &str) -> Option<String> {
    let load: f64 = out.split_whitespace().next()?.parse().ok()?;
    Some(format!("{load:.2}"))
}

/// `used/totalMB pct%` from the memory row of `free -m`
///
/// The row is found by position, its label is translated on localized hosts.
fn parse_free(out: &str) -> Option<String> {
    let mut fields = out.lines().nth(1)?.split_whitespace().skip(1);
    let total: u64 = fields.next()?.parse().ok()?;
    let used: u64 = fields.next()?.parse().ok()?;
    if total == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = used as f64 * 100.0 / total as f64;
    Some(format!("{used}/{total}MB {pct:.2}%"))
}

/// `used/sizeGB use%` for the row of `df -h` mounted at `mount`
///
/// Sizes keep only their leading integer, so `3.5G` shows as `3`.
fn parse_df(out: &str, mount: &str) -> Option<String> {
    out.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 || fields[fields.len() - 1] != mount {
            return None;
        }
        let size = leading_integer(fields[1]);
        let used = leading_integer(fields[2]);
        Some(format!("{used}/{size}GB {}", fields[4]))
    })
}

fn leading_integer(field: &str) -> u64 {
    let digits = field.find(|c: char| !c.is_ascii_digit()).unwrap_or(field.len());
    field[..digits].parse().unwrap_or(0)
}

/// Degrees from a sysfs thermal zone, which reports millidegrees
fn parse_millidegrees(out: &str) -> Option<f64> {
    let milli: i64 = out.trim().parse().ok()?;
    #[allow(clippy::cast_precision_loss)]
    Some(milli as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;

    const FREE: &str = "\
               total        used        free      shared  buff/cache   available
Mem:            3794         612        2381          42         800        3017
Swap:             99           0          99
";

    const DF: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
udev            1.8G     0  1.8G   0% /dev
tmpfs           380M  1.2M  379M   1% /run
/dev/mmcblk0p2   29G  3.5G   24G  13% /
/dev/mmcblk0p1  510M   61M  450M  12% /boot/firmware
";

    #[derive(Default)]
    struct FakeProbe {
        commands: HashMap<&'static str, String>,
        files: HashMap<PathBuf, String>,
    }

    impl HostProbe for FakeProbe {
        fn run(&self, program: &str, _args: &[&str]) -> io::Result<String> {
            self.commands
                .get(program)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, program.to_string()))
        }

        fn read_file(&self, path: &Path) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
        }
    }

    fn full_probe() -> FakeProbe {
        let config = MetricsConfig::default();
        let mut probe = FakeProbe::default();
        probe
            .commands
            .insert("hostname", "192.168.1.23 fd00::5 \n".to_string());
        probe.commands.insert("free", FREE.to_string());
        probe.commands.insert("df", DF.to_string());
        probe.files.insert(
            config.loadavg_path.clone(),
            "0.08 0.03 0.01 1/180 1234\n".to_string(),
        );
        probe
            .files
            .insert(config.thermal_path.clone(), "48312\n".to_string());
        probe
    }

    #[test]
    fn parses_tool_output() {
        assert_eq!(parse_first_ip("10.0.0.2 172.17.0.1\n").unwrap(), "10.0.0.2");
        assert!(parse_first_ip("\n").is_none());
        assert_eq!(parse_loadavg("1.5 0.9 0.4 2/200 99").unwrap(), "1.50");
        assert_eq!(parse_free(FREE).unwrap(), "612/3794MB 16.13%");
        assert!(parse_free("Mem: lots\n").is_none());
        assert_eq!(parse_df(DF, "/").unwrap(), "3/29GB 13%");
        assert_eq!(parse_df(DF, "/boot/firmware").unwrap(), "61/510GB 12%");
        assert!(parse_df(DF, "/srv").is_none());
        assert!((parse_millidegrees("48312\n").unwrap() - 48.312).abs() < 1e-9);
        assert!(parse_millidegrees("hot").is_none());
    }

    #[test]
    fn memory_row_in_any_locale() {
        let zh = "\
               总计         已用        空闲      共享    缓冲/缓存    可用
内存：        3794         612        2381          42         800        3017
交换：          99           0          99
";
        assert_eq!(parse_free(zh).unwrap(), "612/3794MB 16.13%");

        let de = "\
               gesamt       benutzt     frei      gemns.  Puffer/Cache verfügbar
Speicher:       3794         612        2381          42         800        3017
Auslager:         99           0          99
";
        assert_eq!(parse_free(de).unwrap(), "612/3794MB 16.13%");
    }

    #[test]
    fn collects_everything() {
        let mut collector = MetricsCollector::new(full_probe(), MetricsConfig::default());

        let metrics = collector.collect_host_metrics();
        assert_eq!(metrics.ip, "192.168.1.23");
        assert_eq!(metrics.cpu_load, "0.08");
        assert_eq!(metrics.mem_usage, "612/3794MB 16.13%");
        assert_eq!(metrics.disk_usage, "3/29GB 13%");
        assert!(!metrics.timestamp.is_empty());

        let temp = collector.collect_cpu_temperature().unwrap();
        assert!((temp - 48.312).abs() < 1e-9);
    }

    #[test]
    fn failures_degrade_per_value() {
        let mut probe = full_probe();
        probe.commands.remove("free");
        probe.files.clear();
        let mut collector = MetricsCollector::new(probe, MetricsConfig::default());

        let metrics = collector.collect_host_metrics();
        assert_eq!(metrics.ip, "192.168.1.23");
        assert_eq!(metrics.cpu_load, UNAVAILABLE);
        assert_eq!(metrics.mem_usage, UNAVAILABLE);
        assert_eq!(metrics.disk_usage, "3/29GB 13%");

        assert!(matches!(
            collector.collect_cpu_temperature(),
            Err(MonitorError::MetricUnavailable { metric: "cpu temperature", .. })
        ));
    }
}
