use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::time;
use tracing::{debug, error, info, warn};

use super::battery::BatteryProfile;
use super::config::PollConfig;
use super::display::{DisplayConnector, TextDisplay};
use super::metrics::MetricsSource;
use super::pages::{power_page, system_page, Page};
use super::sensor::PowerSensor;

/// The poll loop
///
/// Starts out waiting for the display and looks for it again every retry interval. Once the
/// display is there, every cycle collects the host metrics and a sensor reading and shows one of
/// the two pages, alternating between them.
pub struct Monitor<C: DisplayConnector, S, M> {
    connector: C,
    sensor: S,
    metrics: M,
    battery: BatteryProfile,
    poll: PollConfig,
    /// `None` while waiting for the display
    display: Option<C::Display>,
    counter: u64,
}

impl<C, S, M> Monitor<C, S, M>
where
    C: DisplayConnector,
    S: PowerSensor,
    M: MetricsSource,
{
    #[must_use]
    pub fn new(connector: C, sensor: S, metrics: M, battery: BatteryProfile, poll: PollConfig) -> Self {
        Self {
            connector,
            sensor,
            metrics,
            battery,
            poll,
            display: None,
            counter: 0,
        }
    }

    /// Whether the display has been found
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.display.is_some()
    }

    /// Run one cycle and return how long to wait before the next one
    pub fn cycle(&mut self) -> Duration {
        if self.display.is_none() {
            match self.connector.connect() {
                Ok(display) => self.display = Some(display),
                Err(err) => {
                    warn!(
                        "{err}. Retrying in {} seconds...",
                        self.poll.display_retry_secs
                    );
                    return self.poll.display_retry();
                }
            }
        }

        let metrics = self.metrics.collect_host_metrics();
        let temperature = self.metrics.collect_cpu_temperature();
        if let Err(err) = &temperature {
            warn!("{err}");
        }
        let reading = self.sensor.read();
        match &reading {
            Ok(r) => debug!(
                "{:.3} V, {:.3} mV shunt, {:.1} mA, {:.3} W",
                r.bus_voltage_v, r.shunt_voltage_mv, r.current_ma, r.power_w
            ),
            Err(err) => warn!("{err}"),
        }

        let page = Page::for_cycle(self.counter);
        debug!("Cycle {} at {}: {page:?} page", self.counter, metrics.timestamp);
        let lines = match page {
            Page::System => system_page(&metrics, &temperature),
            Page::Power => power_page(&reading, &self.battery),
        };

        if let Some(display) = self.display.as_mut() {
            if let Err(err) = display.render_lines(&lines) {
                error!("Failed to display text: {err}");
            }
        }

        self.counter = self.counter.wrapping_add(1);
        self.poll.interval()
    }

    /// Cycle until `shutdown` completes, then blank the display
    pub async fn run<F: Future<Output = ()>>(&mut self, shutdown: F) {
        tokio::pin!(shutdown);
        loop {
            let pause = self.cycle();
            tokio::select! {
                () = &mut shutdown => break,
                () = time::sleep(pause) => {}
            }
        }
        self.cleanup();
    }

    /// Blank and switch off the display if there is one
    pub fn cleanup(&mut self) {
        if let Some(mut display) = self.display.take() {
            match display.cleanup() {
                Ok(()) => info!("OLED cleaned up."),
                Err(err) => warn!("OLED cleanup failed: {err}"),
            }
        }
    }
}

/// SIGTERM and SIGINT, both end the poll loop
pub struct ShutdownSignal {
    sigterm: Signal,
    sigint: Signal,
}

impl ShutdownSignal {
    /// # Errors
    /// Fails if a handler can not be installed.
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for either signal
    pub async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigterm.recv() => info!("Terminated."),
            _ = self.sigint.recv() => info!("Program terminated by user."),
        }
    }
}
