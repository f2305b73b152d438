use anyhow::{Context, Result};
use tracing::info;

use ups_stats::daemon::{
    logging, Config, Monitor, MetricsCollector, OledConnector, ShutdownSignal, SystemProbe,
    UpsSensor,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::from_env()?;
    let sensor = UpsSensor::linux(
        config.i2c_bus.clone(),
        config.sensor.address()?,
        config.sensor.calibration()?,
    );
    let display = OledConnector::new(config.i2c_bus.clone(), config.display.clone());
    let metrics = MetricsCollector::new(SystemProbe, config.metrics.clone());
    let mut monitor = Monitor::new(display, sensor, metrics, config.battery, config.poll.clone());

    let mut shutdown = ShutdownSignal::register().context("installing signal handlers")?;

    info!(
        "ups-stats started on {}, sensor {:#04x}, display {:#04x}",
        config.i2c_bus.display(),
        config.sensor.address,
        config.display.address
    );
    monitor.run(shutdown.recv()).await;
    info!("ups-stats stopped");
    Ok(())
}
