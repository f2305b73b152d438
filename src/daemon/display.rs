use std::path::PathBuf;

use embedded_graphics::mono_font::iso_8859_1::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::Point;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use embedded_hal::i2c::I2c;
use linux_embedded_hal::I2cdev;
use tracing::info;

use super::config::DisplayConfig;
use super::error::{MonitorError, Result};
use super::sh1106::Sh1106;

/// A display that shows a list of text lines
pub trait TextDisplay {
    /// Replace everything on the display with `lines`, top to bottom
    ///
    /// # Errors
    /// Fails with [`MonitorError::Transport`] if the frame could not be sent.
    fn render_lines(&mut self, lines: &[String]) -> Result<()>;

    /// Blank the display before the service exits
    ///
    /// # Errors
    /// Fails with [`MonitorError::Transport`] if the display did not take the commands.
    fn cleanup(&mut self) -> Result<()>;
}

/// Finds and initialises the display
pub trait DisplayConnector {
    type Display: TextDisplay;

    /// # Errors
    /// Fails with [`MonitorError::DeviceAbsent`] if no display answered.
    fn connect(&mut self) -> Result<Self::Display>;
}

/// Text rendering onto an SH1106 panel
pub struct OledDisplay<I2C> {
    panel: Sh1106<I2C>,
    address: u8,
    line_pitch: i32,
}

impl<I2C: I2c> OledDisplay<I2C> {
    /// Initialise the panel behind `i2c`
    ///
    /// # Errors
    /// Fails with [`MonitorError::DeviceAbsent`] if the panel does not acknowledge its setup.
    pub fn open(i2c: I2C, config: &DisplayConfig) -> Result<Self> {
        let mut panel = Sh1106::new(i2c, config.address);
        panel
            .init()
            .map_err(|err| MonitorError::device_absent(config.address, err))?;

        Ok(Self {
            panel,
            address: config.address,
            line_pitch: i32::try_from(config.line_pitch_px).unwrap_or(i32::MAX),
        })
    }

    #[cfg(test)]
    fn into_inner(self) -> Sh1106<I2C> {
        self.panel
    }
}

impl<I2C: I2c> OledDisplay<I2C> {
    fn draw_lines(&mut self, lines: &[String]) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);

        self.panel.clear_buffer();
        let mut y = 0;
        for line in lines {
            // Drawing into the frame buffer can not fail
            let _ = Text::with_baseline(line, Point::new(0, y), style, Baseline::Top)
                .draw(&mut self.panel);
            y = y.saturating_add(self.line_pitch);
        }
    }
}

impl<I2C: I2c> TextDisplay for OledDisplay<I2C> {
    fn render_lines(&mut self, lines: &[String]) -> Result<()> {
        self.draw_lines(lines);
        self.panel
            .flush()
            .map_err(|err| MonitorError::transport(self.address, err))
    }

    fn cleanup(&mut self) -> Result<()> {
        self.panel
            .cleanup()
            .map_err(|err| MonitorError::transport(self.address, err))
    }
}

/// Opens the SH1106 on a Linux I2C character device
pub struct OledConnector {
    bus: PathBuf,
    config: DisplayConfig,
}

impl OledConnector {
    #[must_use]
    pub fn new(bus: PathBuf, config: DisplayConfig) -> Self {
        Self { bus, config }
    }
}

impl DisplayConnector for OledConnector {
    type Display = OledDisplay<I2cdev>;

    fn connect(&mut self) -> Result<Self::Display> {
        let i2c = I2cdev::new(&self.bus)
            .map_err(|err| MonitorError::device_absent(self.config.address, err))?;
        let display = OledDisplay::open(i2c, &self.config)?;
        info!(
            "OLED initialized on {} at {:#04x}",
            self.bus.display(),
            self.config.address
        );
        Ok(display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = 0x3C;

    fn display(transactions: &[Transaction]) -> OledDisplay<I2cMock> {
        OledDisplay {
            panel: Sh1106::new(I2cMock::new(transactions), ADDR),
            address: ADDR,
            line_pitch: 10,
        }
    }

    fn lit_rows(display: &OledDisplay<I2cMock>) -> Vec<usize> {
        (0..64)
            .filter(|&y| (0..128).any(|x| display.panel.pixel(x, y)))
            .collect()
    }

    #[test]
    fn missing_panel_is_absent() {
        let mut mock = I2cMock::new(&[Transaction::write(ADDR, vec![0x00, 0xAE])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))]);

        let Err(err) = OledDisplay::open(mock.clone(), &DisplayConfig::default()) else {
            panic!("A panel that does not acknowledge should not open");
        };
        assert!(matches!(err, MonitorError::DeviceAbsent { address: ADDR, .. }));
        mock.done();
    }

    #[test]
    fn lines_stack_at_line_pitch() {
        let mut display = display(&[]);

        display.draw_lines(&["IP: 10.0.0.2".to_string()]);
        let first = lit_rows(&display);
        assert!(!first.is_empty());
        assert!(first.iter().all(|&y| y < 10));

        display.draw_lines(&["IP: 10.0.0.2".to_string(), "Mem: 1/2MB".to_string()]);
        let both = lit_rows(&display);
        assert!(both.iter().any(|&y| y < 10));
        assert!(both.iter().any(|&y| (10..20).contains(&y)));
        assert!(both.iter().all(|&y| y < 20));

        // Redrawing starts from a blank frame
        display.draw_lines(&[]);
        assert!(lit_rows(&display).is_empty());

        display.into_inner().destroy().done();
    }

    #[test]
    fn degree_sign_is_drawn() {
        let mut display = display(&[]);

        display.draw_lines(&["\u{b0}".to_string()]);
        assert!(!lit_rows(&display).is_empty());

        display.into_inner().destroy().done();
    }

    #[test]
    fn failed_flush_is_a_transport_error() {
        let mut display = display(&[
            Transaction::write(ADDR, vec![0x00, 0xB0]).with_error(ErrorKind::Other)
        ]);

        let err = display.render_lines(&["IP: N/A".to_string()]).unwrap_err();
        assert!(matches!(err, MonitorError::Transport { address: ADDR, .. }));
        display.into_inner().destroy().done();
    }

    #[test]
    fn cleanup_failure_is_a_transport_error() {
        let mut display = display(&[
            Transaction::write(ADDR, vec![0x00, 0xB0]).with_error(ErrorKind::Other)
        ]);

        assert!(matches!(
            display.cleanup(),
            Err(MonitorError::Transport { address: ADDR, .. })
        ));
        display.into_inner().destroy().done();
    }
}
