//! SH1106 OLED driver
//!
//! Driver for 128x64 SH1106 panels on I2C. Drawing goes into a frame buffer through
//! `embedded-graphics`, [`Sh1106::flush`] sends the whole buffer.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};
use embedded_hal::i2c::I2c;

pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;
#[allow(clippy::cast_possible_truncation)]
const SIZE: Size = Size::new(WIDTH as u32, HEIGHT as u32);

/// The SH1106 has 132 columns of RAM, 128 wide panels are centred on them
const COLUMN_OFFSET: u8 = 2;

/// Control byte announcing a command
const CONTROL_COMMAND: u8 = 0x00;
/// Control byte announcing display data
const CONTROL_DATA: u8 = 0x40;

mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Power up sequence, a command byte followed by its arguments where it takes any
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    0x3F,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14,
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
    /// One bit per pixel, a byte covers 8 rows of a column
    buffer: [[u8; WIDTH]; PAGES],
}

impl<I2C: I2c> Sh1106<I2C> {
    #[must_use]
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            buffer: [[0; WIDTH]; PAGES],
        }
    }

    /// Send the power up sequence, the first failing command aborts it
    ///
    /// # Errors
    /// Returns the bus error, usually because nothing acknowledged the address.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        for &c in INIT_SEQUENCE {
            self.command(c)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[CONTROL_COMMAND, cmd])
    }

    /// Blank the frame buffer, the panel keeps showing the old frame until the next flush
    pub fn clear_buffer(&mut self) {
        for page in &mut self.buffer {
            page.fill(0);
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let bit = 1 << (y % 8);
        let byte = &mut self.buffer[y / 8][x];
        if on {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> bool {
        self.buffer[y / 8][x] & (1 << (y % 8)) != 0
    }

    /// Send the frame buffer to the panel
    ///
    /// # Errors
    /// Returns the bus error, the panel may then show a partial frame.
    pub fn flush(&mut self) -> Result<(), I2C::Error> {
        for (page_addr, page) in (cmd::SET_PAGE_ADDR..).zip(0..PAGES) {
            let mut data = [0u8; WIDTH + 1];
            data[0] = CONTROL_DATA;
            data[1..].copy_from_slice(&self.buffer[page]);

            self.command(page_addr)?;
            self.command(cmd::SET_LOW_COLUMN | COLUMN_OFFSET)?;
            self.command(cmd::SET_HIGH_COLUMN)?;
            self.i2c.write(self.address, &data)?;
        }
        Ok(())
    }

    /// Blank the panel and switch it off
    ///
    /// # Errors
    /// Returns the bus error.
    pub fn cleanup(&mut self) -> Result<(), I2C::Error> {
        self.clear_buffer();
        self.flush()?;
        self.command(cmd::DISPLAY_OFF)
    }

    /// Destroy the driver returning the underlying I2C device
    #[must_use]
    pub fn destroy(self) -> I2C {
        self.i2c
    }
}

impl<I2C> OriginDimensions for Sh1106<I2C> {
    fn size(&self) -> Size {
        SIZE
    }
}

impl<I2C: I2c> DrawTarget for Sh1106<I2C> {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::{Point, Primitive};
    use embedded_graphics::primitives::{Line, PrimitiveStyle};
    use embedded_graphics::Drawable;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = 0x3C;

    fn command(cmd: u8) -> Transaction {
        Transaction::write(ADDR, vec![CONTROL_COMMAND, cmd])
    }

    /// Transactions of a flush where `fill` gives the data bytes of each page
    fn flush_transactions(fill: impl Fn(usize) -> Vec<u8>) -> Vec<Transaction> {
        let mut transactions = Vec::new();
        for page in 0..PAGES {
            transactions.push(command(cmd::SET_PAGE_ADDR | page as u8));
            transactions.push(command(cmd::SET_LOW_COLUMN | COLUMN_OFFSET));
            transactions.push(command(cmd::SET_HIGH_COLUMN));
            let mut data = vec![CONTROL_DATA];
            data.extend(fill(page));
            transactions.push(Transaction::write(ADDR, data));
        }
        transactions
    }

    #[test]
    fn init_sends_power_up_sequence() {
        let transactions: Vec<_> = INIT_SEQUENCE.iter().map(|&c| command(c)).collect();
        let mut display = Sh1106::new(I2cMock::new(&transactions), ADDR);

        display.init().unwrap();
        display.destroy().done();
    }

    #[test]
    fn init_stops_when_not_acknowledged() {
        let mut display = Sh1106::new(
            I2cMock::new(&[command(cmd::DISPLAY_OFF).with_error(ErrorKind::Other)]),
            ADDR,
        );

        assert_eq!(display.init().unwrap_err(), ErrorKind::Other);
        display.destroy().done();
    }

    #[test]
    fn pixels_map_to_pages() {
        let mut display = Sh1106::new(I2cMock::new(&[]), ADDR);

        Line::new(Point::new(0, 0), Point::new(0, 9))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut display)
            .unwrap();

        assert_eq!(display.buffer[0][0], 0xFF);
        assert_eq!(display.buffer[1][0], 0b11);
        assert!(display.pixel(0, 9));
        assert!(!display.pixel(0, 10));
        assert!(!display.pixel(1, 0));

        // Off screen pixels are dropped
        Pixel(Point::new(-1, 3), BinaryColor::On)
            .draw(&mut display)
            .unwrap();
        Pixel(Point::new(128, 3), BinaryColor::On)
            .draw(&mut display)
            .unwrap();

        display.clear_buffer();
        assert!(display.buffer.iter().flatten().all(|b| *b == 0));
        display.destroy().done();
    }

    #[test]
    fn flush_writes_every_page() {
        let transactions = flush_transactions(|page| {
            let mut data = vec![0u8; WIDTH];
            if page == 7 {
                data[127] = 0x80;
            }
            data
        });
        let mut display = Sh1106::new(I2cMock::new(&transactions), ADDR);

        Pixel(Point::new(127, 63), BinaryColor::On)
            .draw(&mut display)
            .unwrap();
        display.flush().unwrap();
        display.destroy().done();
    }

    #[test]
    fn cleanup_blanks_and_switches_off() {
        let mut transactions = flush_transactions(|_| vec![0u8; WIDTH]);
        transactions.push(command(cmd::DISPLAY_OFF));
        let mut display = Sh1106::new(I2cMock::new(&transactions), ADDR);

        Pixel(Point::new(5, 5), BinaryColor::On)
            .draw(&mut display)
            .unwrap();
        display.cleanup().unwrap();
        display.destroy().done();
    }
}
