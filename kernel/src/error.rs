// Errors surfaced by the drivers and the run loop.
//
// Bus errors are reduced to their embedded-hal ErrorKind so one Copy
// type can cover SPI, I2C and GPIO failures without dragging the
// concrete HAL error types through every signature.

use core::fmt;

use embedded_hal::{digital, i2c, spi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// SPI transfer to the panel controller failed.
    Spi(spi::ErrorKind),
    /// I2C transaction with the touch controller failed.
    I2c(i2c::ErrorKind),
    /// A GPIO line could not be read or driven.
    Pin(digital::ErrorKind),
    /// The panel held its busy line past the allowed window.
    BusyTimeout { waited_ms: u32 },
    /// Rotation was not one of 0, 90, 180 or 270 degrees.
    InvalidRotation(u16),
    /// The HID transport refused a report.
    Hid,
}

impl Error {
    pub fn spi<E: spi::Error>(e: E) -> Self {
        Error::Spi(e.kind())
    }

    pub fn i2c<E: i2c::Error>(e: E) -> Self {
        Error::I2c(e.kind())
    }

    pub fn pin<E: digital::Error>(e: E) -> Self {
        Error::Pin(e.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(kind) => write!(f, "spi: {kind}"),
            Error::I2c(kind) => write!(f, "i2c: {kind}"),
            Error::Pin(kind) => write!(f, "gpio: {kind:?}"),
            Error::BusyTimeout { waited_ms } => {
                write!(f, "panel busy for {waited_ms}ms, giving up")
            }
            Error::InvalidRotation(deg) => write!(f, "unsupported rotation {deg}"),
            Error::Hid => f.write_str("hid transport rejected report"),
        }
    }
}

impl core::error::Error for Error {}
