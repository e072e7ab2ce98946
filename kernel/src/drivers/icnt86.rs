// ICNT86 capacitive touch controller (board-independent)
//
// Polled, no interrupt line. Registers are 16-bit big-endian
// addresses; a read is a pointer write followed by a plain read.
// Each poll: read the contact count, read that many 7-byte records,
// write 0 back to the count register to acknowledge, let the bus
// settle for 10ms.
//
// Record layout: [reserved, y lo, y hi, x lo, x hi, present, unused]

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::error::Error;
use crate::geometry::Rotation;

pub const ADDRESS: u8 = 0x48;

/// The controller tracks at most five fingers.
pub const MAX_CONTACTS: usize = 5;

// Sensor span; the raw X axis is mirrored against SENSOR_X_MAX.
pub const SENSOR_WIDTH: u16 = 128;
pub const SENSOR_HEIGHT: u16 = 296;
const SENSOR_X_MAX: u16 = SENSOR_WIDTH - 1;

const RECORD_LEN: usize = 7;
const RESET_DWELL_MS: u32 = 100;
const SETTLE_MS: u32 = 10;

mod reg {
    pub const TOUCH_COUNT: u16 = 0x1001;
    pub const TOUCH_RECORDS: u16 = 0x1002;
}

/// A finger position in rotated screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactPoint {
    pub x: u16,
    pub y: u16,
}

impl ContactPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Map a sensor-space point into screen space for the given mounting.
pub fn rotate(rotation: Rotation, x: u16, y: u16) -> ContactPoint {
    let (x, y) = match rotation {
        Rotation::Deg0 => (x, y),
        Rotation::Deg90 => (y, SENSOR_WIDTH.saturating_sub(x)),
        Rotation::Deg180 => (
            SENSOR_WIDTH.saturating_sub(x),
            SENSOR_HEIGHT.saturating_sub(y),
        ),
        Rotation::Deg270 => (SENSOR_HEIGHT.saturating_sub(y), x),
    };
    ContactPoint { x, y }
}

/// Contacts from one poll. Records are decoded as the iterator is
/// advanced; absent fingers are skipped.
pub struct Contacts {
    buf: [u8; MAX_CONTACTS * RECORD_LEN],
    count: usize,
    next: usize,
    rotation: Rotation,
}

impl Contacts {
    fn empty(rotation: Rotation) -> Self {
        Self {
            buf: [0; MAX_CONTACTS * RECORD_LEN],
            count: 0,
            next: 0,
            rotation,
        }
    }

    /// Number of records the controller reported (present or not).
    pub fn reported(&self) -> usize {
        self.count
    }
}

impl Iterator for Contacts {
    type Item = ContactPoint;

    fn next(&mut self) -> Option<ContactPoint> {
        while self.next < self.count {
            let off = self.next * RECORD_LEN;
            self.next += 1;
            let r = &self.buf[off..off + RECORD_LEN];
            if r[5] == 0 {
                continue;
            }
            let x = SENSOR_X_MAX.saturating_sub(u16::from_le_bytes([r[3], r[4]]));
            let y = u16::from_le_bytes([r[1], r[2]]);
            return Some(rotate(self.rotation, x, y));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count - self.next))
    }
}

pub struct Icnt86<I2C, TRST> {
    i2c: I2C,
    trst: TRST,
    rotation: Rotation,
}

impl<I2C, TRST> Icnt86<I2C, TRST>
where
    I2C: I2c,
    TRST: OutputPin,
{
    /// Owning the bus is what keeps other users off it for the life
    /// of the driver.
    pub fn new(i2c: I2C, trst: TRST, rotation: Rotation) -> Self {
        Self {
            i2c,
            trst,
            rotation,
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// With `reset`, pulse TRST high-low-high to restart the sensor.
    /// Without it the controller is left as found.
    pub fn init<D: DelayNs>(&mut self, reset: bool, delay: &mut D) -> Result<(), Error> {
        if !reset {
            return Ok(());
        }
        self.trst.set_high().map_err(Error::pin)?;
        delay.delay_ms(RESET_DWELL_MS);
        self.trst.set_low().map_err(Error::pin)?;
        delay.delay_ms(RESET_DWELL_MS);
        self.trst.set_high().map_err(Error::pin)?;
        delay.delay_ms(RESET_DWELL_MS);
        debug!("icnt86: reset");
        Ok(())
    }

    /// One bus round: read, acknowledge, settle.
    pub fn poll_contacts<D: DelayNs>(&mut self, delay: &mut D) -> Result<Contacts, Error> {
        let mut contacts = Contacts::empty(self.rotation);

        let mut count = [0u8; 1];
        self.read_register(reg::TOUCH_COUNT, &mut count)?;
        if count[0] > 0 {
            let mut n = count[0] as usize;
            if n > MAX_CONTACTS {
                warn!("icnt86: {} contacts reported, reading {}", n, MAX_CONTACTS);
                n = MAX_CONTACTS;
            }
            self.read_register(reg::TOUCH_RECORDS, &mut contacts.buf[..n * RECORD_LEN])?;
            contacts.count = n;
        }

        self.write_register(reg::TOUCH_COUNT, 0)?;
        delay.delay_ms(SETTLE_MS);
        Ok(contacts)
    }

    fn read_register(&mut self, reg: u16, buf: &mut [u8]) -> Result<(), Error> {
        self.i2c.write(ADDRESS, &reg.to_be_bytes()).map_err(Error::i2c)?;
        self.i2c.read(ADDRESS, buf).map_err(Error::i2c)
    }

    fn write_register(&mut self, reg: u16, value: u8) -> Result<(), Error> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c.write(ADDRESS, &[hi, lo, value]).map_err(Error::i2c)
    }
}
