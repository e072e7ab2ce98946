//! GPIO |     Function    |      Notes
//! -----+-----------------+----------------------------------
//!  2   | Key 0           | Active LOW, internal pullup
//!  3   | Key 1           | Active LOW, internal pullup
//!  6   | I2C0 SDA        | Touch controller (ICNT86 @ 0x48)
//!  7   | I2C0 SCL        |
//!  9   | EPD DC          | Data/Command select
//! 10   | EPD CS          | Display chip select
//! 11   | SPI2 MOSI       | Display is write-only, no MISO
//! 12   | SPI2 SCK        |
//! 13   | EPD RST         | Reset (active low)
//! 14   | EPD BUSY        | HIGH while the controller works
//! 15   | Key 2           | Active LOW, internal pullup
//! 16   | TP TRST         | Touch reset/trigger
//! 17   | TP INT          | LOW while touched; deep-sleep wake source
//! 19   | USB D-          | OTG FS
//! 20   | USB D+          | OTG FS

// ----- E-Paper Display -----
pub const EPD_CS: u8 = 10;
pub const EPD_DC: u8 = 9;
pub const EPD_RST: u8 = 13;
pub const EPD_BUSY: u8 = 14;

// ----- SPI Bus -----
pub const SPI_SCK: u8 = 12;
pub const SPI_MOSI: u8 = 11;

// ----- Touch -----
pub const TP_SDA: u8 = 6;
pub const TP_SCL: u8 = 7;
pub const TP_TRST: u8 = 16;
pub const TP_INT: u8 = 17; // wake alarm

// ----- Keys -----
pub const KEY0: u8 = 2;
pub const KEY1: u8 = 3;
pub const KEY2: u8 = 15;

// ----- USB -----
pub const USB_DM: u8 = 19;
pub const USB_DP: u8 = 20;
