// SSD1680 e-paper driver (board-independent)
// Tested on the 2.9" 296x128 mono panel. The controller is driven by
// two byte-coded command sequences: a start sequence replayed before
// every frame and a stop sequence that parks it in deep sleep.
//
// Sequence encoding: opcode, length, payload. Bit 7 of the length
// byte means one extra byte follows the payload with a delay in ms
// (0xFF stands for 500ms). Busy is checked after every command.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use log::{debug, info, warn};

use crate::error::Error;
use crate::geometry::PanelGeometry;

/// Native (unrotated) panel size in pixels.
pub const WIDTH: u16 = 128;
pub const HEIGHT: u16 = 296;

/// One bit per pixel, rows of WIDTH/8 bytes, HEIGHT rows.
pub const FRAME_BYTES: usize = (WIDTH as usize / 8) * HEIGHT as usize;

pub const BUSY_TIMEOUT_MS: u32 = 10_000;
const BUSY_POLL_MS: u32 = 1;
const RESET_PULSE_MS: u32 = 10;

// RAM column counter starts one byte in (the panel's source offset)
const COLSTART: u8 = 1;

const DELAY_FLAG: u8 = 0x80;
const LONG_DELAY: u8 = 0xFF;
const LONG_DELAY_MS: u32 = 500;

// SSD1680 commands
#[allow(dead_code)]
mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const GATE_VOLTAGE: u8 = 0x03;
    pub const SOURCE_VOLTAGE: u8 = 0x04;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const WRITE_RAM_RED: u8 = 0x26;
    pub const WRITE_VCOM: u8 = 0x2C;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_RANGE: u8 = 0x44;
    pub const SET_RAM_Y_RANGE: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

#[rustfmt::skip]
const START_SEQUENCE: [u8; 45] = [
    cmd::SW_RESET,                 0x80, 0x14,             // soft reset, 20ms
    cmd::DATA_ENTRY_MODE,          0x01, 0x03,             // X inc, Y inc
    cmd::BORDER_WAVEFORM,          0x01, 0x05,
    cmd::WRITE_VCOM,               0x01, 0x36,
    cmd::GATE_VOLTAGE,             0x01, 0x17,
    cmd::SOURCE_VOLTAGE,           0x03, 0x41, 0x00, 0x32,
    cmd::SET_RAM_X_COUNTER,        0x01, 0x01,
    cmd::SET_RAM_Y_COUNTER,        0x02, 0x00, 0x00,
    cmd::DRIVER_OUTPUT_CONTROL,    0x03, 0x00, 0x00, 0x00, // gates - 1 patched
    cmd::SET_RAM_X_RANGE,          0x02, 0x01, 0x10,
    cmd::SET_RAM_Y_RANGE,          0x04, 0x00, 0x00, 0x00, 0x00, // end patched
    cmd::DISPLAY_UPDATE_CONTROL_2, 0x01, 0xF4,
];

// where the little-endian (gate lines - 1) lands in START_SEQUENCE
const GATE_PATCH_OFFSETS: [usize; 2] = [29, 40];

const STOP_SEQUENCE: [u8; 4] = [cmd::DEEP_SLEEP, 0x81, 0x01, 0x64]; // mode 1, 100ms

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BusyLevel {
    /// BUSY reads high while the controller works.
    #[default]
    High,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub geometry: PanelGeometry,
    pub busy_level: BusyLevel,
}

impl Config {
    pub const fn new(geometry: PanelGeometry) -> Self {
        Self {
            geometry,
            busy_level: BusyLevel::High,
        }
    }

    pub const fn with_busy_level(mut self, level: BusyLevel) -> Self {
        self.busy_level = level;
        self
    }
}

/// One decoded entry of a command sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command<'a> {
    pub opcode: u8,
    pub data: &'a [u8],
    pub delay_ms: Option<u32>,
}

/// Walks an (opcode, length, payload[, delay]) byte string.
pub struct Commands<'a> {
    bytes: &'a [u8],
}

impl<'a> Commands<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl<'a> Iterator for Commands<'a> {
    type Item = Command<'a>;

    fn next(&mut self) -> Option<Command<'a>> {
        let bytes = self.bytes;
        let [opcode, len, rest @ ..] = bytes else {
            return None;
        };
        let has_delay = len & DELAY_FLAG != 0;
        let n = (len & !DELAY_FLAG) as usize;
        let needed = n + has_delay as usize;
        if rest.len() < needed {
            warn!("ssd1680: truncated sequence at opcode {:#04x}", opcode);
            self.bytes = &[];
            return None;
        }
        let data = &rest[..n];
        let delay_ms = has_delay.then(|| match rest[n] {
            LONG_DELAY => LONG_DELAY_MS,
            ms => ms as u32,
        });
        self.bytes = &rest[needed..];
        Some(Command {
            opcode: *opcode,
            data,
            delay_ms,
        })
    }
}

pub struct Ssd1680<SPI, DC, BUSY, RST> {
    spi: SPI,
    dc: DC,
    busy: BUSY,
    rst: Option<RST>,
    config: Config,
    start: [u8; START_SEQUENCE.len()],
    stop: &'static [u8],
}

impl<SPI, DC, BUSY, RST> Ssd1680<SPI, DC, BUSY, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    BUSY: InputPin,
    RST: OutputPin,
{
    /// Build the driver and, when a reset line is wired, hardware-reset
    /// the controller. Without one the panel can't be woken from deep
    /// sleep, so the stop sequence is left empty and `sleep` does nothing.
    pub fn new<D: DelayNs>(
        spi: SPI,
        dc: DC,
        busy: BUSY,
        rst: Option<RST>,
        config: Config,
        delay: &mut D,
    ) -> Result<Self, Error> {
        let mut start = START_SEQUENCE;
        let last_gate = config.geometry.gate_lines().saturating_sub(1).to_le_bytes();
        for off in GATE_PATCH_OFFSETS {
            start[off..off + 2].copy_from_slice(&last_gate);
        }

        let stop: &'static [u8] = if rst.is_some() { &STOP_SEQUENCE } else { &[] };

        let mut epd = Self {
            spi,
            dc,
            busy,
            rst,
            config,
            start,
            stop,
        };

        if epd.rst.is_some() {
            epd.reset(delay)?;
        } else {
            info!("ssd1680: no reset line, deep sleep disabled");
        }

        Ok(epd)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn start_sequence(&self) -> &[u8] {
        &self.start
    }

    pub fn stop_sequence(&self) -> &[u8] {
        self.stop
    }

    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        let Some(rst) = self.rst.as_mut() else {
            return Ok(());
        };
        rst.set_low().map_err(Error::pin)?;
        delay.delay_ms(RESET_PULSE_MS);
        rst.set_high().map_err(Error::pin)?;
        delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }

    /// Push a full frame (native RAM layout) and run a full refresh.
    /// Returns once BUSY releases.
    pub fn show_frame<D: DelayNs>(
        &mut self,
        pixels: &[u8; FRAME_BYTES],
        delay: &mut D,
    ) -> Result<(), Error> {
        let start = self.start;
        self.send_sequence(&start, true, delay)?;

        self.send_command(cmd::SET_RAM_X_COUNTER)?;
        self.send_data(&[COLSTART])?;
        self.send_command(cmd::SET_RAM_Y_COUNTER)?;
        self.send_data(&[0x00, 0x00])?;

        self.send_command(cmd::WRITE_RAM_BW)?;
        self.send_data(pixels)?;

        self.send_command(cmd::MASTER_ACTIVATION)?;
        self.wait_busy(delay)?;
        debug!("ssd1680: frame shown");
        Ok(())
    }

    pub fn sleep<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        if self.stop.is_empty() {
            return Ok(());
        }
        // BUSY stays asserted once the controller is asleep
        let stop = self.stop;
        self.send_sequence(stop, false, delay)?;
        info!("ssd1680: deep sleep");
        Ok(())
    }

    // ── Low-level SPI / busy ────────────────────────────────

    fn send_sequence<D: DelayNs>(
        &mut self,
        seq: &[u8],
        wait_for_busy: bool,
        delay: &mut D,
    ) -> Result<(), Error> {
        for c in Commands::new(seq) {
            self.send_command(c.opcode)?;
            if !c.data.is_empty() {
                self.send_data(c.data)?;
            }
            if let Some(ms) = c.delay_ms {
                delay.delay_ms(ms);
            }
            if wait_for_busy {
                self.wait_busy(delay)?;
            }
        }
        Ok(())
    }

    fn is_busy(&mut self) -> Result<bool, Error> {
        let high = self.busy.is_high().map_err(Error::pin)?;
        Ok(match self.config.busy_level {
            BusyLevel::High => high,
            BusyLevel::Low => !high,
        })
    }

    fn wait_busy<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error> {
        let mut waited_ms = 0;
        while self.is_busy()? {
            if waited_ms >= BUSY_TIMEOUT_MS {
                return Err(Error::BusyTimeout { waited_ms });
            }
            delay.delay_ms(BUSY_POLL_MS);
            waited_ms += BUSY_POLL_MS;
        }
        Ok(())
    }

    fn send_command(&mut self, cmd: u8) -> Result<(), Error> {
        self.dc.set_low().map_err(Error::pin)?;
        self.spi.write(&[cmd]).map_err(Error::spi)?;
        self.dc.set_high().map_err(Error::pin)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), Error> {
        self.dc.set_high().map_err(Error::pin)?;
        self.spi.write(data).map_err(Error::spi)
    }
}
