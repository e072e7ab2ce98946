// HID transport seam.
//
// Report encoding belongs to the transport; the kernel only says
// which keys go down, which consumer usage to send, and when to let
// go. Codes are HID usage IDs (keyboard page 0x07, consumer page 0x0C).

use crate::error::Error;

/// Keyboard-page usages the macro-pad needs: the two modifiers used in
/// OS shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Keycode {
    LeftAlt = 0xE2,
    /// Command on macOS, Windows key elsewhere.
    LeftGui = 0xE3,
}

impl Keycode {
    pub const fn usage(self) -> u8 {
        self as u8
    }

    /// Bit in the boot-keyboard modifier byte.
    pub const fn modifier_bit(self) -> u8 {
        match self {
            Keycode::LeftAlt => 0x04,
            Keycode::LeftGui => 0x08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ConsumerCode {
    BrightnessDecrement = 0x70,
    FastForward = 0xB3,
    Rewind = 0xB4,
    Eject = 0xB8,
    PlayPause = 0xCD,
    Mute = 0xE2,
    VolumeIncrement = 0xE9,
    VolumeDecrement = 0xEA,
}

impl ConsumerCode {
    pub const fn usage(self) -> u16 {
        self as u16
    }
}

pub trait HidSink {
    /// Hold `keys` down until `release_all`.
    fn press(&mut self, keys: &[Keycode]) -> Result<(), Error>;

    /// Tap a consumer-control usage (press and release).
    fn send_consumer(&mut self, code: ConsumerCode) -> Result<(), Error>;

    fn release_all(&mut self) -> Result<(), Error>;

    /// Called once per loop tick so USB-style transports can answer
    /// the host between reports.
    fn service(&mut self) {}
}
