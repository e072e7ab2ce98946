// Tap zones: the compiled-in layout of the panel.
//
// Eight 64x64 squares in rotated screen space. The right-hand column
// starts at x=232 so it hugs the 296px edge. A release only fires a
// zone's action once the hold reached the zone's minimum; the sleep
// key needs a deliberate half-second press so a brushed corner
// doesn't put the host to sleep.

use core::fmt;

use log::debug;

use crate::drivers::icnt86::ContactPoint;
use crate::error::Error;
use crate::hid::{ConsumerCode, HidSink, Keycode};

pub const ZONE_SIZE: u16 = 64;

/// "Any hold": releases shorter than this are treated as noise.
pub const DEFAULT_MIN_HOLD_MS: u64 = 10;

const LONG_PRESS_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Mute,
    VolumeDown,
    VolumeUp,
    Rewind,
    PlayPause,
    FastForward,
    /// OS sleep shortcut: GUI+Alt+Eject.
    SleepNow,
    /// Display mirroring toggle: GUI+BrightnessDown.
    ToggleMirror,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Mute => "Mute",
            Action::VolumeDown => "Vol Down",
            Action::VolumeUp => "Vol Up",
            Action::Rewind => "Rewind",
            Action::PlayPause => "Play/Pause",
            Action::FastForward => "Fast Fwd",
            Action::SleepNow => "Sleep",
            Action::ToggleMirror => "Mirror",
        }
    }

    /// Short caption drawn inside the zone on the panel.
    pub fn label(self) -> &'static str {
        match self {
            Action::Mute => "MUTE",
            Action::VolumeDown => "VOL-",
            Action::VolumeUp => "VOL+",
            Action::Rewind => "<<",
            Action::PlayPause => ">||",
            Action::FastForward => ">>",
            Action::SleepNow => "SLEEP",
            Action::ToggleMirror => "MIRROR",
        }
    }

    /// Send the HID traffic for this action. Modifier combos go
    /// modifiers down, consumer code, then release everything.
    pub fn execute<H: HidSink>(self, hid: &mut H) -> Result<(), Error> {
        match self {
            Action::Mute => hid.send_consumer(ConsumerCode::Mute),
            Action::VolumeDown => hid.send_consumer(ConsumerCode::VolumeDecrement),
            Action::VolumeUp => hid.send_consumer(ConsumerCode::VolumeIncrement),
            Action::Rewind => hid.send_consumer(ConsumerCode::Rewind),
            Action::PlayPause => hid.send_consumer(ConsumerCode::PlayPause),
            Action::FastForward => hid.send_consumer(ConsumerCode::FastForward),
            Action::SleepNow => {
                hid.press(&[Keycode::LeftGui, Keycode::LeftAlt])?;
                hid.send_consumer(ConsumerCode::Eject)?;
                hid.release_all()
            }
            Action::ToggleMirror => {
                hid.press(&[Keycode::LeftGui])?;
                hid.send_consumer(ConsumerCode::BrightnessDecrement)?;
                hid.release_all()
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapZone {
    pub x: u16,
    pub y: u16,
    pub min_hold_ms: u64,
    pub action: Action,
}

impl TapZone {
    pub const fn new(x: u16, y: u16, action: Action) -> Self {
        Self {
            x,
            y,
            min_hold_ms: DEFAULT_MIN_HOLD_MS,
            action,
        }
    }

    pub const fn with_min_hold(mut self, ms: u64) -> Self {
        self.min_hold_ms = ms;
        self
    }

    /// Inclusive at the origin, exclusive at origin + ZONE_SIZE.
    pub fn contains(&self, p: ContactPoint) -> bool {
        let within = |v: u16, o: u16| v >= o && (v as u32) < o as u32 + ZONE_SIZE as u32;
        within(p.x, self.x) && within(p.y, self.y)
    }
}

pub const ZONES: &[TapZone] = &[
    TapZone::new(0, 0, Action::Mute),
    TapZone::new(64, 0, Action::VolumeDown),
    TapZone::new(128, 0, Action::VolumeUp),
    TapZone::new(0, 64, Action::Rewind),
    TapZone::new(64, 64, Action::PlayPause),
    TapZone::new(128, 64, Action::FastForward),
    TapZone::new(232, 0, Action::SleepNow).with_min_hold(LONG_PRESS_MS),
    TapZone::new(232, 64, Action::ToggleMirror),
];

/// Zone under `p`; the last declared one wins on overlap.
pub fn find_zone(zones: &[TapZone], p: ContactPoint) -> Option<&TapZone> {
    zones.iter().rev().find(|z| z.contains(p))
}

/// The action a release at `p` after `hold_ms` should fire, if any.
pub fn resolve(zones: &[TapZone], p: ContactPoint, hold_ms: u64) -> Option<Action> {
    let zone = find_zone(zones, p)?;
    if hold_ms < zone.min_hold_ms {
        debug!(
            "zone {}: hold {}ms < {}ms, dropped",
            zone.action, hold_ms, zone.min_hold_ms
        );
        return None;
    }
    Some(zone.action)
}
