// Tap-zone dispatcher: press/release edges to zone actions.
//
// IDLE <-> PRESSED, evaluated once per loop tick from "did this poll
// see a finger". The contact seen on the press edge is the one used
// at release; later positions during the same press are ignored, so
// sliding off a key still fires the key the press started on.

use log::debug;

use crate::drivers::icnt86::ContactPoint;
use crate::zones::{self, Action, TapZone, ZONES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchSession {
    pub pressed: bool,
    pub press_start_ms: u64,
    pub tracked: Option<ContactPoint>,
}

pub struct ZoneDispatcher {
    zones: &'static [TapZone],
    session: TouchSession,
}

impl ZoneDispatcher {
    pub const fn new() -> Self {
        Self::with_zones(ZONES)
    }

    pub const fn with_zones(zones: &'static [TapZone]) -> Self {
        Self {
            zones,
            session: TouchSession {
                pressed: false,
                press_start_ms: 0,
                tracked: None,
            },
        }
    }

    pub fn session(&self) -> &TouchSession {
        &self.session
    }

    /// Feed one tick. `contact` is the first contact of this poll, if
    /// any. Returns the action to fire on a qualifying release.
    pub fn update(&mut self, now_ms: u64, contact: Option<ContactPoint>) -> Option<Action> {
        let touching = contact.is_some();
        if touching == self.session.pressed {
            return None;
        }

        if touching {
            self.session = TouchSession {
                pressed: true,
                press_start_ms: now_ms,
                tracked: contact,
            };
            debug!("touch: press at {:?}", contact);
            return None;
        }

        let ended = core::mem::take(&mut self.session);
        let hold_ms = now_ms.saturating_sub(ended.press_start_ms);
        let at = ended.tracked?;
        debug!("touch: release after {}ms", hold_ms);
        zones::resolve(self.zones, at, hold_ms)
    }
}

impl Default for ZoneDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
