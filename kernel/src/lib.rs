// Board-independent core for the tapdeck e-paper macro-pad
//
// Drivers talk to the hardware only through embedded-hal traits; the
// firmware crate wires in esp-hal peripherals. Everything here also
// builds on the host so the dispatch logic and bus sequences can be
// checked with recorded fakes.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod dispatch;
pub mod drivers;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod hid;
pub mod panel;
pub mod power;
pub mod zones;

#[cfg(test)]
mod testing;

pub use app::{Macropad, SleepRequest, WakeCondition};
pub use error::Error;
pub use geometry::{PanelGeometry, Rotation};
