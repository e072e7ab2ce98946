// The three side keys: pulled up, pressed = low.

use embedded_hal::digital::InputPin;

use crate::error::Error;

pub struct Keys<P> {
    pins: [P; 3],
}

impl<P: InputPin> Keys<P> {
    pub fn new(pins: [P; 3]) -> Self {
        Self { pins }
    }

    /// Bit n set while key n is held.
    pub fn mask(&mut self) -> Result<u8, Error> {
        let mut mask = 0;
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            if pin.is_low().map_err(Error::pin)? {
                mask |= 1 << bit;
            }
        }
        Ok(mask)
    }
}
