// Panel orientation shared by the display and touch drivers.

use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rotation {
    Deg0,
    Deg90,
    Deg180,
    #[default]
    Deg270,
}

impl Rotation {
    /// Only the four right angles are accepted; anything else is a
    /// configuration mistake caught before a driver exists.
    pub const fn from_degrees(deg: u16) -> Result<Self, Error> {
        match deg {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Error::InvalidRotation(other)),
        }
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True for 90 and 270, where logical width and height trade places.
    pub const fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = Error;

    fn try_from(deg: u16) -> Result<Self, Error> {
        Rotation::from_degrees(deg)
    }
}

/// Logical panel size as seen by the user, plus how it is mounted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelGeometry {
    pub width: u16,
    pub height: u16,
    pub rotation: Rotation,
}

impl PanelGeometry {
    pub const fn new(width: u16, height: u16, rotation: Rotation) -> Self {
        Self {
            width,
            height,
            rotation,
        }
    }

    /// Size in controller RAM order (source lines, gate lines).
    pub const fn native_size(&self) -> (u16, u16) {
        if self.rotation.is_quarter_turn() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Number of gate lines driven, i.e. the native height.
    pub const fn gate_lines(&self) -> u16 {
        self.native_size().1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_odd_angles() {
        assert_eq!(Rotation::from_degrees(45), Err(Error::InvalidRotation(45)));
        assert_eq!(Rotation::try_from(360), Err(Error::InvalidRotation(360)));
        assert_eq!(Rotation::try_from(90), Ok(Rotation::Deg90));
    }

    #[test]
    fn quarter_turn_swaps_native_size() {
        let landscape = PanelGeometry::new(296, 128, Rotation::Deg270);
        assert_eq!(landscape.native_size(), (128, 296));
        assert_eq!(landscape.gate_lines(), 296);

        let upright = PanelGeometry::new(296, 128, Rotation::Deg0);
        assert_eq!(upright.native_size(), (296, 128));
        assert_eq!(upright.gate_lines(), 128);
    }
}
