// Full 1-bpp frame in panel RAM order.
//
// The 296x128 panel is small enough (4736B) to keep whole, so there is
// no strip banding. Widgets draw in logical (rotated) coordinates;
// set bits are white, cleared bits black, as the controller expects.

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    pixelcolor::BinaryColor,
};

use crate::drivers::ssd1680::{FRAME_BYTES, HEIGHT, WIDTH};
use crate::geometry::Rotation;

const ROW_BYTES: usize = WIDTH as usize / 8;

pub struct Frame {
    buf: [u8; FRAME_BYTES],
    rotation: Rotation,
}

impl Frame {
    pub const fn new(rotation: Rotation) -> Self {
        Self {
            buf: [0xFF; FRAME_BYTES],
            rotation,
        }
    }

    pub fn clear(&mut self) {
        self.buf.fill(0xFF);
    }

    pub fn data(&self) -> &[u8; FRAME_BYTES] {
        &self.buf
    }

    /// Whether the logical pixel at (x, y) is black.
    pub fn is_black(&self, x: u16, y: u16) -> bool {
        let (px, py) = self.to_physical(x, y);
        let (idx, bit) = Self::locate(px, py);
        self.buf[idx] & (1 << bit) == 0
    }

    // logical -> panel RAM coordinates
    #[inline]
    fn to_physical(&self, lx: u16, ly: u16) -> (u16, u16) {
        match self.rotation {
            Rotation::Deg0 => (lx, ly),
            Rotation::Deg90 => (WIDTH - 1 - ly, lx),
            Rotation::Deg180 => (WIDTH - 1 - lx, HEIGHT - 1 - ly),
            Rotation::Deg270 => (ly, HEIGHT - 1 - lx),
        }
    }

    #[inline]
    fn locate(px: u16, py: u16) -> (usize, u16) {
        let idx = px as usize / 8 + py as usize * ROW_BYTES;
        (idx, 7 - px % 8)
    }

    fn set_pixel(&mut self, x: u16, y: u16, black: bool) {
        let (px, py) = self.to_physical(x, y);
        let (idx, bit) = Self::locate(px, py);
        if black {
            self.buf[idx] &= !(1 << bit);
        } else {
            self.buf[idx] |= 1 << bit;
        }
    }
}

impl DrawTarget for Frame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let size = self.size();
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x as u32 >= size.width || y as u32 >= size.height {
                continue;
            }
            self.set_pixel(x as u16, y as u16, color.is_on());
        }
        Ok(())
    }
}

impl OriginDimensions for Frame {
    fn size(&self) -> Size {
        if self.rotation.is_quarter_turn() {
            Size::new(HEIGHT as u32, WIDTH as u32)
        } else {
            Size::new(WIDTH as u32, HEIGHT as u32)
        }
    }
}
