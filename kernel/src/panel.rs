//! Splash layout: the tap zones drawn as keys.
//!
//! E-paper keeps the image without power, so this is rendered once on
//! cold boot and stays on the glass through deep sleep. Long-press
//! keys are drawn filled so they read differently from plain taps.

use embedded_graphics::{
    mono_font::{MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{CornerRadii, PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::zones::{DEFAULT_MIN_HOLD_MS, TapZone, ZONE_SIZE};

// gap left around each key so neighbours don't merge
const INSET: u32 = 3;
const RADIUS: u32 = 6;
const STROKE: u32 = 2;

pub fn draw_layout<D>(zones: &[TapZone], display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    display.clear(BinaryColor::Off)?;
    for zone in zones {
        draw_key(zone, display)?;
    }
    Ok(())
}

fn draw_key<D>(zone: &TapZone, display: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let side = ZONE_SIZE as u32 - 2 * INSET;
    let rect = Rectangle::new(
        Point::new((zone.x as u32 + INSET) as i32, (zone.y as u32 + INSET) as i32),
        Size::new(side, side),
    );
    let key = RoundedRectangle::new(rect, CornerRadii::new(Size::new(RADIUS, RADIUS)));

    let hold_key = zone.min_hold_ms > DEFAULT_MIN_HOLD_MS;
    let text_color = if hold_key {
        key.into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display)?;
        BinaryColor::Off
    } else {
        key.into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, STROKE))
            .draw(display)?;
        BinaryColor::On
    };

    let character = MonoTextStyle::new(&FONT_6X10, text_color);
    let text = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(zone.action.label(), rect.center(), character, text).draw(display)?;
    Ok(())
}
