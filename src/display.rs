//! Display primitives, screen layout and the static world map.
//!
//! The animation controller never touches display memory directly. It only issues the handful of
//! primitives in [`Display`]; [`GraphicsDisplay`] implements them on top of any
//! `embedded-graphics` monochrome draw target (a KS0108 driver, a simulator framebuffer, ...).
//!
//! Colors are expressed as `on`: an "on" pixel is dark on a normal screen. When the whole screen
//! is inverted the background is "on" and the foreground "off".

use embedded_graphics::Drawable;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::mono_font::ascii::FONT_5X7;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, Point, Primitive, Size};
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::constants::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Width of one text cell.
pub const CHAR_WIDTH: u8 = 6;

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: u8,
    pub y: u8,
    pub w: u8,
    pub h: u8,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u8, y: u8, w: u8, h: u8) -> Self {
        Self { x, y, w, h }
    }

    #[expect(clippy::arithmetic_side_effects, reason = "Two u8 values always fit in a u16 sum.")]
    const fn right(self) -> u16 {
        self.x as u16 + self.w as u16
    }

    #[expect(clippy::arithmetic_side_effects, reason = "Two u8 values always fit in a u16 sum.")]
    const fn bottom(self) -> u16 {
        self.y as u16 + self.h as u16
    }

    /// Overlapping part of two rectangles, `None` when they do not overlap.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::arithmetic_side_effects,
        reason = "The overlap lies inside `self`, so every coordinate fits in a u8."
    )]
    pub fn intersection(self, other: Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if u16::from(left) >= right || u16::from(top) >= bottom {
            return None;
        }
        Some(Self {
            x: left,
            y: top,
            w: (right - u16::from(left)) as u8,
            h: (bottom - u16::from(top)) as u8,
        })
    }

    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.intersection(other).is_some()
    }
}

/// Screen regions.
pub mod layout {
    use super::{CHAR_WIDTH, Rect, SCREEN_HEIGHT, SCREEN_WIDTH};

    pub const SCREEN: Rect = Rect::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT);

    /// The world map the satellite flies over.
    pub const MAP: Rect = Rect::new(0, 0, SCREEN_WIDTH, 48);

    /// Vertical center of the satellite ground track.
    pub const TRACK_CENTER_Y: u8 = 23;
    /// Peak deviation of the ground track from its center (the orbit inclination, scaled).
    pub const TRACK_AMPLITUDE: f32 = 13.0;
    /// Satellite sprite edge length.
    pub const SATELLITE_SIZE: u8 = 3;

    /// Baseline row of the time bar text.
    pub const TIME_TEXT_Y: u8 = 53;
    pub const HOUR_X: u8 = 34;
    pub const COLON_X: u8 = HOUR_X + 2 * CHAR_WIDTH;
    pub const MINUTE_X: u8 = COLON_X + CHAR_WIDTH;
    pub const AM_PM_X: u8 = MINUTE_X + 3 * CHAR_WIDTH;
    pub const ALARM_GLYPH_X: u8 = AM_PM_X + 3 * CHAR_WIDTH;

    /// Everything the time bar owns: hours, colon, minutes, AM/PM and the alarm glyph.
    pub const TIME: Rect = Rect::new(HOUR_X, 48, ALARM_GLYPH_X + CHAR_WIDTH - HOUR_X, 16);

    /// Popup frame.
    pub const POPUP: Rect = Rect::new(14, 8, 100, 30);
    pub const POPUP_TEXT_X: u8 = 20;
    pub const POPUP_LABEL: Rect = Rect::new(16, 12, 96, 8);
    pub const POPUP_VALUE: Rect = Rect::new(16, 24, 96, 8);
}

/// Land masses of the world map, as filled blocks inside [`layout::MAP`].
///
/// Coarse on purpose: only its pixels (not its artistry) matter to the redraw logic.
pub const WORLD_MAP: [Rect; 8] = [
    Rect::new(6, 6, 28, 12),   // North America
    Rect::new(18, 18, 12, 6),  // Central America
    Rect::new(30, 25, 10, 17), // South America
    Rect::new(42, 2, 8, 5),    // Greenland
    Rect::new(58, 5, 14, 9),   // Europe
    Rect::new(58, 16, 16, 20), // Africa
    Rect::new(72, 3, 42, 16),  // Asia
    Rect::new(100, 30, 16, 8), // Australia
];

/// Drawing primitives the animation controller needs from a display driver.
pub trait Display {
    type Error;

    /// Fill `area` with on or off pixels.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the write fails.
    fn fill_rectangle(&mut self, area: Rect, on: bool) -> Result<(), Self::Error>;

    /// Move the text cursor (top-left of the next character cell).
    fn set_cursor(&mut self, x: u8, y: u8);

    /// Write text at the cursor and advance it.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the write fails.
    fn write_str(&mut self, text: &str, inverted: bool) -> Result<(), Self::Error>;

    /// Write one character at the cursor and advance it.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the write fails.
    fn write_char(&mut self, ch: char, inverted: bool) -> Result<(), Self::Error>;

    /// Draw a one-pixel outline around `area`.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the write fails.
    fn draw_rectangle_outline(&mut self, area: Rect, on: bool) -> Result<(), Self::Error>;
}

impl<D: Display + ?Sized> Display for &mut D {
    type Error = D::Error;

    fn fill_rectangle(&mut self, area: Rect, on: bool) -> Result<(), Self::Error> {
        (**self).fill_rectangle(area, on)
    }

    fn set_cursor(&mut self, x: u8, y: u8) {
        (**self).set_cursor(x, y);
    }

    fn write_str(&mut self, text: &str, inverted: bool) -> Result<(), Self::Error> {
        (**self).write_str(text, inverted)
    }

    fn write_char(&mut self, ch: char, inverted: bool) -> Result<(), Self::Error> {
        (**self).write_char(ch, inverted)
    }

    fn draw_rectangle_outline(&mut self, area: Rect, on: bool) -> Result<(), Self::Error> {
        (**self).draw_rectangle_outline(area, on)
    }
}

/// Repaint `area` with exactly the map pixels that belong there.
///
/// Used to erase a sprite without leaving a blank hole in the map.
///
/// # Errors
///
/// Returns the driver's error if a write fails.
pub fn restore_background<D: Display + ?Sized>(
    display: &mut D,
    area: Rect,
    inverted: bool,
) -> Result<(), D::Error> {
    display.fill_rectangle(area, inverted)?;
    for land in &WORLD_MAP {
        if let Some(overlap) = land.intersection(area) {
            display.fill_rectangle(overlap, !inverted)?;
        }
    }
    Ok(())
}

/// [`Display`] on top of an `embedded-graphics` monochrome draw target.
pub struct GraphicsDisplay<D> {
    target: D,
    cursor: Point,
}

impl<D: DrawTarget<Color = BinaryColor>> GraphicsDisplay<D> {
    #[must_use]
    pub const fn new(target: D) -> Self {
        Self {
            target,
            cursor: Point::zero(),
        }
    }

    pub const fn target(&self) -> &D {
        &self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

const fn color(on: bool) -> BinaryColor {
    if on { BinaryColor::On } else { BinaryColor::Off }
}

fn to_rectangle(area: Rect) -> Rectangle {
    Rectangle::new(
        Point::new(i32::from(area.x), i32::from(area.y)),
        Size::new(u32::from(area.w), u32::from(area.h)),
    )
}

impl<D: DrawTarget<Color = BinaryColor>> Display for GraphicsDisplay<D> {
    type Error = D::Error;

    fn fill_rectangle(&mut self, area: Rect, on: bool) -> Result<(), Self::Error> {
        self.target.fill_solid(&to_rectangle(area), color(on))
    }

    fn set_cursor(&mut self, x: u8, y: u8) {
        self.cursor = Point::new(i32::from(x), i32::from(y));
    }

    fn write_str(&mut self, text: &str, inverted: bool) -> Result<(), Self::Error> {
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_5X7)
            .text_color(color(!inverted))
            .background_color(color(inverted))
            .build();
        self.cursor =
            Text::with_baseline(text, self.cursor, style, Baseline::Top).draw(&mut self.target)?;
        Ok(())
    }

    fn write_char(&mut self, ch: char, inverted: bool) -> Result<(), Self::Error> {
        let mut buffer = [0_u8; 4];
        self.write_str(ch.encode_utf8(&mut buffer), inverted)
    }

    fn draw_rectangle_outline(&mut self, area: Rect, on: bool) -> Result<(), Self::Error> {
        to_rectangle(area)
            .into_styled(PrimitiveStyle::with_stroke(color(on), 1))
            .draw(&mut self.target)
    }
}
