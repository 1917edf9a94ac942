//! Backlight output.
//!
//! The backlight is driven by a PWM duty cycle. The engines only decide a level; the board code
//! (or the PWM interrupt) applies it.

use portable_atomic::{AtomicU8, Ordering};

use crate::constants::MAX_BRIGHTNESS;

/// Something that can take a backlight level (`0..=MAX_BRIGHTNESS`).
pub trait Backlight {
    fn set_level(&mut self, level: u8);
}

impl<B: Backlight + ?Sized> Backlight for &mut B {
    fn set_level(&mut self, level: u8) {
        (**self).set_level(level);
    }
}

/// Backlight level shared with the PWM interrupt.
///
/// The main loop stores a level; the interrupt reads it when it reloads the compare register.
#[derive(Debug)]
pub struct SharedBacklight {
    level: AtomicU8,
}

impl SharedBacklight {
    #[must_use]
    pub const fn new(level: u8) -> Self {
        Self {
            level: AtomicU8::new(level),
        }
    }

    /// The most recently requested level.
    pub fn level(&self) -> u8 {
        self.level.load(Ordering::Relaxed)
    }
}

impl Backlight for &SharedBacklight {
    fn set_level(&mut self, level: u8) {
        let level = level.min(MAX_BRIGHTNESS);
        if self.level.swap(level, Ordering::Relaxed) != level {
            debug!("Backlight level {}", level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Backlight, SharedBacklight};
    use crate::constants::MAX_BRIGHTNESS;

    #[test]
    fn clamps_to_max_brightness() {
        static BACKLIGHT: SharedBacklight = SharedBacklight::new(0);
        let mut handle = &BACKLIGHT;
        handle.set_level(5);
        assert_eq!(BACKLIGHT.level(), 5);
        handle.set_level(200);
        assert_eq!(BACKLIGHT.level(), MAX_BRIGHTNESS);
    }
}
