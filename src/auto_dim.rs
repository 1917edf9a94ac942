//! Auto-dimming backlight.
//!
//! Two rules, "day" and "night", each pair a time of day with a backlight level. Whichever rule
//! started most recently (going backwards around the clock from now) decides the level.
//!
//! The decision treats the night rule's time as the zero point of a 1440-minute circle, so a night
//! that starts numerically later than the day (23:00 vs 06:00) needs no special case.

use crate::backlight::Backlight;
use crate::constants::{MAX_BRIGHTNESS, MINUTES_PER_DAY};
use crate::storage::{Storage, addr};

/// A time of day (minutes since midnight) and the backlight level that starts then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DimRule {
    pub time_of_day: u16,
    pub brightness: u8,
}

impl DimRule {
    #[must_use]
    pub const fn new(time_of_day: u16, brightness: u8) -> Self {
        Self {
            time_of_day,
            brightness,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.time_of_day < MINUTES_PER_DAY && self.brightness <= MAX_BRIGHTNESS
    }
}

/// Compiled-in day rule: 06:00, level 10.
pub const DEFAULT_DAY_RULE: DimRule = DimRule::new(6 * 60, 10);
/// Compiled-in night rule: 23:00, level 1.
pub const DEFAULT_NIGHT_RULE: DimRule = DimRule::new(23 * 60, 1);

/// Which of the two rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DimPeriod {
    Day,
    Night,
}

impl DimPeriod {
    const fn time_addr(self) -> u16 {
        match self {
            Self::Day => addr::DIM_DAY_TIME,
            Self::Night => addr::DIM_NIGHT_TIME,
        }
    }

    const fn brightness_addr(self) -> u16 {
        match self {
            Self::Day => addr::DIM_DAY_BRIGHTNESS,
            Self::Night => addr::DIM_NIGHT_BRIGHTNESS,
        }
    }
}

/// Which period is in effect at `now_minutes`.
///
/// Night when `(now - night) mod 1440 < (day - night) mod 1440`, day otherwise. When both rules
/// share the same time the day rule always wins.
#[must_use]
pub fn period_at(day: DimRule, night: DimRule, now_minutes: u16) -> DimPeriod {
    let day_standard = minutes_after(day.time_of_day, night.time_of_day);
    let now_standard = minutes_after(now_minutes, night.time_of_day);
    if now_standard < day_standard {
        DimPeriod::Night
    } else {
        DimPeriod::Day
    }
}

/// Backlight level in effect at `now_minutes`.
#[must_use]
pub fn resolve_brightness(day: DimRule, night: DimRule, now_minutes: u16) -> u8 {
    match period_at(day, night, now_minutes) {
        DimPeriod::Day => day.brightness,
        DimPeriod::Night => night.brightness,
    }
}

/// `(time - origin) mod 1440`, for times already below 1440.
#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "Operands are below 1440 after the first modulo; the sum stays below 2880."
)]
const fn minutes_after(time: u16, origin: u16) -> u16 {
    (time % MINUTES_PER_DAY + MINUTES_PER_DAY - origin % MINUTES_PER_DAY) % MINUTES_PER_DAY
}

/// The auto-dim engine: the two rules plus persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoDim {
    day: DimRule,
    night: DimRule,
}

impl Default for AutoDim {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_RULE, DEFAULT_NIGHT_RULE)
    }
}

impl AutoDim {
    #[must_use]
    pub const fn new(day: DimRule, night: DimRule) -> Self {
        Self { day, night }
    }

    /// Load both rules from storage.
    ///
    /// Any stored value outside its valid range (an erased or corrupted cell) is replaced by the
    /// compiled-in default, which is written straight back so the next boot finds a valid value.
    pub fn load<S: Storage + ?Sized>(storage: &mut S, defaults: &Self) -> Self {
        let day = load_rule(storage, DimPeriod::Day, defaults.day);
        let night = load_rule(storage, DimPeriod::Night, defaults.night);
        info!(
            "AutoDim: day {}@{} night {}@{}",
            day.brightness, day.time_of_day, night.brightness, night.time_of_day
        );
        Self { day, night }
    }

    #[must_use]
    pub const fn day(&self) -> DimRule {
        self.day
    }

    #[must_use]
    pub const fn night(&self) -> DimRule {
        self.night
    }

    #[must_use]
    pub const fn rule(&self, period: DimPeriod) -> DimRule {
        match period {
            DimPeriod::Day => self.day,
            DimPeriod::Night => self.night,
        }
    }

    /// Backlight level in effect at `now_minutes`.
    #[must_use]
    pub fn brightness_at(&self, now_minutes: u16) -> u8 {
        resolve_brightness(self.day, self.night, now_minutes)
    }

    /// Resolve the level for `now_minutes` and write it to the backlight.
    pub fn apply<B: Backlight + ?Sized>(&self, now_minutes: u16, backlight: &mut B) -> u8 {
        let level = self.brightness_at(now_minutes);
        backlight.set_level(level);
        level
    }

    /// Replace one rule, persist it (only the cells that changed) and re-apply right away so the
    /// screen reflects the new setting without waiting for the next minute.
    ///
    /// Returns `false` and changes nothing when `rule` is out of range.
    pub fn commit<S, B>(
        &mut self,
        period: DimPeriod,
        rule: DimRule,
        storage: &mut S,
        now_minutes: u16,
        backlight: &mut B,
    ) -> bool
    where
        S: Storage + ?Sized,
        B: Backlight + ?Sized,
    {
        if !rule.is_valid() {
            warn!("AutoDim: rejected out-of-range rule");
            return false;
        }
        match period {
            DimPeriod::Day => self.day = rule,
            DimPeriod::Night => self.night = rule,
        }
        store_rule(storage, period, rule);
        self.apply(now_minutes, backlight);
        true
    }
}

fn load_rule<S: Storage + ?Sized>(storage: &mut S, period: DimPeriod, default: DimRule) -> DimRule {
    let mut time_of_day = storage.read_word(period.time_addr());
    if time_of_day >= MINUTES_PER_DAY {
        time_of_day = default.time_of_day;
        storage.write_word(period.time_addr(), time_of_day);
    }
    let mut brightness = storage.read_byte(period.brightness_addr());
    if brightness > MAX_BRIGHTNESS {
        brightness = default.brightness;
        storage.write_byte(period.brightness_addr(), brightness);
    }
    DimRule::new(time_of_day, brightness)
}

fn store_rule<S: Storage + ?Sized>(storage: &mut S, period: DimPeriod, rule: DimRule) {
    storage.update_word(period.time_addr(), rule.time_of_day);
    storage.update_byte(period.brightness_addr(), rule.brightness);
}
