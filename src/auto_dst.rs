//! Automatic daylight-saving time.
//!
//! DST starts and ends on recurring "nth weekday of a month at an hour" instants (e.g. the 2nd
//! Sunday of March at 02:00). Every tick the engine resolves both rules for the current year,
//! decides whether DST should be in effect now, and shifts the real-time clock by one hour when
//! that decision disagrees with the persisted DST flag.
//!
//! A shift back by one hour replays the hour just before the end instant, which would immediately
//! look like "DST should be on" again. The `changed_today` latch allows no further shift until the
//! clock reaches a date later than every date the last shift touched, which breaks that loop even
//! when a shift at midnight moves the date backwards.

use time::{Month, Weekday};

use crate::calendar::{day_of_week, days_in_month, seconds_into_year};
use crate::clock_time::{CalendarDate, DateTime};
use crate::constants::SECONDS_PER_HOUR;
use crate::rtc::RealTimeClock;
use crate::storage::{Storage, addr};
use crate::{Error, Result};

/// Occurrence number that means "the last one in the month".
pub const LAST: u8 = 5;

/// "The `nth` `weekday` of `month` at `hour`:00".
///
/// `nth` runs 1–5; 5 means the last occurrence, whether the month has four or five of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstRule {
    pub hour: u8,
    pub weekday: Weekday,
    pub nth: u8,
    pub month: Month,
}

impl DstRule {
    /// Build a rule from its packed form `[hour, weekday (0 = Sunday), nth, month]`.
    ///
    /// Returns `None` when any field is out of range.
    #[must_use]
    pub fn from_packed(packed: [u8; 4]) -> Option<Self> {
        let [hour, weekday, nth, month] = packed;
        if hour >= 24 || weekday >= 7 || !(1..=LAST).contains(&nth) {
            return None;
        }
        Some(Self {
            hour,
            weekday: Weekday::Sunday.nth_next(weekday),
            nth,
            month: Month::try_from(month).ok()?,
        })
    }

    /// The packed form `[hour, weekday (0 = Sunday), nth, month]`.
    #[must_use]
    pub const fn to_packed(&self) -> [u8; 4] {
        [
            self.hour,
            self.weekday.number_days_from_sunday(),
            self.nth,
            self.month as u8,
        ]
    }

    /// Day of the month this rule falls on in the given year.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "Weekdays are below 7 and nth at most 5, so every value stays below 40."
    )]
    pub fn day_in_year(&self, year_offset: u8) -> u8 {
        let month = self.month as u8;
        let first_weekday = day_of_week(month, 1, year_offset);
        let target = self.weekday.number_days_from_sunday();
        let first_occurrence = 1 + (target + 7 - first_weekday) % 7;
        let mut day = first_occurrence + 7 * self.nth.clamp(1, LAST).saturating_sub(1);
        if day > days_in_month(month, year_offset) {
            // Only reachable for the fifth occurrence: fall back to the last one.
            day -= 7;
        }
        day
    }
}

/// Seconds from the start of the year to the instant a rule fires.
#[must_use]
pub fn resolve_rule_to_seconds(rule: DstRule, year_offset: u8) -> u32 {
    let day = rule.day_in_year(year_offset);
    seconds_into_year(day, rule.month as u8, year_offset)
        .saturating_add(u32::from(rule.hour).saturating_mul(SECONDS_PER_HOUR))
}

/// Start and end rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DstRuleSet {
    pub start: DstRule,
    pub end: DstRule,
}

impl DstRuleSet {
    /// United States: 2nd Sunday of March 02:00 to 1st Sunday of November 02:00.
    pub const US: Self = Self {
        start: DstRule {
            hour: 2,
            weekday: Weekday::Sunday,
            nth: 2,
            month: Month::March,
        },
        end: DstRule {
            hour: 2,
            weekday: Weekday::Sunday,
            nth: 1,
            month: Month::November,
        },
    };

    /// Last Sunday of March 01:00 to last Sunday of October 01:00 (European changeover in a UTC+0
    /// zone).
    pub const EU: Self = Self {
        start: DstRule {
            hour: 1,
            weekday: Weekday::Sunday,
            nth: LAST,
            month: Month::March,
        },
        end: DstRule {
            hour: 1,
            weekday: Weekday::Sunday,
            nth: LAST,
            month: Month::October,
        },
    };

    /// Build a rule set from the flat 8-byte form
    /// `[start hour, start weekday, start nth, start month, end hour, end weekday, end nth, end month]`.
    #[must_use]
    pub fn from_packed(packed: [u8; 8]) -> Option<Self> {
        let [sh, sw, sn, sm, eh, ew, en, em] = packed;
        Some(Self {
            start: DstRule::from_packed([sh, sw, sn, sm])?,
            end: DstRule::from_packed([eh, ew, en, em])?,
        })
    }

    /// Whether DST is in effect at `now_seconds` into the year.
    ///
    /// The window is `[start, end)`. A start after the end (southern hemisphere) wraps around the
    /// new year. A start equal to the end never puts DST in effect.
    #[must_use]
    pub fn in_effect(&self, now_seconds: u32, year_offset: u8) -> bool {
        let start = resolve_rule_to_seconds(self.start, year_offset);
        let end = resolve_rule_to_seconds(self.end, year_offset);
        if start <= end {
            (start..end).contains(&now_seconds)
        } else {
            now_seconds >= start || now_seconds < end
        }
    }
}

/// What the engine did on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DstAction {
    None,
    /// Clock moved forward one hour; DST is now on.
    SprangForward,
    /// Clock moved back one hour; DST is now off.
    FellBack,
}

/// The auto-DST engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoDst {
    rules: DstRuleSet,
    is_dst: bool,
    /// Latest calendar date touched by the last shift. Cleared once the clock reaches a later date.
    changed_on: Option<CalendarDate>,
}

impl AutoDst {
    #[must_use]
    pub const fn new(rules: DstRuleSet, is_dst: bool) -> Self {
        Self {
            rules,
            is_dst,
            changed_on: None,
        }
    }

    /// Create the engine with the DST flag persisted in storage.
    ///
    /// A stored flag other than 0 or 1 is treated as uninitialized: it becomes `false` and is
    /// written back.
    pub fn load<S: Storage + ?Sized>(rules: DstRuleSet, storage: &mut S) -> Self {
        let is_dst = match storage.read_byte(addr::DST) {
            0 => false,
            1 => true,
            _ => {
                storage.write_byte(addr::DST, 0);
                false
            }
        };
        info!("AutoDst: loaded, DST {}", is_dst);
        Self::new(rules, is_dst)
    }

    #[must_use]
    pub const fn is_dst(&self) -> bool {
        self.is_dst
    }

    #[must_use]
    pub const fn changed_today(&self) -> bool {
        self.changed_on.is_some()
    }

    #[must_use]
    pub const fn rules(&self) -> &DstRuleSet {
        &self.rules
    }

    /// Whether DST should be in effect at `now`, by the rules alone.
    #[must_use]
    pub fn should_be_dst(&self, now: DateTime) -> bool {
        let now_seconds = seconds_into_year(now.date.day, now.date.month, now.date.year)
            .saturating_add(now.time.seconds_since_midnight());
        self.rules.in_effect(now_seconds, now.date.year)
    }

    /// Run one evaluation at `now`.
    ///
    /// On a transition, writes the shifted time to `rtc` and persists the new flag (only if it
    /// differs from storage). Nothing else ever writes the clock, and at most one shift happens
    /// per calendar day.
    ///
    /// # Errors
    ///
    /// Returns an error if the shifted time falls outside 2000–2099 or the clock write fails. The
    /// engine state is left untouched in that case, so the next tick retries.
    pub fn update<R, S>(&mut self, now: DateTime, rtc: &mut R, storage: &mut S) -> Result<DstAction>
    where
        R: RealTimeClock + ?Sized,
        S: Storage + ?Sized,
    {
        if let Some(changed_on) = self.changed_on {
            // A fall-back shift can move the date backwards; only a later date ends the latch.
            if date_order(now.date) <= date_order(changed_on) {
                return Ok(DstAction::None);
            }
            self.changed_on = None;
        }

        let should_be_dst = self.should_be_dst(now);
        if should_be_dst == self.is_dst {
            return Ok(DstAction::None);
        }

        let (shifted, action) = if should_be_dst {
            (now.plus_one_hour(), DstAction::SprangForward)
        } else {
            (now.minus_one_hour(), DstAction::FellBack)
        };
        let shifted = shifted.ok_or(Error::InvalidDateTime)?;
        rtc.write_time(shifted)?;

        self.is_dst = should_be_dst;
        self.changed_on = Some(if date_order(shifted.date) > date_order(now.date) {
            shifted.date
        } else {
            now.date
        });
        storage.update_byte(addr::DST, u8::from(should_be_dst));
        info!("AutoDst: DST now {}", should_be_dst);
        Ok(action)
    }
}

/// Sort key for dates: year, then month, then day.
const fn date_order(date: CalendarDate) -> (u8, u8, u8) {
    (date.year, date.month, date.day)
}

#[cfg(test)]
mod tests {
    use time::{Month, Weekday};

    use super::{DstRule, DstRuleSet, LAST};

    #[test]
    fn packed_round_trip_and_validation() {
        let packed = [2, 0, 2, 3, 2, 0, 1, 11];
        let rules = DstRuleSet::from_packed(packed).expect("valid rules");
        assert_eq!(rules, DstRuleSet::US);
        assert_eq!(rules.start.to_packed(), [2, 0, 2, 3]);

        assert_eq!(DstRule::from_packed([24, 0, 1, 3]), None);
        assert_eq!(DstRule::from_packed([2, 7, 1, 3]), None);
        assert_eq!(DstRule::from_packed([2, 0, 0, 3]), None);
        assert_eq!(DstRule::from_packed([2, 0, 6, 3]), None);
        assert_eq!(DstRule::from_packed([2, 0, 1, 13]), None);
        assert_eq!(DstRule::from_packed([2, 0, 1, 0]), None);
    }

    #[test]
    fn fifth_occurrence_falls_back_to_last() {
        let last_sunday_march = DstRule {
            hour: 1,
            weekday: Weekday::Sunday,
            nth: LAST,
            month: Month::March,
        };
        // March 2024 has five Sundays (3, 10, 17, 24, 31); March 2025 only four (2 .. 30).
        assert_eq!(last_sunday_march.day_in_year(24), 31);
        assert_eq!(last_sunday_march.day_in_year(25), 30);
    }

    #[test]
    fn first_occurrence_when_month_starts_after_target() {
        // March 1st 2021 was a Monday, so the first Sunday is the 7th and the second the 14th.
        let second_sunday = DstRuleSet::US.start;
        assert_eq!(second_sunday.day_in_year(21), 14);
        // November 1st 2026 is a Sunday.
        assert_eq!(DstRuleSet::US.end.day_in_year(26), 1);
    }

    #[test]
    fn equal_start_and_end_is_never_dst() {
        let rules = DstRuleSet {
            start: DstRuleSet::US.start,
            end: DstRuleSet::US.start,
        };
        for seconds in (0..366 * 86_400).step_by(3_600) {
            assert!(!rules.in_effect(seconds, 24));
        }
    }

    #[test]
    fn southern_hemisphere_window_wraps_new_year() {
        // Start 1st Sunday of October, end 1st Sunday of April.
        let rules = DstRuleSet::from_packed([2, 0, 1, 10, 3, 0, 1, 4]).expect("valid rules");
        assert!(rules.in_effect(0, 25)); // January 1st
        assert!(!rules.in_effect(200 * 86_400, 25)); // mid July
        assert!(rules.in_effect(360 * 86_400, 25)); // late December
    }
}
