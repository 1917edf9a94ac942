//! Calendar arithmetic for the 2000–2099 range of a two-digit RTC year.
//!
//! Everything here is a pure function. Weekday indexes run from 0 (Sunday) to 6 (Saturday).

use time::Weekday;

use crate::constants::SECONDS_PER_DAY;

/// Three-letter weekday names, indexed by [`day_of_week`].
pub const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Three-letter month names, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Cumulative days before the first of each month in a common year.
const DAYS_BEFORE_MONTH: [u16; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Day of the week for a date, 0 = Sunday.
///
/// Zeller-like congruence: January and February count as months 13 and 14 of the previous year.
#[must_use]
#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "Inputs are bounded (month <= 14, year <= 2099), nothing can overflow a u16."
)]
pub const fn day_of_week(month: u8, day: u8, year_offset: u8) -> u8 {
    let mut month = month as u16;
    let mut year = 2000 + year_offset as u16;
    if month < 3 {
        month += 12;
        year -= 1;
    }
    let sum = day as u16
        + 2 * month
        + 6 * (month + 1) / 10
        + year
        + year / 4
        - year / 100
        + year / 400
        + 1;
    (sum % 7) as u8
}

/// Day of the week for a date as a [`Weekday`].
#[must_use]
pub fn weekday(month: u8, day: u8, year_offset: u8) -> Weekday {
    Weekday::Sunday.nth_next(day_of_week(month, day, year_offset))
}

/// Gregorian leap-year rule for a year offset from 2000.
#[must_use]
#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "2000 + 255 fits in a u16 and the divisors are non-zero constants."
)]
pub const fn is_leap_year(year_offset: u8) -> bool {
    let year = 2000 + year_offset as u16;
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1–12); 0 for an invalid month.
#[must_use]
pub fn days_in_month(month: u8, year_offset: u8) -> u8 {
    match DAYS_IN_MONTH.get(usize::from(month).wrapping_sub(1)) {
        Some(&days) if month == 2 && is_leap_year(year_offset) => days.saturating_add(1),
        Some(&days) => days,
        None => 0,
    }
}

/// Seconds from January 1st 00:00:00 to midnight at the start of the given date.
///
/// One extra day is counted for dates after February in a leap year.
#[must_use]
#[expect(
    clippy::arithmetic_side_effects,
    reason = "At most 365 days of seconds, far below u32::MAX."
)]
pub fn seconds_into_year(day: u8, month: u8, year_offset: u8) -> u32 {
    let days_before = DAYS_BEFORE_MONTH
        .get(usize::from(month).wrapping_sub(1))
        .copied()
        .unwrap_or(0);
    let leap_day = u32::from(month > 2 && is_leap_year(year_offset));
    let days = u32::from(days_before) + leap_day + u32::from(day.saturating_sub(1));
    days * SECONDS_PER_DAY
}

/// Three-letter name of a weekday index, `"???"` when out of range.
#[must_use]
pub fn day_name(day_of_week: u8) -> &'static str {
    DAY_NAMES.get(usize::from(day_of_week)).copied().unwrap_or("???")
}

/// Three-letter name of a month (1–12), `"???"` when out of range.
#[must_use]
pub fn month_name(month: u8) -> &'static str {
    MONTH_NAMES
        .get(usize::from(month).wrapping_sub(1))
        .copied()
        .unwrap_or("???")
}
