//! Wall-clock time and calendar date as kept by the real-time clock.
//!
//! Years are stored as an offset from 2000 (0–99), the range a two-digit RTC year register can
//! hold. The core reads a [`DateTime`] snapshot once per tick and only writes one back when the
//! auto-DST engine shifts the clock by an hour.

use crate::calendar::days_in_month;
use crate::constants::{SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

/// Time of day, 24-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ClockTime {
    /// Create a time of day, or `None` if any field is out of range.
    #[must_use]
    pub const fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        let clock_time = Self {
            hour,
            minute,
            second,
        };
        if clock_time.is_valid() {
            Some(clock_time)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.second < 60
    }

    /// Minutes since midnight (0–1439).
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Fields are u8, so the result is at most 255 * 60 + 255."
    )]
    pub const fn minutes_since_midnight(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }

    /// Seconds since midnight.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Fields are u8, so the result stays below a million."
    )]
    pub const fn seconds_since_midnight(&self) -> u32 {
        self.hour as u32 * SECONDS_PER_HOUR
            + self.minute as u32 * SECONDS_PER_MINUTE
            + self.second as u32
    }
}

/// Calendar date with a two-digit year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarDate {
    pub day: u8,
    pub month: u8,
    /// Offset from 2000 (0–99).
    pub year: u8,
}

impl Default for CalendarDate {
    fn default() -> Self {
        Self {
            day: 1,
            month: 1,
            year: 0,
        }
    }
}

impl CalendarDate {
    /// Create a date, or `None` if the day does not exist in that month.
    #[must_use]
    pub fn new(day: u8, month: u8, year: u8) -> Option<Self> {
        let date = Self { day, month, year };
        date.is_valid().then_some(date)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && self.year <= 99
            && (1..=days_in_month(self.month, self.year)).contains(&self.day)
    }

    /// The full year, e.g. 2026.
    #[must_use]
    #[expect(clippy::arithmetic_side_effects, reason = "2000 + 255 fits in a u16.")]
    pub const fn full_year(&self) -> u16 {
        2000 + self.year as u16
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Each increment is guarded by a comparison against a smaller upper bound."
    )]
    fn next_day(self) -> Option<Self> {
        if self.day < days_in_month(self.month, self.year) {
            return Some(Self {
                day: self.day + 1,
                ..self
            });
        }
        if self.month < 12 {
            return Some(Self {
                day: 1,
                month: self.month + 1,
                ..self
            });
        }
        (self.year < 99).then(|| Self {
            day: 1,
            month: 1,
            year: self.year + 1,
        })
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Each decrement is guarded by a comparison against a lower bound."
    )]
    fn previous_day(self) -> Option<Self> {
        if self.day > 1 {
            return Some(Self {
                day: self.day - 1,
                ..self
            });
        }
        if self.month > 1 {
            let month = self.month - 1;
            return Some(Self {
                day: days_in_month(month, self.year),
                month,
                ..self
            });
        }
        (self.year > 0).then(|| Self {
            day: 31,
            month: 12,
            year: self.year - 1,
        })
    }
}

/// A date and a time of day read together from the real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub date: CalendarDate,
    pub time: ClockTime,
}

impl DateTime {
    #[must_use]
    pub const fn new(date: CalendarDate, time: ClockTime) -> Self {
        Self { date, time }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.date.is_valid() && self.time.is_valid()
    }

    /// One hour later, carrying into the next day, month or year.
    ///
    /// Returns `None` past the end of 2099.
    #[must_use]
    pub fn plus_one_hour(self) -> Option<Self> {
        if self.time.hour < 23 {
            return Some(Self {
                time: ClockTime {
                    hour: self.time.hour.wrapping_add(1),
                    ..self.time
                },
                ..self
            });
        }
        let date = self.date.next_day()?;
        Some(Self {
            date,
            time: ClockTime {
                hour: 0,
                ..self.time
            },
        })
    }

    /// One hour earlier, borrowing from the previous day, month or year.
    ///
    /// Returns `None` before the start of 2000.
    #[must_use]
    pub fn minus_one_hour(self) -> Option<Self> {
        if self.time.hour > 0 {
            return Some(Self {
                time: ClockTime {
                    hour: self.time.hour.wrapping_sub(1),
                    ..self.time
                },
                ..self
            });
        }
        let date = self.date.previous_day()?;
        Some(Self {
            date,
            time: ClockTime {
                hour: 23,
                ..self.time
            },
        })
    }
}
