// Calendar helpers checked against the `time` crate over the whole two-digit year range.
#![cfg(test)]
#![expect(clippy::arithmetic_side_effects, reason = "Test arithmetic on small known values.")]

use glcd_clock::calendar::{
    day_name, day_of_week, days_in_month, is_leap_year, seconds_into_year, weekday,
};
use glcd_clock::constants::SECONDS_PER_DAY;
use time::{Date, Month, Weekday};

#[test]
fn day_of_week_known_dates() {
    const Y2K: u8 = day_of_week(1, 1, 0);
    assert_eq!(Y2K, 6);
    assert_eq!(day_name(Y2K), "SAT");

    // (month, day, year offset, weekday) spanning leap days and century boundaries.
    let known = [
        (2, 29, 0, 2),   // Tue 2000-02-29
        (3, 1, 0, 3),    // Wed 2000-03-01
        (1, 1, 1, 1),    // Mon 2001-01-01
        (2, 29, 16, 1),  // Mon 2016-02-29
        (10, 18, 26, 0), // Sun 2026-10-18
        (12, 31, 99, 4), // Thu 2099-12-31
    ];
    for (month, day, year, expected) in known {
        assert_eq!(
            day_of_week(month, day, year),
            expected,
            "{month}/{day}/{year}"
        );
    }
}

#[test]
fn calendar_matches_reference_for_every_day() {
    let mut date = Date::from_calendar_date(2000, Month::January, 1).expect("valid date");
    let end = Date::from_calendar_date(2099, Month::December, 31).expect("valid date");
    loop {
        let year = u8::try_from(date.year() - 2000).expect("two-digit year");
        let month = u8::from(date.month());
        let day = date.day();

        assert_eq!(
            weekday(month, day, year),
            date.weekday(),
            "weekday of {date}"
        );
        assert_eq!(
            seconds_into_year(day, month, year),
            (u32::from(date.ordinal()) - 1) * SECONDS_PER_DAY,
            "seconds into year of {date}"
        );
        assert!(day <= days_in_month(month, year));

        if date == end {
            break;
        }
        date = date.next_day().expect("within range");
    }
}

#[test]
fn leap_years_match_reference() {
    for year in 0..=99_u8 {
        assert_eq!(
            is_leap_year(year),
            time::util::is_leap_year(2000 + i32::from(year)),
            "20{year:02}"
        );
    }
}

#[test]
fn seconds_into_year_leap_day() {
    // March 1st is one day later in a leap year.
    assert_eq!(seconds_into_year(1, 3, 24) - seconds_into_year(1, 3, 25), SECONDS_PER_DAY);
    assert_eq!(seconds_into_year(1, 1, 24), 0);
    assert_eq!(seconds_into_year(12, 3, 0), 6_134_400);
    assert_eq!(seconds_into_year(31, 12, 24), 365 * SECONDS_PER_DAY);
    assert_eq!(weekday(3, 12, 0), Weekday::Sunday);
}
