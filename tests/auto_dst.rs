// Auto-DST rule resolution and transition handling against a fake real-time clock.
#![cfg(test)]

use glcd_clock::auto_dst::{AutoDst, DstAction, DstRuleSet, resolve_rule_to_seconds};
use glcd_clock::rtc::RealTimeClock;
use glcd_clock::storage::{RamStorage, Storage, addr};
use glcd_clock::{CalendarDate, ClockTime, DateTime, Error, Result};

const TWO_AM: u32 = 2 * 3_600;

#[derive(Default)]
struct FakeRtc {
    writes: Vec<DateTime>,
    fail: bool,
}

impl RealTimeClock for FakeRtc {
    fn read_time(&mut self) -> Result<DateTime> {
        self.writes.last().copied().ok_or(Error::InvalidRtcData)
    }

    fn write_time(&mut self, date_time: DateTime) -> Result<()> {
        if self.fail {
            return Err(Error::Bus(embedded_hal::i2c::ErrorKind::Bus));
        }
        self.writes.push(date_time);
        Ok(())
    }
}

fn at(year: u8, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> DateTime {
    DateTime::new(
        CalendarDate::new(day, month, year).expect("valid date"),
        ClockTime::new(hour, minute, second).expect("valid time"),
    )
}

#[test]
fn us_rules_resolve_in_leap_and_common_years() {
    let us = DstRuleSet::US;
    // 2000 (leap): March 12th and November 5th.
    assert_eq!(resolve_rule_to_seconds(us.start, 0), 6_134_400 + TWO_AM);
    assert_eq!(resolve_rule_to_seconds(us.end, 0), 26_697_600 + TWO_AM);
    // 2024 (leap): March 10th and November 3rd.
    assert_eq!(resolve_rule_to_seconds(us.start, 24), 5_961_600 + TWO_AM);
    assert_eq!(resolve_rule_to_seconds(us.end, 24), 26_524_800 + TWO_AM);
    // 2025: March 9th and November 2nd.
    assert_eq!(resolve_rule_to_seconds(us.start, 25), 5_788_800 + TWO_AM);
    assert_eq!(resolve_rule_to_seconds(us.end, 25), 26_352_000 + TWO_AM);
}

#[test]
fn last_sunday_rules() {
    let eu = DstRuleSet::EU;
    // 2024: March 31st and October 27th, 01:00.
    assert_eq!(resolve_rule_to_seconds(eu.start, 24), 7_776_000 + 3_600);
    assert_eq!(resolve_rule_to_seconds(eu.end, 24), 25_920_000 + 3_600);
}

#[test]
fn spring_forward_once() {
    let mut rtc = FakeRtc::default();
    let mut storage = RamStorage::<16>::new();
    let mut dst = AutoDst::load(DstRuleSet::US, &mut storage);
    assert!(!dst.is_dst());
    assert_eq!(storage.read_byte(addr::DST), 0);

    let before = at(24, 3, 10, 1, 59, 59);
    assert_eq!(dst.update(before, &mut rtc, &mut storage), Ok(DstAction::None));
    assert!(rtc.writes.is_empty());

    let start = at(24, 3, 10, 2, 0, 0);
    assert_eq!(dst.update(start, &mut rtc, &mut storage), Ok(DstAction::SprangForward));
    assert_eq!(rtc.writes, vec![at(24, 3, 10, 3, 0, 0)]);
    assert!(dst.is_dst());
    assert!(dst.changed_today());
    assert_eq!(storage.read_byte(addr::DST), 1);

    for minute in 0..60 {
        let after = at(24, 3, 10, 3, minute, 0);
        assert_eq!(dst.update(after, &mut rtc, &mut storage), Ok(DstAction::None));
    }
    assert_eq!(rtc.writes.len(), 1);
}

#[test]
fn fall_back_does_not_repeat_the_replayed_hour() {
    let mut rtc = FakeRtc::default();
    let mut storage = RamStorage::<16>::new();
    storage.write_byte(addr::DST, 1);
    let mut dst = AutoDst::load(DstRuleSet::US, &mut storage);
    assert!(dst.is_dst());

    let before = at(24, 11, 3, 1, 59, 59);
    assert_eq!(dst.update(before, &mut rtc, &mut storage), Ok(DstAction::None));

    let end = at(24, 11, 3, 2, 0, 0);
    assert_eq!(dst.update(end, &mut rtc, &mut storage), Ok(DstAction::FellBack));
    assert_eq!(rtc.writes, vec![at(24, 11, 3, 1, 0, 0)]);
    assert!(!dst.is_dst());
    assert_eq!(storage.read_byte(addr::DST), 0);

    // The hour 01:00-02:00 plays again and looks like DST by the rules alone.
    let replayed = at(24, 11, 3, 1, 30, 0);
    assert!(dst.should_be_dst(replayed));
    assert_eq!(dst.update(replayed, &mut rtc, &mut storage), Ok(DstAction::None));
    assert_eq!(dst.update(end, &mut rtc, &mut storage), Ok(DstAction::None));
    assert_eq!(rtc.writes.len(), 1);

    // The latch clears on the next date.
    let next_day = at(24, 11, 4, 0, 0, 0);
    assert_eq!(dst.update(next_day, &mut rtc, &mut storage), Ok(DstAction::None));
    assert!(!dst.changed_today());
}

#[test]
fn catches_up_after_power_off_across_transition() {
    let mut rtc = FakeRtc::default();
    let mut storage = RamStorage::<16>::new();
    let mut dst = AutoDst::new(DstRuleSet::US, false);

    // Booted in July with the flag still off: shift once, carrying into the next day.
    let late = at(25, 7, 4, 23, 30, 0);
    assert_eq!(dst.update(late, &mut rtc, &mut storage), Ok(DstAction::SprangForward));
    assert_eq!(rtc.writes, vec![at(25, 7, 5, 0, 30, 0)]);
}

#[test]
fn failed_clock_write_is_retried() {
    let mut rtc = FakeRtc {
        fail: true,
        ..FakeRtc::default()
    };
    let mut storage = RamStorage::<16>::new();
    let mut dst = AutoDst::new(DstRuleSet::US, false);
    let start = at(25, 3, 9, 2, 0, 0);

    assert!(dst.update(start, &mut rtc, &mut storage).is_err());
    assert!(!dst.is_dst());
    assert!(!dst.changed_today());
    assert_eq!(storage.writes(), 0);

    rtc.fail = false;
    assert_eq!(dst.update(start, &mut rtc, &mut storage), Ok(DstAction::SprangForward));
    assert_eq!(storage.writes(), 1);
}

#[test]
fn flag_written_only_when_different() {
    let mut rtc = FakeRtc::default();
    let mut storage = RamStorage::<16>::new();
    storage.write_byte(addr::DST, 1);
    let writes = storage.writes();

    // Stored flag already says DST; engine starts out of sync and corrects to on.
    let mut dst = AutoDst::new(DstRuleSet::US, false);
    let summer = at(25, 7, 1, 12, 0, 0);
    assert_eq!(dst.update(summer, &mut rtc, &mut storage), Ok(DstAction::SprangForward));
    assert_eq!(storage.writes(), writes);
}

#[test]
fn midnight_fall_back_into_previous_day_shifts_once() {
    // Start 2nd Sunday of March 00:00, end 1st Sunday of November 00:00.
    let rules = DstRuleSet::from_packed([0, 0, 2, 3, 0, 0, 1, 11]).expect("valid rules");
    let mut rtc = FakeRtc::default();
    let mut storage = RamStorage::<16>::new();
    let mut dst = AutoDst::new(rules, true);

    let end = at(25, 11, 2, 0, 0, 0);
    assert_eq!(dst.update(end, &mut rtc, &mut storage), Ok(DstAction::FellBack));
    assert_eq!(rtc.writes, vec![at(25, 11, 1, 23, 0, 0)]);

    // The replayed hour sits on the previous date and looks like DST by the rules alone.
    let replayed = at(25, 11, 1, 23, 0, 0);
    assert!(dst.should_be_dst(replayed));
    for minute in 0..60 {
        let now = at(25, 11, 1, 23, minute, 0);
        assert_eq!(dst.update(now, &mut rtc, &mut storage), Ok(DstAction::None));
    }
    for hour in 0..24 {
        let now = at(25, 11, 2, hour, 0, 0);
        assert_eq!(dst.update(now, &mut rtc, &mut storage), Ok(DstAction::None));
    }
    assert!(dst.changed_today());

    let next_day = at(25, 11, 3, 0, 0, 0);
    assert_eq!(dst.update(next_day, &mut rtc, &mut storage), Ok(DstAction::None));
    assert!(!dst.changed_today());
    assert!(!dst.is_dst());
    assert_eq!(rtc.writes.len(), 1);
}

#[test]
fn late_evening_spring_forward_latches_into_next_day() {
    // Start 2nd Sunday of March 23:00, end 1st Sunday of November 23:00.
    let rules = DstRuleSet::from_packed([23, 0, 2, 3, 23, 0, 1, 11]).expect("valid rules");
    let mut rtc = FakeRtc::default();
    let mut storage = RamStorage::<16>::new();
    let mut dst = AutoDst::new(rules, false);

    let start = at(25, 3, 9, 23, 0, 0);
    assert_eq!(dst.update(start, &mut rtc, &mut storage), Ok(DstAction::SprangForward));
    assert_eq!(rtc.writes, vec![at(25, 3, 10, 0, 0, 0)]);

    // A stale reading from before the write does not shift again.
    let stale = at(25, 3, 9, 23, 0, 1);
    assert_eq!(dst.update(stale, &mut rtc, &mut storage), Ok(DstAction::None));
    let after = at(25, 3, 10, 0, 0, 1);
    assert_eq!(dst.update(after, &mut rtc, &mut storage), Ok(DstAction::None));
    assert_eq!(rtc.writes.len(), 1);
    assert!(dst.is_dst());
}
