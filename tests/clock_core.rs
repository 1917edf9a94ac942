// End-to-end ticks through `ClockCore` with fake collaborators.
#![cfg(test)]

use core::convert::Infallible;

use embassy_time::Instant;
use glcd_clock::auto_dst::DstAction;
use glcd_clock::backlight::SharedBacklight;
use glcd_clock::dim_menu::{ButtonEvent, DimMenuState};
use glcd_clock::display::{Display, Rect, layout};
use glcd_clock::rtc::RealTimeClock;
use glcd_clock::settings::Settings;
use glcd_clock::shared_time::{SharedTime, TimeSnapshot};
use glcd_clock::storage::{RamStorage, Storage, addr};
use glcd_clock::{CalendarDate, ClockConfig, ClockCore, ClockTime, DateTime, Result, ScoreMode};

struct FakeRtc {
    now: DateTime,
    writes: Vec<DateTime>,
}

impl FakeRtc {
    fn at(now: DateTime) -> Self {
        Self {
            now,
            writes: Vec::new(),
        }
    }
}

impl RealTimeClock for FakeRtc {
    fn read_time(&mut self) -> Result<DateTime> {
        Ok(self.now)
    }

    fn write_time(&mut self, date_time: DateTime) -> Result<()> {
        self.now = date_time;
        self.writes.push(date_time);
        Ok(())
    }
}

/// Keeps full-screen fills and text only.
#[derive(Default)]
struct Recorder {
    screen_fills: usize,
    texts: Vec<String>,
}

impl Recorder {
    fn clear(&mut self) {
        self.screen_fills = 0;
        self.texts.clear();
    }
}

impl Display for Recorder {
    type Error = Infallible;

    fn fill_rectangle(&mut self, area: Rect, _on: bool) -> core::result::Result<(), Infallible> {
        if area == layout::SCREEN {
            self.screen_fills += 1;
        }
        Ok(())
    }

    fn set_cursor(&mut self, _x: u8, _y: u8) {}

    fn write_str(&mut self, text: &str, _inverted: bool) -> core::result::Result<(), Infallible> {
        self.texts.push(text.to_owned());
        Ok(())
    }

    fn write_char(&mut self, _ch: char, _inverted: bool) -> core::result::Result<(), Infallible> {
        Ok(())
    }

    fn draw_rectangle_outline(
        &mut self,
        _area: Rect,
        _on: bool,
    ) -> core::result::Result<(), Infallible> {
        Ok(())
    }
}

fn at(year: u8, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> DateTime {
    DateTime::new(
        CalendarDate::new(day, month, year).expect("valid date"),
        ClockTime::new(hour, minute, second).expect("valid time"),
    )
}

fn snapshot(now: DateTime, minute_changed: bool) -> TimeSnapshot {
    TimeSnapshot {
        now,
        minute_changed,
        hour_changed: false,
    }
}

type Core<'a> = ClockCore<FakeRtc, RamStorage<16>, &'a SharedBacklight>;

fn boot(config: ClockConfig, now: DateTime, backlight: &SharedBacklight) -> Core<'_> {
    ClockCore::boot(config, FakeRtc::at(now), RamStorage::new(), backlight).expect("boot")
}

#[test]
fn boot_initializes_store_and_backlight() {
    let backlight = SharedBacklight::new(0);
    let mut core = boot(ClockConfig::default(), at(26, 10, 18, 23, 30, 0), &backlight);

    assert_eq!(*core.settings(), Settings::DEFAULT);
    // 23:30 is after the default night rule.
    assert_eq!(backlight.level(), 1);
    let storage = core.storage();
    assert_eq!(storage.read_word(addr::DIM_DAY_TIME), 360);
    assert_eq!(storage.read_word(addr::DIM_NIGHT_TIME), 1380);
    assert_eq!(storage.read_byte(addr::DST), 0);
}

#[test]
fn plain_config_uses_fixed_brightness() {
    let backlight = SharedBacklight::new(0);
    let now = at(26, 10, 18, 23, 30, 0);
    let mut core = boot(ClockConfig::PLAIN, now, &backlight);
    assert_eq!(backlight.level(), Settings::DEFAULT.brightness);

    let mut display = Recorder::default();
    let report = core
        .tick(&snapshot(now, true), Instant::from_secs(0), &mut display)
        .expect("infallible");
    assert_eq!(report.brightness, None);
    assert_eq!(report.dst, DstAction::None);
    assert!(core.auto_dim().is_none());
    assert!(core.auto_dst().is_none());
}

#[test]
fn auto_dim_runs_on_minute_change() {
    let backlight = SharedBacklight::new(0);
    let boot_time = at(26, 10, 18, 22, 59, 58);
    let mut core = boot(ClockConfig::default(), boot_time, &backlight);
    let mut display = Recorder::default();
    assert_eq!(backlight.level(), 10);

    let first = core
        .tick(&snapshot(boot_time, false), Instant::from_secs(0), &mut display)
        .expect("infallible");
    assert_eq!(first.brightness, Some(10));

    let same_minute = core
        .tick(&snapshot(at(26, 10, 18, 22, 59, 59), false), Instant::from_secs(1), &mut display)
        .expect("infallible");
    assert_eq!(same_minute.brightness, None);

    let night = core
        .tick(&snapshot(at(26, 10, 18, 23, 0, 0), true), Instant::from_secs(2), &mut display)
        .expect("infallible");
    assert_eq!(night.brightness, Some(1));
    assert_eq!(backlight.level(), 1);
}

#[test]
fn tick_applies_dst_transition_once() {
    let backlight = SharedBacklight::new(0);
    let mut core = boot(ClockConfig::default(), at(25, 3, 9, 1, 59, 59), &backlight);
    let mut display = Recorder::default();

    let report = core
        .tick(&snapshot(at(25, 3, 9, 2, 0, 0), true), Instant::from_secs(0), &mut display)
        .expect("infallible");
    assert_eq!(report.dst, DstAction::SprangForward);
    assert_eq!(core.rtc().writes, vec![at(25, 3, 9, 3, 0, 0)]);
    assert_eq!(core.animation().display_hour(), (3, false));
    assert_eq!(core.storage().read_byte(addr::DST), 1);

    // A stale snapshot from before the clock write does not trigger a second shift.
    let report = core
        .tick(&snapshot(at(25, 3, 9, 2, 0, 1), false), Instant::from_secs(1), &mut display)
        .expect("infallible");
    assert_eq!(report.dst, DstAction::None);
    assert_eq!(core.rtc().writes.len(), 1);
}

#[test]
fn menu_edits_and_commits_day_rule() {
    let backlight = SharedBacklight::new(0);
    let now = at(26, 10, 18, 12, 0, 0);
    let mut core = boot(ClockConfig::default(), now, &backlight);
    let mut display = Recorder::default();
    let t0 = Instant::from_secs(100);

    core.press(ButtonEvent::Menu, t0, now);
    assert_eq!(core.menu().state(), DimMenuState::DayHour);
    core.tick(&snapshot(now, false), t0, &mut display).expect("infallible");
    assert!(display.texts.iter().any(|text| text == "DAY HOUR"));
    assert!(display.texts.iter().any(|text| text == "[06]:00"));

    core.press(ButtonEvent::Plus, t0, now);
    core.press(ButtonEvent::Set, t0, now);
    core.press(ButtonEvent::Set, t0, now);
    assert_eq!(core.menu().state(), DimMenuState::DayBrightness);
    core.press(ButtonEvent::Plus, t0, now);
    core.press(ButtonEvent::Set, t0, now);

    assert_eq!(core.menu().state(), DimMenuState::NightHour);
    assert_eq!(backlight.level(), 11);
    assert_eq!(core.storage().read_word(addr::DIM_DAY_TIME), 7 * 60);
    assert_eq!(core.storage().read_byte(addr::DIM_DAY_BRIGHTNESS), 11);
    let day = core.auto_dim().expect("auto-dim on").day();
    assert_eq!((day.time_of_day, day.brightness), (420, 11));

    // Cancel; the screen is repainted on the next tick.
    core.press(ButtonEvent::Menu, t0, now);
    assert!(!core.menu().is_open());
    display.clear();
    core.tick(&snapshot(now, false), t0, &mut display).expect("infallible");
    assert_eq!(display.screen_fills, 1);
}

#[test]
fn menu_closes_after_inactivity() {
    let backlight = SharedBacklight::new(0);
    let now = at(26, 10, 18, 12, 0, 0);
    let mut core = boot(ClockConfig::default(), now, &backlight);
    let mut display = Recorder::default();

    core.press(ButtonEvent::Menu, Instant::from_secs(100), now);
    core.tick(&snapshot(now, false), Instant::from_secs(105), &mut display)
        .expect("infallible");
    assert!(core.menu().is_open());

    display.clear();
    core.tick(&snapshot(now, false), Instant::from_secs(110), &mut display)
        .expect("infallible");
    assert!(!core.menu().is_open());
    assert_eq!(display.screen_fills, 1);
    // Nothing was committed.
    assert_eq!(core.storage().read_word(addr::DIM_DAY_TIME), 360);
}

#[test]
fn set_button_cycles_popup() {
    let backlight = SharedBacklight::new(0);
    let now = at(26, 10, 18, 12, 0, 0);
    let mut core = boot(ClockConfig::default(), now, &backlight);
    let mut display = Recorder::default();

    core.press(ButtonEvent::Set, Instant::from_secs(0), now);
    assert_eq!(core.score_mode(), ScoreMode::Date);
    core.tick(&snapshot(now, false), Instant::from_secs(0), &mut display)
        .expect("infallible");
    assert!(display.texts.iter().any(|text| text == "10/18/2026"));

    core.press(ButtonEvent::Set, Instant::from_secs(1), now);
    assert_eq!(core.score_mode(), ScoreMode::Year);
    core.press(ButtonEvent::Plus, Instant::from_secs(2), now);
    assert_eq!(core.score_mode(), ScoreMode::Time);
}

#[test]
fn sync_time_publishes_clock_reading() {
    let backlight = SharedBacklight::new(0);
    let now = at(26, 10, 18, 12, 0, 0);
    let mut core = boot(ClockConfig::default(), now, &backlight);
    let shared = SharedTime::new();

    core.sync_time(&shared).expect("fake clock");
    let reading = shared.snapshot();
    assert_eq!(reading.now, now);
    assert!(reading.hour_changed);
}
