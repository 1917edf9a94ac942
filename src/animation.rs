//! The display animation controller.
//!
//! Owns everything that is on screen: the world map with the satellite ground track, the time bar
//! (hours, blinking colon, minutes, AM/PM, alarm glyph) and the information popup. Once per tick
//! the caller runs [`Animation::step`], which compares the new inputs with shadow copies of what
//! was last shown and raises dirty flags, then [`Animation::draw`], which repaints only the dirty
//! regions. A full-screen repaint is slow on a parallel graphics LCD, so everything but the colon
//! is drawn only on change.
//!
//! The popup overlays the base screen:
//!
//! ```text
//! Idle --(score mode != Time)--> Showing --(score mode == Time)--> Dismissing --(draw)--> Idle
//! ```
//!
//! Where the popup and the satellite overlap, the popup wins: the satellite is not drawn under an
//! open popup and reappears on the full repaint that follows the dismissal.

use core::f32::consts::PI;
use core::fmt::Write as _;

use heapless::String;

use crate::calendar::{day_name, day_of_week, month_name};
use crate::clock_time::DateTime;
use crate::constants::{SATELLITE_MOVE_SECONDS, SCREEN_WIDTH};
use crate::display::{Display, Rect, layout, restore_background};
use crate::prng::Prng;

/// Which datum the popup shows. `Time` means no popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ScoreMode {
    #[default]
    Time = 0,
    Date = 1,
    Year = 2,
    Alarm = 3,
    Weekday = 4,
    DateLong = 5,
}

impl ScoreMode {
    /// The mode after this one when cycling through them with a button.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Time => Self::Date,
            Self::Date => Self::Year,
            Self::Year => Self::Alarm,
            Self::Alarm => Self::Weekday,
            Self::Weekday => Self::DateLong,
            Self::DateLong => Self::Time,
        }
    }
}

/// Date ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Region {
    /// Month first.
    #[default]
    Us = 0,
    /// Day first.
    Eu = 1,
}

impl Region {
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Us),
            1 => Some(Self::Eu),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TimeFormat {
    #[default]
    TwelveHour = 0,
    TwentyFourHour = 1,
}

impl TimeFormat {
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::TwelveHour),
            1 => Some(Self::TwentyFourHour),
            _ => None,
        }
    }
}

impl From<Region> for u8 {
    fn from(region: Region) -> Self {
        region as Self
    }
}

impl From<TimeFormat> for u8 {
    fn from(time_format: TimeFormat) -> Self {
        time_format as Self
    }
}

/// User display preferences, read once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayPrefs {
    pub time_format: TimeFormat,
    pub region: Region,
    pub score_mode: ScoreMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmStatus {
    pub armed: bool,
    pub hour: u8,
    pub minute: u8,
}

/// Everything [`Animation::step`] looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnimationInputs {
    pub now: DateTime,
    pub alarm: AlarmStatus,
    pub prefs: DisplayPrefs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PopupState {
    Idle,
    Showing,
    /// Requested away; the next draw erases it.
    Dismissing,
}

/// One line of popup text. Long enough for `"SAT OCT 18 2026"`.
pub type PopupText = String<16>;

#[derive(Debug, Clone, Copy, Default)]
#[expect(clippy::struct_excessive_bools, reason = "One flag per screen region.")]
struct Dirty {
    all: bool,
    time: bool,
    satellite: bool,
    popup_label: bool,
    popup_value: bool,
}

/// The animation controller.
#[derive(Debug, Clone)]
#[expect(clippy::struct_excessive_bools, reason = "Shadow state mirrors the screen.")]
pub struct Animation {
    // Derived display state.
    display_hour: u8,
    pm: bool,
    colon_on: bool,
    satellite_x: u8,
    popup: PopupState,
    popup_drawn: bool,
    popup_label: PopupText,
    popup_value: PopupText,
    // What was last observed.
    last_hour: u8,
    last_minute: u8,
    last_time_format: TimeFormat,
    last_score_mode: ScoreMode,
    last_weekday: u8,
    last_alarm_armed: bool,
    last_move_second: u8,
    last_inverted: Option<bool>,
    /// Where the satellite sprite currently sits on the glass, if anywhere.
    satellite_on_screen: Option<Rect>,
    dirty: Dirty,
}

impl Animation {
    /// Build the display state for `inputs`. The first [`Self::draw`] repaints the whole screen.
    ///
    /// The satellite starts at a random column.
    #[must_use]
    pub fn new(inputs: &AnimationInputs, prng: &mut Prng) -> Self {
        let AnimationInputs { now, alarm, prefs } = *inputs;
        let (display_hour, pm) = to_display_hour(now.time.hour, prefs.time_format);
        let satellite_x = u8::try_from(prng.next_below(u16::from(SCREEN_WIDTH))).unwrap_or(0);
        debug!("Animation: satellite starts at column {}", satellite_x);
        Self {
            display_hour,
            pm,
            colon_on: is_colon_on(now.time.second),
            satellite_x,
            popup: PopupState::Idle,
            popup_drawn: false,
            popup_label: PopupText::new(),
            popup_value: PopupText::new(),
            last_hour: now.time.hour,
            last_minute: now.time.minute,
            last_time_format: prefs.time_format,
            last_score_mode: ScoreMode::Time,
            last_weekday: day_of_week(now.date.month, now.date.day, now.date.year),
            last_alarm_armed: alarm.armed,
            last_move_second: now.time.second,
            last_inverted: None,
            satellite_on_screen: None,
            dirty: Dirty {
                all: true,
                ..Dirty::default()
            },
        }
    }

    /// Switch the datum shown in the popup.
    ///
    /// A change marks the time bar dirty, and the popup content too when a popup is up.
    pub fn set_score(&mut self, mode: ScoreMode) {
        if mode == self.last_score_mode {
            return;
        }
        debug!("Animation: score mode {}", mode as u8);
        self.last_score_mode = mode;
        self.dirty.time = true;
        if self.popup == PopupState::Showing {
            self.dirty.popup_label = true;
            self.dirty.popup_value = true;
        }
    }

    /// Advance the display state to `inputs`. Draws nothing.
    pub fn step(&mut self, inputs: &AnimationInputs) {
        let AnimationInputs { now, alarm, prefs } = *inputs;
        self.set_score(prefs.score_mode);

        if now.time.hour != self.last_hour
            || now.time.minute != self.last_minute
            || prefs.time_format != self.last_time_format
        {
            (self.display_hour, self.pm) = to_display_hour(now.time.hour, prefs.time_format);
            self.last_hour = now.time.hour;
            self.last_minute = now.time.minute;
            self.last_time_format = prefs.time_format;
            self.dirty.time = true;
        }

        let weekday = day_of_week(now.date.month, now.date.day, now.date.year);
        if weekday != self.last_weekday {
            self.last_weekday = weekday;
            debug!("Animation: weekday now {}", day_name(weekday));
        }

        if seconds_since(now.time.second, self.last_move_second) >= SATELLITE_MOVE_SECONDS {
            self.last_move_second = now.time.second;
            self.satellite_x = self
                .satellite_x
                .checked_add(1)
                .filter(|x| *x < SCREEN_WIDTH)
                .unwrap_or(0);
            self.dirty.satellite = true;
        }

        if alarm.armed != self.last_alarm_armed {
            self.last_alarm_armed = alarm.armed;
            self.dirty.time = true;
        }

        let requested = self.last_score_mode != ScoreMode::Time;
        match (self.popup, requested) {
            (PopupState::Idle | PopupState::Dismissing, true) => {
                self.popup = PopupState::Showing;
                self.popup_drawn = false;
            }
            (PopupState::Showing, false) => self.popup = PopupState::Dismissing,
            _ => {}
        }
        if self.popup == PopupState::Showing {
            self.refresh_popup_text(inputs);
        }

        self.colon_on = is_colon_on(now.time.second);
    }

    /// Repaint whatever [`Self::step`] marked dirty, then the colon.
    ///
    /// `inverted` selects white-on-black; a change of it repaints everything. Dirty flags are only
    /// cleared once their region has been written, so a failed draw is retried on the next call.
    ///
    /// # Errors
    ///
    /// Returns the display's error if a write fails.
    pub fn draw<D: Display + ?Sized>(&mut self, display: &mut D, inverted: bool) -> Result<(), D::Error> {
        if self.last_inverted != Some(inverted) {
            self.last_inverted = Some(inverted);
            self.dirty.all = true;
        }
        if self.popup == PopupState::Dismissing {
            self.popup = PopupState::Idle;
            self.popup_drawn = false;
            self.dirty.all = true;
        }
        if self.dirty.all {
            self.draw_base(display, inverted)?;
        }

        if self.popup == PopupState::Showing {
            if self.popup_drawn {
                if self.dirty.popup_label {
                    draw_popup_line(display, layout::POPUP_LABEL, &self.popup_label, inverted)?;
                    self.dirty.popup_label = false;
                }
                if self.dirty.popup_value {
                    draw_popup_line(display, layout::POPUP_VALUE, &self.popup_value, inverted)?;
                    self.dirty.popup_value = false;
                }
            } else {
                self.draw_popup(display, inverted)?;
            }
        }

        if self.dirty.satellite {
            self.draw_satellite(display, inverted)?;
        }
        if self.dirty.time {
            self.draw_time(display, inverted)?;
        }

        display.set_cursor(layout::COLON_X, layout::TIME_TEXT_Y);
        display.write_char(if self.colon_on { ':' } else { ' ' }, inverted)
    }

    /// Repaint everything on the next draw, e.g. after something else drew over the screen.
    pub const fn invalidate(&mut self) {
        self.dirty.all = true;
    }

    #[must_use]
    pub const fn popup_state(&self) -> PopupState {
        self.popup
    }

    /// The popup's label and value lines as last formatted.
    #[must_use]
    pub fn popup_text(&self) -> (&str, &str) {
        (self.popup_label.as_str(), self.popup_value.as_str())
    }

    /// Hour as shown (1–12 or 0–23) and whether it is PM.
    #[must_use]
    pub const fn display_hour(&self) -> (u8, bool) {
        (self.display_hour, self.pm)
    }

    #[must_use]
    pub const fn colon_on(&self) -> bool {
        self.colon_on
    }

    /// Day of the week last observed, 0 = Sunday.
    #[must_use]
    pub const fn weekday(&self) -> u8 {
        self.last_weekday
    }

    #[must_use]
    pub const fn satellite_x(&self) -> u8 {
        self.satellite_x
    }

    fn refresh_popup_text(&mut self, inputs: &AnimationInputs) {
        let (label, value) = format_popup(inputs);
        if label != self.popup_label {
            self.popup_label = label;
            self.dirty.popup_label = true;
        }
        if value != self.popup_value {
            self.popup_value = value;
            self.dirty.popup_value = true;
        }
    }

    fn draw_base<D: Display + ?Sized>(&mut self, display: &mut D, inverted: bool) -> Result<(), D::Error> {
        restore_background(display, layout::SCREEN, inverted)?;
        self.satellite_on_screen = None;
        self.popup_drawn = false;
        self.dirty = Dirty {
            all: false,
            time: true,
            satellite: true,
            popup_label: false,
            popup_value: false,
        };
        Ok(())
    }

    fn draw_popup<D: Display + ?Sized>(&mut self, display: &mut D, inverted: bool) -> Result<(), D::Error> {
        if let Some(sprite) = self
            .satellite_on_screen
            .filter(|sprite| sprite.intersects(layout::POPUP))
        {
            restore_background(display, sprite, inverted)?;
            self.satellite_on_screen = None;
        }
        display.fill_rectangle(layout::POPUP, inverted)?;
        display.draw_rectangle_outline(layout::POPUP, !inverted)?;
        draw_popup_line(display, layout::POPUP_LABEL, &self.popup_label, inverted)?;
        draw_popup_line(display, layout::POPUP_VALUE, &self.popup_value, inverted)?;
        self.popup_drawn = true;
        self.dirty.popup_label = false;
        self.dirty.popup_value = false;
        Ok(())
    }

    fn draw_satellite<D: Display + ?Sized>(
        &mut self,
        display: &mut D,
        inverted: bool,
    ) -> Result<(), D::Error> {
        // A sprite under the popup was already erased when the popup went up.
        if let Some(old) = self.satellite_on_screen.take() {
            restore_background(display, old, inverted)?;
        }
        let sprite = satellite_sprite(self.satellite_x);
        let covered = self.popup == PopupState::Showing && sprite.intersects(layout::POPUP);
        if !covered {
            display.fill_rectangle(sprite, !inverted)?;
            if let Some(center) = satellite_center(self.satellite_x).intersection(sprite) {
                display.fill_rectangle(center, inverted)?;
            }
            self.satellite_on_screen = Some(sprite);
        }
        self.dirty.satellite = false;
        Ok(())
    }

    fn draw_time<D: Display + ?Sized>(&mut self, display: &mut D, inverted: bool) -> Result<(), D::Error> {
        display.fill_rectangle(layout::TIME, inverted)?;

        let mut text: String<4> = String::new();
        let written = match self.last_time_format {
            TimeFormat::TwelveHour => write!(text, "{:2}", self.display_hour),
            TimeFormat::TwentyFourHour => write!(text, "{:02}", self.display_hour),
        };
        log_truncation(written);
        display.set_cursor(layout::HOUR_X, layout::TIME_TEXT_Y);
        display.write_str(&text, inverted)?;

        text.clear();
        log_truncation(write!(text, "{:02}", self.last_minute));
        display.set_cursor(layout::MINUTE_X, layout::TIME_TEXT_Y);
        display.write_str(&text, inverted)?;

        if self.last_time_format == TimeFormat::TwelveHour {
            display.set_cursor(layout::AM_PM_X, layout::TIME_TEXT_Y);
            display.write_str(if self.pm { "PM" } else { "AM" }, inverted)?;
        }
        if self.last_alarm_armed {
            display.set_cursor(layout::ALARM_GLYPH_X, layout::TIME_TEXT_Y);
            display.write_char('*', inverted)?;
        }
        self.dirty.time = false;
        Ok(())
    }
}

/// Convert a 24-hour hour to the shown hour and PM flag.
const fn to_display_hour(hour: u8, time_format: TimeFormat) -> (u8, bool) {
    let pm = hour >= 12;
    match time_format {
        TimeFormat::TwentyFourHour => (hour, pm),
        TimeFormat::TwelveHour => match hour {
            0 => (12, false),
            13..=23 => (hour.wrapping_sub(12), true),
            _ => (hour, pm),
        },
    }
}

const fn is_colon_on(second: u8) -> bool {
    second & 1 == 0
}

/// Seconds from `then` to `now`, both read from a seconds field that wraps at 60.
#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "Both inputs are below 60, so the sum stays below 120."
)]
const fn seconds_since(now: u8, then: u8) -> u8 {
    (now + 60 - then) % 60
}

/// Row of the ground track at column `x`: one sine period across the screen.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The track stays within the map rows (10..=36)."
)]
pub fn ground_track_y(x: u8) -> u8 {
    let phase = 2.0 * PI * f32::from(x) / f32::from(SCREEN_WIDTH);
    let y = f32::from(layout::TRACK_CENTER_Y) - layout::TRACK_AMPLITUDE * libm::sinf(phase);
    libm::roundf(y) as u8
}

/// Satellite sprite rectangle at column `x`, clipped to the map.
fn satellite_sprite(x: u8) -> Rect {
    let y = ground_track_y(x).saturating_sub(1);
    let sprite = Rect::new(x, y, layout::SATELLITE_SIZE, layout::SATELLITE_SIZE);
    layout::MAP.intersection(sprite).unwrap_or(sprite)
}

fn satellite_center(x: u8) -> Rect {
    Rect::new(x.saturating_add(1), ground_track_y(x), 1, 1)
}

fn draw_popup_line<D: Display + ?Sized>(
    display: &mut D,
    area: Rect,
    text: &str,
    inverted: bool,
) -> Result<(), D::Error> {
    display.fill_rectangle(area, inverted)?;
    display.set_cursor(layout::POPUP_TEXT_X, area.y);
    display.write_str(text, inverted)
}

/// Label and value lines of the popup for the current score mode.
///
/// The alarm label blinks: it is blank on odd seconds.
#[must_use]
pub fn format_popup(inputs: &AnimationInputs) -> (PopupText, PopupText) {
    let AnimationInputs { now, alarm, prefs } = *inputs;
    let date = now.date;
    let weekday = day_name(day_of_week(date.month, date.day, date.year));
    let mut label = PopupText::new();
    let mut value = PopupText::new();

    let written = match prefs.score_mode {
        ScoreMode::Time => Ok(()),
        ScoreMode::Date => {
            let (first, second) = match prefs.region {
                Region::Us => (date.month, date.day),
                Region::Eu => (date.day, date.month),
            };
            label
                .write_str("DATE")
                .and_then(|()| write!(value, "{first:02}/{second:02}/{}", date.full_year()))
        }
        ScoreMode::Year => label
            .write_str("YEAR")
            .and_then(|()| write!(value, "{}", date.full_year())),
        ScoreMode::Alarm => {
            let blink = if is_colon_on(now.time.second) { "ALARM" } else { "" };
            let (hour, pm) = to_display_hour(alarm.hour, prefs.time_format);
            label.write_str(blink).and_then(|()| match prefs.time_format {
                TimeFormat::TwelveHour => write!(
                    value,
                    "{hour:2}:{:02} {}",
                    alarm.minute,
                    if pm { "PM" } else { "AM" }
                ),
                TimeFormat::TwentyFourHour => write!(value, "{hour:02}:{:02}", alarm.minute),
            })
        }
        ScoreMode::Weekday => label.write_str("DAY").and_then(|()| value.write_str(weekday)),
        ScoreMode::DateLong => {
            let month = month_name(date.month);
            label.write_str("DATE").and_then(|()| match prefs.region {
                Region::Us => write!(value, "{weekday} {month} {:02} {}", date.day, date.full_year()),
                Region::Eu => write!(value, "{weekday} {:02} {month} {}", date.day, date.full_year()),
            })
        }
    };
    log_truncation(written);
    (label, value)
}

fn log_truncation(written: core::fmt::Result) {
    if written.is_err() {
        warn!("Animation: text truncated");
    }
}
