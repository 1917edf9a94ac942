//! Three-button editor for the auto-dim rules.
//!
//! `Menu` opens the editor (or cancels it when open), `Plus` bumps the field being edited and `Set`
//! moves on to the next one. Leaving a period's brightness field commits that period's rule
//! through [`AutoDim::commit`], which persists it and re-applies the backlight right away.
//!
//! The editor closes by itself when no button is pressed for [`INACTIVITY_TIMEOUT`]. The timeout
//! is a deadline checked from the tick loop, never a blocking delay.

use core::fmt::Write as _;

use embassy_time::{Duration, Instant};

use crate::animation::PopupText;
use crate::auto_dim::{AutoDim, DimPeriod, DimRule};
use crate::backlight::Backlight;
use crate::constants::{INACTIVITY_TIMEOUT, MAX_BRIGHTNESS};
use crate::display::{Display, layout};
use crate::storage::Storage;

/// Button presses, already debounced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    Menu,
    Set,
    Plus,
}

/// A deadline that is pushed out by activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityTimer {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl InactivityTimer {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Start (or restart) the countdown from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now.checked_add(self.timeout).unwrap_or(Instant::MAX));
    }

    pub const fn disarm(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Whether the deadline has passed. A disarmed timer never expires.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

impl Default for InactivityTimer {
    fn default() -> Self {
        Self::new(INACTIVITY_TIMEOUT)
    }
}

/// Which field the editor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DimMenuState {
    #[default]
    Closed,
    DayHour,
    DayMinute,
    DayBrightness,
    NightHour,
    NightMinute,
    NightBrightness,
}

impl DimMenuState {
    const fn next(self) -> Self {
        match self {
            Self::Closed | Self::NightBrightness => Self::Closed,
            Self::DayHour => Self::DayMinute,
            Self::DayMinute => Self::DayBrightness,
            Self::DayBrightness => Self::NightHour,
            Self::NightHour => Self::NightMinute,
            Self::NightMinute => Self::NightBrightness,
        }
    }

    const fn period(self) -> Option<DimPeriod> {
        match self {
            Self::Closed => None,
            Self::DayHour | Self::DayMinute | Self::DayBrightness => Some(DimPeriod::Day),
            Self::NightHour | Self::NightMinute | Self::NightBrightness => Some(DimPeriod::Night),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Closed => "",
            Self::DayHour => "DAY HOUR",
            Self::DayMinute => "DAY MINUTE",
            Self::DayBrightness => "DAY BRIGHT",
            Self::NightHour => "NIGHT HOUR",
            Self::NightMinute => "NIGHT MINUTE",
            Self::NightBrightness => "NIGHT BRIGHT",
        }
    }
}

/// The dim settings editor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimMenu {
    state: DimMenuState,
    day: DimRule,
    night: DimRule,
    timer: InactivityTimer,
    dirty: bool,
}

impl DimMenu {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timer: InactivityTimer::new(timeout),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn state(&self) -> DimMenuState {
        self.state
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.state, DimMenuState::Closed)
    }

    /// The rule being edited for `period`.
    #[must_use]
    pub const fn draft(&self, period: DimPeriod) -> DimRule {
        match period {
            DimPeriod::Day => self.day,
            DimPeriod::Night => self.night,
        }
    }

    /// Feed one button press.
    pub fn handle<S, B>(
        &mut self,
        event: ButtonEvent,
        now: Instant,
        now_minutes: u16,
        auto_dim: &mut AutoDim,
        storage: &mut S,
        backlight: &mut B,
    ) where
        S: Storage + ?Sized,
        B: Backlight + ?Sized,
    {
        self.dirty = true;
        match (self.state, event) {
            (DimMenuState::Closed, ButtonEvent::Menu) => {
                self.day = auto_dim.day();
                self.night = auto_dim.night();
                self.state = DimMenuState::DayHour;
                self.timer.arm(now);
                info!("DimMenu: open");
            }
            (DimMenuState::Closed, _) => self.dirty = false,
            (_, ButtonEvent::Menu) => self.close(),
            (state, ButtonEvent::Plus) => {
                self.bump(state);
                self.timer.arm(now);
            }
            (state, ButtonEvent::Set) => {
                if let (DimMenuState::DayBrightness | DimMenuState::NightBrightness, Some(period)) =
                    (state, state.period())
                {
                    auto_dim.commit(period, self.draft(period), storage, now_minutes, backlight);
                }
                self.state = state.next();
                if self.is_open() {
                    self.timer.arm(now);
                } else {
                    self.close();
                }
            }
        }
    }

    /// Close the editor if it has been idle too long. Returns whether it closed.
    pub fn poll_timeout(&mut self, now: Instant) -> bool {
        if !self.is_open() || !self.timer.is_expired(now) {
            return false;
        }
        info!("DimMenu: inactivity timeout");
        self.close();
        true
    }

    /// Draw the field being edited inside the popup frame, if it changed since the last draw.
    ///
    /// # Errors
    ///
    /// Returns the display's error if a write fails.
    pub fn draw<D: Display + ?Sized>(&mut self, display: &mut D, inverted: bool) -> Result<(), D::Error> {
        if !self.dirty || !self.is_open() {
            return Ok(());
        }
        display.fill_rectangle(layout::POPUP, inverted)?;
        display.draw_rectangle_outline(layout::POPUP, !inverted)?;
        display.set_cursor(layout::POPUP_TEXT_X, layout::POPUP_LABEL.y);
        display.write_str(self.state.label(), inverted)?;
        display.set_cursor(layout::POPUP_TEXT_X, layout::POPUP_VALUE.y);
        display.write_str(&self.value_text(), inverted)?;
        self.dirty = false;
        Ok(())
    }

    fn close(&mut self) {
        self.state = DimMenuState::Closed;
        self.timer.disarm();
        self.dirty = false;
        info!("DimMenu: closed");
    }

    fn value_text(&self) -> PopupText {
        let mut text = PopupText::new();
        let Some(period) = self.state.period() else {
            return text;
        };
        let rule = self.draft(period);
        let (hour, minute) = split_minutes(rule.time_of_day);
        let written = match self.state {
            DimMenuState::DayHour | DimMenuState::NightHour => write!(text, "[{hour:02}]:{minute:02}"),
            DimMenuState::DayMinute | DimMenuState::NightMinute => {
                write!(text, "{hour:02}:[{minute:02}]")
            }
            DimMenuState::DayBrightness | DimMenuState::NightBrightness => {
                write!(text, "{}", rule.brightness)
            }
            DimMenuState::Closed => Ok(()),
        };
        if written.is_err() {
            warn!("DimMenu: text truncated");
        }
        text
    }

    fn bump(&mut self, state: DimMenuState) {
        let Some(period) = state.period() else {
            return;
        };
        let rule = match period {
            DimPeriod::Day => &mut self.day,
            DimPeriod::Night => &mut self.night,
        };
        let (hour, minute) = split_minutes(rule.time_of_day);
        match state {
            DimMenuState::DayHour | DimMenuState::NightHour => {
                rule.time_of_day = join_minutes(wrap_increment(hour, 24), minute);
            }
            DimMenuState::DayMinute | DimMenuState::NightMinute => {
                rule.time_of_day = join_minutes(hour, wrap_increment(minute, 60));
            }
            DimMenuState::DayBrightness | DimMenuState::NightBrightness => {
                rule.brightness = wrap_increment(rule.brightness, MAX_BRIGHTNESS.saturating_add(1));
            }
            DimMenuState::Closed => {}
        }
    }
}

/// `value + 1`, wrapping to 0 at `limit`.
fn wrap_increment(value: u8, limit: u8) -> u8 {
    value.checked_add(1).filter(|next| *next < limit).unwrap_or(0)
}

#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    clippy::cast_possible_truncation,
    reason = "Minutes since midnight are below 1440, so both parts fit in a u8."
)]
const fn split_minutes(minutes: u16) -> (u8, u8) {
    ((minutes / 60) as u8, (minutes % 60) as u8)
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "Hour below 24 and minute below 60 stay below 1440."
)]
const fn join_minutes(hour: u8, minute: u8) -> u16 {
    hour as u16 * 60 + minute as u16
}
