//! Boot sequence and the per-tick main loop body.
//!
//! [`ClockCore`] owns the engines and the collaborators they write to (real-time clock, settings
//! store, backlight). Board code calls [`ClockCore::tick`] every [`crate::constants::ANIM_TICK`]
//! with one [`TimeSnapshot`] and forwards debounced buttons to [`ClockCore::press`].
//!
//! ```ignore
//! let mut core = ClockCore::boot(ClockConfig::default(), rtc, storage, &BACKLIGHT)?;
//! loop {
//!     let snapshot = TIME.snapshot();
//!     core.tick(&snapshot, Instant::now(), &mut display)?;
//!     Timer::after(ANIM_TICK).await;
//! }
//! ```

use embassy_time::Instant;

use crate::Result;
use crate::animation::{Animation, AnimationInputs, ScoreMode};
use crate::auto_dim::AutoDim;
use crate::auto_dst::{AutoDst, DstAction, DstRuleSet};
use crate::backlight::Backlight;
use crate::clock_time::DateTime;
use crate::constants::INACTIVITY_TIMEOUT;
use crate::dim_menu::{ButtonEvent, DimMenu};
use crate::display::Display;
use crate::prng::{Prng, SeedInputs};
use crate::rtc::RealTimeClock;
use crate::settings::Settings;
use crate::shared_time::{SharedTime, TimeSnapshot};
use crate::storage::Storage;

/// Which optional engines run. `None` switches an engine off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockConfig {
    /// Auto-dim, with the rules used when storage holds none.
    pub auto_dim: Option<AutoDim>,
    /// Auto-DST, with its transition rules.
    pub auto_dst: Option<DstRuleSet>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            auto_dim: Some(AutoDim::default()),
            auto_dst: Some(DstRuleSet::US),
        }
    }
}

impl ClockConfig {
    /// Neither auto-dim nor auto-DST.
    pub const PLAIN: Self = Self {
        auto_dim: None,
        auto_dst: None,
    };
}

/// What a tick did besides drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Level written to the backlight this tick, if any.
    pub brightness: Option<u8>,
    pub dst: DstAction,
}

pub struct ClockCore<R, S, B> {
    rtc: R,
    storage: S,
    backlight: B,
    settings: Settings,
    animation: Animation,
    auto_dim: Option<AutoDim>,
    auto_dst: Option<AutoDst>,
    menu: DimMenu,
    score_mode: ScoreMode,
    alarm_armed: bool,
    inverted: bool,
    first_tick: bool,
}

impl<R, S, B> ClockCore<R, S, B>
where
    R: RealTimeClock,
    S: Storage,
    B: Backlight,
{
    /// Load settings and engine state from `storage`, read the clock once, seed the generator and
    /// set the initial backlight level.
    ///
    /// # Errors
    ///
    /// Returns an error if the real-time clock cannot be read.
    pub fn boot(config: ClockConfig, mut rtc: R, mut storage: S, mut backlight: B) -> Result<Self> {
        let now = rtc.read_time()?;
        let settings = Settings::load(&mut storage);
        let auto_dim = config
            .auto_dim
            .map(|defaults| AutoDim::load(&mut storage, &defaults));
        let auto_dst = config
            .auto_dst
            .map(|rules| AutoDst::load(rules, &mut storage));

        match &auto_dim {
            Some(auto_dim) => {
                auto_dim.apply(now.time.minutes_since_midnight(), &mut backlight);
            }
            None => backlight.set_level(settings.brightness),
        }

        let mut prng = Prng::new(&seed_inputs(&settings, now));
        let score_mode = ScoreMode::Time;
        let animation = Animation::new(
            &AnimationInputs {
                now,
                alarm: settings.alarm_status(false),
                prefs: settings.display_prefs(score_mode),
            },
            &mut prng,
        );
        info!("ClockCore: booted");

        Ok(Self {
            rtc,
            storage,
            backlight,
            settings,
            animation,
            auto_dim,
            auto_dst,
            menu: DimMenu::new(INACTIVITY_TIMEOUT),
            score_mode,
            alarm_armed: false,
            inverted: false,
            first_tick: true,
        })
    }

    /// Read the real-time clock and publish the reading for the next tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the real-time clock cannot be read.
    pub fn sync_time(&mut self, shared: &SharedTime) -> Result<()> {
        shared.publish(self.rtc.read_time()?);
        Ok(())
    }

    /// Run one tick: menu timeout, auto-dim (when the minute changed), auto-DST, then the
    /// animation step and draw (or the menu draw while the menu is open).
    ///
    /// A failed clock write during a DST transition is logged and retried on the next tick.
    ///
    /// # Errors
    ///
    /// Returns the display's error if a draw fails.
    pub fn tick<D: Display + ?Sized>(
        &mut self,
        snapshot: &TimeSnapshot,
        instant: Instant,
        display: &mut D,
    ) -> core::result::Result<TickReport, D::Error> {
        let mut now = snapshot.now;

        if self.menu.poll_timeout(instant) {
            self.animation.invalidate();
        }

        let minutes = now.time.minutes_since_midnight();
        let brightness = if snapshot.minute_changed || self.first_tick {
            self.auto_dim
                .as_ref()
                .map(|auto_dim| auto_dim.apply(minutes, &mut self.backlight))
        } else {
            None
        };
        self.first_tick = false;

        let dst = self.run_auto_dst(now);
        now = match dst {
            DstAction::SprangForward => now.plus_one_hour().unwrap_or(now),
            DstAction::FellBack => now.minus_one_hour().unwrap_or(now),
            DstAction::None => now,
        };

        let inputs = AnimationInputs {
            now,
            alarm: self.settings.alarm_status(self.alarm_armed),
            prefs: self.settings.display_prefs(self.score_mode),
        };
        self.animation.step(&inputs);
        if self.menu.is_open() {
            self.menu.draw(display, self.inverted)?;
        } else {
            self.animation.draw(display, self.inverted)?;
        }
        Ok(TickReport { brightness, dst })
    }

    /// Handle one debounced button press.
    ///
    /// `Menu` opens the dim editor (when auto-dim is on) and every button goes to it while it is
    /// open. Otherwise `Set` cycles the popup through the score modes and `Plus` dismisses it.
    pub fn press(&mut self, event: ButtonEvent, instant: Instant, now: DateTime) {
        let routed_to_menu = self.menu.is_open() || event == ButtonEvent::Menu;
        if routed_to_menu {
            if let Some(auto_dim) = self.auto_dim.as_mut() {
                let was_open = self.menu.is_open();
                self.menu.handle(
                    event,
                    instant,
                    now.time.minutes_since_midnight(),
                    auto_dim,
                    &mut self.storage,
                    &mut self.backlight,
                );
                if was_open && !self.menu.is_open() {
                    self.animation.invalidate();
                }
            }
            return;
        }
        self.score_mode = match event {
            ButtonEvent::Set => self.score_mode.next(),
            ButtonEvent::Plus | ButtonEvent::Menu => ScoreMode::Time,
        };
    }

    /// Follow the alarm switch.
    pub const fn set_alarm_armed(&mut self, armed: bool) {
        self.alarm_armed = armed;
    }

    /// White-on-black when `true`. Takes effect with a full repaint on the next tick.
    pub const fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub const fn set_score_mode(&mut self, score_mode: ScoreMode) {
        self.score_mode = score_mode;
    }

    #[must_use]
    pub const fn score_mode(&self) -> ScoreMode {
        self.score_mode
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    #[must_use]
    pub const fn auto_dim(&self) -> Option<&AutoDim> {
        self.auto_dim.as_ref()
    }

    #[must_use]
    pub const fn auto_dst(&self) -> Option<&AutoDst> {
        self.auto_dst.as_ref()
    }

    #[must_use]
    pub const fn menu(&self) -> &DimMenu {
        &self.menu
    }

    pub const fn rtc(&mut self) -> &mut R {
        &mut self.rtc
    }

    pub const fn storage(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_parts(self) -> (R, S, B) {
        (self.rtc, self.storage, self.backlight)
    }

    fn run_auto_dst(&mut self, now: DateTime) -> DstAction {
        let Some(auto_dst) = self.auto_dst.as_mut() else {
            return DstAction::None;
        };
        match auto_dst.update(now, &mut self.rtc, &mut self.storage) {
            Ok(action) => action,
            Err(err) => {
                warn!("ClockCore: DST adjustment failed: {}", err);
                DstAction::None
            }
        }
    }
}

fn seed_inputs(settings: &Settings, now: DateTime) -> SeedInputs {
    SeedInputs {
        alarm_hour: settings.alarm_hour,
        alarm_minute: settings.alarm_minute,
        hour: now.time.hour,
        minute: now.time.minute,
        second: now.time.second,
        day: now.date.day,
        month: now.date.month,
        year: now.date.year,
    }
}
