use embassy_time::Duration;

/// Period of the animation tick. Redrawing takes time too, so making this too small makes the
/// animation hiccup.
pub const ANIM_TICK: Duration = Duration::from_millis(75);

/// How long a settings menu stays open without a button press.
pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const SECONDS_PER_HOUR: u32 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Display width in pixels.
pub const SCREEN_WIDTH: u8 = 128;
/// Display height in pixels.
pub const SCREEN_HEIGHT: u8 = 64;

/// Seconds for one revolution of the satellite (a low Earth orbit, about 93 minutes).
pub const ORBITAL_PERIOD_SECONDS: u16 = 5_580;

/// The satellite sprite advances one pixel column every this many seconds (the orbital period over
/// the screen width), so it crosses the screen once per orbit. Must stay below 60: elapsed time is
/// measured on the seconds field.
pub const SATELLITE_MOVE_SECONDS: u8 = 43;

/// Highest backlight duty-cycle level.
pub const MAX_BRIGHTNESS: u8 = 16;

/// Longest snooze, in minutes.
pub const MAX_SNOOZE_MINUTES: u8 = 10;
