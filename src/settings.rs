//! User settings persisted in [`Storage`].
//!
//! Loading never fails. A store without the init marker (fresh or erased) gets every default
//! written; otherwise each out-of-range field falls back to its default and that one field is
//! rewritten. The dim rules and the DST flag belong to their engines and are loaded there.

use crate::animation::{AlarmStatus, DisplayPrefs, Region, ScoreMode, TimeFormat};
use crate::constants::{MAX_BRIGHTNESS, MAX_SNOOZE_MINUTES};
use crate::storage::{INIT_MARKER, Storage, addr};

/// Highest alarm volume setting (0 = low, 1 = high).
pub const MAX_VOLUME: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    pub alarm_hour: u8,
    pub alarm_minute: u8,
    /// Backlight level used when auto-dim is off.
    pub brightness: u8,
    pub volume: u8,
    pub region: Region,
    pub time_format: TimeFormat,
    pub snooze_minutes: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Settings {
    pub const DEFAULT: Self = Self {
        alarm_hour: 8,
        alarm_minute: 0,
        brightness: MAX_BRIGHTNESS / 2,
        volume: MAX_VOLUME,
        region: Region::Us,
        time_format: TimeFormat::TwelveHour,
        snooze_minutes: MAX_SNOOZE_MINUTES,
    };

    /// Load settings, repairing the store as needed.
    pub fn load<S: Storage + ?Sized>(storage: &mut S) -> Self {
        if storage.read_byte(addr::INIT) != INIT_MARKER {
            info!("Settings: store uninitialized, writing defaults");
            Self::DEFAULT.save(storage);
            storage.write_byte(addr::INIT, INIT_MARKER);
            return Self::DEFAULT;
        }

        let defaults = Self::DEFAULT;
        let settings = Self {
            alarm_hour: load_byte(storage, addr::ALARM_HOUR, defaults.alarm_hour, |v| v < 24),
            alarm_minute: load_byte(storage, addr::ALARM_MINUTE, defaults.alarm_minute, |v| {
                v < 60
            }),
            brightness: load_byte(storage, addr::BRIGHTNESS, defaults.brightness, |v| {
                v <= MAX_BRIGHTNESS
            }),
            volume: load_byte(storage, addr::VOLUME, defaults.volume, |v| v <= MAX_VOLUME),
            region: load_enum(storage, addr::REGION, defaults.region, Region::from_u8),
            time_format: load_enum(
                storage,
                addr::TIME_FORMAT,
                defaults.time_format,
                TimeFormat::from_u8,
            ),
            snooze_minutes: load_byte(storage, addr::SNOOZE, defaults.snooze_minutes, |v| {
                (1..=MAX_SNOOZE_MINUTES).contains(&v)
            }),
        };
        info!("Settings: loaded");
        settings
    }

    /// Persist every field, writing only cells whose value changed. Returns the number of writes.
    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> usize {
        [
            (addr::ALARM_HOUR, self.alarm_hour),
            (addr::ALARM_MINUTE, self.alarm_minute),
            (addr::BRIGHTNESS, self.brightness),
            (addr::VOLUME, self.volume),
            (addr::REGION, self.region as u8),
            (addr::TIME_FORMAT, self.time_format as u8),
            (addr::SNOOZE, self.snooze_minutes),
        ]
        .into_iter()
        .filter(|&(address, value)| storage.update_byte(address, value))
        .count()
    }

    #[must_use]
    pub const fn alarm_status(&self, armed: bool) -> AlarmStatus {
        AlarmStatus {
            armed,
            hour: self.alarm_hour,
            minute: self.alarm_minute,
        }
    }

    #[must_use]
    pub const fn display_prefs(&self, score_mode: ScoreMode) -> DisplayPrefs {
        DisplayPrefs {
            time_format: self.time_format,
            region: self.region,
            score_mode,
        }
    }
}

fn load_byte<S: Storage + ?Sized>(
    storage: &mut S,
    address: u16,
    default: u8,
    is_valid: impl Fn(u8) -> bool,
) -> u8 {
    let value = storage.read_byte(address);
    if is_valid(value) {
        return value;
    }
    warn!("Settings: repairing cell {}", address);
    storage.write_byte(address, default);
    default
}

fn load_enum<S: Storage + ?Sized, T: Copy + Into<u8>>(
    storage: &mut S,
    address: u16,
    default: T,
    decode: impl Fn(u8) -> Option<T>,
) -> T {
    let value = storage.read_byte(address);
    decode(value).unwrap_or_else(|| {
        warn!("Settings: repairing cell {}", address);
        storage.write_byte(address, default.into());
        default
    })
}
