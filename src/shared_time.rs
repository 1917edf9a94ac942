//! Time fields shared between the timer interrupt and the main loop.
//!
//! The interrupt only publishes raw fields and raises change flags. The main loop takes exactly one
//! [`TimeSnapshot`] per tick, which also clears the flags, and owns all state derived from it.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::clock_time::{CalendarDate, ClockTime, DateTime};

/// One consistent reading of the shared time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeSnapshot {
    pub now: DateTime,
    /// The minute changed since the previous snapshot.
    pub minute_changed: bool,
    /// The hour changed since the previous snapshot.
    pub hour_changed: bool,
}

#[derive(Clone, Copy)]
struct Inner {
    now: DateTime,
    minute_changed: bool,
    hour_changed: bool,
}

/// Interrupt-to-main-loop time mailbox.
///
/// ```ignore
/// static TIME: SharedTime = SharedTime::new();
///
/// // timer interrupt, once per second
/// TIME.publish(rtc_reading);
///
/// // main loop, once per tick
/// let snapshot = TIME.snapshot();
/// ```
pub struct SharedTime {
    inner: Mutex<CriticalSectionRawMutex, Cell<Inner>>,
}

impl SharedTime {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(Inner {
                now: DateTime {
                    date: CalendarDate {
                        day: 1,
                        month: 1,
                        year: 0,
                    },
                    time: ClockTime {
                        hour: 0,
                        minute: 0,
                        second: 0,
                    },
                },
                minute_changed: false,
                hour_changed: false,
            })),
        }
    }

    /// Store a new reading. Change flags accumulate until the next [`Self::snapshot`].
    pub fn publish(&self, now: DateTime) {
        self.inner.lock(|cell| {
            let previous = cell.get();
            cell.set(Inner {
                now,
                minute_changed: previous.minute_changed
                    || previous.now.time.minute != now.time.minute
                    || previous.now.time.hour != now.time.hour,
                hour_changed: previous.hour_changed || previous.now.time.hour != now.time.hour,
            });
        });
    }

    /// Read the current fields and clear the change flags in one critical section.
    pub fn snapshot(&self) -> TimeSnapshot {
        self.inner.lock(|cell| {
            let inner = cell.get();
            cell.set(Inner {
                minute_changed: false,
                hour_changed: false,
                ..inner
            });
            TimeSnapshot {
                now: inner.now,
                minute_changed: inner.minute_changed,
                hour_changed: inner.hour_changed,
            }
        })
    }
}

impl Default for SharedTime {
    fn default() -> Self {
        Self::new()
    }
}
