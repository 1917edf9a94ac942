//! Engines for a monochrome graphics-LCD alarm clock: the display animation controller, auto-dim,
//! auto-DST, calendar helpers and a small PRNG, plus the narrow hardware traits they drive.
#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible in every module below.
#[macro_use]
mod fmt;

pub mod animation;
pub mod auto_dim;
pub mod auto_dst;
pub mod backlight;
pub mod calendar;
pub mod clock_core;
pub mod clock_time;
pub mod constants;
pub mod dim_menu;
pub mod display;
mod error;
pub mod prng;
pub mod rtc;
pub mod settings;
pub mod shared_time;
pub mod storage;

// Re-export commonly used items
pub use animation::{Animation, AnimationInputs, ScoreMode};
pub use clock_core::{ClockConfig, ClockCore};
pub use clock_time::{CalendarDate, ClockTime, DateTime};
pub use error::{Error, Result};
