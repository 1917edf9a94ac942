//! Real-time clock access.
//!
//! [`RealTimeClock`] is the narrow contract the core needs: read the current date/time once per
//! tick, and write it back when the auto-DST engine shifts the clock. [`Ds1307`] implements it for
//! the DS1307 battery-backed clock on the two-wire bus.

use embedded_hal::i2c::{Error as _, I2c};

use crate::calendar::day_of_week;
use crate::clock_time::{CalendarDate, ClockTime, DateTime};
use crate::{Error, Result};

/// Source and sink of authoritative wall-clock time.
pub trait RealTimeClock {
    /// Read the current date and time.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be reached or reports out-of-range values.
    fn read_time(&mut self) -> Result<DateTime>;

    /// Set the date and time. The day of the week is derived from the date.
    ///
    /// # Errors
    ///
    /// Returns an error if `date_time` is invalid or the device cannot be reached.
    fn write_time(&mut self, date_time: DateTime) -> Result<()>;
}

impl<R: RealTimeClock + ?Sized> RealTimeClock for &mut R {
    fn read_time(&mut self) -> Result<DateTime> {
        (**self).read_time()
    }

    fn write_time(&mut self, date_time: DateTime) -> Result<()> {
        (**self).write_time(date_time)
    }
}

/// DS1307 bus address.
pub const DS1307_ADDRESS: u8 = 0x68;

/// First timekeeping register (seconds); seven registers follow in order: seconds, minutes,
/// hours, day of week, date, month, year.
const REG_SECONDS: u8 = 0x00;

/// Clock-halt bit in the seconds register.
const CLOCK_HALT: u8 = 0x80;

/// 12-hour mode bit in the hours register.
const HOUR_12_MODE: u8 = 0x40;

/// DS1307 real-time clock driver.
pub struct Ds1307<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Ds1307<I2C> {
    #[must_use]
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I2C {
        self.i2c
    }

    /// Whether the oscillator is stopped (fresh battery, never set).
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be reached.
    pub fn is_halted(&mut self) -> Result<bool> {
        let mut seconds = [0_u8; 1];
        self.i2c
            .write_read(DS1307_ADDRESS, &[REG_SECONDS], &mut seconds)
            .map_err(|err| Error::Bus(err.kind()))?;
        let [seconds] = seconds;
        Ok(seconds & CLOCK_HALT != 0)
    }
}

impl<I2C: I2c> RealTimeClock for Ds1307<I2C> {
    fn read_time(&mut self) -> Result<DateTime> {
        let mut registers = [0_u8; 7];
        self.i2c
            .write_read(DS1307_ADDRESS, &[REG_SECONDS], &mut registers)
            .map_err(|err| Error::Bus(err.kind()))?;
        let [seconds, minutes, hours, _dow, date, month, year] = registers;

        // The driver always writes 24-hour mode; a 12-hour register means someone else set it.
        if hours & HOUR_12_MODE != 0 {
            return Err(Error::InvalidRtcData);
        }
        let date_time = DateTime::new(
            CalendarDate {
                day: bcd_decode(date & 0x3F),
                month: bcd_decode(month & 0x1F),
                year: bcd_decode(year),
            },
            ClockTime {
                hour: bcd_decode(hours & 0x3F),
                minute: bcd_decode(minutes & 0x7F),
                second: bcd_decode(seconds & !CLOCK_HALT),
            },
        );
        if !date_time.is_valid() {
            return Err(Error::InvalidRtcData);
        }
        Ok(date_time)
    }

    fn write_time(&mut self, date_time: DateTime) -> Result<()> {
        if !date_time.is_valid() {
            return Err(Error::InvalidDateTime);
        }
        let DateTime { date, time } = date_time;
        // The DS1307 counts the day of the week 1-7.
        let dow = day_of_week(date.month, date.day, date.year).saturating_add(1);
        let frame = [
            REG_SECONDS,
            bcd_encode(time.second), // clears the clock-halt bit
            bcd_encode(time.minute),
            bcd_encode(time.hour),
            dow,
            bcd_encode(date.day),
            bcd_encode(date.month),
            bcd_encode(date.year),
        ];
        self.i2c
            .write(DS1307_ADDRESS, &frame)
            .map_err(|err| Error::Bus(err.kind()))?;
        info!(
            "RTC set to {}:{}:{} {}/{}/{}",
            time.hour, time.minute, time.second, date.month, date.day, date.year
        );
        Ok(())
    }
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "Nibbles are at most 15, so the result fits in a u8."
)]
const fn bcd_decode(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "Callers pass values below 100."
)]
const fn bcd_encode(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}
