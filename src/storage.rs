//! Byte-addressed persistent storage for clock settings.
//!
//! Settings live in a small EEPROM-style store at fixed addresses (see [`addr`]). EEPROM cells
//! wear out, so every settings write goes through [`Storage::update_byte`] /
//! [`Storage::update_word`], which skip the write when the stored value already matches.
//!
//! Writes are fire-and-forget: backends log failures but never report them to the caller.

use embedded_storage::Storage as EmbeddedStorage;

/// Marker stored at [`addr::INIT`] once the store has been initialized.
///
/// Never 0xFF, which is what an erased EEPROM reads as.
pub const INIT_MARKER: u8 = 0xC3;

/// Fixed storage addresses.
pub mod addr {
    pub const INIT: u16 = 0;
    pub const ALARM_HOUR: u16 = 1;
    pub const ALARM_MINUTE: u16 = 2;
    pub const BRIGHTNESS: u16 = 3;
    pub const VOLUME: u16 = 4;
    pub const REGION: u16 = 5;
    pub const TIME_FORMAT: u16 = 6;
    pub const SNOOZE: u16 = 7;
    /// Two bytes, little-endian minutes since midnight.
    pub const DIM_DAY_TIME: u16 = 8;
    /// Two bytes, little-endian minutes since midnight.
    pub const DIM_NIGHT_TIME: u16 = 10;
    pub const DIM_DAY_BRIGHTNESS: u16 = 12;
    pub const DIM_NIGHT_BRIGHTNESS: u16 = 13;
    pub const DST: u16 = 14;

    /// Bytes used by the layout.
    pub const END: u16 = 15;
}

/// Persistent byte/word storage.
pub trait Storage {
    fn read_byte(&mut self, addr: u16) -> u8;

    fn write_byte(&mut self, addr: u16, value: u8);

    /// Read a little-endian word from `addr` and `addr + 1`.
    fn read_word(&mut self, addr: u16) -> u16 {
        let low = self.read_byte(addr);
        let high = self.read_byte(addr.wrapping_add(1));
        u16::from_le_bytes([low, high])
    }

    /// Write a little-endian word to `addr` and `addr + 1`.
    fn write_word(&mut self, addr: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write_byte(addr, low);
        self.write_byte(addr.wrapping_add(1), high);
    }

    /// Write `value` only if it differs from what is stored. Returns whether a write happened.
    fn update_byte(&mut self, addr: u16, value: u8) -> bool {
        if self.read_byte(addr) == value {
            return false;
        }
        self.write_byte(addr, value);
        true
    }

    /// Write `value` only if it differs from what is stored. Returns whether a write happened.
    fn update_word(&mut self, addr: u16, value: u16) -> bool {
        if self.read_word(addr) == value {
            return false;
        }
        self.write_word(addr, value);
        true
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn read_byte(&mut self, addr: u16) -> u8 {
        (**self).read_byte(addr)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        (**self).write_byte(addr, value);
    }

    fn read_word(&mut self, addr: u16) -> u16 {
        (**self).read_word(addr)
    }

    fn write_word(&mut self, addr: u16, value: u16) {
        (**self).write_word(addr, value);
    }
}

/// RAM-backed storage that starts out erased (all 0xFF) and counts writes.
///
/// Useful for host tests and for boards without EEPROM, where settings simply do not survive a
/// reset.
#[derive(Debug, Clone)]
pub struct RamStorage<const N: usize> {
    cells: [u8; N],
    writes: usize,
}

impl<const N: usize> Default for RamStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamStorage<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [0xFF; N],
            writes: 0,
        }
    }

    /// Number of write operations (byte or word) issued so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// The raw cell contents.
    #[must_use]
    pub const fn cells(&self) -> &[u8; N] {
        &self.cells
    }

    fn store(&mut self, addr: u16, value: u8) {
        if let Some(cell) = self.cells.get_mut(usize::from(addr)) {
            *cell = value;
        } else {
            warn!("RamStorage: write past end at {}", addr);
        }
    }
}

impl<const N: usize> Storage for RamStorage<N> {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.cells.get(usize::from(addr)).copied().unwrap_or(0xFF)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        self.writes = self.writes.saturating_add(1);
        self.store(addr, value);
    }

    fn write_word(&mut self, addr: u16, value: u16) {
        self.writes = self.writes.saturating_add(1);
        let [low, high] = value.to_le_bytes();
        self.store(addr, low);
        self.store(addr.wrapping_add(1), high);
    }
}

/// Adapter from any `embedded-storage` device (EEPROM, emulated EEPROM in flash, ...) to
/// [`Storage`], with settings placed at `base`.
pub struct EepromStorage<S> {
    inner: S,
    base: u32,
}

impl<S: EmbeddedStorage> EepromStorage<S> {
    #[must_use]
    pub const fn new(inner: S, base: u32) -> Self {
        Self { inner, base }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn offset(&self, addr: u16) -> u32 {
        self.base.saturating_add(u32::from(addr))
    }
}

impl<S: EmbeddedStorage> Storage for EepromStorage<S> {
    fn read_byte(&mut self, addr: u16) -> u8 {
        let mut buffer = [0xFF_u8; 1];
        let offset = self.offset(addr);
        if self.inner.read(offset, &mut buffer).is_err() {
            warn!("EEPROM: read failed at {}", addr);
            return 0xFF;
        }
        let [byte] = buffer;
        byte
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        let offset = self.offset(addr);
        if self.inner.write(offset, &[value]).is_err() {
            warn!("EEPROM: write failed at {}", addr);
        }
    }

    fn write_word(&mut self, addr: u16, value: u16) {
        let offset = self.offset(addr);
        if self.inner.write(offset, &value.to_le_bytes()).is_err() {
            warn!("EEPROM: word write failed at {}", addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RamStorage, Storage};

    #[test]
    fn update_skips_identical_values() {
        let mut storage = RamStorage::<16>::new();
        assert!(storage.update_byte(3, 7));
        assert!(!storage.update_byte(3, 7));
        assert!(storage.update_word(8, 360));
        assert!(!storage.update_word(8, 360));
        assert_eq!(storage.writes(), 2);
        assert_eq!(storage.read_word(8), 360);
        assert_eq!(storage.cells()[8..10], [0x68, 0x01]);
    }

    #[test]
    fn out_of_range_reads_as_erased() {
        let mut storage = RamStorage::<4>::new();
        storage.write_byte(10, 1);
        assert_eq!(storage.read_byte(10), 0xFF);
        assert_eq!(storage.read_word(0), 0xFFFF);
    }
}
