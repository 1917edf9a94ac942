//! A small pseudo-random generator for cosmetic animation choices.
//!
//! The state is one 64-bit XTEA block and a 128-bit key. Each request runs 32 rounds of XTEA over
//! the block. The key is folded together from the clock and alarm fields at boot, so sequences
//! differ from one power-up to the next but replay exactly from a captured state.
//!
//! This is a toy mixer. Do not use it for anything security related.

/// Largest value returned for [`RandomKind::Byte`] (the AVR libc `RAND_MAX`).
pub const RAND_MAX: u16 = 0x7FFF;

/// Initial XTEA key, before the boot-time fields are folded in.
const INITIAL_KEY: [u32; 4] = [0x2DE9_716E, 0x993F_DDD1, 0x2A77_FB57, 0xB172_E6B0];

/// Golden-ratio round constant.
const DELTA: u32 = 0x9E37_79B9;

const ROUNDS: usize = 32;

/// What kind of value to draw from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RandomKind {
    /// 15 bits, `0..=RAND_MAX`.
    Byte,
    /// Two bits, `0..=3`.
    TwoBit,
    /// One bit, `0..=1`.
    OneBit,
}

/// Boot-time values folded into the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SeedInputs {
    pub alarm_hour: u8,
    pub alarm_minute: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

/// XTEA-based pseudo-random generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prng {
    value: [u32; 2],
    key: [u32; 4],
}

impl Prng {
    /// Seed a generator from boot-time clock and alarm values.
    #[must_use]
    pub fn new(seed: &SeedInputs) -> Self {
        let mut prng = Self {
            value: [0, 0],
            key: INITIAL_KEY,
        };
        prng.encipher();

        let time_word = u32::from_be_bytes([seed.alarm_hour, seed.hour, seed.minute, seed.second]);
        prng.key[0] ^= prng.value[1] << 1;
        prng.encipher();
        prng.key[1] ^= time_word << 1;
        prng.encipher();
        prng.key[2] ^= time_word >> 1;
        prng.encipher();
        prng.key[3] ^= prng.value[1] >> 1;
        prng.encipher();

        let date_word = u32::from_be_bytes([seed.alarm_minute, seed.month, seed.day, seed.year]);
        prng.key[0] ^= date_word << 1;
        prng.encipher();
        prng.key[1] ^= prng.value[0] << 1;
        prng.encipher();
        prng.key[2] ^= prng.value[0] >> 1;
        prng.encipher();
        prng.key[3] ^= date_word >> 1;

        prng.value = [0, 0];
        prng.encipher();
        debug!("PRNG seeded");
        prng
    }

    /// Rebuild a generator from a state captured with [`Prng::state`].
    #[must_use]
    pub const fn from_state(value: [u32; 2], key: [u32; 4]) -> Self {
        Self { value, key }
    }

    /// Capture the running block and key.
    #[must_use]
    pub const fn state(&self) -> ([u32; 2], [u32; 4]) {
        (self.value, self.key)
    }

    /// Advance the state once and return a value of the requested kind.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Each arm masks the value to at most 15 bits."
    )]
    pub fn next(&mut self, kind: RandomKind) -> u16 {
        self.encipher();
        let mixed = self.value[0] ^ self.value[1];
        match kind {
            RandomKind::Byte => (mixed & u32::from(RAND_MAX)) as u16,
            RandomKind::TwoBit => ((mixed >> 15) & 0b11) as u16,
            RandomKind::OneBit => ((mixed >> 17) & 0b1) as u16,
        }
    }

    /// A value in `0..bound` (0 when `bound` is 0).
    pub fn next_below(&mut self, bound: u16) -> u16 {
        self.next(RandomKind::Byte).checked_rem(bound).unwrap_or(0)
    }

    fn encipher(&mut self) {
        let [mut v0, mut v1] = self.value;
        let key = self.key;
        let mut sum: u32 = 0;
        for _ in 0..ROUNDS {
            v0 = v0.wrapping_add(
                ((v1 << 4) ^ (v1 >> 5)).wrapping_add(v1)
                    ^ sum.wrapping_add(key_word(&key, sum)),
            );
            sum = sum.wrapping_add(DELTA);
            v1 = v1.wrapping_add(
                ((v0 << 4) ^ (v0 >> 5)).wrapping_add(v0)
                    ^ sum.wrapping_add(key_word(&key, sum >> 11)),
            );
        }
        self.value = [v0, v1];
    }
}

#[inline]
fn key_word(key: &[u32; 4], selector: u32) -> u32 {
    match selector & 3 {
        0 => key[0],
        1 => key[1],
        2 => key[2],
        _ => key[3],
    }
}
