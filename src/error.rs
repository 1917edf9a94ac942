use derive_more::derive::{Display, Error};
use embedded_hal::i2c::ErrorKind;

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// The animation, auto-dim and auto-DST engines never fail; errors only come from the edges that
/// talk to hardware (the real-time clock on the two-wire bus) or from callers handing in
/// out-of-range date/time values.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // `#[error(not(source))]` tells `derive_more` that `ErrorKind` does not implement Rust's
    // `core::error::Error` trait.
    #[display("Two-wire bus error: {_0:?}")]
    Bus(#[error(not(source))] ErrorKind),

    #[display("Real-time clock returned out-of-range data")]
    InvalidRtcData,

    #[display("Date or time out of range")]
    InvalidDateTime,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::Bus(kind)
    }
}
