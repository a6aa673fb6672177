use std::error;
use std::fmt;

/// Errors related to SIP2 self-check communication
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Hold mode was not one of '+', '-', '*'.
    InvalidHoldMode(char),
    /// Hold type outside 1-9.
    InvalidHoldType(u8),
    DateFormatError,
    FixedFieldLengthError,
    NetworkError(String),
    NoResponseError,
    /// Every response failed checksum validation.  Contains the number
    /// of send attempts made.
    RetriesExhausted(usize),
    ConfigError(String),
}

use self::Error::*;

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidHoldMode(m) => write!(f, "invalid hold mode: {m}"),
            InvalidHoldType(t) => write!(f, "invalid hold type: {t}"),
            DateFormatError => write!(f, "date format error"),
            FixedFieldLengthError => write!(f, "fixed field length error"),
            NetworkError(s) => write!(f, "network error: {s}"),
            NoResponseError => write!(f, "no message was received"),
            RetriesExhausted(n) => {
                write!(f, "no response passed checksum validation after {n} attempts")
            }
            ConfigError(s) => write!(f, "configuration error: {s}"),
        }
    }
}
