//! SIP utility functions
use super::error;
use super::spec;
use chrono::{DateTime, FixedOffset, Local, Utc};
use deunicode::deunicode;
use log::error;
use std::borrow::Cow;

/// Clean up a string for inclusion in a SIP message
///
/// ```
/// use sip2sc::util;
/// let result = util::sip_string("howdy|par|dner");
/// assert_eq!(result, "howdypardner");
/// ```
///
pub fn sip_string(text: &str) -> String {
    text.replace('|', "")
}

/// Transliterate a string to plain ASCII.
///
/// ```
/// use sip2sc::util;
/// assert_eq!(util::ascii_string("Tōkyō café"), "Tokyo cafe");
/// ```
pub fn ascii_string(text: &str) -> String {
    // "Some transliterations do produce \n characters."
    deunicode(text).replace('\n', "")
}

/// Current local date + time in SIP format
pub fn sip_date_now() -> String {
    sip_date_from_dt(&Local::now().fixed_offset())
}

/// Current UTC date + time in SIP format
///
/// ```
/// use sip2sc::util;
/// let date = util::sip_date_utc_now();
/// assert_eq!(date.len(), 18);
/// assert_eq!(&date[8..12], "   Z");
/// ```
pub fn sip_date_utc_now() -> String {
    Utc::now().format(spec::SIP_DATE_FORMAT_UTC).to_string()
}

/// Translate an RFC 3339 date to SIP format
///
/// ```
/// use sip2sc::util;
///
/// let date_op = util::sip_date("1996-12-19T16:39:57-08:00");
/// assert_eq!(date_op.is_ok(), true);
///
/// let result = date_op.unwrap();
/// assert_eq!(result, "19961219    163957");
///
/// let date_op2 = util::sip_date("YARP!");
/// assert_eq!(date_op2.is_err(), true);
/// ```
pub fn sip_date(iso_date: &str) -> Result<String, error::Error> {
    match DateTime::parse_from_rfc3339(iso_date) {
        Ok(dt) => Ok(sip_date_from_dt(&dt)),
        Err(s) => {
            error!("Error parsing sip date: {} : {}", iso_date, s);
            Err(error::Error::DateFormatError)
        }
    }
}

/// Same as sip_date(), but starting from a DateTime object.
pub fn sip_date_from_dt(dt: &DateTime<FixedOffset>) -> String {
    dt.format(spec::SIP_DATE_FORMAT).to_string()
}

/// Returns "Y" on true, "N" on false.
pub fn sip_bool(value: bool) -> &'static str {
    match value {
        true => "Y",
        false => "N",
    }
}

/// Decode a numeric fixed field leniently.
///
/// Leading whitespace and an optional sign are accepted, then as many
/// digits as are present.  Anything else decodes to 0.
///
/// ```
/// use sip2sc::util;
/// assert_eq!(util::sip_count("0012"), 12);
/// assert_eq!(util::sip_count("  7 "), 7);
/// assert_eq!(util::sip_count("-3"), -3);
/// assert_eq!(util::sip_count("12ab"), 12);
/// assert_eq!(util::sip_count("    "), 0);
/// assert_eq!(util::sip_count("ab"), 0);
/// ```
pub fn sip_count(text: &str) -> i64 {
    let text = text.trim_start();

    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let value = digits
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add((b - b'0') as i64)
        });

    if negative {
        -value
    } else {
        value
    }
}

/// Substring by byte offset which tolerates short input.
///
/// Returns whatever portion of the requested range exists.  A range
/// which splits a multi-byte character keeps the partial bytes as
/// replacement characters.
///
/// ```
/// use sip2sc::util;
/// assert_eq!(util::substr("36Y2008", 2, 1), "Y");
/// assert_eq!(util::substr("36Y", 2, 10), "Y");
/// assert_eq!(util::substr("36Y", 5, 10), "");
/// assert_eq!(util::substr("café|AY", 4, 3), "\u{FFFD}|A");
/// ```
pub fn substr(text: &str, offset: usize, length: usize) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let start = offset.min(bytes.len());
    let end = offset.saturating_add(length).min(bytes.len());

    String::from_utf8_lossy(&bytes[start..end])
}

/// Decode a response read from the wire.
///
/// Valid UTF-8 is used as is.  Anything else is read as Latin-1, one
/// character per byte.
///
/// ```
/// use sip2sc::util;
/// assert_eq!(util::decode_response(b"AEJos\xc3\xa9"), "AEJosé");
/// assert_eq!(util::decode_response(b"AEJos\xe9"), "AEJosé");
/// ```
pub fn decode_response(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|b| *b as char).collect(),
    }
}
