//! SIP2 message checksum.
//!
//! The checksum is the two's complement of the byte sum, kept to its
//! low 16 bits and rendered as 4 uppercase hex digits.
use super::spec;

/// Calculate the checksum of a message body.
///
/// The body includes everything up to and including the "AZ" tag.
///
/// ```
/// use sip2sc::checksum;
/// assert_eq!(checksum::checksum("9300CNtestuser|COtestpass|CP|AY0AZ"), "F3AF");
/// assert_eq!(checksum::checksum(""), "0000");
/// ```
pub fn checksum(body: &str) -> String {
    checksum_bytes(body.as_bytes())
}

/// Same as checksum(), but over raw bytes as received.
///
/// ```
/// use sip2sc::checksum;
/// assert_eq!(checksum::checksum_bytes(b"97AZ"), "FEF5");
/// ```
pub fn checksum_bytes(body: &[u8]) -> String {
    let sum = body
        .iter()
        .fold(0u32, |sum, b| sum.wrapping_add(*b as u32));

    let crc = (sum as u16).wrapping_neg();

    // {:04X} never exceeds 4 digits for a u16, but keep the low-order
    // digits should the representation ever grow.
    let hex = format!("{crc:04X}");
    hex[hex.len() - spec::CHECKSUM_LENGTH..].to_string()
}

/// Append the checksum of `body` and the terminator.
///
/// ```
/// use sip2sc::checksum;
/// assert_eq!(checksum::seal("97AZ", "\r\n"), "97AZFEF5\r\n");
/// ```
pub fn seal(body: &str, terminator: &str) -> String {
    format!("{body}{}{terminator}", checksum(body))
}

/// Returns true if the final 4 characters of the message match the
/// checksum of everything that precedes them.
///
/// Any trailing message terminator should be removed first, though
/// trailing CR/LF characters are ignored.
///
/// ```
/// use sip2sc::checksum;
/// assert!(checksum::verify("9300CNtestuser|COtestpass|CP|AY0AZF3AF"));
/// assert!(checksum::verify("9300CNtestuser|COtestpass|CP|AY0AZF3AF\r"));
/// assert!(!checksum::verify("9300CNtestuser|COtestpass|CP|AY0AZF3AE"));
/// assert!(!checksum::verify("AZ"));
/// ```
pub fn verify(message: &str) -> bool {
    verify_bytes(message.as_bytes())
}

/// Same as verify(), but over raw bytes as received.
///
/// Responses need not be valid UTF-8 for their checksum to be checked.
///
/// ```
/// use sip2sc::checksum;
/// assert!(checksum::verify_bytes(b"97AZFEF5\r"));
/// assert!(!checksum::verify_bytes(b"97A\xffFEF5"));
/// ```
pub fn verify_bytes(message: &[u8]) -> bool {
    let mut len = message.len();
    while len > 0 && matches!(message[len - 1], b'\r' | b'\n') {
        len -= 1;
    }

    if len < spec::CHECKSUM_LENGTH {
        return false;
    }

    let (body, crc) = message[..len].split_at(len - spec::CHECKSUM_LENGTH);

    checksum_bytes(body).as_bytes() == crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_four_uppercase_hex() {
        for body in ["", "a", "97AZ", "ÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿÿ"] {
            let crc = checksum(body);
            assert_eq!(crc.len(), 4);
            assert!(crc
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
    }

    #[test]
    fn known_values() {
        assert_eq!(checksum("97AZ"), "FEF5");

        let renew = "300NUU20080228    222232AOWOHLERS|AAX00000241|\
            ABM02400028262|AJFolksongs of Britain and Ireland|\
            AH5/23/2008,23:59|CH|AFOverride required to exceed renewal limit.|AY1AZ";
        assert_eq!(checksum(renew), "CDA5");
    }

    #[test]
    fn verify_appended_checksum() {
        for body in ["", "x", "36Y20080228    145537AOWOHLERS|AY9AZ", "élan|AZ"] {
            let msg = format!("{body}{}", checksum(body));
            assert!(verify(&msg), "{msg}");
        }
    }

    #[test]
    fn verify_rejects_mismatch() {
        assert!(!verify("36Y20080228    145537AOWOHLERS|AAX00000000|AY9AZF474"));
        assert!(!verify(""));
        assert!(!verify("F47"));
    }

    #[test]
    fn verify_non_utf8_bytes() {
        let mut msg = b"36Y20080228    145537AOWOHL\xe9RS|AY9AZ".to_vec();
        let crc = checksum_bytes(&msg);
        msg.extend_from_slice(crc.as_bytes());

        assert!(verify_bytes(&msg));

        msg[27] = 0xff;
        assert!(!verify_bytes(&msg));
    }
}
