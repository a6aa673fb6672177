//! SIP2 self-check protocol tables as a collection of static values.
use std::fmt;

/// Protocol version reported in the SC Status message unless the
/// caller asks for something else.
pub const SIP_PROTOCOL_VERSION: f32 = 2.0;
pub const MAX_PROTOCOL_VERSION: f32 = 3.0;

pub const DEFAULT_PORT: u16 = 6002;
pub const DEFAULT_TERMINATOR: &str = "\r\n";
pub const DEFAULT_LANGUAGE: &str = "001";
pub const DEFAULT_INSTITUTION: &str = "WohlersSIP";
pub const DEFAULT_MAX_RETRY: usize = 3;

/// Marks the end of an inbound response while reading.
pub const RESPONSE_TERMINATOR: u8 = b'\r';

/// Local time: the 4-character zone block is blank.
pub const SIP_DATE_FORMAT: &str = "%Y%m%d    %H%M%S";
/// Universal time: 'Z' in the right-hand position of the zone block.
pub const SIP_DATE_FORMAT_UTC: &str = "%Y%m%d   Z%H%M%S";

/// Length of "AY<digit>AZ<4 hex>" at the tail of a response.
pub const TRAILER_LENGTH: usize = 7;
/// Length of the checksum value.
pub const CHECKSUM_LENGTH: usize = 4;

/// How a fixed field value is made to fill its column.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Pad {
    /// Value must already have the exact width.
    Exact,
    /// Right-aligned, space filled on the left.
    Left,
    /// Left-aligned, space filled on the right.
    Right,
}

/// Outbound fixed field definition with label, width, and padding rule.
#[derive(PartialEq, Debug)]
pub struct FixedField {
    /// For documentation and debugging purposes.
    ///
    /// This value does not appear in any messages.
    pub label: &'static str,

    /// Width of the fixed field in characters.
    pub length: usize,

    pub pad: Pad,
}

impl fmt::Display for FixedField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.length)
    }
}

/// Field definition with label and 2-character code.
#[derive(PartialEq, Debug)]
pub struct Field {
    /// For documentation and debugging purposes.
    pub label: &'static str,

    /// 2-Character SIP Field Code
    pub code: &'static str,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.code, self.label)
    }
}

impl Field {
    /// Get a Field from its 2-character code.
    ///
    /// ```
    /// use sip2sc::spec;
    /// let f = spec::Field::from_code("CN").unwrap();
    /// assert_eq!(f.label, "login user id");
    /// assert!(spec::Field::from_code("??").is_none());
    /// ```
    pub fn from_code(code: &str) -> Option<&'static Field> {
        KNOWN_FIELDS.iter().copied().find(|f| f.code == code)
    }
}

/// Outbound SIP message definition with 2-character code, label, and
/// fixed fields in the order they appear on the wire.
#[derive(PartialEq, Debug)]
pub struct Message {
    /// Two-Character SIP Message Code
    pub code: &'static str,

    /// For documentation and debugging purposes.
    pub label: &'static str,

    pub fixed_fields: &'static [&'static FixedField],
}

/// How a fixed response value is decoded.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ValueKind {
    Text,
    Date,
    Count,
}

/// A named fixed value read from a response at a byte offset.
#[derive(PartialEq, Debug)]
pub struct ResponseField {
    pub name: &'static str,
    pub offset: usize,
    pub length: usize,
    pub kind: ValueKind,
}

/// Inbound response layout.
///
/// Offsets are absolute, counting the 2-character message code.
/// Variable fields are read starting at `variable_offset`.
#[derive(PartialEq, Debug)]
pub struct Response {
    pub code: &'static str,
    pub label: &'static str,
    pub fixed_fields: &'static [ResponseField],
    pub variable_offset: usize,
}

// -------------------------------------------------------------------------
// Fixed Fields
// -------------------------------------------------------------------------

type FF = FixedField; // local shorthand

pub const FF_DATE: FF = FF {
    length: 18,
    label: "transaction date",
    pad: Pad::Exact,
};
pub const FF_UID_ALGO: FF = FF {
    length: 1,
    label: "uid algorithm",
    pad: Pad::Exact,
};
pub const FF_PWD_ALGO: FF = FF {
    length: 1,
    label: "pwd algorithm",
    pad: Pad::Exact,
};
pub const FF_LANGUAGE: FF = FF {
    length: 3,
    label: "language",
    pad: Pad::Left,
};
pub const FF_SUMMARY: FF = FF {
    length: 10,
    label: "summary",
    pad: Pad::Right,
};
pub const FF_THIRD_PARTY_ALLOWED: FF = FF {
    length: 1,
    label: "third party allowed",
    pad: Pad::Exact,
};
pub const FF_NO_BLOCK: FF = FF {
    length: 1,
    label: "no block",
    pad: Pad::Exact,
};
pub const FF_NB_DUE_DATE: FF = FF {
    length: 18,
    label: "nb due date",
    pad: Pad::Left,
};
pub const FF_HOLD_MODE: FF = FF {
    length: 1,
    label: "hold mode",
    pad: Pad::Exact,
};
pub const FF_CARD_RETAINED: FF = FF {
    length: 1,
    label: "card retained",
    pad: Pad::Exact,
};
pub const FF_STATUS_CODE: FF = FF {
    length: 1,
    label: "status code",
    pad: Pad::Exact,
};
pub const FF_MAX_PRINT_WIDTH: FF = FF {
    length: 3,
    label: "max print width",
    pad: Pad::Left,
};
pub const FF_PROTOCOL_VERSION: FF = FF {
    length: 4,
    label: "protocol version",
    pad: Pad::Exact,
};

// -------------------------------------------------------------------------
// Fields
// -------------------------------------------------------------------------

type F = Field; // local shorthand

pub const F_LOGIN_UID: F = F {
    code: "CN",
    label: "login user id",
};
pub const F_LOGIN_PWD: F = F {
    code: "CO",
    label: "login password",
};
pub const F_LOCATION_CODE: F = F {
    code: "CP",
    label: "location code",
};
pub const F_INSTITUTION_ID: F = F {
    code: "AO",
    label: "institution id",
};
pub const F_PATRON_ID: F = F {
    code: "AA",
    label: "patron identifier",
};
pub const F_PATRON_PWD: F = F {
    code: "AD",
    label: "patron password",
};
pub const F_TERMINAL_PWD: F = F {
    code: "AC",
    label: "terminal password",
};
pub const F_ITEM_IDENT: F = F {
    code: "AB",
    label: "item identifier",
};
pub const F_TITLE_IDENT: F = F {
    code: "AJ",
    label: "title identifier",
};
pub const F_ITEM_PROPERTIES: F = F {
    code: "CH",
    label: "item properties",
};
pub const F_FEE_ACKNOWLEDGED: F = F {
    code: "BO",
    label: "fee acknowledged",
};
pub const F_START_ITEM: F = F {
    code: "BP",
    label: "start item",
};
pub const F_END_ITEM: F = F {
    code: "BQ",
    label: "end item",
};
pub const F_EXPIRE_DATE: F = F {
    code: "BW",
    label: "expiration date",
};
pub const F_PICKUP_LOCATION: F = F {
    code: "BS",
    label: "pickup location",
};
pub const F_HOLD_TYPE: F = F {
    code: "BY",
    label: "hold type",
};
pub const F_BLOCKED_CARD_MSG: F = F {
    code: "AL",
    label: "blocked card msg",
};
pub const F_PERSONAL_NAME: F = F {
    code: "AE",
    label: "personal name",
};
pub const F_SCREEN_MSG: F = F {
    code: "AF",
    label: "screen message",
};
pub const F_PRINT_LINE: F = F {
    code: "AG",
    label: "print line",
};
pub const F_DUE_DATE: F = F {
    code: "AH",
    label: "due date",
};
pub const F_VALID_PATRON: F = F {
    code: "BL",
    label: "valid patron",
};
pub const F_VALID_PATRON_PWD: F = F {
    code: "CQ",
    label: "valid patron password",
};
pub const F_SEQUENCE_NUMBER: F = F {
    code: "AY",
    label: "sequence number",
};
pub const F_CHECKSUM: F = F {
    code: "AZ",
    label: "checksum",
};

const KNOWN_FIELDS: &[&Field] = &[
    &F_LOGIN_UID,
    &F_LOGIN_PWD,
    &F_LOCATION_CODE,
    &F_INSTITUTION_ID,
    &F_PATRON_ID,
    &F_PATRON_PWD,
    &F_TERMINAL_PWD,
    &F_ITEM_IDENT,
    &F_TITLE_IDENT,
    &F_ITEM_PROPERTIES,
    &F_FEE_ACKNOWLEDGED,
    &F_START_ITEM,
    &F_END_ITEM,
    &F_EXPIRE_DATE,
    &F_PICKUP_LOCATION,
    &F_HOLD_TYPE,
    &F_BLOCKED_CARD_MSG,
    &F_PERSONAL_NAME,
    &F_SCREEN_MSG,
    &F_PRINT_LINE,
    &F_DUE_DATE,
    &F_VALID_PATRON,
    &F_VALID_PATRON_PWD,
    &F_SEQUENCE_NUMBER,
    &F_CHECKSUM,
];

/// Field codes whose values are never written to the logs.
pub const REDACTED_FIELDS: &[&str] = &["CO", "AD", "AC"];

// -------------------------------------------------------------------------
// Outbound Messages
// -------------------------------------------------------------------------

/// Message 93
pub const M_LOGIN: Message = Message {
    code: "93",
    label: "Login Request",
    fixed_fields: &[&FF_UID_ALGO, &FF_PWD_ALGO],
};

/// Message 23
pub const M_PATRON_STATUS: Message = Message {
    code: "23",
    label: "Patron Status Request",
    fixed_fields: &[&FF_LANGUAGE, &FF_DATE],
};

/// Message 63
pub const M_PATRON_INFO: Message = Message {
    code: "63",
    label: "Patron Information",
    fixed_fields: &[&FF_LANGUAGE, &FF_DATE, &FF_SUMMARY],
};

/// Message 17
pub const M_ITEM_INFO: Message = Message {
    code: "17",
    label: "Item Information Request",
    fixed_fields: &[&FF_DATE],
};

/// Message 29
pub const M_RENEW: Message = Message {
    code: "29",
    label: "Renew Request",
    fixed_fields: &[
        &FF_THIRD_PARTY_ALLOWED,
        &FF_NO_BLOCK,
        &FF_DATE,
        &FF_NB_DUE_DATE,
    ],
};

/// Message 15
pub const M_HOLD: Message = Message {
    code: "15",
    label: "Hold Request",
    fixed_fields: &[&FF_HOLD_MODE, &FF_DATE],
};

/// Message 35
pub const M_END_PATRON_SESSION: Message = Message {
    code: "35",
    label: "End Patron Session",
    fixed_fields: &[&FF_DATE],
};

/// Message 01
pub const M_BLOCK_PATRON: Message = Message {
    code: "01",
    label: "Block Patron",
    fixed_fields: &[&FF_CARD_RETAINED, &FF_DATE],
};

/// Message 99
pub const M_SC_STATUS: Message = Message {
    code: "99",
    label: "SC Status",
    fixed_fields: &[&FF_STATUS_CODE, &FF_MAX_PRINT_WIDTH, &FF_PROTOCOL_VERSION],
};

/// Message 97
pub const M_REQUEST_ACS_RESEND: Message = Message {
    code: "97",
    label: "Request ACS Resend",
    fixed_fields: &[],
};

// -------------------------------------------------------------------------
// Inbound Responses
// -------------------------------------------------------------------------

const fn rf(name: &'static str, offset: usize, length: usize, kind: ValueKind) -> ResponseField {
    ResponseField {
        name,
        offset,
        length,
        kind,
    }
}

/// Message 64
pub const R_PATRON_INFO: Response = Response {
    code: "64",
    label: "Patron Information Response",
    fixed_fields: &[
        rf("PatronStatus", 2, 14, ValueKind::Text),
        rf("Language", 16, 3, ValueKind::Text),
        rf("TransactionDate", 19, 18, ValueKind::Date),
        rf("HoldCount", 37, 4, ValueKind::Count),
        rf("OverdueCount", 41, 4, ValueKind::Count),
        rf("ChargedCount", 45, 4, ValueKind::Count),
        rf("FineCount", 49, 4, ValueKind::Count),
        rf("RecallCount", 53, 4, ValueKind::Count),
        rf("UnavailableCount", 57, 4, ValueKind::Count),
    ],
    variable_offset: 61,
};

/// Message 18
pub const R_ITEM_INFO: Response = Response {
    code: "18",
    label: "Item Information Response",
    fixed_fields: &[
        rf("CirculationStatus", 2, 2, ValueKind::Count),
        rf("SecurityMarker", 4, 2, ValueKind::Count),
        rf("FeeType", 6, 2, ValueKind::Count),
        rf("TransactionDate", 8, 18, ValueKind::Date),
    ],
    variable_offset: 26,
};

/// Message 16
///
/// ExpirationDate overlaps the start of the variable data, and the
/// variable data starts 2 characters past the end of the fixed block.
/// Both match what deployed ACS servers have always been read with.
pub const R_HOLD: Response = Response {
    code: "16",
    label: "Hold Response",
    fixed_fields: &[
        rf("Ok", 2, 1, ValueKind::Text),
        rf("available", 3, 1, ValueKind::Text),
        rf("TransactionDate", 4, 18, ValueKind::Date),
        rf("ExpirationDate", 22, 18, ValueKind::Date),
    ],
    variable_offset: 24,
};

/// Message 30
pub const R_RENEW: Response = Response {
    code: "30",
    label: "Renew Response",
    fixed_fields: &[
        rf("Ok", 2, 1, ValueKind::Text),
        rf("RenewalOk", 3, 1, ValueKind::Text),
        rf("Magnetic", 4, 1, ValueKind::Text),
        rf("Desensitize", 5, 1, ValueKind::Text),
        rf("TransactionDate", 6, 18, ValueKind::Date),
    ],
    variable_offset: 24,
};

/// Message 36
pub const R_END_SESSION: Response = Response {
    code: "36",
    label: "End Session Response",
    fixed_fields: &[
        rf("EndSession", 2, 1, ValueKind::Text),
        rf("TransactionDate", 3, 18, ValueKind::Date),
    ],
    variable_offset: 21,
};
