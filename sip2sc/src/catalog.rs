//! Builders for each outbound message type.
//!
//! Builders return the message body.  The client appends the sequence
//! number, checksum, and terminator when the message is sent.
use super::config::Config;
use super::error::Error;
use super::message::{Field, FixedField, Message};
use super::spec;
use super::util;

/// Patron Information item category.
///
/// Only one category may be requested per message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Summary {
    None,
    Hold,
    Overdue,
    Charged,
    Fine,
    Recall,
    Unavail,
}

impl Summary {
    /// 6-character summary mask with 'Y' in the category's position.
    ///
    /// ```
    /// use sip2sc::Summary;
    /// assert_eq!(Summary::None.mask(), "      ");
    /// assert_eq!(Summary::Charged.mask(), "  Y   ");
    /// assert_eq!(Summary::Unavail.mask(), "     Y");
    /// ```
    pub fn mask(&self) -> &'static str {
        match self {
            Summary::None => "      ",
            Summary::Hold => "Y     ",
            Summary::Overdue => " Y    ",
            Summary::Charged => "  Y   ",
            Summary::Fine => "   Y  ",
            Summary::Recall => "    Y ",
            Summary::Unavail => "     Y",
        }
    }
}

impl TryFrom<&str> for Summary {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "none" => Ok(Summary::None),
            "hold" => Ok(Summary::Hold),
            "overdue" => Ok(Summary::Overdue),
            "charged" => Ok(Summary::Charged),
            "fine" => Ok(Summary::Fine),
            "recall" => Ok(Summary::Recall),
            "unavail" => Ok(Summary::Unavail),
            _ => Err(Error::ConfigError(format!("Unknown summary category: {name}"))),
        }
    }
}

/// Hold request mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldMode {
    Place,
    Remove,
    Modify,
}

impl HoldMode {
    pub fn as_char(&self) -> char {
        match self {
            HoldMode::Place => '+',
            HoldMode::Remove => '-',
            HoldMode::Modify => '*',
        }
    }
}

impl TryFrom<char> for HoldMode {
    type Error = Error;

    /// ```
    /// use sip2sc::HoldMode;
    /// assert_eq!(HoldMode::try_from('+').unwrap(), HoldMode::Place);
    /// assert!(HoldMode::try_from('?').is_err());
    /// ```
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(HoldMode::Place),
            '-' => Ok(HoldMode::Remove),
            '*' => Ok(HoldMode::Modify),
            _ => Err(Error::InvalidHoldMode(c)),
        }
    }
}

/// Self-check unit status reported in the SC Status message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitStatus {
    Ok,
    OutOfPaper,
    ShuttingDown,
}

impl UnitStatus {
    pub fn code(&self) -> &'static str {
        match self {
            UnitStatus::Ok => "0",
            UnitStatus::OutOfPaper => "1",
            UnitStatus::ShuttingDown => "2",
        }
    }
}

/// Field list shared by the patron-oriented messages.
fn patron_fields(config: &Config) -> Vec<Field> {
    vec![
        Field::new(spec::F_INSTITUTION_ID.code, config.institution()),
        Field::new(spec::F_PATRON_ID.code, config.patron()),
        Field::new(spec::F_TERMINAL_PWD.code, config.terminal_pwd()),
        Field::new(spec::F_PATRON_PWD.code, config.patron_pwd()),
    ]
}

/// Login (93)
pub fn login(config: &Config, login_id: &str, password: &str) -> Result<Message, Error> {
    let uid_algo = config.uid_algorithm().to_string();
    let pwd_algo = config.pwd_algorithm().to_string();

    Message::from_values(
        &spec::M_LOGIN,
        &[uid_algo.as_str(), pwd_algo.as_str()],
        &[
            (spec::F_LOGIN_UID.code, login_id),
            (spec::F_LOGIN_PWD.code, password),
            (spec::F_LOCATION_CODE.code, config.location()),
        ],
    )
}

/// SC Status (99)
///
/// Print widths above 999 are sent as 999.  A protocol version above
/// the maximum is replaced with the default version.
pub fn sc_status(status: UnitStatus, width: u16, version: f32) -> Result<Message, Error> {
    let version = if version > spec::MAX_PROTOCOL_VERSION {
        spec::SIP_PROTOCOL_VERSION
    } else {
        version
    };

    let width = width.min(999).to_string();
    let version = format!("{version:.2}");

    Message::from_values(
        &spec::M_SC_STATUS,
        &[status.code(), width.as_str(), version.as_str()],
        &[],
    )
}

/// Patron Status Request (23)
pub fn patron_status(config: &Config, date: &str) -> Result<Message, Error> {
    Ok(Message::new(
        &spec::M_PATRON_STATUS,
        vec![
            FixedField::new(&spec::FF_LANGUAGE, config.language())?,
            FixedField::new(&spec::FF_DATE, date)?,
        ],
        patron_fields(config),
    ))
}

/// Patron Information (63)
///
/// `start` and `end` select the window of item detail to return.
pub fn patron_info(
    config: &Config,
    date: &str,
    summary: Summary,
    start: usize,
    end: usize,
) -> Result<Message, Error> {
    let mut msg = Message::new(
        &spec::M_PATRON_INFO,
        vec![
            FixedField::new(&spec::FF_LANGUAGE, config.language())?,
            FixedField::new(&spec::FF_DATE, date)?,
            FixedField::new(&spec::FF_SUMMARY, summary.mask())?,
        ],
        patron_fields(config),
    );

    msg.add_field(spec::F_START_ITEM.code, &format!("{start:05}"));
    msg.add_field(spec::F_END_ITEM.code, &format!("{end:05}"));

    Ok(msg)
}

/// Item Information (17)
pub fn item_info(config: &Config, date: &str, item: &str) -> Result<Message, Error> {
    Message::from_values(
        &spec::M_ITEM_INFO,
        &[date],
        &[
            (spec::F_INSTITUTION_ID.code, config.institution()),
            (spec::F_ITEM_IDENT.code, item),
            (spec::F_TERMINAL_PWD.code, config.terminal_pwd()),
        ],
    )
}

/// Renew (29)
///
/// `nb_due_date` is an optional due date override.  Pass "" for none.
pub fn renew(
    config: &Config,
    date: &str,
    item: &str,
    title: &str,
    nb_due_date: &str,
    item_properties: &str,
    fee_acknowledged: bool,
) -> Result<Message, Error> {
    Ok(Message::new(
        &spec::M_RENEW,
        vec![
            FixedField::new(&spec::FF_THIRD_PARTY_ALLOWED, "N")?,
            FixedField::new(&spec::FF_NO_BLOCK, "N")?,
            FixedField::new(&spec::FF_DATE, date)?,
            FixedField::new(&spec::FF_NB_DUE_DATE, nb_due_date)?,
        ],
        vec![
            Field::new(spec::F_INSTITUTION_ID.code, config.institution()),
            Field::new(spec::F_PATRON_ID.code, config.patron()),
            Field::new(spec::F_PATRON_PWD.code, config.patron_pwd()),
            Field::new(spec::F_ITEM_IDENT.code, item),
            Field::new(spec::F_TITLE_IDENT.code, title),
            Field::new(spec::F_TERMINAL_PWD.code, config.terminal_pwd()),
            Field::new(spec::F_ITEM_PROPERTIES.code, item_properties),
            Field::new(spec::F_FEE_ACKNOWLEDGED.code, util::sip_bool(fee_acknowledged)),
        ],
    ))
}

/// Hold (15)
///
/// `mode` is one of '+' (place), '-' (remove), or '*' (modify).
/// `hold_type` ranges from 1 to 9:
///
/// * 1 other
/// * 2 any copy of title
/// * 3 specific copy
/// * 4 any copy at a single branch or location
///
/// Invalid values are rejected before anything is built.
#[allow(clippy::too_many_arguments)]
pub fn hold(
    config: &Config,
    date: &str,
    mode: char,
    expiration_date: &str,
    hold_type: u8,
    item: &str,
    title: &str,
    fee_acknowledged: bool,
) -> Result<Message, Error> {
    let mode = HoldMode::try_from(mode)?;
    validate_hold_type(hold_type)?;

    Ok(Message::new(
        &spec::M_HOLD,
        vec![
            FixedField::new(&spec::FF_HOLD_MODE, &mode.as_char().to_string())?,
            FixedField::new(&spec::FF_DATE, date)?,
        ],
        vec![
            Field::new(spec::F_EXPIRE_DATE.code, &format!("{expiration_date:>18}")),
            Field::new(spec::F_PICKUP_LOCATION.code, config.location()),
            Field::new(spec::F_HOLD_TYPE.code, &hold_type.to_string()),
            Field::new(spec::F_INSTITUTION_ID.code, config.institution()),
            Field::new(spec::F_PATRON_ID.code, config.patron()),
            Field::new(spec::F_PATRON_PWD.code, config.patron_pwd()),
            Field::new(spec::F_ITEM_IDENT.code, item),
            Field::new(spec::F_TITLE_IDENT.code, title),
            Field::new(spec::F_TERMINAL_PWD.code, config.terminal_pwd()),
            Field::new(spec::F_FEE_ACKNOWLEDGED.code, util::sip_bool(fee_acknowledged)),
        ],
    ))
}

/// Returns Err if the hold type is outside 1-9.
pub fn validate_hold_type(hold_type: u8) -> Result<(), Error> {
    if (1..=9).contains(&hold_type) {
        Ok(())
    } else {
        log::warn!("Invalid hold type code: {hold_type}");
        Err(Error::InvalidHoldType(hold_type))
    }
}

/// End Patron Session (35)
pub fn end_patron_session(config: &Config, date: &str) -> Result<Message, Error> {
    Ok(Message::new(
        &spec::M_END_PATRON_SESSION,
        vec![FixedField::new(&spec::FF_DATE, date)?],
        patron_fields(config),
    ))
}

/// Block Patron (01)
///
/// `card_retained` is true if the self-check unit kept the card.
pub fn block_patron(
    config: &Config,
    date: &str,
    message: &str,
    card_retained: bool,
) -> Result<Message, Error> {
    Ok(Message::new(
        &spec::M_BLOCK_PATRON,
        vec![
            FixedField::new(&spec::FF_CARD_RETAINED, util::sip_bool(card_retained))?,
            FixedField::new(&spec::FF_DATE, date)?,
        ],
        vec![
            Field::new(spec::F_INSTITUTION_ID.code, config.institution()),
            Field::new(spec::F_BLOCKED_CARD_MSG.code, message),
            Field::new(spec::F_PATRON_ID.code, config.patron()),
            Field::new(spec::F_TERMINAL_PWD.code, config.terminal_pwd()),
        ],
    ))
}

/// Request ACS Resend (97)
///
/// Sent without a sequence number.
pub fn request_resend() -> Message {
    Message::new(&spec::M_REQUEST_ACS_RESEND, vec![], vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "20080228    145537";

    fn config() -> Config {
        Config::builder()
            .set_institution("INST")
            .set_patron("101010101")
            .set_patron_pwd("010101")
            .set_terminal_pwd("tpass")
            .set_location("MAIN")
            .build()
            .unwrap()
    }

    #[test]
    fn login_body() {
        let conf = Config::builder().build().unwrap();
        let msg = login(&conf, "testuser", "testpass").unwrap();
        assert_eq!(msg.checksum_body(Some(0)), "9300CNtestuser|COtestpass|CP|AY0AZ");
    }

    #[test]
    fn sc_status_body() {
        let msg = sc_status(UnitStatus::Ok, 80, 2.0).unwrap();
        assert_eq!(msg.to_sip(), "990 802.00");

        let msg = sc_status(UnitStatus::ShuttingDown, 1500, 7.0).unwrap();
        assert_eq!(msg.to_sip(), "9929992.00");

        let msg = sc_status(UnitStatus::OutOfPaper, 40, 3.0).unwrap();
        assert_eq!(msg.to_sip(), "991 403.00");
    }

    #[test]
    fn patron_status_body() {
        let msg = patron_status(&config(), DATE).unwrap();
        assert_eq!(
            msg.to_sip(),
            "2300120080228    145537AOINST|AA101010101|ACtpass|AD010101|"
        );
    }

    #[test]
    fn patron_info_body() {
        let msg = patron_info(&config(), DATE, Summary::Charged, 1, 5).unwrap();
        assert_eq!(
            msg.to_sip(),
            "6300120080228    145537  Y       AOINST|AA101010101|ACtpass|AD010101|BP00001|BQ00005|"
        );
    }

    #[test]
    fn item_info_body() {
        let msg = item_info(&config(), DATE, "30000017113634").unwrap();
        assert_eq!(
            msg.to_sip(),
            "1720080228    145537AOINST|AB30000017113634|ACtpass|"
        );
    }

    #[test]
    fn renew_body() {
        let msg = renew(&config(), DATE, "ITEM1", "A Title", "", "", false).unwrap();
        assert_eq!(
            msg.to_sip(),
            format!(
                "29NN20080228    145537{}AOINST|AA101010101|AD010101|ABITEM1|AJA Title|ACtpass|CH|BON|",
                " ".repeat(18)
            )
        );
    }

    #[test]
    fn hold_body() {
        let msg = hold(&config(), DATE, '+', "", 2, "ITEM1", "A Title", true).unwrap();
        assert_eq!(
            msg.to_sip(),
            format!(
                "15+20080228    145537BW{}|BSMAIN|BY2|AOINST|AA101010101|AD010101|ABITEM1|AJA Title|ACtpass|BOY|",
                " ".repeat(18)
            )
        );
    }

    #[test]
    fn hold_expiration_from_rfc3339() {
        let expires = util::sip_date("2008-03-01T17:00:00-05:00").unwrap();
        let msg = hold(&config(), DATE, '-', &expires, 3, "ITEM1", "", false).unwrap();

        assert!(msg
            .to_sip()
            .starts_with("15-20080228    145537BW20080301    170000|BSMAIN|BY3|"));
    }

    #[test]
    fn hold_validation() {
        let conf = config();
        assert_eq!(
            hold(&conf, DATE, '?', "", 2, "I", "T", false),
            Err(Error::InvalidHoldMode('?'))
        );
        assert_eq!(
            hold(&conf, DATE, '+', "", 0, "I", "T", false),
            Err(Error::InvalidHoldType(0))
        );
        assert_eq!(
            hold(&conf, DATE, '-', "", 10, "I", "T", false),
            Err(Error::InvalidHoldType(10))
        );
        assert!(hold(&conf, DATE, '*', "", 9, "I", "T", false).is_ok());
    }

    #[test]
    fn end_patron_session_body() {
        let msg = end_patron_session(&config(), DATE).unwrap();
        assert_eq!(
            msg.to_sip(),
            "3520080228    145537AOINST|AA101010101|ACtpass|AD010101|"
        );
    }

    #[test]
    fn block_patron_body() {
        let msg = block_patron(&config(), DATE, "Card reported lost", true).unwrap();
        assert_eq!(
            msg.to_sip(),
            "01Y20080228    145537AOINST|ALCard reported lost|AA101010101|ACtpass|"
        );
    }

    #[test]
    fn resend_has_no_sequence() {
        assert_eq!(request_resend().encode(None, "\r\n"), "97AZFEF5\r\n");
    }

    #[test]
    fn bad_date_rejected() {
        assert_eq!(
            patron_status(&config(), "2008"),
            Err(Error::FixedFieldLengthError)
        );
    }

    #[test]
    fn summary_names() {
        assert_eq!(Summary::try_from("fine").unwrap(), Summary::Fine);
        assert!(Summary::try_from("everything").is_err());
    }
}
