use super::checksum;
use super::error::Error;
use super::spec;
use super::util;
use std::fmt;

/// Fixed field with spec and value.
///
/// Values are padded to the width declared by the spec::FixedField.
/// Values wider than the column are rejected.
#[derive(PartialEq, Debug)]
pub struct FixedField {
    spec: &'static spec::FixedField,
    value: String,
}

impl FixedField {
    /// ```
    /// use sip2sc::{spec, FixedField};
    /// let ff = FixedField::new(&spec::FF_LANGUAGE, "1").unwrap();
    /// assert_eq!(ff.value(), "  1");
    /// assert!(FixedField::new(&spec::FF_LANGUAGE, "0001").is_err());
    /// assert!(FixedField::new(&spec::FF_UID_ALGO, "").is_err());
    /// ```
    pub fn new(spec: &'static spec::FixedField, value: &str) -> Result<Self, Error> {
        let value = util::sip_string(value);
        let width = spec.length;

        if value.chars().count() > width {
            log::warn!("Value too wide for fixed field {spec}: '{value}'");
            return Err(Error::FixedFieldLengthError);
        }

        let value = match spec.pad {
            spec::Pad::Exact => {
                if value.chars().count() != width {
                    log::warn!("Value does not fit fixed field {spec}: '{value}'");
                    return Err(Error::FixedFieldLengthError);
                }
                value
            }
            spec::Pad::Left => format!("{value:>width$}"),
            spec::Pad::Right => format!("{value:<width$}"),
        };

        Ok(FixedField { spec, value })
    }

    pub fn spec(&self) -> &'static spec::FixedField {
        self.spec
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// SIP Field with code and value.
#[derive(PartialEq, Debug)]
pub struct Field {
    /// 2-character code
    code: String,

    /// Field value
    value: String,
}

impl Field {
    pub fn new(code: &str, value: &str) -> Self {
        Field {
            code: code.to_string(),
            value: value.to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Create a SIP string from a field
    ///
    /// String includes the trailing "|" delimiter.
    ///
    /// ```
    /// use sip2sc::Field;
    /// use sip2sc::spec;
    /// let f = Field::new(spec::F_LOGIN_UID.code, "sip_username");
    /// assert_eq!(f.to_sip(), "CNsip_username|");
    /// ```
    pub fn to_sip(&self) -> String {
        format!("{}{}|", self.code, util::sip_string(&self.value))
    }
}

/// Outbound SIP message with message code, fixed fields, and fields.
///
/// Fields are emitted in the order they were added.
#[derive(PartialEq, Debug)]
pub struct Message {
    spec: &'static spec::Message,
    fixed_fields: Vec<FixedField>,
    fields: Vec<Field>,
}

impl Message {
    pub fn new(
        spec: &'static spec::Message,
        fixed_fields: Vec<FixedField>,
        fields: Vec<Field>,
    ) -> Self {
        Message {
            spec,
            fixed_fields,
            fields,
        }
    }

    /// Build a message from fixed field values and (code, value) pairs.
    ///
    /// Fixed field values are matched in order to the fixed fields
    /// defined for the message.
    ///
    /// ```
    /// use sip2sc::{spec, Message};
    /// let msg = Message::from_values(
    ///     &spec::M_LOGIN,
    ///     &["0", "0"],
    ///     &[("CN", "sip-user"), ("CO", "sip-pass")],
    /// ).unwrap();
    /// assert_eq!(msg.to_sip(), "9300CNsip-user|COsip-pass|");
    /// assert!(Message::from_values(&spec::M_LOGIN, &["0"], &[]).is_err());
    /// ```
    pub fn from_values(
        spec: &'static spec::Message,
        fixed_values: &[&str],
        fields: &[(&str, &str)],
    ) -> Result<Self, Error> {
        if fixed_values.len() != spec.fixed_fields.len() {
            log::warn!(
                "{} requires {} fixed fields; got {}",
                spec.label,
                spec.fixed_fields.len(),
                fixed_values.len()
            );
            return Err(Error::FixedFieldLengthError);
        }

        let mut fixed_fields = Vec::with_capacity(fixed_values.len());
        for (ff_spec, value) in spec.fixed_fields.iter().zip(fixed_values) {
            fixed_fields.push(FixedField::new(*ff_spec, *value)?);
        }

        let fields = fields
            .iter()
            .map(|(code, value)| Field::new(code, value))
            .collect();

        Ok(Message::new(spec, fixed_fields, fields))
    }

    /// Adds a Field to a message.
    pub fn add_field(&mut self, code: &str, value: &str) {
        self.fields.push(Field::new(code, value));
    }

    pub fn spec(&self) -> &'static spec::Message {
        self.spec
    }

    pub fn fields(&self) -> &Vec<Field> {
        &self.fields
    }

    pub fn fixed_fields(&self) -> &Vec<FixedField> {
        &self.fixed_fields
    }

    /// Message code, fixed fields, and "|"-terminated fields.
    ///
    /// Does not include the sequence, checksum, or terminator.
    pub fn to_sip(&self) -> String {
        let mut s = self.spec.code.to_string();

        for ff in self.fixed_fields.iter() {
            s.push_str(ff.value());
        }

        for f in self.fields.iter() {
            s.push_str(&f.to_sip());
        }

        s
    }

    /// Same as to_sip() with sensitive field values masked.
    pub fn to_sip_redacted(&self) -> String {
        let mut s = self.spec.code.to_string();

        for ff in self.fixed_fields.iter() {
            s.push_str(ff.value());
        }

        for f in self.fields.iter() {
            if spec::REDACTED_FIELDS.contains(&f.code()) && !f.value().is_empty() {
                s.push_str(&format!("{}***|", f.code()));
            } else {
                s.push_str(&f.to_sip());
            }
        }

        s
    }

    /// Message body plus the sequence and checksum tags, i.e. the
    /// exact text the checksum is computed over.
    ///
    /// With no sequence number, only the "AZ" tag is appended.
    pub fn checksum_body(&self, seq: Option<u8>) -> String {
        let mut s = self.to_sip();

        if let Some(seq) = seq {
            s.push_str(spec::F_SEQUENCE_NUMBER.code);
            s.push_str(&seq.to_string());
        }

        s.push_str(spec::F_CHECKSUM.code);
        s
    }

    /// Complete wire message: body, sequence, checksum, and terminator.
    ///
    /// ```
    /// use sip2sc::{spec, Message};
    /// let msg = Message::new(&spec::M_REQUEST_ACS_RESEND, vec![], vec![]);
    /// assert_eq!(msg.encode(None, "\r\n"), "97AZFEF5\r\n");
    /// ```
    pub fn encode(&self, seq: Option<u8>, terminator: &str) -> String {
        checksum::seal(&self.checksum_body(seq), terminator)
    }
}

/// Message display support for logging / debugging.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {}", self.spec.code, self.spec.label)?;

        for ff in self.fixed_fields.iter() {
            writeln!(f, "   {:.<35}{}", ff.spec.label, ff.value)?;
        }

        for field in self.fields.iter() {
            let label = match spec::Field::from_code(&field.code) {
                Some(spec) => spec.label,
                None => "unknown",
            };

            let value = if spec::REDACTED_FIELDS.contains(&field.code()) {
                "***"
            } else {
                field.value()
            };

            writeln!(f, "{} {:.<35}{}", field.code, label, value)?;
        }

        Ok(())
    }
}
