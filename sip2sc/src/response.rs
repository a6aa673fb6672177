//! Decoding of ACS responses into fixed and variable field values.
use super::spec;
use super::util;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Decoded fixed field value.
#[derive(PartialEq, Debug, Clone)]
pub enum FixedValue {
    Text(String),
    /// 18-character SIP date stamp, kept as received.
    Date(String),
    Count(i64),
}

impl FixedValue {
    fn decode(kind: spec::ValueKind, raw: &str) -> Self {
        match kind {
            spec::ValueKind::Text => FixedValue::Text(raw.to_string()),
            spec::ValueKind::Date => FixedValue::Date(raw.to_string()),
            spec::ValueKind::Count => FixedValue::Count(util::sip_count(raw)),
        }
    }

    /// String content of a Text or Date value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FixedValue::Text(s) | FixedValue::Date(s) => Some(s),
            FixedValue::Count(_) => None,
        }
    }

    pub fn as_count(&self) -> Option<i64> {
        match self {
            FixedValue::Count(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FixedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FixedValue::Text(s) | FixedValue::Date(s) => write!(f, "{s}"),
            FixedValue::Count(n) => write!(f, "{n}"),
        }
    }
}

/// Variable fields of a response.
///
/// A field code may repeat, so each code maps to its values in the
/// order received.  The unsplit segments are kept in `raw`, including
/// those dropped from the map for having no usable value.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct VariableFields {
    raw: Vec<String>,
    fields: BTreeMap<String, Vec<String>>,
}

impl VariableFields {
    pub fn raw(&self) -> &Vec<String> {
        &self.raw
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// All values for a field code.
    pub fn get(&self, code: &str) -> Option<&Vec<String>> {
        self.fields.get(code)
    }

    /// First value for a field code.
    pub fn first(&self, code: &str) -> Option<&str> {
        self.get(code)
            .and_then(|values| values.first())
            .map(|v| v.as_str())
    }

    fn push(&mut self, code: &str, value: &str) {
        self.fields
            .entry(code.to_string())
            .or_default()
            .push(value.to_string());
    }
}

/// Result of parsing one response.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedResponse {
    spec: &'static spec::Response,
    fixed: Vec<(&'static str, FixedValue)>,
    variable: VariableFields,
}

impl ParsedResponse {
    pub fn spec(&self) -> &'static spec::Response {
        self.spec
    }

    /// Fixed values in the order they appear in the response.
    pub fn fixed_fields(&self) -> &Vec<(&'static str, FixedValue)> {
        &self.fixed
    }

    pub fn fixed(&self, name: &str) -> Option<&FixedValue> {
        self.fixed
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Shortcut for self.fixed(name).and_then(|v| v.as_str())
    pub fn fixed_str(&self, name: &str) -> Option<&str> {
        self.fixed(name).and_then(|v| v.as_str())
    }

    /// Shortcut for self.fixed(name).and_then(|v| v.as_count())
    pub fn fixed_count(&self, name: &str) -> Option<i64> {
        self.fixed(name).and_then(|v| v.as_count())
    }

    pub fn variable(&self) -> &VariableFields {
        &self.variable
    }

    /// First value for a variable field code.
    pub fn value(&self, code: &str) -> Option<&str> {
        self.variable.first(code)
    }
}

impl fmt::Display for ParsedResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {}", self.spec.code, self.spec.label)?;

        for (name, value) in self.fixed.iter() {
            writeln!(f, "   {:.<35}{}", name, value)?;
        }

        for (code, values) in self.variable.fields.iter() {
            let label = match spec::Field::from_code(code) {
                Some(spec) => spec.label,
                None => "unknown",
            };

            for value in values {
                writeln!(f, "{} {:.<35}{}", code, label, value)?;
            }
        }

        Ok(())
    }
}

/// Final `count` bytes of the text, tolerating short input.
fn tail(text: &str, count: usize) -> Cow<'_, str> {
    let start = text.len().saturating_sub(count);
    util::substr(text, start, count)
}

/// Split the variable portion of a response into its fields.
///
/// Reads from `start` up to the "AY<digit>AZ<checksum>" trailer.  Each
/// segment's first 2 characters are the field code.  Values are
/// trimmed of control characters.  The final 5 characters of the
/// response are also recorded under "AZ".
///
/// ```
/// use sip2sc::response;
/// let vf = response::parse_variable_data("24AOinst|AEJane|AFhi|AF\x01|AY2AZF00D", 2);
/// assert_eq!(vf.get("AF").unwrap(), &vec!["hi".to_string()]);
/// assert_eq!(vf.raw().len(), 5);
/// assert_eq!(vf.first("AZ"), Some("ZF00D"));
/// ```
pub fn parse_variable_data(response: &str, start: usize) -> VariableFields {
    let mut vf = VariableFields::default();

    let end = response.len().saturating_sub(spec::TRAILER_LENGTH);
    let data = util::substr(response, start, end.saturating_sub(start));

    for part in data.split('|') {
        vf.raw.push(part.to_string());

        let (code, value) = match part.char_indices().nth(2) {
            Some((idx, _)) => part.split_at(idx),
            None => (part, ""),
        };

        let clean = value.trim_matches(|c: char| c <= '\x1f');

        if !clean.trim().is_empty() {
            vf.push(code, clean);
        }
    }

    vf.push(spec::F_CHECKSUM.code, &tail(response, spec::TRAILER_LENGTH - 2));

    vf
}

/// Parse a response according to its layout.
///
/// Trailing CR/LF characters are removed first.  A response whose
/// message code does not match the layout is parsed anyway.
pub fn parse_response(layout: &'static spec::Response, response: &str) -> ParsedResponse {
    let response = response.trim_end_matches(['\r', '\n']);

    let code = util::substr(response, 0, 2);
    if code != layout.code {
        log::warn!(
            "Parsing response code '{code}' as {} ({})",
            layout.label,
            layout.code
        );
    }

    let fixed = layout
        .fixed_fields
        .iter()
        .map(|ff| {
            let raw = util::substr(response, ff.offset, ff.length);
            (ff.name, FixedValue::decode(ff.kind, &raw))
        })
        .collect();

    ParsedResponse {
        spec: layout,
        fixed,
        variable: parse_variable_data(response, layout.variable_offset),
    }
}

/// Parse a Patron Information Response (64)
pub fn parse_patron_info_response(response: &str) -> ParsedResponse {
    parse_response(&spec::R_PATRON_INFO, response)
}

/// Parse an Item Information Response (18)
pub fn parse_item_info_response(response: &str) -> ParsedResponse {
    parse_response(&spec::R_ITEM_INFO, response)
}

/// Parse a Hold Response (16)
pub fn parse_hold_response(response: &str) -> ParsedResponse {
    parse_response(&spec::R_HOLD, response)
}

/// Parse a Renew Response (30)
pub fn parse_renew_response(response: &str) -> ParsedResponse {
    parse_response(&spec::R_RENEW, response)
}

/// Parse an End Session Response (36)
pub fn parse_end_session_response(response: &str) -> ParsedResponse {
    parse_response(&spec::R_END_SESSION, response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn end_session_response() {
        let resp = parse_end_session_response(
            "36Y20080228    145537AOWOHLERS|AAX00000000|AY9AZF474",
        );

        assert_eq!(resp.fixed_str("EndSession"), Some("Y"));
        assert_eq!(resp.fixed_str("TransactionDate"), Some("20080228    145537"));
        assert_eq!(
            resp.fixed("TransactionDate"),
            Some(&FixedValue::Date("20080228    145537".to_string()))
        );

        let vf = resp.variable();
        assert_eq!(vf.get("AO"), Some(&strings(&["WOHLERS"])));
        assert_eq!(vf.get("AA"), Some(&strings(&["X00000000"])));
        assert_eq!(vf.raw(), &strings(&["AOWOHLERS", "AAX00000000", "AY"]));
        assert_eq!(vf.get("AY"), None);
        assert_eq!(vf.get("AZ"), Some(&strings(&["ZF474"])));
    }

    #[test]
    fn end_session_response_with_terminator() {
        let resp = parse_end_session_response(
            "36Y20080228    145537AOWOHLERS|AAX00000000|AY9AZF474\r\n",
        );
        assert_eq!(resp.value("AA"), Some("X00000000"));
    }

    #[test]
    fn renew_response() {
        let resp = parse_renew_response(
            "300NUU20080228    222232AOWOHLERS|AAX00000241|ABM02400028262|\
             AJFolksongs of Britain and Ireland|AH5/23/2008,23:59|CH|\
             AFOverride required to exceed renewal limit.|AY1AZCDA5",
        );

        assert_eq!(resp.fixed_str("Ok"), Some("0"));
        assert_eq!(resp.fixed_str("RenewalOk"), Some("N"));
        assert_eq!(resp.fixed_str("Magnetic"), Some("U"));
        assert_eq!(resp.fixed_str("Desensitize"), Some("U"));
        assert_eq!(resp.fixed_str("TransactionDate"), Some("20080228    222232"));

        assert_eq!(resp.value("AB"), Some("M02400028262"));
        assert_eq!(resp.value("AJ"), Some("Folksongs of Britain and Ireland"));
        assert_eq!(resp.value("AH"), Some("5/23/2008,23:59"));
        assert_eq!(
            resp.value("AF"),
            Some("Override required to exceed renewal limit.")
        );
        // Empty CH is kept only in the raw list.
        assert_eq!(resp.value("CH"), None);
        assert!(resp.variable().raw().contains(&"CH".to_string()));
    }

    #[test]
    fn patron_info_response() {
        let text = format!(
            "64{}001{}{}{}",
            " ".repeat(14),
            "20080228    145537",
            "000200010003000000000001",
            "AOWOHLERS|AAX00000241|AEJohn Smith|ASitem1|ASitem2|BLY|AY3AZ1234"
        );

        let resp = parse_patron_info_response(&text);

        assert_eq!(resp.fixed_str("PatronStatus"), Some("              "));
        assert_eq!(resp.fixed_str("Language"), Some("001"));
        assert_eq!(resp.fixed_str("TransactionDate"), Some("20080228    145537"));
        assert_eq!(resp.fixed_count("HoldCount"), Some(2));
        assert_eq!(resp.fixed_count("OverdueCount"), Some(1));
        assert_eq!(resp.fixed_count("ChargedCount"), Some(3));
        assert_eq!(resp.fixed_count("FineCount"), Some(0));
        assert_eq!(resp.fixed_count("RecallCount"), Some(0));
        assert_eq!(resp.fixed_count("UnavailableCount"), Some(1));

        assert_eq!(resp.value("AE"), Some("John Smith"));
        assert_eq!(resp.variable().get("AS"), Some(&strings(&["item1", "item2"])));
        assert_eq!(resp.value("BL"), Some("Y"));
    }

    #[test]
    fn item_info_response() {
        let resp = parse_item_info_response(
            "1803000120080228    145537ABM02400028262|AJSome Title|AY4AZABCD",
        );

        assert_eq!(resp.fixed_count("CirculationStatus"), Some(3));
        assert_eq!(resp.fixed_count("SecurityMarker"), Some(0));
        assert_eq!(resp.fixed_count("FeeType"), Some(1));
        assert_eq!(resp.fixed_str("TransactionDate"), Some("20080228    145537"));
        assert_eq!(resp.value("AB"), Some("M02400028262"));
        assert_eq!(resp.value("AJ"), Some("Some Title"));
    }

    #[test]
    fn hold_response_offsets() {
        let resp = parse_hold_response("161Y20080228    145537BW20080301    000000|AOinst|AY5AZABCD");

        assert_eq!(resp.fixed_str("Ok"), Some("1"));
        assert_eq!(resp.fixed_str("available"), Some("Y"));
        assert_eq!(resp.fixed_str("TransactionDate"), Some("20080228    145537"));
        assert_eq!(resp.fixed_str("ExpirationDate"), Some("BW20080301    0000"));
        assert_eq!(resp.value("AO"), Some("inst"));
    }

    #[test]
    fn control_characters_trimmed() {
        let vf = parse_variable_data("36Y20080228    145537AF\x00hello\x1f|AG\x02\x03|AG   |AY1AZABCD", 21);
        assert_eq!(vf.first("AF"), Some("hello"));
        assert_eq!(vf.get("AG"), None);
        assert_eq!(vf.raw().len(), 4);
    }

    #[test]
    fn multibyte_values_keep_their_offsets() {
        // 'é' straddles the end of the ExpirationDate column.
        let resp =
            parse_hold_response("161Y20080228    145537BWBibliotheques R\u{e9}|AOinst|AY5AZABCD");

        assert_eq!(
            resp.fixed_str("ExpirationDate"),
            Some("BWBibliotheques R\u{FFFD}")
        );
        assert_eq!(resp.value("AO"), Some("inst"));
        assert_eq!(resp.value("AZ"), Some("ZABCD"));
    }

    #[test]
    fn short_response() {
        let resp = parse_end_session_response("36");
        assert_eq!(resp.fixed_str("EndSession"), Some(""));
        assert_eq!(resp.variable().raw(), &strings(&[""]));
        assert_eq!(resp.value("AZ"), Some("36"));
    }
}
