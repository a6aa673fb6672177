use super::response::{FixedValue, ParsedResponse};
use json;

impl ParsedResponse {
    /// Translate a parsed response into a JSON object.
    ///
    /// Variable fields include the unsplit segments under "Raw".
    ///
    /// ```
    /// use sip2sc::response;
    /// use json;
    ///
    /// let resp = response::parse_end_session_response(
    ///     "36Y20080228    145537AOWOHLERS|AAX00000000|AY9AZF474");
    ///
    /// let expected = json::object! {
    ///     "code": "36",
    ///     "fixed": {"EndSession": "Y", "TransactionDate": "20080228    145537"},
    ///     "variable": {
    ///         "Raw": ["AOWOHLERS", "AAX00000000", "AY"],
    ///         "AA": ["X00000000"],
    ///         "AO": ["WOHLERS"],
    ///         "AZ": ["ZF474"]
    ///     }
    /// };
    ///
    /// assert_eq!(resp.to_json_value(), expected);
    /// ```
    pub fn to_json_value(&self) -> json::JsonValue {
        let mut fixed = json::JsonValue::new_object();

        for (name, value) in self.fixed_fields().iter() {
            fixed[*name] = match value {
                FixedValue::Text(s) | FixedValue::Date(s) => s.as_str().into(),
                FixedValue::Count(n) => (*n).into(),
            };
        }

        let mut variable = json::JsonValue::new_object();
        variable["Raw"] = self.variable().raw().clone().into();

        for (code, values) in self.variable().fields().iter() {
            variable[code.as_str()] = values.clone().into();
        }

        json::object! {
            "code": self.spec().code,
            "fixed": fixed,
            "variable": variable
        }
    }

    /// Translate a parsed response into a JSON string.
    pub fn to_json(&self) -> String {
        self.to_json_value().dump()
    }
}
