//! Permission code parsing.
//!
//! The server's permission representation is loose: a JSON-style array of
//! integers, integers separated by commas and/or whitespace, a string holding
//! nothing but separators, or nothing at all. [`parse`] normalizes all of these
//! into an ordered, duplicate-free list of in-range codes and never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AuthzFault, CodeRange, PermissionCode};

/// Externally supplied permission value, exactly as received or persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPermissionInput {
    /// Never configured.
    #[default]
    Absent,
    /// A list of loosely typed elements (numbers, numeric strings, ...).
    List(Vec<Value>),
    /// A string in any of the accepted textual forms.
    Text(String),
}

impl RawPermissionInput {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Build a list input from already numeric codes (e.g. a login response).
    pub fn from_codes<I>(codes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        Self::List(codes.into_iter().map(|c| Value::from(c.into())).collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RawPermissionInput::Absent)
    }

    /// Textual form written to persistence; `None` means "remove the key".
    pub fn to_persisted(&self) -> Option<String> {
        match self {
            RawPermissionInput::Absent => None,
            RawPermissionInput::Text(text) => Some(text.clone()),
            RawPermissionInput::List(items) => Some(Value::Array(items.clone()).to_string()),
        }
    }
}

impl From<Option<String>> for RawPermissionInput {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawPermissionInput::Absent, RawPermissionInput::Text)
    }
}

/// How much of a permission value was actually supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// No value at all.
    Absent,
    /// A value exists but carries no digit at all (e.g. `","`, `"  "`, `[]`,
    /// `[","]`, `[null]`).
    Blank,
    /// Anything else, whether or not it yields valid codes.
    Present,
}

/// Classify a raw value. Computed from the raw input, not the parse result,
/// so that `"9"` (present, out of range) differs from `","` (blank).
pub fn presence(raw: &RawPermissionInput) -> Presence {
    match raw {
        RawPermissionInput::Absent => Presence::Absent,
        RawPermissionInput::Text(text) if !text.bytes().any(|b| b.is_ascii_digit()) => {
            Presence::Blank
        }
        RawPermissionInput::List(items) if !items.iter().any(carries_digit) => Presence::Blank,
        _ => Presence::Present,
    }
}

/// Normalize a raw permission value into an ordered set of valid codes.
///
/// Never fails: anything unusable yields an empty list.
pub fn parse(raw: &RawPermissionInput, range: CodeRange) -> Vec<PermissionCode> {
    match try_parse(raw, range) {
        Ok(codes) => codes,
        Err(fault) => {
            tracing::debug!(fault = fault.kind(), error = %fault, "discarding permission input");
            Vec::new()
        }
    }
}

fn try_parse(raw: &RawPermissionInput, range: CodeRange) -> Result<Vec<PermissionCode>, AuthzFault> {
    match raw {
        RawPermissionInput::Absent => Ok(Vec::new()),
        RawPermissionInput::List(items) => Ok(collect_codes(items.iter().map(coerce_value), range)),
        RawPermissionInput::Text(text) => parse_text(text, range),
    }
}

fn parse_text(text: &str, range: CodeRange) -> Result<Vec<PermissionCode>, AuthzFault> {
    let trimmed = text.trim();
    if trimmed.is_empty() || is_separator_only(trimmed) {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        match serde_json::from_str::<Vec<Value>>(trimmed) {
            Ok(items) => return Ok(collect_codes(items.iter().map(coerce_value), range)),
            Err(err) => {
                tracing::debug!(error = %err, "bracketed permission input is not a JSON array; splitting tokens");
            }
        }
    }

    let tokens: Vec<&str> = trimmed
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    let values: Vec<Option<i64>> = tokens.iter().map(|t| coerce_token(t)).collect();
    if values.iter().all(Option::is_none) {
        return Err(AuthzFault::malformed(format!("no numeric token in {trimmed:?}")));
    }

    Ok(collect_codes(values.into_iter(), range))
}

/// True when the text has no digit at all (bare commas, quotes, brackets...).
fn is_separator_only(text: &str) -> bool {
    !text.bytes().any(|b| b.is_ascii_digit())
}

/// List counterpart of the text digit test, so `[","]` and `"[\",\"]"` classify alike.
fn carries_digit(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.bytes().any(|b| b.is_ascii_digit()),
        Value::Array(items) => items.iter().any(carries_digit),
        Value::Object(map) => map
            .iter()
            .any(|(k, v)| k.bytes().any(|b| b.is_ascii_digit()) || carries_digit(v)),
        Value::Null | Value::Bool(_) => false,
    }
}

fn coerce_token(token: &str) -> Option<i64> {
    let token = token.trim_matches(|c: char| matches!(c, '[' | ']' | '"' | '\''));
    if token.is_empty() {
        return None;
    }
    if let Ok(value) = token.parse::<i64>() {
        return Some(value);
    }
    token.parse::<f64>().ok().and_then(integral)
}

fn coerce_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => coerce_token(s.trim()),
        _ => None,
    }
}

/// Accept only finite floats with no fractional part.
fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(value as i64)
    } else {
        None
    }
}

fn collect_codes<I>(values: I, range: CodeRange) -> Vec<PermissionCode>
where
    I: Iterator<Item = Option<i64>>,
{
    let mut codes: Vec<PermissionCode> = Vec::new();
    for code in values.flatten().filter_map(|v| range.accept(v)) {
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn codes(values: &[u16]) -> Vec<PermissionCode> {
        values.iter().copied().map(PermissionCode::new).collect()
    }

    fn parse_str(text: &str) -> Vec<PermissionCode> {
        parse(&RawPermissionInput::text(text), CodeRange::default())
    }

    #[test]
    fn missing_key_is_absent_but_empty_string_is_not() {
        assert!(RawPermissionInput::from(None).is_absent());
        let empty = RawPermissionInput::from(Some(String::new()));
        assert!(!empty.is_absent());
        assert_eq!(presence(&empty), Presence::Blank);
        assert_eq!(empty.to_persisted().as_deref(), Some(""));
    }

    #[test]
    fn absent_parses_to_nothing() {
        assert!(parse(&RawPermissionInput::Absent, CodeRange::default()).is_empty());
        assert_eq!(presence(&RawPermissionInput::Absent), Presence::Absent);
    }

    #[test]
    fn comma_and_whitespace_separated_codes() {
        assert_eq!(parse_str("1,4"), codes(&[1, 4]));
        assert_eq!(parse_str(" 3  1,\t5 "), codes(&[3, 1, 5]));
        assert_eq!(parse_str("2,,,4"), codes(&[2, 4]));
    }

    #[test]
    fn json_array_text() {
        assert_eq!(parse_str("[1,5]"), codes(&[1, 5]));
        assert_eq!(parse_str("[\"2\", 3.0, null]"), codes(&[2, 3]));
    }

    #[test]
    fn broken_brackets_fall_back_to_tokens() {
        assert_eq!(parse_str("[1,,5"), codes(&[1, 5]));
        assert_eq!(parse_str("[4 2]"), codes(&[4, 2]));
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        assert_eq!(parse_str("4,1,4,1,2"), codes(&[4, 1, 2]));
    }

    #[test]
    fn out_of_range_and_junk_are_dropped() {
        assert_eq!(parse_str("0,1,6,99,-2,x,2.5,3"), codes(&[1, 3]));
        assert!(parse_str("9").is_empty());
        assert!(parse_str("1x").is_empty());
    }

    #[test]
    fn separator_only_strings_are_blank() {
        for raw in [",", "\",\"", "  ", "", ", ,", "[]"] {
            let input = RawPermissionInput::text(raw);
            assert!(parse(&input, CodeRange::default()).is_empty(), "{raw:?}");
            assert_eq!(presence(&input), Presence::Blank, "{raw:?}");
        }
    }

    #[test]
    fn out_of_range_digits_are_present_not_blank() {
        assert_eq!(presence(&RawPermissionInput::text("9")), Presence::Present);
    }

    #[test]
    fn list_input_coerces_elements() {
        let raw = RawPermissionInput::List(vec![json!(5), json!("1"), json!(true), json!(5), json!(7)]);
        assert_eq!(parse(&raw, CodeRange::default()), codes(&[5, 1]));
        assert_eq!(presence(&RawPermissionInput::List(Vec::new())), Presence::Blank);
    }

    #[test]
    fn digit_free_lists_are_blank_like_their_text_form() {
        for items in [vec![json!(",")], vec![json!(null)], vec![json!("")], vec![json!(true), json!([])]] {
            let text = RawPermissionInput::text(json!(items).to_string());
            let list = RawPermissionInput::List(items);
            assert_eq!(presence(&list), Presence::Blank, "{list:?}");
            assert_eq!(presence(&list), presence(&text), "{text:?}");
        }
        assert_eq!(presence(&RawPermissionInput::List(vec![json!("abc1")])), Presence::Present);
        assert_eq!(presence(&RawPermissionInput::List(vec![json!(9)])), Presence::Present);
    }

    #[test]
    fn wider_range_admits_new_codes() {
        let range = CodeRange::new(1, 8).unwrap();
        assert_eq!(parse(&RawPermissionInput::text("7,2"), range), codes(&[7, 2]));
    }

    #[test]
    fn persisted_form_of_list_is_json() {
        let raw = RawPermissionInput::from_codes([1i64, 4]);
        assert_eq!(raw.to_persisted().as_deref(), Some("[1,4]"));
        assert_eq!(RawPermissionInput::Absent.to_persisted(), None);
    }

    proptest! {
        /// Property: parsing never panics and always yields unique in-range codes.
        #[test]
        fn parse_is_total_and_normalized(text in ".{0,40}") {
            let out = parse_str(&text);
            let mut seen = std::collections::HashSet::new();
            for code in &out {
                prop_assert!((1..=5).contains(&code.get()));
                prop_assert!(seen.insert(*code));
            }
        }
    }
}
