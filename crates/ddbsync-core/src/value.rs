//! Scanned record values.
//!
//! Records coming out of a schemaless store carry dynamically-typed
//! attributes. They are modelled here as a tagged union so the rest of the
//! engine never has to inspect runtime types.

use std::borrow::Cow;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// A single attribute value from a source record.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    /// Integral number.
    Int(i64),
    /// Non-integral number that round-trips through `f64`.
    Float(f64),
    /// Number kept in its source text form, either out of `i64` range or
    /// carrying more digits than `f64` preserves.
    Number(String),
    /// String value.
    Text(String),
    /// Boolean value.
    Bool(bool),
    /// Explicit null / absent value.
    Missing,
    /// Structured attribute (map, list, set, binary) rendered as JSON text.
    Nested(String),
}

impl ScalarValue {
    /// Returns the canonical text form of the value.
    ///
    /// Integral floats print without a fractional part, so `5.0` and `5`
    /// share the text form `"5"`.
    #[must_use]
    pub fn canonical_text(&self) -> Cow<'_, str> {
        match self {
            Self::Int(n) => Cow::Owned(n.to_string()),
            Self::Float(f) => Cow::Owned(format_float(*f)),
            Self::Text(s) | Self::Nested(s) | Self::Number(s) => Cow::Borrowed(s),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Missing => Cow::Borrowed(""),
        }
    }

    /// Returns the length of the canonical text form, in characters.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.canonical_text().chars().count()
    }

    /// Builds a value from the decimal text of a number.
    ///
    /// Integers in `i64` range become [`ScalarValue::Int`] and short
    /// decimals become [`ScalarValue::Float`]. Anything else keeps its exact
    /// digits as [`ScalarValue::Number`]. Text that is not a number becomes
    /// [`ScalarValue::Text`].
    #[must_use]
    pub fn from_number_text(text: &str) -> Self {
        if let Ok(n) = text.parse::<i64>() {
            return Self::Int(n);
        }
        if !is_number_syntax(text) {
            return Self::Text(String::from(text));
        }
        let exact = significant_digits(text) <= F64_EXACT_DIGITS;
        match text.parse::<f64>() {
            Ok(f) if exact && f.is_finite() => Self::Float(f),
            _ => Self::Number(String::from(text)),
        }
    }

    /// Returns true for [`ScalarValue::Missing`].
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Decimal digits any `f64` reproduces exactly (`DBL_DIG`).
const F64_EXACT_DIGITS: usize = 15;

fn is_number_syntax(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e.strip_prefix(['-', '+']).unwrap_or(e))),
        None => (unsigned, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    !(whole.is_empty() && fraction.is_empty())
        && digits(whole)
        && digits(fraction)
        && exponent.is_none_or(|e| !e.is_empty() && digits(e))
}

/// Counts the significant digits of the mantissa. Integral mantissas
/// count every digit; trailing fraction zeros are ignored.
fn significant_digits(text: &str) -> usize {
    let mantissa = text
        .split(['e', 'E'])
        .next()
        .unwrap_or(text)
        .trim_start_matches(['-', '+']);
    let digits: String = match mantissa.split_once('.') {
        Some((whole, fraction)) => format!("{whole}{}", fraction.trim_end_matches('0')),
        None => String::from(mantissa),
    };
    digits.trim_start_matches('0').len()
}

fn format_float(f: f64) -> String {
    if f == 0.0 {
        return String::from("0");
    }
    // Integral values up to 1e21 print without a fraction.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        format!("{f}")
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

impl From<serde_json::Value> for ScalarValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Missing,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::from_number_text(&n.to_string()), Self::Int),
            Value::String(s) => Self::Text(s),
            nested @ (Value::Array(_) | Value::Object(_)) => Self::Nested(nested.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::Text(String::from(value))
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for ScalarValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// An ordered mapping from field name to value.
///
/// Field order is the order in which fields were inserted (or appeared in
/// the source document). Inserting an existing name replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRecord {
    fields: Vec<(String, ScalarValue)>,
}

impl SourceRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field, replacing the value of an existing field with the
    /// same name without changing its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ScalarValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns true if the record has a field with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over fields in enumeration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &ScalarValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterates over fields in reverse enumeration order.
    ///
    /// This is the order in which a record's fields become columns and
    /// appear in its upsert statement.
    pub fn iter_reversed(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.iter().rev()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<ScalarValue>> FromIterator<(K, V)> for SourceRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = SourceRecord;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of attribute names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut record = SourceRecord::new();
        while let Some((name, value)) = map.next_entry::<String, ScalarValue>()? {
            record.insert(name, value);
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for SourceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}
