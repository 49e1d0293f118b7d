//! Type classification and the promotion lattice.

use serde::{Deserialize, Serialize};

use crate::value::ScalarValue;

/// Semantic type category of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    /// Pure-digit values.
    Integer,
    /// Numbers that are not pure digits (signed, fractional).
    Decimal,
    /// Unbounded text.
    Text,
    /// Bounded text. Only produced by the post-inference pass.
    Varchar,
    /// Booleans.
    Boolean,
}

impl TypeCategory {
    /// Returns the lowercase category name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::Varchar => "varchar",
            Self::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Classifies a single value.
///
/// Strings count as integers only when the whole, untrimmed string is ASCII
/// digits: `"12"` is an integer, `"-12"`, `"1.5"` and `" 12"` are text.
/// Numbers are integers when their canonical text form is pure digits, so a
/// negative number such as `-3` classifies as decimal.
#[must_use]
pub fn classify(value: &ScalarValue) -> TypeCategory {
    match value {
        ScalarValue::Bool(_) => TypeCategory::Boolean,
        ScalarValue::Text(s) => {
            if !s.trim().is_empty() && is_all_digits(s) {
                TypeCategory::Integer
            } else {
                TypeCategory::Text
            }
        }
        ScalarValue::Int(_) | ScalarValue::Float(_) | ScalarValue::Number(_) => {
            if is_all_digits(&value.canonical_text()) {
                TypeCategory::Integer
            } else {
                TypeCategory::Decimal
            }
        }
        ScalarValue::Missing | ScalarValue::Nested(_) => TypeCategory::Text,
    }
}

/// Merges a newly observed category into a column's current category.
///
/// The numeric chain `integer < decimal < text` only moves upward; `text`
/// never changes once reached. `boolean` sits outside the chain: a boolean
/// column ignores every other category, and a numeric column ignores
/// booleans.
#[must_use]
pub fn promote(current: TypeCategory, observed: TypeCategory) -> TypeCategory {
    match (current, observed) {
        (TypeCategory::Integer, TypeCategory::Decimal) => TypeCategory::Decimal,
        (TypeCategory::Integer | TypeCategory::Decimal, TypeCategory::Text) => TypeCategory::Text,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TypeCategory::{Boolean, Decimal, Integer, Text};

    #[test]
    fn test_classify_strings() {
        assert_eq!(classify(&ScalarValue::from("12345")), Integer);
        assert_eq!(classify(&ScalarValue::from("12.0")), Text);
        assert_eq!(classify(&ScalarValue::from("-7")), Text);
        assert_eq!(classify(&ScalarValue::from(" 12")), Text);
        assert_eq!(classify(&ScalarValue::from("")), Text);
        assert_eq!(classify(&ScalarValue::from("   ")), Text);
        assert_eq!(classify(&ScalarValue::from("abc")), Text);
    }

    #[test]
    fn test_classify_numbers() {
        assert_eq!(classify(&ScalarValue::Int(5)), Integer);
        assert_eq!(classify(&ScalarValue::Int(0)), Integer);
        assert_eq!(classify(&ScalarValue::Int(-3)), Decimal);
        assert_eq!(classify(&ScalarValue::Float(2.5)), Decimal);
        assert_eq!(classify(&ScalarValue::Float(5.0)), Integer);
    }

    #[test]
    fn test_classify_wide_numbers() {
        let wide_int = ScalarValue::from_number_text("18446744073709551615");
        let long_decimal = ScalarValue::from_number_text("0.12345678901234567891");
        assert_eq!(classify(&wide_int), Integer);
        assert_eq!(classify(&long_decimal), Decimal);
        assert_eq!(long_decimal.text_len(), 22);
    }

    #[test]
    fn test_classify_other_kinds() {
        assert_eq!(classify(&ScalarValue::Bool(true)), Boolean);
        assert_eq!(classify(&ScalarValue::Missing), Text);
        assert_eq!(classify(&ScalarValue::Nested("[1,2]".into())), Text);
    }

    #[test]
    fn test_promote_lattice() {
        assert_eq!(promote(Integer, Decimal), Decimal);
        assert_eq!(promote(Integer, Text), Text);
        assert_eq!(promote(Decimal, Integer), Decimal);
        assert_eq!(promote(Text, Integer), Text);
        assert_eq!(promote(Text, Decimal), Text);
        assert_eq!(promote(Boolean, Text), Boolean);
        assert_eq!(promote(Boolean, Integer), Boolean);
        assert_eq!(promote(Integer, Boolean), Integer);
        assert_eq!(promote(Integer, Integer), Integer);
    }

    #[test]
    fn test_text_absorbs_decimal() {
        assert_eq!(promote(Decimal, Text), Text);
        assert_eq!(promote(Decimal, Boolean), Decimal);
    }
}
