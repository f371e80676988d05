//! Monetary value parsing.
//!
//! Source platforms send money as decimal strings ("19.99"), sometimes as
//! bare numbers, and sometimes not at all. Amounts are stored as integer
//! cents; anything absent or unparseable defaults to zero rather than
//! failing the event.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Converts a JSON value to integer cents. Unparseable input yields 0.
pub fn cents_from_json(value: &Value) -> i64 {
    match value {
        Value::String(s) => cents_from_str(s),
        Value::Number(n) => cents_from_str(&n.to_string()),
        _ => 0,
    }
}

fn cents_from_str(raw: &str) -> i64 {
    Decimal::from_str(raw.trim())
        .ok()
        .and_then(|amount| (amount * Decimal::ONE_HUNDRED).round().to_i64())
        .unwrap_or(0)
}

/// Serde helper: deserializes a money field into cents, defaulting to 0.
pub fn deserialize_cents<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(cents_from_json).unwrap_or(0))
}

/// Serde helper: like [`deserialize_cents`] but keeps absence observable.
/// A present-but-garbage value still parses to `Some(0)`.
pub fn deserialize_optional_cents<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(cents_from_json(&v)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimal_string() {
        assert_eq!(cents_from_json(&json!("19.99")), 1999);
        assert_eq!(cents_from_json(&json!("0.10")), 10);
        assert_eq!(cents_from_json(&json!("100")), 10000);
    }

    #[test]
    fn test_number() {
        assert_eq!(cents_from_json(&json!(19.99)), 1999);
        assert_eq!(cents_from_json(&json!(5)), 500);
    }

    #[test]
    fn test_rounds_sub_cent() {
        assert_eq!(cents_from_json(&json!("1.005")), 100);
        assert_eq!(cents_from_json(&json!("1.015")), 102);
    }

    #[test]
    fn test_defaults_to_zero() {
        assert_eq!(cents_from_json(&json!("")), 0);
        assert_eq!(cents_from_json(&json!("abc")), 0);
        assert_eq!(cents_from_json(&json!(null)), 0);
        assert_eq!(cents_from_json(&json!({"amount": "1.00"})), 0);
    }

    #[test]
    fn test_negative() {
        assert_eq!(cents_from_json(&json!("-4.50")), -450);
    }
}
