//! Lenient readers for loosely typed JSON coming from webhooks and from
//! ledger files written by earlier deployments.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

/// Non-empty trimmed string, or `None` for missing, null, blank or non-string values.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Integer quantity from a JSON integer or an integer string. Negative and
/// fractional values are rejected.
pub fn quantity(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|raw| u32::try_from(raw).ok()),
        Value::String(raw) => raw.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Monetary amount from a JSON number or a numeric string.
pub fn amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            if let Some(raw) = number.as_i64() {
                Some(Decimal::from(raw))
            } else {
                number.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{amount, quantity, text};

    #[test]
    fn quantity_accepts_integers_and_integer_strings() {
        assert_eq!(quantity(&json!(12)), Some(12));
        assert_eq!(quantity(&json!(" 7 ")), Some(7));
        assert_eq!(quantity(&json!(-3)), None);
        assert_eq!(quantity(&json!(2.5)), None);
        assert_eq!(quantity(&json!("douze")), None);
        assert_eq!(quantity(&json!(null)), None);
    }

    #[test]
    fn amount_reads_numbers_and_strings() {
        assert_eq!(amount(&json!(150)), Some(Decimal::new(150, 0)));
        assert_eq!(amount(&json!("42.50")), Some(Decimal::new(4250, 2)));
        assert_eq!(amount(&json!(true)), None);
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let payload = json!({"vendeur": "  ", "job": "kebab"});
        assert_eq!(text(payload.get("vendeur")), None);
        assert_eq!(text(payload.get("job")).as_deref(), Some("kebab"));
        assert_eq!(text(payload.get("absent")), None);
    }
}
