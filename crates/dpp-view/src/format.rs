//! Display formatting for scalar values

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Number, Value};

use crate::model::PropertyType;

/// Format a value for a value card.
pub fn format_value(value: &Value, ty: PropertyType) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(number) => format_number(number),
        Value::String(text) if ty.is_numeric() => format_numeric_text(text),
        Value::String(text) => format_datetime(text).unwrap_or_else(|| text.clone()),
        Value::Array(items) if items.iter().all(is_scalar) => format_list(items),
        structured => structured.to_string(),
    }
}

/// Numbers sent as strings, left verbatim when they do not parse.
fn format_numeric_text(text: &str) -> String {
    match text.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => format_float(f),
        _ => text.to_string(),
    }
}

fn format_list(items: &[Value]) -> String {
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| format_value(item, PropertyType::of_value(item)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn format_number(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        group_thousands(&i.unsigned_abs().to_string(), i < 0)
    } else if let Some(u) = number.as_u64() {
        group_thousands(&u.to_string(), false)
    } else {
        number
            .as_f64()
            .map(format_float)
            .unwrap_or_else(|| number.to_string())
    }
}

/// At most two decimals, trailing zeros trimmed.
fn format_float(f: f64) -> String {
    let fixed = format!("{:.2}", f.abs());
    let fixed = fixed.trim_end_matches('0').trim_end_matches('.');
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed, None),
    };
    let negative = f < 0.0 && fixed != "0";
    let mut out = group_thousands(int_part, negative);
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str, negative: bool) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        out.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}

/// `YYYY-MM-DD HH:MM` for date-time strings. Plain dates are left alone.
fn format_datetime(text: &str) -> Option<String> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.format("%Y-%m-%d %H:%M").to_string());
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|datetime| datetime.format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booleans() {
        assert_eq!(format_value(&json!(true), PropertyType::Boolean), "Yes");
        assert_eq!(format_value(&json!(false), PropertyType::Boolean), "No");
    }

    #[test]
    fn test_integers() {
        assert_eq!(format_value(&json!(42), PropertyType::Integer), "42");
        assert_eq!(
            format_value(&json!(1234567), PropertyType::Integer),
            "1,234,567"
        );
        assert_eq!(format_value(&json!(-1500), PropertyType::Number), "-1,500");
        assert_eq!(format_value(&json!(999), PropertyType::Number), "999");
    }

    #[test]
    fn test_floats() {
        assert_eq!(format_value(&json!(12.5), PropertyType::Number), "12.5");
        assert_eq!(format_value(&json!(3.14159), PropertyType::Number), "3.14");
        assert_eq!(format_value(&json!(2.0), PropertyType::Number), "2");
        assert_eq!(
            format_value(&json!(12345.678), PropertyType::Number),
            "12,345.68"
        );
        assert_eq!(format_value(&json!(-0.001), PropertyType::Number), "0");
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(
            format_value(&json!("1500.50"), PropertyType::Number),
            "1,500.5"
        );
        assert_eq!(format_value(&json!("n/a"), PropertyType::Number), "n/a");
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            format_value(&json!("2024-04-02T10:15:00Z"), PropertyType::String),
            "2024-04-02 10:15"
        );
        assert_eq!(
            format_value(&json!("2024-04-02T10:15:00.123"), PropertyType::String),
            "2024-04-02 10:15"
        );
        assert_eq!(
            format_value(&json!("2024-04-02"), PropertyType::String),
            "2024-04-02"
        );
        assert_eq!(format_value(&json!("Saw"), PropertyType::String), "Saw");
    }

    #[test]
    fn test_arrays_and_records() {
        assert_eq!(
            format_value(&json!(["a", 1, true, null]), PropertyType::Array),
            "a, 1, Yes"
        );
        assert_eq!(
            format_value(&json!({"a": 1}), PropertyType::Object),
            r#"{"a":1}"#
        );
    }
}
