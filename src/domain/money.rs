use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }
    if !units_str.chars().all(|c| c.is_ascii_digit())
        || !decimal_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseCentsError::InvalidFormat(input.to_string()));
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str
            .parse()
            .map_err(|_| ParseCentsError::OutOfRange(input.to_string()))?
    };

    // Pad or truncate the fractional part to exactly 2 digits
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => decimal_str.parse::<i64>().unwrap_or(0) * 10,
        _ => decimal_str[..2].parse().unwrap_or(0),
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or_else(|| ParseCentsError::OutOfRange(input.to_string()))?;

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCentsError {
    #[error("invalid money format: '{0}'")]
    InvalidFormat(String),

    #[error("money amount out of range: '{0}'")]
    OutOfRange(String),
}

/// Serde adapter writing cents as a JSON number in currency units (1250 -> 12.5).
///
/// Only amounts up to [`cents_as_units::MAX_CENTS`] in magnitude survive the
/// trip through a floating-point unit value exactly; larger ones are refused
/// in both directions.
pub mod cents_as_units {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    use super::Cents;

    pub const MAX_CENTS: Cents = 1 << 50;

    pub fn serialize<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
        if cents.unsigned_abs() > MAX_CENTS.unsigned_abs() {
            return Err(ser::Error::custom(format!(
                "amount {} cents is too large to write as units",
                cents
            )));
        }
        serializer.serialize_f64(*cents as f64 / 100.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Cents, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;

        let cents = match number.as_i64() {
            Some(units) => units.checked_mul(100),
            None => number
                .as_f64()
                .map(|units| (units * 100.0).round())
                .filter(|cents| cents.abs() <= MAX_CENTS as f64)
                .map(|cents| cents as Cents),
        };

        cents
            .filter(|cents| cents.unsigned_abs() <= MAX_CENTS.unsigned_abs())
            .ok_or_else(|| de::Error::custom(format!("amount {} is out of range", number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents(" 12.5 "), Ok(1250));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("+3"), Ok(300));
        assert_eq!(parse_cents("-0.50"), Ok(-50));
        assert_eq!(parse_cents("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("12.34.56").is_err());
        assert!(parse_cents("12.-5").is_err());
        assert!(parse_cents("").is_err());
        assert!(parse_cents(".").is_err());
        assert!(matches!(
            parse_cents("99999999999999999999"),
            Err(ParseCentsError::OutOfRange(_))
        ));
    }

    #[derive(Debug, serde::Serialize, serde::Deserialize)]
    struct Wrapper {
        #[serde(with = "cents_as_units")]
        amount: Cents,
    }

    #[test]
    fn test_cents_as_units_serde() {
        let json = serde_json::to_string(&Wrapper { amount: 1250 }).unwrap();
        assert_eq!(json, r#"{"amount":12.5}"#);

        let parsed: Wrapper = serde_json::from_str(r#"{"amount":19.99}"#).unwrap();
        assert_eq!(parsed.amount, 1999);
    }

    #[test]
    fn test_cents_as_units_whole_units_are_exact() {
        let parsed: Wrapper = serde_json::from_str(r#"{"amount":9007199254740}"#).unwrap();
        assert_eq!(parsed.amount, 900719925474000);

        let json = serde_json::to_string(&Wrapper { amount: 900719925474001 }).unwrap();
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount, 900719925474001);
    }

    #[test]
    fn test_cents_as_units_refuses_out_of_range() {
        assert!(serde_json::to_string(&Wrapper { amount: i64::MAX }).is_err());
        assert!(serde_json::to_string(&Wrapper { amount: i64::MIN }).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"amount":1e300}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"amount":92233720368547758}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{"amount":"12"}"#).is_err());
    }
}
