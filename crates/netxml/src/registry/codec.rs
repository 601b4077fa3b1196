//! Text-to-value coercion for registry fields.

use crate::model::{
    ClientType, Encryption, FrequencyRecord, MacAddress, NetworkType, Timestamp,
};

/// How the raw text of an attribute or leaf element becomes a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// Trimmed text.
    Text,
    /// Text kept exactly as written; only empty text is absent.
    Verbatim,
    UInt,
    Int,
    Float,
    Bool,
    Time,
    Mac,
    Frequency,
    Encryption,
    NetworkType,
    ClientType,
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    UInt(u64),
    Int(i64),
    Float(f64),
    Bool(bool),
    Time(Timestamp),
    Mac(MacAddress),
    Frequency(FrequencyRecord),
    Encryption(Vec<Encryption>),
    NetworkType(NetworkType),
    ClientType(ClientType),
}

impl Codec {
    /// Decode raw text. Blank input means the field is absent (`Ok(None)`),
    /// except for [`Codec::Verbatim`] where only empty input is.
    pub fn decode(self, raw: &str) -> Result<Option<Value>, String> {
        if self == Codec::Verbatim {
            return Ok((!raw.is_empty()).then(|| Value::Text(raw.to_string())));
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let value = match self {
            Codec::Text => Value::Text(trimmed.to_string()),
            Codec::Verbatim => Value::Text(raw.to_string()),
            Codec::UInt => Value::UInt(
                trimmed
                    .parse()
                    .map_err(|_| format!("expected an unsigned integer, got {trimmed:?}"))?,
            ),
            Codec::Int => Value::Int(
                trimmed
                    .parse()
                    .map_err(|_| format!("expected an integer, got {trimmed:?}"))?,
            ),
            Codec::Float => Value::Float(
                trimmed
                    .parse()
                    .map_err(|_| format!("expected a number, got {trimmed:?}"))?,
            ),
            Codec::Bool => Value::Bool(parse_bool(trimmed)?),
            Codec::Time => Value::Time(trimmed.parse().map_err(|e| format!("{e}"))?),
            Codec::Mac => Value::Mac(trimmed.parse().map_err(|e| format!("{e}"))?),
            Codec::Frequency => Value::Frequency(trimmed.parse().map_err(|e| format!("{e}"))?),
            Codec::Encryption => Value::Encryption(Encryption::parse_list(trimmed)),
            Codec::NetworkType => Value::NetworkType(NetworkType::parse(trimmed)),
            Codec::ClientType => Value::ClientType(ClientType::parse(trimmed)),
        };
        Ok(Some(value))
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    if s.eq_ignore_ascii_case("true") || s == "1" {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") || s == "0" {
        Ok(false)
    } else {
        Err(format!("expected true or false, got {s:?}"))
    }
}

/// Default predicate: any successfully decoded value is acceptable.
pub fn any_value(_: &Value) -> bool {
    true
}

/// 802.11 channel numbers (2.4, 5 and 6 GHz bands) fit in a byte.
pub fn channel_number(value: &Value) -> bool {
    matches!(value, Value::UInt(n) if *n <= 255)
}

/// dBm and RSSI readings are stored as `i32`.
pub fn signal_level(value: &Value) -> bool {
    matches!(value, Value::Int(n) if i32::try_from(*n).is_ok())
}

pub fn latitude(value: &Value) -> bool {
    matches!(value, Value::Float(v) if (-90.0..=90.0).contains(v))
}

pub fn longitude(value: &Value) -> bool {
    matches!(value, Value::Float(v) if (-180.0..=180.0).contains(v))
}

pub fn finite(value: &Value) -> bool {
    matches!(value, Value::Float(v) if v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_absent() {
        assert_eq!(Codec::UInt.decode("  "), Ok(None));
        assert_eq!(Codec::Verbatim.decode(""), Ok(None));
    }

    #[test]
    fn test_numbers_are_strict() {
        assert_eq!(Codec::UInt.decode(" 6 "), Ok(Some(Value::UInt(6))));
        assert!(Codec::UInt.decode("-6").is_err());
        assert!(Codec::UInt.decode("6a").is_err());
        assert_eq!(Codec::Int.decode("-79"), Ok(Some(Value::Int(-79))));
        assert_eq!(Codec::Float.decode("54.000000"), Ok(Some(Value::Float(54.0))));
    }

    #[test]
    fn test_verbatim_keeps_spaces() {
        assert_eq!(
            Codec::Verbatim.decode(" cafe wifi "),
            Ok(Some(Value::Text(" cafe wifi ".into())))
        );
        assert_eq!(
            Codec::Text.decode(" cafe wifi "),
            Ok(Some(Value::Text("cafe wifi".into())))
        );
    }

    #[test]
    fn test_verbatim_whitespace_is_a_value() {
        assert_eq!(Codec::Verbatim.decode(" "), Ok(Some(Value::Text(" ".into()))));
        assert_eq!(Codec::Text.decode(" "), Ok(None));
    }

    #[test]
    fn test_mac_errors_are_reported() {
        let err = Codec::Mac.decode("not-a-mac").unwrap_err();
        assert!(err.contains("not-a-mac"));
    }

    #[test]
    fn test_bool_forms() {
        assert_eq!(Codec::Bool.decode("True"), Ok(Some(Value::Bool(true))));
        assert_eq!(Codec::Bool.decode("false"), Ok(Some(Value::Bool(false))));
        assert!(Codec::Bool.decode("maybe").is_err());
    }

    #[test]
    fn test_predicates() {
        assert!(channel_number(&Value::UInt(165)));
        assert!(!channel_number(&Value::UInt(1000)));
        assert!(signal_level(&Value::Int(-90)));
        assert!(!signal_level(&Value::Int(i64::MAX)));
        assert!(latitude(&Value::Float(-36.85)));
        assert!(!latitude(&Value::Float(120.0)));
        assert!(!finite(&Value::Float(f64::NAN)));
    }
}
