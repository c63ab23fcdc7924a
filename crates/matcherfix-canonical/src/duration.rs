use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const YEAR: u64 = 365 * DAY;

/// Units from largest to smallest; a duration must use them in this order.
const UNITS: [(&str, u64); 7] = [
    ("y", YEAR),
    ("w", WEEK),
    ("d", DAY),
    ("h", HOUR),
    ("m", MINUTE),
    ("s", SECOND),
    ("ms", 1),
];

/// Largest duration whose nanosecond count fits an `i64`.
const MAX_MILLIS: u64 = i64::MAX as u64 / 1_000_000;

/// Errors raised while parsing a duration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The input was the empty string.
    #[error("empty duration string")]
    Empty,
    /// The input is not a sequence of `<number><unit>` pairs.
    #[error("not a valid duration string: {0:?}")]
    Invalid(String),
    /// A unit is missing or unknown.
    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit {
        /// Offending unit.
        unit: String,
        /// Whole input.
        input: String,
    },
    /// Units are repeated or not in decreasing order.
    #[error("units must go from biggest to smallest in duration {0:?}")]
    UnitOrder(String),
    /// The value does not fit the supported range.
    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// Duration written like `1h30m` or `5m`, stored with millisecond precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(u64);

impl Duration {
    /// Zero-length duration.
    pub const ZERO: Duration = Duration(0);

    /// Builds a duration from milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the duration in milliseconds.
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Parses `0` or a sequence of `<digits><unit>` pairs with units
    /// `y`, `w`, `d`, `h`, `m`, `s`, `ms` in decreasing order.
    pub fn parse(input: &str) -> Result<Self, DurationError> {
        match input {
            "0" => return Ok(Self::ZERO),
            "" => return Err(DurationError::Empty),
            _ => {}
        }

        let mut rest = input;
        let mut total: u64 = 0;
        let mut last_unit: Option<usize> = None;
        while !rest.is_empty() {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 {
                return Err(DurationError::Invalid(input.to_string()));
            }
            let value: u64 = rest[..digits]
                .parse()
                .map_err(|_| DurationError::Overflow(input.to_string()))?;
            rest = &rest[digits..];

            let unit_len = rest.bytes().take_while(|b| !b.is_ascii_digit()).count();
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];

            let (position, millis) = UNITS
                .iter()
                .enumerate()
                .find(|(_, (name, _))| *name == unit)
                .map(|(position, (_, millis))| (position, *millis))
                .ok_or_else(|| DurationError::UnknownUnit {
                    unit: unit.to_string(),
                    input: input.to_string(),
                })?;
            if last_unit.is_some_and(|last| position <= last) {
                return Err(DurationError::UnitOrder(input.to_string()));
            }
            last_unit = Some(position);

            total = value
                .checked_mul(millis)
                .and_then(|add| total.checked_add(add))
                .filter(|sum| *sum <= MAX_MILLIS)
                .ok_or_else(|| DurationError::Overflow(input.to_string()))?;
        }
        Ok(Self(total))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut remaining = self.0;
        if remaining == 0 {
            return f.write_str("0s");
        }
        for (unit, millis) in UNITS {
            // Years and weeks only when exact: 90d reads better than 12w6d.
            let exact_only = millis == YEAR || millis == WEEK;
            if exact_only && remaining % millis != 0 {
                continue;
            }
            let count = remaining / millis;
            if count > 0 {
                write!(f, "{}{}", count, unit)?;
                remaining -= count * millis;
            }
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        std::time::Duration::from_millis(value.0)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct DurationVisitor;

impl<'de> Visitor<'de> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as 5m or 1h30m")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
        Duration::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
        self.visit_str(&v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
        self.visit_str(&v.to_string())
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_durations() {
        assert_eq!(Duration::parse("1h30m").unwrap().as_millis(), HOUR + 30 * MINUTE);
        assert_eq!(Duration::parse("1s500ms").unwrap().as_millis(), 1_500);
        assert_eq!(Duration::parse("2w").unwrap().as_millis(), 2 * WEEK);
        assert_eq!(Duration::parse("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Duration::parse(""), Err(DurationError::Empty));
        assert!(matches!(Duration::parse("h"), Err(DurationError::Invalid(_))));
        assert!(matches!(
            Duration::parse("5"),
            Err(DurationError::UnknownUnit { .. })
        ));
        assert!(matches!(
            Duration::parse("5x"),
            Err(DurationError::UnknownUnit { .. })
        ));
        assert!(matches!(
            Duration::parse("1m1h"),
            Err(DurationError::UnitOrder(_))
        ));
        assert!(matches!(
            Duration::parse("1m1m"),
            Err(DurationError::UnitOrder(_))
        ));
        assert!(matches!(
            Duration::parse("300y"),
            Err(DurationError::Overflow(_))
        ));
    }

    #[test]
    fn renders_largest_units_first() {
        assert_eq!(Duration::parse("90m").unwrap().to_string(), "1h30m");
        assert_eq!(Duration::parse("60s").unwrap().to_string(), "1m");
        assert_eq!(Duration::parse("0").unwrap().to_string(), "0s");
        assert_eq!(Duration::parse("14d").unwrap().to_string(), "2w");
        assert_eq!(Duration::parse("90d").unwrap().to_string(), "90d");
        assert_eq!(Duration::parse("1d1ms").unwrap().to_string(), "1d1ms");
    }

    #[test]
    fn rendering_parses_back() {
        for text in ["1y", "4h", "1m", "5m", "2h30m15s", "250ms", "1w2d"] {
            let duration = Duration::parse(text).unwrap();
            assert_eq!(Duration::parse(&duration.to_string()).unwrap(), duration);
        }
    }

    #[test]
    fn deserializes_strings_and_zero() {
        let parsed: Duration = serde_yaml::from_str("5m").unwrap();
        assert_eq!(parsed.as_millis(), 5 * MINUTE);
        let zero: Duration = serde_yaml::from_str("0").unwrap();
        assert_eq!(zero, Duration::ZERO);
        assert!(serde_yaml::from_str::<Duration>("5").is_err());
    }
}
