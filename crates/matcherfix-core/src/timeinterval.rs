use matcherfix_canonical::de::null_as_default;
use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::OnceLock;

use crate::errors::ConfigError;

/// A named set of time intervals, referenced by routes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeInterval {
    /// Name routes use to refer to the interval.
    pub name: String,
    /// Periods that make up the interval.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_intervals: Vec<TimeIntervalSpec>,
}

/// One period; every non-empty field must match for a time to fall inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeIntervalSpec {
    /// Times of day.
    #[serde(default, deserialize_with = "null_as_default")]
    pub times: Vec<TimeRange>,
    /// Days of the week.
    #[serde(default, deserialize_with = "null_as_default")]
    pub weekdays: Vec<WeekdayRange>,
    /// Days of the month.
    #[serde(default, deserialize_with = "null_as_default")]
    pub days_of_month: Vec<DayOfMonthRange>,
    /// Months of the year.
    #[serde(default, deserialize_with = "null_as_default")]
    pub months: Vec<MonthRange>,
    /// Years.
    #[serde(default, deserialize_with = "null_as_default")]
    pub years: Vec<YearRange>,
    /// Time zone name.
    #[serde(default)]
    pub location: Option<String>,
}

/// Time of day range in minutes since midnight, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTimeRange")]
pub struct TimeRange {
    /// First minute inside the range.
    pub start_minute: u32,
    /// First minute after the range.
    pub end_minute: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTimeRange {
    start_time: String,
    end_time: String,
}

fn time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^((([01][0-9])|(2[0-3])):[0-5][0-9])$|(^24:00$)").expect("invalid regex")
    })
}

fn parse_time(text: &str) -> Result<u32, ConfigError> {
    if !time_regex().is_match(text) {
        return Err(ConfigError::InvalidTime(text.to_string()));
    }
    let (hours, minutes) = text
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidTime(text.to_string()))?;
    let hours: u32 = hours.parse().map_err(|_| ConfigError::InvalidTime(text.to_string()))?;
    let minutes: u32 = minutes.parse().map_err(|_| ConfigError::InvalidTime(text.to_string()))?;
    Ok(hours * 60 + minutes)
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = ConfigError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        let start_minute = parse_time(&raw.start_time)?;
        let end_minute = parse_time(&raw.end_time)?;
        if start_minute >= end_minute {
            return Err(ConfigError::EmptyTimeRange {
                start: raw.start_time,
                end: raw.end_time,
            });
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }
}

/// Range item written as a string (`monday:friday`) or a bare integer (`2024`).
struct RangeText(String);

impl<'de> Deserialize<'de> for RangeText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RangeTextVisitor;

        impl<'de> Visitor<'de> for RangeTextVisitor {
            type Value = RangeText;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a range such as `monday:friday` or a single value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RangeText, E> {
                Ok(RangeText(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RangeText, E> {
                Ok(RangeText(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RangeText, E> {
                Ok(RangeText(v.to_string()))
            }
        }

        deserializer.deserialize_any(RangeTextVisitor)
    }
}

/// Splits `a` or `a:b` into its bounds.
fn bounds<'a>(kind: &'static str, text: &'a str) -> Result<(&'a str, &'a str), ConfigError> {
    let mut parts = text.split(':');
    let (begin, end) = match (parts.next(), parts.next(), parts.next()) {
        (Some(single), None, None) => (single, single),
        (Some(begin), Some(end), None) => (begin, end),
        _ => {
            return Err(ConfigError::InvalidRange {
                kind,
                value: text.to_string(),
                reason: "expected a single value or `begin:end`",
            })
        }
    };
    Ok((begin.trim(), end.trim()))
}

fn invalid(kind: &'static str, text: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidRange {
        kind,
        value: text.to_string(),
        reason,
    }
}

const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn parse_weekdays(text: &str) -> Result<(i32, i32), ConfigError> {
    let (begin, end) = bounds("weekday", text)?;
    let day = |name: &str| -> Result<i32, ConfigError> {
        let name = name.to_lowercase();
        WEEKDAYS
            .iter()
            .position(|day| *day == name)
            .map(|position| position as i32)
            .ok_or_else(|| invalid("weekday", text, "unknown day name"))
    };
    let (begin, end) = (day(begin)?, day(end)?);
    if begin > end {
        return Err(invalid("weekday", text, "start day cannot be after end day"));
    }
    Ok((begin, end))
}

fn parse_days_of_month(text: &str) -> Result<(i32, i32), ConfigError> {
    let (begin, end) = bounds("day of month", text)?;
    let day = |value: &str| -> Result<i32, ConfigError> {
        let day: i32 = value
            .parse()
            .map_err(|_| invalid("day of month", text, "not an integer"))?;
        if day == 0 || !(-31..=31).contains(&day) {
            return Err(invalid("day of month", text, "day must be in -31..=31 and not 0"));
        }
        Ok(day)
    };
    let (begin, end) = (day(begin)?, day(end)?);
    // Negative days count back from the end of the month.
    let absolute = |day: i32| if day < 1 { 30 + day } else { day };
    if absolute(begin) > absolute(end) {
        return Err(invalid("day of month", text, "start day cannot be after end day"));
    }
    Ok((begin, end))
}

fn parse_months(text: &str) -> Result<(i32, i32), ConfigError> {
    let (begin, end) = bounds("month", text)?;
    let month = |value: &str| -> Result<i32, ConfigError> {
        if let Ok(number) = value.parse::<i32>() {
            if (1..=12).contains(&number) {
                return Ok(number);
            }
            return Err(invalid("month", text, "month must be in 1..=12"));
        }
        let name = value.to_lowercase();
        MONTHS
            .iter()
            .position(|month| *month == name)
            .map(|position| position as i32 + 1)
            .ok_or_else(|| invalid("month", text, "unknown month name"))
    };
    let (begin, end) = (month(begin)?, month(end)?);
    if begin > end {
        return Err(invalid("month", text, "start month cannot be after end month"));
    }
    Ok((begin, end))
}

fn parse_years(text: &str) -> Result<(i32, i32), ConfigError> {
    let (begin, end) = bounds("year", text)?;
    let year = |value: &str| -> Result<i32, ConfigError> {
        match value.parse::<i32>() {
            Ok(year) if year > 0 => Ok(year),
            _ => Err(invalid("year", text, "year must be a positive integer")),
        }
    };
    let (begin, end) = (year(begin)?, year(end)?);
    if begin > end {
        return Err(invalid("year", text, "start year cannot be after end year"));
    }
    Ok((begin, end))
}

macro_rules! inclusive_range {
    ($name:ident, $doc:expr, $parse:ident) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            /// First value in the range.
            pub begin: i32,
            /// Last value in the range.
            pub end: i32,
        }

        impl $name {
            /// Parses `a` or `a:b`.
            pub fn parse(text: &str) -> Result<Self, ConfigError> {
                let (begin, end) = $parse(text)?;
                Ok(Self { begin, end })
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let RangeText(text) = RangeText::deserialize(deserializer)?;
                Self::parse(&text).map_err(de::Error::custom)
            }
        }
    };
}

inclusive_range!(
    WeekdayRange,
    "Days of the week, `0` for Sunday through `6` for Saturday.",
    parse_weekdays
);
inclusive_range!(
    DayOfMonthRange,
    "Days of the month; negative values count back from the month's end.",
    parse_days_of_month
);
inclusive_range!(MonthRange, "Months, `1` for January through `12` for December.", parse_months);
inclusive_range!(YearRange, "Calendar years.", parse_years);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_time_ranges() {
        let range: TimeRange = serde_yaml::from_str("{start_time: '09:00', end_time: '17:30'}").unwrap();
        assert_eq!(range.start_minute, 540);
        assert_eq!(range.end_minute, 1050);
        let full: TimeRange = serde_yaml::from_str("{start_time: '00:00', end_time: '24:00'}").unwrap();
        assert_eq!(full.end_minute, 1440);
    }

    #[test]
    fn rejects_bad_times() {
        for yaml in [
            "{start_time: '9:00', end_time: '17:00'}",
            "{start_time: '17:00', end_time: '09:00'}",
            "{start_time: '10:00', end_time: '10:00'}",
            "{start_time: '24:01', end_time: '24:00'}",
            "{start_time: '09:00'}",
        ] {
            assert!(serde_yaml::from_str::<TimeRange>(yaml).is_err(), "{yaml}");
        }
    }

    #[test]
    fn weekday_names_are_case_insensitive() {
        assert_eq!(
            WeekdayRange::parse("Monday:FRIDAY").unwrap(),
            WeekdayRange { begin: 1, end: 5 }
        );
        assert_eq!(
            WeekdayRange::parse("sunday").unwrap(),
            WeekdayRange { begin: 0, end: 0 }
        );
        assert!(WeekdayRange::parse("friday:monday").is_err());
        assert!(WeekdayRange::parse("funday").is_err());
        assert!(WeekdayRange::parse("monday:tuesday:friday").is_err());
    }

    #[test]
    fn days_of_month_allow_negative_offsets() {
        assert_eq!(
            DayOfMonthRange::parse("1:5").unwrap(),
            DayOfMonthRange { begin: 1, end: 5 }
        );
        assert!(DayOfMonthRange::parse("-3:-1").is_ok());
        assert!(DayOfMonthRange::parse("20:-1").is_ok());
        assert!(DayOfMonthRange::parse("0").is_err());
        assert!(DayOfMonthRange::parse("32").is_err());
        assert!(DayOfMonthRange::parse("-1:-3").is_err());
    }

    #[test]
    fn months_accept_names_and_numbers() {
        assert_eq!(
            MonthRange::parse("january:march").unwrap(),
            MonthRange::parse("1:3").unwrap()
        );
        assert!(MonthRange::parse("13").is_err());
        assert!(MonthRange::parse("december:january").is_err());
    }

    #[test]
    fn years_must_be_ordered() {
        assert!(YearRange::parse("2020:2022").is_ok());
        assert!(YearRange::parse("2022:2020").is_err());
        assert!(YearRange::parse("-5").is_err());
    }

    #[test]
    fn integer_items_are_accepted() {
        let spec: TimeIntervalSpec =
            serde_yaml::from_str("{years: [2024, '2025:2026'], days_of_month: [1, -1], months: [6]}").unwrap();
        assert_eq!(spec.years, vec![YearRange { begin: 2024, end: 2024 }, YearRange { begin: 2025, end: 2026 }]);
        assert_eq!(spec.days_of_month.len(), 2);
        assert_eq!(spec.months, vec![MonthRange { begin: 6, end: 6 }]);
    }

    #[test]
    fn null_fields_are_empty() {
        let interval: TimeInterval =
            serde_yaml::from_str("{name: weekends, time_intervals: [{weekdays: null, location: null}]}").unwrap();
        assert_eq!(interval.time_intervals, vec![TimeIntervalSpec::default()]);
    }
}
