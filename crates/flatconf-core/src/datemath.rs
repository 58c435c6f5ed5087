//! Date-math expressions
//!
//! An expression is an anchor followed by zero or more operations:
//!
//! ```text
//! now-1d/d                      yesterday, rounded down to midnight
//! now+2h                        two hours from now
//! 2025-05-13T01:38:00Z||+1M/M   first instant of June 2025
//! 2025-05-13                    midnight UTC on that date
//! ```
//!
//! Anchors are `now`, an RFC 3339 timestamp, `YYYY-MM-DDTHH:MM:SS` (UTC) or
//! `YYYY-MM-DD` (midnight UTC). A timestamp anchor followed by operations is
//! separated from them with `||`. Operations are `+N<unit>`, `-N<unit>` and
//! `/<unit>` (round down to the start of the unit). Units: `y` year, `M`
//! month, `w` week, `d` day, `h`/`H` hour, `m` minute, `s` second. All
//! results are in UTC.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};

/// Keyword for the current instant
pub const NOW: &str = "now";

/// Separates a timestamp anchor from its operations
pub const ANCHOR_SEPARATOR: &str = "||";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateMathError {
    #[error("empty date-math expression")]
    Empty,
    #[error("invalid anchor '{0}'")]
    InvalidAnchor(String),
    #[error("expected an operation at '{0}'")]
    InvalidOperation(String),
    #[error("missing amount before unit at '{0}'")]
    MissingAmount(String),
    #[error("unknown time unit '{0}'")]
    UnknownUnit(String),
    #[error("date out of range")]
    OutOfRange,
}

type Result<T> = std::result::Result<T, DateMathError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl Unit {
    fn from_char(c: char) -> Result<Self> {
        match c {
            'y' => Ok(Unit::Year),
            'M' => Ok(Unit::Month),
            'w' => Ok(Unit::Week),
            'd' => Ok(Unit::Day),
            'h' | 'H' => Ok(Unit::Hour),
            'm' => Ok(Unit::Minute),
            's' => Ok(Unit::Second),
            other => Err(DateMathError::UnknownUnit(other.to_string())),
        }
    }
}

/// Evaluate `expression` relative to the current instant
pub fn parse(expression: &str) -> Result<DateTime<Utc>> {
    parse_at(expression, Utc::now())
}

/// Evaluate `expression`, using `now` for the `now` anchor
pub fn parse_at(expression: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(DateMathError::Empty);
    }

    let (anchor, operations) = if let Some(rest) = expression.strip_prefix(NOW) {
        (now, rest)
    } else if let Some((anchor, rest)) = expression.split_once(ANCHOR_SEPARATOR) {
        (parse_anchor(anchor)?, rest)
    } else {
        (parse_anchor(expression)?, "")
    };

    apply_operations(anchor, operations)
}

fn parse_anchor(anchor: &str) -> Result<DateTime<Utc>> {
    let anchor = anchor.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(anchor) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(anchor, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(anchor, "%Y-%m-%d") {
        if let Some(midnight) = d.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(DateMathError::InvalidAnchor(anchor.to_string()))
}

fn apply_operations(mut t: DateTime<Utc>, operations: &str) -> Result<DateTime<Utc>> {
    let mut rest = operations;
    while let Some(op) = rest.chars().next() {
        let tail = &rest[op.len_utf8()..];
        rest = match op {
            '+' | '-' => {
                let digits = tail.len() - tail.trim_start_matches(|c: char| c.is_ascii_digit()).len();
                if digits == 0 {
                    return Err(DateMathError::MissingAmount(rest.to_string()));
                }
                let amount: i64 = tail[..digits]
                    .parse()
                    .map_err(|_| DateMathError::OutOfRange)?;
                let (unit, after) = take_unit(&tail[digits..])?;
                let amount = if op == '-' { -amount } else { amount };
                t = shift(t, amount, unit)?;
                after
            }
            '/' => {
                let (unit, after) = take_unit(tail)?;
                t = round_down(t, unit)?;
                after
            }
            _ => return Err(DateMathError::InvalidOperation(rest.to_string())),
        };
    }
    Ok(t)
}

fn take_unit(input: &str) -> Result<(Unit, &str)> {
    let c = input
        .chars()
        .next()
        .ok_or_else(|| DateMathError::UnknownUnit(String::new()))?;
    Ok((Unit::from_char(c)?, &input[c.len_utf8()..]))
}

fn shift(t: DateTime<Utc>, amount: i64, unit: Unit) -> Result<DateTime<Utc>> {
    let shifted = match unit {
        Unit::Year => shift_months(t, amount.checked_mul(12).ok_or(DateMathError::OutOfRange)?),
        Unit::Month => shift_months(t, amount),
        Unit::Week => TimeDelta::try_weeks(amount).and_then(|d| t.checked_add_signed(d)),
        Unit::Day => TimeDelta::try_days(amount).and_then(|d| t.checked_add_signed(d)),
        Unit::Hour => TimeDelta::try_hours(amount).and_then(|d| t.checked_add_signed(d)),
        Unit::Minute => TimeDelta::try_minutes(amount).and_then(|d| t.checked_add_signed(d)),
        Unit::Second => TimeDelta::try_seconds(amount).and_then(|d| t.checked_add_signed(d)),
    };
    shifted.ok_or(DateMathError::OutOfRange)
}

fn shift_months(t: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        t.checked_add_months(magnitude)
    } else {
        t.checked_sub_months(magnitude)
    }
}

fn round_down(t: DateTime<Utc>, unit: Unit) -> Result<DateTime<Utc>> {
    let date = t.date_naive();
    let rounded = match unit {
        Unit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
        Unit::Month => {
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        }
        Unit::Week => date
            .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
            .and_then(|d| d.and_hms_opt(0, 0, 0)),
        Unit::Day => date.and_hms_opt(0, 0, 0),
        Unit::Hour => date.and_hms_opt(t.hour(), 0, 0),
        Unit::Minute => date.and_hms_opt(t.hour(), t.minute(), 0),
        Unit::Second => date.and_hms_opt(t.hour(), t.minute(), t.second()),
    };
    rounded.map(|n| n.and_utc()).ok_or(DateMathError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn reference() -> DateTime<Utc> {
        // A Tuesday
        at(2025, 5, 13, 1, 38, 27)
    }

    #[test]
    fn test_now() {
        assert_eq!(parse_at("now", reference()).unwrap(), reference());
        assert_eq!(parse_at("  now ", reference()).unwrap(), reference());
    }

    #[test]
    fn test_absolute_anchors() {
        assert_eq!(
            parse_at("2025-05-13T01:38:00Z", reference()).unwrap(),
            at(2025, 5, 13, 1, 38, 0)
        );
        assert_eq!(
            parse_at("2025-05-13T03:38:00+02:00", reference()).unwrap(),
            at(2025, 5, 13, 1, 38, 0)
        );
        assert_eq!(
            parse_at("2025-05-13T01:38:00", reference()).unwrap(),
            at(2025, 5, 13, 1, 38, 0)
        );
        assert_eq!(parse_at("2025-05-13", reference()).unwrap(), at(2025, 5, 13, 0, 0, 0));
    }

    #[test]
    fn test_arithmetic() {
        let now = reference();
        assert_eq!(parse_at("now+1h", now).unwrap(), at(2025, 5, 13, 2, 38, 27));
        assert_eq!(parse_at("now-1d", now).unwrap(), at(2025, 5, 12, 1, 38, 27));
        assert_eq!(parse_at("now+2w", now).unwrap(), at(2025, 5, 27, 1, 38, 27));
        assert_eq!(parse_at("now-30m+15s", now).unwrap(), at(2025, 5, 13, 1, 8, 42));
        assert_eq!(parse_at("now+1y", now).unwrap(), at(2026, 5, 13, 1, 38, 27));
        assert_eq!(parse_at("now-13M", now).unwrap(), at(2024, 4, 13, 1, 38, 27));
    }

    #[test]
    fn test_month_arithmetic_clamps_day() {
        let jan31 = at(2025, 1, 31, 0, 0, 0);
        assert_eq!(parse_at("now+1M", jan31).unwrap(), at(2025, 2, 28, 0, 0, 0));
    }

    #[test]
    fn test_rounding() {
        let now = reference();
        assert_eq!(parse_at("now/y", now).unwrap(), at(2025, 1, 1, 0, 0, 0));
        assert_eq!(parse_at("now/M", now).unwrap(), at(2025, 5, 1, 0, 0, 0));
        assert_eq!(parse_at("now/w", now).unwrap(), at(2025, 5, 12, 0, 0, 0));
        assert_eq!(parse_at("now/d", now).unwrap(), at(2025, 5, 13, 0, 0, 0));
        assert_eq!(parse_at("now/H", now).unwrap(), at(2025, 5, 13, 1, 0, 0));
        assert_eq!(parse_at("now/m", now).unwrap(), at(2025, 5, 13, 1, 38, 0));
        assert_eq!(parse_at("now-1d/d", now).unwrap(), at(2025, 5, 12, 0, 0, 0));
    }

    #[test]
    fn test_anchor_with_operations() {
        assert_eq!(
            parse_at("2025-05-13T01:38:00Z||+1M/M", reference()).unwrap(),
            at(2025, 6, 1, 0, 0, 0)
        );
        assert_eq!(
            parse_at("2025-05-13||-1d", reference()).unwrap(),
            at(2025, 5, 12, 0, 0, 0)
        );
        assert_eq!(
            parse_at("2025-05-13T01:38:00Z||", reference()).unwrap(),
            at(2025, 5, 13, 1, 38, 0)
        );
    }

    #[test]
    fn test_errors() {
        let now = reference();
        assert_eq!(parse_at("", now).unwrap_err(), DateMathError::Empty);
        assert!(matches!(
            parse_at("yesterday", now).unwrap_err(),
            DateMathError::InvalidAnchor(_)
        ));
        assert!(matches!(
            parse_at("now+d", now).unwrap_err(),
            DateMathError::MissingAmount(_)
        ));
        assert_eq!(
            parse_at("now+1x", now).unwrap_err(),
            DateMathError::UnknownUnit("x".into())
        );
        assert!(matches!(
            parse_at("now*2d", now).unwrap_err(),
            DateMathError::InvalidOperation(_)
        ));
        assert_eq!(
            parse_at("now+1", now).unwrap_err(),
            DateMathError::UnknownUnit(String::new())
        );
        assert_eq!(
            parse_at("now+99999999999y", now).unwrap_err(),
            DateMathError::OutOfRange
        );
    }
}
