//! Typed accessors
//!
//! Every getter reads the raw string with [`Configuration::value`] and parses
//! it. Lookup failures pass through unchanged; parse failures become
//! `TypeConversion` errors carrying the path, the expected type and the raw
//! value.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use multiaddr::Multiaddr;
use url::Url;

use crate::config::Configuration;
use crate::datemath;
use crate::error::{Error, Result};
use crate::path::Path;

/// Run a fallible lookup and panic with the error if it fails.
///
/// For start-up code where a missing or malformed value is unrecoverable.
pub fn must_resolve<T, F>(op: F) -> T
where
    F: FnOnce() -> Result<T>,
{
    match op() {
        Ok(value) => value,
        Err(e) => panic!("{}", e),
    }
}

/// Parse a boolean token: `1 t T TRUE true True` or `0 f F FALSE false False`
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse a byte size such as `512`, `10KB` or `1 MiB`
pub fn parse_size(raw: &str) -> std::result::Result<u64, String> {
    byte_unit::Byte::parse_str(raw, true)
        .map(|b| b.as_u64())
        .map_err(|e| e.to_string())
}

impl Configuration {
    fn parse_value<T, E, F>(&self, path: impl Into<Path>, expected: &str, parse: F) -> Result<T>
    where
        E: fmt::Display,
        F: FnOnce(&str) -> std::result::Result<T, E>,
    {
        let path = path.into();
        let raw = self.value(&path)?;
        parse(&raw).map_err(|e| {
            Error::type_conversion(path.as_str(), expected, raw.as_str())
                .with_cause(format!("Got: \"{}\" ({})", raw, e))
        })
    }

    pub fn get_bool(&self, path: impl Into<Path>) -> Result<bool> {
        self.parse_value(path, "boolean", |raw| {
            parse_bool(raw).ok_or("expected one of 1, t, true, 0, f, false")
        })
    }

    /// Integer value; an empty value reads as 0
    pub fn get_int(&self, path: impl Into<Path>) -> Result<i64> {
        self.parse_value(path, "integer", |raw| {
            if raw.is_empty() {
                Ok(0)
            } else {
                raw.parse::<i64>()
            }
        })
    }

    /// Float value; an empty value reads as 0
    pub fn get_float(&self, path: impl Into<Path>) -> Result<f64> {
        self.parse_value(path, "float", |raw| {
            if raw.is_empty() {
                Ok(0.0)
            } else {
                raw.parse::<f64>()
            }
        })
    }

    /// Duration in `humantime` syntax, e.g. `30s` or `1h 30m`
    pub fn get_duration(&self, path: impl Into<Path>) -> Result<Duration> {
        self.parse_value(path, "duration", humantime::parse_duration)
    }

    /// Size in bytes; an empty value reads as 0
    pub fn get_size(&self, path: impl Into<Path>) -> Result<u64> {
        self.parse_value(path, "byte size", |raw| {
            if raw.is_empty() {
                Ok(0)
            } else {
                parse_size(raw)
            }
        })
    }

    pub fn get_url(&self, path: impl Into<Path>) -> Result<Url> {
        self.parse_value(path, "URL", Url::parse)
    }

    pub fn get_multiaddr(&self, path: impl Into<Path>) -> Result<Multiaddr> {
        self.parse_value(path, "multiaddr", |raw| raw.parse::<Multiaddr>())
    }

    /// Instant described by a date-math expression (see [`datemath`])
    pub fn get_time(&self, path: impl Into<Path>) -> Result<DateTime<Utc>> {
        self.parse_value(path, "date-math time", datemath::parse)
    }

    pub fn get_values(&self, path: impl Into<Path>) -> Result<Vec<String>> {
        self.values(path)
    }
}
