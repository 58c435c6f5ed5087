//! Process-wide configuration
//!
//! A single [`ConfigCell`] backs these free functions. Call [`load`] once at
//! start-up; every other function fails with `NotInitialized` until a load
//! has succeeded. The `*_must_resolve` variants panic instead of returning an
//! error.

use std::time::Duration;

use chrono::{DateTime, Utc};
use multiaddr::Multiaddr;
use url::Url;

use crate::accessors::must_resolve;
use crate::config::{ConfigCell, Configuration, LoadOptions};
use crate::error::Result;
use crate::path::Path;

static GLOBAL_CONFIG: ConfigCell = ConfigCell::new();

/// Load the process-wide configuration.
///
/// Only the first call reads the file. Later calls, including concurrent
/// ones, return the outcome of that first load and ignore their options.
pub fn load(options: LoadOptions) -> Result<()> {
    GLOBAL_CONFIG.load(&options)
}

/// True once [`load`] has succeeded
pub fn is_loaded() -> bool {
    GLOBAL_CONFIG.is_loaded()
}

/// The loaded configuration
pub fn configuration() -> Result<&'static Configuration> {
    GLOBAL_CONFIG.get()
}

pub fn root() -> Result<Path> {
    Ok(configuration()?.root().clone())
}

pub fn has_path(path: impl Into<Path>) -> Result<bool> {
    Ok(configuration()?.has_path(path))
}

pub fn value(path: impl Into<Path>) -> Result<String> {
    configuration()?.value(path)
}

pub fn value_must_resolve(path: impl Into<Path>) -> String {
    must_resolve(|| value(path))
}

pub fn values(path: impl Into<Path>) -> Result<Vec<String>> {
    configuration()?.values(path)
}

pub fn values_must_resolve(path: impl Into<Path>) -> Vec<String> {
    must_resolve(|| values(path))
}

/// Set or replace a value; `Ok(false)` for an empty path
pub fn set(path: impl Into<Path>, value: impl Into<String>) -> Result<bool> {
    Ok(configuration()?.set(path, value))
}

pub fn sub(path: impl Into<Path>) -> Result<Vec<Path>> {
    configuration()?.sub(path)
}

pub fn size() -> Result<usize> {
    Ok(configuration()?.size())
}

pub fn to_debug_string() -> Result<String> {
    Ok(configuration()?.to_debug_string())
}

pub fn get_bool(path: impl Into<Path>) -> Result<bool> {
    configuration()?.get_bool(path)
}

pub fn get_bool_must_resolve(path: impl Into<Path>) -> bool {
    must_resolve(|| get_bool(path))
}

pub fn get_int(path: impl Into<Path>) -> Result<i64> {
    configuration()?.get_int(path)
}

pub fn get_int_must_resolve(path: impl Into<Path>) -> i64 {
    must_resolve(|| get_int(path))
}

pub fn get_float(path: impl Into<Path>) -> Result<f64> {
    configuration()?.get_float(path)
}

pub fn get_float_must_resolve(path: impl Into<Path>) -> f64 {
    must_resolve(|| get_float(path))
}

pub fn get_duration(path: impl Into<Path>) -> Result<Duration> {
    configuration()?.get_duration(path)
}

pub fn get_duration_must_resolve(path: impl Into<Path>) -> Duration {
    must_resolve(|| get_duration(path))
}

pub fn get_size(path: impl Into<Path>) -> Result<u64> {
    configuration()?.get_size(path)
}

pub fn get_size_must_resolve(path: impl Into<Path>) -> u64 {
    must_resolve(|| get_size(path))
}

pub fn get_url(path: impl Into<Path>) -> Result<Url> {
    configuration()?.get_url(path)
}

pub fn get_url_must_resolve(path: impl Into<Path>) -> Url {
    must_resolve(|| get_url(path))
}

pub fn get_multiaddr(path: impl Into<Path>) -> Result<Multiaddr> {
    configuration()?.get_multiaddr(path)
}

pub fn get_multiaddr_must_resolve(path: impl Into<Path>) -> Multiaddr {
    must_resolve(|| get_multiaddr(path))
}

pub fn get_time(path: impl Into<Path>) -> Result<DateTime<Utc>> {
    configuration()?.get_time(path)
}

pub fn get_time_must_resolve(path: impl Into<Path>) -> DateTime<Utc> {
    must_resolve(|| get_time(path))
}
