//! Configuration access port trait.
//!
//! Adapters only supply raw strings; the typed getters fall back to the
//! default when a key is absent and fail when it is present but unparsable.

use crate::domain::error::FxcrossError;
use std::str::FromStr;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    fn get_usize(&self, section: &str, key: &str, default: usize) -> Result<usize, FxcrossError> {
        parse_or(self.get_string(section, key), section, key, default, "a positive integer")
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, FxcrossError> {
        parse_or(self.get_string(section, key), section, key, default, "a number")
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> Result<bool, FxcrossError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                FxcrossError::invalid(section, key, format!("expected true or false, got '{raw}'"))
            }),
        }
    }
}

fn parse_or<T: FromStr>(
    raw: Option<String>,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, FxcrossError> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            FxcrossError::invalid(section, key, format!("expected {expected}, got '{raw}'"))
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
