use std::env;
use std::str::FromStr;

use crate::errors::ConfigError;

pub fn required(var: &str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(var.to_string())),
    }
}

pub fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Reads and parses `var`, falling back to `default` when it is unset or blank.
pub fn parse_or<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match optional(var) {
        Some(raw) => parse_value(var, &raw),
        None => Ok(default),
    }
}

pub fn parse_value<T: FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

pub fn flag(var: &str) -> bool {
    optional(var)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
