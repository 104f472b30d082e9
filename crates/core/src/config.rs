//! Helpers for reading configuration from a key/value source.
//!
//! Hosts usually read the process environment (`Lookup` is implemented for
//! any `Fn(&str) -> Option<String>`), tests pass a map-backed closure.
//! Blank values are treated as unset.

use core::fmt::Display;
use core::str::FromStr;

use url::Url;

use crate::error::ConfigError;

pub trait Lookup {
    fn raw(&self, key: &str) -> Option<String>;

    fn get(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|v| v.parse::<T>().map_err(|e| ConfigError::invalid(key, e.to_string())))
            .transpose()
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|v| parse_bool(&v).ok_or_else(|| ConfigError::invalid(key, format!("expected a boolean, got '{v}'"))))
            .transpose()
    }

    fn list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|v| parse_list(&v))
    }

    fn url(&self, key: &str) -> Result<Option<Url>, ConfigError> {
        self.get(key)
            .map(|v| {
                Url::parse(&v).map_err(|source| ConfigError::InvalidUrl {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// The process environment as a [`Lookup`].
pub fn env() -> impl Lookup {
    |key: &str| std::env::var(key).ok()
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated list, dropping empty items.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn source(pairs: &[(&str, &str)]) -> impl Lookup {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn blank_values_are_unset() {
        let lookup = source(&[("A", "  ")]);
        assert_eq!(lookup.get("A"), None);
        assert_eq!(lookup.parsed::<u64>("A").unwrap(), None);
    }

    #[test]
    fn parsed_reports_key_on_failure() {
        let lookup = source(&[("TTL", "soon")]);
        let err = lookup.parsed::<u64>("TTL").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "TTL"));
    }

    #[test]
    fn flags_and_lists() {
        let lookup = source(&[("ON", "yes"), ("OFF", "0"), ("BAD", "maybe"), ("L", "/a, ,/b,")]);
        assert_eq!(lookup.flag("ON").unwrap(), Some(true));
        assert_eq!(lookup.flag("OFF").unwrap(), Some(false));
        assert!(lookup.flag("BAD").is_err());
        assert_eq!(lookup.list("L").unwrap(), vec!["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn url_must_be_absolute() {
        let lookup = source(&[("GOOD", "https://id.example.com"), ("BAD", "/relative")]);
        assert_eq!(
            lookup.url("GOOD").unwrap().unwrap().as_str(),
            "https://id.example.com/"
        );
        assert!(matches!(
            lookup.url("BAD").unwrap_err(),
            ConfigError::InvalidUrl { .. }
        ));
    }
}
