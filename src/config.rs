//! Generation configuration
//!
//! Configuration is a set of named sections holding key/value pairs:
//!
//! - `global`: `ignore-tokens-regexp`, `ignore-functions-regexp`, `headers`,
//!   `overrides`, `assume-safe-formatters`
//! - `type-formatters`: C type name (spaces as hyphens) → formatter
//! - `return-checkers`: C type name → checker
//! - `func-<name>`: `override`, `return-default`, `return-checker`,
//!   `return-formatter`, `return-safe`, `parameter-<param>-formatter`,
//!   `parameter-<param>-safe`
//!
//! The on-disk encoding is JSON, one object per section. Accessors coerce
//! strings, booleans and numbers, so `"return-default": -1` and
//! `"return-default": "-1"` are equivalent.

use std::fs;
use std::path::Path;

use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// Section → key → value configuration model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Config {
    sections: FxHashMap<String, FxHashMap<String, Value>>,
}

impl Config {
    /// An empty configuration; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Fetch one value as text. Missing section or key yields `None`.
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        match self.sections.get(section)?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Fetch a boolean, accepting JSON booleans and the usual textual
    /// spellings (`1/0`, `true/false`, `yes/no`, `on/off`).
    pub fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.sections.get(section)?.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => None,
            },
            Value::Number(n) => n.as_i64().map(|v| v != 0),
            _ => None,
        }
    }

    /// Compile a regexp-valued option. An invalid pattern is a fatal
    /// configuration error rather than a silently dropped filter.
    pub fn get_regexp(&self, section: &str, key: &str) -> Result<Option<Regex>, Error> {
        match self.get(section, key) {
            None => Ok(None),
            Some(pattern) => Regex::new(&pattern).map(Some).map_err(|e| {
                Error::Config(format!("[{}] {}: invalid regexp: {}", section, key, e))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config::from_json(
            r#"{
                "global": {
                    "ignore-functions-regexp": "^internal_",
                    "assume-safe-formatters": true,
                    "headers": "stdbool.h,inttypes.h"
                },
                "type-formatters": {
                    "my_handle_t": "my_fmt_handle"
                },
                "func-add": {
                    "return-default": -1,
                    "return-checker": "%(prefix)s_log_checker_non_zero"
                }
            }"#,
        )
        .expect("valid config")
    }

    #[test]
    fn test_get_coerces_values() {
        let cfg = sample();
        assert_eq!(cfg.get("func-add", "return-default").as_deref(), Some("-1"));
        assert_eq!(
            cfg.get("global", "assume-safe-formatters").as_deref(),
            Some("true")
        );
        assert_eq!(cfg.get("global", "missing"), None);
        assert_eq!(cfg.get("no-such-section", "x"), None);
    }

    #[test]
    fn test_get_bool_spellings() {
        let cfg = Config::from_json(
            r#"{"s": {"a": true, "b": "yes", "c": "0", "d": "off", "e": "maybe"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.get_bool("s", "a"), Some(true));
        assert_eq!(cfg.get_bool("s", "b"), Some(true));
        assert_eq!(cfg.get_bool("s", "c"), Some(false));
        assert_eq!(cfg.get_bool("s", "d"), Some(false));
        assert_eq!(cfg.get_bool("s", "e"), None);
    }

    #[test]
    fn test_get_regexp() {
        let cfg = sample();
        let re = cfg
            .get_regexp("global", "ignore-functions-regexp")
            .unwrap()
            .unwrap();
        assert!(re.is_match("internal_setup"));
        assert!(cfg.get_regexp("global", "missing").unwrap().is_none());
    }

    #[test]
    fn test_invalid_regexp_is_config_error() {
        let cfg = Config::from_json(r#"{"global": {"ignore-tokens-regexp": "("}}"#).unwrap();
        assert!(cfg.get_regexp("global", "ignore-tokens-regexp").is_err());
    }
}
