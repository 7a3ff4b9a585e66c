// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration value type with type-safe conversions.
//!
//! Resolved configuration is a `serde_json::Value` tree. `ConfigValue` wraps a
//! single value taken from that tree and offers conversions that accept both the
//! native JSON type and its string spelling, since values coming from argv and
//! environment variables are strings unless value parsing is enabled.

use crate::domain::errors::{ConfigError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A type-safe wrapper for a resolved configuration value.
///
/// # Examples
///
/// ```
/// use tiercfg::domain::config_value::ConfigValue;
/// use serde_json::json;
///
/// let value = ConfigValue::new(json!("42"));
/// assert_eq!(value.as_i64("test:key").unwrap(), 42);
///
/// let value = ConfigValue::new(json!(42));
/// assert_eq!(value.as_i64("test:key").unwrap(), 42);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValue(Value);

impl ConfigValue {
    /// Creates a new `ConfigValue` from a JSON value.
    pub fn new(value: Value) -> Self {
        ConfigValue(value)
    }

    /// Returns the wrapped JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the wrapper and returns the JSON value.
    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Returns the value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Renders the value as a string. Strings are returned as-is, every other
    /// value is rendered as JSON.
    pub fn as_string(&self) -> String {
        match &self.0 {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Converts the value to a boolean.
    ///
    /// JSON booleans convert directly. Strings are recognized case-insensitively:
    /// - `true`: "true", "yes", "1", "on"
    /// - `false`: "false", "no", "0", "off"
    ///
    /// # Examples
    ///
    /// ```
    /// use tiercfg::domain::config_value::ConfigValue;
    /// use serde_json::json;
    ///
    /// assert!(ConfigValue::new(json!("yes")).as_bool("test:key").unwrap());
    /// assert!(!ConfigValue::new(json!(false)).as_bool("test:key").unwrap());
    /// ```
    pub fn as_bool(&self, key: &str) -> Result<bool> {
        match &self.0 {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
            Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
            _ => {
                let text = self.as_string();
                match text.to_lowercase().as_str() {
                    "true" | "yes" | "1" | "on" => Ok(true),
                    "false" | "no" | "0" | "off" => Ok(false),
                    _ => text
                        .parse::<bool>()
                        .map_err(|e| ConfigError::from_parse_bool_error(key.to_string(), e)),
                }
            }
        }
    }

    /// Converts the value to an `i64`.
    pub fn as_i64(&self, key: &str) -> Result<i64> {
        if let Some(n) = self.0.as_i64() {
            return Ok(n);
        }
        self.as_string()
            .parse::<i64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to a `u64`.
    pub fn as_u64(&self, key: &str) -> Result<u64> {
        if let Some(n) = self.0.as_u64() {
            return Ok(n);
        }
        self.as_string()
            .parse::<u64>()
            .map_err(|e| ConfigError::from_parse_int_error(key.to_string(), e))
    }

    /// Converts the value to an `f64`.
    pub fn as_f64(&self, key: &str) -> Result<f64> {
        if let Some(n) = self.0.as_f64() {
            return Ok(n);
        }
        self.as_string()
            .parse::<f64>()
            .map_err(|e| ConfigError::from_parse_float_error(key.to_string(), e))
    }

    /// Parses the string rendering of the value into any type that implements `FromStr`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiercfg::domain::config_value::ConfigValue;
    /// use serde_json::json;
    /// use std::net::IpAddr;
    ///
    /// let value = ConfigValue::new(json!("127.0.0.1"));
    /// let ip: IpAddr = value.parse("test:key").unwrap();
    /// assert_eq!(ip.to_string(), "127.0.0.1");
    /// ```
    pub fn parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.as_string()
            .parse::<T>()
            .map_err(|e| ConfigError::TypeConversionError {
                key: key.to_string(),
                target_type: std::any::type_name::<T>().to_string(),
                source: Box::new(e),
            })
    }

    /// Deserializes the value into any `serde` type, typically a struct
    /// mirroring a configuration subtree.
    pub fn deserialize<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        serde_json::from_value(self.0.clone()).map_err(|e| ConfigError::TypeConversionError {
            key: key.to_string(),
            target_type: std::any::type_name::<T>().to_string(),
            source: Box::new(e),
        })
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        ConfigValue(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue(Value::String(s.to_string()))
    }
}

impl From<ConfigValue> for Value {
    fn from(value: ConfigValue) -> Self {
        value.0
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::IpAddr;

    #[test]
    fn test_config_value_as_str() {
        let value = ConfigValue::from("test");
        assert_eq!(value.as_str(), Some("test"));
        assert_eq!(ConfigValue::new(json!(1)).as_str(), None);
    }

    #[test]
    fn test_config_value_display() {
        assert_eq!(format!("{}", ConfigValue::from("test")), "test");
        assert_eq!(format!("{}", ConfigValue::new(json!(42))), "42");
    }

    #[test]
    fn test_as_bool_true_variants() {
        for val in ["true", "True", "TRUE", "yes", "YES", "1", "on", "ON"] {
            let value = ConfigValue::from(val);
            assert!(value.as_bool("test:key").unwrap(), "Failed for value: {}", val);
        }
        assert!(ConfigValue::new(json!(true)).as_bool("test:key").unwrap());
        assert!(ConfigValue::new(json!(1)).as_bool("test:key").unwrap());
    }

    #[test]
    fn test_as_bool_false_variants() {
        for val in ["false", "False", "no", "NO", "0", "off", "OFF"] {
            let value = ConfigValue::from(val);
            assert!(!value.as_bool("test:key").unwrap(), "Failed for value: {}", val);
        }
    }

    #[test]
    fn test_as_bool_invalid() {
        let value = ConfigValue::from("invalid");
        assert!(value.as_bool("test:key").is_err());
    }

    #[test]
    fn test_as_i64_accepts_numbers_and_strings() {
        assert_eq!(ConfigValue::new(json!(-42)).as_i64("k").unwrap(), -42);
        assert_eq!(ConfigValue::from("9223372036854775807").as_i64("k").unwrap(), i64::MAX);
        assert!(ConfigValue::from("3.14").as_i64("k").is_err());
    }

    #[test]
    fn test_as_u64_rejects_negative() {
        assert_eq!(ConfigValue::new(json!(42)).as_u64("k").unwrap(), 42);
        assert!(ConfigValue::from("-42").as_u64("k").is_err());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(ConfigValue::new(json!(3.5)).as_f64("k").unwrap(), 3.5);
        assert_eq!(ConfigValue::from("-3.5").as_f64("k").unwrap(), -3.5);
        assert!(ConfigValue::from("not_a_number").as_f64("k").is_err());
    }

    #[test]
    fn test_parse_custom_type() {
        let value = ConfigValue::from("127.0.0.1");
        let ip: IpAddr = value.parse("test:key").unwrap();
        assert_eq!(ip.to_string(), "127.0.0.1");

        let result: Result<IpAddr> = ConfigValue::from("not_an_ip").parse("test:key");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_subtree() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Listen {
            host: String,
            port: u16,
        }

        let value = ConfigValue::new(json!({"host": "localhost", "port": 8080}));
        let listen: Listen = value.deserialize("server").unwrap();
        assert_eq!(
            listen,
            Listen {
                host: "localhost".to_string(),
                port: 8080
            }
        );

        let wrong = ConfigValue::new(json!("not an object"));
        assert!(wrong.deserialize::<Listen>("server").is_err());
    }
}
