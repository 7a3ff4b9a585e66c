// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable source adapter.
//!
//! This module provides an adapter that takes a snapshot of environment
//! variables, either from the process or from an explicit list.

use std::collections::BTreeMap;
use std::env;

/// Maximum length for environment variable keys (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Snapshot source for environment variables.
///
/// Oversized entries and, for the process environment, entries that are not
/// valid UTF-8 are skipped. The snapshot is sorted by name.
///
/// # Examples
///
/// ```rust
/// use tiercfg::adapters::EnvVarAdapter;
///
/// let adapter = EnvVarAdapter::with_values([("APP_PORT", "8080")]);
/// assert_eq!(adapter.snapshot().get("APP_PORT").map(String::as_str), Some("8080"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvVarAdapter {
    /// Explicit variables; `None` reads the process environment
    values: Option<BTreeMap<String, String>>,
}

impl EnvVarAdapter {
    /// Creates an adapter reading the process environment.
    pub fn new() -> Self {
        Self { values: None }
    }

    /// Creates an adapter over explicit variables, without touching the
    /// process environment.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Some(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Takes the snapshot.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let raw: Box<dyn Iterator<Item = (String, String)>> = match &self.values {
            Some(values) => Box::new(values.clone().into_iter()),
            None => Box::new(
                env::vars_os()
                    .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
            ),
        };

        let mut snapshot = BTreeMap::new();
        for (key, value) in raw {
            // Validate input sizes to prevent DoS
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::warn!(
                    "Skipping oversized environment variable: key_len={}, value_len={} (max key={}, max value={})",
                    key.len(),
                    value.len(),
                    MAX_ENV_KEY_LEN,
                    MAX_ENV_VALUE_LEN
                );
                continue;
            }
            snapshot.insert(key, value);
        }

        tracing::debug!("Loaded {} environment variables", snapshot.len());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_adapter_with_values() {
        let adapter = EnvVarAdapter::with_values([("B", "2"), ("A", "1")]);
        let snapshot = adapter.snapshot();
        assert_eq!(
            snapshot.into_iter().collect::<Vec<_>>(),
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_env_adapter_skips_oversized_entries() {
        let long_key = "K".repeat(MAX_ENV_KEY_LEN + 1);
        let long_value = "v".repeat(MAX_ENV_VALUE_LEN + 1);
        let adapter = EnvVarAdapter::with_values([
            (long_key.clone(), "x".to_string()),
            ("BIG".to_string(), long_value),
            ("OK".to_string(), "fine".to_string()),
        ]);
        let snapshot = adapter.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["OK"], "fine");
    }

    #[test]
    fn test_env_adapter_reads_process_environment() {
        // cargo exports this to every test binary it runs.
        let snapshot = EnvVarAdapter::new().snapshot();
        assert!(snapshot.contains_key("CARGO_MANIFEST_DIR"));
    }
}
