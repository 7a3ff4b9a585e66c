// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hooks and custom workflows.
//!
//! A hook receives the store after the step it is attached to and may read or
//! write any key. Blocking hooks run in both modes; deferred hooks return a
//! future and are only accepted in async mode. A custom workflow, which
//! replaces the whole default plan, has the same shape as a hook.

use crate::domain::errors::{ConfigError, Result};
use crate::ports::ConfigStore;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

type BlockingFn = dyn Fn(&mut dyn ConfigStore) -> Result<()> + Send + Sync;
type DeferredFn = dyn for<'a> Fn(&'a mut dyn ConfigStore) -> BoxFuture<'a, Result<()>> + Send + Sync;

/// A function run against the store at a hook point.
///
/// # Examples
///
/// ```
/// use tiercfg::domain::{ConfigError, ConfigKey, Hook};
/// use serde_json::json;
///
/// let set_port = Hook::blocking(|store| {
///     store.set(&ConfigKey::from("port"), json!(8080));
///     Ok(())
/// });
///
/// let delayed = Hook::deferred(|store| {
///     Box::pin(async move {
///         store.set(&ConfigKey::from("ready"), json!(true));
///         Ok::<(), ConfigError>(())
///     })
/// });
/// assert!(!set_port.is_deferred());
/// assert!(delayed.is_deferred());
/// ```
#[derive(Clone)]
pub enum Hook {
    /// Runs to completion before the workflow continues.
    Blocking(Arc<BlockingFn>),
    /// Returns a future the async workflow awaits before continuing.
    Deferred(Arc<DeferredFn>),
}

impl Hook {
    /// Wraps a blocking closure.
    pub fn blocking<F>(f: F) -> Self
    where
        F: Fn(&mut dyn ConfigStore) -> Result<()> + Send + Sync + 'static,
    {
        Hook::Blocking(Arc::new(f))
    }

    /// Wraps a closure returning a boxed future.
    pub fn deferred<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut dyn ConfigStore) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        Hook::Deferred(Arc::new(f))
    }

    /// Returns true for hooks that need the async workflow.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Hook::Deferred(_))
    }

    /// Runs a blocking hook.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSettings` for a deferred hook, and whatever the hook
    /// itself returns otherwise.
    pub fn run_blocking(&self, store: &mut dyn ConfigStore) -> Result<()> {
        match self {
            Hook::Blocking(f) => f(store),
            Hook::Deferred(_) => Err(ConfigError::invalid_settings(
                "a deferred hook cannot run in sync mode",
            )),
        }
    }

    /// Runs the hook, awaiting it when deferred.
    pub async fn run(&self, store: &mut dyn ConfigStore) -> Result<()> {
        match self {
            Hook::Blocking(f) => f(store),
            Hook::Deferred(f) => f(store).await,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Blocking(_) => f.write_str("Hook::Blocking(<fn>)"),
            Hook::Deferred(_) => f.write_str("Hook::Deferred(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::ConfigKey;
    use serde_json::json;

    #[test]
    fn test_blocking_hook_writes_store() {
        let hook = Hook::blocking(|store| {
            store.set(&ConfigKey::from("a"), json!(1));
            Ok(())
        });
        let mut store = MemoryStore::new();
        hook.run_blocking(&mut store).unwrap();
        assert_eq!(store.get(&ConfigKey::from("a")), Some(json!(1)));
    }

    #[test]
    fn test_deferred_hook_refuses_blocking_run() {
        let hook = Hook::deferred(|_store| Box::pin(async { Ok::<(), ConfigError>(()) }));
        let mut store = MemoryStore::new();
        let err = hook.run_blocking(&mut store).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSettings { .. }));
    }

    #[tokio::test]
    async fn test_deferred_hook_is_awaited() {
        let hook = Hook::deferred(|store| {
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                store.set(&ConfigKey::from("late"), json!("done"));
                Ok::<(), ConfigError>(())
            })
        });
        let mut store = MemoryStore::new();
        hook.run(&mut store).await.unwrap();
        assert_eq!(store.get(&ConfigKey::from("late")), Some(json!("done")));
    }

    #[tokio::test]
    async fn test_hook_error_propagates() {
        let hook = Hook::blocking(|_store| Err(ConfigError::hook("boom")));
        let mut store = MemoryStore::new();
        let err = hook.run(&mut store).await.unwrap_err();
        assert_eq!(err.to_string(), "Hook failed: boom");
    }
}
