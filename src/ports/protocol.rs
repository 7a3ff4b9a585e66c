// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indirection protocol handler trait definition.
//!
//! A configuration string of the form `name:rest` is an indirection when
//! `name` is a registered protocol. The handler for `name` receives `rest` and
//! produces the substituted value.

use crate::domain::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// The result of resolving one indirection.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolved {
    /// A structured value, used as-is.
    Value(Value),
    /// Text.
    Text(String),
    /// Raw bytes. They become text unless buffers are preserved.
    Bytes(Vec<u8>),
}

/// Context shared by every handler during one indirection pass.
#[derive(Clone, Debug)]
pub struct ProtocolContext {
    /// Directory relative references are resolved against.
    pub base_dir: PathBuf,
}

impl ProtocolContext {
    /// Creates a context rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolves a possibly relative path against the base directory.
    pub fn path(&self, input: &str) -> PathBuf {
        self.base_dir.join(input)
    }
}

/// A trait for protocol handlers.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use tiercfg::domain::Result;
/// use tiercfg::ports::{ProtocolContext, ProtocolHandler, Resolved};
///
/// #[derive(Debug)]
/// struct Upper;
///
/// #[async_trait]
/// impl ProtocolHandler for Upper {
///     async fn resolve(&self, input: &str, _ctx: &ProtocolContext) -> Result<Resolved> {
///         Ok(Resolved::Text(input.to_uppercase()))
///     }
/// }
/// ```
#[async_trait]
pub trait ProtocolHandler: Send + Sync + fmt::Debug {
    /// Resolves the part of the reference after `name:`.
    ///
    /// # Errors
    ///
    /// Returns `IndirectionError` when the reference cannot be resolved.
    async fn resolve(&self, input: &str, ctx: &ProtocolContext) -> Result<Resolved>;
}

type ResolveFn = dyn Fn(&str, &ProtocolContext) -> Result<Resolved> + Send + Sync;

/// Adapts a plain closure into a [`ProtocolHandler`].
///
/// ```rust
/// use tiercfg::ports::{FnHandler, Resolved};
///
/// let reverse = FnHandler::new(|input, _ctx| Ok(Resolved::Text(input.chars().rev().collect())));
/// # let _ = reverse;
/// ```
#[derive(Clone)]
pub struct FnHandler(Arc<ResolveFn>);

impl FnHandler {
    /// Wraps the closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &ProtocolContext) -> Result<Resolved> + Send + Sync + 'static,
    {
        FnHandler(Arc::new(f))
    }
}

impl fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler(<fn>)")
    }
}

#[async_trait]
impl ProtocolHandler for FnHandler {
    async fn resolve(&self, input: &str, ctx: &ProtocolContext) -> Result<Resolved> {
        (self.0)(input, ctx)
    }
}
