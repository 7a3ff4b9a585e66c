// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default indirection protocol handlers.
//!
//! | protocol  | input                 | result                               |
//! |-----------|-----------------------|--------------------------------------|
//! | `file`    | path                  | file bytes                           |
//! | `path`    | path                  | absolute path                        |
//! | `env`     | variable name         | variable value                       |
//! | `base64`  | base64 text           | decoded bytes                        |
//! | `exec`    | shell command         | trimmed standard output              |
//! | `glob`    | glob pattern          | array of matching paths              |
//! | `require` | path                  | file parsed with its extension codec |
//!
//! Relative paths are resolved against the pass base directory.

use crate::adapters::codecs::codec_for_path;
use crate::domain::{ConfigError, Result};
use crate::ports::{ProtocolContext, ProtocolHandler, Resolved};
use async_trait::async_trait;
use base64::Engine;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reads a file as raw bytes.
#[derive(Debug, Clone, Default)]
pub struct FileProtocol;

#[async_trait]
impl ProtocolHandler for FileProtocol {
    async fn resolve(&self, input: &str, ctx: &ProtocolContext) -> Result<Resolved> {
        tokio::fs::read(ctx.path(input))
            .await
            .map(Resolved::Bytes)
            .map_err(|e| ConfigError::indirection("file", input, e))
    }
}

/// Resolves a path against the base directory.
#[derive(Debug, Clone, Default)]
pub struct PathProtocol;

#[async_trait]
impl ProtocolHandler for PathProtocol {
    async fn resolve(&self, input: &str, ctx: &ProtocolContext) -> Result<Resolved> {
        Ok(Resolved::Text(ctx.path(input).display().to_string()))
    }
}

/// Reads an environment variable. A missing variable is an error.
#[derive(Debug, Clone, Default)]
pub struct EnvProtocol;

#[async_trait]
impl ProtocolHandler for EnvProtocol {
    async fn resolve(&self, input: &str, _ctx: &ProtocolContext) -> Result<Resolved> {
        std::env::var(input)
            .map(Resolved::Text)
            .map_err(|e| ConfigError::indirection("env", input, e))
    }
}

/// Decodes standard base64.
#[derive(Debug, Clone, Default)]
pub struct Base64Protocol;

#[async_trait]
impl ProtocolHandler for Base64Protocol {
    async fn resolve(&self, input: &str, _ctx: &ProtocolContext) -> Result<Resolved> {
        base64::engine::general_purpose::STANDARD
            .decode(input)
            .map(Resolved::Bytes)
            .map_err(|e| ConfigError::indirection("base64", input, e))
    }
}

/// Runs a command through the platform shell in the base directory.
#[derive(Debug, Clone, Default)]
pub struct ExecProtocol;

#[async_trait]
impl ProtocolHandler for ExecProtocol {
    async fn resolve(&self, input: &str, ctx: &ProtocolContext) -> Result<Resolved> {
        let mut command = if cfg!(windows) {
            let mut c = tokio::process::Command::new("cmd");
            c.arg("/C");
            c
        } else {
            let mut c = tokio::process::Command::new("sh");
            c.arg("-c");
            c
        };
        let output = command
            .arg(input)
            .current_dir(&ctx.base_dir)
            .output()
            .await
            .map_err(|e| ConfigError::indirection("exec", input, e))?;

        if !output.status.success() {
            return Err(ConfigError::IndirectionError {
                protocol: "exec".to_string(),
                value: input.to_string(),
                message: format!(
                    "command exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
                source: None,
            });
        }
        Ok(Resolved::Text(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        ))
    }
}

/// Expands a glob pattern into the sorted list of matching paths.
#[derive(Debug, Clone, Default)]
pub struct GlobProtocol;

#[async_trait]
impl ProtocolHandler for GlobProtocol {
    async fn resolve(&self, input: &str, ctx: &ProtocolContext) -> Result<Resolved> {
        let pattern = ctx.path(input).to_string_lossy().into_owned();
        let entries =
            glob::glob(&pattern).map_err(|e| ConfigError::indirection("glob", input, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ConfigError::indirection("glob", input, e))?;
            paths.push(path.display().to_string());
        }
        paths.sort();
        Ok(Resolved::Value(Value::Array(
            paths.into_iter().map(Value::String).collect(),
        )))
    }
}

/// Loads and parses a configuration file.
#[derive(Debug, Clone, Default)]
pub struct RequireProtocol;

#[async_trait]
impl ProtocolHandler for RequireProtocol {
    async fn resolve(&self, input: &str, ctx: &ProtocolContext) -> Result<Resolved> {
        let path = ctx.path(input);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::indirection("require", input, e))?;
        codec_for_path(&path)
            .parse(&content)
            .map(Resolved::Value)
            .map_err(|e| ConfigError::indirection("require", input, e))
    }
}

/// The default handler set, keyed by protocol name.
pub fn default_handlers() -> BTreeMap<String, Arc<dyn ProtocolHandler>> {
    let handlers: [(&str, Arc<dyn ProtocolHandler>); 7] = [
        ("file", Arc::new(FileProtocol)),
        ("path", Arc::new(PathProtocol)),
        ("env", Arc::new(EnvProtocol)),
        ("base64", Arc::new(Base64Protocol)),
        ("exec", Arc::new(ExecProtocol)),
        ("glob", Arc::new(GlobProtocol)),
        ("require", Arc::new(RequireProtocol)),
    ];
    handlers
        .into_iter()
        .map(|(name, handler)| (name.to_string(), handler))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn ctx(dir: &std::path::Path) -> ProtocolContext {
        ProtocolContext::new(dir)
    }

    #[tokio::test]
    async fn test_file_protocol_reads_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("secret.txt"), "s3cret").unwrap();
        let out = FileProtocol.resolve("secret.txt", &ctx(dir.path())).await.unwrap();
        assert_eq!(out, Resolved::Bytes(b"s3cret".to_vec()));
    }

    #[tokio::test]
    async fn test_file_protocol_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileProtocol
            .resolve("/does/not/exist", &ctx(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::IndirectionError { ref protocol, .. } if protocol == "file"));
    }

    #[tokio::test]
    async fn test_path_protocol() {
        let out = PathProtocol
            .resolve("conf/app.json", &ProtocolContext::new("/srv"))
            .await
            .unwrap();
        assert_eq!(out, Resolved::Text("/srv/conf/app.json".to_string()));
    }

    #[tokio::test]
    async fn test_env_protocol() {
        let ctx = ProtocolContext::new(".");
        let out = EnvProtocol.resolve("CARGO_MANIFEST_DIR", &ctx).await.unwrap();
        assert!(matches!(out, Resolved::Text(ref s) if !s.is_empty()));
        assert!(EnvProtocol
            .resolve("TIERCFG_SURELY_UNSET_VARIABLE", &ctx)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_base64_protocol() {
        let ctx = ProtocolContext::new(".");
        let out = Base64Protocol.resolve("YmFzZTY0", &ctx).await.unwrap();
        assert_eq!(out, Resolved::Bytes(b"base64".to_vec()));
        assert!(Base64Protocol.resolve("***", &ctx).await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exec_protocol() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("marker"), "").unwrap();
        let out = ExecProtocol.resolve("ls; echo done", &ctx(dir.path())).await.unwrap();
        assert_eq!(out, Resolved::Text("marker\ndone".to_string()));
        assert!(ExecProtocol.resolve("exit 3", &ctx(dir.path())).await.is_err());
    }

    #[tokio::test]
    async fn test_glob_protocol() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();
        let out = GlobProtocol.resolve("*.json", &ctx(dir.path())).await.unwrap();
        let expected: Vec<Value> = ["a.json", "b.json"]
            .iter()
            .map(|name| json!(dir.path().join(name).display().to_string()))
            .collect();
        assert_eq!(out, Resolved::Value(Value::Array(expected)));
    }

    #[tokio::test]
    async fn test_require_protocol_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("extra.json"), r#"{"nested": {"k": 1}}"#).unwrap();
        let out = RequireProtocol.resolve("extra.json", &ctx(dir.path())).await.unwrap();
        assert_eq!(out, Resolved::Value(json!({"nested": {"k": 1}})));
    }

    #[test]
    fn test_default_handler_names() {
        let names: Vec<String> = default_handlers().into_keys().collect();
        assert_eq!(
            names,
            vec!["base64", "env", "exec", "file", "glob", "path", "require"]
        );
    }
}
