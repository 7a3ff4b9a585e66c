// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async resolution with protocol indirection.
//!
//! This example demonstrates:
//! - Deferred hooks awaited by the async workflow
//! - Built-in protocols (`file:`, `base64:`, `exec:`, `require:`)
//! - A custom protocol handler
//!
//! To run this example:
//! ```bash
//! cargo run --example async_indirection
//! ```

use serde_json::json;
use std::fs;
use tiercfg::ports::FnHandler;
use tiercfg::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== tiercfg: Async Indirection ===\n");

    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("password.txt"), "hunter2")?;
    fs::write(
        dir.path().join("extra.json"),
        r#"{"pool": {"min": 1, "max": 8}}"#,
    )?;

    let indirection = IndirectionSettings::new()
        .base_dir(dir.path())
        .protocol(
            "upper",
            FnHandler::new(|input, _ctx| Ok(Resolved::Text(input.to_uppercase()))),
        );

    let config = Settings::builder()
        .mode(Mode::Async)
        .defaults(json!({
            "db": {
                "password": "file:password.txt",
                "user": "base64:YWRtaW4=",
                "settings": "require:extra.json"
            },
            "region": "upper:eu-west-1",
            "hostname": "exec:echo demo-host",
            "tags": ["upper:a", "plain"]
        }))
        .hook(
            Step::Defaults,
            Hook::deferred(|store| {
                Box::pin(async move {
                    // Simulates fetching a value from a remote service.
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    store.set(&ConfigKey::from("fetched"), json!(true));
                    Ok::<(), ConfigError>(())
                })
            }),
        )
        .indirection(indirection)
        .resolve()
        .await?;

    println!("db.password = {:?}", config.get("db:password"));
    println!("db.user     = {:?}", config.get("db:user"));
    println!("db.settings = {:?}", config.get("db:settings"));
    println!("region      = {:?}", config.get("region"));
    println!("hostname    = {:?}", config.get("hostname"));
    println!("tags        = {:?}", config.get("tags"));
    println!("fetched     = {:?}", config.get("fetched"));

    println!("\n=== Example Complete ===");
    Ok(())
}
