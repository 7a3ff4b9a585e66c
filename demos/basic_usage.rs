// SPDX-License-Identifier: MIT OR Apache-2.0

//! Basic usage example for the tiercfg crate.
//!
//! This example demonstrates:
//! - Layering argv, environment variables, a file and defaults
//! - Key normalization and nesting separators
//! - Hooks, required keys, templates and models
//!
//! To run this example:
//! ```bash
//! export APP_DATABASE__HOST_NAME="db.internal"
//! cargo run --example basic_usage -- --server.port=9090 --verbose
//! ```

use serde_json::json;
use std::io::Write;
use tiercfg::prelude::*;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    println!("=== tiercfg: Basic Usage ===\n");

    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .map_err(ConfigError::IoError)?;
    writeln!(file, "server:\n  host: 0.0.0.0\nname: from-file").map_err(ConfigError::IoError)?;

    let config = Settings::builder()
        .ignore_prefix("APP_")
        .separator("__")
        .normalize(Case::CamelCase)
        .parse_values(true)
        .file(file.path())
        .defaults(json!({
            "server": {"host": "localhost", "port": 8080},
            "database": {"hostName": "localhost", "port": 5432},
            "verbose": false
        }))
        .required(["server:port", "database:hostName"])
        .hook(
            Step::Defaults,
            Hook::blocking(|store| {
                let port = store.get(&ConfigKey::from("server:port"));
                store.set(&ConfigKey::from("summary:port"), port.unwrap_or_default());
                Ok(())
            }),
        )
        .model(
            "database",
            ModelShape::try_from(json!({"host": "database:hostName", "port": "database:port"}))?,
        )
        .configure()?;

    println!("--- Values ---");
    println!("server.host     = {:?}", config.get("server:host"));
    println!("server.port     = {:?}", config.get("server:port"));
    println!("database        = {:?}", config.get("database"));
    println!("verbose         = {:?}", config.get("verbose"));
    println!("name            = {:?}", config.get_or("name", json!("unnamed")));

    println!("\n--- Typed access ---");
    let port = config.value("server:port")?.as_i64("server:port")?;
    println!("server.port as i64 = {}", port);

    println!("\n--- Template ---");
    println!("{}", config.template("http://${server:host}:${server:port}/"));

    println!("\n--- Model ---");
    println!("database model = {:?}", config.model("database"));

    println!("\n--- Layers ---");
    println!("{:?}", config.store().layer_names());

    println!("\n=== Example Complete ===");
    Ok(())
}
