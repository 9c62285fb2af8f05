//! Environment declaration example.
//!
//! This example declares the environment of a small web service, validates
//! all of it at startup, and prints a summary of every variable. Missing and
//! invalid variables are reported together, not one at a time.
//!
//! Run with:
//!   cargo run --example server
//!   PORT=99999 WORKERS=0 cargo run --example server   # see every error
//!   RUST_LOG=debug cargo run --example server         # see resolution logs
//!
//! Set `DEMO_STRICT=1` to exit through the default handler instead of
//! returning the errors.

use std::time::Duration;

use envspec::prelude::*;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
enum LogFormat {
    Text,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("=== Environment Declaration Demo ===\n");

    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let env = Environment::new();

    let port = network_port_number(&env, "PORT", "port to listen on")
        .default(8080u16)
        .declare()?;
    let workers = integer(&env, "WORKERS", "number of worker threads")
        .min(1)
        .max(64)
        .default(4)
        .declare()?;
    let timeout = duration(&env, "REQUEST_TIMEOUT", "request timeout")
        .max(Duration::from_secs(300))
        .default(Duration::from_secs(30))
        .declare()?;
    let public_url = url(&env, "PUBLIC_URL", "externally visible base URL")
        .protocols(["https", "http"])
        .default(url::Url::parse("http://localhost:8080/").map_err(|e| {
            SpecificationError::new("PUBLIC_URL", e.to_string())
        })?)
        .declare()?;
    let log_format = enumeration::<LogFormat>(&env, "LOG_FORMAT", "log output format")
        .member("text", LogFormat::Text, "human readable")
        .member("json", LogFormat::Json, "one JSON object per line")
        .default(LogFormat::Text)
        .declare()?;
    let debug = boolean(&env, "DEBUG", "enable debug endpoints")
        .literals(["true", "yes", "1"], ["false", "no", "0"])
        .default(false)
        .declare()?;
    let session_key = binary(&env, "SESSION_KEY", "cookie signing key")
        .length(Some(32), None)
        .sensitive()
        .declare_optional()?;
    let redis = kubernetes_address(&env, "redis-primary", "Redis primary")
        .declare_optional()?;

    if std::env::var_os("DEMO_STRICT").is_some() {
        // Prints a summary and exits with status 1 when anything is invalid
        env.initialize()?;
    } else {
        let mut invalid = false;
        env.initialize_with(|results| {
            eprintln!("{}", results.summary(&SummaryOptions::default()));
            invalid = true;
        })?;
        if invalid {
            // Every error again, for callers that want them as values
            let report = env.validate()?;
            return match report.errors() {
                Some(errors) => Err(Error::Invalid(errors)),
                None => Ok(()),
            };
        }
    }

    let report = env.validate()?;
    println!(
        "{}",
        envspec::render_summary(&report.results, &SummaryOptions::default())
    );

    let (port, workers, timeout) = (port.value()?, workers.value()?, timeout.value()?);
    info!(port, workers, timeout = ?timeout, "starting server");
    println!("Public URL: {}", public_url.value()?);
    println!("Log format: {:?}", log_format.value()?);
    println!("Debug endpoints: {}", debug.value()?);
    println!(
        "Session key: {}",
        if session_key.value()?.is_some() {
            "configured"
        } else {
            "generated at startup"
        }
    );
    match redis.value()? {
        Some(address) => println!("Redis: {}", address),
        None => println!("Redis: disabled"),
    }

    Ok(())
}
