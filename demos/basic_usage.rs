//! Basic facade usage
//!
//! Demonstrates level gating, prefix/param contexts and multiple
//! formatter/output pairs.
//!
//! Run with: cargo run --example basic_usage

use rust_log_facade::prelude::*;
use rust_log_facade::{global, info};

fn main() -> Result<()> {
    println!("=== Rust Log Facade - Basic Usage Example ===\n");

    // Pretty lines on the console, JSON lines through a background worker
    let dispatcher = Dispatcher::builder()
        .level(LogLevel::Debug)
        .output(PrettyFormatter::default(), ConsoleOutput::new())
        .output(
            JsonFormatter::new(),
            BackgroundOutput::new(ConsoleOutput::stdout_only(), 256)?,
        )
        .build();

    println!("1. Logging at different levels:");
    let app = dispatcher.create_logger(Some("demo"));
    app.debug("This is a debug message");
    app.info("This is an info message");
    app.log("This is a log message");
    app.warn("This is a warning message");
    app.error("This is an error message");
    dispatcher.flush()?;

    println!("\n2. Contexts are immutable:");
    let http = app.prefix("http").param("port", 8080);
    let request = http.param("path", "/users").param("status", 200);
    request.info("request served");
    http.info("parent context is unchanged");
    info!(http, "{} requests in flight", 3);
    dispatcher.flush()?;

    println!("\n3. Structured payloads:");
    let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "cannot open socket");
    http.error(Value::from_error(&err));
    http.warn(Value::from_iter([
        ("retries", Value::from(3)),
        ("backoff_ms", Value::from(vec![100, 200, 400])),
    ]));
    dispatcher.flush()?;

    println!("\n4. Level threshold set to WARN, debug and info are hidden:");
    dispatcher.set_level_str("warn")?;
    app.debug("hidden");
    app.info("hidden");
    app.warn("visible");
    dispatcher.flush()?;

    println!("\n5. Process-wide default dispatcher:");
    global::add_output(PrettyFormatter::new(PrettyOptions::plain()), ConsoleOutput::new());
    global::create_logger(Some("global")).param("pid", std::process::id()).info("hello");

    println!("\nMetrics: {:?}", dispatcher.metrics());
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
