//! Process-wide default dispatcher
//!
//! The default dispatcher is shared by every test in this binary, so the
//! whole lifecycle is exercised in a single test.

use parking_lot::Mutex;
use rust_log_facade::global;
use rust_log_facade::prelude::*;
use std::sync::Arc;

#[test]
fn test_global_dispatcher_lifecycle() {
    let first = global::dispatcher();
    assert!(Arc::ptr_eq(&first, &global::dispatcher()));
    assert_eq!(global::levels(), LevelSet::all());
    assert_eq!(first.output_count(), 0);

    // Already created lazily, so installing another one fails
    assert!(matches!(
        global::install(Dispatcher::new()),
        Err(LoggerError::InvalidConfiguration { .. })
    ));

    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    global::add_output(
        |m: &Message| format!("{} {}", m.level, m.prefix_path()),
        move |m: &Message, f: &SharedFormatter| -> Result<()> {
            sink.lock().push(f.format(m)?);
            Ok(())
        },
    );

    global::set_level(LogLevel::Warn);
    let logger = global::create_logger(Some("app"));
    logger.info("filtered");
    logger.prefix("db").warn("slow query");
    assert_eq!(*lines.lock(), ["warn app.db"]);

    assert!(global::set_level_str("loud").is_err());
    assert!(global::set_level_str("error,debug").is_ok());
    logger.debug("visible");
    logger.warn("hidden");
    assert_eq!(lines.lock().len(), 2);

    global::set_outputs(Vec::new());
    logger.error("nowhere");
    assert_eq!(lines.lock().len(), 2);
    assert_eq!(global::dispatcher().output_count(), 0);
}
