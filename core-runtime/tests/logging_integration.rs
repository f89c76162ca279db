//! Integration tests for the logging setup.

use bridge_traits::time::{ConsoleLogger, LogLevel};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::Error;
use std::sync::Arc;

#[test]
fn test_global_init_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(ConsoleLogger {
            min_level: LogLevel::Warn,
        }));

    init_logging(config.clone()).expect("first initialization succeeds");
    tracing::info!(target: "core_fitness", "logging initialized");

    let second = init_logging(config);
    assert!(matches!(second, Err(Error::Logging(_))));
}

#[test]
fn test_default_format_tracks_build_profile() {
    #[cfg(debug_assertions)]
    assert_eq!(LogFormat::default(), LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LogFormat::default(), LogFormat::Json);
}
