//! Unit tests for log.rs
//!
//! Tests Logger trait, LogEntry, LogSeverity, DefaultLogger and the logger slot.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use serial_test::serial;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Logger that records every entry it receives
#[derive(Clone, Default)]
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "spatial::test".to_string(),
        message: "message".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_round_trips_through_u8() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(LogSeverity::from_u8(severity as u8), severity);
    }
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_with_file_line() {
    let e = entry(LogSeverity::Error, Some("octree.rs"), Some(42));
    assert_eq!(e.severity, LogSeverity::Error);
    assert_eq!(e.file, Some("octree.rs"));
    assert_eq!(e.line, Some(42));

    let debug_str = format!("{:?}", e);
    assert!(debug_str.contains("spatial::test"));
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    logger.log(&entry(LogSeverity::Trace, None, None));
    logger.log(&entry(LogSeverity::Debug, None, None));
    logger.log(&entry(LogSeverity::Info, None, None));
    logger.log(&entry(LogSeverity::Warn, None, None));
    logger.log(&entry(LogSeverity::Error, Some("file.rs"), Some(1)));
}

// ============================================================================
// LOGGER SLOT TESTS
// ============================================================================

#[test]
#[serial]
fn test_custom_logger_receives_macro_output() {
    let capture = CaptureLogger::default();
    log::set_logger(capture.clone());
    log::set_min_severity(LogSeverity::Trace);

    crate::spatial_debug!("spatial::test", "built {} nodes", 7);
    crate::spatial_error!("spatial::test", "rejected {}", "input");

    log::reset_logger();
    log::set_min_severity(LogSeverity::Info);

    let entries = capture.entries.lock().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].severity, LogSeverity::Debug);
    assert_eq!(entries[0].message, "built 7 nodes");
    assert!(entries[0].file.is_none());
    assert_eq!(entries[1].severity, LogSeverity::Error);
    assert!(entries[1].file.is_some());
    assert!(entries[1].line.is_some());
}

#[test]
#[serial]
fn test_min_severity_filters_entries() {
    let capture = CaptureLogger::default();
    log::set_logger(capture.clone());
    log::set_min_severity(LogSeverity::Warn);

    crate::spatial_trace!("spatial::test", "dropped");
    crate::spatial_info!("spatial::test", "dropped");
    crate::spatial_warn!("spatial::test", "kept");

    log::reset_logger();
    log::set_min_severity(LogSeverity::Info);

    let entries = capture.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "kept");
}

#[test]
#[serial]
fn test_default_min_severity_is_info() {
    log::set_min_severity(LogSeverity::Info);
    assert_eq!(log::min_severity(), LogSeverity::Info);
    assert!(!log::enabled(LogSeverity::Debug));
    assert!(log::enabled(LogSeverity::Error));
}
