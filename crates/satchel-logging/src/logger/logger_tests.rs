#![allow(non_snake_case)]

use super::*;
use satchel_core::{ColorMode, Config, LineTemplate, Palette, Preset, TagStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use test_case::test_case;

static EVENTS: Mutex<Vec<(u8, String, String)>> = Mutex::new(Vec::new());
static EVENTS_LOCK: Mutex<()> = Mutex::new(());

extern "C" fn record_event(
    level: u8,
    scope: *const std::ffi::c_char,
    message: *const u8,
    message_len: usize,
) {
    let scope = unsafe { std::ffi::CStr::from_ptr(scope) }
        .to_string_lossy()
        .into_owned();
    let message = unsafe { std::slice::from_raw_parts(message, message_len) };
    EVENTS
        .lock()
        .unwrap()
        .push((level, scope, String::from_utf8_lossy(message).into_owned()));
}

fn file_config(path: PathBuf, level: LogLevel) -> LoggingConfig {
    LoggingConfig {
        level,
        console: false,
        file: true,
        file_path: Some(path),
        color: ColorMode::Never,
        console_format: LineTemplate::parse("{tag} {scope} {msg}").unwrap(),
        file_format: LineTemplate::parse("{level} [{app}] {scope}: {msg}").unwrap(),
        timestamp_format: "%Y-%m-%d".to_string(),
        tag: TagStyle::default(),
        colors: Palette::new(),
    }
}

fn quiet_config(level: LogLevel) -> LoggingConfig {
    LoggingConfig {
        console: false,
        file: false,
        file_path: None,
        ..file_config(PathBuf::new(), level)
    }
}

// ============================================================================
// Level filtering
// ============================================================================

#[test_case(LogLevel::Info, LogLevel::Debug, false)]
#[test_case(LogLevel::Info, LogLevel::Info, true)]
#[test_case(LogLevel::Info, LogLevel::Error, true)]
#[test_case(LogLevel::Trace, LogLevel::Trace, true)]
#[test_case(LogLevel::Error, LogLevel::Warn, false)]
#[test_case(LogLevel::Off, LogLevel::Error, false)]
fn Logger___is_enabled___compares_against_threshold(
    threshold: LogLevel,
    event: LogLevel,
    expected: bool,
) {
    let logger = Logger::new(&quiet_config(threshold));

    assert_eq!(logger.is_enabled(event), expected);
}

#[test]
fn Logger___off_event___is_never_enabled() {
    let logger = Logger::new(&quiet_config(LogLevel::Trace));

    assert!(!logger.is_enabled(LogLevel::Off));
}

#[test]
fn Logger___set_level___applies_to_later_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let logger = Logger::new(&file_config(path.clone(), LogLevel::Info));

    assert!(!logger.log("demo", LogLevel::Debug, "s", "before"));
    logger.set_level(LogLevel::Debug);
    assert!(logger.log("demo", LogLevel::Debug, "s", "after"));

    assert_eq!(logger.level(), LogLevel::Debug);
    assert_eq!(fs::read_to_string(&path).unwrap(), "DEBUG [demo] s: after\n");
}

// ============================================================================
// Sinks
// ============================================================================

#[test]
fn Logger___file_disabled___has_no_file_path() {
    let logger = Logger::new(&quiet_config(LogLevel::Info));

    assert!(logger.file_path().is_none());
}

#[test]
fn Logger___file_enabled___writes_formatted_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs/app.log");
    let logger = Logger::new(&file_config(path.clone(), LogLevel::Trace));

    logger.log("demo", LogLevel::Warn, "pack", "low disk");
    logger.log("demo", LogLevel::Info, "unpack", "ok");

    assert_eq!(logger.file_path(), Some(path.as_path()));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "WARN [demo] pack: low disk\nINFO [demo] unpack: ok\n"
    );
}

#[test]
fn Logger___failing_sink___counts_dropped_write_without_failing() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::new(&file_config(dir.path().to_path_buf(), LogLevel::Info));

    assert!(logger.log("demo", LogLevel::Info, "s", "lost"));
    assert!(logger.log("demo", LogLevel::Info, "s", "lost again"));

    assert_eq!(logger.dropped_writes(), 2);
}

#[test]
fn Logger___callback___receives_raw_message() {
    let _guard = EVENTS_LOCK.lock().unwrap();
    EVENTS.lock().unwrap().clear();
    let logger = Logger::new(&quiet_config(LogLevel::Info));
    logger.set_callback(Some(record_event));

    logger.log("demo", LogLevel::Error, "install", "boom");
    logger.log("demo", LogLevel::Debug, "install", "filtered");

    let events = EVENTS.lock().unwrap();
    assert_eq!(*events, vec![(4, "install".to_string(), "boom".to_string())]);
}

#[test]
fn Logger___markup___is_removed_for_file_and_callback() {
    let _guard = EVENTS_LOCK.lock().unwrap();
    EVENTS.lock().unwrap().clear();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let logger = Logger::new(&file_config(path.clone(), LogLevel::Info));
    logger.set_callback(Some(record_event));

    logger.log("demo", LogLevel::Info, "pack", "wrote <bold>12</bold> entries");

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "INFO [demo] pack: wrote 12 entries\n"
    );
    let events = EVENTS.lock().unwrap();
    assert_eq!(
        *events,
        vec![(2, "pack".to_string(), "wrote 12 entries".to_string())]
    );
}

// ============================================================================
// Presets
// ============================================================================

#[test]
fn Logger___log_preset_with_override___keeps_preset_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let logger = Logger::new(&file_config(path.clone(), LogLevel::Trace));
    let presets = Config::default().presets;

    logger
        .log_preset("demo", &presets, "warn", Some("custom text"))
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "WARN [demo] warn: custom text\n"
    );
}

#[test]
fn Logger___log_preset_without_override___uses_default_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let logger = Logger::new(&file_config(path.clone(), LogLevel::Trace));
    let mut presets = PresetTable::new();
    presets.insert("shipped", Preset::new(LogLevel::Info, "package shipped").with_scope("release"));

    logger.log_preset("demo", &presets, "shipped", None).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "INFO [demo] release: package shipped\n"
    );
}

#[test]
fn Logger___unknown_preset___fails_and_emits_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");
    let logger = Logger::new(&file_config(path.clone(), LogLevel::Trace));

    let err = logger
        .log_preset("demo", &PresetTable::new(), "nope", None)
        .unwrap_err();

    assert_eq!(err, SatchelError::UnknownPreset("nope".to_string()));
    assert!(!path.exists());
}
