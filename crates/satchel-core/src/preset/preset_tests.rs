#![allow(non_snake_case)]

use super::*;

fn raw(level: &str, scope: Option<&str>, msg: &str) -> RawPreset {
    RawPreset {
        level: level.to_string(),
        scope: scope.map(str::to_string),
        msg: msg.to_string(),
    }
}

#[test]
fn PresetTable___builtin___contains_standard_presets() {
    let table = PresetTable::builtin().unwrap();

    for name in ["info", "warn", "error", "test_pass", "pack_ok", "install_ok"] {
        assert!(table.contains(name), "missing built-in preset {name}");
    }
}

#[test]
fn PresetTable___builtin___info_is_info_level() {
    let table = PresetTable::builtin().unwrap();

    assert_eq!(table.get("info").unwrap().level, LogLevel::Info);
}

#[test]
fn PresetTable___resolve_with_override___keeps_level_replaces_message() {
    let mut table = PresetTable::new();
    table.insert("deploy", Preset::new(LogLevel::Warn, "default text"));

    let resolved = table.resolve("deploy", Some("custom text")).unwrap();

    assert_eq!(resolved.level, LogLevel::Warn);
    assert_eq!(resolved.message, "custom text");
}

#[test]
fn PresetTable___resolve_with_empty_override___uses_default_message() {
    let mut table = PresetTable::new();
    table.insert("deploy", Preset::new(LogLevel::Info, "default text"));

    let resolved = table.resolve("deploy", Some("")).unwrap();

    assert_eq!(resolved.message, "default text");
}

#[test]
fn PresetTable___resolve_without_scope___uses_preset_name() {
    let mut table = PresetTable::new();
    table.insert("deploy", Preset::new(LogLevel::Info, "text"));
    table.insert("scoped", Preset::new(LogLevel::Info, "text").with_scope("ci"));

    assert_eq!(table.resolve("deploy", None).unwrap().scope, "deploy");
    assert_eq!(table.resolve("scoped", None).unwrap().scope, "ci");
}

#[test]
fn PresetTable___resolve_unknown___returns_unknown_preset() {
    let table = PresetTable::builtin().unwrap();

    let err = table.resolve("unknown_name", None).unwrap_err();

    assert_eq!(err, SatchelError::UnknownPreset("unknown_name".into()));
}

#[test]
fn PresetTable___merge_raw___overrides_by_name() {
    let mut table = PresetTable::builtin().unwrap();
    let before = table.len();
    let mut raw_map = BTreeMap::new();
    raw_map.insert("info".to_string(), raw("warn", Some("ops"), "overridden"));
    raw_map.insert("deploy_ok".to_string(), raw("info", None, "deployed"));

    table.merge_raw(raw_map).unwrap();

    assert_eq!(table.len(), before + 1);
    let info = table.get("info").unwrap();
    assert_eq!(info.level, LogLevel::Warn);
    assert_eq!(info.scope.as_deref(), Some("ops"));
    assert_eq!(info.message, "overridden");
}

#[test]
fn PresetTable___merge_raw_unknown_level___fails_with_key() {
    let mut table = PresetTable::new();
    let mut raw_map = BTreeMap::new();
    raw_map.insert("broken".to_string(), raw("loud", None, "text"));

    let err = table.merge_raw(raw_map).unwrap_err();

    assert!(err.to_string().contains("presets.broken.level"));
}

#[test]
fn PresetTable___merge_raw_off_level___is_rejected() {
    let mut table = PresetTable::new();
    let mut raw_map = BTreeMap::new();
    raw_map.insert("silent".to_string(), raw("off", None, "text"));

    assert!(table.merge_raw(raw_map).is_err());
}

#[test]
fn PresetTable___names___are_sorted() {
    let mut table = PresetTable::new();
    table.insert("b", Preset::new(LogLevel::Info, "b"));
    table.insert("a", Preset::new(LogLevel::Info, "a"));

    assert_eq!(table.names(), vec!["a", "b"]);
}
