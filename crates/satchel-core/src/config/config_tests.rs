#![allow(non_snake_case)]

use super::*;
use crate::style::{Rgb, TagAlign, TagTransform};
use crate::template::Placeholder;
use std::io::Write;

#[test]
fn Config___default___uses_builtin_values() {
    let config = Config::default();

    assert_eq!(config.app_name, "satchel");
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(config.logging.console);
    assert!(!config.logging.file);
    assert_eq!(config.logging.color, ColorMode::Auto);
    assert_eq!(config.archive.extension, "satchel");
    assert_eq!(config.archive.max_unpacked_bytes, 1024 * 1024 * 1024);
    assert!(!config.install.overwrite);
    assert!(config.presets.contains("info"));
    assert_eq!(config.logging.tag, TagStyle::default());
    assert!(config.logging.colors.is_empty());
}

#[test]
fn Config___from_empty_document___equals_default() {
    let config = Config::from_toml_str("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn Config___load_from_missing_file___falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let config = Config::load_from(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn Config___load_from_file___reads_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs/app.log");
    let path = dir.path().join("satchel.toml");
    let mut file = fs::File::create(&path).unwrap();
    write!(
        file,
        r#"
app_name = "demo"

[logging]
level = "debug"
console = false
file = true
file_path = "{}"
color = "never"
console_format = "{{level}} {{msg}}"

[archive]
extension = ".fpkg"
max_unpacked_bytes = 4096
max_entries = 10

[install]
root = "/opt/demo"
overwrite = true

[presets.deploy_ok]
level = "warn"
scope = "deploy"
msg = "deployed"
"#,
        log_path.display()
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.app_name, "demo");
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(!config.logging.console);
    assert!(config.logging.file);
    assert_eq!(config.logging.file_path.as_deref(), Some(log_path.as_path()));
    assert_eq!(config.logging.color, ColorMode::Never);
    assert!(config.logging.console_format.uses(Placeholder::Level));
    assert_eq!(config.archive.extension, "fpkg");
    assert_eq!(config.archive.max_unpacked_bytes, 4096);
    assert_eq!(config.archive.max_entries, 10);
    assert_eq!(config.install.root.as_deref(), Some(Path::new("/opt/demo")));
    assert!(config.install.overwrite);
    let preset = config.presets.get("deploy_ok").unwrap();
    assert_eq!(preset.level, LogLevel::Warn);
    assert_eq!(preset.scope.as_deref(), Some("deploy"));
    assert!(config.presets.contains("info"), "built-ins stay available");
}

#[test]
fn Config___tag_and_colors_tables___are_resolved() {
    let config = Config::from_toml_str(
        r##"
[logging.tag]
prefix = "<"
suffix = ">"
transform = "capitalize"
min_width = 8
align = "center"

[logging.tag.labels]
warn = "careful"
error = "oops"

[logging.colors]
error = "#ff5555"
accent = "8be9fd"
"##,
    )
    .unwrap();

    let tag = &config.logging.tag;
    assert_eq!(tag.transform, TagTransform::Capitalize);
    assert_eq!(tag.align, TagAlign::Center);
    assert_eq!(tag.labels.get(&LogLevel::Error).map(String::as_str), Some("oops"));
    assert_eq!(tag.render(LogLevel::Error), "<  Oops  >");
    assert_eq!(tag.render(LogLevel::Info), "<  Info  >");
    assert_eq!(config.logging.colors.level(LogLevel::Error), Some(Rgb::new(0xff, 0x55, 0x55)));
    assert_eq!(config.logging.colors.get("accent"), Some(Rgb::new(0x8b, 0xe9, 0xfd)));
}

#[test]
fn Config___tag_transform_aliases___are_accepted() {
    let config = Config::from_toml_str("[logging.tag]\ntransform = \"lowercase\"").unwrap();

    assert_eq!(config.logging.tag.transform, TagTransform::Lower);
}

#[test]
fn Config___unknown_tag_key___fails_with_parse_error() {
    let err = Config::from_toml_str("[logging.tag]\npadding = 3").unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn Config___load_from_directory___fails_with_read_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = Config::load_from(dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn Config___malformed_syntax___fails_with_parse_error() {
    let err = Config::from_toml_str("[logging\nlevel = ").unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn Config___unknown_key___fails_with_parse_error() {
    let err = Config::from_toml_str("[logging]\nverbosity = 3").unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn Config___file_sink_without_path___gets_default_path() {
    let config = Config::from_toml_str("app_name = \"demo\"\n[logging]\nfile = true").unwrap();

    if let Some(path) = config.logging.file_path {
        assert!(path.ends_with("satchel/demo.log"));
    }
}

#[test]
fn Config___overrides___win_over_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("satchel.toml");
    fs::write(&path, "app_name = \"from-file\"\n[logging]\nlevel = \"warn\"").unwrap();
    let overrides = ConfigOverrides {
        app_name: Some("from-host".into()),
        log_level: Some(LogLevel::Trace),
    };

    let config = Config::load_from_with(&path, &overrides).unwrap();

    assert_eq!(config.app_name, "from-host");
    assert_eq!(config.logging.level, LogLevel::Trace);
}

#[test]
fn Config___empty_app_name___is_rejected() {
    let err = Config::from_toml_str("app_name = \"  \"").unwrap_err();

    assert!(err.to_string().contains("app_name"));
}

#[test]
fn expand_home___plain_path___is_unchanged() {
    assert_eq!(expand_home("/var/log/x.log"), PathBuf::from("/var/log/x.log"));
}

#[test]
fn expand_home___tilde_prefix___uses_home_directory() {
    if let Some(home) = dirs::home_dir() {
        assert_eq!(expand_home("~/logs/x.log"), home.join("logs/x.log"));
    }
}
