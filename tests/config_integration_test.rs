mod common;
use common::*;

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tintlog::{infof, warnf, ConfigFile, Flags, Level, Logger, Registry};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("tintlog.ini");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_registry_applies_config_sections() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "level = warn\nflags = none\n\n[logger.net]\nlevel = debug\noutput = net.log\n",
    );
    let config = ConfigFile::load_from_path(&path).unwrap();

    let registry = Registry::new();
    let net = registry.create("net");
    let db = registry.create("db");
    registry.apply_config(&config).unwrap();

    assert_eq!(net.level(), Level::Debug);
    assert_eq!(db.level(), Level::Warn);
    assert_eq!(db.flags(), Flags::NONE);

    infof!(net, "handshake");
    assert_eq!(
        fs::read_to_string(dir.path().join("net.log")).unwrap(),
        "INFO net handshake\n"
    );
}

#[test]
fn test_color_rules_from_config_are_shared() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("rules.json"),
        r#"{"Rule": [{"Text": "peer", "Color": "Blue"}]}"#,
    )
    .unwrap();
    let path = write_config(&dir, "color_rules = rules.json\nflags = none\n");
    let config = ConfigFile::load_from_path(&path).unwrap();

    let registry = Registry::new();
    let (logger, buffer) = capture_logger("net");
    let logger = Arc::new(logger);
    registry.register(Arc::clone(&logger));
    registry.apply_config(&config).unwrap();
    logger.enable_color(true);

    infof!(logger, "peer up");
    assert_eq!(buffer.text(), "\x1b[34mINFO net peer up\x1b[0m\n");
}

#[test]
fn test_config_errors_name_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "level = deafening\n");

    let err = ConfigFile::load_from_path(&path).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("tintlog.ini"), "{}", message);
    assert!(message.contains("deafening"), "{}", message);
}

#[test]
fn test_missing_rules_file_fails_apply() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "color_rules = missing.json\n");
    let config = ConfigFile::load_from_path(&path).unwrap();

    let registry = Registry::new();
    registry.create("x");
    assert!(registry.apply_config(&config).is_err());
}

#[test]
fn test_cli_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "flags = none\n[logger.cfg]\nlevel = error\n");

    let (stdout, _stderr, exit_code) = run_tintlog(&[
        "--config",
        path.to_str().unwrap(),
        "-n",
        "cfg",
        "-l",
        "warn",
        "filtered",
    ]);
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "");

    let (stdout, _stderr, _) = run_tintlog(&[
        "--config",
        path.to_str().unwrap(),
        "-n",
        "other",
        "-l",
        "warn",
        "shown",
    ]);
    assert_eq!(stdout, "WARN other shown\n");
}

#[test]
fn test_cli_overrides_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "flags = none\nlevel = error\n");

    let (stdout, _stderr, _) = run_tintlog(&[
        "--config",
        path.to_str().unwrap(),
        "--min-level",
        "debug",
        "-l",
        "info",
        "override",
    ]);
    assert_eq!(stdout, "INFO tintlog override\n");
}

#[test]
fn test_logger_without_registry_is_independent() {
    let logger = Logger::new("solo");
    let registry = Registry::new();
    registry.create("solo");
    registry.set_level("solo", Level::Fatal).unwrap();

    // Same name, different instance
    assert_eq!(logger.level(), Level::Debug);
    let (captured, buffer) = capture_logger("solo");
    captured.set_flags(Flags::NONE);
    warnf!(captured, "still here");
    assert_eq!(buffer.text(), "WARN solo still here\n");
}
