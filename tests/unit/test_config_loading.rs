//! Unit Tests for Configuration Loading
//!
//! File formats, partial files, search paths and validation.

use std::fs;

use ucli_driver::config::loader::{ConfigFormat, LoadOptions};
use ucli_driver::{load_config, ConfigLoader, DriverConfig, Error, ErrorKind};

#[test]
fn test_toml_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("driver.toml");

    let mut config = DriverConfig::default();
    config.engine.clock_pattern = "^core_clk$".to_string();
    config.session.read_timeout_ms = 5_000;
    ConfigLoader::save_to_path(&config, &path).unwrap();

    assert_eq!(ConfigLoader::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_json_file_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("driver.json");

    let mut config = DriverConfig::default();
    config.engine.init_commands = vec!["config ckptstep off".to_string()];
    ConfigLoader::save_to_path(&config, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.trim_start().starts_with('{'));
    assert_eq!(ConfigLoader::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("driver.toml");
    fs::write(
        &path,
        "[session]\nstartup_timeout_ms = 600000\n\n[engine]\nrewind_checkpoint = 3\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.session.startup_timeout_ms, 600_000);
    assert_eq!(config.engine.rewind_checkpoint, 3);
    assert_eq!(config.engine.prompt, "ucli% ");
    assert_eq!(config.session.read_timeout_ms, 30_000);
    assert_eq!(
        config.engine.interactive_flags,
        vec!["-ucli", "-suppress=ASLR_DETECTED_INFO", "-ucli2Proc"]
    );
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("driver.toml");
    fs::write(&path, "[engine]\nclock_pattern = \"(unclosed\"\n").unwrap();

    let err = ConfigLoader::load_from_file(&path).unwrap_err();
    assert!(
        matches!(err, Error::ConfigValidationFailed { ref field, .. } if field == "engine.clock_pattern")
    );
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_syntax_error_is_parse_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("driver.toml");
    fs::write(&path, "[session\nread_timeout_ms = ").unwrap();

    assert!(matches!(
        ConfigLoader::load_from_file(&path),
        Err(Error::ConfigParseFailed { ref format, .. }) if format == "TOML"
    ));
}

#[test]
fn test_search_path_prefers_toml() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join(".ucli-driver");

    let mut toml_config = DriverConfig::default();
    toml_config.session.history_limit = 10;
    ConfigLoader::save_to_path(&toml_config, &base.with_extension("toml")).unwrap();
    ConfigLoader::save_to_path(&DriverConfig::default(), &base.with_extension("json")).unwrap();

    let mut loader = ConfigLoader::new();
    loader.set_search_path(base.clone());
    let config = loader.load_with_options(LoadOptions::default()).unwrap();

    assert_eq!(config.session.history_limit, 10);
    assert_eq!(loader.current_path(), Some(base.with_extension("toml").as_path()));
}

#[test]
fn test_missing_files_fall_back_or_fail() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = ConfigLoader::new();
    loader.set_search_path(dir.path().join("absent"));

    let config = loader.load_with_options(LoadOptions::default()).unwrap();
    assert_eq!(config, DriverConfig::default());

    let strict = LoadOptions {
        create_default: false,
        validate: true,
    };
    assert!(matches!(
        loader.load_with_options(strict),
        Err(Error::ConfigNotFound)
    ));
}

#[test]
fn test_explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        load_config(Some(&missing)),
        Err(Error::ConfigLoadFailed { .. })
    ));
}

#[test]
fn test_validation_rules() {
    let base = DriverConfig::default();
    assert!(base.validate().is_ok());

    let cases: [(&str, fn(&mut DriverConfig)); 5] = [
        ("engine.prompt", |c: &mut DriverConfig| c.engine.prompt = "ucli%\n".to_string()),
        ("engine.clock_pattern", |c: &mut DriverConfig| c.engine.clock_pattern = "  ".to_string()),
        ("engine.rewind_checkpoint", |c: &mut DriverConfig| c.engine.rewind_checkpoint = 0),
        ("session.read_timeout_ms", |c: &mut DriverConfig| c.session.read_timeout_ms = 0),
        ("session.startup_timeout_ms", |c: &mut DriverConfig| c.session.startup_timeout_ms = 0),
    ];

    for (expected, mutate) in cases {
        let mut config = base.clone();
        mutate(&mut config);
        match config.validate() {
            Err(Error::ConfigValidationFailed { field, .. }) => assert_eq!(field, expected),
            other => panic!("{}: expected validation failure, got {:?}", expected, other),
        }
    }
}

#[test]
fn test_format_detection() {
    use std::path::Path;
    assert_eq!(ConfigFormat::from_path(Path::new("x.json")), ConfigFormat::Json);
    assert_eq!(ConfigFormat::from_path(Path::new("x.yaml")), ConfigFormat::Toml);
}
