use chrono::TimeDelta;
use rask_log_rotator::app::runtime::Runtime;
use rask_log_rotator::config::{ConfigError, Settings};
use rask_log_rotator::domain::{Interval, RestartMethod};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_file_builds_runtime() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("httpd.conf"),
        "ErrorLog logs/error_log\n<VirtualHost *:80>\n  JkLogFile logs/mod_jk.log\n</VirtualHost>\n",
    )
    .unwrap();
    let config_path = dir.path().join("rotator.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
enabled = true
interval = "weekly"
offset_secs = 7200
keep = 4
restart_method = "full"
server_root = "{}"
host_config = "httpd.conf"
log_files = ["/var/log/app.log"]

[[log_directives]]
name = "JkLogFile"
"#,
            dir.path().display()
        ),
    )
    .unwrap();

    let settings = Settings::from_file(&config_path).unwrap();
    let runtime = Runtime::from_settings(settings).unwrap();

    assert_eq!(runtime.rotation.interval, Interval::Weekly);
    assert_eq!(runtime.rotation.offset, TimeDelta::hours(2));
    assert_eq!(runtime.rotation.keep, 4);
    assert_eq!(runtime.rotation.restart_method, RestartMethod::Full);
    assert_eq!(
        runtime.files.paths(),
        &[
            dir.path().join("logs/error_log"),
            dir.path().join("logs/mod_jk.log"),
            PathBuf::from("/var/log/app.log"),
        ]
    );
}

#[test]
fn test_invalid_values_fail_at_load() {
    let cases = [
        r#"interval = "fortnightly""#,
        r#"restart_method = "reboot""#,
        "nice_level = 42",
        r#"format = "%Y-%""#,
        "compress_after = -2",
        "tick_interval_secs = 0",
        "offset_secs = 10000000000000",
    ];
    for case in cases {
        assert!(Settings::from_toml_str(case).is_err(), "accepted: {case}");
    }
}

#[test]
fn test_missing_file_is_a_file_error() {
    let dir = TempDir::new().unwrap();
    let err = Settings::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileError(_)));
}

#[test]
fn test_accepted_offset_never_panics_the_clock() {
    let settings =
        Settings::from_toml_str("enabled = true\ninterval = \"daily\"\noffset_secs = -31622400")
            .unwrap();
    let clock = settings.rotation_config().unwrap().clock();
    let now = chrono::Utc::now();
    assert!(clock.boundary(&now, 1) > clock.boundary(&now, -1));
}
