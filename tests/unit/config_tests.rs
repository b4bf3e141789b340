use std::net::{IpAddr, Ipv4Addr};

use vision_relay::{config::GlobalConfig, AppError};

fn sample_toml() -> &'static str {
    r#"
http_host = "0.0.0.0"
http_port = 9000
max_upload_bytes = 2048

[inference]
model = "gemini-2.0-flash"
api_base = "http://localhost:8089/v1beta"
max_retries = 5
retry_delay_seconds = 1
request_timeout_seconds = 10

[capture]
capture_interval = 4
test_mode = true
quality = 70
"#
}

#[test]
fn parses_valid_config() {
    let config = GlobalConfig::from_toml_str(sample_toml()).expect("config parses");

    assert_eq!(config.http_host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(config.http_port, 9000);
    assert_eq!(config.max_upload_bytes, 2048);
    assert_eq!(config.inference.model, "gemini-2.0-flash");
    assert_eq!(config.inference.max_retries, 5);
    assert_eq!(config.inference.request_timeout().as_secs(), 10);
    assert_eq!(config.capture.capture_interval, 4);
    assert!(config.capture.test_mode);
    assert_eq!(config.capture.quality, 70);
    assert!(
        config.inference.api_key.is_none(),
        "api key is never populated from TOML"
    );
}

#[test]
fn empty_config_uses_defaults() {
    let config = GlobalConfig::from_toml_str("").expect("empty config parses");

    assert_eq!(config, GlobalConfig::default());
    assert_eq!(config.http_port, 8000);
    assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8000");
    assert_eq!(config.inference.model, "gemini-2.5-flash");
    assert_eq!(config.inference.max_retries, 3);
    assert_eq!(config.inference.retry_delay_seconds, 2);
    assert_eq!(config.capture.quality, 85);
    assert!(!config.capture.test_mode);
}

#[test]
fn api_key_in_toml_is_ignored() {
    let config = GlobalConfig::from_toml_str(
        r#"
[inference]
api_key = "should-not-load"
"#,
    )
    .expect("config parses");
    assert!(config.inference.api_key.is_none());
}

#[test]
fn capture_interval_below_minimum_is_clamped() {
    let config = GlobalConfig::from_toml_str(
        r"
[capture]
capture_interval = 1
",
    )
    .expect("config parses");
    assert_eq!(config.capture.capture_interval, 2);
}

#[test]
fn zero_max_retries_is_rejected() {
    let result = GlobalConfig::from_toml_str(
        r"
[inference]
max_retries = 0
",
    );
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn out_of_range_quality_is_rejected() {
    let result = GlobalConfig::from_toml_str(
        r"
[capture]
quality = 0
",
    );
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn zero_request_timeout_is_rejected() {
    let result = GlobalConfig::from_toml_str(
        r"
[inference]
request_timeout_seconds = 0
",
    );
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn invalid_toml_is_config_error() {
    let err = GlobalConfig::from_toml_str("http_port = \"not a port\"").expect_err("must fail");
    assert!(err.to_string().starts_with("config: invalid config"));
}

#[test]
fn capture_settings_merge_capture_and_inference_tables() {
    let config = GlobalConfig::from_toml_str(sample_toml()).expect("config parses");
    let settings = config.capture_settings();

    assert_eq!(settings.capture_interval, 4);
    assert!(settings.test_mode);
    assert_eq!(settings.quality, 70);
    assert_eq!(settings.max_retries, 5);
    assert_eq!(settings.retry_delay, 1);
}

#[test]
fn loads_config_from_path() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("config.toml");
    std::fs::write(&path, sample_toml()).expect("write config");

    let config = GlobalConfig::load_from_path(&path).expect("config loads");
    assert_eq!(config.http_port, 9000);
}

#[test]
fn missing_config_file_is_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let result = GlobalConfig::load_from_path(temp.path().join("absent.toml"));
    assert!(matches!(result, Err(AppError::Config(_))));
}
