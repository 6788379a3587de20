// ABOUTME: Tests for configuration loading and validation
// ABOUTME: Verifies TOML parsing, env var overrides, and required field validation

use serial_test::serial;
use smsgate::config::Config;
use smsgate::Port;
use std::io::Write;

/// Helper to clear all config-related env vars
fn clear_config_env_vars() {
    std::env::remove_var("SMSGATE_CONFIG_PATH");
    std::env::remove_var("SMSGATE_LOG_DIR");
    std::env::remove_var("GSM_PORT");
    std::env::remove_var("GSM_PIN");
    std::env::remove_var("GSM_MODEM_DRIVER");
}

/// Helper to create a temp config file and set the env var
fn setup_config(content: &str) -> tempfile::TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("smsgate.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    std::env::set_var("SMSGATE_CONFIG_PATH", config_path.to_str().unwrap());
    temp_dir
}

#[test]
#[serial]
fn test_config_loads_from_toml_file() {
    clear_config_env_vars();
    let _dir = setup_config(
        r#"
[gsm]
port = "/dev/ttyUSB0"
pin = "1234"

[gsm.modem]
type = "virtual"
signal = 14
"#,
    );

    let config = Config::load().unwrap();
    let gsm = config.gsm.unwrap();
    assert_eq!(gsm.id, "gsm");
    assert_eq!(gsm.port, Port::device("/dev/ttyUSB0"));
    assert_eq!(gsm.pin, Some("1234".to_string()));
    assert_eq!(gsm.modem.driver_type(), "virtual");

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_config_env_var_overrides() {
    clear_config_env_vars();
    let _dir = setup_config(
        r#"
[gsm]
port = "/dev/ttyUSB0"
"#,
    );
    std::env::set_var("GSM_PORT", "/dev/ttyACM0");
    std::env::set_var("GSM_PIN", "9876");
    std::env::set_var("SMSGATE_LOG_DIR", "/tmp/smsgate-logs");

    let config = Config::load().unwrap();
    let gsm = config.gsm.as_ref().unwrap();
    assert_eq!(gsm.port, Port::device("/dev/ttyACM0"));
    assert_eq!(gsm.pin.as_deref(), Some("9876"));
    assert_eq!(config.logging.dir.as_deref(), Some("/tmp/smsgate-logs"));

    // PIN is scrubbed from the environment once read
    assert!(std::env::var("GSM_PIN").is_err());

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_env_vars_enable_gsm_without_file_section() {
    clear_config_env_vars();
    let _dir = setup_config("");
    std::env::set_var("GSM_PORT", "auto");
    std::env::set_var("GSM_MODEM_DRIVER", "virtual");

    let config = Config::load().unwrap();
    let gsm = config.gsm.unwrap();
    assert_eq!(gsm.port, Port::Auto);
    assert_eq!(gsm.modem.driver_type(), "virtual");

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_config_without_gsm_section() {
    clear_config_env_vars();
    let _dir = setup_config(
        r#"
[logging]
dir = "/var/log/smsgate"
"#,
    );

    let config = Config::load().unwrap();
    assert!(config.gsm.is_none());
    assert_eq!(config.logging.dir.as_deref(), Some("/var/log/smsgate"));

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_config_rejects_invalid_pin() {
    clear_config_env_vars();
    let _dir = setup_config(
        r#"
[gsm]
pin = "12ab"
"#,
    );

    let err = Config::load().unwrap_err();
    assert!(err.to_string().contains("gsm.pin"));

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_config_rejects_malformed_toml() {
    clear_config_env_vars();
    let _dir = setup_config("[gsm\nport = ");

    assert!(Config::load().is_err());

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_log_dir_tilde_is_expanded() {
    clear_config_env_vars();
    let _dir = setup_config(
        r#"
[logging]
dir = "~/smsgate-logs"
"#,
    );

    let config = Config::load().unwrap();
    let dir = config.logging.dir.unwrap();
    if directories::BaseDirs::new().is_some() {
        assert!(!dir.starts_with('~'));
        assert!(dir.ends_with("smsgate-logs"));
    }

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_modem_driver_override_keeps_options_for_same_driver() {
    clear_config_env_vars();
    let _dir = setup_config(
        r#"
[gsm.modem]
type = "virtual"
signal = 9
"#,
    );
    std::env::set_var("GSM_MODEM_DRIVER", "virtual");

    let config = Config::load().unwrap();
    let modem = &config.gsm.as_ref().unwrap().modem;
    assert_eq!(modem.driver_type(), "virtual");
    assert_eq!(modem.to_json_value().unwrap()["signal"], 9);

    clear_config_env_vars();
}

#[test]
#[serial]
fn test_modem_driver_override_drops_options_of_other_driver() {
    clear_config_env_vars();
    let _dir = setup_config(
        r#"
[gsm.modem]
type = "virtual"
signal = 9
"#,
    );
    std::env::set_var("GSM_MODEM_DRIVER", "bench");

    let config = Config::load().unwrap();
    let modem = &config.gsm.as_ref().unwrap().modem;
    assert_eq!(modem.driver_type(), "bench");
    assert!(modem.options.is_empty());

    clear_config_env_vars();
}
