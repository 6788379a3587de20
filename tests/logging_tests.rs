// ABOUTME: Tests for the binary's logging setup
// ABOUTME: Installs the global subscriber once, attaches the JSON file, and checks config discovery lands in it

use smsgate::config::Config;
use smsgate::logging;

#[test]
fn test_config_discovery_is_logged_to_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut logs = logging::init();
    logs.write_json_to(dir.path()).unwrap();

    let missing = dir.path().join("nowhere.toml");
    std::env::set_var("SMSGATE_CONFIG_PATH", &missing);
    std::env::remove_var("GSM_PORT");
    std::env::remove_var("GSM_PIN");
    std::env::remove_var("GSM_MODEM_DRIVER");
    std::env::remove_var("SMSGATE_LOG_DIR");
    let _config = Config::load().unwrap();
    std::env::remove_var("SMSGATE_CONFIG_PATH");

    // Dropping the handle flushes the non-blocking writer
    drop(logs);

    let mut written = String::new();
    for entry in std::fs::read_dir(dir.path()).unwrap() {
        let path = entry.unwrap().path();
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("smsgate.log"))
        {
            written.push_str(&std::fs::read_to_string(path).unwrap());
        }
    }

    let events: Vec<serde_json::Value> = written
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(events.iter().any(|e| {
        e["level"] == "WARN"
            && e["fields"]["message"]
                .as_str()
                .is_some_and(|m| m.contains("SMSGATE_CONFIG_PATH does not exist"))
    }));
    assert!(events.iter().any(|e| e["fields"]["message"] == "Writing JSON logs"));
}
