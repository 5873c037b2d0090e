#![cfg(unix)]

use std::fs;
use std::path::Path;

use serde_json::json;
use ui_scenario_runner::browser::error::BrowserError;
use ui_scenario_runner::browser::locator::Locator;
use ui_scenario_runner::browser::page::PageDriver;
use ui_scenario_runner::browser::session::{BridgeConfig, BrowserSession};

// =========================================================================
// Stand-in bridge: a shell script speaking the same NDJSON protocol
// =========================================================================

fn write_bridge(dir: &Path) -> (BridgeConfig, std::path::PathBuf) {
    let script = dir.join("bridge.sh");
    let log = dir.join("requests.log");
    let body = format!(
        r#"echo '{{"ok":true,"ready":true}}'
while IFS= read -r line; do
  echo "$line" >> '{log}'
  case "$line" in
    *'"cmd":"quit"'*) echo '{{"ok":true}}'; exit 0 ;;
    *'"cmd":"click"'*) echo '{{"ok":false,"code":"no_match","error":"Timeout 500ms exceeded"}}' ;;
    *'"cmd":"url"'*) echo '{{"ok":true,"value":"https://app.test/"}}' ;;
    *) echo '{{"ok":false,"error":"boom"}}' ;;
  esac
done
"#,
        log = log.display()
    );
    fs::write(&script, body).expect("write bridge script");
    let config = BridgeConfig {
        node: "sh".into(),
        script: script.display().to_string(),
        headless: true,
    };
    (config, log)
}

#[test]
fn unresolved_element_maps_to_no_match() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (config, log) = write_bridge(dir.path());
    let mut session = BrowserSession::launch(&config).expect("bridge starts");

    let err = session
        .click(&Locator::new("#late"), &json!({ "timeout": 500 }))
        .expect_err("element never attaches");
    assert!(
        matches!(err, BrowserError::NoMatch { ref selector } if selector == "#late"),
        "{:?}",
        err
    );

    assert_eq!(session.url(&json!({})).expect("url"), "https://app.test/");

    let err = session
        .hover(&Locator::new("#x"), &json!({}))
        .expect_err("generic failure");
    assert!(matches!(err, BrowserError::Protocol { ref command, ref error } if command == "hover" && error == "boom"));

    session.quit().expect("quit");

    let requests = fs::read_to_string(&log).expect("requests logged");
    let click = requests
        .lines()
        .find(|l| l.contains("\"cmd\":\"click\""))
        .expect("click sent");
    let click: serde_json::Value = serde_json::from_str(click).expect("click is JSON");
    assert_eq!(click["options"]["timeout"], 500);
    assert_eq!(click["locator"]["selector"], "#late");
}

#[test]
fn missing_ready_signal_is_a_launch_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("silent.sh");
    fs::write(&script, "echo '{\"ok\":true}'\n").expect("write script");
    let config = BridgeConfig {
        node: "sh".into(),
        script: script.display().to_string(),
        headless: false,
    };

    let err = BrowserSession::launch(&config).err().expect("no ready signal");

    assert!(matches!(err, BrowserError::Protocol { ref command, .. } if command == "launch"));
}
