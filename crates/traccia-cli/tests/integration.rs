#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use traccia_core::store::{NewCertification, Store};

const ENV_OVERRIDES: &[&str] = &[
    "DATABASE_PATH",
    "DIRECTORY_BASE_URL",
    "DIRECTORY_API_TOKEN",
    "DIRECTORY_COMPANY_ID",
    "DIRECTORY_SYNC_CRON",
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_USER",
    "SMTP_PASSWORD",
    "SMTP_FROM",
    "SMTP_TLS",
    "WEBHOOK_URL",
];

fn traccia(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("traccia").unwrap();
    cmd.current_dir(dir.path())
        .env("TRACCIA_CONFIG", dir.path().join("traccia.yaml"));
    for key in ENV_OVERRIDES {
        cmd.env_remove(key);
    }
    cmd.env("DATABASE_PATH", dir.path().join("traccia.db"));
    cmd
}

fn write_config(dir: &TempDir, yaml: &str) {
    std::fs::write(dir.path().join("traccia.yaml"), yaml).unwrap();
}

// ---------------------------------------------------------------------------
// traccia config validate
// ---------------------------------------------------------------------------

#[test]
fn config_validate_accepts_missing_file() {
    let dir = TempDir::new().unwrap();
    traccia(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_rejects_bad_cron() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "directory:\n  sync_cron: \"whenever\"\n");
    traccia(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error] directory.sync_cron"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn config_validate_json_lists_warnings() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "smtp:\n  host: mail.acme.it\n");
    let output = traccia(&dir)
        .args(["--json", "config", "validate"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let warnings = value["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["level"], "warning");
}

// ---------------------------------------------------------------------------
// traccia rules
// ---------------------------------------------------------------------------

#[test]
fn rules_list_empty_mentions_defaults() {
    let dir = TempDir::new().unwrap();
    traccia(&dir)
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Built-in defaults apply"));
}

#[test]
fn rules_set_then_list() {
    let dir = TempDir::new().unwrap();
    traccia(&dir)
        .args(["rules", "set", "--thresholds", "30, 7,7,1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved global rule: thresholds 30,7,1"));
    traccia(&dir)
        .args([
            "rules",
            "set",
            "--category",
            "forklift",
            "--thresholds",
            "14",
            "--webhook",
            "true",
        ])
        .assert()
        .success();

    traccia(&dir)
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(global)"))
        .stdout(predicate::str::contains("forklift"));

    let output = traccia(&dir).args(["--json", "rules", "list"]).output().unwrap();
    let rules: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules = rules.as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules[0]["cert_type"].is_null());
    assert_eq!(rules[1]["cert_type"], "forklift");
    assert_eq!(rules[1]["webhook_enabled"], true);
}

#[test]
fn rules_set_rejects_garbage_thresholds() {
    let dir = TempDir::new().unwrap();
    traccia(&dir)
        .args(["rules", "set", "--thresholds", "soon,later"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid thresholds"));
}

// ---------------------------------------------------------------------------
// traccia settings
// ---------------------------------------------------------------------------

#[test]
fn settings_round_trip() {
    let dir = TempDir::new().unwrap();
    traccia(&dir)
        .args(["settings", "get", "directory_base_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(unset)"));
    traccia(&dir)
        .args(["settings", "set", "directory_base_url", "https://hr.acme.it"])
        .assert()
        .success();
    traccia(&dir)
        .args(["settings", "get", "directory_base_url"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://hr.acme.it"));
}

#[test]
fn settings_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    traccia(&dir)
        .args(["settings", "set", "smtp_host", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting 'smtp_host'"));
}

// ---------------------------------------------------------------------------
// traccia sync / alerts
// ---------------------------------------------------------------------------

#[test]
fn sync_without_directory_reports_and_succeeds() {
    let dir = TempDir::new().unwrap();
    let output = traccia(&dir).args(["--json", "sync", "run"]).output().unwrap();
    assert!(output.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["ok"], false);
    assert_eq!(outcome["message"], "directory config missing");
}

#[test]
fn alerts_run_on_fixed_day_sends_once() {
    let dir = TempDir::new().unwrap();
    {
        let store = Store::open(&dir.path().join("traccia.db")).unwrap();
        let emp = store.insert_employee("Paola", "Greco", None).unwrap();
        store
            .insert_certification(&NewCertification {
                employee_id: emp,
                cert_type: "forklift".into(),
                title: "Carrellista".into(),
                issued_date: None,
                expiry_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 8).unwrap(),
            })
            .unwrap();
    }

    traccia(&dir)
        .args(["alerts", "run", "--today", "2026-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alerts sent: 1"));
    traccia(&dir)
        .args(["alerts", "run", "--today", "2026-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alerts sent: 0"));
}

#[test]
fn alerts_run_rejects_bad_date() {
    let dir = TempDir::new().unwrap();
    traccia(&dir)
        .args(["alerts", "run", "--today", "01/03/2026"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date"));
}
