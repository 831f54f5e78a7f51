use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SALES: &str = r#"{
    "summary": {"total_sales": 100000, "total_orders": 40, "previous_sales": 80000},
    "paymentBreakdown": [
        {"payment_type": "Cash", "amount": 70000, "transactions": 30},
        {"payment_type": "M-Pesa", "amount": 30000, "transactions": 10}
    ],
    "topCustomers": [
        {"customer_name": "Mama Mboga, & Sons", "total_spent": 12000, "orders": 6}
    ]
}"#;

fn tally(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn payload(dir: &TempDir, json: &str) -> String {
    let path = dir.path().join("payload.json");
    std::fs::write(&path, json).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn kinds_lists_every_report() {
    let home = TempDir::new().unwrap();
    tally(home.path())
        .arg("kinds")
        .assert()
        .success()
        .stdout(predicate::str::contains("inventory-report"))
        .stdout(predicate::str::contains("top-sales-reps-report"));
}

#[test]
fn show_renders_recommendations() {
    let home = TempDir::new().unwrap();
    let input = payload(&home, SALES);
    tally(home.path())
        .args(["show", "sales", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales Report"))
        .stdout(predicate::str::contains("KES 100,000"))
        .stdout(predicate::str::contains("maintain positive momentum"));
}

#[test]
fn show_reads_stdin() {
    let home = TempDir::new().unwrap();
    tally(home.path())
        .args(["show", "daily-sales", "-"])
        .write_stdin(r#"{"date": "2025-03-04", "sales": []}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("04 Mar 2025"));
}

#[test]
fn export_csv_to_explicit_file() {
    let home = TempDir::new().unwrap();
    let input = payload(&home, SALES);
    let out = home.path().join("out").join("sales.csv");
    tally(home.path())
        .args(["export", "sales", &input, "--format", "csv", "--output"])
        .arg(&out)
        .args(["--period", "March 2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(text/csv)"));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("Sales Report\n"));
    assert!(text.contains("Period,March 2025"));
    assert!(text.contains("Mama Mboga; & Sons"));
    assert!(text.contains("100000"));
}

#[test]
fn export_defaults_to_configured_directory() {
    let home = TempDir::new().unwrap();
    let input = payload(&home, SALES);
    let exports = home.path().join("exports");
    tally(home.path())
        .args(["settings", "--company", "Duka Ltd", "--export-dir"])
        .arg(&exports)
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings saved."));

    tally(home.path())
        .args(["export", "sales", &input, "--format", "html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sales-report-"))
        .stdout(predicate::str::contains("(text/html)"));

    let files: Vec<_> = std::fs::read_dir(&exports)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("sales-report-") && files[0].ends_with(".html"));
    let html = std::fs::read_to_string(exports.join(&files[0])).unwrap();
    assert!(html.contains("Duka Ltd"));
    assert!(html.contains("Mama Mboga, &amp; Sons"));
}

#[cfg(feature = "pdf")]
#[test]
fn export_pdf() {
    let home = TempDir::new().unwrap();
    let input = payload(&home, SALES);
    let out = home.path().join("sales.pdf");
    tally(home.path())
        .args(["export", "sales", &input, "--format", "pdf", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("(application/pdf)"));
    assert!(std::fs::read(&out).unwrap().starts_with(b"%PDF"));
}

#[test]
fn null_payload_has_nothing_to_export() {
    let home = TempDir::new().unwrap();
    let input = payload(&home, "null");
    let out = home.path().join("never.csv");
    tally(home.path())
        .args(["export", "inventory", &input, "--output"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to export"));
    assert!(!out.exists());
}

#[test]
fn malformed_amount_is_rejected() {
    let home = TempDir::new().unwrap();
    let input = payload(&home, r#"{"summary": {"total_sales": "lots"}}"#);
    tally(home.path())
        .args(["show", "sales", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid payload"));
}

#[test]
fn settings_without_flags_prints_defaults() {
    let home = TempDir::new().unwrap();
    tally(home.path())
        .arg("settings")
        .assert()
        .success()
        .stdout(predicate::str::contains("Currency prefix:  KES"))
        .stdout(predicate::str::contains("Settings saved.").not());
}

#[test]
fn currency_setting_flows_into_reports() {
    let home = TempDir::new().unwrap();
    let input = payload(&home, SALES);
    tally(home.path())
        .args(["settings", "--currency", "UGX"])
        .assert()
        .success();
    tally(home.path())
        .args(["show", "sales", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("UGX 100,000"));
}

#[test]
fn missing_input_file_fails() {
    let home = TempDir::new().unwrap();
    tally(home.path())
        .args(["show", "commission", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}
