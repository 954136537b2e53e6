//! E2E tests for the command line surfaces

use std::process::{Command, Output};

fn microfisc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_microfisc"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn simulate_service_without_acre() {
    let output = microfisc(&["simulate", "-r", "5000", "-a", "service", "-y", "2025"]);
    let stdout = stdout(&output);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("1060.00 €"));
    assert!(stdout.contains("3940.00 €"));
    assert!(stdout.contains("21.20%"));
}

#[test]
fn simulate_json_with_acre_and_bareme() {
    let output = microfisc(&[
        "simulate",
        "-r",
        "4000",
        "-a",
        "liberal",
        "--acre-since",
        "2025",
        "-i",
        "bareme",
        "-p",
        "0.06",
        "-y",
        "2025",
        "--json",
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["acre_year"], 1);
    assert_eq!(json["result"]["contributions"], "422.00");
    assert_eq!(json["result"]["income_tax"], "158.40");
    assert_eq!(json["result"]["net_after_all"], "3419.60");
}

#[test]
fn simulate_incomplete_input_has_no_result() {
    let output = microfisc(&["simulate", "-r", "5000", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["result"].is_null());
}

#[test]
fn simulate_rejects_out_of_range_provision_rate() {
    let output = microfisc(&[
        "simulate", "-r", "1000", "-a", "sale", "-i", "bareme", "-p", "0.5",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("provision rate"));
}

#[test]
fn history_monthly_growth() {
    let output = microfisc(&["history", "tests/data/history.json", "-y", "2025", "--csv"]);
    let stdout = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].contains("period"));
    assert!(lines[1].starts_with("2025-01"));
    assert!(lines[1].ends_with("—"));
    assert!(lines[2].ends_with("+50.0%"));
    assert!(lines[3].ends_with("-100.0%"));
    assert!(lines[4].ends_with("∞"));
}

#[test]
fn history_reads_csv() {
    let output = microfisc(&["history", "tests/data/history.csv", "--records"]);
    let stdout = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Profession libérale"));
    assert!(stdout.contains("Barème progressif"));
}

#[test]
fn summary_json_totals() {
    let output = microfisc(&["summary", "tests/data/history.json", "-y", "2025", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["record_count"], 4);
    assert_eq!(json["distinct_months"], 4);
    assert_eq!(json["total_revenue"], "6500.00");
    assert_eq!(json["total_contributions"], "622.25");
    assert_eq!(json["total_income_tax"], "100.00");
    assert_eq!(json["total_net"], "5777.75");
    assert_eq!(json["average_monthly_revenue"], "1625.00");
    assert_eq!(json["latest_growth"], "∞");
    assert_eq!(json["dominant_activity"], "Service");
    assert_eq!(json["ceiling"], "77700.00");
    assert_eq!(json["ceiling_progress_pct"], "8.37");
}

#[test]
fn summary_without_records() {
    let output = microfisc(&["summary", "tests/data/history.json", "-y", "2019"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("No declarations recorded."));
}

#[test]
fn context_matches_summary() {
    let output = microfisc(&["context", "tests/data/history.json", "-y", "2025"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["year"], 2025);
    assert_eq!(json["total_revenue"].as_f64(), Some(6500.0));
    assert_eq!(json["total_contributions"].as_f64(), Some(622.25));
    assert_eq!(json["average_monthly_revenue"].as_f64(), Some(1625.0));
    assert_eq!(json["latest_growth"]["kind"], "infinite");
    assert_eq!(json["ceiling_progress"].as_f64(), Some(0.0837));
}

#[test]
fn context_all_years() {
    let output = microfisc(&["context", "tests/data/history.json", "--all"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.get("year").is_none());
    assert_eq!(json["record_count"], 5);
    assert_eq!(json["total_revenue"].as_f64(), Some(7500.0));
}

#[test]
fn export_csv_totals() {
    let output = microfisc(&[
        "export",
        "tests/data/history.json",
        "-y",
        "2025",
        "--format",
        "csv",
    ]);
    let stdout = stdout(&output);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        stdout.lines().last(),
        Some("TOTAL,,6500.00,622.25,100.00,5877.75,5777.75")
    );
}

#[test]
fn export_html_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.html");
    let output = microfisc(&[
        "export",
        "tests/data/history.json",
        "-y",
        "2025",
        "-o",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("6500.00 €"));
    assert!(html.contains("Bilan micro-entreprise"));
}

#[test]
fn validate_consistent_history() {
    let output = microfisc(&["validate", "tests/data/history.json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).contains("No issues found"));
}

#[test]
fn validate_flags_divergence() {
    let output = microfisc(&["validate", "tests/data/diverged.json", "--json"]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["issue_count"], 3);
    assert_eq!(json["issues"][0]["field"], "contributions");
    assert_eq!(json["issues"][0]["expected"], "615.00");
}

#[test]
fn record_appends_to_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let file = path.to_str().unwrap();

    let first = microfisc(&[
        "record", "-f", file, "-y", "2025", "-m", "1", "-r", "5000", "-a", "sale",
        "--acre-since", "2025",
    ]);
    assert!(first.status.success(), "Command failed: {:?}", first);
    assert!(stdout(&first).contains("307.50 €"));

    let second = microfisc(&[
        "record", "-f", file, "-y", "2025", "-m", "2", "-r", "2000", "-a", "sale",
    ]);
    assert!(second.status.success(), "Command failed: {:?}", second);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let records = json["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0]["ir_mode"].is_null());
    assert!(records[0]["ir_amount"].is_null());
    assert_eq!(json["profile"]["acre"]["enrollment_year"], 2025);

    let validate = microfisc(&["validate", file]);
    assert!(validate.status.success(), "Command failed: {:?}", validate);
}

#[test]
fn record_keeps_each_month_provision_rate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let file = path.to_str().unwrap();

    for (month, rate) in [("1", "0.06"), ("2", "0.10")] {
        let output = microfisc(&[
            "record", "-f", file, "-y", "2025", "-m", month, "-r", "4000", "-a", "liberal",
            "-i", "bareme", "-p", rate,
        ]);
        assert!(output.status.success(), "Command failed: {:?}", output);
    }

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["records"][0]["bareme_provision_rate"], "0.06");
    assert_eq!(json["records"][0]["ir_amount"], "158.40");
    assert_eq!(json["records"][1]["bareme_provision_rate"], "0.10");
    assert_eq!(json["profile"]["bareme_provision_rate"], "0.10");

    let validate = microfisc(&["validate", file]);
    assert!(validate.status.success(), "Command failed: {:?}", validate);
    assert!(stdout(&validate).contains("No issues found"));
}

#[test]
fn record_refuses_csv_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.csv");
    std::fs::copy("tests/data/history.csv", &path).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let output = microfisc(&[
        "record",
        "-f",
        path.to_str().unwrap(),
        "-y",
        "2025",
        "-m",
        "6",
        "-r",
        "1000",
        "-a",
        "sale",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("JSON"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);

    let history = microfisc(&["history", path.to_str().unwrap(), "--records"]);
    assert!(history.status.success(), "Command failed: {:?}", history);
}

#[test]
fn record_refuses_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_microfisc"))
        .current_dir(dir.path())
        .args(["record", "-f", "-", "-y", "2025", "-m", "1", "-r", "100", "-a", "sale"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(!dir.path().join("-").exists());
}

#[test]
fn schema_csv_header() {
    let output = microfisc(&["schema", "csv-header"]);
    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout(&output).starts_with("year,month,activity,revenue"));
}
