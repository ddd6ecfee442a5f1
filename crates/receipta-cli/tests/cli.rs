//! Command-line behavior of the `receipta` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ABC_RECEIPT: &str = "ABC Store\nTOTAL: 117.50\nDate: 15/03/2024\n";

fn receipta(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("receipta").unwrap();
    cmd.env("XDG_CONFIG_HOME", home).env("HOME", home);
    cmd
}

#[test]
fn test_process_text_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("receipt.txt");
    fs::write(&input, ABC_RECEIPT).unwrap();

    receipta(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("ABC Store"))
        .stdout(predicate::str::contains("117.50"))
        .stdout(predicate::str::contains("100.43"))
        .stdout(predicate::str::contains("2024-03-15"))
        .stdout(predicate::str::contains("Automatically processed"));
}

#[test]
fn test_process_csv_with_category() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("receipt.txt");
    fs::write(&input, ABC_RECEIPT).unwrap();

    receipta(dir.path())
        .args(["process", "--format", "csv", "--category", "food"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("category,document_type,business_name"))
        .stdout(predicate::str::contains("מזון,קבלה,ABC Store"));
}

#[test]
fn test_process_ocr_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("response.json");
    fs::write(
        &input,
        r#"{"textAnnotations": [{"locale": "iw", "description": "חשבונית מס 12345\nקפה נחת\nסה\"כ 58.50"}]}"#,
    )
    .unwrap();

    receipta(dir.path())
        .args(["process", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("INVOICE: קפה נחת"))
        .stdout(predicate::str::contains("Number: 12345"))
        .stdout(predicate::str::contains("After VAT:  58.50"));
}

#[test]
fn test_process_empty_text_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("blank.txt");
    fs::write(&input, "  \n").unwrap();

    receipta(dir.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no text detected"));
}

#[test]
fn test_process_rejects_unknown_inputs() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("scan.png");
    fs::write(&image, [0u8; 4]).unwrap();

    receipta(dir.path())
        .arg("process")
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));

    receipta(dir.path())
        .arg("process")
        .arg(dir.path().join("missing.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));

    let input = dir.path().join("receipt.txt");
    fs::write(&input, ABC_RECEIPT).unwrap();
    receipta(dir.path())
        .args(["process", "--category", "yachts"])
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown category"));
}

#[test]
fn test_process_show_warnings() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("receipt.txt");
    fs::write(&input, ABC_RECEIPT).unwrap();

    receipta(dir.path())
        .args(["process", "--show-warnings"])
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Could not extract VAT number"));
}

#[test]
fn test_batch_with_summary() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();

    fs::write(inputs.join("a.txt"), ABC_RECEIPT).unwrap();
    fs::write(inputs.join("b.txt"), "Fuel Station\nTotal 250.00\n01/02/2024\n").unwrap();
    fs::write(inputs.join("c.txt"), "\n").unwrap();

    let pattern = format!("{}/*.txt", inputs.display());

    receipta(dir.path())
        .args(["batch", pattern.as_str(), "--summary", "--continue-on-error", "-j", "2"])
        .arg("-o")
        .arg(&outputs)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"))
        .stdout(predicate::str::contains("Total after VAT: 367.50"));

    assert!(outputs.join("a.json").exists());
    assert!(outputs.join("b.json").exists());
    assert!(!outputs.join("c.json").exists());

    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,category"));
    assert!(summary.contains("a.txt,success"));
    assert!(summary.contains("c.txt,error"));
}

#[test]
fn test_batch_filter() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), ABC_RECEIPT).unwrap();
    fs::write(dir.path().join("b.txt"), "Fuel Station\nTotal 250.00\n01/02/2024\n").unwrap();

    let pattern = format!("{}/*.txt", dir.path().display());

    receipta(dir.path())
        .args(["batch", pattern.as_str(), "--since", "2024-03-01", "--min-amount", "100"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 matching the filter"))
        .stdout(predicate::str::contains("Total after VAT: 117.50"));
}

#[test]
fn test_batch_stops_on_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("empty.txt"), "").unwrap();

    let pattern = format!("{}/*.txt", dir.path().display());

    receipta(dir.path())
        .args(["batch", pattern.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no text detected"));
}

#[test]
fn test_batch_stops_on_error_among_many_files() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    let outputs = dir.path().join("out");
    fs::create_dir_all(&inputs).unwrap();

    fs::write(inputs.join("a.txt"), "").unwrap();
    for name in ["b.txt", "c.txt", "d.txt", "e.txt"] {
        fs::write(inputs.join(name), ABC_RECEIPT).unwrap();
    }

    let pattern = format!("{}/*.txt", inputs.display());

    receipta(dir.path())
        .args(["batch", pattern.as_str(), "--summary", "-j", "2"])
        .arg("-o")
        .arg(&outputs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("a.txt"));

    assert!(!outputs.join("summary.csv").exists());
    assert!(!outputs.join("b.json").exists());
}

#[test]
fn test_config_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("receipta.json");
    let config_arg = config.to_str().unwrap();

    receipta(dir.path())
        .args(["-c", config_arg, "config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    receipta(dir.path())
        .args(["-c", config_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    receipta(dir.path())
        .args(["config", "get", "extraction.vat_rate", "-c", config_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.17"));

    receipta(dir.path())
        .args(["config", "set", "extraction.vat_rate", "0.18", "-c", config_arg])
        .assert()
        .success();

    receipta(dir.path())
        .args(["config", "get", "extraction.vat_rate", "-c", config_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.18"));

    receipta(dir.path())
        .args(["config", "set", "extraction.no_such_key", "1", "-c", config_arg])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_changes_extraction() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("receipta.json");
    let config_arg = config.to_str().unwrap();
    let input = dir.path().join("receipt.txt");
    fs::write(&input, "Shop\nTotal 118.00\n").unwrap();

    receipta(dir.path())
        .args(["config", "set", "extraction.vat_rate", "0.18", "-c", config_arg])
        .assert()
        .success();

    receipta(dir.path())
        .args(["-c", config_arg, "process", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Before VAT: 100.00"));
}
