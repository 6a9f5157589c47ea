// tests/cli_tests.rs
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn program_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(text.as_bytes()).expect("failed to write program");
    file
}

fn cli() -> Command {
    Command::cargo_bin("tomasulo_rust").expect("binary under test")
}

#[test]
fn test_missing_input_file_exits_with_code_1() {
    cli()
        .args(["tomasulo", "--input", "/no/such/program.txt"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error opening file"));
}

#[test]
fn test_add_program_reports_final_register() {
    let file = program_file("ADD R6 R0 R1\n");
    cli()
        .args(["tomasulo", "--input"])
        .arg(file.path())
        .args(["--reg", "R0=5", "--reg", "R1=3", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R6 = 8"))
        .stdout(predicate::str::contains("Instruction Timeline"));
}

#[test]
fn test_store_program_reports_final_memory() {
    let file = program_file("ADD R6 R0 R1\nSW R6 R4 201\n");
    cli()
        .args(["tomasulo", "--input"])
        .arg(file.path())
        .args(["--reg", "R0=5", "--reg", "R1=3", "--reg", "R4=2", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Memory[203] = 8"));
}

#[test]
fn test_json_report_is_parseable() {
    let file = program_file("ADD R6 R0 R1\n");
    let assert = cli()
        .args(["tomasulo", "--input"])
        .arg(file.path())
        .args(["--reg", "R0=5", "--reg", "R1=3", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON report");
    assert_eq!(report["cycles"], 5);
    assert_eq!(report["timeline"][0]["commit"], 5);
    assert_eq!(report["registers"][0]["name"], "R0");
}

#[test]
fn test_unknown_opcodes_are_skipped_not_fatal() {
    let file = program_file("NOP R1 R2 R3\nADD R6 R0 R1\n");
    cli()
        .args(["tomasulo", "--input"])
        .arg(file.path())
        .args(["--reg", "R0=5", "--reg", "R1=3", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R6 = 8"));
}

#[test]
fn test_bad_register_assignment_exits_with_code_1() {
    let file = program_file("ADD R6 R0 R1\n");
    cli()
        .args(["tomasulo", "--input"])
        .arg(file.path())
        .args(["--reg", "R99=5"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_sequential_subcommand_matches() {
    let file = program_file("ADD R6 R0 R1\nSW R6 R4 201\n");
    cli()
        .args(["sequential", "--input"])
        .arg(file.path())
        .args(["--reg", "R0=5", "--reg", "R1=3", "--reg", "R4=2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("R6 = 8"))
        .stdout(predicate::str::contains("Memory[203] = 8"));
}

#[test]
fn test_trace_prints_cycle_tables() {
    let file = program_file("ADD R6 R0 R1\n");
    cli()
        .args(["tomasulo", "--input"])
        .arg(file.path())
        .args(["--reg", "R0=5", "--reg", "R1=3", "--trace", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Cycle 1 ==="))
        .stdout(predicate::str::contains("Reorder Buffer"));
}
