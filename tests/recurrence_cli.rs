//! End-to-end tests for the `recurrence-test` binary.

use std::io::Write;
use std::process::Command;

use tempfile::Builder;

fn write_file(suffix: &str, lines: &[&str]) -> tempfile::NamedTempFile {
    let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
    for l in lines {
        writeln!(f, "{l}").unwrap();
    }
    f
}

fn run_recurrence_test(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_recurrence-test"))
        .args(args)
        .output()
        .expect("failed to run recurrence-test");
    assert!(
        output.status.success(),
        "recurrence-test exited with {:?}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn per_label_test_and_dist_records_are_emitted() {
    let fai = write_file(".fai", &["chr1\t1000"]);
    let labeled = write_file(".txt", &["chr1\t100\t200\tgeneA", "chr1\t500\t600\tgeneB"]);
    let calls = write_file(".txt", &["chr1\t1\t10"]);

    let stdout = run_recurrence_test(&[
        "-l",
        labeled.path().to_str().unwrap(),
        "-c",
        calls.path().to_str().unwrap(),
        "-f",
        fai.path().to_str().unwrap(),
        "-n",
        "500",
        "-s",
        "11",
    ]);

    assert!(stdout.starts_with("VERSION\t"));
    assert!(stdout.contains("\nSEED\t11\n"));
    assert!(stdout.contains("TEST\tgeneA\t"));
    assert!(stdout.contains("TEST\tgeneB\t"));
    assert!(stdout.contains("DIST\tgeneA\t"));
    assert!(stdout.contains("DIST\tgeneB\t"));
}

#[test]
fn identical_seed_reproduces_identical_output() {
    let fai = write_file(".fai", &["chr1\t1000"]);
    let labeled = write_file(".txt", &["chr1\t100\t200\tgeneA"]);
    let calls = write_file(".txt", &["chr1\t1\t10"]);

    let args = [
        "-l",
        labeled.path().to_str().unwrap(),
        "-c",
        calls.path().to_str().unwrap(),
        "-f",
        fai.path().to_str().unwrap(),
        "-n",
        "500",
        "-s",
        "99",
    ];

    let first = run_recurrence_test(&args);
    let second = run_recurrence_test(&args);
    assert_eq!(first, second);
}

#[test]
fn missing_label_column_is_a_fatal_parse_error() {
    let fai = write_file(".fai", &["chr1\t1000"]);
    let labeled = write_file(".txt", &["chr1\t100\t200"]);
    let calls = write_file(".txt", &["chr1\t1\t10"]);

    let output = Command::new(env!("CARGO_BIN_EXE_recurrence-test"))
        .args([
            "-l",
            labeled.path().to_str().unwrap(),
            "-c",
            calls.path().to_str().unwrap(),
            "-f",
            fai.path().to_str().unwrap(),
            "-n",
            "100",
        ])
        .output()
        .expect("failed to run recurrence-test");

    assert!(!output.status.success());
}
