//! Integration tests for configuration and resource errors of the demux command.
//!
//! Every failure here must exit non-zero and leave no output files behind.

use tempfile::TempDir;

use crate::helpers::{create_plain_fastq, fastq_outputs, run_demux};

fn inputs(dir: &TempDir) {
    create_plain_fastq(dir, "s_R1.fq", &[("q1", "ACGT", "####")]);
    create_plain_fastq(dir, "s_I1.fq", &[("q1", "AAAA", "IIII")]);
}

fn assert_fails_cleanly(dir: &TempDir, args: &[&str], expected: &str) {
    let output = run_demux(dir.path(), args);
    assert!(!output.status.success(), "expected failure for {args:?}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(expected), "expected '{expected}' in: {stderr}");
    assert!(fastq_outputs(dir).is_empty(), "outputs created: {:?}", fastq_outputs(dir));
}

#[test]
fn test_missing_primary_input() {
    let dir = TempDir::new().unwrap();
    inputs(&dir);
    assert_fails_cleanly(
        &dir,
        &["--r1", "missing.fq", "--i1", "s_I1.fq", "-b", "AAAA"],
        "File does not exist",
    );
}

#[test]
fn test_missing_second_index() {
    let dir = TempDir::new().unwrap();
    inputs(&dir);
    assert_fails_cleanly(
        &dir,
        &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "--i2", "nope.fq", "-b", "AAAA:CC"],
        "Index 2 FASTQ",
    );
}

#[test]
fn test_missing_required_flag() {
    let dir = TempDir::new().unwrap();
    inputs(&dir);
    assert_fails_cleanly(&dir, &["--r1", "s_R1.fq", "-b", "AAAA"], "--i1");
}

#[test]
fn test_combined_key_without_second_index() {
    let dir = TempDir::new().unwrap();
    inputs(&dir);
    assert_fails_cleanly(&dir, &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AA:TT"], "AA:TT");
}

#[test]
fn test_malformed_barcode() {
    let dir = TempDir::new().unwrap();
    inputs(&dir);
    assert_fails_cleanly(&dir, &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA,"], "barcode");
}

#[test]
fn test_prefix2_without_r2() {
    let dir = TempDir::new().unwrap();
    inputs(&dir);
    assert_fails_cleanly(
        &dir,
        &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA", "-q", "second"],
        "--prefix2 can only be used together with --r2",
    );
}

#[test]
fn test_missing_output_directory() {
    let dir = TempDir::new().unwrap();
    inputs(&dir);
    assert_fails_cleanly(
        &dir,
        &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA", "-p", "nowhere/out"],
        "Output directory does not exist",
    );
}
