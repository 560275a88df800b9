//! Integration tests for the demux command.

use tempfile::TempDir;

use crate::helpers::{
    create_gzip_fastq, create_plain_fastq, fastq_outputs, read_output, run_demux,
};

#[test]
fn test_single_barcode_match() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("R1", "ACGT", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("R1", "AAAACGT", "IIIIIII")]);

    let output = run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA", "-n"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert_eq!(fastq_outputs(&dir), vec!["s_R1_AAAA.fastq"]);
    assert_eq!(read_output(&dir, "s_R1_AAAA.fastq"), "@R1 AAAACGT\nACGT\n+\n####\n");
}

#[test]
fn test_unmatched_dropped_without_catch_all() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("R1", "ACGT", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("R1", "AAAACGT", "IIIIIII")]);

    let output = run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "GGGG", "-n"]);
    assert!(output.status.success());
    assert_eq!(read_output(&dir, "s_R1_GGGG.fastq"), "");
}

#[test]
fn test_unmatched_routed_to_other() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("R1", "ACGT", "####"), ("R2", "TTTT", "!!!!")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("R1", "AAAACGT", "IIIIIII"), ("R2", "CCCC", "IIII")]);

    let output = run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA"]);
    assert!(output.status.success());

    assert_eq!(fastq_outputs(&dir), vec!["s_R1_AAAA.fastq", "s_R1_OTHER:OTHER.fastq"]);
    assert_eq!(read_output(&dir, "s_R1_OTHER:OTHER.fastq"), "@R2 CCCC\nTTTT\n+\n!!!!\n");
}

#[test]
fn test_first_listed_barcode_wins() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("R1", "ACGT", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("R1", "AAAACGT", "IIIIIII")]);

    let output =
        run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AA,AAAA", "-n"]);
    assert!(output.status.success());
    assert_eq!(read_output(&dir, "s_R1_AA.fastq"), "@R1 AAAACGT\nACGT\n+\n####\n");
    assert_eq!(read_output(&dir, "s_R1_AAAA.fastq"), "");
}

#[test]
fn test_paired_dual_index_requires_both_keys() {
    let dir = TempDir::new().unwrap();
    let names = [("q1", "ACGT", "####"), ("q2", "GGCC", "####")];
    create_plain_fastq(&dir, "s_R1.fq", &names);
    create_plain_fastq(&dir, "s_R2.fq", &[("q1", "TTTT", "IIII"), ("q2", "CCCC", "IIII")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("q1", "AACG", "IIII"), ("q2", "AACG", "IIII")]);
    create_plain_fastq(&dir, "s_I2.fq", &[("q1", "TTAC", "IIII"), ("q2", "CCAC", "IIII")]);

    let output = run_demux(
        dir.path(),
        &["--r1", "s_R1.fq", "--r2", "s_R2.fq", "--i1", "s_I1.fq", "--i2", "s_I2.fq", "-b", "AA:TT"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    assert_eq!(
        fastq_outputs(&dir),
        vec![
            "s_R1_AA:TT.fastq",
            "s_R1_OTHER:OTHER.fastq",
            "s_R2_AA:TT.fastq",
            "s_R2_OTHER:OTHER.fastq",
        ]
    );
    assert_eq!(read_output(&dir, "s_R1_AA:TT.fastq"), "@q1 AACG:TTAC\nACGT\n+\n####\n");
    assert_eq!(read_output(&dir, "s_R2_AA:TT.fastq"), "@q1 AACG:TTAC\nTTTT\n+\nIIII\n");
    assert_eq!(read_output(&dir, "s_R1_OTHER:OTHER.fastq"), "@q2 AACG:CCAC\nGGCC\n+\n####\n");
    assert_eq!(read_output(&dir, "s_R2_OTHER:OTHER.fastq"), "@q2 AACG:CCAC\nCCCC\n+\nIIII\n");
}

#[test]
fn test_gzip_inputs_and_comment_preserved() {
    let dir = TempDir::new().unwrap();
    create_gzip_fastq(&dir, "run_R1.fastq.gz", &[("q1 1:N:0:1", "ACGTACGT", "IIIIIIII")]);
    create_gzip_fastq(&dir, "run_I1.fastq.gz", &[("q1 3:N:0:1", "CCGGTTAA", "IIIIIIII")]);

    let output = run_demux(
        dir.path(),
        &["--r1", "run_R1.fastq.gz", "--i1", "run_I1.fastq.gz", "-b", "CCGG", "-n"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        read_output(&dir, "run_R1_CCGG.fastq"),
        "@q1 1:N:0:1 CCGGTTAA\nACGTACGT\n+\nIIIIIIII\n"
    );
}

#[test]
fn test_outputs_are_appended_across_runs() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("R1", "ACGT", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("R1", "AAAACGT", "IIIIIII")]);

    for _ in 0..2 {
        let output =
            run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA", "-n"]);
        assert!(output.status.success());
    }
    assert_eq!(
        read_output(&dir, "s_R1_AAAA.fastq"),
        "@R1 AAAACGT\nACGT\n+\n####\n@R1 AAAACGT\nACGT\n+\n####\n"
    );
}

#[test]
fn test_explicit_prefixes() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("out")).unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("R1", "ACGT", "####")]);
    create_plain_fastq(&dir, "s_R2.fq", &[("R1", "TTTT", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("R1", "AAAACGT", "IIIIIII")]);

    let output = run_demux(
        dir.path(),
        &[
            "--r1", "s_R1.fq", "--r2", "s_R2.fq", "--i1", "s_I1.fq", "-b", "AAAA", "-n", "-p",
            "out/first", "-q", "out/second",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(read_output(&dir, "out/first_AAAA.fastq"), "@R1 AAAACGT\nACGT\n+\n####\n");
    assert_eq!(read_output(&dir, "out/second_AAAA.fastq"), "@R1 AAAACGT\nTTTT\n+\n####\n");
}

#[test]
fn test_stops_at_shortest_input() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("q1", "ACGT", "####"), ("q2", "ACGT", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("q1", "AAAA", "IIII")]);

    let output = run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA"]);
    assert!(output.status.success());
    assert_eq!(read_output(&dir, "s_R1_AAAA.fastq"), "@q1 AAAA\nACGT\n+\n####\n");
    assert_eq!(read_output(&dir, "s_R1_OTHER:OTHER.fastq"), "");
}

#[test]
fn test_warns_when_primary_shorter_than_index() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("q1", "ACGT", "####")]);
    create_plain_fastq(
        &dir,
        "s_I1.fq",
        &[("q1", "AAAA", "IIII"), ("q2", "AAAA", "IIII"), ("q3", "AAAA", "IIII")],
    );

    let output = run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("R1 ran out of records after 1 records"), "no warning in: {stderr}");
    assert!(stderr.contains("I1 still had more"), "no warning in: {stderr}");
    assert_eq!(read_output(&dir, "s_R1_AAAA.fastq"), "@q1 AAAA\nACGT\n+\n####\n");
}

#[test]
fn test_single_index_catch_all_file_name() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("q1", "ACGT", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("q1", "GGGG", "IIII")]);

    let output = run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA"]);
    assert!(output.status.success());
    assert!(!dir.path().join("s_R1_OTHER.fastq").exists());
    assert_eq!(read_output(&dir, "s_R1_OTHER:OTHER.fastq"), "@q1 GGGG\nACGT\n+\n####\n");
}

#[test]
fn test_name_mismatch_continues_positionally() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(&dir, "s_R1.fq", &[("q1", "ACGT", "####"), ("q2", "GGGG", "####")]);
    create_plain_fastq(&dir, "s_I1.fq", &[("x1", "AAAA", "IIII"), ("q2", "AAAA", "IIII")]);

    let output = run_demux(dir.path(), &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("x1"), "expected mismatch warning in: {stderr}");
    assert_eq!(
        read_output(&dir, "s_R1_AAAA.fastq"),
        "@q1 AAAA\nACGT\n+\n####\n@q2 AAAA\nGGGG\n+\n####\n"
    );
}

#[test]
fn test_metrics_file() {
    let dir = TempDir::new().unwrap();
    create_plain_fastq(
        &dir,
        "s_R1.fq",
        &[("q1", "ACGT", "####"), ("q2", "ACGT", "####"), ("q3", "ACGT", "####"), ("q4", "A", "#")],
    );
    create_plain_fastq(
        &dir,
        "s_I1.fq",
        &[("q1", "AAAA", "IIII"), ("q2", "AAAA", "IIII"), ("q3", "CCCC", "IIII"), ("q4", "G", "I")],
    );

    let output = run_demux(
        dir.path(),
        &["--r1", "s_R1.fq", "--i1", "s_I1.fq", "-b", "AAAA,CCCC", "-n", "-m", "demux.tsv"],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let metrics = read_output(&dir, "demux.tsv");
    let lines: Vec<&str> = metrics.lines().collect();
    assert_eq!(
        lines,
        vec![
            "barcode\ttemplates\tfrac_templates",
            "AAAA\t2\t0.500000",
            "CCCC\t1\t0.250000",
            "discarded\t1\t0.250000",
        ]
    );
}
