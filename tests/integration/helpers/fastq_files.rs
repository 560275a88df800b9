//! FASTQ fixture writers and a runner for the `fqdemux` binary.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Output;

use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

/// A FASTQ fixture record: (name, sequence, quality).
pub type FastqRecord<'a> = (&'a str, &'a str, &'a str);

fn write_records<W: Write>(out: &mut W, records: &[FastqRecord]) {
    for (name, seq, qual) in records {
        writeln!(out, "@{name}").unwrap();
        writeln!(out, "{seq}").unwrap();
        writeln!(out, "+").unwrap();
        writeln!(out, "{qual}").unwrap();
    }
}

/// Creates a plain (uncompressed) FASTQ file.
pub fn create_plain_fastq(dir: &TempDir, name: &str, records: &[FastqRecord]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    write_records(&mut file, records);
    path
}

/// Creates a gzip-compressed FASTQ file.
pub fn create_gzip_fastq(dir: &TempDir, name: &str, records: &[FastqRecord]) -> PathBuf {
    let path = dir.path().join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    write_records(&mut encoder, records);
    encoder.finish().unwrap();
    path
}

/// Runs `fqdemux demux` with `args` in `dir`, so default output prefixes land there.
pub fn run_demux(dir: &Path, args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_fqdemux"))
        .current_dir(dir)
        .arg("demux")
        .args(args)
        .output()
        .expect("Failed to run fqdemux")
}

/// Reads an output file, panicking with its name if it is missing.
pub fn read_output(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name))
        .unwrap_or_else(|e| panic!("Failed to read output {name}: {e}"))
}

/// Names of all `.fastq` files in `dir`, sorted.
pub fn fastq_outputs(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".fastq"))
        .collect();
    names.sort();
    names
}
