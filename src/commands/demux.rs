//! Demultiplex synchronized FASTQ files by inline index barcodes.
//!
//! This module implements the `demux` command. It reads one or two primary FASTQs alongside one
//! or two index FASTQs, matches the start of each index read against a list of barcodes, and
//! appends the primary read(s) to `<prefix>_<barcode>.fastq` with the observed index
//! sequence(s) added to the read header.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fqdemux_lib::barcode::BarcodeTable;
use fqdemux_lib::demux::{DemuxConfig, run_demux};
use fqdemux_lib::naming::default_prefix;
use fqdemux_lib::progress::DEFAULT_PROGRESS_INTERVAL;
use fqdemux_lib::validation::{validate_files_exist, validate_output_prefix, validate_requires};
use log::{debug, info};

use crate::commands::command::Command;

/// Demultiplexes FASTQ files by index read barcodes.
#[derive(Parser, Debug)]
#[command(
    name = "demux",
    author,
    about = "\x1b[38;5;30m[DEMULTIPLEXING]\x1b[0m \x1b[36mSplit FASTQs into per-barcode FASTQs by index read\x1b[0m",
    long_about = r#"
Splits synchronized FASTQ files into one FASTQ per barcode.

The primary read FASTQ(s) (--r1 and optionally --r2) and index read FASTQ(s) (--i1 and optionally
--i2) are read in lock-step, one record from each per template. The records of a template are
expected to appear in the same order in every file; read names that disagree are reported but
do not stop processing.

Each template is assigned to the first barcode, in the order given, whose sequence is a prefix of
the I1 read. With --i2, barcodes are given as KEY1:KEY2 and both the I1 and I2 reads must start
with their key. A barcode without a second key matches on I1 alone.

Templates that match no barcode are written to the <prefix>_OTHER:OTHER.fastq file unless
--no-other is given, in which case they are dropped and counted.

Outputs are appended to, never truncated:

  <prefix>_<barcode>.fastq

where the prefix defaults to the input file name with .gz, .bgz, .fastq and .fq suffixes removed,
written to the working directory. Each record header has the index sequence(s) appended:

  @<name> [<comment>] <I1 sequence>[:<I2 sequence>]

Example:

  fqdemux demux --r1 s_R1.fastq.gz --r2 s_R2.fastq.gz --i1 s_I1.fastq.gz -b ACGTACGT,TTGGCCAA
"#
)]
pub(crate) struct Demux {
    /// First primary read FASTQ (optionally gzipped)
    #[arg(long = "r1", required = true)]
    r1: PathBuf,

    /// Second primary read FASTQ, for paired-end runs
    #[arg(long = "r2")]
    r2: Option<PathBuf>,

    /// First index read FASTQ
    #[arg(long = "i1", required = true)]
    i1: PathBuf,

    /// Second index read FASTQ, for dual-index runs
    #[arg(long = "i2")]
    i2: Option<PathBuf>,

    /// Comma separated barcodes, KEY1 or KEY1:KEY2, matched in the order given
    #[arg(long, short = 'b', required = true, value_delimiter = ',', num_args = 1..)]
    barcodes: Vec<String>,

    /// Drop templates that match no barcode instead of writing them to the OTHER:OTHER file
    #[arg(long, short = 'n')]
    no_other: bool,

    /// Output prefix for R1 files [default: R1 file name without FASTQ/gzip suffixes]
    #[arg(long, short = 'p')]
    prefix: Option<String>,

    /// Output prefix for R2 files [default: R2 file name without FASTQ/gzip suffixes]
    #[arg(long, short = 'q')]
    prefix2: Option<String>,

    /// Report every read name mismatch and discarded template
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Write per-barcode template counts to this TSV file
    #[arg(long, short = 'm')]
    metrics: Option<PathBuf>,

    /// Log progress every this many templates
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL, hide = true)]
    progress_interval: u64,
}

impl Demux {
    /// Checks the arguments and builds the barcode table before any file is opened.
    fn validate(&self) -> Result<BarcodeTable> {
        let mut inputs = vec![(&self.r1, "Read 1 FASTQ"), (&self.i1, "Index 1 FASTQ")];
        if let Some(r2) = &self.r2 {
            inputs.push((r2, "Read 2 FASTQ"));
        }
        if let Some(i2) = &self.i2 {
            inputs.push((i2, "Index 2 FASTQ"));
        }
        validate_files_exist(&inputs)?;
        validate_requires("prefix2", self.prefix2.is_some(), "r2", self.r2.is_some())?;
        if let Some(prefix) = &self.prefix {
            validate_output_prefix(prefix, "prefix")?;
        }
        if let Some(prefix2) = &self.prefix2 {
            validate_output_prefix(prefix2, "prefix2")?;
        }

        let table =
            BarcodeTable::parse(self.barcodes.as_slice(), self.i2.is_some(), !self.no_other)?;
        Ok(table)
    }

    /// Builds the run configuration from validated arguments.
    fn config(&self, table: BarcodeTable) -> DemuxConfig {
        DemuxConfig {
            primary1: self.r1.clone(),
            primary2: self.r2.clone(),
            index1: self.i1.clone(),
            index2: self.i2.clone(),
            table,
            prefix1: Some(self.prefix.clone().unwrap_or_else(|| default_prefix(&self.r1))),
            prefix2: self
                .r2
                .as_ref()
                .map(|r2| self.prefix2.clone().unwrap_or_else(|| default_prefix(r2))),
            verbose: self.verbose,
            metrics: self.metrics.clone(),
            progress_interval: self.progress_interval,
        }
    }
}

impl Command for Demux {
    fn execute(&self, command_line: &str) -> Result<()> {
        debug!("Command line: {command_line}");
        let table = self.validate()?;
        let config = self.config(table);

        let summary = run_demux(&config)?;
        info!(
            "Routed {} of {} templates to {} barcode file(s)",
            summary.templates_read - summary.counts.discarded,
            summary.templates_read,
            summary.counts.per_barcode.len()
        );
        Ok(())
    }
}
