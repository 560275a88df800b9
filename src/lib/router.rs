//! Routing of classified record tuples to per-barcode output files.
//!
//! The [`BarcodeRouter`] owns the [`BarcodeTable`] and, for every entry in it, the output
//! destination(s) that entry's reads are appended to: one for the first primary read and,
//! for paired runs, one for the second. Entries and their outputs live side by side in a single
//! ordered list so a classification index always refers to the right files.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use bstr::ByteSlice;
use log::{debug, info, warn};

use crate::barcode::{BarcodeEntry, BarcodeTable};
use crate::errors::FqDemuxError;
use crate::fastq::write_demuxed_record;
use crate::naming::output_path;
use crate::sync::RecordTuple;

/// Output destinations of one barcode, with the number of templates written to them.
#[derive(Debug)]
pub struct SampleOutputs<W: Write> {
    /// Destination of first primary reads
    primary1: W,
    /// Destination of second primary reads, for paired runs
    primary2: Option<W>,
    /// Number of templates routed here
    templates: u64,
}

impl<W: Write> SampleOutputs<W> {
    /// Creates the outputs for one barcode.
    pub fn new(primary1: W, primary2: Option<W>) -> Self {
        Self { primary1, primary2, templates: 0 }
    }

    /// Number of templates written so far.
    #[must_use]
    pub fn templates(&self) -> u64 {
        self.templates
    }
}

/// Per-barcode template counts produced when the router is finished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutingCounts {
    /// `(label, templates)` for every table entry, in table order
    pub per_barcode: Vec<(String, u64)>,
    /// Templates that matched no barcode and were dropped (no catch-all configured)
    pub discarded: u64,
}

impl RoutingCounts {
    /// Total templates seen by the router, routed or dropped.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.per_barcode.iter().map(|(_, n)| n).sum::<u64>() + self.discarded
    }
}

/// Classifies record tuples and appends them to the outputs of the matching barcode.
pub struct BarcodeRouter<W: Write> {
    table: BarcodeTable,
    samples: Vec<SampleOutputs<W>>,
    paired: bool,
    discarded: u64,
    /// Log discarded templates at `warn` instead of `debug`
    verbose: bool,
}

impl BarcodeRouter<BufWriter<File>> {
    /// Opens, in append mode, one output file per barcode entry for the first primary read
    /// (and one more for the second primary read when `prefix2` is given).
    ///
    /// Every file is opened before any record is written. If any file cannot be opened, the
    /// whole operation fails with the offending path.
    ///
    /// # Errors
    /// Returns an error if an output file cannot be created or opened for appending
    pub fn open(
        table: BarcodeTable,
        prefix1: &str,
        prefix2: Option<&str>,
        verbose: bool,
    ) -> Result<Self> {
        let mut outputs = Vec::with_capacity(table.len());
        for entry in table.entries() {
            let primary1 = open_append(output_path(prefix1, entry))?;
            let primary2 =
                prefix2.map(|prefix| open_append(output_path(prefix, entry))).transpose()?;
            outputs.push(SampleOutputs::new(primary1, primary2));
        }
        info!(
            "Opened {} output file(s) for {} barcode(s)",
            outputs.len() * if prefix2.is_some() { 2 } else { 1 },
            table.len()
        );
        Self::from_outputs(table, outputs, verbose)
    }
}

impl<W: Write> BarcodeRouter<W> {
    /// Creates a router over already-open outputs, one per table entry, in table order.
    ///
    /// # Errors
    /// Returns an error if the number of outputs does not match the table, or if only some
    /// entries have a second primary output
    pub fn from_outputs(
        table: BarcodeTable,
        samples: Vec<SampleOutputs<W>>,
        verbose: bool,
    ) -> Result<Self> {
        ensure!(
            samples.len() == table.len(),
            "Expected {} barcode outputs but got {}",
            table.len(),
            samples.len()
        );
        let paired = samples.first().is_some_and(|s| s.primary2.is_some());
        ensure!(
            samples.iter().all(|s| s.primary2.is_some() == paired),
            "Either all or none of the barcode outputs must have a second primary destination"
        );
        Ok(Self { table, samples, paired, discarded: 0, verbose })
    }

    /// The barcode table used for classification.
    #[must_use]
    pub fn table(&self) -> &BarcodeTable {
        &self.table
    }

    /// Number of templates dropped because they matched no barcode.
    #[must_use]
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Classifies `tuple` and writes its primary read(s) to the matching barcode's outputs.
    ///
    /// Returns the index of the barcode entry written to, or `None` if the tuple matched no
    /// barcode and there is no catch-all, in which case nothing is written.
    ///
    /// # Errors
    /// Returns an error if the tuple's shape does not match the outputs or the table's index
    /// mode, or a write fails
    pub fn route(&mut self, tuple: &RecordTuple) -> Result<Option<usize>> {
        ensure!(
            tuple.primary2.is_some() == self.paired,
            "Record {} has {} second primary read but the router was configured {} one",
            tuple.primary1.name.as_bstr(),
            if tuple.primary2.is_some() { "a" } else { "no" },
            if self.paired { "with" } else { "without" },
        );
        ensure!(
            tuple.index2.is_some() == self.table.is_dual_index(),
            "Record {} has {} second index read but the barcode table is {}",
            tuple.primary1.name.as_bstr(),
            if tuple.index2.is_some() { "a" } else { "no" },
            if self.table.is_dual_index() { "dual-index" } else { "single-index" },
        );

        let index1 = tuple.index1.seq.as_slice();
        let index2 = tuple.index2.as_ref().map(|r| r.seq.as_slice());

        let Some(which) = self.table.classify(index1, index2) else {
            self.discarded += 1;
            let message = format!(
                "Discarding {}: no barcode matches index {}",
                tuple.primary1.name.as_bstr(),
                index1.as_bstr()
            );
            if self.verbose {
                warn!("{message}");
            } else {
                debug!("{message}");
            }
            return Ok(None);
        };

        let entry = &self.table.entries()[which];
        let sample = &mut self.samples[which];
        write_demuxed_record(&mut sample.primary1, &tuple.primary1, index1, index2)
            .with_context(|| write_error(entry, 1))?;
        if let (Some(out), Some(record)) = (sample.primary2.as_mut(), tuple.primary2.as_ref()) {
            write_demuxed_record(out, record, index1, index2)
                .with_context(|| write_error(entry, 2))?;
        }
        sample.templates += 1;
        Ok(Some(which))
    }

    /// Flushes every output and returns the per-barcode counts.
    ///
    /// # Errors
    /// Returns an error if any output fails to flush
    pub fn finish(self) -> Result<RoutingCounts> {
        Ok(self.finish_into_outputs()?.0)
    }

    /// Flushes every output and returns the counts together with the outputs themselves.
    ///
    /// # Errors
    /// Returns an error if any output fails to flush
    pub fn finish_into_outputs(self) -> Result<(RoutingCounts, Vec<(W, Option<W>)>)> {
        let mut per_barcode = Vec::with_capacity(self.samples.len());
        let mut outputs = Vec::with_capacity(self.samples.len());
        for (entry, mut sample) in self.table.entries().iter().zip(self.samples) {
            sample.primary1.flush().with_context(|| write_error(entry, 1))?;
            if let Some(out) = sample.primary2.as_mut() {
                out.flush().with_context(|| write_error(entry, 2))?;
            }
            per_barcode.push((entry.label(), sample.templates));
            outputs.push((sample.primary1, sample.primary2));
        }
        Ok((RoutingCounts { per_barcode, discarded: self.discarded }, outputs))
    }
}

fn write_error(entry: &BarcodeEntry, read: u8) -> String {
    format!("Failed to write read {read} output for barcode {}", entry.label())
}

/// Opens `path` for appending, creating it if needed.
fn open_append(path: PathBuf) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|source| FqDemuxError::OutputCreation { path: path.display().to_string(), source })?;
    debug!("Appending to {}", path.display());
    Ok(BufWriter::new(file))
}
