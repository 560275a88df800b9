//! End-to-end demultiplexing of one set of synchronized FASTQ files.
//!
//! [`run_demux`] opens every input before creating any output, so a missing or unreadable
//! input never leaves a half-created set of output files behind. It then pulls aligned tuples
//! from a [`SynchronizedReader`] and hands each to a [`BarcodeRouter`] until the first stream
//! ends.

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use fqdemux_metrics::{DemuxMetric, write_metrics_auto};
use log::info;

use crate::barcode::BarcodeTable;
use crate::fastq::{FastqSource, StreamRole};
use crate::logging::{OperationTimer, log_demux_summary};
use crate::naming::default_prefix;
use crate::progress::{DEFAULT_PROGRESS_INTERVAL, ProgressTracker};
use crate::router::{BarcodeRouter, RoutingCounts};
use crate::sync::{SyncOptions, SynchronizedReader};

/// Fully resolved settings for one demultiplexing run.
#[derive(Debug, Clone)]
pub struct DemuxConfig {
    /// First primary read FASTQ
    pub primary1: PathBuf,
    /// Second primary read FASTQ, for paired runs
    pub primary2: Option<PathBuf>,
    /// First index read FASTQ
    pub index1: PathBuf,
    /// Second index read FASTQ, for dual-index runs
    pub index2: Option<PathBuf>,
    /// Ordered barcode table, including the catch-all entry if enabled
    pub table: BarcodeTable,
    /// Output prefix for first primary reads; derived from `primary1` when absent
    pub prefix1: Option<String>,
    /// Output prefix for second primary reads; derived from `primary2` when absent
    pub prefix2: Option<String>,
    /// Report every read name mismatch and discarded template
    pub verbose: bool,
    /// Where to write per-barcode metrics, if anywhere
    pub metrics: Option<PathBuf>,
    /// Templates between progress log messages
    pub progress_interval: u64,
}

impl DemuxConfig {
    /// Creates a single-end, single-index configuration with default prefixes.
    #[must_use]
    pub fn new(
        primary1: impl Into<PathBuf>,
        index1: impl Into<PathBuf>,
        table: BarcodeTable,
    ) -> Self {
        Self {
            primary1: primary1.into(),
            primary2: None,
            index1: index1.into(),
            index2: None,
            table,
            prefix1: None,
            prefix2: None,
            verbose: false,
            metrics: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// The output prefix for first primary reads.
    #[must_use]
    pub fn output_prefix1(&self) -> String {
        self.prefix1.clone().unwrap_or_else(|| default_prefix(&self.primary1))
    }

    /// The output prefix for second primary reads, or `None` for single-end runs.
    #[must_use]
    pub fn output_prefix2(&self) -> Option<String> {
        self.primary2
            .as_ref()
            .map(|path| self.prefix2.clone().unwrap_or_else(|| default_prefix(path)))
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxSummary {
    /// Templates read from the inputs
    pub templates_read: u64,
    /// Templates whose read names disagreed across inputs
    pub name_mismatches: u64,
    /// Templates written per barcode plus the number dropped
    pub counts: RoutingCounts,
}

/// Demultiplexes the inputs described by `config`.
///
/// # Errors
/// Returns an error if the barcode table's index mode disagrees with the configured index
/// inputs, an input cannot be opened or parsed, an output cannot be opened or written, or the
/// metrics file cannot be written
pub fn run_demux(config: &DemuxConfig) -> Result<DemuxSummary> {
    ensure!(
        config.table.is_dual_index() == config.index2.is_some(),
        "Barcode table is {} but {} second index FASTQ was given",
        if config.table.is_dual_index() { "dual-index" } else { "single-index" },
        if config.index2.is_some() { "a" } else { "no" },
    );
    let timer = OperationTimer::new("Demultiplexing");

    let primary1 = FastqSource::open(&config.primary1, StreamRole::Primary1)?;
    let index1 = FastqSource::open(&config.index1, StreamRole::Index1)?;
    let primary2 =
        config.primary2.as_ref().map(|p| FastqSource::open(p, StreamRole::Primary2)).transpose()?;
    let index2 =
        config.index2.as_ref().map(|p| FastqSource::open(p, StreamRole::Index2)).transpose()?;
    let mut reader = SynchronizedReader::new(
        primary1,
        index1,
        primary2,
        index2,
        SyncOptions { verbose: config.verbose },
    );

    let prefix1 = config.output_prefix1();
    let prefix2 = config.output_prefix2();
    info!(
        "Writing {} barcode(s) to {prefix1}_*.fastq{}",
        config.table.len(),
        prefix2.as_ref().map(|p| format!(" and {p}_*.fastq")).unwrap_or_default()
    );
    let mut router =
        BarcodeRouter::open(config.table.clone(), &prefix1, prefix2.as_deref(), config.verbose)?;

    let mut progress =
        ProgressTracker::new("Demultiplexed templates").with_interval(config.progress_interval);
    while let Some(tuple) = reader.next_tuple()? {
        router.route(&tuple)?;
        progress.log_if_needed(1);
    }
    progress.log_final();

    let counts = router.finish()?;
    timer.log_completion(reader.tuples_read());
    log_demux_summary(&counts, reader.name_mismatches());

    if let Some(path) = &config.metrics {
        let metrics = DemuxMetric::from_counts(&counts.per_barcode, counts.discarded);
        write_metrics_auto(path, &metrics)
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
        info!("Wrote metrics to {}", path.display());
    }

    Ok(DemuxSummary {
        templates_read: reader.tuples_read(),
        name_mismatches: reader.name_mismatches(),
        counts,
    })
}
