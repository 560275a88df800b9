//! CLI command implementations for fqdemux.
//!
//! - [`demux`] - Split synchronized FASTQ files into per-barcode FASTQ files

pub mod command;
pub mod demux;
