//! Helper utilities for integration tests.

pub mod fastq_files;

pub use fastq_files::*;
