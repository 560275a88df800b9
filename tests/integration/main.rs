//! Integration tests for the fqdemux binary.
//!
//! These tests run the compiled binary end to end against FASTQ fixtures.

mod helpers;
mod test_demux_command;
mod test_error_paths;
