//! FASTQ record reading and demultiplexed record writing.
//!
//! This module is the thin record-source layer beneath the demultiplexer. A [`FastqSource`]
//! wraps a `seq_io` FASTQ parser over a (possibly gzip or BGZF compressed) input and yields
//! owned [`FastqRecord`] values one at a time. [`write_demuxed_record`] is the inverse used on
//! the output side: it writes a primary record with the observed index sequence(s) inlined
//! into the header.
//!
//! # Example
//!
//! ```rust,ignore
//! use fqdemux_lib::fastq::{FastqSource, StreamRole};
//!
//! let mut source = FastqSource::open("r1.fq.gz", StreamRole::Primary1)?;
//! while let Some(record) = source.next_record()? {
//!     // Process each record...
//! }
//! ```

use anyhow::{Context, Result, anyhow};
use bstr::ByteSlice;
use fgoxide::io::Io;
use seq_io::fastq::Reader as FastqReader;
use seq_io::fastq::Record;
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::Path;

const BUFFER_SIZE: usize = 1024 * 1024;

/// The position a stream occupies in a synchronized read set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamRole {
    /// First primary read (R1), always present
    Primary1,
    /// Second primary read (R2), present for paired-end runs
    Primary2,
    /// First index read (I1), always present
    Index1,
    /// Second index read (I2), present for dual-index runs
    Index2,
}

impl StreamRole {
    /// Short label used in diagnostics (`R1`, `R2`, `I1`, `I2`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            StreamRole::Primary1 => "R1",
            StreamRole::Primary2 => "R2",
            StreamRole::Index1 => "I1",
            StreamRole::Index2 => "I2",
        }
    }

    /// Human-readable description used in validation errors.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            StreamRole::Primary1 => "Read 1 FASTQ",
            StreamRole::Primary2 => "Read 2 FASTQ",
            StreamRole::Index1 => "Index 1 FASTQ",
            StreamRole::Index2 => "Index 2 FASTQ",
        }
    }
}

impl Display for StreamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One sequencing read.
///
/// The FASTQ header is split at its first whitespace into the read `name` (used to check
/// alignment across streams) and an optional free-text `comment`. An empty quality line is
/// stored as `None`.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct FastqRecord {
    /// Read name: the header up to the first whitespace, without the leading '@'
    pub name: Vec<u8>,
    /// Remainder of the header after the first whitespace, if any
    pub comment: Option<Vec<u8>>,
    /// The bases of the read
    pub seq: Vec<u8>,
    /// ASCII encoded qualities, same length as `seq` when present
    pub qual: Option<Vec<u8>>,
}

impl FastqRecord {
    /// Builds a record from a raw header (without '@'), bases and qualities.
    #[must_use]
    pub fn from_parts(header: &[u8], seq: &[u8], qual: &[u8]) -> Self {
        let (name, comment) = split_header(header);
        Self {
            name: name.to_vec(),
            comment: comment.map(<[u8]>::to_vec),
            seq: seq.to_vec(),
            qual: if qual.is_empty() { None } else { Some(qual.to_vec()) },
        }
    }
}

/// Splits a FASTQ header into its name and an optional comment at the first whitespace.
///
/// Runs of whitespace between name and comment are dropped; a header whose only trailing
/// content is whitespace has no comment.
fn split_header(header: &[u8]) -> (&[u8], Option<&[u8]>) {
    match header.iter().position(u8::is_ascii_whitespace) {
        None => (header, None),
        Some(pos) => {
            let rest = header[pos..].trim_start();
            let rest = rest.trim_end_with(|c| c == '\r');
            if rest.is_empty() { (&header[..pos], None) } else { (&header[..pos], Some(rest)) }
        }
    }
}

/// Open a FASTQ file for reading, decompressing gzip or BGZF input transparently.
///
/// # Errors
/// Returns an error if the file cannot be opened
pub fn open_fastq_reader(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let fgio = Io::new(5, BUFFER_SIZE);
    fgio.new_reader(path).with_context(|| format!("Failed to open FASTQ: {}", path.display()))
}

/// A forward-only source of [`FastqRecord`]s from a single FASTQ stream.
pub struct FastqSource {
    /// Which stream of the read set this source provides
    role: StreamRole,
    /// Path or other description of the input, for error messages
    origin: String,
    /// FASTQ parser
    reader: FastqReader<Box<dyn BufRead + Send>>,
    /// Number of records yielded so far
    records_read: u64,
}

impl FastqSource {
    /// Opens the FASTQ at `path` as the stream for `role`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P, role: StreamRole) -> Result<Self> {
        let path = path.as_ref();
        let reader = open_fastq_reader(path)
            .with_context(|| format!("Could not open {} input", role.description()))?;
        Ok(Self::new(reader, role, path.display().to_string()))
    }

    /// Creates a source over an already-open reader.
    #[must_use]
    pub fn new(reader: Box<dyn BufRead + Send>, role: StreamRole, origin: String) -> Self {
        Self {
            role,
            origin,
            reader: FastqReader::with_capacity(reader, BUFFER_SIZE),
            records_read: 0,
        }
    }

    /// The role this source plays in the read set.
    #[must_use]
    pub fn role(&self) -> StreamRole {
        self.role
    }

    /// Number of records read from this source so far.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Reads the next record, or `None` once the stream is exhausted.
    ///
    /// # Errors
    /// Returns an error if the input is not well-formed FASTQ or cannot be read
    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        match self.reader.next() {
            None => Ok(None),
            Some(Err(e)) => Err(anyhow!(
                "Error parsing {} record {} from {}: {e}",
                self.role,
                self.records_read + 1,
                self.origin
            )),
            Some(Ok(rec)) => {
                self.records_read += 1;
                Ok(Some(FastqRecord::from_parts(rec.head(), rec.seq(), rec.qual())))
            }
        }
    }
}

/// Writes `record` as a four-line FASTQ entry with the index sequence(s) appended to the header.
///
/// The header is `@name[ comment] index1[:index2]`, followed by the bases, a bare `+`
/// separator and the qualities (an empty line if the record has none).
///
/// # Errors
/// Returns an error if writing to `out` fails
///
/// # Example
/// ```
/// use fqdemux_lib::fastq::{FastqRecord, write_demuxed_record};
///
/// let record = FastqRecord::from_parts(b"R1", b"ACGT", b"####");
/// let mut out = Vec::new();
/// write_demuxed_record(&mut out, &record, b"AAAACGT", None).unwrap();
/// assert_eq!(out, b"@R1 AAAACGT\nACGT\n+\n####\n");
/// ```
pub fn write_demuxed_record<W: Write>(
    out: &mut W,
    record: &FastqRecord,
    index1: &[u8],
    index2: Option<&[u8]>,
) -> std::io::Result<()> {
    out.write_all(b"@")?;
    out.write_all(&record.name)?;
    if let Some(comment) = &record.comment {
        out.write_all(b" ")?;
        out.write_all(comment)?;
    }
    out.write_all(b" ")?;
    out.write_all(index1)?;
    if let Some(index2) = index2 {
        out.write_all(b":")?;
        out.write_all(index2)?;
    }
    out.write_all(b"\n")?;
    out.write_all(&record.seq)?;
    out.write_all(b"\n+\n")?;
    if let Some(qual) = &record.qual {
        out.write_all(qual)?;
    }
    out.write_all(b"\n")
}
