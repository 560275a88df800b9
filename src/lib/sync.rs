//! Lock-step reading of primary and index FASTQ streams.
//!
//! A [`SynchronizedReader`] advances two to four [`FastqSource`]s together and yields one
//! [`RecordTuple`] per step. Alignment is purely positional: the n-th record of every stream
//! is assumed to belong to the same template. Read names are compared as a diagnostic only;
//! a mismatch is logged and counted but never stops iteration.
//!
//! Iteration ends as soon as any configured stream is exhausted. A partial tuple is never
//! produced.

use anyhow::Result;
use bstr::ByteSlice;
use log::{debug, warn};

use crate::fastq::{FastqRecord, FastqSource, StreamRole};

/// Maximum number of read-name bytes compared between streams.
pub const MAX_NAME_COMPARE_LEN: usize = 200;

/// Number of name mismatches logged at `warn` before further ones are demoted to `debug`.
pub const MAX_REPORTED_MISMATCHES: u64 = 10;

/// The aligned records for one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTuple {
    /// Record from the first primary stream
    pub primary1: FastqRecord,
    /// Record from the second primary stream, present iff that stream is configured
    pub primary2: Option<FastqRecord>,
    /// Record from the first index stream
    pub index1: FastqRecord,
    /// Record from the second index stream, present iff that stream is configured
    pub index2: Option<FastqRecord>,
}

impl RecordTuple {
    /// Returns the first pair of records whose names disagree, with their stream roles.
    ///
    /// Each configured stream is compared against the first primary record.
    #[must_use]
    pub fn name_mismatch(&self) -> Option<(StreamRole, &FastqRecord)> {
        let others = [
            (StreamRole::Index1, Some(&self.index1)),
            (StreamRole::Primary2, self.primary2.as_ref()),
            (StreamRole::Index2, self.index2.as_ref()),
        ];
        others.into_iter().find_map(|(role, record)| {
            record.filter(|r| !names_match(&self.primary1.name, &r.name)).map(|r| (role, r))
        })
    }
}

/// Options controlling diagnostics emitted while reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Log every name mismatch at `warn` instead of only the first few.
    pub verbose: bool,
}

/// Reads primary and index streams in lock-step.
pub struct SynchronizedReader {
    primary1: FastqSource,
    index1: FastqSource,
    primary2: Option<FastqSource>,
    index2: Option<FastqSource>,
    options: SyncOptions,
    tuples_read: u64,
    name_mismatches: u64,
    finished: bool,
    uneven_streams: Vec<StreamRole>,
}

impl SynchronizedReader {
    /// Creates a reader over the required streams plus the optional second primary and index.
    #[must_use]
    pub fn new(
        primary1: FastqSource,
        index1: FastqSource,
        primary2: Option<FastqSource>,
        index2: Option<FastqSource>,
        options: SyncOptions,
    ) -> Self {
        Self {
            primary1,
            index1,
            primary2,
            index2,
            options,
            tuples_read: 0,
            name_mismatches: 0,
            finished: false,
            uneven_streams: Vec::new(),
        }
    }

    /// Number of complete tuples produced so far.
    #[must_use]
    pub fn tuples_read(&self) -> u64 {
        self.tuples_read
    }

    /// Number of tuples whose read names did not all agree.
    #[must_use]
    pub fn name_mismatches(&self) -> u64 {
        self.name_mismatches
    }

    /// Streams that still held records when iteration stopped at a shorter one.
    #[must_use]
    pub fn uneven_streams(&self) -> &[StreamRole] {
        &self.uneven_streams
    }

    /// Whether a second primary stream is configured.
    #[must_use]
    pub fn is_paired(&self) -> bool {
        self.primary2.is_some()
    }

    /// Whether a second index stream is configured.
    #[must_use]
    pub fn is_dual_index(&self) -> bool {
        self.index2.is_some()
    }

    /// Reads one record from every configured stream.
    ///
    /// Returns `Ok(None)` once any stream is exhausted; every later call also returns
    /// `Ok(None)` without reading further.
    ///
    /// # Errors
    /// Returns an error if any stream fails to parse
    pub fn next_tuple(&mut self) -> Result<Option<RecordTuple>> {
        if self.finished {
            return Ok(None);
        }

        let Some(primary1) = self.primary1.next_record()? else {
            return Ok(self.end(StreamRole::Primary1));
        };
        let Some(index1) = self.index1.next_record()? else {
            return Ok(self.end(StreamRole::Index1));
        };
        let primary2 = match self.primary2.as_mut().map(FastqSource::next_record).transpose()? {
            Some(None) => return Ok(self.end(StreamRole::Primary2)),
            Some(record) => record,
            None => None,
        };
        let index2 = match self.index2.as_mut().map(FastqSource::next_record).transpose()? {
            Some(None) => return Ok(self.end(StreamRole::Index2)),
            Some(record) => record,
            None => None,
        };

        let tuple = RecordTuple { primary1, primary2, index1, index2 };
        self.tuples_read += 1;
        self.check_names(&tuple);
        Ok(Some(tuple))
    }

    /// Marks iteration as finished because `role` ran out of records.
    ///
    /// Logs a warning if any other stream still holds records, which means the inputs had
    /// different numbers of records. Streams not yet read in this step are read once more to
    /// find out; a parse error there counts as no further record.
    fn end(&mut self, role: StreamRole) -> Option<RecordTuple> {
        self.finished = true;
        let tuples_read = self.tuples_read;
        self.uneven_streams = [
            Some(&mut self.primary1),
            Some(&mut self.index1),
            self.primary2.as_mut(),
            self.index2.as_mut(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| s.role() != role)
        .filter_map(|s| {
            let more = s.records_read() > tuples_read || matches!(s.next_record(), Ok(Some(_)));
            more.then_some(s.role())
        })
        .collect();

        if self.uneven_streams.is_empty() {
            debug!("All input streams exhausted after {} records", self.tuples_read);
        } else {
            let ahead: Vec<&str> = self.uneven_streams.iter().map(|r| r.label()).collect();
            warn!(
                "{} ran out of records after {} records while {} still had more; \
                 stopping at the shortest input",
                role,
                self.tuples_read,
                ahead.join(", ")
            );
        }
        None
    }

    fn check_names(&mut self, tuple: &RecordTuple) {
        let Some((role, other)) = tuple.name_mismatch() else {
            return;
        };
        self.name_mismatches += 1;

        let message = format!(
            "Read name mismatch at record {}: {} name '{}' vs {} name '{}'",
            self.tuples_read,
            StreamRole::Primary1,
            tuple.primary1.name.as_bstr(),
            role,
            other.name.as_bstr()
        );
        if self.options.verbose || self.name_mismatches <= MAX_REPORTED_MISMATCHES {
            warn!("{message}");
            if !self.options.verbose && self.name_mismatches == MAX_REPORTED_MISMATCHES {
                warn!("Further read name mismatches will only be counted (use --verbose to list)");
            }
        } else {
            debug!("{message}");
        }
    }
}

/// Compares two read names over at most [`MAX_NAME_COMPARE_LEN`] bytes, ignoring a trailing
/// read-pair suffix `/1` through `/4`.
#[must_use]
pub fn names_match(a: &[u8], b: &[u8]) -> bool {
    let a = strip_pair_suffix(a);
    let b = strip_pair_suffix(b);
    a[..a.len().min(MAX_NAME_COMPARE_LEN)] == b[..b.len().min(MAX_NAME_COMPARE_LEN)]
}

/// Strip a `/1` to `/4` read pair suffix from a read name. Other separators are part of the
/// name (`SRR1.1` and `SRR1.2` are different spots).
fn strip_pair_suffix(name: &[u8]) -> &[u8] {
    match name {
        [head @ .., b'/', b'1'..=b'4'] => head,
        _ => name,
    }
}
