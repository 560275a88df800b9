//! Barcode table and classification of index reads.
//!
//! A [`BarcodeTable`] is an ordered list of [`BarcodeEntry`] values. An index read is
//! classified by scanning the table in order and taking the first entry whose key is a
//! byte-exact prefix of the observed index sequence (both keys, in dual-index mode). Order is
//! therefore significant: when barcodes overlap or one is a prefix of another, the earlier
//! entry wins. Duplicate entries are allowed and simply never match.
//!
//! When a catch-all is enabled the table ends with a synthetic `OTHER:OTHER` entry that only
//! receives reads that matched nothing else.

use crate::errors::{FqDemuxError, Result};

/// Name of the synthetic catch-all barcode.
pub const CATCH_ALL_NAME: &str = "OTHER";

/// Separator between the index 1 and index 2 keys of a combined barcode.
pub const KEY_SEPARATOR: char = ':';

/// One row of the barcode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeEntry {
    key1: Vec<u8>,
    key2: Option<Vec<u8>>,
    catch_all: bool,
}

impl BarcodeEntry {
    /// Creates a barcode entry from its index 1 key and optional index 2 key.
    #[must_use]
    pub fn new(key1: &str, key2: Option<&str>) -> Self {
        Self {
            key1: key1.as_bytes().to_vec(),
            key2: key2.map(|k| k.as_bytes().to_vec()),
            catch_all: false,
        }
    }

    /// Creates the synthetic catch-all entry. It carries `OTHER` as both keys in every mode, so
    /// its label is always `OTHER:OTHER`.
    #[must_use]
    pub fn catch_all() -> Self {
        Self {
            key1: CATCH_ALL_NAME.as_bytes().to_vec(),
            key2: Some(CATCH_ALL_NAME.as_bytes().to_vec()),
            catch_all: true,
        }
    }

    /// The index 1 key.
    #[must_use]
    pub fn key1(&self) -> &[u8] {
        &self.key1
    }

    /// The index 2 key, if this is a combined barcode.
    #[must_use]
    pub fn key2(&self) -> Option<&[u8]> {
        self.key2.as_deref()
    }

    /// Number of index 1 bases compared when matching.
    #[must_use]
    pub fn len1(&self) -> usize {
        if self.catch_all { 0 } else { self.key1.len() }
    }

    /// Number of index 2 bases compared when matching; zero when there is no index 2 key.
    #[must_use]
    pub fn len2(&self) -> usize {
        match &self.key2 {
            Some(key) if !self.catch_all => key.len(),
            _ => 0,
        }
    }

    /// Whether this is the synthetic catch-all entry.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    /// The display label, `KEY1` or `KEY1:KEY2`, also used in output file names.
    #[must_use]
    pub fn label(&self) -> String {
        let key1 = String::from_utf8_lossy(&self.key1);
        match &self.key2 {
            Some(key2) => format!("{key1}{KEY_SEPARATOR}{}", String::from_utf8_lossy(key2)),
            None => key1.into_owned(),
        }
    }

    /// Tests whether the observed index sequences start with this entry's keys.
    ///
    /// `index2` is only consulted in dual-index mode (when it is `Some`). A sequence shorter
    /// than the key never matches. The catch-all entry never matches here.
    #[must_use]
    pub fn matches(&self, index1: &[u8], index2: Option<&[u8]>) -> bool {
        if self.catch_all || !index1.starts_with(&self.key1) {
            return false;
        }
        match (index2, &self.key2) {
            (Some(observed), Some(key2)) => observed.starts_with(key2),
            _ => true,
        }
    }
}

/// The ordered barcode table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeTable {
    entries: Vec<BarcodeEntry>,
    dual_index: bool,
    catch_all: Option<usize>,
}

impl BarcodeTable {
    /// Builds a table from raw barcode specifications of the form `KEY1` or `KEY1:KEY2`.
    ///
    /// # Arguments
    /// * `specs` - Barcode specifications in table order
    /// * `dual_index` - Whether a second index stream is configured
    /// * `catch_all` - Whether to append the `OTHER:OTHER` entry for unmatched reads
    ///
    /// # Errors
    /// Returns an error if the table is empty, a key is empty, a specification contains more
    /// than one separator, or a combined key is given without a second index stream.
    ///
    /// # Example
    /// ```
    /// use fqdemux_lib::barcode::BarcodeTable;
    ///
    /// let table = BarcodeTable::parse(&["ACGT", "TTGG"], false, true).unwrap();
    /// assert_eq!(table.len(), 3);
    /// assert_eq!(table.classify(b"TTGGA", None), Some(1));
    /// assert_eq!(table.classify(b"CCCCC", None), Some(2));
    /// assert_eq!(table.entry(2).label(), "OTHER:OTHER");
    /// ```
    pub fn parse<S: AsRef<str>>(specs: &[S], dual_index: bool, catch_all: bool) -> Result<Self> {
        if specs.is_empty() {
            return Err(FqDemuxError::InvalidParameter {
                parameter: "barcodes".to_string(),
                reason: "At least one barcode must be provided".to_string(),
            });
        }

        let mut entries = Vec::with_capacity(specs.len() + 1);
        for spec in specs {
            entries.push(Self::parse_entry(spec.as_ref(), dual_index)?);
        }
        Ok(Self::new(entries, dual_index, catch_all))
    }

    /// Builds a table from already-constructed entries.
    #[must_use]
    pub fn new(mut entries: Vec<BarcodeEntry>, dual_index: bool, catch_all: bool) -> Self {
        let catch_all = catch_all.then(|| {
            entries.push(BarcodeEntry::catch_all());
            entries.len() - 1
        });
        Self { entries, dual_index, catch_all }
    }

    fn parse_entry(spec: &str, dual_index: bool) -> Result<BarcodeEntry> {
        let invalid = |reason: &str| FqDemuxError::InvalidBarcode {
            barcode: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = spec.split(KEY_SEPARATOR);
        let key1 = parts.next().unwrap_or_default().trim();
        let key2 = parts.next().map(str::trim);
        if parts.next().is_some() {
            return Err(invalid("expected at most one ':' between the index 1 and index 2 keys"));
        }
        if key1.is_empty() {
            return Err(invalid("index 1 key is empty"));
        }
        match key2 {
            Some("") => Err(invalid("index 2 key is empty")),
            Some(_) if !dual_index => {
                Err(invalid("a combined KEY1:KEY2 barcode requires a second index read (--i2)"))
            }
            _ => Ok(BarcodeEntry::new(key1, key2)),
        }
    }

    /// Classifies an observed index read (and second index read in dual-index mode).
    ///
    /// Returns the index of the first matching entry in table order, or the catch-all entry if
    /// nothing matched and a catch-all is configured, or `None` if the read should be dropped.
    #[must_use]
    pub fn classify(&self, index1: &[u8], index2: Option<&[u8]>) -> Option<usize> {
        let index2 = if self.dual_index { index2 } else { None };
        self.entries
            .iter()
            .position(|entry| entry.matches(index1, index2))
            .or(self.catch_all)
    }

    /// All entries in table order, including the catch-all if present.
    #[must_use]
    pub fn entries(&self) -> &[BarcodeEntry] {
        &self.entries
    }

    /// The entry at `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> &BarcodeEntry {
        &self.entries[index]
    }

    /// Number of entries, including the catch-all if present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the table was built for a run with a second index stream.
    #[must_use]
    pub fn is_dual_index(&self) -> bool {
        self.dual_index
    }

    /// Whether unmatched reads are routed to the `OTHER:OTHER` entry rather than dropped.
    #[must_use]
    pub fn has_catch_all(&self) -> bool {
        self.catch_all.is_some()
    }
}
