//! Output file naming.
//!
//! Each barcode writes to `<prefix>_<label>.fastq`, where the prefix defaults to the primary
//! input's file name with its compression and format suffixes removed.

use std::path::Path;

use crate::barcode::BarcodeEntry;

/// Suffixes removed from input file names when deriving an output prefix.
pub const KNOWN_SUFFIXES: &[&str] = &[".gz", ".bgz", ".fastq", ".fq"];

/// Extension given to every demultiplexed output file.
pub const OUTPUT_EXTENSION: &str = ".fastq";

/// Removes recognized suffixes from the end of `name` until none remains.
///
/// Matching is ASCII case-insensitive. A suffix is only removed if something would remain, so
/// a file literally named `.fastq` is left as is.
///
/// # Examples
///
/// ```
/// use fqdemux_lib::naming::strip_known_suffixes;
///
/// assert_eq!(strip_known_suffixes("sample.fastq.gz"), "sample");
/// assert_eq!(strip_known_suffixes("sample.fastq"), "sample");
/// assert_eq!(strip_known_suffixes("sample"), "sample");
/// ```
#[must_use]
pub fn strip_known_suffixes(name: &str) -> &str {
    let mut current = name;
    loop {
        let stripped = KNOWN_SUFFIXES.iter().find_map(|suffix| {
            let keep = current.len().checked_sub(suffix.len()).filter(|&keep| keep > 0)?;
            let tail = current.get(keep..)?;
            tail.eq_ignore_ascii_case(suffix).then(|| &current[..keep])
        });
        match stripped {
            Some(shorter) => current = shorter,
            None => return current,
        }
    }
}

/// Derives the default output prefix for an input: its file name with known suffixes stripped.
///
/// The directory part of the input path is dropped, so outputs land in the working directory.
#[must_use]
pub fn default_prefix(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy());
    strip_known_suffixes(&file_name).to_string()
}

/// Builds the output path for one barcode entry under `prefix`.
///
/// # Examples
///
/// ```
/// use fqdemux_lib::barcode::BarcodeEntry;
/// use fqdemux_lib::naming::output_path;
///
/// let entry = BarcodeEntry::new("AAAA", Some("TT"));
/// assert_eq!(output_path("out/sample", &entry).to_str(), Some("out/sample_AAAA:TT.fastq"));
/// ```
#[must_use]
pub fn output_path(prefix: &str, entry: &BarcodeEntry) -> std::path::PathBuf {
    format!("{prefix}_{}{OUTPUT_EXTENSION}", entry.label()).into()
}
