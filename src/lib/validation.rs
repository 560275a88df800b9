//! Input validation utilities
//!
//! This module provides common validation functions for command-line parameters and file
//! paths with consistent error messages. All failures are reported as
//! [`FqDemuxError`] values so they surface before any stream is opened.

use crate::errors::{FqDemuxError, Result};
use std::path::Path;

/// Validate that a file exists
///
/// # Arguments
/// * `path` - Path to validate
/// * `description` - Human-readable description of the file (e.g., "Read 1 FASTQ")
///
/// # Errors
/// Returns an error if the file does not exist
///
/// # Example
/// ```
/// use fqdemux_lib::validation::validate_file_exists;
///
/// let result = validate_file_exists("/nonexistent/r1.fq.gz", "Read 1 FASTQ");
/// assert!(result.is_err());
/// ```
pub fn validate_file_exists<P: AsRef<Path>>(path: P, description: &str) -> Result<()> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Err(FqDemuxError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    if path_ref.is_dir() {
        return Err(FqDemuxError::InvalidFileFormat {
            file_type: description.to_string(),
            path: path_ref.display().to_string(),
            reason: "Path is a directory".to_string(),
        });
    }
    Ok(())
}

/// Validate that multiple files exist
///
/// # Errors
/// Returns an error for the first file that doesn't exist
pub fn validate_files_exist<P: AsRef<Path>>(files: &[(P, &str)]) -> Result<()> {
    for (path, desc) in files {
        validate_file_exists(path, desc)?;
    }
    Ok(())
}

/// Validate that an option which only makes sense alongside another one is not given alone.
///
/// # Arguments
/// * `name` - Name of the dependent parameter (e.g. "prefix2")
/// * `present` - Whether the dependent parameter was supplied
/// * `requires` - Name of the parameter it depends on (e.g. "r2")
/// * `requires_present` - Whether that parameter was supplied
///
/// # Errors
/// Returns an error if `present` is true and `requires_present` is false
///
/// # Example
/// ```
/// use fqdemux_lib::validation::validate_requires;
///
/// assert!(validate_requires("prefix2", true, "r2", true).is_ok());
/// assert!(validate_requires("prefix2", false, "r2", false).is_ok());
/// assert!(validate_requires("prefix2", true, "r2", false).is_err());
/// ```
pub fn validate_requires(
    name: &str,
    present: bool,
    requires: &str,
    requires_present: bool,
) -> Result<()> {
    if present && !requires_present {
        return Err(FqDemuxError::InvalidParameter {
            parameter: name.to_string(),
            reason: format!("--{name} can only be used together with --{requires}"),
        });
    }
    Ok(())
}

/// Validate that an output prefix can be written under, i.e. that its directory exists.
///
/// A prefix with no directory component refers to the working directory and is always valid.
///
/// # Errors
/// Returns an error if the prefix is empty or its parent directory does not exist
pub fn validate_output_prefix(prefix: &str, name: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(FqDemuxError::InvalidParameter {
            parameter: name.to_string(),
            reason: "Output prefix must not be empty".to_string(),
        });
    }
    let parent = Path::new(prefix).parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        if !dir.is_dir() {
            return Err(FqDemuxError::InvalidParameter {
                parameter: name.to_string(),
                reason: format!("Output directory does not exist: {}", dir.display()),
            });
        }
    }
    Ok(())
}
