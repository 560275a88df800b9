//! Custom error types for fqdemux operations.

use thiserror::Error;

/// Result type alias for fqdemux operations
pub type Result<T> = std::result::Result<T, FqDemuxError>;

/// Error type for fqdemux operations
#[derive(Error, Debug)]
pub enum FqDemuxError {
    /// Invalid parameter value provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },

    /// Malformed entry in the barcode table
    #[error("Invalid barcode '{barcode}': {reason}")]
    InvalidBarcode {
        /// The raw barcode specification as given
        barcode: String,
        /// Explanation of the problem
        reason: String,
    },

    /// File format error
    #[error("Invalid {file_type} file '{path}': {reason}")]
    InvalidFileFormat {
        /// Type of file (e.g., "Read 1 FASTQ")
        file_type: String,
        /// Path to the file
        path: String,
        /// Explanation of the problem
        reason: String,
    },

    /// An output destination could not be opened for appending
    #[error("Failed to open output file '{path}': {source}")]
    OutputCreation {
        /// Path to the output file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
