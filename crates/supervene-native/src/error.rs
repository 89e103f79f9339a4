//! Error types for loading and assembling datasets
//!
//! Error types for the MAT-file codec and dataset construction using
//! `thiserror`. Every dataset error is fatal to the construction call that
//! raised it; nothing is retried.

use std::path::PathBuf;

use supervene_core::CoreError;
use thiserror::Error;

/// MAT-file codec errors
#[derive(Error, Debug)]
pub enum MatError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The 128-byte header is missing or malformed
    #[error("Invalid MAT header: {reason}")]
    InvalidHeader {
        /// What was wrong
        reason: String,
    },

    /// Valid MAT content that this codec does not handle
    #[error("Unsupported MAT content: {what}")]
    Unsupported {
        /// Description of the unsupported feature
        what: String,
    },

    /// An element claims more bytes than remain
    #[error("Truncated MAT element: need {needed} bytes, {available} available")]
    Truncated {
        /// Bytes the element needs
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Element contents contradict each other
    #[error("Malformed MAT element: {reason}")]
    Malformed {
        /// What was inconsistent
        reason: String,
    },

    /// Unknown data-type code in an element tag
    #[error("Unknown MAT data type code {code}")]
    UnknownDataType {
        /// Raw type code
        code: u32,
    },

    /// Requested variable is absent
    #[error("Variable '{name}' not found")]
    VariableNotFound {
        /// Variable name
        name: String,
    },

    /// Variable exists but has the wrong kind
    #[error("Variable '{name}': expected {expected}, found {found}")]
    UnexpectedClass {
        /// Variable name
        name: String,
        /// Expected kind
        expected: &'static str,
        /// Found kind
        found: &'static str,
    },

    /// zlib stream inside a compressed element could not be inflated
    #[error("Failed to decompress element: {0}")]
    Decompress(std::io::Error),
}

/// Dataset construction and access errors
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Expected raw file is absent
    #[error(
        "{dataset} data file {} not found. Please run data/download_data.py first to download the dataset.",
        .path.display()
    )]
    MissingSource {
        /// Dataset family ("ECoG", "FMRI", "MEG")
        dataset: &'static str,
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// Raw file exists but could not be decoded
    #[error("Failed to read {}: {source}", .path.display())]
    Mat {
        /// File being read
        path: PathBuf,
        /// Codec error
        #[source]
        source: MatError,
    },

    /// Generator, pairing or signal math failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Raw arrays do not have the layout a source requires
    #[error("Unexpected shape for {what}: {reason}")]
    Shape {
        /// Array being checked
        what: String,
        /// What was wrong
        reason: String,
    },

    /// Item index past the end of the dataset
    #[error("Index {index} out of bounds for dataset of length {len}")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Dataset length
        len: usize,
    },

    /// Dataset configuration could not be read or is inconsistent
    #[error("Invalid dataset configuration: {reason}")]
    Config {
        /// What was wrong
        reason: String,
    },
}

/// Result type for MAT codec operations
pub type MatResult<T> = Result<T, MatError>;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;
