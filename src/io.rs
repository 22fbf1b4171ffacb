//! # Collection of i/o routines
//!
//! Plain text output of fields, and optionally `hdf5` output
//! (feature `hdf5`).
pub mod dat;
#[cfg(feature = "hdf5")]
pub mod read_write_hdf5;
use thiserror::Error;

/// Failed to read or write a field
#[derive(Error, Debug)]
pub enum IoError {
    /// File system error
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed content
    #[error("{file}, line {line}: {msg}")]
    Parse {
        /// File name
        file: String,
        /// Line number, starting at 1
        line: usize,
        /// What went wrong
        msg: String,
    },
    /// Hdf5 library error
    #[cfg(feature = "hdf5")]
    #[error(transparent)]
    Hdf5(#[from] hdf5::Error),
}

/// Result of i/o routines
pub type Result<T> = std::result::Result<T, IoError>;
