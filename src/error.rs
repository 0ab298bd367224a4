// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error taxonomy for the division-core engine.
//!
//! Every contract violation is detected eagerly at the operation boundary:
//! combining sets of different dimensions, indexing past a declared length,
//! loading a malformed set file, or constructing a composition with
//! inconsistent table sizes. None of these are recoverable mid-algorithm;
//! a sweep or composition step that hits one aborts the whole job.

use thiserror::Error;

/// Errors raised by set operations, persistence and composition setup.
#[derive(Debug, Error)]
pub enum Error {
    /// Two sets of different dimensions were combined or compared.
    #[error("operand dimensions differ: {left} vs {right}")]
    DimensionMismatch { left: u64, right: u64 },

    /// An index at or past the declared length/domain was accessed.
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: u64, len: u64 },

    /// A set file had a bad format tag, end marker or inconsistent sizes.
    #[error("corrupt set file: {reason}")]
    CorruptFile { reason: &'static str },

    /// Composition parameters out of supported range, or table size mismatch.
    #[error("invalid configuration: {reason}")]
    Config { reason: String },

    /// Underlying I/O failure while reading or writing a set file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
