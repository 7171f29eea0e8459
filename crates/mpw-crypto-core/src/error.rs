//! Error types for `mpw-crypto-core`.

use thiserror::Error;

use crate::algorithm::AlgorithmVersion;
use crate::template::ResultType;

/// Errors produced by derivation operations.
///
/// None of these carry secret material. `UnsupportedResultType` and
/// `InvalidCounter` are caller-contract violations; `SeedExhausted` means
/// the frozen tables are inconsistent and is a defect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Password stretching failed (parameter validation, memory allocation).
    #[error("password stretching failed: {0}")]
    Stretch(String),

    /// Counter 0 is reserved.
    #[error("invalid counter: site counters start at 1")]
    InvalidCounter,

    /// No template catalog exists for this result type under this version.
    #[error("result type {result_type} is not supported by algorithm {version}")]
    UnsupportedResultType {
        /// The requested result type.
        result_type: ResultType,
        /// The algorithm version that was asked to encode it.
        version: AlgorithmVersion,
    },

    /// A template needs more seed bytes than the seed holds.
    #[error("seed exhausted: template needs {needed} bytes, seed has {available}")]
    SeedExhausted {
        /// Seed bytes the template consumes (including the selector byte).
        needed: usize,
        /// Length of the seed.
        available: usize,
    },

    /// A master key was used with a different algorithm version than it was
    /// stretched under.
    #[error("master key was derived for algorithm {key}, not {requested}")]
    KeyVersionMismatch {
        /// Version the key was stretched under.
        key: AlgorithmVersion,
        /// Version the caller asked to derive with.
        requested: AlgorithmVersion,
    },

    /// The caller abandoned a long-running stretch.
    #[error("derivation cancelled")]
    Cancelled,

    /// A stored version number that no released algorithm carries.
    #[error("unknown algorithm version: {0}")]
    UnknownVersion(u32),

    /// A result type name that no catalog knows.
    #[error("unknown result type: {0}")]
    UnknownResultType(String),

    /// Text whose length does not fit the 32-bit length prefix.
    #[error("input too long: {0} bytes exceeds the 32-bit length prefix")]
    InputTooLong(usize),

    /// A frozen template holds a tag with no character class.
    #[error("malformed template: unknown class tag {tag:?}")]
    MalformedTemplate {
        /// The offending tag.
        tag: char,
    },
}
