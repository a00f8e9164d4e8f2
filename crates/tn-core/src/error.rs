//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so geometry and registry failures surface with
//! full context at the call site that triggered them.

use thiserror::Error;

/// The error type for `tn-core` construction and lookup failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("polyline needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("polyline has zero length")]
    ZeroLength,

    #[error("offset profile fractions must start at 0.0, end at 1.0, and be strictly increasing")]
    NonMonotonicFractions,

    #[error("offset profile has {fractions} fractions but {offsets} offsets")]
    MismatchedProfile { fractions: usize, offsets: usize },

    #[error("GTU type {0:?} is already registered")]
    DuplicateGtuType(String),

    #[error("unknown GTU type {0}")]
    UnknownGtuType(String),
}

/// Shorthand result type for `tn-core`.
pub type CoreResult<T> = Result<T, CoreError>;
