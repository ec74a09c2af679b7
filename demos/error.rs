//! Errors surfaced at the bench binary's CLI boundary.
//!
//! The core `gemm_*` entry points stay infallible/panic-based (§7: malformed
//! dimensions are a caller bug, not a recoverable condition), this type is
//! reserved for the one place in this crate that parses untrusted input:
//! `src/main.rs`'s command-line arguments.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("unknown dtype '{0}', expected one of: f32, f64, i32, i16, i8")]
    UnknownDType(String),

    #[error("invalid matrix size '{0}': {1}")]
    InvalidSize(String, #[source] std::num::ParseIntError),

    #[error("matrix size must be nonzero")]
    ZeroSize,
}
