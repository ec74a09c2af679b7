//! Runtime ISA tier detection.
//!
//! The reference implementation selects a kernel variant per build via
//! preprocessor guards (`INSTLEVEL`). This crate promotes that to a
//! per-process runtime decision: [`detect`] probes CPUID once (cached in a
//! `OnceLock`) and every `gemm_*` entry point consults the cached tier
//! instead of re-running feature detection on every call.

use std::sync::OnceLock;

/// Discrete vector-ISA rank, richest first.
///
/// Not every dtype implements a kernel for every tier (see `kernel/`):
/// `i16`/`i8` only ever use [`IsaTier::Avx512Bw`] or [`IsaTier::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsaTier {
    Scalar,
    Avx,
    Avx2Fma,
    Avx512F,
    Avx512Bw,
}

static TIER: OnceLock<IsaTier> = OnceLock::new();

/// Best ISA tier this process can use, detected once and cached.
pub fn detect() -> IsaTier {
    *TIER.get_or_init(detect_uncached)
}

#[cfg(target_arch = "x86_64")]
fn detect_uncached() -> IsaTier {
    if is_x86_feature_detected!("avx512bw") && is_x86_feature_detected!("avx512f") {
        IsaTier::Avx512Bw
    } else if is_x86_feature_detected!("avx512f") {
        IsaTier::Avx512F
    } else if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
        IsaTier::Avx2Fma
    } else if is_x86_feature_detected!("avx") {
        IsaTier::Avx
    } else {
        IsaTier::Scalar
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn detect_uncached() -> IsaTier {
    IsaTier::Scalar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_stable_across_calls() {
        assert_eq!(detect(), detect());
    }
}
