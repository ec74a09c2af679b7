//! Cache-blocked, packed, SIMD-accelerated dense GEMM: `C += A·B` for
//! row-major matrices in `f32`, `f64`, `i32`, `i16`, and `i8`.
//!
//! The five-level blocking nest (`jc → pc → ic → jr → ir`), the packing
//! routines that rearrange operands into register-friendly panels, and the
//! AVX2/AVX-512 micro-kernels that do the arithmetic are described module
//! by module below:
//!
//! - [`cache`]: derives macro-block sizes (`MC`/`KC`/`NC`) from the host's
//!   measured L1D/L2/L3 capacities.
//! - [`pack`]: rearranges row-major sub-blocks of `A`/`B` into packed,
//!   strip-oriented panels.
//! - [`kernel`]: register-resident micro-kernels, one set per dtype per
//!   ISA tier, plus the portable scalar fallback.
//! - [`driver`]: the blocking/threading loop nest tying packing and
//!   kernels together into one `gemm_*` call per dtype.
//! - [`isa`]: runtime CPU feature detection, cached per process.
//! - [`reference`]: an unoptimized triple-loop oracle used by this crate's
//!   own tests.
//!
//! ## Usage
//!
//! ```
//! use gemm_core::gemm_f64;
//!
//! let a = vec![1.0f64; 64 * 64];
//! let b = vec![1.0f64; 64 * 64];
//! let mut c = vec![0.0f64; 64 * 64];
//!
//! gemm_f64(&a, &b, &mut c, 64, 64, 64);
//! ```
//!
//! For large matrices, use the `_parallel` variant:
//!
//! ```
//! use gemm_core::gemm_f64_parallel;
//!
//! let a = vec![1.0f64; 256 * 256];
//! let b = vec![1.0f64; 256 * 256];
//! let mut c = vec![0.0f64; 256 * 256];
//!
//! gemm_f64_parallel(&a, &b, &mut c, 256, 256, 256, 4);
//! ```
//!
//! Every `gemm_*`/`gemm_*_parallel` pair asserts its operand lengths match
//! `m`, `k`, `n` and panics on mismatch; malformed dimensions are a caller
//! bug, not a recoverable condition, so there is no `Result` in this API.
//! Integer dtypes wrap on overflow rather than saturating or panicking.

pub mod align;
pub mod cache;
pub mod driver;
pub mod isa;
pub mod kernel;
pub mod pack;
pub mod reference;

/// `C += A·B` for row-major `m×k` `A`, `k×n` `B`, `m×n` `C`, single-threaded.
pub fn gemm_f32(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
    driver::f32_driver::gemm(a, b, c, m, k, n);
}

/// As [`gemm_f32`], using up to `nthreads` worker threads.
pub fn gemm_f32_parallel(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize, nthreads: usize) {
    driver::f32_driver::gemm_parallel(a, b, c, m, k, n, nthreads);
}

/// `C += A·B` for row-major `m×k` `A`, `k×n` `B`, `m×n` `C`, single-threaded.
pub fn gemm_f64(a: &[f64], b: &[f64], c: &mut [f64], m: usize, k: usize, n: usize) {
    driver::f64_driver::gemm(a, b, c, m, k, n);
}

/// As [`gemm_f64`], using up to `nthreads` worker threads.
pub fn gemm_f64_parallel(a: &[f64], b: &[f64], c: &mut [f64], m: usize, k: usize, n: usize, nthreads: usize) {
    driver::f64_driver::gemm_parallel(a, b, c, m, k, n, nthreads);
}

/// `C += A·B` for row-major `m×k` `A`, `k×n` `B`, `m×n` `C`, single-threaded.
/// Wraps on overflow.
pub fn gemm_i32(a: &[i32], b: &[i32], c: &mut [i32], m: usize, k: usize, n: usize) {
    driver::i32_driver::gemm(a, b, c, m, k, n);
}

/// As [`gemm_i32`], using up to `nthreads` worker threads.
pub fn gemm_i32_parallel(a: &[i32], b: &[i32], c: &mut [i32], m: usize, k: usize, n: usize, nthreads: usize) {
    driver::i32_driver::gemm_parallel(a, b, c, m, k, n, nthreads);
}

/// `C += A·B` for row-major `m×k` `A`, `k×n` `B`, `m×n` `C`, single-threaded.
/// Wraps on overflow.
pub fn gemm_i16(a: &[i16], b: &[i16], c: &mut [i16], m: usize, k: usize, n: usize) {
    driver::i16_driver::gemm(a, b, c, m, k, n);
}

/// As [`gemm_i16`], using up to `nthreads` worker threads.
pub fn gemm_i16_parallel(a: &[i16], b: &[i16], c: &mut [i16], m: usize, k: usize, n: usize, nthreads: usize) {
    driver::i16_driver::gemm_parallel(a, b, c, m, k, n, nthreads);
}

/// `C += A·B` for row-major `m×k` `A`, `k×n` `B`, `m×n` `C`, single-threaded.
/// Wraps on overflow.
pub fn gemm_i8(a: &[i8], b: &[i8], c: &mut [i8], m: usize, k: usize, n: usize) {
    driver::i8_driver::gemm(a, b, c, m, k, n);
}

/// As [`gemm_i8`], using up to `nthreads` worker threads.
pub fn gemm_i8_parallel(a: &[i8], b: &[i8], c: &mut [i8], m: usize, k: usize, n: usize, nthreads: usize) {
    driver::i8_driver::gemm_parallel(a, b, c, m, k, n, nthreads);
}
