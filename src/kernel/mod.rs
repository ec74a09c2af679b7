//! Register-resident micro-kernels: the innermost `ir`/`jr` loop of the
//! five-level blocking nest (§4.3). Each kernel consumes one `mr`-row strip
//! of packed A and one `nr`-column strip of packed B and accumulates
//! directly into `C`, so the strip never round-trips through memory between
//! the rank-1 updates.
//!
//! Grounded in the reference source's `s_kernel`/`d_kernel`/`i_kernel`/
//! `hq_kernel`/`q_kernel` (`kernel.c`), and in the teacher's
//! `kernels::kernel_8x8`/`kernel_12x4` for the `#[target_feature]` /
//! `# Safety` idiom. The reference source hand-unrolls every accumulator row
//! as a named local; this crate keeps that register-blocking *algorithm* but
//! holds the accumulators in a fixed-size array walked by a `for` loop
//! instead of unrolling it textually MR times per dtype per tier. The
//! compiler unrolls and register-allocates a small, compile-time-bounded
//! array identically, and the array form is the one that can be written
//! and reviewed without a compiler in the loop.

pub mod f32_kernel;
pub mod f64_kernel;
pub mod i16_kernel;
pub mod i32_kernel;
pub mod i8_kernel;
mod mask;

use crate::cache::DType;
use crate::isa::IsaTier;

/// Register-tile `(mr, nr)` shape for a dtype at a given ISA tier, per the
/// reference source's kernel comments (§4.3's table). Returns `None` when
/// that dtype has no kernel at that tier (`i16`/`i8` below AVX-512BW): the
/// dispatcher falls back to [`scalar_kernel`] in that case.
pub fn tile_shape(dtype: DType, tier: IsaTier) -> Option<(usize, usize)> {
    use DType::*;
    use IsaTier::*;
    match (dtype, tier) {
        (F32, Avx512Bw) | (F32, Avx512F) => Some((14, 32)),
        (F32, Avx2Fma) => Some((6, 16)),

        (F64, Avx512Bw) | (F64, Avx512F) => Some((6, 16)),
        (F64, Avx2Fma) => Some((6, 8)),

        (I32, Avx512Bw) | (I32, Avx512F) => Some((14, 32)),
        (I32, Avx2Fma) => Some((6, 16)),

        (I16, Avx512Bw) => Some((30, 32)),
        (I16, _) => None,

        (I8, Avx512Bw) => Some((30, 64)),
        (I8, _) => None,

        (_, Scalar) | (_, Avx) => None,
    }
}

/// Tile shape used for the portable scalar fallback, when no SIMD kernel
/// applies. Kept modest so packing overhead stays proportionate on
/// non-x86_64 targets and on the unaccelerated `i16`/`i8` AVX2 path.
pub const SCALAR_MR: usize = 4;
pub const SCALAR_NR: usize = 4;

/// Per-dtype accumulate-multiply, abstracting the float/int split: floats
/// use a fused multiply-add, integers wrap on overflow (§7's integer
/// semantics) rather than saturate or panic.
pub trait Arith: Copy + Default {
    fn mac(acc: Self, a: Self, b: Self) -> Self;
}

impl Arith for f32 {
    #[inline]
    fn mac(acc: Self, a: Self, b: Self) -> Self {
        a.mul_add(b, acc)
    }
}

impl Arith for f64 {
    #[inline]
    fn mac(acc: Self, a: Self, b: Self) -> Self {
        a.mul_add(b, acc)
    }
}

impl Arith for i32 {
    #[inline]
    fn mac(acc: Self, a: Self, b: Self) -> Self {
        acc.wrapping_add(a.wrapping_mul(b))
    }
}

impl Arith for i16 {
    #[inline]
    fn mac(acc: Self, a: Self, b: Self) -> Self {
        acc.wrapping_add(a.wrapping_mul(b))
    }
}

impl Arith for i8 {
    #[inline]
    fn mac(acc: Self, a: Self, b: Self) -> Self {
        acc.wrapping_add(a.wrapping_mul(b))
    }
}

/// Portable rank-1-update micro-kernel, used on non-x86_64 targets and for
/// the dtype/tier combinations with no SIMD kernel.
///
/// `a_packed` holds `m <= mr` column-major rows of `kc` elements (padded to
/// `mr` by the packer); `b_packed` holds `kc` row-major rows of `n <= nr`
/// elements (padded to `nr`). `c` is accessed with row stride `ldc`.
pub fn scalar_kernel<T: Arith>(
    a_packed: &[T],
    b_packed: &[T],
    c: &mut [T],
    m: usize,
    kc: usize,
    mr: usize,
    n: usize,
    nr: usize,
    ldc: usize,
) {
    for i in 0..m {
        for j in 0..n {
            let mut acc = c[i * ldc + j];
            for k in 0..kc {
                acc = T::mac(acc, a_packed[k * mr + i], b_packed[k * nr + j]);
            }
            c[i * ldc + j] = acc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_kernel_matches_naive_triple_loop() {
        let mr = 4;
        let nr = 4;
        let m = 3;
        let n = 3;
        let kc = 5;

        let a_packed: Vec<i32> = (0..kc * mr).map(|i| (i % 7) as i32 - 3).collect();
        let b_packed: Vec<i32> = (0..kc * nr).map(|i| (i % 5) as i32 - 2).collect();
        let mut c = vec![10i32; m * nr];

        scalar_kernel(&a_packed, &b_packed, &mut c, m, kc, mr, n, nr, nr);

        let mut expected = vec![10i32; m * nr];
        for i in 0..m {
            for j in 0..n {
                let mut acc = expected[i * nr + j];
                for k in 0..kc {
                    acc = acc.wrapping_add(a_packed[k * mr + i].wrapping_mul(b_packed[k * nr + j]));
                }
                expected[i * nr + j] = acc;
            }
        }
        assert_eq!(c, expected);
    }

    #[test]
    fn tile_shape_has_no_simd_kernel_for_narrow_ints_below_avx512bw() {
        assert_eq!(tile_shape(DType::I16, IsaTier::Avx2Fma), None);
        assert_eq!(tile_shape(DType::I8, IsaTier::Avx512F), None);
        assert!(tile_shape(DType::I16, IsaTier::Avx512Bw).is_some());
    }
}
