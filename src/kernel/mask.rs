//! Shared AVX2 lane-mask builders for `maskload`/`maskstore`, used by the
//! `f32`/`i32` (8+8 split) and `f64` (4+4 split) AVX2 kernels. AVX2 has no
//! mask registers, so the reference source builds masks from a static
//! `-1`/`0` lookup table sliced at `16 - n`; this builds the same two
//! masks directly from `n` instead of indexing into a shared static.

use std::arch::x86_64::*;

/// Two 8-lane `i32` masks (`-1` = keep) for an `n`-wide tail split across
/// two 8-element halves.
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
pub(super) unsafe fn lane_masks_8_8(n: usize) -> (__m256i, __m256i) {
    let lane = |base: usize| -> __m256i {
        let mut lanes = [0i32; 8];
        for (i, slot) in lanes.iter_mut().enumerate() {
            *slot = if base + i < n { -1 } else { 0 };
        }
        _mm256_loadu_si256(lanes.as_ptr() as *const __m256i)
    };
    (lane(0), lane(8))
}

/// Two 4-lane `i64` masks (`-1` = keep) for an `n`-wide tail split across
/// two 4-element halves.
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
pub(super) unsafe fn lane_masks_4_4(n: usize) -> (__m256i, __m256i) {
    let lane = |base: usize| -> __m256i {
        let mut lanes = [0i64; 4];
        for (i, slot) in lanes.iter_mut().enumerate() {
            *slot = if base + i < n { -1 } else { 0 };
        }
        _mm256_loadu_si256(lanes.as_ptr() as *const __m256i)
    };
    (lane(0), lane(4))
}
