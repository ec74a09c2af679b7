//! `i32` micro-kernels. Register tiles: 6×16 (AVX2+FMA), 14×32 (AVX-512F/BW).
//!
//! Ported from the reference source's `i_kernel`. Integer lanes have no
//! native FMA instruction, so both tiers accumulate via `mullo` (truncating
//! 32×32→32 multiply) followed by an add. This also gives the wrap-on-
//! overflow semantics §7 calls for, since `_mm256_mullo_epi32`/
//! `_mm512_mullo_epi32` already truncate to the low 32 bits.

use std::arch::x86_64::*;

pub const MR_AVX2: usize = 6;
pub const NR_AVX2: usize = 16;
pub const MR_AVX512: usize = 14;
pub const NR_AVX512: usize = 32;

/// 14×32 tile via two 16-wide `__m512i` accumulators per row.
///
/// # Safety
///
/// Caller must ensure AVX-512F is available, `m <= 14`, `n <= 32`,
/// `a_packed` holds `kc * 14` elements, `b_packed` holds `kc * 32` elements,
/// and `c` has at least `m` rows of `ldc >= n` valid elements.
#[target_feature(enable = "avx512f")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_14x32_avx512(
    a_packed: *const i32,
    b_packed: *const i32,
    c: *mut i32,
    m: usize,
    n: usize,
    kc: usize,
    ldc: usize,
) {
    let mask_lo: u16 = if n >= 16 { 0xFFFF } else { ((1u32 << n) - 1) as u16 };
    let mask_hi: u16 = if n >= 32 {
        0xFFFF
    } else if n > 16 {
        ((1u32 << (n - 16)) - 1) as u16
    } else {
        0
    };

    // See `f32_kernel`'s AVX-512 kernel: only form the high-half `c`
    // pointer when the tile actually reaches past column 16.
    let has_hi = n > 16;

    let mut acc0 = [_mm512_setzero_si512(); MR_AVX512];
    let mut acc1 = [_mm512_setzero_si512(); MR_AVX512];
    for r in 0..m {
        acc0[r] = _mm512_maskz_loadu_epi32(mask_lo, c.add(r * ldc));
        if has_hi {
            acc1[r] = _mm512_maskz_loadu_epi32(mask_hi, c.add(r * ldc + 16));
        }
    }

    for k in 0..kc {
        let b0 = _mm512_loadu_si512(b_packed.add(k * NR_AVX512) as *const _);
        let b1 = _mm512_loadu_si512(b_packed.add(k * NR_AVX512 + 16) as *const _);
        for r in 0..m {
            let a = _mm512_set1_epi32(*a_packed.add(k * MR_AVX512 + r));
            acc0[r] = _mm512_add_epi32(acc0[r], _mm512_mullo_epi32(a, b0));
            acc1[r] = _mm512_add_epi32(acc1[r], _mm512_mullo_epi32(a, b1));
        }
    }

    for r in 0..m {
        _mm512_mask_storeu_epi32(c.add(r * ldc), mask_lo, acc0[r]);
        if has_hi {
            _mm512_mask_storeu_epi32(c.add(r * ldc + 16), mask_hi, acc1[r]);
        }
    }
}

/// 6×16 tile via two 8-wide `__m256i` accumulators per row.
///
/// # Safety
///
/// Caller must ensure AVX2 is available, `m <= 6`, `n <= 16`, `a_packed`
/// holds `kc * 6` elements, `b_packed` holds `kc * 16` elements, and `c`
/// has at least `m` rows of `ldc >= n` valid elements.
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_6x16_avx2(
    a_packed: *const i32,
    b_packed: *const i32,
    c: *mut i32,
    m: usize,
    n: usize,
    kc: usize,
    ldc: usize,
) {
    let (mask0, mask1) = super::mask::lane_masks_8_8(n);
    let has_hi = n > 8;

    let mut acc0 = [_mm256_setzero_si256(); MR_AVX2];
    let mut acc1 = [_mm256_setzero_si256(); MR_AVX2];
    for r in 0..m {
        acc0[r] = _mm256_maskload_epi32(c.add(r * ldc), mask0);
        if has_hi {
            acc1[r] = _mm256_maskload_epi32(c.add(r * ldc + 8), mask1);
        }
    }

    for k in 0..kc {
        let b0 = _mm256_loadu_si256(b_packed.add(k * NR_AVX2) as *const _);
        let b1 = _mm256_loadu_si256(b_packed.add(k * NR_AVX2 + 8) as *const _);
        for r in 0..m {
            let a = _mm256_set1_epi32(*a_packed.add(k * MR_AVX2 + r));
            acc0[r] = _mm256_add_epi32(acc0[r], _mm256_mullo_epi32(a, b0));
            acc1[r] = _mm256_add_epi32(acc1[r], _mm256_mullo_epi32(a, b1));
        }
    }

    for r in 0..m {
        _mm256_maskstore_epi32(c.add(r * ldc), mask0, acc0[r]);
        if has_hi {
            _mm256_maskstore_epi32(c.add(r * ldc + 8), mask1, acc1[r]);
        }
    }
}
