//! `f64` micro-kernels. Register tiles: 6×8 (AVX2+FMA), 6×16 (AVX-512F/BW).
//!
//! Ported from the reference source's `d_kernel`, adapted to this crate's
//! packed-buffer layout and kernel signature (see [`super::f32_kernel`]).

use std::arch::x86_64::*;

pub const MR_AVX2: usize = 6;
pub const NR_AVX2: usize = 8;
pub const MR_AVX512: usize = 6;
pub const NR_AVX512: usize = 16;

/// 6×16 tile via two 8-wide `__m512d` accumulators per row.
///
/// # Safety
///
/// Caller must ensure AVX-512F is available, `m <= 6`, `n <= 16`,
/// `a_packed` holds `kc * 6` elements, `b_packed` holds `kc * 16` elements,
/// and `c` has at least `m` rows of `ldc >= n` valid elements.
#[target_feature(enable = "avx512f")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_6x16_avx512(
    a_packed: *const f64,
    b_packed: *const f64,
    c: *mut f64,
    m: usize,
    n: usize,
    kc: usize,
    ldc: usize,
) {
    let mask_lo: u8 = if n >= 8 { 0xFF } else { ((1u16 << n) - 1) as u8 };
    let mask_hi: u8 = if n >= 16 {
        0xFF
    } else if n > 8 {
        ((1u16 << (n - 8)) - 1) as u8
    } else {
        0
    };

    // See the `f32` AVX-512 kernel's comment: the high half's `c` pointer is
    // only formed when the tile actually reaches past column 8, so it's
    // never an out-of-bounds `pointer::add` for a narrow tail.
    let has_hi = n > 8;

    let mut acc0 = [_mm512_setzero_pd(); MR_AVX512];
    let mut acc1 = [_mm512_setzero_pd(); MR_AVX512];
    for r in 0..m {
        acc0[r] = _mm512_maskz_loadu_pd(mask_lo, c.add(r * ldc));
        if has_hi {
            acc1[r] = _mm512_maskz_loadu_pd(mask_hi, c.add(r * ldc + 8));
        }
    }

    for k in 0..kc {
        let b0 = _mm512_loadu_pd(b_packed.add(k * NR_AVX512));
        let b1 = _mm512_loadu_pd(b_packed.add(k * NR_AVX512 + 8));
        for r in 0..m {
            let a = _mm512_set1_pd(*a_packed.add(k * MR_AVX512 + r));
            acc0[r] = _mm512_fmadd_pd(a, b0, acc0[r]);
            acc1[r] = _mm512_fmadd_pd(a, b1, acc1[r]);
        }
    }

    for r in 0..m {
        _mm512_mask_storeu_pd(c.add(r * ldc), mask_lo, acc0[r]);
        if has_hi {
            _mm512_mask_storeu_pd(c.add(r * ldc + 8), mask_hi, acc1[r]);
        }
    }
}

/// 6×8 tile via two 4-wide `__m256d` accumulators per row.
///
/// # Safety
///
/// Caller must ensure AVX2 and FMA are available, `m <= 6`, `n <= 8`,
/// `a_packed` holds `kc * 6` elements, `b_packed` holds `kc * 8` elements,
/// and `c` has at least `m` rows of `ldc >= n` valid elements.
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_6x8_avx2(
    a_packed: *const f64,
    b_packed: *const f64,
    c: *mut f64,
    m: usize,
    n: usize,
    kc: usize,
    ldc: usize,
) {
    let (mask0, mask1) = super::mask::lane_masks_4_4(n);
    let has_hi = n > 4;

    let mut acc0 = [_mm256_setzero_pd(); MR_AVX2];
    let mut acc1 = [_mm256_setzero_pd(); MR_AVX2];
    for r in 0..m {
        acc0[r] = _mm256_maskload_pd(c.add(r * ldc), mask0);
        if has_hi {
            acc1[r] = _mm256_maskload_pd(c.add(r * ldc + 4), mask1);
        }
    }

    for k in 0..kc {
        let b0 = _mm256_loadu_pd(b_packed.add(k * NR_AVX2));
        let b1 = _mm256_loadu_pd(b_packed.add(k * NR_AVX2 + 4));
        for r in 0..m {
            let a = _mm256_broadcast_sd(&*a_packed.add(k * MR_AVX2 + r));
            acc0[r] = _mm256_fmadd_pd(a, b0, acc0[r]);
            acc1[r] = _mm256_fmadd_pd(a, b1, acc1[r]);
        }
    }

    for r in 0..m {
        _mm256_maskstore_pd(c.add(r * ldc), mask0, acc0[r]);
        if has_hi {
            _mm256_maskstore_pd(c.add(r * ldc + 4), mask1, acc1[r]);
        }
    }
}
