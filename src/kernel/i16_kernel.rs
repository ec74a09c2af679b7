//! `i16` micro-kernel. Register tile: 30×32, AVX-512BW only (§ table: `i16`
//! has no AVX2 tier, matching the reference source's empty `#elif
//! INSTLEVEL >= 7` branch for `hq_kernel`).
//!
//! One `__m512i` lane holds all 32 columns, so each row needs a single
//! accumulator rather than the two-half split the 32-wide `f32`/`i32`
//! kernels use.

use std::arch::x86_64::*;

pub const MR_AVX512BW: usize = 30;
pub const NR_AVX512BW: usize = 32;

/// # Safety
///
/// Caller must ensure AVX-512BW is available, `m <= 30`, `n <= 32`,
/// `a_packed` holds `kc * 30` elements, `b_packed` holds `kc * 32`
/// elements, and `c` has at least `m` rows of `ldc >= n` valid elements.
#[target_feature(enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_30x32_avx512bw(
    a_packed: *const i16,
    b_packed: *const i16,
    c: *mut i16,
    m: usize,
    n: usize,
    kc: usize,
    ldc: usize,
) {
    let mask: u32 = if n >= 32 { 0xFFFF_FFFF } else { (1u32 << n) - 1 };

    let mut acc = [_mm512_setzero_si512(); MR_AVX512BW];
    for r in 0..m {
        acc[r] = _mm512_maskz_loadu_epi16(mask, c.add(r * ldc));
    }

    for k in 0..kc {
        let b = _mm512_loadu_epi16(b_packed.add(k * NR_AVX512BW));
        for r in 0..m {
            let a = _mm512_set1_epi16(*a_packed.add(k * MR_AVX512BW + r));
            acc[r] = _mm512_add_epi16(acc[r], _mm512_mullo_epi16(a, b));
        }
    }

    for r in 0..m {
        _mm512_mask_storeu_epi16(c.add(r * ldc), mask, acc[r]);
    }
}
