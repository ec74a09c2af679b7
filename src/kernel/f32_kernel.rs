//! `f32` micro-kernels. Register tiles: 6×16 (AVX2+FMA), 14×32 (AVX-512F/BW).
//!
//! Ported from the reference source's `s_kernel`, adapted to this crate's
//! packed-buffer layout (`a_packed[k * mr + r]`, `b_packed[k * nr + c]`,
//! both produced by [`crate::pack::pack_block_a`]/[`pack_block_b`]) and to
//! the teacher's `#[target_feature]` + raw-pointer kernel idiom.

use std::arch::x86_64::*;

pub const MR_AVX2: usize = 6;
pub const NR_AVX2: usize = 16;
pub const MR_AVX512: usize = 14;
pub const NR_AVX512: usize = 32;

/// 14×32 tile via two 16-wide `__m512` accumulators per row, matching the
/// reference source's `packed_C[r][0..2]` split.
///
/// # Safety
///
/// Caller must ensure AVX-512F is available, `m <= 14`, `n <= 32`,
/// `a_packed` holds `kc * 14` elements, `b_packed` holds `kc * 32` elements,
/// and `c` has at least `m` rows of `ldc >= n` valid elements starting at
/// the given pointer.
#[target_feature(enable = "avx512f")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_14x32_avx512(
    a_packed: *const f32,
    b_packed: *const f32,
    c: *mut f32,
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

    // The high half's `c` pointer is only in bounds when the tile actually
    // spills past the low 16 columns; forming it unconditionally would be
    // an out-of-bounds `pointer::add` whenever the caller's tail is <= 16
    // wide, even though the masked load/store would never touch it.
    let has_hi = n > 16;

    let mut acc0 = [_mm512_setzero_ps(); MR_AVX512];
    let mut acc1 = [_mm512_setzero_ps(); MR_AVX512];
    for r in 0..m {
        acc0[r] = _mm512_maskz_loadu_ps(mask_lo, c.add(r * ldc));
        if has_hi {
            acc1[r] = _mm512_maskz_loadu_ps(mask_hi, c.add(r * ldc + 16));
        }
    }

    for k in 0..kc {
        let b0 = _mm512_loadu_ps(b_packed.add(k * NR_AVX512));
        let b1 = _mm512_loadu_ps(b_packed.add(k * NR_AVX512 + 16));
        for r in 0..m {
            let a = _mm512_set1_ps(*a_packed.add(k * MR_AVX512 + r));
            acc0[r] = _mm512_fmadd_ps(a, b0, acc0[r]);
            acc1[r] = _mm512_fmadd_ps(a, b1, acc1[r]);
        }
    }

    for r in 0..m {
        _mm512_mask_storeu_ps(c.add(r * ldc), mask_lo, acc0[r]);
        if has_hi {
            _mm512_mask_storeu_ps(c.add(r * ldc + 16), mask_hi, acc1[r]);
        }
    }
}

/// 6×16 tile via two 8-wide `__m256` accumulators per row.
///
/// # Safety
///
/// Caller must ensure AVX2 and FMA are available, `m <= 6`, `n <= 16`,
/// `a_packed` holds `kc * 6` elements, `b_packed` holds `kc * 16` elements,
/// and `c` has at least `m` rows of `ldc >= n` valid elements.
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_6x16_avx2(
    a_packed: *const f32,
    b_packed: *const f32,
    c: *mut f32,
    m: usize,
    n: usize,
    kc: usize,
    ldc: usize,
) {
    let (mask0, mask1) = super::mask::lane_masks_8_8(n);
    let has_hi = n > 8;

    let mut acc0 = [_mm256_setzero_ps(); MR_AVX2];
    let mut acc1 = [_mm256_setzero_ps(); MR_AVX2];
    for r in 0..m {
        acc0[r] = _mm256_maskload_ps(c.add(r * ldc), mask0);
        if has_hi {
            acc1[r] = _mm256_maskload_ps(c.add(r * ldc + 8), mask1);
        }
    }

    for k in 0..kc {
        let b0 = _mm256_loadu_ps(b_packed.add(k * NR_AVX2));
        let b1 = _mm256_loadu_ps(b_packed.add(k * NR_AVX2 + 8));
        for r in 0..m {
            let a = _mm256_broadcast_ss(&*a_packed.add(k * MR_AVX2 + r));
            acc0[r] = _mm256_fmadd_ps(a, b0, acc0[r]);
            acc1[r] = _mm256_fmadd_ps(a, b1, acc1[r]);
        }
    }

    for r in 0..m {
        _mm256_maskstore_ps(c.add(r * ldc), mask0, acc0[r]);
        if has_hi {
            _mm256_maskstore_ps(c.add(r * ldc + 8), mask1, acc1[r]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::{pack_block_a, pack_block_b};

    fn naive(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
        for i in 0..m {
            for j in 0..n {
                for p in 0..k {
                    c[i * n + j] += a[i * k + p] * b[p * n + j];
                }
            }
        }
    }

    #[test]
    fn kernel_14x32_avx512_matches_naive() {
        if !is_x86_feature_detected!("avx512f") {
            return;
        }
        let (m, k, n) = (9usize, 7usize, 20usize);
        let a: Vec<f32> = (0..m * k).map(|i| (i % 13) as f32 * 0.3 - 1.0).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 11) as f32 * 0.2 - 1.0).collect();

        let mut a_packed = vec![0.0f32; k * MR_AVX512];
        pack_block_a(&a, &mut a_packed, 0, 0, m, k, k, MR_AVX512, 1);
        let mut b_packed = vec![0.0f32; k * NR_AVX512];
        pack_block_b(&b, &mut b_packed, 0, 0, k, n, n, NR_AVX512, 1);

        let mut c = vec![0.0f32; m * n];
        unsafe {
            kernel_14x32_avx512(a_packed.as_ptr(), b_packed.as_ptr(), c.as_mut_ptr(), m, n, k, n);
        }

        let mut expected = vec![0.0f32; m * n];
        naive(&a, &b, &mut expected, m, k, n);

        for i in 0..m * n {
            assert!((c[i] - expected[i]).abs() < 1e-3, "mismatch at {i}: {} vs {}", c[i], expected[i]);
        }
    }

    #[test]
    fn kernel_6x16_avx2_matches_naive() {
        if !is_x86_feature_detected!("avx2") || !is_x86_feature_detected!("fma") {
            return;
        }
        let (m, k, n) = (5usize, 6usize, 11usize);
        let a: Vec<f32> = (0..m * k).map(|i| (i % 9) as f32 * 0.4 - 1.5).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 7) as f32 * 0.25 - 1.0).collect();

        let mut a_packed = vec![0.0f32; k * MR_AVX2];
        pack_block_a(&a, &mut a_packed, 0, 0, m, k, k, MR_AVX2, 1);
        let mut b_packed = vec![0.0f32; k * NR_AVX2];
        pack_block_b(&b, &mut b_packed, 0, 0, k, n, n, NR_AVX2, 1);

        let mut c = vec![0.0f32; m * n];
        unsafe {
            kernel_6x16_avx2(a_packed.as_ptr(), b_packed.as_ptr(), c.as_mut_ptr(), m, n, k, n);
        }

        let mut expected = vec![0.0f32; m * n];
        naive(&a, &b, &mut expected, m, k, n);

        for i in 0..m * n {
            assert!((c[i] - expected[i]).abs() < 1e-3, "mismatch at {i}: {} vs {}", c[i], expected[i]);
        }
    }
}
