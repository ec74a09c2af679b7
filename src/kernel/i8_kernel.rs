//! `i8` micro-kernel. Register tile: 30×64, AVX-512BW only.
//!
//! AVX-512 has no native 8-bit lane multiply, so each rank-1 update goes
//! through [`int8_mul`]: widen even/odd lanes into the 16-bit multiplier,
//! `mullo_epi16` each half, then recombine with a ternary-logic blend
//! instead of a separate mask register. Ported from the reference source's
//! `qmul`.

use std::arch::x86_64::*;

pub const MR_AVX512BW: usize = 30;
pub const NR_AVX512BW: usize = 64;

/// 8-bit lane-wise multiply (truncating, matching §7's wrap semantics) via
/// two 16-bit-lane `mullo` passes recombined with `_mm512_ternarylogic_epi32`.
///
/// # Safety
///
/// Caller must ensure AVX-512BW (and AVX-512F) are available.
#[target_feature(enable = "avx512bw,avx512f")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn int8_mul(a: __m512i, b: __m512i) -> __m512i {
    let odd_mask = _mm512_set1_epi16(0xff00u16 as i16);

    let a_even = a;
    let a_odd_shifted = _mm512_and_si512(a, odd_mask);
    let b_even = b;
    let b_odd_lo = _mm512_srli_epi16::<8>(b);

    let mul_even = _mm512_mullo_epi16(a_even, b_even);
    let mul_odd = _mm512_mullo_epi16(a_odd_shifted, b_odd_lo);

    // 0xB8 = "second operand selects between the first and third": keeps
    // `mul_even`'s low bytes and `mul_odd`'s high bytes in one pass.
    _mm512_ternarylogic_epi64::<0xB8>(mul_even, odd_mask, mul_odd)
}

/// # Safety
///
/// Caller must ensure AVX-512BW is available, `m <= 30`, `n <= 64`,
/// `a_packed` holds `kc * 30` elements, `b_packed` holds `kc * 64`
/// elements, and `c` has at least `m` rows of `ldc >= n` valid elements.
#[target_feature(enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn kernel_30x64_avx512bw(
    a_packed: *const i8,
    b_packed: *const i8,
    c: *mut i8,
    m: usize,
    n: usize,
    kc: usize,
    ldc: usize,
) {
    let mask: u64 = if n >= 64 { u64::MAX } else { (1u64 << n) - 1 };

    let mut acc = [_mm512_setzero_si512(); MR_AVX512BW];
    for r in 0..m {
        acc[r] = _mm512_maskz_loadu_epi8(mask, c.add(r * ldc));
    }

    for k in 0..kc {
        let b = _mm512_loadu_epi8(b_packed.add(k * NR_AVX512BW));
        for r in 0..m {
            let a = _mm512_set1_epi8(*a_packed.add(k * MR_AVX512BW + r));
            acc[r] = _mm512_add_epi8(acc[r], int8_mul(a, b));
        }
    }

    for r in 0..m {
        _mm512_mask_storeu_epi8(c.add(r * ldc), mask, acc[r]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::{pack_block_a, pack_block_b};

    #[test]
    fn int8_mul_matches_scalar_wrapping_multiply() {
        if !is_x86_feature_detected!("avx512bw") {
            return;
        }
        let a_vals: [i8; 64] = std::array::from_fn(|i| (i as i32 * 5 - 140) as i8);
        let b_vals: [i8; 64] = std::array::from_fn(|i| (i as i32 * 3 - 90) as i8);

        let out = unsafe {
            let a = _mm512_loadu_si512(a_vals.as_ptr() as *const _);
            let b = _mm512_loadu_si512(b_vals.as_ptr() as *const _);
            let r = int8_mul(a, b);
            let mut buf = [0i8; 64];
            _mm512_storeu_si512(buf.as_mut_ptr() as *mut _, r);
            buf
        };

        for i in 0..64 {
            assert_eq!(out[i], a_vals[i].wrapping_mul(b_vals[i]));
        }
    }

    #[test]
    fn kernel_30x64_avx512bw_matches_naive_with_wrapping() {
        if !is_x86_feature_detected!("avx512bw") {
            return;
        }
        let (m, k, n) = (13usize, 4usize, 50usize);
        let a: Vec<i8> = (0..m * k).map(|i| ((i % 200) as i32 - 100) as i8).collect();
        let b: Vec<i8> = (0..k * n).map(|i| ((i % 180) as i32 - 90) as i8).collect();

        let mut a_packed = vec![0i8; k * MR_AVX512BW];
        pack_block_a(&a, &mut a_packed, 0, 0, m, k, k, MR_AVX512BW, 1);
        let mut b_packed = vec![0i8; k * NR_AVX512BW];
        pack_block_b(&b, &mut b_packed, 0, 0, k, n, n, NR_AVX512BW, 1);

        let mut c = vec![0i8; m * n];
        unsafe {
            kernel_30x64_avx512bw(a_packed.as_ptr(), b_packed.as_ptr(), c.as_mut_ptr(), m, n, k, n);
        }

        let mut expected = vec![0i8; m * n];
        for i in 0..m {
            for j in 0..n {
                let mut acc = 0i8;
                for p in 0..k {
                    acc = acc.wrapping_add(a[i * k + p].wrapping_mul(b[p * n + j]));
                }
                expected[i * n + j] = acc;
            }
        }
        assert_eq!(c, expected);
    }
}
