//! `i32` GEMM entry points: picks the micro-kernel matching the detected
//! ISA tier, then delegates to [`super::run`]. Wraps on overflow (§7);
//! no saturation or panic on overflow.

use crate::cache::DType;
use crate::isa::{self, IsaTier};
use crate::kernel::{i32_kernel, scalar_kernel, tile_shape, SCALAR_MR, SCALAR_NR};

/// `C += A·B`, single-threaded.
pub fn gemm(a: &[i32], b: &[i32], c: &mut [i32], m: usize, k: usize, n: usize) {
    gemm_parallel(a, b, c, m, k, n, 1);
}

/// `C += A·B`, using up to `nthreads` worker threads.
pub fn gemm_parallel(a: &[i32], b: &[i32], c: &mut [i32], m: usize, k: usize, n: usize, nthreads: usize) {
    let tier = isa::detect();
    match tile_shape(DType::I32, tier) {
        Some((mr, nr)) if tier >= IsaTier::Avx512F => {
            super::run(a, b, c, m, k, n, mr, nr, DType::I32, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: `tier >= Avx512F` checked above; packer guarantees
                // panel sizes match `kc * mr`/`kc * nr`.
                unsafe {
                    i32_kernel::kernel_14x32_avx512(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
                }
            });
        }
        Some((mr, nr)) => {
            super::run(a, b, c, m, k, n, mr, nr, DType::I32, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: reached only for `tier == Avx2Fma`.
                unsafe {
                    i32_kernel::kernel_6x16_avx2(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
                }
            });
        }
        None => {
            super::run(
                a,
                b,
                c,
                m,
                k,
                n,
                SCALAR_MR,
                SCALAR_NR,
                DType::I32,
                nthreads,
                |ap, bp, ct, mh, nh, kch, ldc| {
                    scalar_kernel(ap, bp, ct, mh, kch, SCALAR_MR, nh, SCALAR_NR, ldc);
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(a: &[i32], b: &[i32], c: &mut [i32], m: usize, k: usize, n: usize) {
        for i in 0..m {
            for j in 0..n {
                for p in 0..k {
                    c[i * n + j] = c[i * n + j].wrapping_add(a[i * k + p].wrapping_mul(b[p * n + j]));
                }
            }
        }
    }

    #[test]
    fn gemm_matches_naive_triple_loop() {
        let (m, k, n) = (51usize, 33usize, 46usize);
        let a: Vec<i32> = (0..m * k).map(|i| (i % 23) as i32 - 11).collect();
        let b: Vec<i32> = (0..k * n).map(|i| (i % 19) as i32 - 9).collect();

        let mut c = vec![0i32; m * n];
        gemm(&a, &b, &mut c, m, k, n);

        let mut expected = vec![0i32; m * n];
        naive(&a, &b, &mut expected, m, k, n);
        assert_eq!(c, expected);
    }

    #[test]
    fn gemm_parallel_matches_single_threaded() {
        let (m, k, n) = (40usize, 28usize, 52usize);
        let a: Vec<i32> = (0..m * k).map(|i| (i % 29) as i32 - 14).collect();
        let b: Vec<i32> = (0..k * n).map(|i| (i % 17) as i32 - 8).collect();

        let mut c1 = vec![0i32; m * n];
        gemm(&a, &b, &mut c1, m, k, n);

        let mut c4 = vec![0i32; m * n];
        gemm_parallel(&a, &b, &mut c4, m, k, n, 4);

        assert_eq!(c1, c4);
    }

    #[test]
    fn gemm_wraps_on_overflow_instead_of_panicking() {
        let a = vec![i32::MAX, i32::MAX];
        let b = vec![2i32, 2i32];
        let mut c = vec![0i32];
        gemm(&a, &b, &mut c, 1, 2, 1);
        let expected = i32::MAX.wrapping_mul(2).wrapping_add(i32::MAX.wrapping_mul(2));
        assert_eq!(c[0], expected);
    }
}
