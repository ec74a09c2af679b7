//! `i16` GEMM entry points. Only AVX-512BW has a dedicated kernel (§ table);
//! every other tier falls back to the portable scalar micro-kernel.

use crate::cache::DType;
use crate::isa::{self, IsaTier};
use crate::kernel::{i16_kernel, scalar_kernel, tile_shape, SCALAR_MR, SCALAR_NR};

/// `C += A·B`, single-threaded.
pub fn gemm(a: &[i16], b: &[i16], c: &mut [i16], m: usize, k: usize, n: usize) {
    gemm_parallel(a, b, c, m, k, n, 1);
}

/// `C += A·B`, using up to `nthreads` worker threads.
pub fn gemm_parallel(a: &[i16], b: &[i16], c: &mut [i16], m: usize, k: usize, n: usize, nthreads: usize) {
    let tier = isa::detect();
    match tile_shape(DType::I16, tier) {
        Some((mr, nr)) if tier == IsaTier::Avx512Bw => {
            super::run(a, b, c, m, k, n, mr, nr, DType::I16, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: `tier == Avx512Bw` checked above; packer
                // guarantees panel sizes match `kc * mr`/`kc * nr`.
                unsafe {
                    i16_kernel::kernel_30x32_avx512bw(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
                }
            });
        }
        _ => {
            super::run(
                a,
                b,
                c,
                m,
                k,
                n,
                SCALAR_MR,
                SCALAR_NR,
                DType::I16,
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

    fn naive(a: &[i16], b: &[i16], c: &mut [i16], m: usize, k: usize, n: usize) {
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
        let (m, k, n) = (37usize, 23usize, 29usize);
        let a: Vec<i16> = (0..m * k).map(|i| (i % 200) as i16 - 100).collect();
        let b: Vec<i16> = (0..k * n).map(|i| (i % 180) as i16 - 90).collect();

        let mut c = vec![0i16; m * n];
        gemm(&a, &b, &mut c, m, k, n);

        let mut expected = vec![0i16; m * n];
        naive(&a, &b, &mut expected, m, k, n);
        assert_eq!(c, expected);
    }

    #[test]
    fn gemm_parallel_matches_single_threaded() {
        let (m, k, n) = (31usize, 19usize, 27usize);
        let a: Vec<i16> = (0..m * k).map(|i| (i % 150) as i16 - 75).collect();
        let b: Vec<i16> = (0..k * n).map(|i| (i % 140) as i16 - 70).collect();

        let mut c1 = vec![0i16; m * n];
        gemm(&a, &b, &mut c1, m, k, n);

        let mut c4 = vec![0i16; m * n];
        gemm_parallel(&a, &b, &mut c4, m, k, n, 4);

        assert_eq!(c1, c4);
    }
}
