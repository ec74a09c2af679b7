//! `f32` GEMM entry points: picks the micro-kernel matching the detected
//! ISA tier, then delegates to [`super::run`].

use crate::cache::DType;
use crate::isa::{self, IsaTier};
use crate::kernel::{f32_kernel, scalar_kernel, tile_shape, SCALAR_MR, SCALAR_NR};

/// `C += A·B`, single-threaded.
pub fn gemm(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
    gemm_parallel(a, b, c, m, k, n, 1);
}

/// `C += A·B`, using up to `nthreads` worker threads.
pub fn gemm_parallel(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize, nthreads: usize) {
    let tier = isa::detect();
    match tile_shape(DType::F32, tier) {
        Some((mr, nr)) if tier >= IsaTier::Avx512F => {
            super::run(a, b, c, m, k, n, mr, nr, DType::F32, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: `tier >= Avx512F` was checked by the caller via
                // `isa::detect`, and the packer guarantees `ap`/`bp` hold
                // exactly `kc * mr`/`kc * nr` elements.
                unsafe {
                    f32_kernel::kernel_14x32_avx512(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
                }
            });
        }
        Some((mr, nr)) => {
            super::run(a, b, c, m, k, n, mr, nr, DType::F32, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: this arm is only reached when `tile_shape` returned
                // the AVX2+FMA tile, i.e. `tier == Avx2Fma`.
                unsafe {
                    f32_kernel::kernel_6x16_avx2(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
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
                DType::F32,
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
    fn gemm_matches_naive_triple_loop() {
        let (m, k, n) = (67usize, 41usize, 53usize);
        let a: Vec<f32> = (0..m * k).map(|i| (i % 23) as f32 * 0.1 - 1.0).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 19) as f32 * 0.15 - 1.0).collect();

        let mut c = vec![0.0f32; m * n];
        gemm(&a, &b, &mut c, m, k, n);

        let mut expected = vec![0.0f32; m * n];
        naive(&a, &b, &mut expected, m, k, n);

        for i in 0..m * n {
            assert!((c[i] - expected[i]).abs() < 1e-2, "mismatch at {i}: {} vs {}", c[i], expected[i]);
        }
    }

    #[test]
    fn gemm_parallel_matches_single_threaded() {
        let (m, k, n) = (64usize, 48usize, 80usize);
        let a: Vec<f32> = (0..m * k).map(|i| (i % 29) as f32 * 0.05).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 17) as f32 * 0.07).collect();

        let mut c1 = vec![0.0f32; m * n];
        gemm(&a, &b, &mut c1, m, k, n);

        let mut c4 = vec![0.0f32; m * n];
        gemm_parallel(&a, &b, &mut c4, m, k, n, 4);

        for i in 0..m * n {
            assert!((c1[i] - c4[i]).abs() < 1e-2, "mismatch at {i}: {} vs {}", c1[i], c4[i]);
        }
    }
}
