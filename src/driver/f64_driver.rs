//! `f64` GEMM entry points: picks the micro-kernel matching the detected
//! ISA tier, then delegates to [`super::run`].

use crate::cache::DType;
use crate::isa::{self, IsaTier};
use crate::kernel::{f64_kernel, scalar_kernel, tile_shape, SCALAR_MR, SCALAR_NR};

/// `C += A·B`, single-threaded.
pub fn gemm(a: &[f64], b: &[f64], c: &mut [f64], m: usize, k: usize, n: usize) {
    gemm_parallel(a, b, c, m, k, n, 1);
}

/// `C += A·B`, using up to `nthreads` worker threads.
pub fn gemm_parallel(a: &[f64], b: &[f64], c: &mut [f64], m: usize, k: usize, n: usize, nthreads: usize) {
    let tier = isa::detect();
    match tile_shape(DType::F64, tier) {
        Some((mr, nr)) if tier >= IsaTier::Avx512F => {
            super::run(a, b, c, m, k, n, mr, nr, DType::F64, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: `tier >= Avx512F` checked above; packer guarantees
                // panel sizes match `kc * mr`/`kc * nr`.
                unsafe {
                    f64_kernel::kernel_6x16_avx512(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
                }
            });
        }
        Some((mr, nr)) => {
            super::run(a, b, c, m, k, n, mr, nr, DType::F64, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: reached only for `tier == Avx2Fma`.
                unsafe {
                    f64_kernel::kernel_6x8_avx2(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
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
                DType::F64,
                nthreads,
                |ap, bp, ct, mh, nh, kch, ldc| {
                    scalar_kernel(ap, bp, ct, mh, kch, SCALAR_MR, nh, SCALAR_NR, ldc);
                },
            );
        }
    }
}
