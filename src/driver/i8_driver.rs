//! `i8` GEMM entry points. Only AVX-512BW has a dedicated kernel (§ table);
//! every other tier falls back to the portable scalar micro-kernel.

use crate::cache::DType;
use crate::isa::{self, IsaTier};
use crate::kernel::{i8_kernel, scalar_kernel, tile_shape, SCALAR_MR, SCALAR_NR};

/// `C += A·B`, single-threaded.
pub fn gemm(a: &[i8], b: &[i8], c: &mut [i8], m: usize, k: usize, n: usize) {
    gemm_parallel(a, b, c, m, k, n, 1);
}

/// `C += A·B`, using up to `nthreads` worker threads.
pub fn gemm_parallel(a: &[i8], b: &[i8], c: &mut [i8], m: usize, k: usize, n: usize, nthreads: usize) {
    let tier = isa::detect();
    match tile_shape(DType::I8, tier) {
        Some((mr, nr)) if tier == IsaTier::Avx512Bw => {
            super::run(a, b, c, m, k, n, mr, nr, DType::I8, nthreads, |ap, bp, ct, mh, nh, kch, ldc| {
                // Safety: `tier == Avx512Bw` checked above; packer
                // guarantees panel sizes match `kc * mr`/`kc * nr`.
                unsafe {
                    i8_kernel::kernel_30x64_avx512bw(ap.as_ptr(), bp.as_ptr(), ct.as_mut_ptr(), mh, nh, kch, ldc);
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
                DType::I8,
                nthreads,
                |ap, bp, ct, mh, nh, kch, ldc| {
                    scalar_kernel(ap, bp, ct, mh, kch, SCALAR_MR, nh, SCALAR_NR, ldc);
                },
            );
        }
    }
}
