//! Five-level cache-blocking driver (§4.4): `jc → pc → ic` loop nest over
//! macro-blocks, with `jr`/`ir` micro-tile iteration and the kernel call
//! handling the register-resident innermost update.
//!
//! Blocking, packing, and threading have no per-dtype arithmetic (only the
//! kernel call does), so this crate follows [`crate::pack`]'s lead and
//! implements the loop nest once, generically over the element type and
//! parameterized by the micro-kernel as a plain function/closure rather
//! than a trait object. Each dtype's public entry point in
//! [`crate::driver::f32_driver`] (and its siblings) supplies the kernel
//! matching the detected ISA tier and calls into [`run`].
//!
//! Threading mirrors the teacher's `threaded::gemm_8x8_mt`: rows are
//! split across `std::thread::scope`-spawned workers, each owning a
//! disjoint range of `C` rows, so no locking is needed on the output.
//! Unlike the teacher, the B macro-panel is packed once per `(jc, pc)`
//! and shared read-only across all `ic` workers (via [`crate::pack`]'s own
//! internal thread::scope fan-out for the packing step itself); each worker
//! packs its own `A` panel privately. This composes two independent
//! `thread::scope` barriers (pack, then compute) instead of the
//! `std::sync::Barrier` pair originally sketched for a persistent per-`pc`
//! thread pool, simpler to reason about with no compiler in the loop to
//! catch a misplaced wait, at the cost of one extra thread spawn/join per
//! `pc` iteration.

pub mod f32_driver;
pub mod f64_driver;
pub mod i16_driver;
pub mod i32_driver;
pub mod i8_driver;

use crate::align::AlignedBuf;
use crate::cache::{self, BlockSize, DType};
use crate::pack::{pack_block_a, pack_block_b, strip_count, Packable};

/// Runs `C += A·B` for row-major `m×k` `A`, `k×n` `B`, `m×n` `C`.
///
/// `kernel(a_panel, b_panel, c_tile, m_here, n_here, kc_here, ldc)` computes
/// one `mr×nr`-or-smaller tile in place: `a_panel`/`b_panel` are the packed
/// strips from [`pack_block_a`]/[`pack_block_b`] (always `mr`/`nr` wide,
/// zero-padded past `m_here`/`n_here`), and `c_tile` points at the tile's
/// top-left element of the caller's row-major `C`, stride `ldc`.
///
/// # Panics
///
/// Panics if `a`, `b`, or `c` do not have exactly `m*k`, `k*n`, `m*n`
/// elements, matching §7's precondition-assertion contract.
#[allow(clippy::too_many_arguments)]
pub fn run<T, K>(
    a: &[T],
    b: &[T],
    c: &mut [T],
    m: usize,
    k: usize,
    n: usize,
    mr: usize,
    nr: usize,
    dtype: DType,
    nthreads: usize,
    kernel: K,
) where
    T: Packable,
    K: Fn(&[T], &[T], &mut [T], usize, usize, usize, usize) + Sync,
{
    assert_eq!(a.len(), m * k, "A must have exactly m*k elements");
    assert_eq!(b.len(), k * n, "B must have exactly k*n elements");
    assert_eq!(c.len(), m * n, "C must have exactly m*n elements");

    if m == 0 || n == 0 || k == 0 {
        return;
    }

    let nthreads = nthreads.max(1);
    let cache = cache::get_cache_size();
    let BlockSize { mc, kc, nc } = cache::set_block_size(cache, nthreads, mr, nr, dtype);

    tracing::debug!(m, k, n, mc, kc, nc, nthreads, "gemm driver: starting blocked pass");

    for jc in (0..n).step_by(nc) {
        let nc_here = nc.min(n - jc);
        for pc in (0..k).step_by(kc) {
            let kc_here = kc.min(k - pc);

            let b_strips = strip_count(nc_here, nr);
            let mut packed_b = AlignedBuf::<T>::zeroed(b_strips * nr * kc_here);
            pack_block_b(b, &mut packed_b, pc, jc, kc_here, nc_here, n, nr, nthreads);
            let packed_b: &[T] = &packed_b;

            let ic_blocks: Vec<usize> = (0..m).step_by(mc).collect();
            let per_thread = ic_blocks.len().div_ceil(nthreads).max(1);

            let kernel_ref = &kernel;
            let c_ptr = c.as_mut_ptr() as usize;

            std::thread::scope(|scope| {
                for chunk in ic_blocks.chunks(per_thread) {
                    let chunk = chunk.to_vec();
                    scope.spawn(move || {
                        // Safety: each worker's `chunk` of `ic` row-blocks is
                        // disjoint from every other worker's, so the row
                        // ranges each thread writes through this pointer
                        // never overlap.
                        let c_full: &mut [T] =
                            unsafe { std::slice::from_raw_parts_mut(c_ptr as *mut T, m * n) };

                        for &ic in &chunk {
                            let mc_here = mc.min(m - ic);
                            let a_strips = strip_count(mc_here, mr);
                            let mut packed_a = AlignedBuf::<T>::zeroed(a_strips * mr * kc_here);
                            pack_block_a(a, &mut packed_a, ic, pc, mc_here, kc_here, k, mr, 1);
                            let packed_a: &[T] = &packed_a;

                            for jr in (0..nc_here).step_by(nr) {
                                let nr_here = nr.min(nc_here - jr);
                                let b_strip = jr / nr;
                                let b_panel =
                                    &packed_b[b_strip * nr * kc_here..(b_strip + 1) * nr * kc_here];

                                for ir in (0..mc_here).step_by(mr) {
                                    let mr_here = mr.min(mc_here - ir);
                                    let a_strip = ir / mr;
                                    let a_panel =
                                        &packed_a[a_strip * mr * kc_here..(a_strip + 1) * mr * kc_here];

                                    let row = ic + ir;
                                    let col = jc + jr;
                                    let c_tile = &mut c_full[row * n + col..];
                                    kernel_ref(a_panel, b_panel, c_tile, mr_here, nr_here, kc_here, n);
                                }
                            }
                        }
                    });
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::scalar_kernel;

    fn naive(a: &[i32], b: &[i32], c: &mut [i32], m: usize, k: usize, n: usize) {
        for i in 0..m {
            for j in 0..n {
                let mut acc = c[i * n + j];
                for p in 0..k {
                    acc = acc.wrapping_add(a[i * k + p].wrapping_mul(b[p * n + j]));
                }
                c[i * n + j] = acc;
            }
        }
    }

    #[test]
    fn run_with_scalar_kernel_matches_naive_triple_loop() {
        let (m, k, n) = (37usize, 23usize, 41usize);
        let mr = 4;
        let nr = 4;

        let a: Vec<i32> = (0..m * k).map(|i| (i % 17) as i32 - 8).collect();
        let b: Vec<i32> = (0..k * n).map(|i| (i % 13) as i32 - 6).collect();

        let mut c = vec![1i32; m * n];
        let mut expected = c.clone();

        run(&a, &b, &mut c, m, k, n, mr, nr, DType::I32, 3, |ap, bp, ct, mh, nh, kch, ldc| {
            scalar_kernel(ap, bp, ct, mh, kch, mr, nh, nr, ldc);
        });

        naive(&a, &b, &mut expected, m, k, n);
        assert_eq!(c, expected);
    }

    #[test]
    fn run_is_a_noop_on_zero_sized_dimensions() {
        let mut c: Vec<i32> = vec![];
        run(&[], &[], &mut c, 0, 5, 0, 4, 4, DType::I32, 2, |_, _, _, _, _, _, _| {
            panic!("kernel should never be called for an empty operand");
        });
    }
}
