//! Packing: rearranges a row-major sub-block of A or B into the
//! contiguous, strip-oriented layout the micro-kernels consume (§3/§4.2).
//!
//! Packing is pure data movement (no arithmetic, no SIMD), so it is
//! implemented once, generically over the element type, rather than once
//! per dtype. This mirrors the generic-over-storage packing routines in
//! `rten`'s `pack_a_block`/`pack_b_block` (const-generic over the strip
//! width), adapted here from `rten`'s `Matrix`/stride abstraction to this
//! crate's plain `(rows, cols, row_stride)` slices, and widened from
//! `rten`'s `f32`-only instantiation to all five dtypes via the
//! [`Packable`] bound.

/// Element types the packer can rearrange. `Default::default()` supplies
/// the additive identity used to zero-pad short tail strips.
pub trait Packable: Copy + Default + Send + Sync + 'static {}

impl Packable for f32 {}
impl Packable for f64 {}
impl Packable for i32 {}
impl Packable for i16 {}
impl Packable for i8 {}

/// Number of `MR`-row strips needed to cover `mc` rows (the final strip is
/// zero-padded if `mc % mr != 0`).
pub fn strip_count(extent: usize, tile: usize) -> usize {
    extent.div_ceil(tile)
}

/// Pack a `mc × kc` sub-block of `A` (row-major, stride `k_total`) into
/// `packed`, grouped into `ceil(mc / mr)` strips of `mr` rows each, each
/// strip stored column-major (one `mr`-tall column after another).
///
/// `packed` must be at least `strip_count(mc, mr) * mr * kc` elements;
/// short final strips are zero-padded.
pub fn pack_block_a<T: Packable>(
    a: &[T],
    packed: &mut [T],
    row_base: usize,
    col_base: usize,
    mc: usize,
    kc: usize,
    k_total: usize,
    mr: usize,
    nthreads: usize,
) {
    let strips = strip_count(mc, mr);
    let strip_len = mr * kc;
    debug_assert!(packed.len() >= strips * strip_len);

    let work = move |strip: usize, out: &mut [T]| {
        let row_start = strip * mr;
        let rows_here = mr.min(mc.saturating_sub(row_start));
        for k in 0..kc {
            let out_col = &mut out[k * mr..k * mr + mr];
            for r in 0..mr {
                out_col[r] = if r < rows_here {
                    a[(row_base + row_start + r) * k_total + (col_base + k)]
                } else {
                    T::default()
                };
            }
        }
    };

    run_strips(packed, strip_len, strips, nthreads, work);
}

/// Pack a `kc × nc` sub-block of `B` (row-major, stride `n_total`) into
/// `packed`, grouped into `ceil(nc / nr)` strips of `nr` columns each, each
/// strip stored row-major (one `nr`-wide row after another).
///
/// `packed` must be at least `strip_count(nc, nr) * nr * kc` elements;
/// short final strips are zero-padded.
pub fn pack_block_b<T: Packable>(
    b: &[T],
    packed: &mut [T],
    row_base: usize,
    col_base: usize,
    kc: usize,
    nc: usize,
    n_total: usize,
    nr: usize,
    nthreads: usize,
) {
    let strips = strip_count(nc, nr);
    let strip_len = nr * kc;
    debug_assert!(packed.len() >= strips * strip_len);

    let work = move |strip: usize, out: &mut [T]| {
        let col_start = strip * nr;
        let cols_here = nr.min(nc.saturating_sub(col_start));
        for k in 0..kc {
            let out_row = &mut out[k * nr..k * nr + nr];
            for c in 0..nr {
                out_row[c] = if c < cols_here {
                    b[(row_base + k) * n_total + (col_base + col_start + c)]
                } else {
                    T::default()
                };
            }
        }
    };

    run_strips(packed, strip_len, strips, nthreads, work);
}

/// Fan a per-strip closure out across `nthreads` workers, each writing to
/// a disjoint, equal-sized chunk of `packed` (`chunks_mut` already
/// guarantees disjointness, so no locking is needed). Below a small strip
/// count the call runs inline to avoid spawn overhead for tiny blocks,
/// the same adaptive judgment the threaded driver already makes for the
/// outer row split.
fn run_strips<T, F>(packed: &mut [T], strip_len: usize, strips: usize, nthreads: usize, work: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    let mut chunks: Vec<&mut [T]> = packed.chunks_mut(strip_len).take(strips).collect();

    if nthreads <= 1 || strips < 2 {
        for (i, chunk) in chunks.into_iter().enumerate() {
            work(i, chunk);
        }
        return;
    }

    let nthreads = nthreads.min(strips);
    let per_worker = strips.div_ceil(nthreads);

    std::thread::scope(|scope| {
        let mut start = 0usize;
        while !chunks.is_empty() {
            let take = per_worker.min(chunks.len());
            let rest = chunks.split_off(take);
            let head = std::mem::replace(&mut chunks, rest);
            let base = start;
            let work = &work;
            scope.spawn(move || {
                for (offset, chunk) in head.into_iter().enumerate() {
                    work(base + offset, chunk);
                }
            });
            start += take;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_a_round_trips_full_strips() {
        let k_total = 5;
        let a: Vec<i32> = (0..20 * k_total as i32).collect();
        let mc = 8;
        let kc = 3;
        let mr = 4;
        let strips = strip_count(mc, mr);
        let mut packed = vec![0i32; strips * mr * kc];
        pack_block_a(&a, &mut packed, 0, 0, mc, kc, k_total, mr, 1);

        for s in 0..strips {
            for k in 0..kc {
                for r in 0..mr {
                    let row = s * mr + r;
                    let expected = a[row * k_total + k];
                    assert_eq!(packed[s * mr * kc + k * mr + r], expected);
                }
            }
        }
    }

    #[test]
    fn pack_a_zero_pads_short_final_strip() {
        let k_total = 4;
        let a: Vec<i32> = (0..5 * k_total as i32).collect();
        let mc = 5; // not a multiple of mr
        let kc = 4;
        let mr = 4;
        let strips = strip_count(mc, mr);
        assert_eq!(strips, 2);
        let mut packed = vec![-1i32; strips * mr * kc];
        pack_block_a(&a, &mut packed, 0, 0, mc, kc, k_total, mr, 1);

        // Second strip only has row index 4 valid; rows 1..4 are padding.
        for k in 0..kc {
            let base = 1 * mr * kc + k * mr;
            assert_eq!(packed[base + 0], a[4 * k_total + k]);
            for r in 1..mr {
                assert_eq!(packed[base + r], 0);
            }
        }
    }

    #[test]
    fn pack_b_round_trips_full_strips() {
        let n_total = 6;
        let b: Vec<f32> = (0..4 * n_total).map(|i| i as f32).collect();
        let kc = 4;
        let nc = 6;
        let nr = 3;
        let strips = strip_count(nc, nr);
        let mut packed = vec![0.0f32; strips * nr * kc];
        pack_block_b(&b, &mut packed, 0, 0, kc, nc, n_total, nr, 1);

        for s in 0..strips {
            for k in 0..kc {
                for c in 0..nr {
                    let col = s * nr + c;
                    let expected = b[k * n_total + col];
                    assert_eq!(packed[s * nr * kc + k * nr + c], expected);
                }
            }
        }
    }

    #[test]
    fn parallel_packing_matches_sequential() {
        let k_total = 7;
        let a: Vec<f64> = (0..40 * k_total).map(|i| i as f64 * 0.5).collect();
        let mc = 37;
        let kc = 7;
        let mr = 6;
        let strips = strip_count(mc, mr);

        let mut seq = vec![0.0f64; strips * mr * kc];
        pack_block_a(&a, &mut seq, 0, 0, mc, kc, k_total, mr, 1);

        let mut par = vec![0.0f64; strips * mr * kc];
        pack_block_a(&a, &mut par, 0, 0, mc, kc, k_total, mr, 4);

        assert_eq!(seq, par);
    }
}
