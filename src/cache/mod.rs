//! Cache oracle: derives `(MC, KC, NC)` block sizes from measured or
//! assumed L1D/L2/L3 capacities, per dtype and register-tile shape.
//!
//! Grounded in the reference source's `get_cache_size`/`set_block_size`
//! pair (`gemm.h`), reimplemented with runtime CPUID probing instead of
//! the original's `show_cache` routine.

mod cpuid;

/// Element type tag. Mirrors the reference source's `D_TYPE` enum; selects
/// vector width, FMA availability, and block-size footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    F32,
    F64,
    I32,
    I16,
    I8,
}

impl DType {
    /// Size in bytes of one element of this type.
    pub const fn elem_size(self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F64 => 8,
            DType::I32 => 4,
            DType::I16 => 2,
            DType::I8 => 1,
        }
    }
}

/// Measured (or assumed) data-cache capacities, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSizes {
    pub l1d: usize,
    pub l2: usize,
    pub l3: usize,
}

/// Conservative defaults used when CPUID cache-leaf enumeration fails
/// (non-x86_64 target, or a hypervisor that zeroes leaf 4). These match
/// the order of magnitude the reference source hard-codes (`kc =
/// k.min(256)`, `mc = m.min(128)` for `f64`, i.e. a 32 KiB L1D / 256 KiB
/// L2 machine), generalized to a typical desktop L3.
const FALLBACK: CacheSizes = CacheSizes {
    l1d: 32 * 1024,
    l2: 256 * 1024,
    l3: 8 * 1024 * 1024,
};

/// Query the CPU's L1D, L2, and L3 data-cache sizes.
///
/// Falls back to [`FALLBACK`] if CPUID deterministic cache parameters
/// (leaf 4) are unavailable or report no data caches. Never fails.
pub fn get_cache_size() -> CacheSizes {
    match cpuid::probe_data_caches() {
        Some(sizes) => {
            tracing::debug!(?sizes, "cache oracle: using CPUID-probed cache sizes");
            sizes
        }
        None => {
            tracing::debug!(sizes = ?FALLBACK, "cache oracle: CPUID probe failed, using fallback sizes");
            FALLBACK
        }
    }
}

/// Derived macro-block sizes. All fields are positive; `mc % mr == 0` and
/// `nc % nr == 0` are guaranteed by [`set_block_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSize {
    pub mc: usize,
    pub kc: usize,
    pub nc: usize,
}

/// Derive `(MC, KC, NC)` per §4.1 of the GEMM core's block-sizing rule.
///
/// - `kc` is sized so a `kc × nr` B strip and a `mr × kc` A strip each fit
///   in half of L1D.
/// - `mc` is sized so a packed `mc × kc` A panel (private per thread) fits
///   in half of L2.
/// - `nc` is sized so a packed `kc × nc` B panel (shared across threads)
///   fits in three quarters of L3, divided across `nthreads`.
///
/// `mc`/`nc` are rounded down to multiples of `mr`/`nr` respectively, floored
/// at one tile so degenerate (tiny) caches never yield a zero block size.
pub fn set_block_size(
    cache: CacheSizes,
    nthreads: usize,
    mr: usize,
    nr: usize,
    dtype: DType,
) -> BlockSize {
    assert!(nthreads >= 1, "NTHREADS must be >= 1");
    assert!(mr >= 1 && nr >= 1, "MR/NR must be >= 1");

    let s = dtype.elem_size();
    let nthreads = nthreads.max(1);

    let kc_l1_b = (cache.l1d / 2) / (nr * s);
    let kc_l1_a = (cache.l1d / 2) / (mr * s);
    let kc = kc_l1_b.min(kc_l1_a).max(1);

    let mc_elems = (cache.l2 / 2) / (kc * s);
    let mc = round_down_floor(mc_elems, mr);

    let nc_elems = (cache.l3 * 3 / 4 / nthreads) / (kc * s);
    let nc = round_down_floor(nc_elems, nr);

    BlockSize { mc, kc, nc }
}

fn round_down_floor(value: usize, multiple: usize) -> usize {
    let rounded = (value / multiple) * multiple;
    rounded.max(multiple)
}

/// Logical core count, used as the default thread count for the `_parallel`
/// entry points. Uses the stable `std` API; no `num_cpus`-style crate is
/// pulled in since none appears anywhere in this crate's lineage.
pub fn get_core_num() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_sizes_are_tile_multiples() {
        for dtype in [DType::F32, DType::F64, DType::I32, DType::I16, DType::I8] {
            let bs = set_block_size(FALLBACK, 4, 6, 16, dtype);
            assert_eq!(bs.mc % 6, 0);
            assert_eq!(bs.nc % 16, 0);
            assert!(bs.mc > 0 && bs.kc > 0 && bs.nc > 0);
        }
    }

    #[test]
    fn block_sizes_respect_cache_footprint() {
        let cache = FALLBACK;
        let bs = set_block_size(cache, 1, 6, 16, DType::F32);
        let s = DType::F32.elem_size();
        assert!(bs.mc * bs.kc * s <= cache.l2);
        assert!(bs.kc * bs.nc * s <= cache.l3);
    }

    #[test]
    fn more_threads_shrink_nc() {
        let cache = FALLBACK;
        let bs1 = set_block_size(cache, 1, 6, 16, DType::F32);
        let bs8 = set_block_size(cache, 8, 6, 16, DType::F32);
        assert!(bs8.nc <= bs1.nc);
    }

    #[test]
    fn core_num_is_at_least_one() {
        assert!(get_core_num() >= 1);
    }
}
