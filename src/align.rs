//! 64-byte aligned scratch buffers for packed panels.
//!
//! The packed-panel contract (§3) requires 64-byte alignment at strip
//! boundaries so the AVX-512 tier's aligned loads are well-defined. Stable
//! `Vec<T>` does not expose over-alignment directly, so this wraps a raw
//! allocation via `std::alloc` the way low-level numeric crates do when they
//! need an alignment stronger than the type's natural one.

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

const ALIGNMENT: usize = 64;

/// A zero-initialized, 64-byte-aligned buffer of `len` elements of `T`.
pub struct AlignedBuf<T> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

// Safety: `AlignedBuf<T>` owns its allocation exclusively; sending it across
// threads is sound whenever `T: Send`, exactly like `Vec<T>`.
unsafe impl<T: Send> Send for AlignedBuf<T> {}
unsafe impl<T: Sync> Sync for AlignedBuf<T> {}

impl<T: Default + Copy> AlignedBuf<T> {
    /// Allocate `len` zeroed elements, aligned to 64 bytes.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0` or if the allocation fails.
    pub fn zeroed(len: usize) -> Self {
        assert!(len > 0, "AlignedBuf::zeroed called with len == 0");
        let size = len * std::mem::size_of::<T>();
        let layout = Layout::from_size_align(size, ALIGNMENT).expect("valid layout");

        // Safety: `layout` has non-zero size (checked above) and a power-of-two
        // alignment accepted by `Layout::from_size_align`.
        let raw = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(raw as *mut T).unwrap_or_else(|| std::alloc::handle_alloc_error(layout));

        AlignedBuf { ptr, len, layout }
    }
}

impl<T> Drop for AlignedBuf<T> {
    fn drop(&mut self) {
        // Safety: `self.ptr`/`self.layout` were produced together by `zeroed`
        // and never reallocated, matching `dealloc`'s contract.
        unsafe {
            dealloc(self.ptr.as_ptr() as *mut u8, self.layout);
        }
    }
}

impl<T> Deref for AlignedBuf<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        // Safety: the allocation covers exactly `len` elements of `T`,
        // zero-initialized by `alloc_zeroed`, and `T: Default + Copy` types
        // used here (numeric primitives) have no invalid bit patterns.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for AlignedBuf<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // Safety: see `Deref::deref`; `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}
