//! Shared in-place access to a field buffer during a relaxation sweep.
//!
//! Successive over-relaxation reads neighbors that may already have been
//! updated earlier in the same sweep. On one thread that is a plain
//! `&[Cell<f64>]`. Across rayon tasks the buffer is viewed as relaxed
//! atomics: every load returns either the old or the new value of a node,
//! never a torn one, and the unordered interleaving only changes the
//! trajectory of the iteration, not its fixed point.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

// `as_atomic_cells` reinterprets `f64` storage as `AtomicU64`.
const _: () = assert!(
    std::mem::size_of::<f64>() == std::mem::size_of::<AtomicU64>()
        && std::mem::align_of::<f64>() == std::mem::align_of::<AtomicU64>()
);

pub trait CellStore {
    fn load(&self, index: usize) -> f64;

    fn store(&self, index: usize, value: f64);
}

impl CellStore for [Cell<f64>] {
    #[inline]
    fn load(&self, index: usize) -> f64 {
        self[index].get()
    }

    #[inline]
    fn store(&self, index: usize, value: f64) {
        self[index].set(value);
    }
}

impl CellStore for [AtomicU64] {
    #[inline]
    fn load(&self, index: usize) -> f64 {
        f64::from_bits(self[index].load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, index: usize, value: f64) {
        self[index].store(value.to_bits(), Ordering::Relaxed);
    }
}

pub fn as_cells(buffer: &mut [f64]) -> &[Cell<f64>] {
    Cell::from_mut(buffer).as_slice_of_cells()
}

pub fn as_atomic_cells(buffer: &mut [f64]) -> &[AtomicU64] {
    let len = buffer.len();
    let ptr = buffer.as_mut_ptr() as *const AtomicU64;
    // SAFETY: size and alignment match (checked above), the exclusive
    // borrow guarantees no non-atomic access for the returned lifetime,
    // and every bit pattern is a valid u64.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}
