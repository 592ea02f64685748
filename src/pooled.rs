//! Pooled scratch containers.
//!
//! Tree traversals borrow a work stack from a pool for the duration of one
//! bounded walk and return it before the call completes, on error paths
//! included (release happens in `Drop`). A scratch vector that grew past the
//! retention threshold is not accepted back into the pool.

use parking_lot::Mutex;
use thiserror::Error;

/// Capacity above which a returned scratch vector is dropped instead of
/// retained, to bound memory kept alive by the pool.
const MAX_RETAINED_CAPACITY: usize = 1024;

/// Upper bound on the number of retained scratch vectors per pool.
const MAX_RETAINED_COUNT: usize = 8;

/// Error for out-of-range scratch container operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScratchError {
    /// The requested capacity cannot hold the elements already present.
    #[error("requested capacity {requested} is smaller than the current element count {len}")]
    CapacityTooSmall { requested: usize, len: usize },
}

/// A free list of scratch vectors.
///
/// Pools are declared `static` next to their users; the lock is only held to
/// pop or push a vector, never across a traversal.
pub(crate) struct ScratchPool<T> {
    free: Mutex<Vec<Vec<T>>>,
}

impl<T> ScratchPool<T> {
    pub(crate) const fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Borrows a scratch vector, creating one if the pool is empty.
    pub(crate) fn lease(&'static self) -> ScratchVec<T> {
        let vec = self.free.lock().pop().unwrap_or_default();
        debug_assert!(vec.is_empty(), "pool retained a non-empty vector");
        ScratchVec {
            pool: self,
            vec: Some(vec),
        }
    }

    fn release(&self, mut vec: Vec<T>) {
        vec.clear();
        if vec.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        let mut free = self.free.lock();
        if free.len() < MAX_RETAINED_COUNT {
            free.push(vec);
        }
    }

    #[cfg(test)]
    fn retained(&self) -> usize {
        self.free.lock().len()
    }
}

/// A scratch vector on lease from a [`ScratchPool`].
pub(crate) struct ScratchVec<T: 'static> {
    pool: &'static ScratchPool<T>,
    vec: Option<Vec<T>>,
}

impl<T> ScratchVec<T> {
    /// Ensures the vector can hold exactly `capacity` elements.
    ///
    /// Shrinking below the current element count is rejected with a
    /// [`ScratchError`] rather than truncating.
    pub(crate) fn try_set_capacity(&mut self, capacity: usize) -> Result<(), ScratchError> {
        let vec = self.get_mut();
        if capacity < vec.len() {
            return Err(ScratchError::CapacityTooSmall {
                requested: capacity,
                len: vec.len(),
            });
        }
        if capacity > vec.capacity() {
            let additional = capacity - vec.len();
            vec.reserve_exact(additional);
        }
        Ok(())
    }

    fn get(&self) -> &Vec<T> {
        // The option is only vacated in `Drop`.
        self.vec.as_ref().unwrap()
    }

    fn get_mut(&mut self) -> &mut Vec<T> {
        self.vec.as_mut().unwrap()
    }
}

impl<T> std::ops::Deref for ScratchVec<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        self.get()
    }
}

impl<T> std::ops::DerefMut for ScratchVec<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        self.get_mut()
    }
}

impl<T> Drop for ScratchVec<T> {
    fn drop(&mut self) {
        if let Some(vec) = self.vec.take() {
            self.pool.release(vec);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static POOL: ScratchPool<u32> = ScratchPool::new();

    #[test]
    fn lease_push_pop() {
        let mut stack = POOL.lease();
        stack.push(1);
        stack.push(2);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn released_vectors_come_back_empty() {
        {
            let mut stack = POOL.lease();
            stack.push(7);
        }
        let stack = POOL.lease();
        assert!(stack.is_empty());
    }

    #[test]
    fn oversized_vectors_are_not_retained() {
        static BIG: ScratchPool<u8> = ScratchPool::new();
        {
            let mut stack = BIG.lease();
            stack.reserve(MAX_RETAINED_CAPACITY + 1);
            stack.push(0);
        }
        assert_eq!(BIG.retained(), 0);
        {
            let mut stack = BIG.lease();
            stack.push(0);
        }
        assert_eq!(BIG.retained(), 1);
    }

    #[test]
    fn capacity_below_len_is_an_error() {
        static CAP: ScratchPool<u8> = ScratchPool::new();
        let mut stack = CAP.lease();
        stack.extend([1, 2, 3]);
        assert_eq!(
            stack.try_set_capacity(2),
            Err(ScratchError::CapacityTooSmall { requested: 2, len: 3 })
        );
        stack.try_set_capacity(16).unwrap();
        assert!(stack.capacity() >= 16);
        assert_eq!(&stack[..], &[1, 2, 3]);
    }
}
