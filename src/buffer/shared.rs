//! Lock-wrapped buffer pool for multi-threaded callers.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::buffer::BufferPoolManager;
use crate::storage::DiskIo;

/// A [`BufferPoolManager`] behind a single `parking_lot::Mutex`.
///
/// The pool itself has no internal synchronization. This wrapper is the
/// enclosing lock that serializes every operation; cloning shares the pool.
///
/// # Example
/// ```
/// use bufmgr::buffer::{BufferPoolManager, SharedBufferPool};
/// use bufmgr::storage::MemoryDisk;
/// use bufmgr::Page;
///
/// let shared = SharedBufferPool::new(BufferPoolManager::new(4, MemoryDisk::new()));
/// let pid = shared.with(|bpm| bpm.allocate_pages(&mut Page::new(), 1)).unwrap();
/// assert_eq!(shared.lock().pin_count(pid), Some(1));
/// ```
pub struct SharedBufferPool<D: DiskIo> {
    inner: Arc<Mutex<BufferPoolManager<D>>>,
}

impl<D: DiskIo> SharedBufferPool<D> {
    pub fn new(bpm: BufferPoolManager<D>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bpm)),
        }
    }

    /// Acquire exclusive access to the pool.
    pub fn lock(&self) -> MutexGuard<'_, BufferPoolManager<D>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the pool.
    pub fn with<R>(&self, f: impl FnOnce(&mut BufferPoolManager<D>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<D: DiskIo> Clone for SharedBufferPool<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
