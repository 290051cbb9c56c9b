//! RAII guard for pinned page access.
//!
//! [`PinnedPage`] keeps a page pinned for as long as it lives and unpins it
//! when dropped. Writing through the guard marks the page dirty.

use std::ops::{Deref, DerefMut};

use log::warn;

use crate::common::{FrameId, PageId};
use crate::storage::{DiskIo, Page};

use super::buffer_pool_manager::BufferPoolManager;

/// Guard for a pinned page.
///
/// The guard borrows the pool mutably, so only one guard can be alive at a
/// time and no other pool operation can run while it is held.
///
/// # Example
/// ```ignore
/// let mut guard = bpm.fetch_page(page_id)?;
/// guard.as_mut_slice()[0] = 0xFF;  // DerefMut: guard is now dirty
/// // guard drops here, page unpinned with dirty = true
/// ```
pub struct PinnedPage<'a, D: DiskIo> {
    /// Reference back to BPM for unpin on drop.
    bpm: &'a mut BufferPoolManager<D>,
    frame_id: FrameId,
    page_id: PageId,
    /// Set once the page has been borrowed mutably.
    dirty: bool,
}

impl<'a, D: DiskIo> PinnedPage<'a, D> {
    /// Called by `BufferPoolManager::fetch_page()` after pinning.
    pub(crate) fn new(
        bpm: &'a mut BufferPoolManager<D>,
        frame_id: FrameId,
        page_id: PageId,
    ) -> Self {
        Self {
            bpm,
            frame_id,
            page_id,
            dirty: false,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Whether the guard will unpin the page as dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Unpin as dirty even without a mutable borrow.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl<D: DiskIo> Deref for PinnedPage<'_, D> {
    type Target = Page;

    fn deref(&self) -> &Page {
        self.bpm.frame_page(self.frame_id)
    }
}

impl<D: DiskIo> DerefMut for PinnedPage<'_, D> {
    fn deref_mut(&mut self) -> &mut Page {
        self.dirty = true;
        self.bpm.frame_page_mut(self.frame_id)
    }
}

impl<D: DiskIo> Drop for PinnedPage<'_, D> {
    fn drop(&mut self) {
        // Keep a dirty flag set by an earlier unpin.
        let dirty = self.dirty || self.bpm.is_dirty(self.page_id).unwrap_or(false);
        if let Err(err) = self.bpm.unpin_page(self.page_id, dirty) {
            warn!("failed to unpin {} on guard drop: {}", self.page_id, err);
        }
    }
}
