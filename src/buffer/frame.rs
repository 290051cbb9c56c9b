//! Frame descriptors - per-slot metadata of the buffer pool.
//!
//! A [`FrameDescriptor`] records, for one slot of the pool:
//! - Which page is resident (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - The replacement policy's state tag
//!
//! The page bytes themselves live in a separate array owned by the
//! [`BufferPoolManager`](crate::buffer::BufferPoolManager), so a replacement
//! policy handed the descriptor table never sees page content.

use crate::common::{FrameId, PageId};

/// Replacement-policy state of a frame.
///
/// Every policy keeps `Pinned` exactly when the pin count is positive. Only
/// the clock policy uses `Referenced`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Eligible for eviction.
    #[default]
    Available,
    /// Unpinned but recently used; gets a second chance under clock.
    Referenced,
    /// In use by at least one caller.
    Pinned,
}

/// Metadata for one frame of the buffer pool.
///
/// Descriptors are created once when the pool is built and are reused for
/// the lifetime of the pool; `index` never changes.
#[derive(Debug, Clone)]
pub struct FrameDescriptor {
    index: FrameId,
    page_id: PageId,
    pin_count: u32,
    dirty: bool,
    state: FrameState,
}

impl FrameDescriptor {
    /// Create an empty descriptor for slot `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index: FrameId::new(index),
            page_id: PageId::INVALID,
            pin_count: 0,
            dirty: false,
            state: FrameState::Available,
        }
    }

    #[inline]
    pub fn index(&self) -> FrameId {
        self.index
    }

    /// The resident page, or `PageId::INVALID` for an empty frame.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Check if the frame holds no page.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.page_id.is_valid()
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Set the policy state tag. Only replacement policies call this.
    #[inline]
    pub(crate) fn set_state(&mut self, state: FrameState) {
        self.state = state;
    }

    #[inline]
    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Install `page_id` as a freshly pinned, clean page.
    pub(crate) fn load(&mut self, page_id: PageId) {
        self.page_id = page_id;
        self.pin_count = 1;
        self.dirty = false;
    }

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub(crate) fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub(crate) fn unpin(&mut self) -> u32 {
        assert!(self.pin_count > 0, "pin count underflow");
        self.pin_count -= 1;
        self.pin_count
    }

    /// Reset to the empty state. The policy tag is left to the policy.
    pub(crate) fn reset(&mut self) {
        self.page_id = PageId::INVALID;
        self.pin_count = 0;
        self.dirty = false;
    }
}
