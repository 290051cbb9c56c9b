//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between disk and memory
//! - Pin-based reference counting
//! - Dirty page write-back on eviction and flush
//! - Pluggable replacement policies
//! - Buffer hit ratio telemetry

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::buffer::frame::FrameDescriptor;
use crate::buffer::page_guard::PinnedPage;
use crate::buffer::replacer::{PolicyKind, ReplacementPolicy};
use crate::buffer::stats::{BufferPoolStats, HitRatioReport, StatsSnapshot};
use crate::common::{BufferPoolConfig, Error, FrameId, PageId, Result};
use crate::storage::{DiskIo, Page};

/// How [`BufferPoolManager::pin_page`] fills a frame on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    /// Read the page's persisted bytes from disk.
    ReadFromDisk,
    /// Use the caller's buffer as the page content; no disk read. Only valid
    /// for a page that is not already resident.
    AdoptSupplied,
}

/// Where the content of a newly loaded frame comes from.
#[derive(Clone, Copy)]
enum Load<'a> {
    Disk,
    Adopt(&'a Page),
}

/// Manages a pool of buffer frames for caching disk pages.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                        │
/// │  ┌──────────────┐  ┌───────────────────────────────────┐   │
/// │  │ page_table   │  │  frames: Vec<FrameDescriptor>     │   │
/// │  │PageId → Fid  │─▶│  [Desc0] [Desc1] [Desc2] ...      │   │
/// │  └──────────────┘  ├───────────────────────────────────┤   │
/// │                    │  pages:  Vec<Page>                │   │
/// │                    │  [Page0] [Page1] [Page2] ...      │   │
/// │                    └───────────────────────────────────┘   │
/// │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐      │
/// │  │    policy    │  │     disk     │  │    stats     │      │
/// │  │ dyn Replace… │  │  D: DiskIo   │  │  BHR + I/O   │      │
/// │  └──────────────┘  └──────────────┘  └──────────────┘      │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// The policy only ever sees `frames`, and only for the duration of a call.
///
/// # Concurrency
/// The manager is single-threaded: every operation takes `&mut self` and
/// runs to completion. A full pool fails with [`Error::PoolExhausted`] instead
/// of waiting. Callers that share a pool across threads wrap it in
/// [`SharedBufferPool`](crate::buffer::SharedBufferPool).
///
/// # Usage
/// ```
/// use bufmgr::buffer::{BufferPoolManager, PinMode};
/// use bufmgr::storage::MemoryDisk;
/// use bufmgr::Page;
///
/// let mut bpm = BufferPoolManager::new(4, MemoryDisk::new());
///
/// // Allocate a page; it comes back pinned.
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xAB;
/// let pid = bpm.allocate_pages(&mut page, 1).unwrap();
/// bpm.unpin_page(pid, true).unwrap();
///
/// // Pin it again and copy its content out.
/// let mut out = Page::new();
/// bpm.pin_page(pid, &mut out, PinMode::ReadFromDisk).unwrap();
/// assert_eq!(out.as_slice()[0], 0xAB);
/// bpm.unpin_page(pid, false).unwrap();
/// ```
pub struct BufferPoolManager<D: DiskIo> {
    /// Fixed table of frame descriptors, one per slot.
    frames: Vec<FrameDescriptor>,

    /// Page bytes, indexed like `frames`.
    pages: Vec<Page>,

    /// Maps resident page IDs to frame IDs.
    page_table: HashMap<PageId, FrameId>,

    /// Victim selection policy.
    policy: Box<dyn ReplacementPolicy>,

    /// Handles all disk I/O.
    disk: D,

    /// Staging buffer for disk reads on a miss.
    scratch: Box<Page>,

    stats: BufferPoolStats,
}

impl<D: DiskIo> BufferPoolManager<D> {
    /// Create a buffer pool using the clock policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, disk: D) -> Self {
        Self::with_policy(pool_size, disk, PolicyKind::Clock)
    }

    /// Create a buffer pool using the given policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn with_policy(pool_size: usize, disk: D, policy: PolicyKind) -> Self {
        Self::with_config(BufferPoolConfig::new(pool_size).with_policy(policy), disk)
    }

    /// Create a buffer pool from a [`BufferPoolConfig`].
    ///
    /// # Panics
    /// Panics if `config.pool_size` is 0.
    pub fn with_config(config: BufferPoolConfig, disk: D) -> Self {
        let policy = config.policy.build(config.pool_size, config.random_seed);
        Self::with_replacement_policy(config.pool_size, disk, policy)
    }

    /// Create a buffer pool with a caller-supplied policy.
    ///
    /// `policy` must have been built for `pool_size` frames.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn with_replacement_policy(
        pool_size: usize,
        disk: D,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        debug!(
            "creating buffer pool with {} frames, {} policy",
            pool_size,
            policy.name()
        );

        Self {
            frames: (0..pool_size).map(FrameDescriptor::new).collect(),
            pages: (0..pool_size).map(|_| Page::new()).collect(),
            page_table: HashMap::with_capacity(pool_size),
            policy,
            disk,
            scratch: Box::default(),
            stats: BufferPoolStats::new(),
        }
    }

    // ========================================================================
    // Public API: Allocate and free pages
    // ========================================================================

    /// Allocate a run of `run_length` pages on disk and pin the first one.
    ///
    /// The first page adopts `first_page` as its content (no disk read), and
    /// the frame's content is copied back into `first_page`. The page stays
    /// pinned; the caller unpins it when done.
    ///
    /// # Errors
    /// - `Error::InvalidRunLength` if `run_length` is 0
    /// - `Error::AllocationFailure` if the disk cannot reserve the run, or the
    ///   first page cannot be pinned. In the second case every page of the run
    ///   has been deallocated before returning.
    pub fn allocate_pages(&mut self, first_page: &mut Page, run_length: u32) -> Result<PageId> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength(run_length));
        }

        let first = self
            .disk
            .allocate_run(run_length)
            .map_err(|source| Error::AllocationFailure {
                run_length,
                source: Box::new(source),
            })?;

        match self.pin_frame(first, Load::Adopt(&*first_page)) {
            Ok(frame_id) => {
                first_page.copy_from(&self.pages[frame_id.0]);
                self.policy.on_new_page(&mut self.frames[frame_id.0]);
                Ok(first)
            }
            Err(err) => {
                warn!(
                    "pinning new {} failed ({}), releasing run of {} pages",
                    first, err, run_length
                );
                self.release_run(first, run_length);
                Err(Error::AllocationFailure {
                    run_length,
                    source: Box::new(err),
                })
            }
        }
    }

    /// Release a page on disk, dropping it from the pool if resident.
    ///
    /// The dirty content of a resident page is discarded, not written.
    ///
    /// # Errors
    /// - `Error::PagePinned` if the page is resident and pinned; nothing
    ///   changes in that case
    /// - Errors from disk deallocation
    pub fn free_page(&mut self, page_id: PageId) -> Result<()> {
        if let Some(&frame_id) = self.page_table.get(&page_id) {
            let frame = &mut self.frames[frame_id.0];
            if frame.is_pinned() {
                return Err(Error::PagePinned(page_id));
            }

            self.page_table.remove(&page_id);
            frame.reset();
            self.policy.on_free_page(frame);
            trace!("freed {} from {}", page_id, frame_id);
        }

        self.disk.deallocate(page_id)
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a page into the pool and copy its content into `page`.
    ///
    /// If the page is resident its pin count is incremented. Otherwise the
    /// policy picks a victim frame, which is written back first when dirty,
    /// and the frame is filled according to `mode`.
    ///
    /// # Errors
    /// - `Error::DoubleAdopt` for `PinMode::AdoptSupplied` on a resident page
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - Disk errors from reading the page or writing back the victim. The
    ///   victim frame and page table are unchanged in that case.
    pub fn pin_page(&mut self, page_id: PageId, page: &mut Page, mode: PinMode) -> Result<()> {
        let load = match mode {
            PinMode::ReadFromDisk => Load::Disk,
            PinMode::AdoptSupplied => Load::Adopt(&*page),
        };
        let frame_id = self.pin_frame(page_id, load)?;

        page.copy_from(&self.pages[frame_id.0]);
        Ok(())
    }

    /// Pin a page and return a guard that unpins it on drop.
    ///
    /// Modifying the page through the guard marks it dirty. The guard never
    /// clears a dirty flag that was already set.
    ///
    /// # Example
    /// ```
    /// use bufmgr::buffer::BufferPoolManager;
    /// use bufmgr::storage::MemoryDisk;
    /// use bufmgr::Page;
    ///
    /// let mut bpm = BufferPoolManager::new(2, MemoryDisk::new());
    /// let pid = bpm.allocate_pages(&mut Page::new(), 1).unwrap();
    /// bpm.unpin_page(pid, false).unwrap();
    ///
    /// {
    ///     let mut guard = bpm.fetch_page(pid).unwrap();
    ///     guard.as_mut_slice()[0] = 7;
    /// }
    /// assert_eq!(bpm.is_dirty(pid), Some(true));
    /// assert_eq!(bpm.pin_count(pid), Some(0));
    /// ```
    ///
    /// # Errors
    /// Same as [`pin_page`](Self::pin_page) with `PinMode::ReadFromDisk`.
    pub fn fetch_page(&mut self, page_id: PageId) -> Result<PinnedPage<'_, D>> {
        let frame_id = self.pin_frame(page_id, Load::Disk)?;
        Ok(PinnedPage::new(self, frame_id, page_id))
    }

    /// Unpin a page and set its dirty flag to `dirty`.
    ///
    /// The flag is overwritten, not accumulated: unpinning with `false`
    /// clears an earlier `true`.
    ///
    /// # Errors
    /// - `Error::NotResident` if the page is not in the pool
    /// - `Error::NotPinned` if its pin count is already 0
    pub fn unpin_page(&mut self, page_id: PageId, dirty: bool) -> Result<()> {
        let frame_id = self.pinned_frame(page_id)?;
        let frame = &mut self.frames[frame_id.0];

        frame.unpin();
        frame.set_dirty(dirty);
        self.policy.on_unpin_page(frame);
        Ok(())
    }

    // ========================================================================
    // Public API: Page access
    // ========================================================================

    /// Borrow the content of a pinned page.
    ///
    /// # Errors
    /// - `Error::NotResident` / `Error::NotPinned`
    pub fn page(&self, page_id: PageId) -> Result<&Page> {
        let frame_id = self.pinned_frame(page_id)?;
        Ok(&self.pages[frame_id.0])
    }

    /// Mutably borrow the content of a pinned page.
    ///
    /// This does not mark the page dirty; pass `dirty = true` to
    /// [`unpin_page`](Self::unpin_page).
    ///
    /// # Errors
    /// - `Error::NotResident` / `Error::NotPinned`
    pub fn page_mut(&mut self, page_id: PageId) -> Result<&mut Page> {
        let frame_id = self.pinned_frame(page_id)?;
        Ok(&mut self.pages[frame_id.0])
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write a resident page to disk if it is dirty, and mark it clean.
    ///
    /// # Errors
    /// - I/O errors from disk write
    pub fn flush_page(&mut self, page_id: PageId) -> Result<()> {
        self.flush_frames(Some(page_id))
    }

    /// Write every dirty resident page to disk, and mark them clean.
    ///
    /// # Errors
    /// - I/O errors from disk writes; pages flushed before the failure stay
    ///   clean
    pub fn flush_all_pages(&mut self) -> Result<()> {
        self.flush_frames(None)
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Get the number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.frames.len()
    }

    /// Get the number of frames with a pin count of 0, empty ones included.
    pub fn unpinned_count(&self) -> usize {
        self.frames.iter().filter(|f| !f.is_pinned()).count()
    }

    /// Get the number of pages in the buffer pool.
    pub fn page_count(&self) -> usize {
        self.page_table.len()
    }

    /// Pin count of a resident page, `None` if not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        self.frame_of(page_id).map(|fid| self.frames[fid.0].pin_count())
    }

    /// Dirty flag of a resident page, `None` if not resident.
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        self.frame_of(page_id).map(|fid| self.frames[fid.0].is_dirty())
    }

    /// Frame holding `page_id`, if resident.
    pub fn frame_of(&self, page_id: PageId) -> Option<FrameId> {
        self.page_table.get(&page_id).copied()
    }

    /// The frame descriptor table.
    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    /// Name of the active replacement policy.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// The underlying disk.
    pub fn disk(&self) -> &D {
        &self.disk
    }

    /// Get a snapshot of the statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// The buffer hit ratio report for the current counters.
    pub fn hit_ratio_report(&self) -> HitRatioReport {
        self.stats.snapshot().hit_ratio_report()
    }

    /// Print the buffer hit ratio report to stdout.
    pub fn report_hit_ratios(&self) {
        print!("{}", self.hit_ratio_report());
    }

    // ========================================================================
    // Internal: Core pin logic
    // ========================================================================

    /// Pin `page_id`, loading it on a miss. Returns its frame.
    fn pin_frame(&mut self, page_id: PageId, load: Load<'_>) -> Result<FrameId> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        self.stats.record_request(page_id);

        if let Some(&frame_id) = self.page_table.get(&page_id) {
            if let Load::Adopt(_) = load {
                return Err(Error::DoubleAdopt(page_id));
            }

            // Cache hit
            let frame = &mut self.frames[frame_id.0];
            frame.pin();
            self.stats.record_hit(page_id);
            self.policy.on_pin_page(frame);
            return Ok(frame_id);
        }

        let frame_id = self
            .policy
            .pick_victim(&mut self.frames)
            .ok_or(Error::PoolExhausted)?;

        if let Err(err) = self.replace_frame(frame_id, page_id, load) {
            self.policy.restore_victim(&self.frames[frame_id.0]);
            return Err(err);
        }
        Ok(frame_id)
    }

    /// Load `page_id` into the victim frame `frame_id`.
    ///
    /// Every fallible step happens before the descriptor or page table is
    /// touched.
    fn replace_frame(&mut self, frame_id: FrameId, page_id: PageId, load: Load<'_>) -> Result<()> {
        debug_assert!(!self.frames[frame_id.0].is_pinned());

        if let Load::Disk = load {
            self.disk.read(page_id, &mut self.scratch)?;
            self.stats.record_read();
        }

        let victim = &self.frames[frame_id.0];
        let old_page_id = victim.page_id();
        if old_page_id.is_valid() {
            if victim.is_dirty() {
                debug!("writing back dirty {} from {}", old_page_id, frame_id);
                self.disk.write(old_page_id, &self.pages[frame_id.0])?;
                self.stats.record_write();
            }
            self.page_table.remove(&old_page_id);
            self.stats.record_eviction();
            debug!("evicted {} from {} for {}", old_page_id, frame_id, page_id);
        }

        let page = &mut self.pages[frame_id.0];
        match load {
            Load::Disk => page.copy_from(&self.scratch),
            Load::Adopt(content) => page.copy_from(content),
        }

        let frame = &mut self.frames[frame_id.0];
        frame.load(page_id);
        self.page_table.insert(page_id, frame_id);
        self.policy.on_pin_page(frame);
        self.stats.record_load(page_id);
        Ok(())
    }

    /// Content of a frame. The guard holds the pin, so no check is needed.
    pub(crate) fn frame_page(&self, frame_id: FrameId) -> &Page {
        &self.pages[frame_id.0]
    }

    pub(crate) fn frame_page_mut(&mut self, frame_id: FrameId) -> &mut Page {
        &mut self.pages[frame_id.0]
    }

    /// Frame of a resident, pinned page.
    fn pinned_frame(&self, page_id: PageId) -> Result<FrameId> {
        let frame_id = self.frame_of(page_id).ok_or(Error::NotResident(page_id))?;
        if !self.frames[frame_id.0].is_pinned() {
            return Err(Error::NotPinned(page_id));
        }
        Ok(frame_id)
    }

    /// Deallocate every page of a run, continuing past failures.
    fn release_run(&mut self, first: PageId, run_length: u32) {
        for offset in 0..run_length {
            let page_id = first.offset(offset);
            if let Err(err) = self.disk.deallocate(page_id) {
                warn!("failed to release {}: {}", page_id, err);
            }
        }
    }

    /// Write back dirty frames holding `target`, or all dirty frames.
    fn flush_frames(&mut self, target: Option<PageId>) -> Result<()> {
        for (i, frame) in self.frames.iter_mut().enumerate() {
            let selected = target.map_or(true, |pid| frame.page_id() == pid);
            if selected && frame.is_dirty() {
                trace!("flushing {} from {}", frame.page_id(), frame.index());
                self.disk.write(frame.page_id(), &self.pages[i])?;
                frame.set_dirty(false);
                self.stats.record_write();
            }
        }
        Ok(())
    }
}
