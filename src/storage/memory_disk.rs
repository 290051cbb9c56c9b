//! In-memory disk with I/O accounting.

use std::collections::BTreeMap;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::{DiskIo, Page};

/// Counts of every call the buffer pool made into a [`MemoryDisk`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiskCounters {
    pub allocations: u64,
    pub deallocations: u64,
    pub reads: u64,
    pub writes: u64,
}

/// A [`DiskIo`] implementation that keeps pages on the heap.
///
/// Ids are handed out sequentially and never reused. Besides the counters,
/// every deallocated id is logged in call order, which makes rollback paths
/// observable.
///
/// # Example
/// ```
/// use bufmgr::storage::{DiskIo, MemoryDisk};
/// use bufmgr::Page;
///
/// let mut disk = MemoryDisk::new();
/// let first = disk.allocate_run(2).unwrap();
/// disk.write(first, &Page::new()).unwrap();
/// assert_eq!(disk.counters().writes, 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryDisk {
    pages: BTreeMap<u32, Box<[u8]>>,
    next_page: u32,
    counters: DiskCounters,
    deallocated: Vec<PageId>,
}

impl MemoryDisk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the call counters.
    pub fn counters(&self) -> DiskCounters {
        self.counters
    }

    /// Ids passed to `deallocate`, in call order.
    pub fn deallocated(&self) -> &[PageId] {
        &self.deallocated
    }

    pub fn is_allocated(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id.0)
    }

    /// Number of currently allocated pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Zero the counters and the deallocation log.
    pub fn reset_counters(&mut self) {
        self.counters = DiskCounters::default();
        self.deallocated.clear();
    }
}

impl DiskIo for MemoryDisk {
    fn allocate_run(&mut self, run_length: u32) -> Result<PageId> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength(run_length));
        }
        let first = self.next_page;
        let end = first
            .checked_add(run_length)
            .filter(|&end| end <= PageId::INVALID.0)
            .ok_or(Error::InvalidPageId(first))?;

        for id in first..end {
            self.pages.insert(id, vec![0u8; PAGE_SIZE].into_boxed_slice());
        }
        self.next_page = end;
        self.counters.allocations += 1;
        Ok(PageId::new(first))
    }

    fn deallocate(&mut self, page_id: PageId) -> Result<()> {
        self.counters.deallocations += 1;
        self.deallocated.push(page_id);
        self.pages
            .remove(&page_id.0)
            .map(|_| ())
            .ok_or(Error::InvalidPageId(page_id.0))
    }

    fn read(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        self.counters.reads += 1;
        let bytes = self
            .pages
            .get(&page_id.0)
            .ok_or(Error::PageNotFound(page_id.0))?;
        page.as_mut_slice().copy_from_slice(bytes);
        Ok(())
    }

    fn write(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.counters.writes += 1;
        let bytes = self
            .pages
            .get_mut(&page_id.0)
            .ok_or(Error::PageNotFound(page_id.0))?;
        bytes.copy_from_slice(page.as_slice());
        Ok(())
    }
}
