//! Disk Manager - file-backed page storage.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating and releasing page runs
//! - Managing the database file

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::trace;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::{DiskIo, Page};

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// The database is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// # Free Pages
/// Deallocated ids are tracked in memory only. A later run allocation reuses
/// the lowest contiguous stretch of freed ids that is long enough, otherwise
/// the file is extended. Reopening a file forgets the freed ids.
///
/// # Durability
/// All writes are followed by `fsync()`.
pub struct DiskManager {
    file: File,
    /// Number of pages in the file.
    page_count: u32,
    /// Deallocated page ids available for reuse.
    free_pages: BTreeSet<u32>,
}

impl DiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            free_pages: BTreeSet::new(),
        })
    }

    /// Open an existing database file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            page_count,
            free_pages: BTreeSet::new(),
        })
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Get the number of pages in the database file, freed ones included.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Get the number of deallocated pages awaiting reuse.
    #[inline]
    pub fn free_page_count(&self) -> usize {
        self.free_pages.len()
    }

    /// Check whether `page_id` is currently allocated.
    pub fn is_allocated(&self, page_id: PageId) -> bool {
        page_id.0 < self.page_count && !self.free_pages.contains(&page_id.0)
    }

    fn check_allocated(&self, page_id: PageId) -> Result<()> {
        if self.is_allocated(page_id) {
            Ok(())
        } else {
            Err(Error::PageNotFound(page_id.0))
        }
    }

    fn seek_to(&mut self, page_id: PageId) -> Result<()> {
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Find the lowest run of `run_length` consecutive freed ids.
    fn find_free_run(&self, run_length: u32) -> Option<u32> {
        let mut start = None;
        let mut len = 0;
        let mut prev = None;

        for &id in &self.free_pages {
            if prev.map(|p: u32| p + 1) == Some(id) {
                len += 1;
            } else {
                start = Some(id);
                len = 1;
            }
            if len == run_length {
                return start;
            }
            prev = Some(id);
        }

        None
    }

    /// Reuse a freed run, zeroing its pages.
    fn reuse_run(&mut self, first: u32, run_length: u32) -> Result<PageId> {
        let zeros = Page::new();
        for id in first..first + run_length {
            self.seek_to(PageId::new(id))?;
            self.file.write_all(zeros.as_slice())?;
        }
        self.file.sync_all()?;

        for id in first..first + run_length {
            self.free_pages.remove(&id);
        }
        Ok(PageId::new(first))
    }

    /// Extend the file with `run_length` zeroed pages.
    fn extend_run(&mut self, run_length: u32) -> Result<PageId> {
        let first = self.page_count;
        let end = first
            .checked_add(run_length)
            .filter(|&end| end <= PageId::INVALID.0)
            .ok_or(Error::InvalidPageId(first))?;

        self.file.set_len(end as u64 * PAGE_SIZE as u64)?;
        self.file.sync_all()?;

        self.page_count = end;
        Ok(PageId::new(first))
    }
}

impl DiskIo for DiskManager {
    /// Allocate `run_length` contiguous zeroed pages.
    ///
    /// # Errors
    /// - `Error::InvalidRunLength` if `run_length` is 0
    /// - `Error::InvalidPageId` if the id space is exhausted
    fn allocate_run(&mut self, run_length: u32) -> Result<PageId> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength(run_length));
        }

        let first = match self.find_free_run(run_length) {
            Some(first) => self.reuse_run(first, run_length)?,
            None => self.extend_run(run_length)?,
        };
        trace!("allocated run of {} pages at {}", run_length, first);
        Ok(first)
    }

    /// # Errors
    /// Returns `Error::InvalidPageId` if the page is not currently allocated.
    fn deallocate(&mut self, page_id: PageId) -> Result<()> {
        if !self.is_allocated(page_id) {
            return Err(Error::InvalidPageId(page_id.0));
        }
        self.free_pages.insert(page_id.0);
        Ok(())
    }

    /// # Errors
    /// Returns `Error::PageNotFound` if the page isn't allocated.
    fn read(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        self.check_allocated(page_id)?;
        self.seek_to(page_id)?;
        self.file.read_exact(page.as_mut_slice())?;
        Ok(())
    }

    /// # Errors
    /// Returns `Error::PageNotFound` if the page isn't allocated.
    fn write(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_allocated(page_id)?;
        self.seek_to(page_id)?;
        self.file.write_all(page.as_slice())?;
        self.file.sync_all()?; // fsync for durability
        Ok(())
    }
}
