//! The disk interface consumed by the buffer pool.

use crate::common::{PageId, Result};
use crate::storage::Page;

/// Page-granular disk operations.
///
/// The buffer pool is the only caller. It never retains the `Page` passed to
/// [`DiskIo::write`] or [`DiskIo::read`] beyond the call.
pub trait DiskIo {
    /// Reserve `run_length` contiguous pages and return the first id.
    fn allocate_run(&mut self, run_length: u32) -> Result<PageId>;

    /// Release a single page.
    fn deallocate(&mut self, page_id: PageId) -> Result<()>;

    /// Fill `page` with the persisted bytes of `page_id`.
    fn read(&mut self, page_id: PageId, page: &mut Page) -> Result<()>;

    /// Persist the bytes of `page` as `page_id`.
    fn write(&mut self, page_id: PageId, page: &Page) -> Result<()>;
}
