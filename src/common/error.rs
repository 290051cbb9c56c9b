//! Error types for the buffer manager.

use thiserror::Error;

use crate::common::PageId;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in the buffer manager.
///
/// Every failure is reported synchronously to the immediate caller. Nothing in
/// the crate retries; a caller that hits [`Error::PoolExhausted`] is expected to
/// unpin pages and try again.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page is not allocated on disk.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// The page ID cannot be used for the requested disk operation.
    #[error("Invalid page ID: {0}")]
    InvalidPageId(u32),

    /// Free or eviction attempted on a page that is still pinned.
    #[error("{0} is currently pinned")]
    PagePinned(PageId),

    /// Adopt-mode pin on a page that is already resident.
    #[error("{0} is resident, adopting supplied content is not allowed")]
    DoubleAdopt(PageId),

    /// No victim frame is available: every frame is pinned.
    #[error("Buffer pool exceeded: all frames are pinned")]
    PoolExhausted,

    /// Unpin (or page access) on a page that is not in the pool.
    #[error("{0} is not resident in the buffer pool")]
    NotResident(PageId),

    /// Unpin (or page access) on a resident page whose pin count is zero.
    #[error("{0} is not pinned")]
    NotPinned(PageId),

    /// A page run could not be allocated, or its first page could not be
    /// pinned. Any pages reserved for the run have been released.
    #[error("Failed to allocate a run of {run_length} pages: {source}")]
    AllocationFailure {
        run_length: u32,
        #[source]
        source: Box<Error>,
    },

    /// A page run must contain at least one page.
    #[error("Invalid run length: {0}")]
    InvalidRunLength(u32),

    /// Unrecognized replacement policy name.
    #[error("Unknown replacement policy: {0}")]
    UnknownPolicy(String),
}
