//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between access methods
//! and disk. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The main page cache
//! - [`FrameDescriptor`] - Per-frame metadata (page id, pins, dirty, state)
//! - [`PinnedPage`] - RAII guard for page access
//! - [`BufferPoolStats`] - Hit ratio and I/O statistics
//! - [`replacer`] - Replacement policy implementations
//! - [`SharedBufferPool`] - Mutex wrapper for multi-threaded callers

mod buffer_pool_manager;
mod frame;
mod page_guard;
pub mod replacer;
mod shared;
mod stats;

pub use buffer_pool_manager::{BufferPoolManager, PinMode};
pub use frame::{FrameDescriptor, FrameState};
pub use page_guard::PinnedPage;
pub use replacer::{PolicyKind, ReplacementPolicy};
pub use shared::SharedBufferPool;
pub use stats::{BufferPoolStats, HitRatioReport, StatsSnapshot};
