//! bufmgr - a buffer pool manager with pluggable page replacement.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            Access methods / operators (callers)                 │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Buffer Pool (buffer/)                           │
//! │   BufferPoolManager + FrameDescriptor + Statistics              │
//! │   ┌─────────────────────────────────────────────────────────┐   │
//! │   │   Replacement Policies: CLOCK | LRU | Random            │   │
//! │   │        (chosen when the pool is built)                  │   │
//! │   └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Storage Layer (storage/)                       │
//! │         DiskIo: DiskManager (file) | MemoryDisk + Page          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Buffer pool management and replacement policies
//! - [`storage`] - Disk I/O and the page buffer
//!
//! # Quick Start
//! ```no_run
//! use bufmgr::buffer::{BufferPoolManager, PolicyKind};
//! use bufmgr::storage::DiskManager;
//! use bufmgr::Page;
//!
//! let dm = DiskManager::create("my_database.db").unwrap();
//! let mut bpm = BufferPoolManager::with_policy(64, dm, PolicyKind::Lru);
//!
//! let mut page = Page::new();
//! let page_id = bpm.allocate_pages(&mut page, 1).unwrap();
//! bpm.page_mut(page_id).unwrap().as_mut_slice()[0] = 1;
//! bpm.unpin_page(page_id, true).unwrap();
//! bpm.flush_all_pages().unwrap();
//! bpm.report_hit_ratios();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PAGE_SIZE, WARMUP_PAGE_THRESHOLD};
pub use common::{BufferPoolConfig, Error, FrameId, PageId, Result};

pub use buffer::{
    BufferPoolManager, FrameDescriptor, FrameState, HitRatioReport, PinMode, PolicyKind,
    ReplacementPolicy, StatsSnapshot,
};
pub use storage::{DiskIo, DiskManager, MemoryDisk, Page};
