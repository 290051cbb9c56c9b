//! Storage layer - disk I/O and the page byte buffer.
//!
//! This module handles persistent storage:
//! - [`DiskIo`] - The narrow interface the buffer pool consumes
//! - [`DiskManager`] - Single-file implementation of [`DiskIo`]
//! - [`MemoryDisk`] - In-memory implementation with I/O accounting
//! - [`Page`] - The raw 4KB data container

mod disk_io;
mod disk_manager;
mod memory_disk;
mod page;

pub use disk_io::DiskIo;
pub use disk_manager::DiskManager;
pub use memory_disk::{DiskCounters, MemoryDisk};
pub use page::Page;
