//! Shared helpers for the integration tests.

#![allow(dead_code)]

use bufmgr::buffer::{BufferPoolManager, PolicyKind};
use bufmgr::storage::{DiskManager, MemoryDisk};
use bufmgr::{Page, PageId};
use tempfile::tempdir;

/// Install a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn memory_bpm(pool_size: usize, policy: PolicyKind) -> BufferPoolManager<MemoryDisk> {
    init_logging();
    BufferPoolManager::with_policy(pool_size, MemoryDisk::new(), policy)
}

pub fn file_bpm(pool_size: usize) -> (BufferPoolManager<DiskManager>, tempfile::TempDir) {
    init_logging();
    let dir = tempdir().unwrap();
    let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
    (BufferPoolManager::new(pool_size, dm), dir)
}

/// Write a null-terminated string into page data.
pub fn copy_string(data: &mut [u8], s: &str) {
    let bytes = s.as_bytes();
    data[..bytes.len()].copy_from_slice(bytes);
    data[bytes.len()] = 0;
}

/// Read a null-terminated string from page data.
pub fn read_string(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).to_string()
}

/// Allocate `count` single pages, each left unpinned and clean.
pub fn allocate_unpinned<D: bufmgr::DiskIo>(
    bpm: &mut BufferPoolManager<D>,
    count: usize,
) -> Vec<PageId> {
    (0..count)
        .map(|_| {
            let pid = bpm.allocate_pages(&mut Page::new(), 1).unwrap();
            bpm.unpin_page(pid, false).unwrap();
            pid
        })
        .collect()
}
