//! Integration tests for the buffer pool manager.
//!
//! These tests verify cross-component behavior that unit tests don't cover.

mod common;

use std::thread;

use bufmgr::buffer::{BufferPoolManager, PinMode, PolicyKind, SharedBufferPool};
use bufmgr::storage::{DiskManager, MemoryDisk};
use bufmgr::{BufferPoolConfig, Error, Page, PageId};
use common::{file_bpm, init_logging, memory_bpm};
use tempfile::tempdir;

/// Test data persistence across multiple eviction cycles.
#[test]
fn test_data_persistence_across_evictions() {
    for policy in [PolicyKind::Clock, PolicyKind::Lru, PolicyKind::Random] {
        let mut bpm = memory_bpm(2, policy);

        let mut page_ids = vec![];
        for i in 0u8..5 {
            let mut page = Page::new();
            page.as_mut_slice()[0] = i;
            page.as_mut_slice()[1] = i.wrapping_mul(3);
            let pid = bpm.allocate_pages(&mut page, 1).unwrap();
            bpm.unpin_page(pid, true).unwrap();
            page_ids.push(pid);
        }

        for (i, &pid) in page_ids.iter().enumerate() {
            let guard = bpm.fetch_page(pid).unwrap();
            assert_eq!(guard.as_slice()[0], i as u8);
            assert_eq!(guard.as_slice()[1], (i as u8).wrapping_mul(3));
        }
    }
}

/// Test flush and reload across BPM instances.
#[test]
fn test_flush_and_reload() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let data = b"persistent!";

    let pid;

    {
        let dm = DiskManager::create(&path).unwrap();
        let mut bpm = BufferPoolManager::new(10, dm);

        let mut page = Page::new();
        page.as_mut_slice()[..data.len()].copy_from_slice(data);
        pid = bpm.allocate_pages(&mut page, 1).unwrap();
        bpm.unpin_page(pid, true).unwrap();

        bpm.flush_all_pages().unwrap();
    }

    {
        let dm = DiskManager::open(&path).unwrap();
        let mut bpm = BufferPoolManager::new(10, dm);

        let guard = bpm.fetch_page(pid).unwrap();
        assert_eq!(&guard.as_slice()[..data.len()], data);
    }
}

/// Unflushed, never-evicted changes are not persisted.
#[test]
fn test_unflushed_page_is_lost() {
    init_logging();
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");

    let pid = {
        let mut bpm = BufferPoolManager::new(4, DiskManager::create(&path).unwrap());
        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xEE;
        let pid = bpm.allocate_pages(&mut page, 1).unwrap();
        bpm.unpin_page(pid, true).unwrap();
        pid
    };

    let mut bpm = BufferPoolManager::new(4, DiskManager::open(&path).unwrap());
    let guard = bpm.fetch_page(pid).unwrap();
    assert_eq!(guard.as_slice()[0], 0);
}

/// A failed run allocation leaves the disk exactly as before.
#[test]
fn test_failed_allocation_releases_whole_run() {
    let mut bpm = memory_bpm(2, PolicyKind::Clock);
    let a = bpm.allocate_pages(&mut Page::new(), 1).unwrap();
    let b = bpm.allocate_pages(&mut Page::new(), 1).unwrap();
    let allocated_before = bpm.disk().page_count();

    let err = bpm.allocate_pages(&mut Page::new(), 5).unwrap_err();
    assert!(matches!(err, Error::AllocationFailure { run_length: 5, .. }));

    let disk = bpm.disk();
    assert_eq!(disk.counters().deallocations, 5);
    let expected: Vec<PageId> = (0..5).map(|i| PageId::new(2).offset(i)).collect();
    assert_eq!(disk.deallocated(), expected.as_slice());
    assert_eq!(disk.page_count(), allocated_before);
    for pid in &expected {
        assert_eq!(bpm.frame_of(*pid), None);
    }
    assert_eq!(bpm.page_count(), 2);
    assert_eq!(bpm.pin_count(a), Some(1));
    assert_eq!(bpm.pin_count(b), Some(1));
}

/// With a file disk the released run is handed out again.
#[test]
fn test_released_run_is_reused_on_file_disk() {
    let (mut bpm, _dir) = file_bpm(1);
    let held = bpm.allocate_pages(&mut Page::new(), 1).unwrap();

    assert!(bpm.allocate_pages(&mut Page::new(), 3).is_err());
    assert_eq!(bpm.disk().free_page_count(), 3);

    bpm.unpin_page(held, false).unwrap();
    let reused = bpm.allocate_pages(&mut Page::new(), 3).unwrap();
    assert_eq!(reused, PageId::new(1));
    assert_eq!(bpm.disk().free_page_count(), 0);
}

/// flush_all_pages writes each dirty frame exactly once.
#[test]
fn test_flush_all_writes_each_dirty_frame_once() {
    let mut bpm = memory_bpm(6, PolicyKind::Lru);
    let mut dirty = vec![];
    for i in 0..6u32 {
        let pid = bpm.allocate_pages(&mut Page::new(), 1).unwrap();
        bpm.unpin_page(pid, i % 2 == 0).unwrap();
        if i % 2 == 0 {
            dirty.push(pid);
        }
    }
    let writes_before = bpm.disk().counters().writes;

    bpm.flush_all_pages().unwrap();

    assert_eq!(bpm.disk().counters().writes - writes_before, dirty.len() as u64);
    assert!(bpm.frames().iter().all(|f| !f.is_dirty()));

    // Nothing left to write.
    bpm.flush_all_pages().unwrap();
    assert_eq!(bpm.disk().counters().writes - writes_before, dirty.len() as u64);
}

/// Dirty flag overwrite: a later clean unpin drops the pending write.
#[test]
fn test_clean_unpin_drops_pending_write() {
    let mut bpm = memory_bpm(1, PolicyKind::Clock);
    let mut page = Page::new();
    page.as_mut_slice()[0] = 0x10;
    let pid = bpm.allocate_pages(&mut page, 1).unwrap();
    bpm.unpin_page(pid, true).unwrap();

    bpm.pin_page(pid, &mut page, PinMode::ReadFromDisk).unwrap();
    bpm.unpin_page(pid, false).unwrap();

    // Evict it: no write-back happens.
    let other = bpm.allocate_pages(&mut Page::new(), 1).unwrap();
    bpm.unpin_page(other, false).unwrap();
    assert_eq!(bpm.disk().counters().writes, 0);

    bpm.pin_page(pid, &mut page, PinMode::ReadFromDisk).unwrap();
    assert_eq!(page.as_slice()[0], 0);
}

/// Seeded random pools make identical eviction decisions.
#[test]
fn test_seeded_random_pool_is_reproducible() {
    let run = || {
        let config = BufferPoolConfig::new(4)
            .with_policy(PolicyKind::Random)
            .with_seed(1234);
        let mut bpm = BufferPoolManager::with_config(config, MemoryDisk::new());
        let first = bpm.allocate_pages(&mut Page::new(), 32).unwrap();
        bpm.unpin_page(first, false).unwrap();

        let mut out = Page::new();
        for i in 0..32 {
            let pid = first.offset((i * 7) % 32);
            bpm.pin_page(pid, &mut out, PinMode::ReadFromDisk).unwrap();
            bpm.unpin_page(pid, false).unwrap();
        }
        bpm.frames().iter().map(|f| f.page_id()).collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

/// Concurrent writers to different pages through the shared wrapper.
#[test]
fn test_concurrent_writers() {
    init_logging();
    let shared = SharedBufferPool::new(BufferPoolManager::new(10, MemoryDisk::new()));

    let page_ids: Vec<PageId> = (0..5)
        .map(|_| {
            shared.with(|bpm| {
                let pid = bpm.allocate_pages(&mut Page::new(), 1).unwrap();
                bpm.unpin_page(pid, false).unwrap();
                pid
            })
        })
        .collect();

    let mut handles = vec![];
    for (i, &pid) in page_ids.iter().enumerate() {
        let shared = shared.clone();
        handles.push(thread::spawn(move || {
            for j in 0..50 {
                let mut bpm = shared.lock();
                let mut guard = bpm.fetch_page(pid).unwrap();
                guard.as_mut_slice()[0] = ((i * 50 + j) % 256) as u8;
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    let mut bpm = shared.lock();
    for (i, &pid) in page_ids.iter().enumerate() {
        let guard = bpm.fetch_page(pid).unwrap();
        assert_eq!(guard.as_slice()[0], ((i * 50 + 49) % 256) as u8);
    }
}

/// Operational stats line up with what the disk saw.
#[test]
fn test_stats_match_disk_counters() {
    let mut bpm = memory_bpm(2, PolicyKind::Lru);
    let first = bpm.allocate_pages(&mut Page::new(), 6).unwrap();
    bpm.unpin_page(first, true).unwrap();

    let mut out = Page::new();
    for i in 1..6 {
        let pid = first.offset(i);
        bpm.pin_page(pid, &mut out, PinMode::ReadFromDisk).unwrap();
        bpm.unpin_page(pid, true).unwrap();
    }

    let stats = bpm.stats();
    let disk = bpm.disk().counters();
    assert_eq!(stats.pages_read, disk.reads);
    assert_eq!(stats.pages_written, disk.writes);
    assert_eq!(stats.evictions, 4);
    assert_eq!(disk.writes, 4);
}
