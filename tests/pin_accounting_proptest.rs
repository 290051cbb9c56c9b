//! Property tests for pin accounting under random pin/unpin/flush traffic.

use std::collections::HashSet;

use bufmgr::buffer::{BufferPoolManager, FrameState, PinMode, PolicyKind};
use bufmgr::storage::MemoryDisk;
use bufmgr::{Error, Page, PageId, WARMUP_PAGE_THRESHOLD};
use proptest::prelude::*;

const POOL_SIZE: usize = 3;
const PAGES: u32 = 8;

#[derive(Debug, Clone)]
enum Op {
    Pin(u32),
    Unpin(u32, bool),
    Flush,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..PAGES).prop_map(Op::Pin),
        4 => (0..PAGES, any::<bool>()).prop_map(|(p, d)| Op::Unpin(p, d)),
        1 => Just(Op::Flush),
    ]
}

fn policy_strategy() -> impl Strategy<Value = PolicyKind> {
    prop_oneof![
        Just(PolicyKind::Clock),
        Just(PolicyKind::Lru),
        Just(PolicyKind::Random),
    ]
}

fn check_frames(bpm: &BufferPoolManager<MemoryDisk>) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for frame in bpm.frames() {
        prop_assert_eq!(frame.state() == FrameState::Pinned, frame.pin_count() > 0);
        if frame.page_id().is_valid() {
            prop_assert!(seen.insert(frame.page_id()), "page mapped twice");
            prop_assert_eq!(bpm.frame_of(frame.page_id()), Some(frame.index()));
        } else {
            prop_assert_eq!(frame.pin_count(), 0);
        }
    }
    prop_assert_eq!(seen.len(), bpm.page_count());
    Ok(())
}

proptest! {
    #[test]
    fn pins_balance_under_any_policy(
        policy in policy_strategy(),
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let mut bpm = BufferPoolManager::with_policy(POOL_SIZE, MemoryDisk::new(), policy);
        let first = bpm.allocate_pages(&mut Page::new(), PAGES).unwrap();
        bpm.unpin_page(first, false).unwrap();

        let mut pins = [0u32; PAGES as usize];
        let mut out = Page::new();

        for op in ops {
            match op {
                Op::Pin(i) => {
                    let pid = first.offset(i);
                    let was_resident = bpm.frame_of(pid).is_some();
                    let had_room = bpm.unpinned_count() > 0;
                    match bpm.pin_page(pid, &mut out, PinMode::ReadFromDisk) {
                        Ok(()) => pins[i as usize] += 1,
                        Err(err) => {
                            prop_assert!(matches!(err, Error::PoolExhausted));
                            prop_assert!(!was_resident && !had_room);
                        }
                    }
                }
                Op::Unpin(i, dirty) => {
                    let pid = first.offset(i);
                    let result = bpm.unpin_page(pid, dirty);
                    if pins[i as usize] > 0 {
                        prop_assert!(result.is_ok());
                        pins[i as usize] -= 1;
                        prop_assert_eq!(bpm.is_dirty(pid), Some(dirty));
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::Flush => {
                    bpm.flush_all_pages().unwrap();
                    prop_assert!(bpm.frames().iter().all(|f| !f.is_dirty()));
                }
            }

            for (i, &count) in pins.iter().enumerate() {
                let pid = first.offset(i as u32);
                if count > 0 {
                    prop_assert_eq!(bpm.pin_count(pid), Some(count));
                } else {
                    prop_assert!(matches!(bpm.pin_count(pid), None | Some(0)));
                }
            }
            check_frames(&bpm)?;
        }
    }

    #[test]
    fn stats_never_count_more_hits_than_requests(
        policy in policy_strategy(),
        accesses in prop::collection::vec(0..PAGES, 1..200),
    ) {
        let mut bpm = BufferPoolManager::with_policy(POOL_SIZE, MemoryDisk::new(), policy);
        // Skip the untracked warm-up ids.
        let warmup = bpm.allocate_pages(&mut Page::new(), WARMUP_PAGE_THRESHOLD + 1).unwrap();
        bpm.unpin_page(warmup, false).unwrap();
        let first = bpm.allocate_pages(&mut Page::new(), PAGES).unwrap();
        bpm.unpin_page(first, false).unwrap();
        prop_assert!(first.0 > WARMUP_PAGE_THRESHOLD);

        for i in accesses {
            let pid: PageId = first.offset(i);
            bpm.pin_page(pid, &mut Page::new(), PinMode::ReadFromDisk).unwrap();
            bpm.unpin_page(pid, false).unwrap();
        }

        let stats = bpm.stats();
        prop_assert!(stats.aggregate_hits <= stats.aggregate_requests);
        prop_assert_eq!(stats.load_hits, stats.aggregate_hits);
        prop_assert_eq!(stats.load_requests, stats.aggregate_requests - stats.aggregate_hits);
        prop_assert_eq!(stats.pages_read, stats.aggregate_requests - stats.aggregate_hits - 1);
        prop_assert!(bpm.page_count() <= POOL_SIZE);
    }
}
