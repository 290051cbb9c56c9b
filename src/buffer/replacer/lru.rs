//! LRU (least recently used) replacement policy.

use std::collections::VecDeque;

use super::{mark_pinned, ReplacementPolicy};
use crate::buffer::frame::{FrameDescriptor, FrameState};
use crate::common::FrameId;

/// Evicts the unpinned frame that was pinned least recently.
///
/// Two queues are kept:
/// - `available`: frames never used or just freed, handed out FIFO
/// - `recency`: resident frames ordered by their last pin (front = oldest)
///
/// Only pin events reorder `recency`; unpinning or reading a page does not.
/// There is no second-chance state.
pub struct LruPolicy {
    available: VecDeque<FrameId>,
    recency: VecDeque<FrameId>,
}

impl LruPolicy {
    pub fn new(capacity: usize) -> Self {
        Self {
            available: (0..capacity).map(FrameId::new).collect(),
            recency: VecDeque::with_capacity(capacity),
        }
    }

    /// Move `frame_id` to the most recent end, inserting it if absent.
    fn touch(&mut self, frame_id: FrameId) {
        if let Some(pos) = self.recency.iter().position(|&f| f == frame_id) {
            self.recency.remove(pos);
        }
        self.recency.push_back(frame_id);
    }
}

impl ReplacementPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn on_new_page(&mut self, _frame: &mut FrameDescriptor) {}

    fn on_free_page(&mut self, frame: &mut FrameDescriptor) {
        frame.set_state(FrameState::Available);
        let frame_id = frame.index();
        self.recency.retain(|&f| f != frame_id);
        self.available.push_back(frame_id);
    }

    fn on_pin_page(&mut self, frame: &mut FrameDescriptor) {
        mark_pinned(frame);
        self.touch(frame.index());
    }

    fn on_unpin_page(&mut self, frame: &mut FrameDescriptor) {
        if frame.pin_count() == 0 {
            frame.set_state(FrameState::Available);
        }
    }

    fn pick_victim(&mut self, frames: &mut [FrameDescriptor]) -> Option<FrameId> {
        if let Some(frame_id) = self.available.pop_front() {
            return Some(frame_id);
        }

        let pos = self
            .recency
            .iter()
            .position(|f| frames[f.0].state() == FrameState::Available)?;
        self.recency.remove(pos)
    }

    fn restore_victim(&mut self, frame: &FrameDescriptor) {
        if frame.is_empty() {
            self.available.push_front(frame.index());
        } else {
            self.recency.push_front(frame.index());
        }
    }
}
