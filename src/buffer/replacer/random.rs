//! Random replacement policy.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{mark_pinned, ReplacementPolicy};
use crate::buffer::frame::{FrameDescriptor, FrameState};
use crate::common::FrameId;

/// Evicts a uniformly random available frame.
///
/// Never-used and freed frames are handed out first, in FIFO order. Once
/// those run out, frames are sampled from the whole table; a sampled frame
/// that is not `Available` is dropped from the candidate set, so the search
/// ends after at most `capacity` samples.
pub struct RandomPolicy {
    capacity: usize,
    available: VecDeque<FrameId>,
    rng: StdRng,
}

impl RandomPolicy {
    /// Random policy seeded from OS entropy.
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Random policy with a reproducible sample sequence.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: StdRng) -> Self {
        Self {
            capacity,
            available: (0..capacity).map(FrameId::new).collect(),
            rng,
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn on_new_page(&mut self, _frame: &mut FrameDescriptor) {}

    fn on_free_page(&mut self, frame: &mut FrameDescriptor) {
        frame.set_state(FrameState::Available);
        self.available.push_back(frame.index());
    }

    fn on_pin_page(&mut self, frame: &mut FrameDescriptor) {
        mark_pinned(frame);
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

        let mut candidates: Vec<FrameId> = (0..self.capacity).map(FrameId::new).collect();
        while !candidates.is_empty() {
            let pick = self.rng.gen_range(0..candidates.len());
            let frame_id = candidates[pick];
            if frames[frame_id.0].state() == FrameState::Available {
                return Some(frame_id);
            }
            candidates.swap_remove(pick);
        }

        None
    }

    fn restore_victim(&mut self, frame: &FrameDescriptor) {
        if frame.is_empty() {
            self.available.push_front(frame.index());
        }
    }
}
