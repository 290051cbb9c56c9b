//! CLOCK (second chance) replacement policy.

use log::trace;

use super::{mark_pinned, ReplacementPolicy};
use crate::buffer::frame::{FrameDescriptor, FrameState};
use crate::common::FrameId;

/// Circular scan over the frame table.
///
/// State machine per frame:
/// ```text
///            pin                 unpin (pin count 0)
/// AVAILABLE ─────▶ PINNED ─────────────────────▶ REFERENCED
///     ▲                                             │
///     └──────── swept by the hand, or freed ────────┘
/// ```
/// The hand demotes `Referenced` frames to `Available` as it passes them and
/// stops at the first `Available` frame. A full rotation can therefore be
/// needed twice, so the sweep is bounded to `2 × capacity + 1` steps.
pub struct ClockPolicy {
    capacity: usize,
    /// Frame the hand points at; advanced before each inspection.
    head: usize,
}

impl ClockPolicy {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            // First advance lands on frame 0.
            head: capacity.saturating_sub(1),
        }
    }
}

impl ReplacementPolicy for ClockPolicy {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn on_new_page(&mut self, _frame: &mut FrameDescriptor) {}

    fn on_free_page(&mut self, frame: &mut FrameDescriptor) {
        frame.set_state(FrameState::Available);
    }

    fn on_pin_page(&mut self, frame: &mut FrameDescriptor) {
        mark_pinned(frame);
    }

    fn on_unpin_page(&mut self, frame: &mut FrameDescriptor) {
        if frame.pin_count() == 0 {
            frame.set_state(FrameState::Referenced);
        }
    }

    fn pick_victim(&mut self, frames: &mut [FrameDescriptor]) -> Option<FrameId> {
        if self.capacity == 0 {
            return None;
        }

        for _ in 0..=2 * self.capacity {
            self.head = (self.head + 1) % self.capacity;
            let frame = &mut frames[self.head];
            match frame.state() {
                FrameState::Referenced => {
                    trace!("clock: second chance for {}", frame.index());
                    frame.set_state(FrameState::Available);
                }
                FrameState::Available => return Some(frame.index()),
                FrameState::Pinned => {}
            }
        }

        None
    }
}
