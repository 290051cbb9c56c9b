//! Page replacement policies (replacers).
//!
//! A policy decides which frame the pool reuses on a cache miss. It is told
//! about every lifecycle event of a frame and keeps its bookkeeping in the
//! frame's [`FrameState`] tag plus whatever private lists it needs.
//!
//! Implementations:
//! - [`ClockPolicy`] - Second chance (default)
//! - [`LruPolicy`] - Least recently pinned
//! - [`RandomPolicy`] - Uniform random among available frames

mod clock;
mod lru;
mod random;

use std::fmt;
use std::str::FromStr;

use crate::buffer::frame::{FrameDescriptor, FrameState};
use crate::common::{Error, FrameId};

pub use clock::ClockPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

/// Victim selection strategy of a buffer pool.
///
/// The pool lends the policy a descriptor (or the whole descriptor table) for
/// the duration of one call; policies never hold on to it, never touch page
/// bytes and never perform I/O.
pub trait ReplacementPolicy: Send {
    /// Short policy name, e.g. `"clock"`.
    fn name(&self) -> &'static str;

    /// A new page was allocated and pinned into `frame`.
    fn on_new_page(&mut self, frame: &mut FrameDescriptor);

    /// The page in `frame` was freed; the frame is now empty.
    fn on_free_page(&mut self, frame: &mut FrameDescriptor);

    /// `frame` was pinned; its pin count has already been updated.
    fn on_pin_page(&mut self, frame: &mut FrameDescriptor);

    /// `frame` was unpinned; its pin count has already been updated.
    fn on_unpin_page(&mut self, frame: &mut FrameDescriptor);

    /// Choose a frame to reuse, or `None` if every frame is pinned.
    fn pick_victim(&mut self, frames: &mut [FrameDescriptor]) -> Option<FrameId>;

    /// The victim returned by the last `pick_victim` was not used after all.
    ///
    /// Policies that removed the frame from an internal list put it back so it
    /// stays selectable.
    fn restore_victim(&mut self, _frame: &FrameDescriptor) {}
}

/// Which replacement policy a pool is built with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    #[default]
    Clock,
    Lru,
    Random,
}

impl PolicyKind {
    /// Build a policy for a pool of `capacity` frames.
    ///
    /// `seed` only affects [`PolicyKind::Random`].
    pub fn build(self, capacity: usize, seed: Option<u64>) -> Box<dyn ReplacementPolicy> {
        match self {
            PolicyKind::Clock => Box::new(ClockPolicy::new(capacity)),
            PolicyKind::Lru => Box::new(LruPolicy::new(capacity)),
            PolicyKind::Random => match seed {
                Some(seed) => Box::new(RandomPolicy::with_seed(capacity, seed)),
                None => Box::new(RandomPolicy::new(capacity)),
            },
        }
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clock" => Ok(PolicyKind::Clock),
            "lru" => Ok(PolicyKind::Lru),
            "random" => Ok(PolicyKind::Random),
            _ => Err(Error::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Clock => "clock",
            PolicyKind::Lru => "lru",
            PolicyKind::Random => "random",
        };
        f.write_str(name)
    }
}

/// Mark `frame` pinned.
fn mark_pinned(frame: &mut FrameDescriptor) {
    frame.set_state(FrameState::Pinned);
}

#[cfg(test)]
pub(crate) fn frame_table(capacity: usize) -> Vec<FrameDescriptor> {
    (0..capacity).map(FrameDescriptor::new).collect()
}
