//! Configuration for the buffer manager.

use crate::buffer::replacer::PolicyKind;

/// Size of a page in bytes (4KB).
///
/// Every frame in the pool holds exactly one page of this size, and the disk
/// layer reads and writes in units of it.
pub const PAGE_SIZE: usize = 4096;

/// Pages with an id at or below this value are excluded from hit-ratio
/// telemetry.
///
/// The lowest page ids are touched during catalog start-up and would
/// otherwise dominate the request counters.
pub const WARMUP_PAGE_THRESHOLD: u32 = 8;

/// Default number of frames when none is configured.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Construction-time settings for a [`BufferPoolManager`].
///
/// [`BufferPoolManager`]: crate::buffer::BufferPoolManager
///
/// # Example
/// ```
/// use bufmgr::{BufferPoolConfig, PolicyKind};
///
/// let config = BufferPoolConfig::new(16)
///     .with_policy(PolicyKind::Random)
///     .with_seed(7);
/// assert_eq!(config.pool_size, 16);
/// assert_eq!(config.random_seed, Some(7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool.
    pub pool_size: usize,
    /// Replacement policy used for victim selection.
    pub policy: PolicyKind,
    /// Seed for the random policy; `None` seeds from OS entropy.
    pub random_seed: Option<u64>,
}

impl BufferPoolConfig {
    /// Config with the given pool size and the default (clock) policy.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            policy: PolicyKind::default(),
            random_seed: None,
        }
    }
}
