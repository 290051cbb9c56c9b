//! Buffer pool statistics tracking.
//!
//! Two families of counters are kept:
//! - Buffer hit ratio (BHR) counters: aggregate requests/hits and load
//!   requests/hits, reported by [`HitRatioReport`]
//! - Operational counters: evictions, pages read, pages written

use std::fmt;

use crate::common::config::WARMUP_PAGE_THRESHOLD;
use crate::common::PageId;

const SEPARATOR: &str = "+----------------------------------------+";

/// Counters owned by one buffer pool.
///
/// All counters only ever increase. Pins of pages with an id at or below
/// [`WARMUP_PAGE_THRESHOLD`] are not counted toward the BHR counters.
///
/// The load counters are deliberately asymmetric: a load request is counted
/// only for a pin that misses, while a load hit is counted for every pin that
/// hits. The load ratio can therefore exceed 1.
#[derive(Debug, Default, Clone)]
pub struct BufferPoolStats {
    aggregate_requests: u64,
    aggregate_hits: u64,
    load_requests: u64,
    load_hits: u64,
    evictions: u64,
    pages_read: u64,
    pages_written: u64,
}

impl BufferPoolStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn tracked(page_id: PageId) -> bool {
        page_id.0 > WARMUP_PAGE_THRESHOLD
    }

    /// A pin request arrived for `page_id`.
    pub(crate) fn record_request(&mut self, page_id: PageId) {
        if Self::tracked(page_id) {
            self.aggregate_requests += 1;
        }
    }

    /// A pin for `page_id` was served from the pool.
    pub(crate) fn record_hit(&mut self, page_id: PageId) {
        if Self::tracked(page_id) {
            self.aggregate_hits += 1;
            self.load_hits += 1;
        }
    }

    /// A pin for `page_id` had to load the page into a frame.
    pub(crate) fn record_load(&mut self, page_id: PageId) {
        if Self::tracked(page_id) {
            self.load_requests += 1;
        }
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub(crate) fn record_read(&mut self) {
        self.pages_read += 1;
    }

    pub(crate) fn record_write(&mut self) {
        self.pages_written += 1;
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            aggregate_requests: self.aggregate_requests,
            aggregate_hits: self.aggregate_hits,
            load_requests: self.load_requests,
            load_hits: self.load_hits,
            evictions: self.evictions,
            pages_read: self.pages_read,
            pages_written: self.pages_written,
        }
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub aggregate_requests: u64,
    pub aggregate_hits: u64,
    pub load_requests: u64,
    pub load_hits: u64,
    pub evictions: u64,
    pub pages_read: u64,
    pub pages_written: u64,
}

impl StatsSnapshot {
    /// Aggregate hit ratio (BHR1): aggregate hits / aggregate requests.
    pub fn aggregate_ratio(&self) -> f32 {
        self.aggregate_hits as f32 / self.aggregate_requests as f32
    }

    /// Load-based hit ratio (BHR2): load hits / load requests.
    pub fn load_ratio(&self) -> f32 {
        self.load_hits as f32 / self.load_requests as f32
    }

    /// The console hit-ratio report for these counters.
    pub fn hit_ratio_report(&self) -> HitRatioReport {
        HitRatioReport {
            total_hits: self.aggregate_hits,
            total_requests: self.aggregate_requests,
            load_hits: self.load_hits,
            load_requests: self.load_requests,
            aggregate_ratio: self.aggregate_ratio(),
            load_ratio: self.load_ratio(),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ requests: {}, hits: {}, loads: {}, evictions: {}, reads: {}, writes: {} }}",
            self.aggregate_requests,
            self.aggregate_hits,
            self.load_requests,
            self.evictions,
            self.pages_read,
            self.pages_written
        )
    }
}

/// Hit-ratio report in the layout consumed by existing tooling.
///
/// ```text
/// totPageHits: 1
/// totPageRequests: 3
/// pageLoadHits: 1
/// pageLoadRequests: 2
/// +----------------------------------------+
/// Aggregate BHR (BHR1):   0.33333
/// Load-based BHR (BHR2):   0.50000
/// +----------------------------------------+
/// ```
/// A ratio with a zero denominator is `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRatioReport {
    pub total_hits: u64,
    pub total_requests: u64,
    pub load_hits: u64,
    pub load_requests: u64,
    pub aggregate_ratio: f32,
    pub load_ratio: f32,
}

impl fmt::Display for HitRatioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "totPageHits: {}", self.total_hits)?;
        writeln!(f, "totPageRequests: {}", self.total_requests)?;
        writeln!(f, "pageLoadHits: {}", self.load_hits)?;
        writeln!(f, "pageLoadRequests: {}", self.load_requests)?;
        writeln!(f, "{}", SEPARATOR)?;
        writeln!(f, "Aggregate BHR (BHR1): {:9.5}", self.aggregate_ratio)?;
        writeln!(f, "Load-based BHR (BHR2): {:9.5}", self.load_ratio)?;
        writeln!(f, "{}", SEPARATOR)
    }
}
