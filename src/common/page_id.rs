//! Page identifier type.

use std::fmt;

/// Identifies a page on disk.
///
/// `PageId` is a plain value: it is copied into and out of the buffer pool and
/// never shared as a mutable alias. Deriving the ids of a page run is done with
/// [`PageId::offset`], which returns a fresh value.
///
/// # Example
/// ```
/// use bufmgr::PageId;
///
/// let base = PageId::new(40);
/// assert!(base.is_valid());
/// assert_eq!(base.offset(2), PageId::new(42));
/// assert_eq!(base.0, 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page ID.
    ///
    /// Stored in a frame descriptor whose frame holds no page.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// The id `n` pages after this one within a contiguous run.
    ///
    /// The run must lie below [`PageId::INVALID`], as every run handed out
    /// by a disk does.
    #[inline]
    pub fn offset(self, n: u32) -> PageId {
        debug_assert!(
            self.0.checked_add(n).map_or(false, |id| id < u32::MAX),
            "page id offset out of range"
        );
        PageId(self.0 + n)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_new() {
        let pid = PageId::new(42);
        assert_eq!(pid.0, 42);
        assert!(pid.is_valid());
    }

    #[test]
    fn test_page_id_invalid() {
        assert!(!PageId::INVALID.is_valid());
        assert_eq!(PageId::INVALID.0, u32::MAX);
    }

    #[test]
    fn test_page_id_offset_leaves_base_untouched() {
        let base = PageId::new(7);
        let ids: Vec<PageId> = (0..3).map(|i| base.offset(i)).collect();

        assert_eq!(ids, vec![PageId::new(7), PageId::new(8), PageId::new(9)]);
        assert_eq!(base, PageId::new(7));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "page id offset out of range")]
    fn test_page_id_offset_past_sentinel_panics() {
        let _ = PageId::new(u32::MAX - 2).offset(2);
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(42)), "Page(42)");
        assert_eq!(format!("{}", PageId::INVALID), "Page(INVALID)");
    }
}
