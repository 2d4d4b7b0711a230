//! Page ranges and per-page application.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// Which pages an operation touches. Indices are 0-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRange {
    /// Only the first page
    #[default]
    First,
    /// Every page of the document
    All,
    /// Pages `start..=end`
    Span {
        /// First page index
        start: usize,
        /// Last page index
        end: usize,
    },
}

impl PageRange {
    /// A single page.
    pub fn page(index: usize) -> Self {
        PageRange::Span {
            start: index,
            end: index,
        }
    }

    /// Pages `start..=end`.
    pub fn span(start: usize, end: usize) -> Self {
        PageRange::Span { start, end }
    }

    /// Resolve against a document with `page_count` pages.
    ///
    /// Out-of-range spans are rejected, never clamped. A document without
    /// pages has no valid range at all.
    pub fn resolve(&self, page_count: usize) -> Result<RangeInclusive<usize>> {
        let (start, end) = match *self {
            PageRange::First => (0, 0),
            PageRange::All => (0, page_count.saturating_sub(1)),
            PageRange::Span { start, end } => (start, end),
        };

        if page_count == 0 || start > end || end >= page_count {
            return Err(Error::InvalidRange {
                start,
                end,
                page_count,
            });
        }

        Ok(start..=end)
    }
}

/// Apply `step` to every page index in `range`, in ascending order.
///
/// The range is validated before the first call, so a bad range never
/// leaves some pages touched. Errors from `step` stop the iteration.
pub fn apply_to_pages<F>(range: PageRange, page_count: usize, mut step: F) -> Result<usize>
where
    F: FnMut(usize) -> Result<()>,
{
    let pages = range.resolve(page_count)?;
    let mut applied = 0;
    for index in pages {
        log::debug!("Applying overlay to page {}", index);
        step(index)?;
        applied += 1;
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_first_page() {
        assert_eq!(PageRange::default().resolve(5).unwrap(), 0..=0);
    }

    #[test]
    fn test_all_pages() {
        assert_eq!(PageRange::All.resolve(7).unwrap(), 0..=6);
        assert_eq!(PageRange::All.resolve(1).unwrap(), 0..=0);
    }

    #[test]
    fn test_span_is_verbatim() {
        assert_eq!(PageRange::span(2, 4).resolve(5).unwrap(), 2..=4);
        assert_eq!(PageRange::page(3).resolve(5).unwrap(), 3..=3);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let err = PageRange::span(3, 5).resolve(5).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidRange {
                start: 3,
                end: 5,
                page_count: 5
            }
        ));
    }

    #[test]
    fn test_reversed_span_is_rejected() {
        assert!(PageRange::span(3, 1).resolve(5).is_err());
    }

    #[test]
    fn test_empty_document() {
        assert!(PageRange::First.resolve(0).is_err());
        assert!(PageRange::All.resolve(0).is_err());
    }

    #[test]
    fn test_apply_visits_in_order() {
        let mut seen = Vec::new();
        let count = apply_to_pages(PageRange::span(1, 3), 4, |i| {
            seen.push(i);
            Ok(())
        })
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_range_touches_nothing() {
        let mut calls = 0;
        let result = apply_to_pages(PageRange::span(0, 9), 3, |_| {
            calls += 1;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(calls, 0);
    }
}
