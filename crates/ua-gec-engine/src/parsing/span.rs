/// A character range `[start, end)` into the original text.
///
/// Offsets count Unicode scalar values, not bytes, so they stay meaningful to
/// callers that index text by character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in characters. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Length of the positive overlap between two spans, zero if they are disjoint.
    #[must_use]
    pub fn overlap(self, other: Span) -> usize {
        self.end
            .min(other.end)
            .saturating_sub(self.start.max(other.start))
    }

    /// True if `self` lies inside `outer` with both edges open:
    /// `outer.start < self.start <= self.end < outer.end`.
    #[must_use]
    pub fn strictly_inside(self, outer: Span) -> bool {
        outer.start < self.start && self.start <= self.end && self.end < outer.end
    }

    /// True if the two spans conflict: positive overlap, or either one strictly
    /// nested in the other.
    ///
    /// A zero-length span sitting on the boundary of another span does not
    /// conflict with it.
    #[must_use]
    pub fn conflicts_with(self, other: Span) -> bool {
        self.overlap(other) > 0 || self.strictly_inside(other) || other.strictly_inside(self)
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

/// Returns the index of the first span in `spans` that conflicts with the query
/// interval `[begin, end)`, or `None` if there is no conflict.
pub fn intersects(spans: &[Span], begin: usize, end: usize) -> Option<usize> {
    let query = Span::new(begin, end);
    spans.iter().position(|sp| query.conflicts_with(*sp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::positive_overlap(&[(0, 5)], 3, 8, Some(0))]
    #[case::identical(&[(2, 4)], 2, 4, Some(0))]
    #[case::disjoint(&[(0, 3)], 4, 6, None)]
    #[case::touching(&[(0, 3)], 3, 6, None)]
    #[case::query_contains_span(&[(2, 3)], 0, 10, Some(0))]
    #[case::span_contains_query(&[(0, 10)], 4, 6, Some(0))]
    #[case::empty_query_inside(&[(0, 10)], 5, 5, Some(0))]
    #[case::empty_query_at_start(&[(0, 10)], 0, 0, None)]
    #[case::empty_query_at_end(&[(0, 10)], 10, 10, None)]
    #[case::empty_span_inside_query(&[(12, 12)], 0, 16, Some(0))]
    #[case::empty_span_at_query_edge(&[(4, 4)], 4, 8, None)]
    #[case::two_empty_at_same_point(&[(3, 3)], 3, 3, None)]
    #[case::second_span(&[(0, 2), (5, 9)], 6, 7, Some(1))]
    #[case::no_spans(&[], 0, 5, None)]
    fn intersects_cases(
        #[case] spans: &[(usize, usize)],
        #[case] begin: usize,
        #[case] end: usize,
        #[case] expected: Option<usize>,
    ) {
        let spans: Vec<Span> = spans.iter().copied().map(Span::from).collect();
        assert_eq!(intersects(&spans, begin, end), expected);
    }

    #[test]
    fn first_conflicting_index_wins() {
        let spans = [Span::new(0, 4), Span::new(2, 6)];
        assert_eq!(intersects(&spans, 3, 5), Some(0));
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = Span::new(0, 5);
        let b = Span::new(3, 9);
        assert_eq!(a.overlap(b), 2);
        assert_eq!(b.overlap(a), 2);
        assert_eq!(a.overlap(Span::new(7, 8)), 0);
    }

    #[test]
    fn len_and_is_empty() {
        assert_eq!(Span::new(2, 7).len(), 5);
        assert!(Span::new(4, 4).is_empty());
        assert!(!Span::new(4, 5).is_empty());
    }
}
