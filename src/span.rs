//! `Span<T>` — a bounded interval over an ordered base type (spec §3.2, §4.1).
//!
//! Grounded on `sweep.rs`'s `AllenRelation::compute` (topological predicates
//! computed from ordered bound comparisons) and `coalesce_segments`
//! (adjacency-merge fold), generalized here from the teacher's ad-hoc
//! string-boundary comparisons to a typed, reusable `Span<T>`.

use crate::basetype::SpanBound;
use crate::error::{Error, Result};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct Span<T: SpanBound> {
    lower: T,
    upper: T,
    lower_inc: bool,
    upper_inc: bool,
}

impl<T: SpanBound> Span<T> {
    /// Construct a span, canonicalizing discrete exclusive bounds to inclusive
    /// ones (spec §3.2). Errors if `lower > upper`, or if `lower == upper` with
    /// either bound exclusive (a non-singleton empty span is not representable).
    pub fn new(lower: T, upper: T, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        let (lower, lower_inc, upper, upper_inc) = if T::DISCRETE {
            let lower = if lower_inc { lower } else { lower.succ() };
            let upper = if upper_inc { upper } else { upper.pred() };
            (lower, true, upper, true)
        } else {
            (lower, lower_inc, upper, upper_inc)
        };

        match lower.compare(&upper) {
            Ordering::Greater => Err(Error::invalid_input(0, "span lower bound is greater than upper bound")),
            Ordering::Equal if !(lower_inc && upper_inc) => {
                Err(Error::invalid_input(0, "singleton span must have both bounds inclusive"))
            }
            _ => Ok(Span { lower, upper, lower_inc, upper_inc }),
        }
    }

    pub fn singleton(value: T) -> Self {
        Span { lower: value.clone(), upper: value, lower_inc: true, upper_inc: true }
    }

    pub fn lower(&self) -> &T {
        &self.lower
    }
    pub fn upper(&self) -> &T {
        &self.upper
    }
    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }
    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn is_singleton(&self) -> bool {
        self.lower.compare(&self.upper) == Ordering::Equal
    }

    pub fn contains_value(&self, v: &T) -> bool {
        let lo_ok = match self.lower.compare(v) {
            Ordering::Less => true,
            Ordering::Equal => self.lower_inc,
            Ordering::Greater => false,
        };
        let hi_ok = match v.compare(&self.upper) {
            Ordering::Less => true,
            Ordering::Equal => self.upper_inc,
            Ordering::Greater => false,
        };
        lo_ok && hi_ok
    }

    // ── Topological predicates (§4.1) ──

    pub fn contains(&self, other: &Span<T>) -> bool {
        let lo_ok = match self.lower.compare(&other.lower) {
            Ordering::Less => true,
            Ordering::Equal => self.lower_inc || !other.lower_inc,
            Ordering::Greater => false,
        };
        let hi_ok = match self.upper.compare(&other.upper) {
            Ordering::Greater => true,
            Ordering::Equal => self.upper_inc || !other.upper_inc,
            Ordering::Less => false,
        };
        lo_ok && hi_ok
    }

    pub fn contained(&self, other: &Span<T>) -> bool {
        other.contains(self)
    }

    pub fn overlaps(&self, other: &Span<T>) -> bool {
        let lo_le_hi = |a_lo: &T, a_lo_inc: bool, b_hi: &T, b_hi_inc: bool| match a_lo.compare(b_hi) {
            Ordering::Less => true,
            Ordering::Equal => a_lo_inc && b_hi_inc,
            Ordering::Greater => false,
        };
        lo_le_hi(&self.lower, self.lower_inc, &other.upper, other.upper_inc)
            && lo_le_hi(&other.lower, other.lower_inc, &self.upper, self.upper_inc)
    }

    /// Equivalent to `[lower, upper]` denoting the same set of points.
    pub fn same(&self, other: &Span<T>) -> bool {
        self.lower.compare(&other.lower) == Ordering::Equal
            && self.upper.compare(&other.upper) == Ordering::Equal
            && self.lower_inc == other.lower_inc
            && self.upper_inc == other.upper_inc
    }

    /// One bound inclusive, the other exclusive, at the meeting point (§4.1).
    pub fn adjacent(&self, other: &Span<T>) -> bool {
        (self.upper.compare(&other.lower) == Ordering::Equal && (self.upper_inc != other.lower_inc))
            || (other.upper.compare(&self.lower) == Ordering::Equal && (other.upper_inc != self.lower_inc))
    }

    pub fn before(&self, other: &Span<T>) -> bool {
        match self.upper.compare(&other.lower) {
            Ordering::Less => true,
            Ordering::Equal => !(self.upper_inc && other.lower_inc),
            Ordering::Greater => false,
        }
    }

    pub fn after(&self, other: &Span<T>) -> bool {
        other.before(self)
    }

    /// `overbefore`: `self` does not extend past the end of `other` (left-of-or-overlapping).
    pub fn overbefore(&self, other: &Span<T>) -> bool {
        match self.upper.compare(&other.upper) {
            Ordering::Less => true,
            Ordering::Equal => self.upper_inc || !other.upper_inc,
            Ordering::Greater => false,
        }
    }

    /// `overafter`: `self` does not start before `other` begins (right-of-or-overlapping).
    pub fn overafter(&self, other: &Span<T>) -> bool {
        match self.lower.compare(&other.lower) {
            Ordering::Greater => true,
            Ordering::Equal => self.lower_inc || !other.lower_inc,
            Ordering::Less => false,
        }
    }

    // ── Set operators (§4.1) ──

    /// Union of two overlapping-or-adjacent spans. Returns `None` if disjoint
    /// and non-adjacent (the caller should fall back to a 2-span `SpanSet`).
    pub fn union(&self, other: &Span<T>) -> Option<Span<T>> {
        if !self.overlaps(other) && !self.adjacent(other) {
            return None;
        }
        let (lower, lower_inc) = match self.lower.compare(&other.lower) {
            Ordering::Less => (self.lower.clone(), self.lower_inc),
            Ordering::Greater => (other.lower.clone(), other.lower_inc),
            Ordering::Equal => (self.lower.clone(), self.lower_inc || other.lower_inc),
        };
        let (upper, upper_inc) = match self.upper.compare(&other.upper) {
            Ordering::Greater => (self.upper.clone(), self.upper_inc),
            Ordering::Less => (other.upper.clone(), other.upper_inc),
            Ordering::Equal => (self.upper.clone(), self.upper_inc || other.upper_inc),
        };
        Span::new(lower, upper, lower_inc, upper_inc).ok()
    }

    pub fn intersection(&self, other: &Span<T>) -> Option<Span<T>> {
        if !self.overlaps(other) {
            return None;
        }
        let (lower, lower_inc) = match self.lower.compare(&other.lower) {
            Ordering::Greater => (self.lower.clone(), self.lower_inc),
            Ordering::Less => (other.lower.clone(), other.lower_inc),
            Ordering::Equal => (self.lower.clone(), self.lower_inc && other.lower_inc),
        };
        let (upper, upper_inc) = match self.upper.compare(&other.upper) {
            Ordering::Less => (self.upper.clone(), self.upper_inc),
            Ordering::Greater => (other.upper.clone(), other.upper_inc),
            Ordering::Equal => (self.upper.clone(), self.upper_inc && other.upper_inc),
        };
        Span::new(lower, upper, lower_inc, upper_inc).ok()
    }

    /// `self - other`, producing zero, one or two spans.
    pub fn minus(&self, other: &Span<T>) -> Vec<Span<T>> {
        if !self.overlaps(other) {
            return vec![self.clone()];
        }
        let mut out = Vec::new();
        if self.lower.compare(&other.lower) == Ordering::Less
            || (self.lower.compare(&other.lower) == Ordering::Equal && self.lower_inc && !other.lower_inc)
        {
            if let Ok(left) = Span::new(self.lower.clone(), other.lower.clone(), self.lower_inc, !other.lower_inc) {
                out.push(left);
            }
        }
        if self.upper.compare(&other.upper) == Ordering::Greater
            || (self.upper.compare(&other.upper) == Ordering::Equal && self.upper_inc && !other.upper_inc)
        {
            if let Ok(right) = Span::new(other.upper.clone(), self.upper.clone(), !other.upper_inc, self.upper_inc) {
                out.push(right);
            }
        }
        out
    }

    /// Translate both bounds by a fixed delta (supplemented from
    /// `original_source/meos/src/general/time_ops.c`'s tshift).
    pub fn shift(&self, delta_apply: impl Fn(&T) -> T) -> Span<T> {
        Span { lower: delta_apply(&self.lower), upper: delta_apply(&self.upper), lower_inc: self.lower_inc, upper_inc: self.upper_inc }
    }
}

impl Span<f64> {
    /// Rescale the span's width by `factor`, keeping the lower bound fixed
    /// (supplemented from `original_source/meos/src/general/time_ops.c`'s tscale).
    pub fn scale(&self, factor: f64) -> Span<f64> {
        let width = self.upper - self.lower;
        Span { lower: self.lower, upper: self.lower + width * factor, lower_inc: self.lower_inc, upper_inc: self.upper_inc }
    }

    /// Distance: 0 if intersecting, else the gap between the nearer bounds (§4.1).
    pub fn distance(&self, other: &Span<f64>) -> f64 {
        if self.overlaps(other) {
            return 0.0;
        }
        if self.before(other) {
            other.lower - self.upper
        } else {
            self.lower - other.upper
        }
    }
}

impl Span<chrono::DateTime<chrono::Utc>> {
    /// Distance in seconds (§4.1: "in seconds for time spans").
    pub fn distance_seconds(&self, other: &Span<chrono::DateTime<chrono::Utc>>) -> f64 {
        if self.overlaps(other) {
            return 0.0;
        }
        let delta = if self.before(other) {
            other.lower - self.upper
        } else {
            self.lower - other.upper
        };
        delta.num_microseconds().map(|us| us as f64 / 1_000_000.0).unwrap_or(f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(lo: i32, hi: i32, li: bool, hi_inc: bool) -> Span<i32> {
        Span::new(lo, hi, li, hi_inc).unwrap()
    }

    #[test]
    fn discrete_exclusive_upper_canonicalizes() {
        let span = s(1, 5, true, false);
        assert_eq!(*span.upper(), 4);
        assert!(span.upper_inc());
    }

    #[test]
    fn singleton_requires_both_inclusive() {
        assert!(Span::new(3, 3, true, true).is_ok());
        assert!(Span::new(3, 3, true, false).is_err());
    }

    #[test]
    fn union_of_overlapping_spans() {
        let a = s(1, 5, true, true);
        let b = s(3, 10, true, true);
        let u = a.union(&b).unwrap();
        assert_eq!(*u.lower(), 1);
        assert_eq!(*u.upper(), 10);
    }

    #[test]
    fn adjacent_spans_merge_under_union() {
        // [1,5] and [6,10] are adjacent after discrete canonicalization of (5,10] would be [6,10].
        let a = s(1, 5, true, true);
        let b = s(6, 10, true, true);
        assert!(a.adjacent(&b));
        let u = a.union(&b).unwrap();
        assert_eq!(*u.lower(), 1);
        assert_eq!(*u.upper(), 10);
    }

    #[test]
    fn disjoint_non_adjacent_union_returns_none() {
        let a = s(1, 5, true, true);
        let b = s(8, 10, true, true);
        assert!(a.union(&b).is_none());
    }

    #[test]
    fn minus_splits_into_two() {
        let a = s(1, 10, true, true);
        let b = s(4, 6, true, true);
        let r = a.minus(&b);
        assert_eq!(r.len(), 2);
        assert_eq!(*r[0].lower(), 1);
        assert_eq!(*r[0].upper(), 3);
        assert_eq!(*r[1].lower(), 7);
        assert_eq!(*r[1].upper(), 10);
    }

    #[test]
    fn contains_and_contained_are_dual() {
        let a = s(1, 10, true, true);
        let b = s(3, 5, true, true);
        assert!(a.contains(&b));
        assert!(b.contained(&a));
    }

    #[test]
    fn scale_keeps_lower_bound_fixed_and_rescales_width() {
        let span = Span::new(2.0, 6.0, true, true).unwrap();
        let scaled = span.scale(2.0);
        assert_eq!(*scaled.lower(), 2.0);
        assert_eq!(*scaled.upper(), 10.0);
    }
}
