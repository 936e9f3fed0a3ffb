//! `SpanSet<T>` — an ordered, disjoint, non-adjacent union of spans (spec
//! §3.3, §4.1). Grounded on `sweep.rs::coalesce_segments`'s adjacency-merge
//! fold, generalized from segment-merging over `String` boundaries to a
//! typed normalizer over any `SpanBound`.

use crate::basetype::SpanBound;
use crate::error::{Error, Result};
use crate::span::Span;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub struct SpanSet<T: SpanBound> {
    spans: Vec<Span<T>>,
}

impl<T: SpanBound> SpanSet<T> {
    /// Normalize an arbitrary bag of spans into canonical form: sort by lower
    /// bound, then fold-merge spans whose inclusivity makes them overlapping
    /// or adjacent (spec §4.1 normalization algorithm).
    pub fn new(mut spans: Vec<Span<T>>) -> Result<Self> {
        if spans.is_empty() {
            return Err(Error::invalid_input(0, "a SpanSet requires at least one span"));
        }
        spans.sort_by(|a, b| match a.lower().compare(b.lower()) {
            Ordering::Equal => {
                if a.lower_inc() == b.lower_inc() {
                    Ordering::Equal
                } else if a.lower_inc() {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            other => other,
        });

        let mut merged: Vec<Span<T>> = Vec::with_capacity(spans.len());
        for span in spans {
            match merged.last_mut() {
                Some(last) if spans_touch(last, &span) => {
                    if let Some(u) = last.union(&span) {
                        *last = u;
                    }
                }
                _ => merged.push(span),
            }
        }

        Ok(SpanSet { spans: merged })
    }

    pub fn spans(&self) -> &[Span<T>] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Precomputed bounding span (spec §3.3).
    pub fn bounding_span(&self) -> Span<T> {
        let first = &self.spans[0];
        let last = &self.spans[self.spans.len() - 1];
        Span::new(first.lower().clone(), last.upper().clone(), first.lower_inc(), last.upper_inc())
            .expect("bounding span of a valid SpanSet is always constructible")
    }

    pub fn contains_value(&self, v: &T) -> bool {
        self.spans.iter().any(|s| s.contains_value(v))
    }

    pub fn contains(&self, other: &SpanSet<T>) -> bool {
        other.spans.iter().all(|os| self.spans.iter().any(|s| s.contains(os)))
    }

    pub fn overlaps(&self, other: &SpanSet<T>) -> bool {
        if !self.bounding_span().overlaps(&other.bounding_span()) {
            return false;
        }
        self.spans.iter().any(|s| other.spans.iter().any(|o| s.overlaps(o)))
    }

    pub fn union(&self, other: &SpanSet<T>) -> SpanSet<T> {
        let mut all: Vec<Span<T>> = self.spans.clone();
        all.extend(other.spans.iter().cloned());
        SpanSet::new(all).expect("union of two non-empty SpanSets is never empty")
    }

    pub fn intersection(&self, other: &SpanSet<T>) -> Option<SpanSet<T>> {
        if !self.bounding_span().overlaps(&other.bounding_span()) {
            return None;
        }
        let mut out = Vec::new();
        for s in &self.spans {
            for o in &other.spans {
                if let Some(i) = s.intersection(o) {
                    out.push(i);
                }
            }
        }
        if out.is_empty() {
            None
        } else {
            SpanSet::new(out).ok()
        }
    }

    pub fn minus(&self, other: &SpanSet<T>) -> Option<SpanSet<T>> {
        if !self.bounding_span().overlaps(&other.bounding_span()) {
            return Some(self.clone());
        }
        let mut remaining: Vec<Span<T>> = self.spans.clone();
        for o in &other.spans {
            let mut next = Vec::new();
            for r in &remaining {
                next.extend(r.minus(o));
            }
            remaining = next;
        }
        if remaining.is_empty() {
            None
        } else {
            SpanSet::new(remaining).ok()
        }
    }

    pub fn shift(&self, delta_apply: impl Fn(&T) -> T + Copy) -> SpanSet<T> {
        SpanSet { spans: self.spans.iter().map(|s| s.shift(delta_apply)).collect() }
    }
}

impl SpanSet<f64> {
    /// Rescale every span by `factor` about the spanset's own lower bound, so
    /// relative gaps between spans scale proportionally rather than each span
    /// independently drifting apart (tscale, `original_source/meos/src/general/time_ops.c`).
    pub fn scale(&self, factor: f64) -> SpanSet<f64> {
        let origin = *self.bounding_span().lower();
        let spans = self
            .spans
            .iter()
            .map(|s| Span::new(origin + (*s.lower() - origin) * factor, origin + (*s.upper() - origin) * factor, s.lower_inc(), s.upper_inc()).expect("scaling a valid span by a positive-width-preserving factor stays ordered"))
            .collect();
        SpanSet { spans }
    }
}

/// True when `a.upper` meets `b.lower` under compatible inclusivity, per the
/// adjacency rule of spec §4.1: `cur.upper = next.lower ∧ (cur.upper_inc ∨ next.lower_inc)`.
/// Also true when the spans already overlap — both cases fold into one union.
fn spans_touch<T: SpanBound>(a: &Span<T>, b: &Span<T>) -> bool {
    if a.overlaps(b) {
        return true;
    }
    a.upper().compare(b.lower()) == Ordering::Equal && (a.upper_inc() || b.lower_inc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(lo: i32, hi: i32) -> Span<i32> {
        Span::new(lo, hi, true, true).unwrap()
    }

    #[test]
    fn normalization_merges_touching_spans() {
        let ss = SpanSet::new(vec![s(1, 5), s(6, 10), s(20, 30)]).unwrap();
        assert_eq!(ss.len(), 2);
        assert_eq!(*ss.spans()[0].upper(), 10);
    }

    #[test]
    fn normalization_sorts_out_of_order_input() {
        let ss = SpanSet::new(vec![s(20, 30), s(1, 5)]).unwrap();
        assert_eq!(*ss.spans()[0].lower(), 1);
        assert_eq!(*ss.spans()[1].lower(), 20);
    }

    #[test]
    fn flatten_single_span_round_trips() {
        let span = s(5, 9);
        let ss = SpanSet::new(vec![span.clone()]).unwrap();
        assert_eq!(ss.len(), 1);
        assert_eq!(ss.spans()[0], span);
    }

    #[test]
    fn minus_removes_a_gap() {
        let ss = SpanSet::new(vec![s(1, 10)]).unwrap();
        let cut = SpanSet::new(vec![s(4, 6)]).unwrap();
        let r = ss.minus(&cut).unwrap();
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn scale_keeps_relative_gaps_proportional() {
        let ss = SpanSet::new(vec![Span::new(0.0, 1.0, true, true).unwrap(), Span::new(2.0, 3.0, true, true).unwrap()]).unwrap();
        let scaled = ss.scale(2.0);
        assert_eq!(*scaled.spans()[0].lower(), 0.0);
        assert_eq!(*scaled.spans()[0].upper(), 2.0);
        assert_eq!(*scaled.spans()[1].lower(), 4.0);
        assert_eq!(*scaled.spans()[1].upper(), 6.0);
    }
}
