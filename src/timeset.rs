//! Time-domain set algebra (spec §2 component 2, §3.3): `Timestamp`,
//! `TimestampSet`, `Period = Span<Timestamp>`, `PeriodSet = SpanSet<Timestamp>`,
//! plus Allen's interval algebra over periods.
//!
//! `AllenRelation` is carried over directly from the teacher's
//! `types::AllenRelation` (`sql_saga`'s `allen_interval_relation`), whose
//! `compute()` was originally written against raw `&str` boundaries; here it
//! is generalized to work against any `Span<T>`.

use crate::basetype::SpanBound;
use crate::error::{Error, Result};
use crate::span::Span;
use crate::spanset::SpanSet;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

pub type Timestamp = DateTime<Utc>;
pub type Period = Span<Timestamp>;
pub type PeriodSet = SpanSet<Timestamp>;

/// Ordered set of distinct timestamps (spec §3.3/§3.4 InstantSet's time axis).
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampSet {
    timestamps: Vec<Timestamp>,
}

impl TimestampSet {
    pub fn new(mut timestamps: Vec<Timestamp>) -> Result<Self> {
        if timestamps.is_empty() {
            return Err(Error::invalid_input(0, "a TimestampSet requires at least one timestamp"));
        }
        timestamps.sort();
        timestamps.dedup();
        Ok(TimestampSet { timestamps })
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn bounding_period(&self) -> Period {
        Period::new(self.timestamps[0], self.timestamps[self.timestamps.len() - 1], true, true)
            .expect("bounding period of a non-empty TimestampSet always constructs")
    }

    pub fn contains(&self, t: &Timestamp) -> bool {
        self.timestamps.binary_search(t).is_ok()
    }
}

/// Allen's thirteen interval relations (mirrors `sql_saga.allen_interval_relation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllenRelation {
    Precedes,
    Meets,
    Overlaps,
    Starts,
    During,
    Finishes,
    Equals,
    PrecededBy,
    MetBy,
    OverlappedBy,
    StartedBy,
    Contains,
    FinishedBy,
}

impl AllenRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Precedes => "precedes",
            Self::Meets => "meets",
            Self::Overlaps => "overlaps",
            Self::Starts => "starts",
            Self::During => "during",
            Self::Finishes => "finishes",
            Self::Equals => "equals",
            Self::PrecededBy => "preceded_by",
            Self::MetBy => "met_by",
            Self::OverlappedBy => "overlapped_by",
            Self::StartedBy => "started_by",
            Self::Contains => "contains",
            Self::FinishedBy => "finished_by",
        }
    }

    /// Compute the Allen relation between `x = [x_from, x_until)` and
    /// `y = [y_from, y_until)`, treating both as half-open. Generalized from
    /// `sql_saga::types::AllenRelation::compute`, which took raw string bounds.
    pub fn compute<T: SpanBound>(x_from: &T, x_until: &T, y_from: &T, y_until: &T) -> Option<Self> {
        let lt = |a: &T, b: &T| a.compare(b) == Ordering::Less;
        let gt = |a: &T, b: &T| a.compare(b) == Ordering::Greater;
        let eq = |a: &T, b: &T| a.compare(b) == Ordering::Equal;

        if lt(x_until, y_from) {
            Some(Self::Precedes)
        } else if eq(x_until, y_from) {
            Some(Self::Meets)
        } else if lt(x_from, y_from) && lt(y_from, x_until) && lt(x_until, y_until) {
            Some(Self::Overlaps)
        } else if eq(x_from, y_from) && lt(x_until, y_until) {
            Some(Self::Starts)
        } else if gt(x_from, y_from) && lt(x_until, y_until) {
            Some(Self::During)
        } else if gt(x_from, y_from) && eq(x_until, y_until) {
            Some(Self::Finishes)
        } else if eq(x_from, y_from) && eq(x_until, y_until) {
            Some(Self::Equals)
        } else if lt(y_until, x_from) {
            Some(Self::PrecededBy)
        } else if eq(y_until, x_from) {
            Some(Self::MetBy)
        } else if lt(y_from, x_from) && lt(x_from, y_until) && lt(y_until, x_until) {
            Some(Self::OverlappedBy)
        } else if eq(x_from, y_from) && gt(x_until, y_until) {
            Some(Self::StartedBy)
        } else if lt(x_from, y_from) && gt(x_until, y_until) {
            Some(Self::Contains)
        } else if lt(x_from, y_from) && eq(x_until, y_until) {
            Some(Self::FinishedBy)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    /// Scenario 1 (spec §8): union of overlapping periods.
    #[test]
    fn scenario_1_union_of_overlapping_periods() {
        let a = Period::new(day(2000, 1, 1), day(2000, 1, 5), true, true).unwrap();
        let b = Period::new(day(2000, 1, 3), day(2000, 1, 10), false, true).unwrap();
        let u = a.union(&b).unwrap();
        assert_eq!(*u.lower(), day(2000, 1, 1));
        assert_eq!(*u.upper(), day(2000, 1, 10));
        assert!(u.lower_inc());
        assert!(u.upper_inc());
    }

    #[test]
    fn allen_relation_equals() {
        let a_from = day(2024, 1, 1);
        let a_until = day(2024, 2, 1);
        assert_eq!(AllenRelation::compute(&a_from, &a_until, &a_from, &a_until), Some(AllenRelation::Equals));
    }

    #[test]
    fn allen_relation_precedes_and_meets() {
        let x_from = day(2024, 1, 1);
        let x_until = day(2024, 2, 1);
        let y_from = day(2024, 3, 1);
        let y_until = day(2024, 4, 1);
        assert_eq!(AllenRelation::compute(&x_from, &x_until, &y_from, &y_until), Some(AllenRelation::Precedes));
        assert_eq!(AllenRelation::compute(&x_from, &x_until, &x_until, &y_until), Some(AllenRelation::Meets));
    }

    #[test]
    fn timestamp_set_dedups_and_sorts() {
        let ts = TimestampSet::new(vec![day(2024, 3, 1), day(2024, 1, 1), day(2024, 1, 1)]).unwrap();
        assert_eq!(ts.timestamps().len(), 2);
        assert_eq!(ts.timestamps()[0], day(2024, 1, 1));
    }
}
