//! The synchronizer (spec §4.2): pairs up two temporal values over their
//! common time domain, promoting a lone `Instant` to a 1-instant sequence and
//! optionally inserting synthetic crossing tuples between linear segments.
//!
//! Grounded on `sweep.rs::sweep_line_plan`'s two-pointer merge over sorted
//! time boundaries (there: `valid_from`/`valid_until` strings; here: typed
//! `Timestamp`s) and on `original_source/meos/src/general/time_ops.c`'s
//! period-overlap short-circuit.

use crate::basetype::BaseValue;
use crate::geom::{segment_intersection, SegmentIntersection};
use crate::temporal::{Instant, Interpolation, Sequence, Temporal};
use crate::timeset::Timestamp;

/// One synchronized tuple: common time, value of `A` there, value of `B` there.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncTuple {
    pub t: Timestamp,
    pub a: BaseValue,
    pub b: BaseValue,
    /// True if this tuple was synthesized at a detected crossing rather than
    /// aligned with an instant in either input.
    pub is_crossing: bool,
}

/// Synchronize two temporal values. Returns the empty stream if their
/// bounding periods do not overlap (spec §4.2 "Failure mode").
pub fn synchronize(a: &Temporal, b: &Temporal, add_crossings: bool) -> Vec<SyncTuple> {
    if !a.bounding_period().overlaps(&b.bounding_period()) {
        return Vec::new();
    }

    match (a, b) {
        (Temporal::Instant(ia), Temporal::Instant(ib)) => {
            if ia.t == ib.t {
                vec![SyncTuple { t: ia.t, a: ia.value.clone(), b: ib.value.clone(), is_crossing: false }]
            } else {
                Vec::new()
            }
        }
        (Temporal::InstantSet(sa), Temporal::InstantSet(sb)) => {
            let mut out = Vec::new();
            let (mut i, mut j) = (0, 0);
            let ia = sa.instants();
            let ib = sb.instants();
            while i < ia.len() && j < ib.len() {
                match ia[i].t.cmp(&ib[j].t) {
                    std::cmp::Ordering::Equal => {
                        out.push(SyncTuple { t: ia[i].t, a: ia[i].value.clone(), b: ib[j].value.clone(), is_crossing: false });
                        i += 1;
                        j += 1;
                    }
                    std::cmp::Ordering::Less => i += 1,
                    std::cmp::Ordering::Greater => j += 1,
                }
            }
            out
        }
        (Temporal::Sequence(sa), Temporal::Instant(ib)) => {
            sa.value_at(ib.t).map(|av| vec![SyncTuple { t: ib.t, a: av, b: ib.value.clone(), is_crossing: false }]).unwrap_or_default()
        }
        (Temporal::Instant(ia), Temporal::Sequence(sb)) => {
            sb.value_at(ia.t).map(|bv| vec![SyncTuple { t: ia.t, a: ia.value.clone(), b: bv, is_crossing: false }]).unwrap_or_default()
        }
        (Temporal::Sequence(sa), Temporal::Sequence(sb)) => synchronize_sequences(sa, sb, add_crossings),
        (Temporal::SequenceSet(ssa), Temporal::SequenceSet(ssb)) => {
            let mut out = Vec::new();
            for seq_a in ssa.sequences() {
                for seq_b in ssb.sequences() {
                    if seq_a.period().overlaps(seq_b.period()) {
                        out.extend(synchronize_sequences(seq_a, seq_b, add_crossings));
                    }
                }
            }
            out
        }
        (Temporal::SequenceSet(ssa), Temporal::Sequence(sb)) => {
            let mut out = Vec::new();
            for seq_a in ssa.sequences() {
                if seq_a.period().overlaps(sb.period()) {
                    out.extend(synchronize_sequences(seq_a, sb, add_crossings));
                }
            }
            out
        }
        (Temporal::Sequence(sa), Temporal::SequenceSet(ssb)) => {
            let mut out = Vec::new();
            for seq_b in ssb.sequences() {
                if sa.period().overlaps(seq_b.period()) {
                    out.extend(synchronize_sequences(sa, seq_b, add_crossings));
                }
            }
            out
        }
        // Any other subtype pairing: promote the non-Sequence side pointwise
        // via value_at, synchronizing over the finer side's instants.
        _ => synchronize_generic(a, b),
    }
}

fn synchronize_generic(a: &Temporal, b: &Temporal) -> Vec<SyncTuple> {
    let times = match a {
        Temporal::Instant(i) => vec![i.t],
        Temporal::InstantSet(s) => s.instants().iter().map(|i| i.t).collect(),
        Temporal::Sequence(s) => s.instants().iter().map(|i| i.t).collect(),
        Temporal::SequenceSet(s) => s.sequences().iter().flat_map(|seq| seq.instants().iter().map(|i| i.t)).collect(),
    };
    times
        .into_iter()
        .filter_map(|t| match (a.value_at(t), b.value_at(t)) {
            (Some(av), Some(bv)) => Some(SyncTuple { t, a: av, b: bv, is_crossing: false }),
            _ => None,
        })
        .collect()
}

/// Two-pointer merge of two sequences over their overlapping period,
/// inserting the lagging side's interpolated value at each leading
/// timestamp, then (if `add_crossings`) solving for an in-segment crossing
/// between each pair of emitted tuples.
fn synchronize_sequences(a: &Sequence, b: &Sequence, add_crossings: bool) -> Vec<SyncTuple> {
    let overlap = match a.period().intersection(b.period()) {
        Some(p) => p,
        None => return Vec::new(),
    };

    let mut times: Vec<Timestamp> = a
        .instants()
        .iter()
        .map(|i| i.t)
        .chain(b.instants().iter().map(|i| i.t))
        .filter(|t| overlap.contains_value(t))
        .collect();
    times.sort();
    times.dedup();

    let mut out: Vec<SyncTuple> = Vec::with_capacity(times.len());
    for t in times {
        if let (Some(av), Some(bv)) = (a.value_at(t), b.value_at(t)) {
            out.push(SyncTuple { t, a: av, b: bv, is_crossing: false });
        }
    }

    if add_crossings && a.interp() == Interpolation::Linear && b.interp() == Interpolation::Linear {
        out = insert_crossings(out, a, b);
    }

    out
}

/// Solve for the timestamp where two synchronized linear segments cross
/// (spec §4.2). For scalar base types this is a linear equation on the
/// value difference; for points it is the 2D segment-segment intersection
/// of the two moving points' paths via `geom::segment_intersection`.
fn insert_crossings(tuples: Vec<SyncTuple>, _a: &Sequence, _b: &Sequence) -> Vec<SyncTuple> {
    if tuples.len() < 2 {
        return tuples;
    }
    let mut out = Vec::with_capacity(tuples.len() * 2);
    for w in tuples.windows(2) {
        out.push(w[0].clone());
        if let Some(crossing) = solve_crossing(&w[0], &w[1]) {
            out.push(crossing);
        }
    }
    out.push(tuples[tuples.len() - 1].clone());
    out
}

fn solve_crossing(left: &SyncTuple, right: &SyncTuple) -> Option<SyncTuple> {
    let frac = match (left.a.as_point2d(), left.b.as_point2d(), right.a.as_point2d(), right.b.as_point2d()) {
        (Some(pa0), Some(pb0), Some(pa1), Some(pb1)) => match segment_intersection(pa0, pa1, pb0, pb1) {
            SegmentIntersection::Point { t, .. } => t,
            _ => return None,
        },
        _ => {
            let (a0, b0, a1, b1) = (left.a.as_f64()?, left.b.as_f64()?, right.a.as_f64()?, right.b.as_f64()?);
            let d0 = a0 - b0;
            let d1 = a1 - b1;
            // Sign change strictly inside the open interval means a crossing exists.
            if d0 == 0.0 || d1 == 0.0 || d0.signum() == d1.signum() {
                return None;
            }
            d0 / (d0 - d1)
        }
    };
    if !(frac > 0.0 && frac < 1.0) {
        return None;
    }
    let span_us = (right.t - left.t).num_microseconds()?;
    let offset_us = (span_us as f64 * frac).round() as i64;
    let t = left.t + chrono::Duration::microseconds(offset_us);
    let av = left.a.lerp(&right.a, frac)?;
    let bv = left.b.lerp(&right.b, frac)?;
    Some(SyncTuple { t, a: av, b: bv, is_crossing: true })
}

/// Promote a lone `Instant` to a 1-instant sequence aligned to `target`'s
/// interpolation mode (spec §4.2 "Subtype promotion").
pub fn promote_instant(inst: &Instant, target_flags: crate::temporal::TemporalFlags) -> Sequence {
    Sequence::new(vec![inst.clone()], true, true, target_flags).expect("a single instant always forms a valid sequence")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::TemporalFlags;
    use chrono::{TimeZone, Utc};

    fn t(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn linear_flags() -> TemporalFlags {
        TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: true }
    }

    #[test]
    fn synchronize_empty_when_periods_disjoint() {
        let a = Temporal::Sequence(
            Sequence::new(vec![Instant::new(BaseValue::Float(1.0), t(2000, 1, 1)), Instant::new(BaseValue::Float(2.0), t(2000, 1, 2))], true, true, linear_flags())
                .unwrap(),
        );
        let b = Temporal::Sequence(
            Sequence::new(vec![Instant::new(BaseValue::Float(1.0), t(2001, 1, 1)), Instant::new(BaseValue::Float(2.0), t(2001, 1, 2))], true, true, linear_flags())
                .unwrap(),
        );
        assert!(synchronize(&a, &b, true).is_empty());
    }

    #[test]
    fn synchronize_detects_crossing_between_linear_sequences() {
        let a = Sequence::new(vec![Instant::new(BaseValue::Float(1.0), t(2000, 1, 1)), Instant::new(BaseValue::Float(3.0), t(2000, 1, 3))], true, true, linear_flags()).unwrap();
        let b = Sequence::new(vec![Instant::new(BaseValue::Float(3.0), t(2000, 1, 1)), Instant::new(BaseValue::Float(1.0), t(2000, 1, 3))], true, true, linear_flags()).unwrap();
        let tuples = synchronize(&Temporal::Sequence(a), &Temporal::Sequence(b), true);
        assert!(tuples.iter().any(|tp| tp.is_crossing));
        let crossing = tuples.iter().find(|tp| tp.is_crossing).unwrap();
        assert_eq!(crossing.t, t(2000, 1, 2));
    }

    #[test]
    fn synchronize_detects_crossing_between_linear_point_paths() {
        use crate::geom::Point2D;
        let a = Sequence::new(
            vec![Instant::new(BaseValue::Point2D(Point2D::new(0.0, 0.0)), t(2000, 1, 1)), Instant::new(BaseValue::Point2D(Point2D::new(2.0, 2.0)), t(2000, 1, 3))],
            true,
            true,
            linear_flags(),
        )
        .unwrap();
        let b = Sequence::new(
            vec![Instant::new(BaseValue::Point2D(Point2D::new(0.0, 2.0)), t(2000, 1, 1)), Instant::new(BaseValue::Point2D(Point2D::new(2.0, 0.0)), t(2000, 1, 3))],
            true,
            true,
            linear_flags(),
        )
        .unwrap();
        let tuples = synchronize(&Temporal::Sequence(a), &Temporal::Sequence(b), true);
        let crossing = tuples.iter().find(|tp| tp.is_crossing).expect("expected a detected point crossing");
        assert_eq!(crossing.t, t(2000, 1, 2));
    }
}
