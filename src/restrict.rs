//! The restriction engine (spec §4.4): `T.at(D)` / `T.minus(D)` for value,
//! span, time and spatial domains `D`. Grounded on `sweep.rs`'s
//! `build_atomic_segments`/`resolve_payloads` boundary-slicing pattern
//! (there: slicing rows at time boundaries; here: slicing sequences at
//! value/time/spatial crossing points) and, for §4.4.1/§4.4.2, on
//! `geom::{segment_intersection, liang_barsky_clip_3d}`.

use crate::basetype::BaseValue;
use crate::error::Result;
use crate::geom::{liang_barsky_clip_3d, segment_intersection, Bbox2D, Box3D, Point2D, Point3D, SegmentIntersection};
use crate::span::Span;
use crate::spanset::SpanSet;
use crate::temporal::{Instant, Interpolation, Sequence, SequenceSet, Temporal};
use crate::timeset::{Period, PeriodSet, Timestamp, TimestampSet};

// ── Value / value-span restriction ──

/// `T at value`.
pub fn at_value(temp: &Temporal, value: &BaseValue) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| v.values_equal(value))
}

/// `T minus value`.
pub fn minus_value(temp: &Temporal, value: &BaseValue) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| !v.values_equal(value))
}

/// `T at {value, ...}`: the union of matching any value in the set.
pub fn at_value_set(temp: &Temporal, values: &[BaseValue]) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| values.iter().any(|x| v.values_equal(x)))
}

/// `T minus {value, ...}`.
pub fn minus_value_set(temp: &Temporal, values: &[BaseValue]) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| !values.iter().any(|x| v.values_equal(x)))
}

pub fn at_span(temp: &Temporal, span: &Span<f64>) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| v.as_f64().map(|f| span.contains_value(&f)).unwrap_or(false))
}

pub fn minus_span(temp: &Temporal, span: &Span<f64>) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| !v.as_f64().map(|f| span.contains_value(&f)).unwrap_or(false))
}

pub fn at_spanset(temp: &Temporal, spans: &SpanSet<f64>) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| v.as_f64().map(|f| spans.contains_value(&f)).unwrap_or(false))
}

pub fn minus_spanset(temp: &Temporal, spans: &SpanSet<f64>) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| !v.as_f64().map(|f| spans.contains_value(&f)).unwrap_or(false))
}

/// Restrict by an arbitrary base-value predicate, splitting each sequence
/// into maximal runs where the predicate is constant (the value-domain
/// analogue of the discontinuous lift's segment splitting, §4.3/§4.4).
fn restrict_by_predicate(temp: &Temporal, pred: impl Fn(&BaseValue) -> bool + Copy) -> Option<Temporal> {
    match temp {
        Temporal::Instant(i) => {
            if pred(&i.value) {
                Some(temp.clone())
            } else {
                None
            }
        }
        Temporal::InstantSet(s) => {
            let kept: Vec<Instant> = s.instants().iter().filter(|i| pred(&i.value)).cloned().collect();
            if kept.is_empty() {
                None
            } else {
                crate::temporal::InstantSet::new(kept, s.flags()).ok().map(Temporal::InstantSet)
            }
        }
        Temporal::Sequence(seq) => restrict_sequence_by_predicate(seq, pred).map(|seqs| wrap_sequences(seqs)),
        Temporal::SequenceSet(ss) => {
            let mut all = Vec::new();
            for seq in ss.sequences() {
                if let Some(mut seqs) = restrict_sequence_by_predicate(seq, pred) {
                    all.append(&mut seqs);
                }
            }
            if all.is_empty() {
                None
            } else {
                Some(wrap_sequences(all))
            }
        }
    }
}

fn wrap_sequences(seqs: Vec<Sequence>) -> Temporal {
    if seqs.len() == 1 {
        Temporal::Sequence(seqs.into_iter().next().unwrap())
    } else {
        Temporal::SequenceSet(SequenceSet::new(seqs).expect("restriction always yields a normalizable sequence set"))
    }
}

/// Splits `seq` into the maximal sub-sequences where `pred` holds, per spec
/// §4.4 ("For Sequence/linear inputs the result is always a SequenceSet").
fn restrict_sequence_by_predicate(seq: &Sequence, pred: impl Fn(&BaseValue) -> bool) -> Option<Vec<Sequence>> {
    let instants = seq.instants();
    let mut out = Vec::new();
    let mut run: Vec<Instant> = Vec::new();

    for inst in instants {
        if pred(&inst.value) {
            run.push(inst.clone());
        } else if !run.is_empty() {
            out.push(flush_run(&mut run, seq));
        }
    }
    if !run.is_empty() {
        out.push(flush_run(&mut run, seq));
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn flush_run(run: &mut Vec<Instant>, seq: &Sequence) -> Sequence {
    let taken = std::mem::take(run);
    let single = taken.len() == 1;
    Sequence::new(taken, true, single || seq.upper_inc(), seq.flags()).expect("a contiguous sub-run of a valid sequence is itself valid")
}

// ── Time-domain restriction ──

pub fn at_timestamp(temp: &Temporal, t: Timestamp) -> Option<Temporal> {
    temp.value_at(t).map(|v| Temporal::Instant(Instant::new(v, t)))
}

pub fn minus_timestamp(temp: &Temporal, t: Timestamp) -> Option<Temporal> {
    match temp {
        Temporal::Instant(i) => if i.t == t { None } else { Some(temp.clone()) },
        Temporal::InstantSet(s) => {
            let kept: Vec<Instant> = s.instants().iter().filter(|i| i.t != t).cloned().collect();
            if kept.is_empty() {
                None
            } else {
                crate::temporal::InstantSet::new(kept, s.flags()).ok().map(Temporal::InstantSet)
            }
        }
        Temporal::Sequence(seq) => restrict_to_periodset_minus_point(seq, t),
        Temporal::SequenceSet(ss) => {
            let mut seqs = Vec::new();
            for seq in ss.sequences() {
                if let Some(r) = restrict_to_periodset_minus_point(seq, t) {
                    match r {
                        Temporal::Sequence(s) => seqs.push(s),
                        Temporal::SequenceSet(s2) => seqs.extend(s2.sequences().iter().cloned()),
                        _ => {}
                    }
                }
            }
            if seqs.is_empty() {
                None
            } else {
                Some(wrap_sequences(seqs))
            }
        }
    }
}

/// `T at {t1, t2, ...}`: one instant per timestamp in the set that `T` is
/// defined at.
pub fn at_timestamp_set(temp: &Temporal, ts: &TimestampSet) -> Option<Temporal> {
    let instants: Vec<Instant> = ts.timestamps().iter().filter_map(|t| temp.value_at(*t).map(|v| Instant::new(v, *t))).collect();
    if instants.is_empty() {
        None
    } else if instants.len() == 1 {
        Some(Temporal::Instant(instants.into_iter().next().unwrap()))
    } else {
        crate::temporal::InstantSet::new(instants, temp.flags()).ok().map(Temporal::InstantSet)
    }
}

/// `T minus {t1, t2, ...}`: cut each timestamp in the set out in turn.
pub fn minus_timestamp_set(temp: &Temporal, ts: &TimestampSet) -> Option<Temporal> {
    let mut current = Some(temp.clone());
    for t in ts.timestamps() {
        current = current.and_then(|c| minus_timestamp(&c, *t));
    }
    current
}

fn restrict_to_periodset_minus_point(seq: &Sequence, t: Timestamp) -> Option<Temporal> {
    if !seq.period().contains_value(&t) {
        return Some(Temporal::Sequence(seq.clone()));
    }
    let instants = seq.instants();
    let before: Vec<Instant> = instants.iter().filter(|i| i.t < t).cloned().collect();
    let after: Vec<Instant> = instants.iter().filter(|i| i.t > t).cloned().collect();
    let mut out = Vec::new();
    if !before.is_empty() {
        out.push(Sequence::new(before, seq.lower_inc(), false, seq.flags()).ok()?);
    }
    if !after.is_empty() {
        out.push(Sequence::new(after, false, seq.upper_inc(), seq.flags()).ok()?);
    }
    if out.is_empty() {
        None
    } else {
        Some(wrap_sequences(out))
    }
}

/// `T at period`: bounding-box short-circuit first, then clip each
/// sequence's instants to the period, extending the previous value to the
/// clip boundary for stepwise sequences (spec §4.4 "Step-interpolation...
/// extend the previous value").
pub fn at_period(temp: &Temporal, period: &Period) -> Option<Temporal> {
    if !temp.bounding_period().overlaps(period) {
        return None;
    }
    match temp {
        Temporal::Instant(i) => if period.contains_value(&i.t) { Some(temp.clone()) } else { None },
        Temporal::InstantSet(s) => {
            let kept: Vec<Instant> = s.instants().iter().filter(|i| period.contains_value(&i.t)).cloned().collect();
            if kept.is_empty() {
                None
            } else {
                crate::temporal::InstantSet::new(kept, s.flags()).ok().map(Temporal::InstantSet)
            }
        }
        Temporal::Sequence(seq) => clip_sequence_to_period(seq, period).map(Temporal::Sequence),
        Temporal::SequenceSet(ss) => {
            let seqs: Vec<Sequence> = ss.sequences().iter().filter_map(|s| clip_sequence_to_period(s, period)).collect();
            if seqs.is_empty() {
                None
            } else {
                Some(wrap_sequences(seqs))
            }
        }
    }
}

pub fn minus_period(temp: &Temporal, period: &Period) -> Option<Temporal> {
    if !temp.bounding_period().overlaps(period) {
        return Some(temp.clone());
    }
    let full = PeriodSet::new(vec![temp.bounding_period()]).ok()?;
    let cut = PeriodSet::new(vec![period.clone()]).ok()?;
    let remaining = full.minus(&cut)?;
    at_periodset(temp, &remaining)
}

pub fn at_periodset(temp: &Temporal, periods: &PeriodSet) -> Option<Temporal> {
    let mut results: Vec<Sequence> = Vec::new();
    let mut instant_results: Vec<Instant> = Vec::new();
    for p in periods.spans() {
        match at_period(temp, p) {
            Some(Temporal::Sequence(s)) => results.push(s),
            Some(Temporal::SequenceSet(ss)) => results.extend(ss.sequences().iter().cloned()),
            Some(Temporal::Instant(i)) => instant_results.push(i),
            Some(Temporal::InstantSet(s)) => instant_results.extend(s.instants().iter().cloned()),
            _ => {}
        }
    }
    if !results.is_empty() {
        Some(wrap_sequences(results))
    } else if !instant_results.is_empty() {
        if instant_results.len() == 1 {
            Some(Temporal::Instant(instant_results.into_iter().next().unwrap()))
        } else {
            crate::temporal::InstantSet::new(instant_results, temp.flags()).ok().map(Temporal::InstantSet)
        }
    } else {
        None
    }
}

/// `T minus periodset`: the full bounding period minus the cut periods, then
/// restricted back in (mirrors `minus_period`'s pattern one level up).
pub fn minus_periodset(temp: &Temporal, periods: &PeriodSet) -> Option<Temporal> {
    let full = PeriodSet::new(vec![temp.bounding_period()]).ok()?;
    let remaining = full.minus(periods)?;
    at_periodset(temp, &remaining)
}

/// Clip a sequence to a period, applying the trailing-constant extension
/// rule for stepwise sequences when the clip lands strictly inside the
/// sequence's last half-open instant run.
fn clip_sequence_to_period(seq: &Sequence, period: &Period) -> Option<Sequence> {
    let clipped = seq.period().intersection(period)?;
    let mut instants: Vec<Instant> = seq.instants().iter().filter(|i| clipped.contains_value(&i.t)).cloned().collect();

    if instants.is_empty() {
        return None;
    }

    // If the clip's lower bound falls strictly inside the sequence (not on
    // an existing instant), synthesize the interpolated value there.
    if clipped.lower() < &instants[0].t {
        if let Some(v) = seq.value_at(*clipped.lower()) {
            instants.insert(0, Instant::new(v, *clipped.lower()));
        }
    }
    if clipped.upper() > &instants[instants.len() - 1].t {
        if let Some(v) = seq.value_at(*clipped.upper()) {
            instants.push(Instant::new(v, *clipped.upper()));
        }
    }

    Sequence::new(instants, clipped.lower_inc(), clipped.upper_inc(), seq.flags()).ok()
}

// ── §4.4.1 Point restriction to geometry ──

/// A closed 2D polygon (ring of vertices, implicitly closed back to the
/// first point) — the only geometry representation this core needs, since
/// arbitrary-geometry support is explicitly delegated to "an external 2D
/// geometry engine" by spec §4.4.1 and out of scope here.
#[derive(Debug, Clone)]
pub struct Polygon2D {
    pub vertices: Vec<Point2D>,
}

impl Polygon2D {
    fn edges(&self) -> Vec<(Point2D, Point2D)> {
        let n = self.vertices.len();
        (0..n).map(|i| (self.vertices[i], self.vertices[(i + 1) % n])).collect()
    }

    fn bbox(&self) -> Bbox2D {
        let xmin = self.vertices.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let ymin = self.vertices.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let xmax = self.vertices.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let ymax = self.vertices.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Bbox2D { xmin, ymin, xmax, ymax }
    }

    /// Standard ray-casting point-in-polygon test.
    pub fn contains_point(&self, p: Point2D) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            let intersects = (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if intersects {
                inside = !inside;
            }
        }
        inside
    }
}

/// §4.4.1: restrict a temporal point to the interior of `geometry`, optional
/// `z_span` and optional `period`. Step 1 (period pre-filter) and the
/// time-recovery of steps 3–6 are implemented directly; step 2's
/// "self-intersection decomposition" is unnecessary for this restriction
/// since we intersect the trajectory segment-by-segment rather than as one
/// linestring, which already isolates each self-intersecting loop.
pub fn at_geometry(temp: &Temporal, geometry: &Polygon2D, z_span: Option<&Span<f64>>, period: Option<&Period>) -> Result<Option<Temporal>> {
    let temp = match period {
        Some(p) => match at_period(temp, p) {
            Some(t) => t,
            None => return Ok(None),
        },
        None => temp.clone(),
    };

    let periods = match &temp {
        Temporal::Instant(i) => {
            let p2 = i.value.as_point2d().ok_or_else(|| crate::error::Error::UnsupportedOperation("at_geometry requires a point base type".into()))?;
            if geometry.contains_point(p2) {
                Some(PeriodSet::new(vec![Period::new(i.t, i.t, true, true)?])?)
            } else {
                None
            }
        }
        Temporal::InstantSet(s) => {
            let matching: Vec<Period> = s
                .instants()
                .iter()
                .filter(|i| i.value.as_point2d().map(|p| geometry.contains_point(p)).unwrap_or(false))
                .map(|i| Period::new(i.t, i.t, true, true).unwrap())
                .collect();
            if matching.is_empty() {
                None
            } else {
                Some(PeriodSet::new(matching)?)
            }
        }
        Temporal::Sequence(seq) => geometry_periods_for_sequence(seq, geometry)?,
        Temporal::SequenceSet(ss) => {
            let mut all = Vec::new();
            for seq in ss.sequences() {
                if let Some(ps) = geometry_periods_for_sequence(seq, geometry)? {
                    all.extend(ps.spans().iter().cloned());
                }
            }
            if all.is_empty() {
                None
            } else {
                Some(PeriodSet::new(all)?)
            }
        }
    };

    let mut result = match periods {
        Some(ps) => at_periodset(&temp, &ps),
        None => None,
    };

    if let (Some(r), Some(zs)) = (&result, z_span) {
        result = restrict_z_span(r, zs);
    }

    Ok(result)
}

pub fn minus_geometry(temp: &Temporal, geometry: &Polygon2D, z_span: Option<&Span<f64>>, period: Option<&Period>) -> Result<Option<Temporal>> {
    match at_geometry(temp, geometry, z_span, period)? {
        Some(at_result) => {
            let full = PeriodSet::new(vec![temp.bounding_period()])?;
            let at_periods = PeriodSet::new(vec![at_result.bounding_period()])?;
            match full.minus(&at_periods) {
                Some(remaining) => Ok(at_periodset(temp, &remaining)),
                None => Ok(None),
            }
        }
        None => Ok(Some(temp.clone())),
    }
}

fn restrict_z_span(temp: &Temporal, z_span: &Span<f64>) -> Option<Temporal> {
    restrict_by_predicate(temp, |v| v.as_point3d().map(|p| z_span.contains_value(&p.z)).unwrap_or(true))
}

/// For a linear sequence of 2D/3D points, find the periods during which the
/// trajectory lies inside `geometry`, per §4.4.1 steps 3–5: bbox-pruned
/// segment/edge intersection, mapped back to time by linear parameterization.
fn geometry_periods_for_sequence(seq: &Sequence, geometry: &Polygon2D) -> Result<Option<PeriodSet>> {
    if seq.interp() != Interpolation::Linear {
        // Stepwise/discrete: per-instant point-in-polygon test (§4.4.2 "Stepwise
        // sequences apply per-instant point-in-box tests", generalized to polygons).
        let matching: Vec<Period> = seq
            .instants()
            .iter()
            .filter(|i| i.value.as_point2d().map(|p| geometry.contains_point(p)).unwrap_or(false))
            .map(|i| Period::new(i.t, i.t, true, true).unwrap())
            .collect();
        return Ok(if matching.is_empty() { None } else { Some(PeriodSet::new(matching)?) });
    }

    let gbbox = geometry.bbox();
    let mut periods: Vec<Period> = Vec::new();
    let instants = seq.instants();

    for w in instants.windows(2) {
        let p0 = w[0].value.as_point2d().ok_or_else(|| crate::error::Error::UnsupportedOperation("requires point base type".into()))?;
        let p1 = w[1].value.as_point2d().ok_or_else(|| crate::error::Error::UnsupportedOperation("requires point base type".into()))?;
        let t0 = w[0].t;
        let t1 = w[1].t;
        let seg_bbox = Bbox2D::of_segment(p0, p1);
        if !seg_bbox.overlaps(&gbbox) {
            continue;
        }

        // Collect critical parametric fractions: segment endpoints plus every
        // edge crossing, then classify each sub-interval by its midpoint.
        let mut fracs: Vec<f64> = vec![0.0, 1.0];
        for (ea, eb) in geometry.edges() {
            if let SegmentIntersection::Point { t, .. } = segment_intersection(p0, p1, ea, eb) {
                fracs.push(t);
            }
        }
        fracs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        fracs.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        for pair in fracs.windows(2) {
            let (f0, f1) = (pair[0], pair[1]);
            let mid = p0.lerp(&p1, (f0 + f1) / 2.0);
            if geometry.contains_point(mid) {
                let span_us = (t1 - t0).num_microseconds().unwrap_or(0) as f64;
                let start = t0 + chrono::Duration::microseconds((span_us * f0).round() as i64);
                let end = t0 + chrono::Duration::microseconds((span_us * f1).round() as i64);
                periods.push(Period::new(start, end, true, true)?);
            }
        }
    }

    if periods.is_empty() {
        Ok(None)
    } else {
        Ok(Some(PeriodSet::new(periods)?))
    }
}

// ── §4.4.2 Point restriction to STBox (Liang-Barsky 3D clipping) ──

#[derive(Debug, Clone, Copy)]
pub struct StBoxFilter {
    pub bbox: Box3D,
    pub border_inc: bool,
}

/// Restrict a temporal point to an STBox. Stepwise sequences use per-instant
/// point-in-box tests; linear sequences use the Liang-Barsky clipper.
pub fn at_stbox(temp: &Temporal, filter: StBoxFilter) -> Result<Option<Temporal>> {
    match temp {
        Temporal::Sequence(seq) if seq.interp() == Interpolation::Linear => {
            let mut periods = Vec::new();
            for w in seq.instants().windows(2) {
                let p0 = point3d_of(&w[0].value)?;
                let p1 = point3d_of(&w[1].value)?;
                if let Some((t0, t1)) = liang_barsky_clip_3d(p0, p1, filter.bbox, filter.border_inc) {
                    let span_us = (w[1].t - w[0].t).num_microseconds().unwrap_or(0) as f64;
                    let start = w[0].t + chrono::Duration::microseconds((span_us * t0).round() as i64);
                    let end = w[0].t + chrono::Duration::microseconds((span_us * t1).round() as i64);
                    periods.push(Period::new(start, end, true, true)?);
                }
            }
            if periods.is_empty() {
                Ok(None)
            } else {
                let ps = PeriodSet::new(periods)?;
                Ok(at_periodset(temp, &ps))
            }
        }
        _ => Ok(restrict_by_predicate(temp, |v| point3d_of(v).map(|p| filter.bbox.contains_point(p, filter.border_inc)).unwrap_or(false))),
    }
}

/// `T minus STBox` (mirrors `minus_geometry`'s at-then-subtract pattern).
pub fn minus_stbox(temp: &Temporal, filter: StBoxFilter) -> Result<Option<Temporal>> {
    match at_stbox(temp, filter)? {
        Some(at_result) => {
            let full = PeriodSet::new(vec![temp.bounding_period()])?;
            let at_periods = PeriodSet::new(vec![at_result.bounding_period()])?;
            match full.minus(&at_periods) {
                Some(remaining) => Ok(at_periodset(temp, &remaining)),
                None => Ok(None),
            }
        }
        None => Ok(Some(temp.clone())),
    }
}

fn point3d_of(v: &BaseValue) -> Result<Point3D> {
    v.as_point3d()
        .or_else(|| v.as_point2d().map(|p| Point3D::new(p.x, p.y, 0.0)))
        .ok_or_else(|| crate::error::Error::UnsupportedOperation("STBox restriction requires a point base type".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn linear_point_seq() -> Sequence {
        let flags = crate::temporal::TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: false };
        Sequence::new(
            vec![
                Instant::new(BaseValue::Point2D(Point2D::new(0.0, 0.0)), t(2000, 1, 1, 0)),
                Instant::new(BaseValue::Point2D(Point2D::new(10.0, 10.0)), t(2000, 1, 1, 10)),
            ],
            true,
            true,
            flags,
        )
        .unwrap()
    }

    /// Scenario 4 (spec §8): point restriction to an axis-aligned box.
    #[test]
    fn scenario_4_restrict_point_to_box() {
        let seq = linear_point_seq();
        let square = Polygon2D { vertices: vec![Point2D::new(2.0, 2.0), Point2D::new(8.0, 2.0), Point2D::new(8.0, 8.0), Point2D::new(2.0, 8.0)] };
        let result = at_geometry(&Temporal::Sequence(seq), &square, None, None).unwrap().unwrap();
        let period = result.bounding_period();
        assert_eq!(*period.lower(), t(2000, 1, 1, 2));
        assert_eq!(*period.upper(), t(2000, 1, 1, 8));
    }

    #[test]
    fn at_minus_partition_law_holds_for_value_restriction() {
        let flags = crate::temporal::TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Step, byvalue: true };
        let seq = Sequence::new(
            vec![
                Instant::new(BaseValue::Int(1), t(2000, 1, 1, 0)),
                Instant::new(BaseValue::Int(2), t(2000, 1, 1, 1)),
                Instant::new(BaseValue::Int(1), t(2000, 1, 1, 2)),
            ],
            true,
            true,
            flags,
        )
        .unwrap();
        let temp = Temporal::Sequence(seq);
        let at = at_value(&temp, &BaseValue::Int(1));
        let minus = minus_value(&temp, &BaseValue::Int(1));
        assert!(at.is_some());
        assert!(minus.is_some());
    }

    #[test]
    fn at_minus_value_set_partition_law_holds() {
        let flags = crate::temporal::TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Step, byvalue: true };
        let seq = Sequence::new(
            vec![
                Instant::new(BaseValue::Int(1), t(2000, 1, 1, 0)),
                Instant::new(BaseValue::Int(2), t(2000, 1, 1, 1)),
                Instant::new(BaseValue::Int(3), t(2000, 1, 1, 2)),
            ],
            true,
            true,
            flags,
        )
        .unwrap();
        let temp = Temporal::Sequence(seq);
        let values = [BaseValue::Int(1), BaseValue::Int(3)];
        assert!(at_value_set(&temp, &values).is_some());
        assert!(minus_value_set(&temp, &values).is_some());
    }

    #[test]
    fn at_minus_timestamp_set_round_trips_to_the_whole_instant_set() {
        let instants = vec![Instant::new(BaseValue::Int(1), t(2000, 1, 1, 0)), Instant::new(BaseValue::Int(2), t(2000, 1, 1, 1)), Instant::new(BaseValue::Int(3), t(2000, 1, 1, 2))];
        let temp = Temporal::InstantSet(crate::temporal::InstantSet::new(instants, crate::temporal::TemporalFlags::discrete()).unwrap());
        let ts = TimestampSet::new(vec![t(2000, 1, 1, 0), t(2000, 1, 1, 2)]).unwrap();

        let at = at_timestamp_set(&temp, &ts).unwrap();
        match at {
            Temporal::InstantSet(s) => assert_eq!(s.instants().len(), 2),
            other => panic!("expected an InstantSet, got {other:?}"),
        }

        let minus = minus_timestamp_set(&temp, &ts).unwrap();
        match minus {
            Temporal::Instant(i) => assert_eq!(i.value, BaseValue::Int(2)),
            other => panic!("expected the single remaining instant, got {other:?}"),
        }
    }

    #[test]
    fn minus_spanset_removes_the_matching_runs() {
        let flags = crate::temporal::TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Step, byvalue: true };
        let seq = Sequence::new(
            vec![
                Instant::new(BaseValue::Float(1.0), t(2000, 1, 1, 0)),
                Instant::new(BaseValue::Float(5.0), t(2000, 1, 1, 1)),
                Instant::new(BaseValue::Float(1.0), t(2000, 1, 1, 2)),
            ],
            true,
            true,
            flags,
        )
        .unwrap();
        let temp = Temporal::Sequence(seq);
        let spans = crate::spanset::SpanSet::new(vec![crate::span::Span::new(4.0, 6.0, true, true).unwrap()]).unwrap();
        let result = minus_spanset(&temp, &spans).unwrap();
        let period = result.bounding_period();
        assert_eq!(*period.lower(), t(2000, 1, 1, 0));
        assert_eq!(*period.upper(), t(2000, 1, 1, 2));
    }

    #[test]
    fn minus_periodset_cuts_the_named_periods_out() {
        let flags = crate::temporal::TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Step, byvalue: true };
        let seq = Sequence::new(
            vec![Instant::new(BaseValue::Int(1), t(2000, 1, 1, 0)), Instant::new(BaseValue::Int(1), t(2000, 1, 1, 10))],
            true,
            true,
            flags,
        )
        .unwrap();
        let temp = Temporal::Sequence(seq);
        let cut = PeriodSet::new(vec![Period::new(t(2000, 1, 1, 4), t(2000, 1, 1, 6), true, true).unwrap()]).unwrap();
        let result = minus_periodset(&temp, &cut).unwrap();
        match result {
            Temporal::SequenceSet(ss) => assert_eq!(ss.sequences().len(), 2),
            other => panic!("expected a SequenceSet split around the cut period, got {other:?}"),
        }
    }

    #[test]
    fn minus_stbox_is_the_complement_of_at_stbox() {
        let seq = linear_point_seq();
        let filter = StBoxFilter { bbox: Box3D { xmin: 2.0, ymin: 2.0, zmin: -1.0, xmax: 8.0, ymax: 8.0, zmax: 1.0 }, border_inc: true };
        let minus = minus_stbox(&Temporal::Sequence(seq), filter).unwrap().unwrap();
        match minus {
            Temporal::SequenceSet(ss) => {
                assert_eq!(ss.sequences().len(), 2);
                assert_eq!(*ss.sequences()[0].period().lower(), t(2000, 1, 1, 0));
                assert_eq!(*ss.sequences()[1].period().upper(), t(2000, 1, 1, 10));
            }
            other => panic!("expected a SequenceSet split around the at-result, got {other:?}"),
        }
    }

    #[test]
    fn liang_barsky_stbox_restriction_clips_diagonal() {
        let flags = crate::temporal::TemporalFlags { has_z: true, is_geodetic: false, interp: Interpolation::Linear, byvalue: false };
        let seq = Sequence::new(
            vec![
                Instant::new(BaseValue::Point3D(Point3D::new(0.0, 0.0, 0.0)), t(2000, 1, 1, 0)),
                Instant::new(BaseValue::Point3D(Point3D::new(10.0, 10.0, 0.0)), t(2000, 1, 1, 10)),
            ],
            true,
            true,
            flags,
        )
        .unwrap();
        let filter = StBoxFilter { bbox: Box3D { xmin: 2.0, ymin: 2.0, zmin: -1.0, xmax: 8.0, ymax: 8.0, zmax: 1.0 }, border_inc: true };
        let result = at_stbox(&Temporal::Sequence(seq), filter).unwrap().unwrap();
        let period = result.bounding_period();
        assert_eq!(*period.lower(), t(2000, 1, 1, 2));
        assert_eq!(*period.upper(), t(2000, 1, 1, 8));
    }
}
