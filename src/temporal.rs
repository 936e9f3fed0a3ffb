//! The temporal value model (spec §3.4, §3.5, §3.6): a tagged union of four
//! subtypes — Instant, InstantSet, Sequence, SequenceSet — carrying a
//! `BaseValue` payload plus a lazily-summarized bounding box.
//!
//! Grounded on §9 Design Notes ("a discriminated variant with per-variant
//! owned storage, not a virtual hierarchy") and on the teacher's own
//! `PlanAction`/`MergeMode`-style closed enums for tagged state.

use crate::basetype::{BaseTypeTag, BaseValue};
use crate::error::{Error, Result};
use crate::span::Span;
use crate::timeset::{Period, Timestamp};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Discrete,
    Step,
    Linear,
}

/// Per-value packed flags (spec §3.4). `byvalue` mirrors the base type's
/// storage class in the original system (fixed-width scalars passed inline
/// vs. variable-length/pointer payloads like text and points) — carried here
/// even though Rust's owned `BaseValue` enum stores every variant inline,
/// since §3.4 lists it as one of the four packed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalFlags {
    pub has_z: bool,
    pub is_geodetic: bool,
    pub interp: Interpolation,
    pub byvalue: bool,
}

impl TemporalFlags {
    pub fn discrete() -> Self {
        TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Discrete, byvalue: true }
    }

    /// Derive `byvalue` from a base type tag: `Bool`/`Int`/`BigInt`/`Float`/
    /// `Date`/`TimestampTz` are fixed-width scalars (byvalue); `Text` and the
    /// point families are variable-length/pointer payloads (byref).
    pub fn byvalue_for(tag: crate::basetype::BaseTypeTag) -> bool {
        use crate::basetype::BaseTypeTag;
        matches!(tag, BaseTypeTag::Bool | BaseTypeTag::Int | BaseTypeTag::BigInt | BaseTypeTag::Float | BaseTypeTag::Date | BaseTypeTag::TimestampTz)
    }
}

/// Numeric bounding box: value span + time span (spec §3.4).
#[derive(Debug, Clone, PartialEq)]
pub struct TBox {
    pub value_span: Span<f64>,
    pub period: Period,
}

/// Spatiotemporal bounding box (spec §3.4).
#[derive(Debug, Clone, PartialEq)]
pub struct STBox {
    pub xmin: f64,
    pub ymin: f64,
    pub zmin: Option<f64>,
    pub xmax: f64,
    pub ymax: f64,
    pub zmax: Option<f64>,
    pub srid: Option<i32>,
    pub period: Period,
    pub geodetic: bool,
}

/// The bounding box cache carried by every temporal value (spec §3.4).
#[derive(Debug, Clone, PartialEq)]
pub enum Bbox {
    Period(Period),
    TBox(TBox),
    STBox(STBox),
}

impl Bbox {
    pub fn period(&self) -> &Period {
        match self {
            Bbox::Period(p) => p,
            Bbox::TBox(b) => &b.period,
            Bbox::STBox(b) => &b.period,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instant {
    pub value: BaseValue,
    pub t: Timestamp,
}

impl Instant {
    pub fn new(value: BaseValue, t: Timestamp) -> Self {
        Instant { value, t }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstantSet {
    instants: Vec<Instant>,
    flags: TemporalFlags,
}

impl InstantSet {
    pub fn new(instants: Vec<Instant>, flags: TemporalFlags) -> Result<Self> {
        if instants.is_empty() {
            return Err(Error::invalid_input(0, "an InstantSet requires at least one instant"));
        }
        for w in instants.windows(2) {
            if w[0].t >= w[1].t {
                return Err(Error::invalid_input(0, "InstantSet timestamps must be strictly increasing"));
            }
        }
        Ok(InstantSet { instants, flags })
    }

    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    pub fn flags(&self) -> TemporalFlags {
        self.flags
    }

    pub fn bounding_period(&self) -> Period {
        Period::new(self.instants[0].t, self.instants[self.instants.len() - 1].t, true, true)
            .expect("bounding period of a non-empty InstantSet always constructs")
    }

    pub fn value_at(&self, t: Timestamp) -> Option<&BaseValue> {
        self.instants.iter().find(|i| i.t == t).map(|i| &i.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    instants: Vec<Instant>,
    period: Period,
    interp: Interpolation,
    flags: TemporalFlags,
}

impl Sequence {
    /// Construct a sequence, applying the normalization of spec §3.5:
    /// collapse consecutive-equal-value linear instants (collinear-point
    /// removal for points, value-equality otherwise) and adjacent stepwise
    /// instants sharing a value.
    pub fn new(mut instants: Vec<Instant>, lower_inc: bool, upper_inc: bool, flags: TemporalFlags) -> Result<Self> {
        if instants.is_empty() {
            return Err(Error::invalid_input(0, "a Sequence requires at least one instant"));
        }
        for w in instants.windows(2) {
            if w[0].t >= w[1].t {
                return Err(Error::invalid_input(0, "Sequence timestamps must be strictly increasing"));
            }
        }
        if flags.interp == Interpolation::Linear {
            let tag = instants[0].value.tag(flags.is_geodetic);
            if !tag.supports_linear() {
                return Err(Error::UnsupportedOperation(format!("linear interpolation is not defined over {:?}", tag)));
            }
        }

        normalize_instants(&mut instants, flags.interp);

        if instants.len() == 1 && !(lower_inc && upper_inc) {
            return Err(Error::invalid_input(0, "a length-1 sequence requires both bounds inclusive"));
        }

        // Trailing-constant rule (spec §3.4): a half-open stepwise sequence's
        // last instant must repeat the value of the one before it.
        if flags.interp == Interpolation::Step && !upper_inc && instants.len() >= 2 {
            let n = instants.len();
            if !instants[n - 1].value.values_equal(&instants[n - 2].value) {
                return Err(Error::invalid_input(
                    0,
                    "half-open stepwise sequence's trailing instant must equal the previous instant's value",
                ));
            }
        }

        let period = Period::new(instants[0].t, instants[instants.len() - 1].t, lower_inc, upper_inc)?;

        Ok(Sequence { instants, period, interp: flags.interp, flags })
    }

    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn interp(&self) -> Interpolation {
        self.interp
    }

    pub fn flags(&self) -> TemporalFlags {
        self.flags
    }

    pub fn lower_inc(&self) -> bool {
        self.period.lower_inc()
    }

    pub fn upper_inc(&self) -> bool {
        self.period.upper_inc()
    }

    /// Value at time `t`, applying the sequence's interpolation mode. `None`
    /// if `t` falls outside the sequence's period.
    pub fn value_at(&self, t: Timestamp) -> Option<BaseValue> {
        if !self.period.contains_value(&t) {
            return None;
        }
        let idx = self.instants.partition_point(|i| i.t <= t);
        if idx == 0 {
            return Some(self.instants[0].value.clone());
        }
        if idx - 1 < self.instants.len() && self.instants[idx - 1].t == t {
            return Some(self.instants[idx - 1].value.clone());
        }
        if idx >= self.instants.len() {
            // t == last instant's time, already handled above; otherwise out of range,
            // except for the half-open stepwise trailing-constant rule.
            return Some(self.instants[self.instants.len() - 1].value.clone());
        }
        let before = &self.instants[idx - 1];
        let after = &self.instants[idx];
        match self.interp {
            Interpolation::Discrete => None,
            Interpolation::Step => Some(before.value.clone()),
            Interpolation::Linear => {
                let span = (after.t - before.t).num_microseconds().unwrap_or(1).max(1) as f64;
                let elapsed = (t - before.t).num_microseconds().unwrap_or(0) as f64;
                let frac = elapsed / span;
                before.value.lerp(&after.value, frac)
            }
        }
    }
}

/// Collapse runs of instants that the normalizer removes per spec §3.5.
fn normalize_instants(instants: &mut Vec<Instant>, interp: Interpolation) {
    match interp {
        Interpolation::Step => {
            let mut out: Vec<Instant> = Vec::with_capacity(instants.len());
            for inst in instants.drain(..) {
                if let Some(last) = out.last() {
                    if last.value.values_equal(&inst.value) {
                        continue;
                    }
                }
                out.push(inst);
            }
            *instants = out;
        }
        Interpolation::Linear => {
            let mut out: Vec<Instant> = Vec::with_capacity(instants.len());
            for inst in instants.drain(..) {
                let is_redundant = match (out.len() >= 2, out.last()) {
                    (true, Some(_)) => {
                        let a = &out[out.len() - 2];
                        let b = &out[out.len() - 1];
                        // Collinearity (or value-equality for non-points): a, b, inst
                        // all denote the same linear function of time.
                        is_collinear_in_time(a, b, &inst)
                    }
                    _ => false,
                };
                if is_redundant {
                    out.pop();
                }
                out.push(inst);
            }
            *instants = out;
        }
        Interpolation::Discrete => {}
    }
}

/// True when instant `b` lies exactly on the line through `a` and `c` in
/// (time, value) space — the linear-sequence collinear-point-removal rule.
fn is_collinear_in_time(a: &Instant, b: &Instant, c: &Instant) -> bool {
    let ta = (b.t - a.t).num_microseconds().unwrap_or(0) as f64;
    let tc = (c.t - b.t).num_microseconds().unwrap_or(0) as f64;
    if ta <= 0.0 || tc <= 0.0 {
        return false;
    }
    let frac = ta / (ta + tc);
    match a.value.lerp(&c.value, frac) {
        Some(expected) => values_close(&expected, &b.value),
        None => a.value.values_equal(&b.value) && b.value.values_equal(&c.value),
    }
}

fn values_close(a: &BaseValue, b: &BaseValue) -> bool {
    const EPS: f64 = 1e-9;
    match (a, b) {
        (BaseValue::Float(x), BaseValue::Float(y)) => (x - y).abs() < EPS,
        (BaseValue::Point2D(x), BaseValue::Point2D(y)) => x.distance(y) < EPS,
        (BaseValue::Point3D(x), BaseValue::Point3D(y)) => {
            let dx = x.x - y.x;
            let dy = x.y - y.y;
            let dz = x.z - y.z;
            (dx * dx + dy * dy + dz * dz).sqrt() < EPS
        }
        _ => a.values_equal(b),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSet {
    sequences: Vec<Sequence>,
    flags: TemporalFlags,
}

impl SequenceSet {
    /// Normalize a bag of sequences: sort by period lower bound, splice
    /// adjacent sequences that share a boundary value under the same
    /// interpolation without loss (spec §3.4/§3.5).
    pub fn new(mut sequences: Vec<Sequence>) -> Result<Self> {
        if sequences.is_empty() {
            return Err(Error::invalid_input(0, "a SequenceSet requires at least one sequence"));
        }
        let flags = sequences[0].flags();
        sequences.sort_by(|a, b| a.period().lower().cmp(b.period().lower()));

        let mut merged: Vec<Sequence> = Vec::with_capacity(sequences.len());
        for seq in sequences {
            let can_splice = merged.last().map_or(false, |prev| can_splice_sequences(prev, &seq));
            if can_splice {
                let prev = merged.pop().unwrap();
                merged.push(splice_sequences(prev, seq));
            } else {
                merged.push(seq);
            }
        }

        Ok(SequenceSet { sequences: merged, flags })
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn flags(&self) -> TemporalFlags {
        self.flags
    }

    pub fn bounding_period(&self) -> Period {
        let first = &self.sequences[0];
        let last = &self.sequences[self.sequences.len() - 1];
        Period::new(*first.period().lower(), *last.period().upper(), first.lower_inc(), last.upper_inc())
            .expect("bounding period of a non-empty SequenceSet always constructs")
    }

    pub fn value_at(&self, t: Timestamp) -> Option<BaseValue> {
        self.sequences.iter().find_map(|s| s.value_at(t))
    }
}

fn can_splice_sequences(a: &Sequence, b: &Sequence) -> bool {
    if a.interp() != b.interp() {
        return false;
    }
    let touching = a.period().upper() == b.period().lower() && (a.upper_inc() || b.lower_inc());
    if !touching {
        return a.period().overlaps(b.period());
    }
    let a_last = &a.instants()[a.instants().len() - 1];
    let b_first = &b.instants()[0];
    a_last.value.values_equal(&b_first.value)
}

fn splice_sequences(a: Sequence, b: Sequence) -> Sequence {
    let mut instants = a.instants().to_vec();
    let b_instants = b.instants();
    let start = if instants.last().map_or(false, |l| l.t == b_instants[0].t) { 1 } else { 0 };
    instants.extend(b_instants[start..].iter().cloned());
    Sequence::new(instants, a.lower_inc(), b.upper_inc(), a.flags())
        .expect("splicing two mergeable sequences always yields a valid sequence")
}

/// The temporal value model's tagged union (spec §3.4).
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    Instant(Instant),
    InstantSet(InstantSet),
    Sequence(Sequence),
    SequenceSet(SequenceSet),
}

impl Temporal {
    pub fn flags(&self) -> TemporalFlags {
        match self {
            Temporal::Instant(_) => TemporalFlags::discrete(),
            Temporal::InstantSet(s) => s.flags(),
            Temporal::Sequence(s) => s.flags(),
            Temporal::SequenceSet(s) => s.flags(),
        }
    }

    pub fn base_tag(&self) -> BaseTypeTag {
        let geodetic = self.flags().is_geodetic;
        match self {
            Temporal::Instant(i) => i.value.tag(geodetic),
            Temporal::InstantSet(s) => s.instants()[0].value.tag(geodetic),
            Temporal::Sequence(s) => s.instants()[0].value.tag(geodetic),
            Temporal::SequenceSet(s) => s.sequences()[0].instants()[0].value.tag(geodetic),
        }
    }

    pub fn bounding_period(&self) -> Period {
        match self {
            Temporal::Instant(i) => Period::new(i.t, i.t, true, true).unwrap(),
            Temporal::InstantSet(s) => s.bounding_period(),
            Temporal::Sequence(s) => s.period().clone(),
            Temporal::SequenceSet(s) => s.bounding_period(),
        }
    }

    /// Bounding box cache (spec §3.4): `Period` for non-numerics, `TBox` for
    /// numerics, `STBox` for points. Computed on demand from the already-owned
    /// instant data — for a model this size a per-call computation is as cheap
    /// as a memoized field read, so no `OnceCell` is introduced.
    pub fn bbox(&self) -> Bbox {
        let tag = self.base_tag();
        let period = self.bounding_period();
        if tag.is_point() {
            Bbox::STBox(self.spatial_bbox(period))
        } else if matches!(tag, BaseTypeTag::Int | BaseTypeTag::BigInt | BaseTypeTag::Float) {
            Bbox::TBox(self.numeric_bbox(period))
        } else {
            Bbox::Period(period)
        }
    }

    fn all_values(&self) -> Vec<&BaseValue> {
        match self {
            Temporal::Instant(i) => vec![&i.value],
            Temporal::InstantSet(s) => s.instants().iter().map(|i| &i.value).collect(),
            Temporal::Sequence(s) => s.instants().iter().map(|i| &i.value).collect(),
            Temporal::SequenceSet(s) => s.sequences().iter().flat_map(|seq| seq.instants().iter().map(|i| &i.value)).collect(),
        }
    }

    fn numeric_bbox(&self, period: Period) -> TBox {
        let values: Vec<f64> = self.all_values().into_iter().filter_map(|v| v.as_f64()).collect();
        let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        TBox { value_span: Span::new(lo, hi, true, true).unwrap_or_else(|_| Span::singleton(lo)), period }
    }

    fn spatial_bbox(&self, period: Period) -> STBox {
        let flags = self.flags();
        let values = self.all_values();
        let mut xmin = f64::INFINITY;
        let mut ymin = f64::INFINITY;
        let mut zmin = f64::INFINITY;
        let mut xmax = f64::NEG_INFINITY;
        let mut ymax = f64::NEG_INFINITY;
        let mut zmax = f64::NEG_INFINITY;
        let mut has_z = false;
        for v in values {
            if let Some(p3) = v.as_point3d() {
                has_z = true;
                xmin = xmin.min(p3.x);
                ymin = ymin.min(p3.y);
                zmin = zmin.min(p3.z);
                xmax = xmax.max(p3.x);
                ymax = ymax.max(p3.y);
                zmax = zmax.max(p3.z);
            } else if let Some(p2) = v.as_point2d() {
                xmin = xmin.min(p2.x);
                ymin = ymin.min(p2.y);
                xmax = xmax.max(p2.x);
                ymax = ymax.max(p2.y);
            }
        }
        STBox {
            xmin,
            ymin,
            zmin: if has_z { Some(zmin) } else { None },
            xmax,
            ymax,
            zmax: if has_z { Some(zmax) } else { None },
            srid: None,
            period,
            geodetic: flags.is_geodetic,
        }
    }

    pub fn value_at(&self, t: Timestamp) -> Option<BaseValue> {
        match self {
            Temporal::Instant(i) => if i.t == t { Some(i.value.clone()) } else { None },
            Temporal::InstantSet(s) => s.value_at(t).cloned(),
            Temporal::Sequence(s) => s.value_at(t),
            Temporal::SequenceSet(s) => s.value_at(t),
        }
    }
}

impl PartialOrd for Interpolation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let rank = |i: &Interpolation| match i {
            Interpolation::Discrete => 0,
            Interpolation::Step => 1,
            Interpolation::Linear => 2,
        };
        rank(self).partial_cmp(&rank(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn t(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn linear_flags() -> TemporalFlags {
        TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: true }
    }

    #[test]
    fn sequence_linear_value_at_midpoint() {
        let seq = Sequence::new(
            vec![Instant::new(BaseValue::Float(1.0), t(2000, 1, 1)), Instant::new(BaseValue::Float(3.0), t(2000, 1, 3))],
            true,
            true,
            linear_flags(),
        )
        .unwrap();
        let mid = seq.value_at(t(2000, 1, 2)).unwrap();
        assert_eq!(mid, BaseValue::Float(2.0));
    }

    #[test]
    fn sequence_collapses_collinear_points() {
        let seq = Sequence::new(
            vec![
                Instant::new(BaseValue::Float(1.0), t(2000, 1, 1)),
                Instant::new(BaseValue::Float(2.0), t(2000, 1, 2)),
                Instant::new(BaseValue::Float(3.0), t(2000, 1, 3)),
            ],
            true,
            true,
            linear_flags(),
        )
        .unwrap();
        assert_eq!(seq.instants().len(), 2);
    }

    #[test]
    fn sequence_rejects_linear_over_text() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: true };
        let r = Sequence::new(
            vec![Instant::new(BaseValue::Text("a".into()), t(2000, 1, 1)), Instant::new(BaseValue::Text("b".into()), t(2000, 1, 2))],
            true,
            true,
            flags,
        );
        assert!(r.is_err());
    }

    #[test]
    fn half_open_step_requires_trailing_constant() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Step, byvalue: true };
        let bad = Sequence::new(
            vec![Instant::new(BaseValue::Int(1), t(2000, 1, 1)), Instant::new(BaseValue::Int(2), t(2000, 1, 2))],
            true,
            false,
            flags,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn length_one_sequence_requires_both_bounds_inclusive() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Step, byvalue: true };
        let r = Sequence::new(vec![Instant::new(BaseValue::Int(1), t(2000, 1, 1))], true, false, flags);
        assert!(r.is_err());
    }

    #[test]
    fn sequence_set_splices_touching_sequences_with_equal_boundary() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Step, byvalue: true };
        let seq1 = Sequence::new(
            vec![Instant::new(BaseValue::Int(1), t(2000, 1, 1)), Instant::new(BaseValue::Int(2), t(2000, 1, 2))],
            true,
            true,
            flags,
        )
        .unwrap();
        let seq2 = Sequence::new(
            vec![Instant::new(BaseValue::Int(2), t(2000, 1, 2)), Instant::new(BaseValue::Int(3), t(2000, 1, 3))],
            true,
            true,
            flags,
        )
        .unwrap();
        let ss = SequenceSet::new(vec![seq1, seq2]).unwrap();
        assert_eq!(ss.sequences().len(), 1);
    }

    #[test]
    fn byvalue_for_distinguishes_scalars_from_pointer_payloads() {
        use crate::basetype::BaseTypeTag;
        assert!(TemporalFlags::byvalue_for(BaseTypeTag::Int));
        assert!(TemporalFlags::byvalue_for(BaseTypeTag::TimestampTz));
        assert!(!TemporalFlags::byvalue_for(BaseTypeTag::Text));
        assert!(!TemporalFlags::byvalue_for(BaseTypeTag::Geometry2D));
    }
}
