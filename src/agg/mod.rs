//! The aggregator (spec §4.6): `transition`/`combine`/`final` over a
//! skiplist-backed accumulator state, for the seven built-in reducers.
//!
//! This core operates at per-instant granularity: every reducer's
//! accumulator is keyed by a single timestamp rather than by a
//! `TemporalSeq`'s whole period (a deliberate simplification of
//! `original_source/src/SkipListAggregateFuncs.c`'s `temporalseq_tagg2`
//! kernel — see `DESIGN.md`'s Open Question resolution). The skiplist
//! splice-around-a-point is still the real data structure named by spec
//! §4.6; only the granularity of what it stores is narrowed.

pub mod reducers;
pub mod skiplist;

use crate::basetype::BaseValue;
use crate::error::{Error, Result};
use crate::temporal::{Instant, Temporal, TemporalFlags};
use crate::timeset::Timestamp;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::TimeZone as _;
use reducers::{AccValue, Reducer};
use skiplist::SkipList;
use std::io::{Cursor, Read, Write};

/// Aggregation state: the reducer tag plus its skiplist of per-timestamp
/// accumulators.
pub struct AggState {
    reducer: Reducer,
    list: SkipList<AccValue>,
}

impl AggState {
    pub fn new(reducer: Reducer) -> Self {
        AggState { reducer, list: SkipList::new() }
    }

    pub fn reducer(&self) -> Reducer {
        self.reducer
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

fn extract_instants(temp: &Temporal) -> Vec<(Timestamp, BaseValue)> {
    match temp {
        Temporal::Instant(i) => vec![(i.t, i.value.clone())],
        Temporal::InstantSet(s) => s.instants().iter().map(|i| (i.t, i.value.clone())).collect(),
        Temporal::Sequence(s) => s.instants().iter().map(|i| (i.t, i.value.clone())).collect(),
        Temporal::SequenceSet(s) => s.sequences().iter().flat_map(|seq| seq.instants().iter().map(|i| (i.t, i.value.clone()))).collect(),
    }
}

/// Splice one `(t, acc)` pair into `state`'s skiplist, merging with an
/// existing element at the same timestamp under the reducer's base function
/// (spec §4.6 steps 1-3, narrowed to a single-point range). Every input
/// contributes independently, including a second input that happens to lift
/// to the same accumulator value as the first (e.g. two distinct `tcount`
/// contributions, or two different sources reporting equal `tsum` values at
/// the same instant) — the reducer's own identity/no-op element is the only
/// thing that may be dropped without double-counting, and none of the seven
/// reducers here produce one mid-stream, so every merge is unconditional.
fn splice_one(state: &mut AggState, t: Timestamp, acc: AccValue) {
    let existing = state.list.extract_range(t, t);
    let merged = match existing.into_iter().next() {
        Some((_, old)) => state.reducer.merge(&old, &acc),
        None => acc,
    };
    state.list.insert(t, merged);
}

/// `transition(state, value) -> state` (spec §4.6).
pub fn transition(mut state: AggState, input: &Temporal) -> Result<AggState> {
    for (t, v) in extract_instants(input) {
        let acc = state.reducer.lift(&v)?;
        splice_one(&mut state, t, acc);
    }
    Ok(state)
}

/// `combine(state1, state2) -> state` — the out-of-order partial-aggregation
/// merge path (spec §4.6 "Combine").
pub fn combine(mut a: AggState, b: AggState) -> Result<AggState> {
    if a.reducer != b.reducer {
        return Err(Error::UnsupportedOperation("cannot combine aggregator states built with different reducers".into()));
    }
    for (t, acc) in b.list.to_vec() {
        splice_one(&mut a, t, acc);
    }
    Ok(a)
}

/// `final(state) -> Temporal` (spec §4.6): assemble the skiplist's
/// timestamp-ordered entries into a `Temporal` with discrete interpolation.
pub fn finalize(state: &AggState) -> Result<Temporal> {
    let entries = state.list.to_vec();
    if entries.is_empty() {
        return Err(Error::UnsupportedOperation("cannot finalize an empty aggregator state".into()));
    }
    let instants: Vec<Instant> = entries.into_iter().map(|(t, acc)| Instant::new(state.reducer.finalize(&acc), t)).collect();
    if instants.len() == 1 {
        Ok(Temporal::Instant(instants.into_iter().next().unwrap()))
    } else {
        Ok(Temporal::InstantSet(crate::temporal::InstantSet::new(instants, TemporalFlags::discrete())?))
    }
}

// ── State serialization (spec §4.6 "Serialization of state") ──

fn acc_tag(acc: &AccValue) -> u8 {
    match acc {
        AccValue::Int(_) => 0,
        AccValue::Float(_) => 1,
        AccValue::Bool(_) => 2,
        AccValue::AvgPair(_, _) => 3,
    }
}

/// Writes `(count, base_type_tag, [values])` per timestamp-accumulator pair,
/// enabling parallel plans to ship partial state between workers.
pub fn serialize_state(state: &AggState) -> Result<Vec<u8>> {
    let entries = state.list.to_vec();
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(entries.len() as u32).map_err(|e| Error::codec(0, e.to_string()))?;
    for (t, acc) in entries {
        out.write_i64::<LittleEndian>(t.timestamp_micros()).map_err(|e| Error::codec(0, e.to_string()))?;
        out.write_u8(acc_tag(&acc)).map_err(|e| Error::codec(0, e.to_string()))?;
        match acc {
            AccValue::Int(i) => out.write_i64::<LittleEndian>(i),
            AccValue::Float(f) => out.write_f64::<LittleEndian>(f),
            AccValue::Bool(b) => out.write_u8(if b { 1 } else { 0 }).map(|_| ()),
            AccValue::AvgPair(s, c) => out.write_f64::<LittleEndian>(s).and_then(|_| out.write_i64::<LittleEndian>(c)),
        }
        .map_err(|e| Error::codec(0, e.to_string()))?;
    }
    Ok(out)
}

pub fn deserialize_state(reducer: Reducer, bytes: &[u8]) -> Result<AggState> {
    let mut cur = Cursor::new(bytes);
    let count = cur.read_u32::<LittleEndian>().map_err(|e| Error::codec(0, e.to_string()))?;
    let mut state = AggState::new(reducer);
    for _ in 0..count {
        let micros = cur.read_i64::<LittleEndian>().map_err(|e| Error::codec(0, e.to_string()))?;
        let t = chrono::Utc.timestamp_micros(micros).single().ok_or_else(|| Error::codec(0, "timestamp out of range"))?;
        let tag = cur.read_u8().map_err(|e| Error::codec(0, e.to_string()))?;
        let acc = match tag {
            0 => AccValue::Int(cur.read_i64::<LittleEndian>().map_err(|e| Error::codec(0, e.to_string()))?),
            1 => AccValue::Float(cur.read_f64::<LittleEndian>().map_err(|e| Error::codec(0, e.to_string()))?),
            2 => AccValue::Bool(cur.read_u8().map_err(|e| Error::codec(0, e.to_string()))? != 0),
            3 => {
                let s = cur.read_f64::<LittleEndian>().map_err(|e| Error::codec(0, e.to_string()))?;
                let c = cur.read_i64::<LittleEndian>().map_err(|e| Error::codec(0, e.to_string()))?;
                AccValue::AvgPair(s, c)
            }
            other => return Err(Error::codec(0, format!("unrecognized accumulator tag {other}"))),
        };
        state.list.insert(t, acc);
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{Interpolation, Sequence};
    use chrono::{TimeZone, Utc};

    fn t(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn discrete_seq(pairs: &[(i32, Timestamp)]) -> Temporal {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Discrete, byvalue: true };
        let instants = pairs.iter().map(|(v, t)| Instant::new(BaseValue::Int(*v), *t)).collect();
        Temporal::Sequence(Sequence::new(instants, true, true, flags).unwrap())
    }

    /// Scenario 2 (spec §8): temporal integer sum.
    #[test]
    fn scenario_2_temporal_integer_sum() {
        let a = discrete_seq(&[(1, t(2000, 1, 1)), (2, t(2000, 1, 2))]);
        let b = discrete_seq(&[(3, t(2000, 1, 2)), (4, t(2000, 1, 3))]);
        let state = transition(transition(AggState::new(Reducer::Sum), &a).unwrap(), &b).unwrap();
        let result = finalize(&state).unwrap();
        match result {
            Temporal::InstantSet(s) => {
                let vals: Vec<(i32, Timestamp)> = s.instants().iter().map(|i| (i.value.as_f64().unwrap() as i32, i.t)).collect();
                assert_eq!(vals, vec![(1, t(2000, 1, 1)), (5, t(2000, 1, 2)), (4, t(2000, 1, 3))]);
            }
            _ => panic!("expected an InstantSet"),
        }
    }

    /// Scenario 6 (spec §8): out-of-order combine equals sequential transition.
    #[test]
    fn scenario_6_out_of_order_combine_matches_sequential() {
        let a = discrete_seq(&[(1, t(2000, 1, 1))]);
        let b = discrete_seq(&[(2, t(2000, 1, 1))]);
        let c = discrete_seq(&[(3, t(2000, 1, 1))]);

        let via_combine = combine(
            transition(AggState::new(Reducer::Sum), &a).unwrap(),
            transition(transition(AggState::new(Reducer::Sum), &b).unwrap(), &c).unwrap(),
        )
        .unwrap();
        let sequential = transition(transition(transition(AggState::new(Reducer::Sum), &a).unwrap(), &b).unwrap(), &c).unwrap();

        assert_eq!(finalize(&via_combine).unwrap(), finalize(&sequential).unwrap());
    }

    #[test]
    fn tcount_counts_overlapping_inputs() {
        let a = discrete_seq(&[(1, t(2000, 1, 1))]);
        let b = discrete_seq(&[(9, t(2000, 1, 1))]);
        let state = transition(transition(AggState::new(Reducer::Count), &a).unwrap(), &b).unwrap();
        let result = finalize(&state).unwrap();
        match result {
            Temporal::Instant(i) => assert_eq!(i.value, BaseValue::Int(2)),
            _ => panic!("expected a single instant"),
        }
    }

    #[test]
    fn state_serialization_round_trips() {
        let a = discrete_seq(&[(1, t(2000, 1, 1)), (2, t(2000, 1, 2))]);
        let state = transition(AggState::new(Reducer::Sum), &a).unwrap();
        let bytes = serialize_state(&state).unwrap();
        let restored = deserialize_state(Reducer::Sum, &bytes).unwrap();
        assert_eq!(finalize(&state).unwrap(), finalize(&restored).unwrap());
    }
}
