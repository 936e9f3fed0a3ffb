//! Binary WKB codec (spec §4.5): a length-prefixed, endian-flagged,
//! self-describing format for spans, spansets and temporal values.
//!
//! Grounded on `original_source/meos/src/general/type_out.c`'s envelope
//! shape (endian byte + type tag + flags byte, mirrored here) and, for the
//! byte-order plumbing itself, on `byteorder`'s `ReadBytesExt`/`WriteBytesExt`
//! as used by the pack's other binary-protocol crates (`vectordotdev-vector`,
//! `rerun-io-rerun`).

use crate::basetype::{BaseTypeTag, BaseValue};
use crate::error::{Error, Result};
use crate::geom::{Point2D, Point3D};
use crate::span::Span;
use crate::spanset::SpanSet;
use crate::temporal::{Instant, Interpolation, Sequence, SequenceSet, Temporal, TemporalFlags};
use crate::timeset::Timestamp;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{TimeZone, Utc};
use std::io::{Cursor, Read, Write};

/// `endian_flag = 0 | 1` (spec §6): XDR (big-endian) or NDR (little-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Xdr,
    Ndr,
}

impl ByteOrder {
    fn flag(self) -> u8 {
        match self {
            ByteOrder::Xdr => 0,
            ByteOrder::Ndr => 1,
        }
    }

    fn from_flag(b: u8) -> Result<Self> {
        match b {
            0 => Ok(ByteOrder::Xdr),
            1 => Ok(ByteOrder::Ndr),
            other => Err(Error::codec(0, format!("unrecognized endian flag {other}"))),
        }
    }
}

/// High-level category packed into the upper bits of the 16-bit type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WkbCategory {
    Temporal,
    Span,
    SpanSet,
    Box,
}

impl WkbCategory {
    fn bits(self) -> u16 {
        match self {
            WkbCategory::Temporal => 0,
            WkbCategory::Span => 1,
            WkbCategory::SpanSet => 2,
            WkbCategory::Box => 3,
        }
    }

    fn from_bits(b: u16) -> Result<Self> {
        match b {
            0 => Ok(WkbCategory::Temporal),
            1 => Ok(WkbCategory::Span),
            2 => Ok(WkbCategory::SpanSet),
            3 => Ok(WkbCategory::Box),
            other => Err(Error::codec(1, format!("unrecognized WKB category {other}"))),
        }
    }
}

fn type_code(category: WkbCategory, tag: BaseTypeTag) -> u16 {
    (category.bits() << 12) | (tag as u16)
}

fn decode_type_code(code: u16) -> Result<(WkbCategory, u16)> {
    Ok((WkbCategory::from_bits(code >> 12)?, code & 0x0FFF))
}

fn tag_from_ordinal(ord: u16) -> Result<BaseTypeTag> {
    const TAGS: [BaseTypeTag; 12] = [
        BaseTypeTag::Bool,
        BaseTypeTag::Int,
        BaseTypeTag::BigInt,
        BaseTypeTag::Float,
        BaseTypeTag::Date,
        BaseTypeTag::TimestampTz,
        BaseTypeTag::Text,
        BaseTypeTag::Geometry2D,
        BaseTypeTag::Geometry3D,
        BaseTypeTag::Geography2D,
        BaseTypeTag::Geography3D,
        BaseTypeTag::NetworkPoint,
    ];
    TAGS.get(ord as usize).copied().ok_or_else(|| Error::codec(1, format!("unrecognized base type ordinal {ord}")))
}

// Flags byte bit layout (spec §4.5): bit0 has_srid, bit1 geodetic, bit2
// has_z, bits3-4 interp, bits5-6 subtype.
const FLAG_HAS_SRID: u8 = 1 << 0;
const FLAG_GEODETIC: u8 = 1 << 1;
const FLAG_HAS_Z: u8 = 1 << 2;

fn interp_bits(i: Interpolation) -> u8 {
    match i {
        Interpolation::Discrete => 0,
        Interpolation::Step => 1,
        Interpolation::Linear => 2,
    }
}

fn interp_from_bits(b: u8) -> Result<Interpolation> {
    match b {
        0 => Ok(Interpolation::Discrete),
        1 => Ok(Interpolation::Step),
        2 => Ok(Interpolation::Linear),
        other => Err(Error::codec(3, format!("unrecognized interpolation bits {other}"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subtype {
    Instant,
    InstantSet,
    Sequence,
    SequenceSet,
}

fn subtype_bits(s: Subtype) -> u8 {
    match s {
        Subtype::Instant => 0,
        Subtype::InstantSet => 1,
        Subtype::Sequence => 2,
        Subtype::SequenceSet => 3,
    }
}

fn subtype_from_bits(b: u8) -> Result<Subtype> {
    match b {
        0 => Ok(Subtype::Instant),
        1 => Ok(Subtype::InstantSet),
        2 => Ok(Subtype::Sequence),
        3 => Ok(Subtype::SequenceSet),
        other => Err(Error::codec(3, format!("unrecognized subtype bits {other}"))),
    }
}

fn pack_flags(has_srid: bool, flags: TemporalFlags, subtype: Subtype) -> u8 {
    let mut b = 0u8;
    if has_srid {
        b |= FLAG_HAS_SRID;
    }
    if flags.is_geodetic {
        b |= FLAG_GEODETIC;
    }
    if flags.has_z {
        b |= FLAG_HAS_Z;
    }
    b |= interp_bits(flags.interp) << 3;
    b |= subtype_bits(subtype) << 5;
    b
}

fn unpack_flags(b: u8) -> Result<(bool, TemporalFlags, Subtype)> {
    let has_srid = b & FLAG_HAS_SRID != 0;
    let geodetic = b & FLAG_GEODETIC != 0;
    let has_z = b & FLAG_HAS_Z != 0;
    let interp = interp_from_bits((b >> 3) & 0b11)?;
    let subtype = subtype_from_bits((b >> 5) & 0b11)?;
    Ok((has_srid, TemporalFlags { has_z, is_geodetic: geodetic, interp, byvalue: true }, subtype))
}

/// A decoded envelope header, returned alongside the body reader position —
/// useful for callers that want to branch on type before committing to a
/// full decode.
#[derive(Debug, Clone, Copy)]
pub struct WkbEnvelope {
    pub byte_order: ByteOrder,
    pub category: u16,
    pub base_type: u16,
}

// ── Base-value encode/decode ──

fn write_value<W: Write>(w: &mut W, bo: ByteOrder, v: &BaseValue) -> Result<()> {
    macro_rules! wr {
        ($method:ident, $val:expr) => {
            match bo {
                ByteOrder::Ndr => w.$method::<LittleEndian>($val),
                ByteOrder::Xdr => w.$method::<BigEndian>($val),
            }
        };
    }
    match v {
        BaseValue::Bool(b) => w.write_u8(if *b { 1 } else { 0 }),
        BaseValue::Int(i) => wr!(write_i32, *i),
        BaseValue::BigInt(i) => wr!(write_i64, *i),
        BaseValue::Float(f) => wr!(write_f64, *f),
        BaseValue::Date(d) => wr!(write_i32, (*d - chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32),
        BaseValue::TimestampTz(t) => wr!(write_i64, t.timestamp_micros()),
        BaseValue::Text(s) => {
            let bytes = s.as_bytes();
            wr!(write_u32, bytes.len() as u32)?;
            w.write_all(bytes)
        }
        BaseValue::Point2D(p) => {
            wr!(write_f64, p.x)?;
            wr!(write_f64, p.y)
        }
        BaseValue::Point3D(p) => {
            wr!(write_f64, p.x)?;
            wr!(write_f64, p.y)?;
            wr!(write_f64, p.z)
        }
    }
    .map_err(|e| Error::codec(0, format!("write failure: {e}")))
}

fn read_value<R: Read>(r: &mut R, bo: ByteOrder, tag: BaseTypeTag) -> Result<BaseValue> {
    macro_rules! rd {
        ($method:ident) => {
            match bo {
                ByteOrder::Ndr => r.$method::<LittleEndian>(),
                ByteOrder::Xdr => r.$method::<BigEndian>(),
            }
            .map_err(|e| Error::codec(0, format!("read failure: {e}")))?
        };
    }
    Ok(match tag {
        BaseTypeTag::Bool => BaseValue::Bool(r.read_u8().map_err(|e| Error::codec(0, e.to_string()))? != 0),
        BaseTypeTag::Int => BaseValue::Int(rd!(read_i32)),
        BaseTypeTag::BigInt => BaseValue::BigInt(rd!(read_i64)),
        BaseTypeTag::Float => BaseValue::Float(rd!(read_f64)),
        BaseTypeTag::Date => {
            let days = rd!(read_i32);
            BaseValue::Date(chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(days as i64))
        }
        BaseTypeTag::TimestampTz => {
            let micros = rd!(read_i64);
            BaseValue::TimestampTz(micros_to_timestamp(micros)?)
        }
        BaseTypeTag::Text => {
            let len = rd!(read_u32) as usize;
            let mut buf = vec![0u8; len];
            r.read_exact(&mut buf).map_err(|e| Error::codec(0, e.to_string()))?;
            BaseValue::Text(String::from_utf8(buf).map_err(|e| Error::codec(0, e.to_string()))?)
        }
        BaseTypeTag::Geometry2D | BaseTypeTag::Geography2D => {
            let x = rd!(read_f64);
            let y = rd!(read_f64);
            BaseValue::Point2D(Point2D::new(x, y))
        }
        BaseTypeTag::Geometry3D | BaseTypeTag::Geography3D => {
            let x = rd!(read_f64);
            let y = rd!(read_f64);
            let z = rd!(read_f64);
            BaseValue::Point3D(Point3D::new(x, y, z))
        }
        BaseTypeTag::NetworkPoint => return Err(Error::UnsupportedOperation("WKB encoding of NetworkPoint is not supported".into())),
    })
}

fn micros_to_timestamp(micros: i64) -> Result<Timestamp> {
    Utc.timestamp_micros(micros).single().ok_or_else(|| Error::codec(0, "timestamp out of range"))
}

fn write_timestamp<W: Write>(w: &mut W, bo: ByteOrder, t: Timestamp) -> Result<()> {
    match bo {
        ByteOrder::Ndr => w.write_i64::<LittleEndian>(t.timestamp_micros()),
        ByteOrder::Xdr => w.write_i64::<BigEndian>(t.timestamp_micros()),
    }
    .map_err(|e| Error::codec(0, e.to_string()))
}

fn read_timestamp<R: Read>(r: &mut R, bo: ByteOrder) -> Result<Timestamp> {
    let micros = match bo {
        ByteOrder::Ndr => r.read_i64::<LittleEndian>(),
        ByteOrder::Xdr => r.read_i64::<BigEndian>(),
    }
    .map_err(|e| Error::codec(0, e.to_string()))?;
    micros_to_timestamp(micros)
}

fn write_u32<W: Write>(w: &mut W, bo: ByteOrder, v: u32) -> Result<()> {
    match bo {
        ByteOrder::Ndr => w.write_u32::<LittleEndian>(v),
        ByteOrder::Xdr => w.write_u32::<BigEndian>(v),
    }
    .map_err(|e| Error::codec(0, e.to_string()))
}

fn read_u32<R: Read>(r: &mut R, bo: ByteOrder) -> Result<u32> {
    match bo {
        ByteOrder::Ndr => r.read_u32::<LittleEndian>(),
        ByteOrder::Xdr => r.read_u32::<BigEndian>(),
    }
    .map_err(|e| Error::codec(0, e.to_string()))
}

fn write_u16<W: Write>(w: &mut W, bo: ByteOrder, v: u16) -> Result<()> {
    match bo {
        ByteOrder::Ndr => w.write_u16::<LittleEndian>(v),
        ByteOrder::Xdr => w.write_u16::<BigEndian>(v),
    }
    .map_err(|e| Error::codec(0, e.to_string()))
}

fn read_u16<R: Read>(r: &mut R, bo: ByteOrder) -> Result<u16> {
    match bo {
        ByteOrder::Ndr => r.read_u16::<LittleEndian>(),
        ByteOrder::Xdr => r.read_u16::<BigEndian>(),
    }
    .map_err(|e| Error::codec(0, e.to_string()))
}

// ── Span / SpanSet ──

fn bounds_byte(lower_inc: bool, upper_inc: bool) -> u8 {
    (lower_inc as u8) | ((upper_inc as u8) << 1)
}

fn unpack_bounds(b: u8) -> (bool, bool) {
    (b & 1 != 0, b & 2 != 0)
}

/// Encode `Span<f64>` (the only span instantiation the WKB envelope needs
/// to name explicitly here; `Period = Span<Timestamp>` uses its own writer
/// since the bound type differs).
pub fn encode_span_f64(span: &Span<f64>, bo: ByteOrder) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_u8(bo.flag()).unwrap();
    write_u16(&mut out, bo, type_code(WkbCategory::Span, BaseTypeTag::Float))?;
    out.write_u8(0).unwrap(); // no subtype/flags needed for a bare span
    out.write_u8(bounds_byte(span.lower_inc(), span.upper_inc())).unwrap();
    write_value(&mut out, bo, &BaseValue::Float(*span.lower()))?;
    write_value(&mut out, bo, &BaseValue::Float(*span.upper()))?;
    Ok(out)
}

pub fn decode_span_f64(bytes: &[u8]) -> Result<Span<f64>> {
    let mut cur = Cursor::new(bytes);
    let bo = ByteOrder::from_flag(cur.read_u8().map_err(|e| Error::codec(0, e.to_string()))?)?;
    let code = read_u16(&mut cur, bo)?;
    let (category, tag_ord) = decode_type_code(code)?;
    if category != WkbCategory::Span {
        return Err(Error::codec(1, "expected a span envelope"));
    }
    let _tag = tag_from_ordinal(tag_ord)?;
    cur.read_u8().map_err(|e| Error::codec(2, e.to_string()))?;
    let (lower_inc, upper_inc) = unpack_bounds(cur.read_u8().map_err(|e| Error::codec(3, e.to_string()))?);
    let lower = match read_value(&mut cur, bo, BaseTypeTag::Float)? {
        BaseValue::Float(f) => f,
        _ => unreachable!(),
    };
    let upper = match read_value(&mut cur, bo, BaseTypeTag::Float)? {
        BaseValue::Float(f) => f,
        _ => unreachable!(),
    };
    Span::new(lower, upper, lower_inc, upper_inc)
}

pub fn encode_spanset_f64(spans: &SpanSet<f64>, bo: ByteOrder) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_u8(bo.flag()).unwrap();
    write_u16(&mut out, bo, type_code(WkbCategory::SpanSet, BaseTypeTag::Float))?;
    out.write_u8(0).unwrap();
    write_u32(&mut out, bo, spans.len() as u32)?;
    for s in spans.spans() {
        out.write_u8(bounds_byte(s.lower_inc(), s.upper_inc())).unwrap();
        write_value(&mut out, bo, &BaseValue::Float(*s.lower()))?;
        write_value(&mut out, bo, &BaseValue::Float(*s.upper()))?;
    }
    Ok(out)
}

pub fn decode_spanset_f64(bytes: &[u8]) -> Result<SpanSet<f64>> {
    let mut cur = Cursor::new(bytes);
    let bo = ByteOrder::from_flag(cur.read_u8().map_err(|e| Error::codec(0, e.to_string()))?)?;
    let code = read_u16(&mut cur, bo)?;
    let (category, _) = decode_type_code(code)?;
    if category != WkbCategory::SpanSet {
        return Err(Error::codec(1, "expected a spanset envelope"));
    }
    cur.read_u8().map_err(|e| Error::codec(2, e.to_string()))?;
    let count = read_u32(&mut cur, bo)?;
    let mut spans = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (lower_inc, upper_inc) = unpack_bounds(cur.read_u8().map_err(|e| Error::codec(3, e.to_string()))?);
        let lower = match read_value(&mut cur, bo, BaseTypeTag::Float)? {
            BaseValue::Float(f) => f,
            _ => unreachable!(),
        };
        let upper = match read_value(&mut cur, bo, BaseTypeTag::Float)? {
            BaseValue::Float(f) => f,
            _ => unreachable!(),
        };
        spans.push(Span::new(lower, upper, lower_inc, upper_inc)?);
    }
    SpanSet::new(spans)
}

// ── Temporal ──

/// Encode a temporal value to WKB. `srid` is only written when the base
/// type is a point and a non-default SRID is supplied.
pub fn encode_temporal(temp: &Temporal, bo: ByteOrder, srid: Option<i32>) -> Result<Vec<u8>> {
    let tag = temp.base_tag();
    let has_srid = srid.is_some() && tag.is_point();
    let flags = temp.flags();

    let mut out = Vec::new();
    out.write_u8(bo.flag()).unwrap();
    write_u16(&mut out, bo, type_code(WkbCategory::Temporal, tag))?;

    match temp {
        Temporal::Instant(i) => {
            out.write_u8(pack_flags(has_srid, flags_for_instant(flags), Subtype::Instant)).unwrap();
            write_instant_body(&mut out, bo, i, tag, has_srid, srid)?;
        }
        Temporal::InstantSet(s) => {
            out.write_u8(pack_flags(has_srid, s.flags(), Subtype::InstantSet)).unwrap();
            if has_srid {
                write_u32(&mut out, bo, srid.unwrap() as u32)?;
            }
            write_u32(&mut out, bo, s.instants().len() as u32)?;
            for inst in s.instants() {
                write_value(&mut out, bo, &inst.value)?;
                write_timestamp(&mut out, bo, inst.t)?;
            }
        }
        Temporal::Sequence(seq) => {
            out.write_u8(pack_flags(has_srid, seq.flags(), Subtype::Sequence)).unwrap();
            if has_srid {
                write_u32(&mut out, bo, srid.unwrap() as u32)?;
            }
            write_u32(&mut out, bo, seq.instants().len() as u32)?;
            out.write_u8(bounds_byte(seq.lower_inc(), seq.upper_inc())).unwrap();
            for inst in seq.instants() {
                write_value(&mut out, bo, &inst.value)?;
                write_timestamp(&mut out, bo, inst.t)?;
            }
        }
        Temporal::SequenceSet(ss) => {
            out.write_u8(pack_flags(has_srid, ss.flags(), Subtype::SequenceSet)).unwrap();
            if has_srid {
                write_u32(&mut out, bo, srid.unwrap() as u32)?;
            }
            write_u32(&mut out, bo, ss.sequences().len() as u32)?;
            for seq in ss.sequences() {
                write_u32(&mut out, bo, seq.instants().len() as u32)?;
                out.write_u8(bounds_byte(seq.lower_inc(), seq.upper_inc())).unwrap();
                for inst in seq.instants() {
                    write_value(&mut out, bo, &inst.value)?;
                    write_timestamp(&mut out, bo, inst.t)?;
                }
            }
        }
    }
    Ok(out)
}

fn flags_for_instant(flags: TemporalFlags) -> TemporalFlags {
    TemporalFlags { interp: Interpolation::Discrete, ..flags }
}

fn write_instant_body<W: Write>(w: &mut W, bo: ByteOrder, inst: &Instant, _tag: BaseTypeTag, has_srid: bool, srid: Option<i32>) -> Result<()> {
    if has_srid {
        write_u32(w, bo, srid.unwrap() as u32)?;
    }
    write_value(w, bo, &inst.value)?;
    write_timestamp(w, bo, inst.t)
}

pub fn decode_temporal(bytes: &[u8]) -> Result<Temporal> {
    let mut cur = Cursor::new(bytes);
    let bo = ByteOrder::from_flag(cur.read_u8().map_err(|e| Error::codec(0, e.to_string()))?)?;
    let code = read_u16(&mut cur, bo)?;
    let (category, tag_ord) = decode_type_code(code)?;
    if category != WkbCategory::Temporal {
        return Err(Error::codec(3, "expected a temporal envelope"));
    }
    let tag = tag_from_ordinal(tag_ord)?;
    let flags_byte = cur.read_u8().map_err(|e| Error::codec(3, e.to_string()))?;
    let (has_srid, mut flags, subtype) = unpack_flags(flags_byte)?;
    flags.is_geodetic = matches!(tag, BaseTypeTag::Geography2D | BaseTypeTag::Geography3D);
    flags.byvalue = TemporalFlags::byvalue_for(tag);

    match subtype {
        Subtype::Instant => {
            if has_srid {
                read_u32(&mut cur, bo)?;
            }
            let value = read_value(&mut cur, bo, tag)?;
            let t = read_timestamp(&mut cur, bo)?;
            Ok(Temporal::Instant(Instant::new(value, t)))
        }
        Subtype::InstantSet => {
            if has_srid {
                read_u32(&mut cur, bo)?;
            }
            let count = read_u32(&mut cur, bo)?;
            let mut instants = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let value = read_value(&mut cur, bo, tag)?;
                let t = read_timestamp(&mut cur, bo)?;
                instants.push(Instant::new(value, t));
            }
            Ok(Temporal::InstantSet(crate::temporal::InstantSet::new(instants, flags)?))
        }
        Subtype::Sequence => {
            if has_srid {
                read_u32(&mut cur, bo)?;
            }
            let count = read_u32(&mut cur, bo)?;
            let (lower_inc, upper_inc) = unpack_bounds(cur.read_u8().map_err(|e| Error::codec(4, e.to_string()))?);
            let mut instants = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let value = read_value(&mut cur, bo, tag)?;
                let t = read_timestamp(&mut cur, bo)?;
                instants.push(Instant::new(value, t));
            }
            Ok(Temporal::Sequence(Sequence::new(instants, lower_inc, upper_inc, flags)?))
        }
        Subtype::SequenceSet => {
            if has_srid {
                read_u32(&mut cur, bo)?;
            }
            let count = read_u32(&mut cur, bo)?;
            let mut sequences = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let inst_count = read_u32(&mut cur, bo)?;
                let (lower_inc, upper_inc) = unpack_bounds(cur.read_u8().map_err(|e| Error::codec(5, e.to_string()))?);
                let mut instants = Vec::with_capacity(inst_count as usize);
                for _ in 0..inst_count {
                    let value = read_value(&mut cur, bo, tag)?;
                    let t = read_timestamp(&mut cur, bo)?;
                    instants.push(Instant::new(value, t));
                }
                sequences.push(Sequence::new(instants, lower_inc, upper_inc, flags)?);
            }
            Ok(Temporal::SequenceSet(SequenceSet::new(sequences)?))
        }
    }
}

// ── HexWKB ──

/// `2N+1` ASCII bytes: two hex digits per input byte, NUL-terminated.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2 + 1);
    for b in bytes {
        s.push_str(&format!("{:02X}", b));
    }
    s.push('\0');
    s
}

pub fn from_hex(hex: &str) -> Result<Vec<u8>> {
    let trimmed = hex.trim_end_matches('\0');
    if trimmed.len() % 2 != 0 {
        return Err(Error::codec(0, "HexWKB string has an odd number of hex digits"));
    }
    (0..trimmed.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&trimmed[i..i + 2], 16).map_err(|e| Error::codec(i, e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basetype::BaseValue;
    use chrono::Utc;

    fn t(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    /// Scenario 5 (spec §8): WKB round-trip equals the original byte-for-byte.
    #[test]
    fn scenario_5_wkb_round_trip() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: true };
        let seq = Sequence::new(
            vec![Instant::new(BaseValue::Float(1.0), t(2000, 1, 1)), Instant::new(BaseValue::Float(2.0), t(2000, 1, 2))],
            true,
            false,
            flags,
        )
        .unwrap();
        let temp = Temporal::Sequence(seq);
        let encoded = encode_temporal(&temp, ByteOrder::Ndr, None).unwrap();
        let decoded = decode_temporal(&encoded).unwrap();
        let re_encoded = encode_temporal(&decoded, ByteOrder::Ndr, None).unwrap();
        assert_eq!(encoded, re_encoded);
    }

    #[test]
    fn hexwkb_round_trips() {
        let bytes = vec![0x01, 0xAB, 0xFF, 0x00];
        let hex = to_hex(&bytes);
        assert!(hex.ends_with('\0'));
        assert_eq!(hex.len(), bytes.len() * 2 + 1);
        assert_eq!(from_hex(&hex).unwrap(), bytes);
    }

    #[test]
    fn span_wkb_round_trips() {
        let span = Span::new(1.5, 9.5, true, false).unwrap();
        let encoded = encode_span_f64(&span, ByteOrder::Xdr).unwrap();
        let decoded = decode_span_f64(&encoded).unwrap();
        assert_eq!(span, decoded);
    }

    #[test]
    fn instant_set_wkb_round_trips() {
        let flags = TemporalFlags::discrete();
        let s = crate::temporal::InstantSet::new(
            vec![Instant::new(BaseValue::Int(1), t(2000, 1, 1)), Instant::new(BaseValue::Int(2), t(2000, 1, 2))],
            flags,
        )
        .unwrap();
        let temp = Temporal::InstantSet(s);
        let encoded = encode_temporal(&temp, ByteOrder::Ndr, None).unwrap();
        let decoded = decode_temporal(&encoded).unwrap();
        assert_eq!(temp, decoded);
    }
}
