//! MF-JSON writer (spec §4.5/§6) — the text analogue of the WKB codec.
//! The decoder is explicitly out of scope (spec §4.5 "the decoder is
//! symmetric (out of spec here)"); only the writer is implemented.
//!
//! Grounded on `original_source/meos/src/general/type_out.c`'s MFJSON
//! emitter (object-key shape `type, crs, bbox, values, coordinates,
//! datetimes, interpolation, lower_inc, upper_inc, sequences`) and built
//! with `serde_json::json!`, the same crate the pack's config/interchange
//! layers (e.g. `smithclay-otlp2parquet`) use for structured JSON output.

use crate::basetype::{BaseTypeTag, BaseValue};
use crate::error::{Error, Result};
use crate::temporal::{Instant, Interpolation, Sequence, Temporal};
use serde_json::{json, Value};

fn interp_name(i: Interpolation) -> &'static str {
    match i {
        Interpolation::Discrete => "Discrete",
        Interpolation::Step => "Step",
        Interpolation::Linear => "Linear",
    }
}

fn type_name(tag: BaseTypeTag) -> &'static str {
    match tag {
        BaseTypeTag::Bool => "MovingBoolean",
        BaseTypeTag::Int => "MovingInteger",
        BaseTypeTag::BigInt => "MovingBigint",
        BaseTypeTag::Float => "MovingFloat",
        BaseTypeTag::Date => "MovingDate",
        BaseTypeTag::TimestampTz => "MovingTimestamp",
        BaseTypeTag::Text => "MovingText",
        BaseTypeTag::Geometry2D | BaseTypeTag::Geometry3D => "MovingPoint",
        BaseTypeTag::Geography2D | BaseTypeTag::Geography3D => "MovingGeogPoint",
        BaseTypeTag::NetworkPoint => "MovingNetworkPoint",
    }
}

fn value_json(v: &BaseValue) -> Value {
    match v {
        BaseValue::Bool(b) => json!(b),
        BaseValue::Int(i) => json!(i),
        BaseValue::BigInt(i) => json!(i),
        BaseValue::Float(f) => json!(f),
        BaseValue::Date(d) => json!(d.to_string()),
        BaseValue::TimestampTz(t) => json!(t.to_rfc3339()),
        BaseValue::Text(s) => json!(s),
        BaseValue::Point2D(_) | BaseValue::Point3D(_) => Value::Null,
    }
}

fn coordinate_json(v: &BaseValue) -> Option<Value> {
    match v {
        BaseValue::Point2D(p) => Some(json!([p.x, p.y])),
        BaseValue::Point3D(p) => Some(json!([p.x, p.y, p.z])),
        _ => None,
    }
}

/// Write a `Temporal` value to its MF-JSON representation (spec §4.5).
pub fn to_mfjson(temp: &Temporal) -> Result<Value> {
    let tag = temp.base_tag();
    let is_point = tag.is_point();
    let mut obj = serde_json::Map::new();
    obj.insert("type".into(), json!(type_name(tag)));

    if is_point {
        if let crate::temporal::Bbox::STBox(b) = temp.bbox() {
            let mut bbox = vec![b.xmin, b.ymin];
            if let Some(zmin) = b.zmin {
                bbox.insert(1, zmin);
            }
            bbox.push(b.xmax);
            bbox.push(b.ymax);
            if let Some(zmax) = b.zmax {
                bbox.push(zmax);
            }
            obj.insert("bbox".into(), json!(bbox));
            if let Some(srid) = b.srid {
                obj.insert("crs".into(), json!({"type": "name", "properties": {"name": format!("EPSG:{srid}")}}));
            }
        }
    }

    match temp {
        Temporal::Instant(i) => write_instant(&mut obj, i, is_point),
        Temporal::InstantSet(s) => {
            let values: Vec<Value> = s.instants().iter().map(|i| if is_point { coordinate_json(&i.value).unwrap_or(Value::Null) } else { value_json(&i.value) }).collect();
            let datetimes: Vec<Value> = s.instants().iter().map(|i| json!(i.t.to_rfc3339())).collect();
            obj.insert(if is_point { "coordinates" } else { "values" }.into(), json!(values));
            obj.insert("datetimes".into(), json!(datetimes));
        }
        Temporal::Sequence(seq) => write_sequence(&mut obj, seq, is_point)?,
        Temporal::SequenceSet(ss) => {
            let mut seqs = Vec::with_capacity(ss.sequences().len());
            for seq in ss.sequences() {
                let mut seq_obj = serde_json::Map::new();
                write_sequence(&mut seq_obj, seq, is_point)?;
                seqs.push(Value::Object(seq_obj));
            }
            obj.insert("sequences".into(), json!(seqs));
            obj.insert("interpolation".into(), json!(interp_name(ss.flags().interp)));
        }
    }

    Ok(Value::Object(obj))
}

fn write_instant(obj: &mut serde_json::Map<String, Value>, inst: &Instant, is_point: bool) {
    if is_point {
        obj.insert("coordinates".into(), coordinate_json(&inst.value).unwrap_or(Value::Null));
    } else {
        obj.insert("values".into(), value_json(&inst.value));
    }
    obj.insert("datetimes".into(), json!(inst.t.to_rfc3339()));
}

fn write_sequence(obj: &mut serde_json::Map<String, Value>, seq: &Sequence, is_point: bool) -> Result<()> {
    let values: Vec<Value> = seq.instants().iter().map(|i| if is_point { coordinate_json(&i.value).unwrap_or(Value::Null) } else { value_json(&i.value) }).collect();
    let datetimes: Vec<Value> = seq.instants().iter().map(|i| json!(i.t.to_rfc3339())).collect();
    obj.insert(if is_point { "coordinates" } else { "values" }.into(), json!(values));
    obj.insert("datetimes".into(), json!(datetimes));
    obj.insert("lower_inc".into(), json!(seq.lower_inc()));
    obj.insert("upper_inc".into(), json!(seq.upper_inc()));
    obj.insert("interpolation".into(), json!(interp_name(seq.interp())));
    Ok(())
}

/// Render the MF-JSON value as a compact string, the form actually shipped
/// over the wire (spec §6 "MF-JSON").
pub fn to_mfjson_string(temp: &Temporal) -> Result<String> {
    serde_json::to_string(&to_mfjson(temp)?).map_err(|e| Error::codec(0, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basetype::BaseValue;
    use crate::temporal::{Interpolation, TemporalFlags};
    use chrono::{TimeZone, Utc};

    fn t(y: i32, m: u32, d: u32) -> crate::timeset::Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn sequence_mfjson_has_expected_keys() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: true };
        let seq = Sequence::new(
            vec![Instant::new(BaseValue::Float(1.0), t(2000, 1, 1)), Instant::new(BaseValue::Float(2.0), t(2000, 1, 2))],
            true,
            true,
            flags,
        )
        .unwrap();
        let json = to_mfjson(&Temporal::Sequence(seq)).unwrap();
        assert_eq!(json["type"], "MovingFloat");
        assert!(json["values"].is_array());
        assert_eq!(json["interpolation"], "Linear");
        assert_eq!(json["lower_inc"], true);
    }

    #[test]
    fn point_sequence_uses_coordinates() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: true };
        let seq = Sequence::new(
            vec![
                Instant::new(BaseValue::Point2D(crate::geom::Point2D::new(0.0, 0.0)), t(2000, 1, 1)),
                Instant::new(BaseValue::Point2D(crate::geom::Point2D::new(1.0, 1.0)), t(2000, 1, 2)),
            ],
            true,
            true,
            flags,
        )
        .unwrap();
        let json = to_mfjson(&Temporal::Sequence(seq)).unwrap();
        assert_eq!(json["type"], "MovingPoint");
        assert!(json["coordinates"].is_array());
        assert!(json.get("bbox").is_some());
    }
}
