//! Text literal grammar (spec §6): bound notation `[|(... ,...]|)`,
//! ISO-8601 timestamps, comma-separated lists, square brackets around
//! sequences, curly braces around sets and sequence-sets, an interpolation
//! suffix `@interp`.
//!
//! Hand-rolled recursive-descent, per `SPEC_FULL.md`'s §6 note that no
//! parser-combinator crate appears anywhere in the example pack. Timestamp
//! parsing itself is delegated to `chrono`.

use crate::basetype::{BaseTypeTag, BaseValue};
use crate::error::{Error, Result};
use crate::geom::{Point2D, Point3D};
use crate::temporal::{Instant, InstantSet, Interpolation, Sequence, SequenceSet, Temporal, TemporalFlags};
use crate::timeset::Timestamp;
use crate::tz::TimeZoneBinding;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

fn err(offset: usize, message: impl Into<String>) -> Error {
    Error::invalid_input(offset, message)
}

// ── Tokenizing helpers ──

/// Split `s` on top-level commas: depth tracking over `()[]{}` and
/// quote-awareness for `"..."` text literals (a comma inside a quoted
/// string, or inside a nested `POINT(...)`/sequence, is not a separator).
fn split_top_level(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut start = 0usize;
    let bytes = s.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if in_quotes {
            if c == '\\' {
                i += 1;
            } else if c == '"' {
                in_quotes = false;
            }
        } else {
            match c {
                '"' => in_quotes = true,
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                ',' if depth == 0 => {
                    out.push(s[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            }
        }
        i += 1;
    }
    out.push(s[start..].trim());
    out
}

fn strip_interp_suffix(s: &str) -> (&str, Option<Interpolation>) {
    if let Some(idx) = s.rfind('@') {
        let (body, suffix) = (&s[..idx], &s[idx + 1..]);
        let interp = match suffix {
            "Discrete" => Some(Interpolation::Discrete),
            "Step" => Some(Interpolation::Step),
            "Linear" => Some(Interpolation::Linear),
            _ => None,
        };
        if interp.is_some() {
            return (body.trim(), interp);
        }
    }
    (s, None)
}

fn default_interp(tag: BaseTypeTag) -> Interpolation {
    if tag.supports_linear() {
        Interpolation::Linear
    } else {
        Interpolation::Step
    }
}

// ── Value literals ──

fn parse_quoted_string(s: &str) -> Result<String> {
    if s.len() < 2 || !s.starts_with('"') || !s.ends_with('"') {
        return Err(err(0, format!("expected a quoted text literal, got `{s}`")));
    }
    let inner = &s[1..s.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => return Err(err(0, "dangling escape in text literal")),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn format_quoted_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn parse_point2d(s: &str) -> Result<Point2D> {
    let rest = s.strip_prefix("POINT(").and_then(|r| r.strip_suffix(')')).ok_or_else(|| err(0, format!("malformed POINT literal `{s}`")))?;
    let mut it = rest.split_whitespace();
    let x: f64 = it.next().and_then(|t| t.parse().ok()).ok_or_else(|| err(0, "missing POINT x coordinate"))?;
    let y: f64 = it.next().and_then(|t| t.parse().ok()).ok_or_else(|| err(0, "missing POINT y coordinate"))?;
    Ok(Point2D::new(x, y))
}

fn parse_point3d(s: &str) -> Result<Point3D> {
    let rest = s.strip_prefix("POINT Z(").and_then(|r| r.strip_suffix(')')).ok_or_else(|| err(0, format!("malformed POINT Z literal `{s}`")))?;
    let mut it = rest.split_whitespace();
    let x: f64 = it.next().and_then(|t| t.parse().ok()).ok_or_else(|| err(0, "missing POINT Z x coordinate"))?;
    let y: f64 = it.next().and_then(|t| t.parse().ok()).ok_or_else(|| err(0, "missing POINT Z y coordinate"))?;
    let z: f64 = it.next().and_then(|t| t.parse().ok()).ok_or_else(|| err(0, "missing POINT Z z coordinate"))?;
    Ok(Point3D::new(x, y, z))
}

/// Parse a timestamp per spec §6: `YYYY-MM-DDTHH:MM:SS.fff±HH:MM`, falling
/// back to the explicit timezone binding when no offset is present.
pub fn parse_timestamp(s: &str, tz: &TimeZoneBinding) -> Result<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(tz.to_utc(naive));
        }
    }
    Err(err(0, format!("could not parse `{s}` as an ISO-8601 timestamp")))
}

pub fn format_timestamp(t: &Timestamp) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

fn parse_value(s: &str, tag: BaseTypeTag, tz: &TimeZoneBinding) -> Result<BaseValue> {
    match tag {
        BaseTypeTag::Bool => match s {
            "true" => Ok(BaseValue::Bool(true)),
            "false" => Ok(BaseValue::Bool(false)),
            _ => Err(err(0, format!("expected `true`/`false`, got `{s}`"))),
        },
        BaseTypeTag::Int => s.parse::<i32>().map(BaseValue::Int).map_err(|e| err(0, format!("invalid int literal `{s}`: {e}"))),
        BaseTypeTag::BigInt => s.parse::<i64>().map(BaseValue::BigInt).map_err(|e| err(0, format!("invalid bigint literal `{s}`: {e}"))),
        BaseTypeTag::Float => s.parse::<f64>().map(BaseValue::Float).map_err(|e| err(0, format!("invalid float literal `{s}`: {e}"))),
        BaseTypeTag::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(BaseValue::Date).map_err(|e| err(0, format!("invalid date literal `{s}`: {e}"))),
        BaseTypeTag::TimestampTz => parse_timestamp(s, tz).map(BaseValue::TimestampTz),
        BaseTypeTag::Text => parse_quoted_string(s).map(BaseValue::Text),
        BaseTypeTag::Geometry2D | BaseTypeTag::Geography2D => parse_point2d(s).map(BaseValue::Point2D),
        BaseTypeTag::Geometry3D | BaseTypeTag::Geography3D => parse_point3d(s).map(BaseValue::Point3D),
        BaseTypeTag::NetworkPoint => Err(Error::UnsupportedOperation("text literals for NetworkPoint are not supported".into())),
    }
}

fn format_value(v: &BaseValue) -> String {
    match v {
        BaseValue::Bool(b) => b.to_string(),
        BaseValue::Int(i) => i.to_string(),
        BaseValue::BigInt(i) => i.to_string(),
        BaseValue::Float(f) => f.to_string(),
        BaseValue::Date(d) => d.to_string(),
        BaseValue::TimestampTz(t) => format_timestamp(t),
        BaseValue::Text(s) => format_quoted_string(s),
        BaseValue::Point2D(p) => p.to_string(),
        BaseValue::Point3D(p) => p.to_string(),
    }
}

// ── Instant ──

fn parse_instant(s: &str, tag: BaseTypeTag, tz: &TimeZoneBinding) -> Result<Instant> {
    let idx = s.rfind('@').ok_or_else(|| err(0, format!("instant literal `{s}` is missing `@timestamp`")))?;
    let value = parse_value(s[..idx].trim(), tag, tz)?;
    let t = parse_timestamp(s[idx + 1..].trim(), tz)?;
    Ok(Instant::new(value, t))
}

fn format_instant(i: &Instant) -> String {
    format!("{}@{}", format_value(&i.value), format_timestamp(&i.t))
}

// ── Sequence (bound notation) ──

fn parse_sequence(s: &str, tag: BaseTypeTag, geodetic: bool, tz: &TimeZoneBinding) -> Result<Sequence> {
    let (body, suffix) = strip_interp_suffix(s);
    let lower_inc = body.starts_with('[');
    let upper_inc = body.ends_with(']');
    if !(body.starts_with('[') || body.starts_with('(')) || !(body.ends_with(']') || body.ends_with(')')) {
        return Err(err(0, format!("sequence literal `{s}` is missing bound brackets")));
    }
    let inner = &body[1..body.len() - 1];
    let instants: Vec<Instant> = split_top_level(inner).into_iter().map(|tok| parse_instant(tok, tag, tz)).collect::<Result<_>>()?;
    let interp = suffix.unwrap_or_else(|| default_interp(tag));
    let flags = TemporalFlags { has_z: tag.has_z(), is_geodetic: geodetic, interp, byvalue: TemporalFlags::byvalue_for(tag) };
    Sequence::new(instants, lower_inc, upper_inc, flags)
}

fn format_sequence(seq: &Sequence) -> String {
    let open = if seq.lower_inc() { '[' } else { '(' };
    let close = if seq.upper_inc() { ']' } else { ')' };
    let body = seq.instants().iter().map(format_instant).collect::<Vec<_>>().join(", ");
    format!("{open}{body}{close}@{}", interp_suffix(seq.interp()))
}

fn interp_suffix(i: Interpolation) -> &'static str {
    match i {
        Interpolation::Discrete => "Discrete",
        Interpolation::Step => "Step",
        Interpolation::Linear => "Linear",
    }
}

// ── Top-level dispatch ──

/// Parse a temporal literal of the given base type (spec §6). The caller
/// supplies `tag`/`geodetic` because the grammar's tokens alone don't carry
/// a type tag (`1` could be any numeric base type) and a timezone binding
/// for offset-less timestamps.
pub fn parse(s: &str, tag: BaseTypeTag, geodetic: bool, tz: &TimeZoneBinding) -> Result<Temporal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(err(0, "empty temporal literal"));
    }

    if trimmed.starts_with('{') {
        let inner = trimmed.strip_prefix('{').and_then(|b| b.strip_suffix('}')).ok_or_else(|| err(0, format!("unbalanced braces in `{trimmed}`")))?;
        let tokens = split_top_level(inner);
        let first_tok = tokens.first().copied().unwrap_or("");
        if first_tok.starts_with('[') || first_tok.starts_with('(') {
            let sequences: Vec<Sequence> = tokens.into_iter().map(|tok| parse_sequence(tok, tag, geodetic, tz)).collect::<Result<_>>()?;
            return Ok(Temporal::SequenceSet(SequenceSet::new(sequences)?));
        }
        let instants: Vec<Instant> = tokens.into_iter().map(|tok| parse_instant(tok, tag, tz)).collect::<Result<_>>()?;
        let flags = TemporalFlags { has_z: tag.has_z(), is_geodetic: geodetic, interp: Interpolation::Discrete, byvalue: TemporalFlags::byvalue_for(tag) };
        return Ok(Temporal::InstantSet(InstantSet::new(instants, flags)?));
    }

    if trimmed.starts_with('[') || trimmed.starts_with('(') {
        return Ok(Temporal::Sequence(parse_sequence(trimmed, tag, geodetic, tz)?));
    }

    Ok(Temporal::Instant(parse_instant(trimmed, tag, tz)?))
}

/// Render a `Temporal` back to its text literal (spec §6). `parse(format(t)) = t`.
pub fn format(t: &Temporal) -> String {
    match t {
        Temporal::Instant(i) => format_instant(i),
        Temporal::InstantSet(s) => {
            let body = s.instants().iter().map(format_instant).collect::<Vec<_>>().join(", ");
            format!("{{{body}}}")
        }
        Temporal::Sequence(seq) => format_sequence(seq),
        Temporal::SequenceSet(ss) => {
            let body = ss.sequences().iter().map(format_sequence).collect::<Vec<_>>().join(", ");
            format!("{{{body}}}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn t(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn round_trips_an_instant() {
        let inst = Temporal::Instant(Instant::new(BaseValue::Int(5), t(2000, 1, 1)));
        let text = format(&inst);
        let parsed = parse(&text, BaseTypeTag::Int, false, &TimeZoneBinding::utc()).unwrap();
        assert_eq!(parsed, inst);
    }

    #[test]
    fn round_trips_a_linear_sequence() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: true };
        let seq = Sequence::new(
            vec![Instant::new(BaseValue::Float(1.0), t(2000, 1, 1)), Instant::new(BaseValue::Float(3.0), t(2000, 1, 3))],
            true,
            true,
            flags,
        )
        .unwrap();
        let temp = Temporal::Sequence(seq);
        let text = format(&temp);
        assert!(text.starts_with('['));
        assert!(text.ends_with("@Linear"));
        let parsed = parse(&text, BaseTypeTag::Float, false, &TimeZoneBinding::utc()).unwrap();
        assert_eq!(parsed, temp);
    }

    #[test]
    fn round_trips_an_instant_set() {
        let flags = TemporalFlags::discrete();
        let set = InstantSet::new(vec![Instant::new(BaseValue::Int(1), t(2000, 1, 1)), Instant::new(BaseValue::Int(2), t(2000, 1, 5))], flags).unwrap();
        let temp = Temporal::InstantSet(set);
        let text = format(&temp);
        let parsed = parse(&text, BaseTypeTag::Int, false, &TimeZoneBinding::utc()).unwrap();
        assert_eq!(parsed, temp);
    }

    #[test]
    fn round_trips_a_text_value_with_escaped_quote() {
        let inst = Temporal::Instant(Instant::new(BaseValue::Text("say \"hi\"".into()), t(2000, 1, 1)));
        let text = format(&inst);
        let parsed = parse(&text, BaseTypeTag::Text, false, &TimeZoneBinding::utc()).unwrap();
        assert_eq!(parsed, inst);
    }

    #[test]
    fn round_trips_a_point_sequence() {
        let flags = TemporalFlags { has_z: false, is_geodetic: false, interp: Interpolation::Linear, byvalue: false };
        let seq = Sequence::new(
            vec![
                Instant::new(BaseValue::Point2D(Point2D::new(0.0, 0.0)), t(2000, 1, 1)),
                Instant::new(BaseValue::Point2D(Point2D::new(1.0, 1.0)), t(2000, 1, 2)),
            ],
            true,
            true,
            flags,
        )
        .unwrap();
        let temp = Temporal::Sequence(seq);
        let text = format(&temp);
        let parsed = parse(&text, BaseTypeTag::Geometry2D, false, &TimeZoneBinding::utc()).unwrap();
        assert_eq!(parsed, temp);
    }

    #[test]
    fn rejects_malformed_literal() {
        assert!(parse("not-a-literal", BaseTypeTag::Int, false, &TimeZoneBinding::utc()).is_err());
    }
}
