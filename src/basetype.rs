//! The closed set of base types (spec §3.1) and the tagged `BaseValue` sum
//! that carries one of them. Following §9 Design Notes, every temporal value
//! and span is built from this closed discriminated union rather than
//! per-type generic monomorphization over an open trait — the 16-path
//! dispatch matrices in `sync`/`lift` match on these tags directly.

use crate::geom::{Point2D, Point3D};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseTypeTag {
    Bool,
    Int,
    BigInt,
    Float,
    Date,
    TimestampTz,
    Text,
    Geometry2D,
    Geometry3D,
    Geography2D,
    Geography3D,
    NetworkPoint,
}

impl BaseTypeTag {
    /// Only `f64` and the geometry/geography families are continuous (spec §3.1).
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            BaseTypeTag::Float | BaseTypeTag::Geometry2D | BaseTypeTag::Geometry3D | BaseTypeTag::Geography2D | BaseTypeTag::Geography3D
        )
    }

    pub fn is_point(&self) -> bool {
        matches!(
            self,
            BaseTypeTag::Geometry2D | BaseTypeTag::Geometry3D | BaseTypeTag::Geography2D | BaseTypeTag::Geography3D | BaseTypeTag::NetworkPoint
        )
    }

    pub fn has_z(&self) -> bool {
        matches!(self, BaseTypeTag::Geometry3D | BaseTypeTag::Geography3D)
    }

    pub fn is_geodetic(&self) -> bool {
        matches!(self, BaseTypeTag::Geography2D | BaseTypeTag::Geography3D)
    }

    /// Linear interpolation is only meaningful for continuous base types.
    pub fn supports_linear(&self) -> bool {
        self.is_continuous()
    }
}

/// The per-instant payload. A closed sum over the base types of §3.1.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseValue {
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Date(NaiveDate),
    TimestampTz(DateTime<Utc>),
    Text(String),
    Point2D(Point2D),
    Point3D(Point3D),
}

impl BaseValue {
    pub fn tag(&self, geodetic: bool) -> BaseTypeTag {
        match self {
            BaseValue::Bool(_) => BaseTypeTag::Bool,
            BaseValue::Int(_) => BaseTypeTag::Int,
            BaseValue::BigInt(_) => BaseTypeTag::BigInt,
            BaseValue::Float(_) => BaseTypeTag::Float,
            BaseValue::Date(_) => BaseTypeTag::Date,
            BaseValue::TimestampTz(_) => BaseTypeTag::TimestampTz,
            BaseValue::Text(_) => BaseTypeTag::Text,
            BaseValue::Point2D(_) => {
                if geodetic {
                    BaseTypeTag::Geography2D
                } else {
                    BaseTypeTag::Geometry2D
                }
            }
            BaseValue::Point3D(_) => {
                if geodetic {
                    BaseTypeTag::Geography3D
                } else {
                    BaseTypeTag::Geometry3D
                }
            }
        }
    }

    /// Total order across values of the *same* variant. `bool`/`text`/`geometry*`
    /// use their natural lexicographic/deterministic order (spec §3.1).
    pub fn compare(&self, other: &BaseValue) -> Ordering {
        match (self, other) {
            (BaseValue::Bool(a), BaseValue::Bool(b)) => a.cmp(b),
            (BaseValue::Int(a), BaseValue::Int(b)) => a.cmp(b),
            (BaseValue::BigInt(a), BaseValue::BigInt(b)) => a.cmp(b),
            (BaseValue::Float(a), BaseValue::Float(b)) => a.total_cmp(b),
            (BaseValue::Date(a), BaseValue::Date(b)) => a.cmp(b),
            (BaseValue::TimestampTz(a), BaseValue::TimestampTz(b)) => a.cmp(b),
            (BaseValue::Text(a), BaseValue::Text(b)) => a.cmp(b),
            (BaseValue::Point2D(a), BaseValue::Point2D(b)) => {
                a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
            }
            (BaseValue::Point3D(a), BaseValue::Point3D(b)) => {
                a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)).then(a.z.total_cmp(&b.z))
            }
            _ => panic!("compare called on mismatched BaseValue variants"),
        }
    }

    pub fn values_equal(&self, other: &BaseValue) -> bool {
        self.compare(other) == Ordering::Equal
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BaseValue::Int(v) => Some(*v as f64),
            BaseValue::BigInt(v) => Some(*v as f64),
            BaseValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_point2d(&self) -> Option<Point2D> {
        match self {
            BaseValue::Point2D(p) => Some(*p),
            BaseValue::Point3D(p) => Some(p.xy()),
            _ => None,
        }
    }

    pub fn as_point3d(&self) -> Option<Point3D> {
        match self {
            BaseValue::Point3D(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BaseValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Linear interpolation between `self` and `other` at fraction `t` in [0, 1].
    /// Only defined for continuous base types (spec §3.1/§4.3).
    pub fn lerp(&self, other: &BaseValue, t: f64) -> Option<BaseValue> {
        match (self, other) {
            (BaseValue::Float(a), BaseValue::Float(b)) => Some(BaseValue::Float(a + (b - a) * t)),
            (BaseValue::Point2D(a), BaseValue::Point2D(b)) => Some(BaseValue::Point2D(a.lerp(b, t))),
            (BaseValue::Point3D(a), BaseValue::Point3D(b)) => Some(BaseValue::Point3D(a.lerp(b, t))),
            _ => None,
        }
    }
}

/// Bound type for a generic `Span<T>` (spec §3.2). Discrete base types
/// canonicalize exclusive bounds to inclusive ones via `pred`/`succ` at
/// construction; continuous types do not.
pub trait SpanBound: Clone + std::fmt::Debug + PartialEq {
    const DISCRETE: bool;

    fn compare(&self, other: &Self) -> Ordering;

    /// Predecessor, used to turn `[a, b)` into `[a, b-1]` for discrete `T`.
    /// Returns `None` for continuous types (never called on them).
    fn pred(&self) -> Self {
        unimplemented!("pred() is only defined for discrete SpanBound types")
    }

    /// Successor, the inverse of `pred`, used to turn `(a, b]` into `[a+1, b]`.
    fn succ(&self) -> Self {
        unimplemented!("succ() is only defined for discrete SpanBound types")
    }
}

impl SpanBound for i32 {
    const DISCRETE: bool = true;
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
    fn pred(&self) -> Self {
        self - 1
    }
    fn succ(&self) -> Self {
        self + 1
    }
}

impl SpanBound for i64 {
    const DISCRETE: bool = true;
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
    fn pred(&self) -> Self {
        self - 1
    }
    fn succ(&self) -> Self {
        self + 1
    }
}

impl SpanBound for NaiveDate {
    const DISCRETE: bool = true;
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
    fn pred(&self) -> Self {
        *self - chrono::Duration::days(1)
    }
    fn succ(&self) -> Self {
        *self + chrono::Duration::days(1)
    }
}

/// Per spec §3.1, `timestamptz` is discrete for the purposes of span-bound
/// normalization (only `f64` and geometry/geography are continuous). The
/// engine's minimum tick is one microsecond; see `DESIGN.md` for the Open
/// Question resolution.
impl SpanBound for DateTime<Utc> {
    const DISCRETE: bool = true;
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
    fn pred(&self) -> Self {
        *self - chrono::Duration::microseconds(1)
    }
    fn succ(&self) -> Self {
        *self + chrono::Duration::microseconds(1)
    }
}

impl SpanBound for f64 {
    const DISCRETE: bool = false;
    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

/// `text` has no general predecessor function; per spec §3.1 it is
/// technically discrete, but a `Span<String>` is pragmatically treated as
/// not auto-canonicalizing exclusive bounds (Open Question, see
/// `DESIGN.md`): `DISCRETE = false` here is a deliberate simplification.
impl SpanBound for String {
    const DISCRETE: bool = false;
    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}
