//! Temporal-value algebra, synchronization, lifting, restriction, codecs and
//! aggregation for moving-object data.
//!
//! The crate is organized leaf-first: base types and geometry at the
//! bottom, span/time-set algebra over them, the temporal value model on
//! top of that, and the synchronizer/lifting/restriction/aggregator engines
//! built from those pieces. `text`/`codec` are the external-interface
//! layer; `tz` carries the only piece of environment state the core
//! consults (and only when explicitly passed in).

pub mod agg;
pub mod basetype;
pub mod codec;
pub mod error;
pub mod geom;
pub mod lift;
pub mod restrict;
pub mod span;
pub mod spanset;
pub mod sync;
pub mod temporal;
pub mod text;
pub mod timeset;
pub mod tz;

pub use basetype::{BaseTypeTag, BaseValue, SpanBound};
pub use error::{Error, Result};
pub use geom::{Point2D, Point3D};
pub use span::Span;
pub use spanset::SpanSet;
pub use temporal::{Instant, InstantSet, Interpolation, Sequence, SequenceSet, Temporal, TemporalFlags};
pub use timeset::{AllenRelation, Period, PeriodSet, Timestamp, TimestampSet};
pub use tz::TimeZoneBinding;
