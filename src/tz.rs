//! Explicit time-zone binding (spec §6 Environment, §9 "no global state
//! besides an optional time-zone binding... pass it explicitly").
//!
//! There is no thread-local or process-global "current timezone" anywhere in
//! this crate: `text::parse` takes a `TimeZoneBinding` as an explicit
//! argument and falls back to UTC when the caller has none. No named-zone
//! database (`chrono-tz`) is pulled in for this — the grammar's timestamps
//! are always either RFC 3339 (self-describing offset) or bound to this
//! single fixed offset, matching `original_source`'s treatment of
//! `timestamptz` as UTC-normalized on input.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// A single fixed UTC offset applied to naive (offset-less) timestamp
/// literals. `None` means "assume UTC".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeZoneBinding(Option<FixedOffset>);

impl TimeZoneBinding {
    pub fn utc() -> Self {
        TimeZoneBinding(None)
    }

    pub fn fixed_offset(offset: FixedOffset) -> Self {
        TimeZoneBinding(Some(offset))
    }

    pub fn offset(&self) -> FixedOffset {
        self.0.unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }

    /// Attach this binding's offset to a naive datetime, then normalize to UTC.
    pub fn to_utc(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        self.offset().from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn utc_binding_treats_naive_time_as_utc() {
        let binding = TimeZoneBinding::utc();
        let naive = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let utc = binding.to_utc(naive);
        assert_eq!(utc.to_rfc3339(), "2000-01-01T12:00:00+00:00");
    }

    #[test]
    fn fixed_offset_binding_shifts_to_utc() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let binding = TimeZoneBinding::fixed_offset(offset);
        let naive = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let utc = binding.to_utc(naive);
        assert_eq!(utc.to_rfc3339(), "2000-01-01T07:00:00+00:00");
    }
}
