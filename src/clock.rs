//! Calendar period arithmetic.
//!
//! Boundaries are computed on the local wall-clock breakdown of `now` and
//! then mapped back to an absolute instant in the same time zone. Counts are
//! relative to the period containing `now`: `0` is the current period, `1`
//! the next one and `-1` the previous one.

use crate::domain::{Interval, SuffixFormat};
use chrono::{
    DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike,
};
use std::fmt;

/// Start of the period `count` steps away from the one containing `now`.
pub fn period_start<Tz: TimeZone>(now: &DateTime<Tz>, count: i32, interval: Interval) -> DateTime<Tz> {
    let local = now.naive_local();
    let date = local.date();

    let naive = match interval {
        Interval::Hourly => {
            midnight(date) + TimeDelta::hours(i64::from(local.hour()) + i64::from(count))
        }
        Interval::Daily => midnight(date + TimeDelta::days(i64::from(count))),
        Interval::Weekly => {
            let since_sunday = i64::from(date.weekday().num_days_from_sunday());
            midnight(date + TimeDelta::days(7 * i64::from(count) - since_sunday))
        }
        Interval::Monthly => {
            let (year, month0) = shift_month(date.year(), date.month0(), count);
            // Only out-of-range years fail here; stay on the current instant.
            NaiveDate::from_ymd_opt(year, month0 + 1, 1).map_or(local, midnight)
        }
    };

    resolve_local(&now.timezone(), naive)
}

/// Period boundary shifted by a signed offset.
///
/// A negative offset can pull the next boundary back to or before `now`.
/// When that happens the requested count moves one period forward so that
/// `count = 1` always names a boundary still ahead of `now`. The correction
/// only holds for offsets shorter than one period.
pub fn offset_period_start<Tz: TimeZone>(
    now: &DateTime<Tz>,
    count: i32,
    interval: Interval,
    offset: TimeDelta,
) -> DateTime<Tz> {
    let mut count = count;

    if offset < TimeDelta::zero() {
        let next = shift(period_start(now, 1, interval), offset);
        if &next <= now {
            count += 1;
        }
    }

    shift(period_start(now, count, interval), offset)
}

/// Apply an offset, keeping the unshifted boundary if the result would leave
/// the representable calendar range.
fn shift<Tz: TimeZone>(boundary: DateTime<Tz>, offset: TimeDelta) -> DateTime<Tz> {
    boundary.clone().checked_add_signed(offset).unwrap_or(boundary)
}

/// Month arithmetic with explicit year carry and borrow.
fn shift_month(year: i32, month0: u32, count: i32) -> (i32, u32) {
    let total = i64::from(month0) + i64::from(count);
    let mut year = i64::from(year) + total / 12;
    let mut month0 = total % 12;
    if month0 < 0 {
        month0 += 12;
        year -= 1;
    }
    (year as i32, month0.unsigned_abs() as u32)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    if let Some(resolved) = tz.from_local_datetime(&naive).earliest() {
        return resolved;
    }
    // Skipped by a DST gap: the boundary moves to the first existing instant.
    tz.from_local_datetime(&(naive + TimeDelta::hours(1)))
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Cadence plus offset, the pair every rotation component needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodClock {
    interval: Interval,
    offset: TimeDelta,
}

impl PeriodClock {
    #[must_use]
    pub const fn new(interval: Interval, offset: TimeDelta) -> Self {
        Self { interval, offset }
    }

    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    #[must_use]
    pub const fn offset(&self) -> TimeDelta {
        self.offset
    }

    pub fn period_start<Tz: TimeZone>(&self, now: &DateTime<Tz>, count: i32) -> DateTime<Tz> {
        period_start(now, count, self.interval)
    }

    pub fn boundary<Tz: TimeZone>(&self, now: &DateTime<Tz>, count: i32) -> DateTime<Tz> {
        offset_period_start(now, count, self.interval, self.offset)
    }

    /// Rendered suffix for the boundary `count` periods away.
    pub fn suffix<Tz>(&self, now: &DateTime<Tz>, count: i32, format: &SuffixFormat) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        format.render(&self.boundary(now, count))
    }
}
