//! Calendar arithmetic on local dates.
//!
//! Everything here works on year/month/day components. Nothing converts to an
//! instant, so a date stored as UTC midnight can never drift to the previous
//! day in a negative-offset timezone.

use chrono::{Days, Local, NaiveDate};
use tracing::debug;

use crate::model::CalendarDate;

/// Today's date on the local clock.
pub fn today() -> CalendarDate {
    Local::now().date_naive().into()
}

/// Strict parse of `YYYY-MM-DD`, ignoring anything after a `T` or space.
pub fn try_parse_local_date(input: &str) -> Option<CalendarDate> {
    let date_part = input.split(['T', ' ']).next()?;
    let mut parts = date_part.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate::from)
}

/// Best-effort parse: malformed input yields `fallback`.
pub fn parse_local_date_or(input: &str, fallback: CalendarDate) -> CalendarDate {
    try_parse_local_date(input).unwrap_or(fallback)
}

/// Best-effort parse: malformed input yields today's date.
pub fn parse_local_date(input: &str) -> CalendarDate {
    try_parse_local_date(input).unwrap_or_else(|| {
        debug!("unparseable date {input:?}, using today");
        today()
    })
}

/// Render as `YYYY-MM-DD`. An invalid triple renders today's date instead.
pub fn format_date_to_iso(date: CalendarDate) -> String {
    let date = if date.is_valid() {
        date
    } else {
        debug!("invalid calendar date {date:?}, formatting today");
        today()
    };
    format!("{:04}-{:02}-{:02}", date.year, date.month, date.day)
}

/// Add `days` (may be negative) by normalizing `(year, month, day + days)`.
///
/// Out-of-range components roll over the way a calendar does: day 0 is the
/// last day of the previous month, month 13 is January of the next year.
pub fn add_days(date: CalendarDate, days: i64) -> CalendarDate {
    let months = i64::from(date.year) * 12 + i64::from(date.month) - 1;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) + 1;
    let offset = i64::from(date.day) - 1 + days;

    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month as u32, 1))
        .and_then(|first| shift(first, offset))
        .map(CalendarDate::from)
        .unwrap_or_else(|| {
            debug!("date {date:?} + {days} days out of range, using today");
            today()
        })
}

/// Whole days from `start` to `end` (negative if `end` is earlier).
pub fn days_between(start: CalendarDate, end: CalendarDate) -> Option<i64> {
    Some((end.to_naive()? - start.to_naive()?).num_days())
}

fn shift(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    if offset >= 0 {
        date.checked_add_days(Days::new(offset.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(offset.unsigned_abs()))
    }
}
