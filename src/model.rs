use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates;

/// Product id → stored product name. Keys are unique; order is irrelevant.
pub type ProductLookup = HashMap<String, String>;

/// A local calendar date: year/month/day with no time-of-day and no timezone.
///
/// Serialized as `YYYY-MM-DD`. Deserialization goes through
/// [`dates::parse_local_date`], so trailing time components are dropped and
/// malformed input falls back to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// `None` if the triple is not a real calendar date (e.g. Feb 30).
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn is_valid(self) -> bool {
        self.to_naive().is_some()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month(), date.day())
    }
}

impl From<String> for CalendarDate {
    fn from(raw: String) -> Self {
        dates::parse_local_date(&raw)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        dates::format_date_to_iso(date)
    }
}

/// `YYYY-MM-DD` of the components as given, valid or not.
impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Product record as supplied by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Explicit `#RGB` / `#RRGGBB` color. Invalid values are ignored.
    #[serde(default)]
    pub color_hex: Option<String>,
}

/// Session record as supplied by the persistence collaborator.
/// Every identifying field may be missing on legacy rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<String>,
    pub title: Option<String>,
    pub product_id: Option<String>,
    /// Free-text product name stored on the session itself.
    pub product_name: Option<String>,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
}

impl Session {
    pub fn window(&self) -> SessionWindow {
        SessionWindow {
            product_id: self.product_id.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// The scheduling view of a session: which product, which days.
///
/// Both ends are whole calendar days and inclusive, so the window covers the
/// half-open day range `[start_date, end_date + 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub product_id: Option<String>,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
}

impl SessionWindow {
    pub fn new(product_id: Option<String>, start_date: CalendarDate, end_date: CalendarDate) -> Self {
        Self {
            product_id,
            start_date,
            end_date,
        }
    }

    /// Number of days from start to end. `None` for invalid dates.
    pub fn length_days(&self) -> Option<i64> {
        dates::days_between(self.start_date, self.end_date)
    }

    pub fn contains(&self, date: CalendarDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// True if the two windows share at least one calendar day.
    pub fn overlaps(&self, other: &SessionWindow) -> bool {
        self.start_date <= other.end_date && other.start_date <= self.end_date
    }

    /// Same calendar window exactly. Time-of-day never reaches a `CalendarDate`.
    pub fn same_dates(&self, other: &SessionWindow) -> bool {
        self.start_date == other.start_date && self.end_date == other.end_date
    }
}

/// Full color identity for a product. Always recomputed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorSet {
    pub background: String,
    pub text: String,
    pub border: String,
    /// Hex with alpha suffix for palette colors, `rgba(..)` for custom colors.
    pub badge_background: String,
    pub badge_text: String,
    pub hover_background: String,
    pub hover_text: String,
}
