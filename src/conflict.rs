use std::fmt;

use serde::Serialize;

use crate::dates::add_days;
use crate::model::{CalendarDate, SessionWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Same calendar window as an existing session.
    Duplicate,
    /// Starts on or before the end of the product's active session.
    Overlap,
}

impl ConflictKind {
    pub fn label(self) -> &'static str {
        match self {
            ConflictKind::Duplicate => "duplicate",
            ConflictKind::Overlap => "overlap",
        }
    }
}

/// Why a candidate session was rejected, and which window it collided with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConflict {
    pub kind: ConflictKind,
    pub conflicting: SessionWindow,
}

impl SessionConflict {
    /// First start date that clears an overlap with the conflicting window.
    pub fn earliest_start(&self) -> CalendarDate {
        add_days(self.conflicting.end_date, 1)
    }
}

impl fmt::Display for SessionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = &self.conflicting;
        match self.kind {
            ConflictKind::Duplicate => write!(
                f,
                "a session from {} to {} already exists for this product",
                w.start_date, w.end_date
            ),
            ConflictKind::Overlap => write!(
                f,
                "an active session runs from {} to {}; new sessions must start on or after {}",
                w.start_date,
                w.end_date,
                self.earliest_start()
            ),
        }
    }
}

impl std::error::Error for SessionConflict {}

/// Gate a candidate session before it is created.
///
/// `existing` holds the product's sessions, `active` the session currently
/// running for it, if any. Duplicates are reported ahead of overlaps.
pub fn check_session_conflict(
    candidate: &SessionWindow,
    existing: &[SessionWindow],
    active: Option<&SessionWindow>,
) -> Result<(), SessionConflict> {
    if let Some(dup) = existing.iter().find(|w| w.same_dates(candidate)) {
        return Err(SessionConflict {
            kind: ConflictKind::Duplicate,
            conflicting: dup.clone(),
        });
    }
    // The day after the active end is fine; no further gap is required.
    if let Some(active) = active
        && active.end_date >= candidate.start_date
    {
        return Err(SessionConflict {
            kind: ConflictKind::Overlap,
            conflicting: active.clone(),
        });
    }
    Ok(())
}

/// Default window for the next session of a product: it starts the day after
/// the active session ends (or `today` if nothing is running) and lasts
/// `length_days`.
pub fn next_available_window(
    product_id: Option<String>,
    active: Option<&SessionWindow>,
    today: CalendarDate,
    length_days: i64,
) -> SessionWindow {
    let start = active
        .map(|a| add_days(a.end_date, 1))
        .map_or(today, |s| s.max(today));
    SessionWindow::new(product_id, start, add_days(start, length_days))
}
