use crate::conflict::SessionConflict;
use crate::model::CalendarDate;

use super::SourceError;

#[derive(Debug)]
pub enum PlanError {
    /// End date not strictly after start date, or not a real date.
    InvalidWindow {
        start: CalendarDate,
        end: CalendarDate,
    },
    LimitExceeded(&'static str),
    UnknownProduct(String),
    /// Acting user lacks the admin role.
    Forbidden(String),
    Conflict(SessionConflict),
    Source(SourceError),
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::InvalidWindow { start, end } => {
                write!(f, "invalid session window: {start} to {end}; end must be after start")
            }
            PlanError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            PlanError::UnknownProduct(id) => write!(f, "unknown product: {id}"),
            PlanError::Forbidden(actor) => write!(f, "{actor} is not allowed to create sessions"),
            PlanError::Conflict(conflict) => write!(f, "session conflict: {conflict}"),
            PlanError::Source(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PlanError {}

impl From<SourceError> for PlanError {
    fn from(e: SourceError) -> Self {
        PlanError::Source(e)
    }
}

impl From<SessionConflict> for PlanError {
    fn from(conflict: SessionConflict) -> Self {
        PlanError::Conflict(conflict)
    }
}
