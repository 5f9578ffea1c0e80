mod board;
mod error;
mod source;
#[cfg(test)]
mod tests;

pub use board::{build_board, Board, BoardEntry, BoardGroup};
pub use error::PlanError;
pub use source::{InMemorySource, NewSession, SessionSource, Snapshot, SourceError};

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::conflict::{check_session_conflict, next_available_window};
use crate::dates::days_between;
use crate::limits::*;
use crate::model::*;
use crate::observability::*;

/// Gatekeeper between the UI and the session source: validates and
/// conflict-checks new sessions, and assembles the board.
pub struct SessionPlanner<S> {
    source: Arc<S>,
    config: Arc<Config>,
    /// Held from conflict check through insert, one per product.
    product_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: SessionSource> SessionPlanner<S> {
    pub fn new(source: Arc<S>, config: Arc<Config>) -> Self {
        Self {
            source,
            config,
            product_locks: DashMap::new(),
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every pre-create check for a window on `product_id` without
    /// writing anything.
    pub async fn check_candidate(
        &self,
        product_id: &str,
        start_date: CalendarDate,
        end_date: CalendarDate,
        today: CalendarDate,
    ) -> Result<SessionWindow, PlanError> {
        validate_window(start_date, end_date)?;
        let candidate = SessionWindow::new(Some(product_id.to_string()), start_date, end_date);

        let (product, existing, active) = futures::try_join!(
            self.source.product(product_id),
            self.source.sessions_for_product(product_id),
            self.source.active_session(product_id, today),
        )
        .inspect_err(|_| metrics::counter!(SOURCE_ERRORS_TOTAL).increment(1))?;

        if product.is_none() {
            return Err(PlanError::UnknownProduct(product_id.to_string()));
        }

        let existing: Vec<SessionWindow> = existing.iter().map(Session::window).collect();
        let active = active.map(|s| s.window());
        if let Err(conflict) = check_session_conflict(&candidate, &existing, active.as_ref()) {
            debug!("rejecting {product_id} [{start_date}, {end_date}]: {conflict}");
            metrics::counter!(SESSION_CONFLICTS_TOTAL, "kind" => conflict.kind.label()).increment(1);
            return Err(conflict.into());
        }
        Ok(candidate)
    }

    pub async fn create_session(
        &self,
        new: NewSession,
        today: CalendarDate,
    ) -> Result<Session, PlanError> {
        if let Some(title) = &new.title
            && title.len() > MAX_NAME_LEN
        {
            return Err(PlanError::LimitExceeded("session title too long"));
        }
        let lock = self.product_lock(&new.product_id);
        let _guard = lock.lock().await;
        self.check_candidate(&new.product_id, new.start_date, new.end_date, today)
            .await?;

        let stored = self.source.insert_session(new).await.inspect_err(|e| {
            warn!("session insert failed: {e}");
            metrics::counter!(SOURCE_ERRORS_TOTAL).increment(1);
        })?;
        metrics::counter!(SESSIONS_CREATED_TOTAL).increment(1);
        info!(
            "created session {} for {} [{}, {}]",
            stored.id.as_deref().unwrap_or("?"),
            stored.product_id.as_deref().unwrap_or("?"),
            stored.start_date,
            stored.end_date
        );
        Ok(stored)
    }

    /// The source's role answer for `email`, falling back to the configured
    /// admin list when the source has none.
    pub async fn is_admin(&self, email: &str) -> Result<bool, PlanError> {
        let role = self
            .source
            .admin_role(email)
            .await
            .inspect_err(|_| metrics::counter!(SOURCE_ERRORS_TOTAL).increment(1))?;
        Ok(role.unwrap_or_else(|| self.config.is_fallback_admin(email)))
    }

    /// [`Self::create_session`] on behalf of `actor`, who must be an admin.
    pub async fn create_session_as(
        &self,
        actor: &str,
        new: NewSession,
        today: CalendarDate,
    ) -> Result<Session, PlanError> {
        if !self.is_admin(actor).await? {
            warn!("{actor} denied session create on {}", new.product_id);
            return Err(PlanError::Forbidden(actor.to_string()));
        }
        self.create_session(new, today).await
    }

    /// Earliest window of the configured length that clears the product's
    /// active session.
    pub async fn suggest_window(
        &self,
        product_id: &str,
        today: CalendarDate,
    ) -> Result<SessionWindow, PlanError> {
        let (product, active) = futures::try_join!(
            self.source.product(product_id),
            self.source.active_session(product_id, today),
        )
        .inspect_err(|_| metrics::counter!(SOURCE_ERRORS_TOTAL).increment(1))?;

        if product.is_none() {
            return Err(PlanError::UnknownProduct(product_id.to_string()));
        }
        let active = active.map(|s| s.window());
        Ok(next_available_window(
            Some(product_id.to_string()),
            active.as_ref(),
            today,
            self.config.session_length_days,
        ))
    }

    fn product_lock(&self, product_id: &str) -> Arc<Mutex<()>> {
        self.product_locks
            .entry(product_id.to_string())
            .or_default()
            .clone()
    }

    pub async fn board(&self) -> Result<Board, PlanError> {
        let (products, sessions) =
            futures::try_join!(self.source.products(), self.source.sessions())
                .inspect_err(|_| metrics::counter!(SOURCE_ERRORS_TOTAL).increment(1))?;

        let started = std::time::Instant::now();
        let board = build_board(&products, &sessions);
        metrics::histogram!(BOARD_BUILD_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        metrics::gauge!(BOARD_SESSIONS).set(board.session_count() as f64);
        debug!(
            "board: {} groups, {} singles",
            board.groups.len(),
            board.singles.len()
        );
        Ok(board)
    }
}

fn validate_window(start: CalendarDate, end: CalendarDate) -> Result<(), PlanError> {
    let reject = |reason: &'static str| {
        metrics::counter!(INVALID_WINDOWS_TOTAL, "reason" => reason).increment(1);
    };
    match days_between(start, end) {
        Some(days) if days > MAX_SESSION_LENGTH_DAYS => {
            reject("too_long");
            Err(PlanError::LimitExceeded("session window too long"))
        }
        Some(days) if days >= MIN_SESSION_LENGTH_DAYS => Ok(()),
        _ => {
            reject("not_after_start");
            Err(PlanError::InvalidWindow { start, end })
        }
    }
}
